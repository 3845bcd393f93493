// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write operations.
//!
//! Every write that touches both a table and a booking goes through
//! `transition::apply_transition`, which commits both or neither.

pub mod operators;
pub mod seed;
pub mod transition;
