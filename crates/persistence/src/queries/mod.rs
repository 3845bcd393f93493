// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! Reads are not synchronized with writers. A reader sees the last
//! committed state, never half of a transition.

pub mod bookings;
pub mod operators;
pub mod tables;
