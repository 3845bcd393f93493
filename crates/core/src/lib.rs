// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The booking state machine.
//!
//! Every function here is pure. A transition is computed from the records
//! that were read and returned as data: the paired table and booking writes,
//! each carrying the status it expects to overwrite. The persistence layer
//! commits a transition as a single unit and refuses it if either expected
//! status no longer holds.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod apply;
mod command;
mod error;
mod state;

#[cfg(test)]
mod tests;

pub use apply::{apply, apply_reserve};
pub use command::{Command, ReserveRequest};
pub use error::CoreError;
pub use state::{BookingWrite, TableWrite, Transition, TransitionResult};
