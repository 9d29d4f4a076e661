//! Fitted model representations.
//!
//! The per-family formulas are small, pure functions so that fitting and
//! evaluation share one definition.

pub mod model;

pub use model::*;
