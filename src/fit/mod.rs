//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - pick the model family and degree from configuration (`selection`)
//! - derive starting parameters for the nonlinear families (`guess`)
//! - solve for coefficients (`fitter`)

pub mod fitter;
pub mod guess;
pub mod selection;

pub use fitter::*;
pub use guess::*;
pub use selection::*;
