//! Mathematical utilities: least squares, Levenberg–Marquardt and polynomial bases.

pub mod lm;
pub mod ols;
pub mod poly;

pub use lm::*;
pub use ols::*;
pub use poly::*;
