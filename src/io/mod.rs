//! Input/output helpers.
//!
//! - working directory + `config.properties` (`config`)
//! - dataset files and the directory-backed provider (`dataset`)
//! - function export files (`export`)

pub mod config;
pub mod dataset;
pub mod export;

pub use config::*;
pub use dataset::*;
pub use export::*;
