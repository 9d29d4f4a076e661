//! Reporting: export text and introspection output.
//!
//! Formatting lives here so the engine and fitter stay free of presentation
//! details, and so the export format can be tested in one place.

pub mod format;

pub use format::*;
