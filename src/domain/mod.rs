//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - fit configuration (`FitConfig`, `ModelFamily`, `NumericMode`, `DuplicatePolicy`)
//! - observation samples (`Sample`)
//! - read-only engine snapshots (`Description`)

pub mod types;

pub use types::*;
