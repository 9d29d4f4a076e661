//! Model family and degree selection.
//!
//! Selection rules:
//! 1. With `auto_degree`, the degree is the sample count.
//! 2. Otherwise it is the configured `forced_degree`.
//! 3. The result is clamped to `max_degree` (never below 1).
//!
//! The degree is only meaningful for the polynomial family but is computed
//! for every family so introspection commands can report it uniformly.

use tracing::warn;

use crate::domain::{FitConfig, ModelFamily};

/// Outcome of selection for one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub family: ModelFamily,
    pub degree: usize,
}

/// Pick the polynomial degree for `sample_count` observations.
pub fn select_degree(config: &FitConfig, sample_count: usize) -> usize {
    let effective = if config.auto_degree {
        sample_count
    } else {
        config.forced_degree
    };
    effective.min(config.max_degree.max(1))
}

/// The configured family.
pub fn select_family(config: &FitConfig) -> ModelFamily {
    config.model_family
}

/// Resolve a family name as written in configuration.
///
/// Unrecognized names fall back to the polynomial family (with a warning)
/// instead of failing.
pub fn family_or_default(name: &str) -> ModelFamily {
    name.parse().unwrap_or_else(|_| {
        warn!("Unknown curve fitter type '{name}', using polynomial");
        ModelFamily::Polynomial
    })
}

pub fn select(config: &FitConfig, sample_count: usize) -> Selection {
    Selection {
        family: select_family(config),
        degree: select_degree(config, sample_count),
    }
}
