//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - used in-memory during fitting
//! - printed by the interactive loop
//! - exported as text

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

/// Functional form fitted to the samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ModelFamily {
    /// `c0 + c1 x + ... + cd x^d`
    Polynomial,
    /// `a * exp(-(x - b)^2 / (2 c^2))`
    Gaussian,
    /// `a * cos(ω x + φ)`
    Harmonic,
}

impl ModelFamily {
    pub const ALL: [ModelFamily; 3] = [
        ModelFamily::Polynomial,
        ModelFamily::Gaussian,
        ModelFamily::Harmonic,
    ];

    /// Name used in config files and export file names.
    pub fn as_str(self) -> &'static str {
        match self {
            ModelFamily::Polynomial => "polynomial",
            ModelFamily::Gaussian => "gaussian",
            ModelFamily::Harmonic => "harmonic",
        }
    }

    /// Fixed parameter count of the nonlinear families.
    ///
    /// `None` for the polynomial family, whose size follows the degree.
    pub fn fixed_param_count(self) -> Option<usize> {
        match self {
            ModelFamily::Polynomial => None,
            ModelFamily::Gaussian | ModelFamily::Harmonic => Some(3),
        }
    }

    /// Minimum number of samples the family can be fitted to.
    pub fn min_samples(self) -> usize {
        self.fixed_param_count().unwrap_or(1)
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ModelFamily::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown model family '{s}'"))
    }
}

/// How keys and values are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericMode {
    /// Keys and values are real numbers.
    #[default]
    Real,
    /// Keys must be integers; values and evaluated prices are rounded.
    Integral,
}

impl NumericMode {
    /// Apply the mode to an evaluated or ingested value.
    pub fn apply(self, v: f64) -> f64 {
        match self {
            NumericMode::Real => v,
            NumericMode::Integral => v.round(),
        }
    }
}

/// What to do when two keys resolve to the same x value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Later records replace earlier ones.
    #[default]
    LastWins,
    /// Ingestion fails with a duplicate-key error.
    Fail,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last" | "lastwins" | "last-wins" => Ok(DuplicatePolicy::LastWins),
            "fail" | "error" => Ok(DuplicatePolicy::Fail),
            other => Err(format!("unknown duplicate policy '{other}'")),
        }
    }
}

/// Fit configuration.
///
/// Loaded once from `config.properties` (plus defaults) and snapshotted by the
/// engine on every successful load.
#[derive(Debug, Clone, PartialEq)]
pub struct FitConfig {
    pub model_family: ModelFamily,
    /// Use the sample count as the polynomial degree.
    pub auto_degree: bool,
    /// Degree used when `auto_degree` is off.
    pub forced_degree: usize,
    /// Upper clamp on the selected degree (at least 1).
    pub max_degree: usize,
    pub numeric_mode: NumericMode,
    pub duplicate_policy: DuplicatePolicy,
    /// Iteration budget of the nonlinear solver.
    pub max_iterations: usize,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            model_family: ModelFamily::Polynomial,
            auto_degree: true,
            forced_degree: 3,
            max_degree: 100,
            numeric_mode: NumericMode::Real,
            duplicate_policy: DuplicatePolicy::LastWins,
            max_iterations: 1000,
        }
    }
}

/// One `(size, price)` observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
}

/// Read-only snapshot of the engine for introspection commands.
#[derive(Debug, Clone, PartialEq)]
pub struct Description {
    pub dataset: String,
    pub family: ModelFamily,
    /// Degree chosen by the selector before the fitter's own limits.
    pub requested_degree: usize,
    /// Degree reported by the fitted function.
    ///
    /// For the polynomial family this is the highest non-zero power; for the
    /// gaussian and harmonic families it is their parameter count (3).
    pub degree: usize,
    pub coefficients: Vec<f64>,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}
