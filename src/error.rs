//! Error types.
//!
//! Two layers:
//!
//! - typed core errors (`SampleError`, `FitError`, `LoadError`, `EngineError`)
//!   returned by the sample/fit/engine modules so callers can match on them
//! - `AppError`, a message plus process exit code, used by the binary and the
//!   file/config helpers

use crate::domain::ModelFamily;

/// Failures while turning raw records into a `SampleSet`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SampleError {
    /// A key (or value) is not a valid number for the configured numeric mode.
    #[error("Invalid {what} '{raw}': expected {expected}")]
    Parse {
        what: &'static str,
        raw: String,
        expected: &'static str,
    },

    /// Regression needs at least one observation.
    #[error("Dataset contains no samples")]
    Empty,

    /// Two keys resolved to the same x value under the `fail` duplicate policy.
    #[error("Duplicate size {x} (keys '{first}' and '{second}')")]
    DuplicateKey { x: f64, first: String, second: String },
}

/// Failures of a model fit.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitError {
    #[error("{family} fit needs at least {needed} samples, got {got}")]
    InsufficientObservations {
        family: ModelFamily,
        needed: usize,
        got: usize,
    },

    #[error("{family} fit did not converge within {iterations} iterations")]
    NotConverged { family: ModelFamily, iterations: usize },

    /// The least-squares system could not be solved at any tolerance.
    #[error("Least-squares system is singular [n: {n}, k: {k}]")]
    Singular { n: usize, k: usize },

    #[error("{family} fit produced non-finite parameters")]
    NonFinite { family: ModelFamily },

    /// Coefficients handed to `FittedFunction::new` do not match the family.
    #[error("{family} function needs {expected} coefficients, got {got}")]
    ParameterCount {
        family: ModelFamily,
        expected: &'static str,
        got: usize,
    },
}

/// Failure of `Engine::load` / `Engine::reload`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    /// The dataset provider could not supply records.
    #[error("Failed to read dataset '{id}': {message}")]
    Source { id: String, message: String },

    #[error(transparent)]
    Sample(#[from] SampleError),

    #[error(transparent)]
    Fit(#[from] FitError),
}

/// Failures of engine queries.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("No function loaded yet; load a dataset first")]
    NoFunctionLoaded,

    #[error(transparent)]
    Load(#[from] LoadError),
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        let code = match err {
            LoadError::Source { .. } => 2,
            LoadError::Sample(_) => 3,
            LoadError::Fit(_) => 4,
        };
        AppError::new(code, err.to_string())
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NoFunctionLoaded => AppError::new(5, err.to_string()),
            EngineError::Load(inner) => inner.into(),
        }
    }
}
