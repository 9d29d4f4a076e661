//! The fitting engine shared by the interactive loop and the one-shot commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! records -> sample set -> family/degree selection -> solve -> fitted function
//!
//! State is held as one `EngineState` value. `load`/`reload` build a complete
//! new state first and only then replace the old one, so a failed load leaves
//! every query (`evaluate`, `describe`, `export`) answering from the previous
//! successful load.

use std::collections::HashMap;

use tracing::info;

use crate::data::{RawRecords, SampleSet};
use crate::domain::{Description, FitConfig};
use crate::error::{EngineError, LoadError};
use crate::fit::{FitOptions, Selection, fit, select};
use crate::models::FittedFunction;

/// Supplies raw records for a dataset identifier.
pub trait DatasetProvider {
    fn fetch(&self, id: &str) -> Result<RawRecords, LoadError>;
}

/// Datasets held in memory (tests, embedding).
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    datasets: HashMap<String, RawRecords>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a dataset.
    pub fn insert<K: Into<String>>(&mut self, id: impl Into<String>, records: impl IntoIterator<Item = (K, f64)>) {
        let records = records.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.datasets.insert(id.into(), records);
    }
}

impl DatasetProvider for MemoryProvider {
    fn fetch(&self, id: &str) -> Result<RawRecords, LoadError> {
        self.datasets.get(id).cloned().ok_or_else(|| LoadError::Source {
            id: id.to_string(),
            message: "unknown dataset".to_string(),
        })
    }
}

/// Everything produced by one successful load.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineState {
    pub dataset: String,
    pub samples: SampleSet,
    pub config: FitConfig,
    pub selection: Selection,
    pub function: FittedFunction,
}

impl EngineState {
    /// Run the full pipeline for one dataset.
    pub fn build(id: &str, records: &[(String, f64)], config: &FitConfig) -> Result<Self, LoadError> {
        let samples = SampleSet::from_records(records, config.numeric_mode, config.duplicate_policy)?;
        let selection = select(config, samples.size());
        let opts = FitOptions {
            max_iterations: config.max_iterations,
        };
        let function = fit(&samples, selection.family, selection.degree, &opts)?;

        Ok(Self {
            dataset: id.to_string(),
            samples,
            config: config.clone(),
            selection,
            function,
        })
    }

    pub fn describe(&self) -> Description {
        Description {
            dataset: self.dataset.clone(),
            family: self.function.family(),
            requested_degree: self.selection.degree,
            degree: self.function.degree(),
            coefficients: self.function.coefficients().to_vec(),
            xs: self.samples.xs(),
            ys: self.samples.ys(),
        }
    }
}

/// Owns the current fit and the provider used to (re)load datasets.
#[derive(Debug)]
pub struct Engine<P> {
    provider: P,
    state: Option<EngineState>,
}

impl<P: DatasetProvider> Engine<P> {
    pub fn new(provider: P) -> Self {
        Self { provider, state: None }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetch `id` from the provider and fit it.
    pub fn load(&mut self, id: &str, config: &FitConfig) -> Result<&FittedFunction, LoadError> {
        let records = self.provider.fetch(id)?;
        self.load_records(id, &records, config)
    }

    /// Fit already-fetched records and make them current.
    pub fn load_records(
        &mut self,
        id: &str,
        records: &[(String, f64)],
        config: &FitConfig,
    ) -> Result<&FittedFunction, LoadError> {
        let next = EngineState::build(id, records, config)?;
        info!(
            dataset = id,
            family = %next.selection.family,
            degree = next.function.degree(),
            samples = next.samples.size(),
            "fitted function"
        );
        let state = self.state.insert(next);
        Ok(&state.function)
    }

    /// Re-fetch the last dataset and fit it with the config snapshot of the last load.
    pub fn reload(&mut self) -> Result<&FittedFunction, EngineError> {
        let (id, config) = match &self.state {
            Some(state) => (state.dataset.clone(), state.config.clone()),
            None => return Err(EngineError::NoFunctionLoaded),
        };
        info!(dataset = %id, "reloading dataset");
        Ok(self.load(&id, &config)?)
    }

    pub fn state(&self) -> Option<&EngineState> {
        self.state.as_ref()
    }

    pub fn function(&self) -> Result<&FittedFunction, EngineError> {
        self.current().map(|s| &s.function)
    }

    /// Evaluate the current function, rounding in integral mode.
    pub fn evaluate(&self, x: f64) -> Result<f64, EngineError> {
        let state = self.current()?;
        Ok(state.config.numeric_mode.apply(state.function.value(x)))
    }

    pub fn describe(&self) -> Result<Description, EngineError> {
        self.current().map(EngineState::describe)
    }

    /// Export text for the file writer.
    pub fn export(&self) -> Result<String, EngineError> {
        self.current().map(crate::report::format_export)
    }

    fn current(&self) -> Result<&EngineState, EngineError> {
        self.state.as_ref().ok_or(EngineError::NoFunctionLoaded)
    }
}
