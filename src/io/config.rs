//! Working directory bootstrap and `config.properties` loading.
//!
//! The properties file uses `key=value` lines (with `#` comments), which is
//! the same syntax as a dotenv file, so it is read with `dotenvy`'s iterator
//! API. Nothing is exported into the process environment.
//!
//! Recognized keys (defaults in parentheses):
//!
//! - `curveFitterType` (`polynomial`): `polynomial`, `gaussian` or `harmonic`
//! - `auto` (`true`): use the sample count as the degree
//! - `degree` (`3`): degree when `auto=false`
//! - `maxFuncDegree` (`100`): upper bound on the degree
//! - `integral` (`false`): integer sizes, rounded prices
//! - `duplicateKeys` (`last`): `last` or `fail`
//! - `maxIterations` (`1000`): nonlinear solver budget
//!
//! A malformed value keeps the default and logs a warning; unknown keys are
//! ignored.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::domain::{FitConfig, NumericMode};
use crate::error::AppError;
use crate::fit::family_or_default;

pub const CONFIG_FILE: &str = "config.properties";
pub const EXPORT_DIR: &str = "export";

/// Path of the properties file inside the working directory.
pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

/// Create the working directory and an empty properties file if missing.
pub fn bootstrap(dir: &Path) -> Result<(), AppError> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .map_err(|e| AppError::new(2, format!("Failed to create folder '{}': {e}", dir.display())))?;
        info!("Config folder created: {}", dir.display());
    }

    let path = config_path(dir);
    if !path.exists() {
        fs::write(&path, "")
            .map_err(|e| AppError::new(2, format!("Failed to create config file '{}': {e}", path.display())))?;
        info!("Config file created: {}", path.display());
    }
    Ok(())
}

/// Load `config.properties` from `dir`; a missing file yields the defaults.
pub fn load_config(dir: &Path) -> Result<FitConfig, AppError> {
    let path = config_path(dir);
    if !path.exists() {
        debug!("No {} in '{}', using defaults", CONFIG_FILE, dir.display());
        return Ok(FitConfig::default());
    }

    let file = fs::File::open(&path)
        .map_err(|e| AppError::new(2, format!("Failed to open config '{}': {e}", path.display())))?;
    parse_config(file).map_err(|e| AppError::new(2, format!("Invalid config '{}': {e}", path.display())))
}

/// Parse properties text into a `FitConfig`.
pub fn parse_config<R: Read>(reader: R) -> Result<FitConfig, dotenvy::Error> {
    let mut config = FitConfig::default();

    for item in dotenvy::from_read_iter(reader) {
        let (key, value) = item?;
        let value = value.trim();
        match key.as_str() {
            "curveFitterType" => config.model_family = family_or_default(value),
            "auto" => set_or_warn(&mut config.auto_degree, &key, value),
            "degree" => set_or_warn(&mut config.forced_degree, &key, value),
            "maxFuncDegree" => set_or_warn(&mut config.max_degree, &key, value),
            "integral" => {
                let mut integral = config.numeric_mode == NumericMode::Integral;
                set_or_warn(&mut integral, &key, value);
                config.numeric_mode = if integral {
                    NumericMode::Integral
                } else {
                    NumericMode::Real
                };
            }
            "duplicateKeys" => set_or_warn(&mut config.duplicate_policy, &key, value),
            "maxIterations" => set_or_warn(&mut config.max_iterations, &key, value),
            other => debug!("Ignoring unknown config key '{other}'"),
        }
    }

    Ok(config)
}

fn set_or_warn<T: FromStr + std::fmt::Debug>(slot: &mut T, key: &str, value: &str) {
    match value.parse::<T>() {
        Ok(v) => *slot = v,
        Err(_) => warn!("Invalid value '{value}' for '{key}', keeping {slot:?}"),
    }
}
