//! Write function exports to text files.
//!
//! Exports land in `<dir>/export/` and are named after the dataset, the
//! model family and the local time of the export. Files are created, never
//! replaced: a second export in the same second gets a ` (1)`, ` (2)`, ...
//! suffix.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::info;

use crate::domain::ModelFamily;
use crate::error::AppError;
use crate::io::config::EXPORT_DIR;

/// `<id>_func_export_<family>_<yyyy-MM-dd HH-mm-ss>.txt`
pub fn export_file_name(id: &str, family: ModelFamily, at: NaiveDateTime) -> String {
    format!(
        "{id}_func_export_{}_{}.txt",
        family.as_str(),
        at.format("%Y-%m-%d %H-%M-%S")
    )
}

/// Write `text` to a new export file under `dir` and return its path.
pub fn write_export(dir: &Path, id: &str, family: ModelFamily, text: &str) -> Result<PathBuf, AppError> {
    write_export_at(dir, id, family, text, Local::now().naive_local())
}

pub fn write_export_at(
    dir: &Path,
    id: &str,
    family: ModelFamily,
    text: &str,
    at: NaiveDateTime,
) -> Result<PathBuf, AppError> {
    let folder = dir.join(EXPORT_DIR);
    if !folder.exists() {
        fs::create_dir_all(&folder).map_err(|e| {
            AppError::new(2, format!("Failed to create export folder '{}': {e}", folder.display()))
        })?;
        info!("Export folder created: {}", folder.display());
    }

    let name = export_file_name(id, family, at);
    let stem = name.trim_end_matches(".txt");
    let write_failed = |path: &Path, e: std::io::Error| {
        AppError::new(2, format!("Failed to write export file '{}': {e}", path.display()))
    };

    for attempt in 0..MAX_SUFFIX {
        let path = match attempt {
            0 => folder.join(&name),
            n => folder.join(format!("{stem} ({n}).txt")),
        };
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(write_failed(&path, e)),
        };
        file.write_all(text.as_bytes()).map_err(|e| write_failed(&path, e))?;
        info!("Written export file: {}", path.display());
        return Ok(path);
    }

    Err(AppError::new(
        2,
        format!("Too many exports named '{name}' in '{}'", folder.display()),
    ))
}

/// Upper bound on same-second exports of one dataset and family.
const MAX_SUFFIX: usize = 1000;
