//! Dataset files.
//!
//! A dataset is a JSON object in the working directory mapping sizes (as
//! string keys) to prices:
//!
//! ```text
//! // cod prices, summer
//! {
//!   "10": 5.0,
//!   "20": 12.0,
//!   "30": 21.0,
//! }
//! ```
//!
//! Files are named `<id>.json5` (preferred) or `<id>.json` and are read as
//! JSON5 (comments, trailing commas, single quotes). Keys are kept as written
//! and in file order, repeated keys included; `SampleSet` parses them and
//! applies the duplicate policy.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;
use tracing::debug;

use crate::app::engine::DatasetProvider;
use crate::data::RawRecords;
use crate::error::{LoadError, SampleError};

/// Extensions tried, in order, for a dataset id.
pub const DATASET_EXTENSIONS: [&str; 2] = ["json5", "json"];

/// Reads `<dir>/<id>.json5` / `<dir>/<id>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    dir: PathBuf,
}

impl DirectoryProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// First existing file for `id`, if any.
    pub fn resolve(&self, id: &str) -> Option<PathBuf> {
        DATASET_EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{id}.{ext}")))
            .find(|p| p.is_file())
    }
}

impl DatasetProvider for DirectoryProvider {
    fn fetch(&self, id: &str) -> Result<RawRecords, LoadError> {
        let path = self.resolve(id).ok_or_else(|| LoadError::Source {
            id: id.to_string(),
            message: format!("no {id}.json5 or {id}.json in '{}'", self.dir.display()),
        })?;
        debug!(path = %path.display(), "reading dataset");

        let text = fs::read_to_string(&path).map_err(|e| LoadError::Source {
            id: id.to_string(),
            message: format!("{}: {e}", path.display()),
        })?;
        parse_records(id, &text)
    }
}

/// Parse dataset text into records, in file order with duplicates kept.
pub fn parse_records(id: &str, text: &str) -> Result<RawRecords, LoadError> {
    let Entries(entries) = json5::from_str::<Entries>(text).map_err(|e| LoadError::Source {
        id: id.to_string(),
        message: format!("invalid dataset JSON5: {e}"),
    })?;

    entries
        .into_iter()
        .map(|(key, value)| match value.as_f64() {
            Some(v) => Ok((key, v)),
            None => Err(LoadError::Sample(SampleError::Parse {
                what: "price",
                raw: value.to_string(),
                expected: "a number",
            })),
        })
        .collect()
}

/// Top-level object entries as written. A map type would fold repeated keys
/// before the duplicate policy sees them.
struct Entries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for Entries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(EntriesVisitor)
    }
}

struct EntriesVisitor;

impl<'de> Visitor<'de> for EntriesVisitor {
    type Value = Entries;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping sizes to prices")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Entries, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(entry) = access.next_entry::<String, Value>()? {
            entries.push(entry);
        }
        Ok(Entries(entries))
    }
}

/// Dataset ids available in `dir` (sorted, de-duplicated across extensions).
pub fn list_datasets(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut ids: Vec<String> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| DATASET_EXTENSIONS.iter().any(|d| d.eq_ignore_ascii_case(ext)))
        })
        .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .collect();
    ids.sort();
    ids.dedup();
    ids
}
