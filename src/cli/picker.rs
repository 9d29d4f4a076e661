//! Interactive dataset picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `pricefit` and choose a dataset" UX
//!
//! Datasets are the `*.json5` / `*.json` files in the working directory.

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::error::AppError;
use crate::io::dataset::list_datasets;

/// Prompt on stdin/stdout for a dataset in `dir`.
pub fn prompt_for_dataset(dir: &Path) -> Result<String, AppError> {
    let ids = list_datasets(dir);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    pick_dataset(&ids, dir, &mut stdin.lock(), &mut stdout)
}

/// Let the user choose one of `ids`.
///
/// Behavior:
/// - list the datasets
/// - accept either a number (from the list) or a dataset name
/// - `q` cancels
pub fn pick_dataset<R: BufRead, W: Write>(
    ids: &[String],
    dir: &Path,
    input: &mut R,
    out: &mut W,
) -> Result<String, AppError> {
    if ids.is_empty() {
        return Err(AppError::new(
            2,
            format!(
                "No datasets found in '{}'. Add a <name>.json5 file mapping sizes to prices.",
                dir.display()
            ),
        ));
    }

    let write_failed = |e: io::Error| AppError::new(2, format!("Failed to write prompt: {e}"));

    writeln!(out, "Found {} dataset(s) in '{}':", ids.len(), dir.display()).map_err(write_failed)?;
    for (idx, id) in ids.iter().enumerate() {
        writeln!(out, "{:>3}) {id}", idx + 1).map_err(write_failed)?;
    }

    loop {
        write!(out, "Select a dataset by number (1-{}) or name (q to quit): ", ids.len()).map_err(write_failed)?;
        out.flush().map_err(write_failed)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            return Err(AppError::new(
                2,
                "No input received. Pass a dataset with `pricefit repl --dataset <name>`.",
            ));
        }

        let choice = line.trim();
        if choice.eq_ignore_ascii_case("q") {
            return Err(AppError::new(2, "Canceled."));
        }

        if let Ok(n) = choice.parse::<usize>() {
            if (1..=ids.len()).contains(&n) {
                return Ok(ids[n - 1].clone());
            }
            writeln!(out, "Invalid choice: {n}. Enter a number between 1 and {}.", ids.len())
                .map_err(write_failed)?;
            continue;
        }

        match ids.iter().find(|id| id.as_str() == choice) {
            Some(id) => return Ok(id.clone()),
            None => writeln!(out, "Unknown dataset: '{choice}'.").map_err(write_failed)?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ids() -> Vec<String> {
        vec!["cod".to_string(), "eel".to_string()]
    }

    fn pick(script: &str) -> (Result<String, AppError>, String) {
        let mut out = Vec::new();
        let res = pick_dataset(&ids(), Path::new("config"), &mut Cursor::new(script.to_string()), &mut out);
        (res, String::from_utf8(out).unwrap())
    }

    #[test]
    fn picks_by_number_or_name() {
        assert_eq!(pick("2\n").0.unwrap(), "eel");
        assert_eq!(pick("cod\n").0.unwrap(), "cod");
    }

    #[test]
    fn reprompts_on_bad_choice() {
        let (res, out) = pick("7\npike\n1\n");
        assert_eq!(res.unwrap(), "cod");
        assert!(out.contains("Invalid choice: 7"));
        assert!(out.contains("Unknown dataset: 'pike'"));
    }

    #[test]
    fn cancel_and_eof_are_errors() {
        assert_eq!(pick("q\n").0.unwrap_err().exit_code(), 2);
        assert!(pick("").0.is_err());
    }

    #[test]
    fn empty_directory_is_an_error() {
        let mut out = Vec::new();
        let err = pick_dataset(&[], Path::new("config"), &mut Cursor::new(String::new()), &mut out).unwrap_err();
        assert!(err.to_string().contains("No datasets found"));
    }
}
