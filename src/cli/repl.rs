//! Interactive command loop.
//!
//! Reads whitespace-separated tokens and answers each one:
//!
//! - a number evaluates the current function at that size
//! - a command name runs the command (`help` lists them)
//! - anything else prints a hint
//!
//! Errors from the engine are printed and the loop keeps going; only I/O
//! failures on the terminal itself end it early.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use tracing::{debug, info};

use crate::app::engine::{DatasetProvider, Engine};
use crate::domain::ModelFamily;
use crate::error::{AppError, EngineError};
use crate::io::config::load_config;
use crate::io::export::write_export;
use crate::plot::render_ascii_plot;
use crate::report::{fmt_vec, format_price, format_values};

const PLOT_WIDTH: usize = 72;
const PLOT_HEIGHT: usize = 20;

/// One parsed input token.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Print,
    Sizes,
    Prices,
    Degree,
    Coefficients,
    Values,
    Family,
    Plot,
    Reload,
    /// `load <id>`; the id may follow on a later line.
    Load(Option<String>),
    Export,
    Help,
    Exit,
    Evaluate(f64),
    Invalid(String),
}

/// Command names and their help text, in help order.
pub const COMMANDS: [(&str, &str); 13] = [
    ("print", "show the fitted function"),
    ("sizes", "list sample sizes"),
    ("prices", "list sample prices"),
    ("degree", "show the function degree"),
    ("coefficients", "list function coefficients"),
    ("values", "list size=price samples"),
    ("family", "show the model family"),
    ("plot", "draw samples and function"),
    ("reload", "re-read and re-fit the current dataset"),
    ("load", "load another dataset: load <name>"),
    ("export", "write the function to the export folder"),
    ("help", "show this list"),
    ("exit", "quit"),
];

impl ReplCommand {
    /// Parse a single token. `load` alone asks for the id separately.
    pub fn parse(token: &str) -> Self {
        match token.to_ascii_lowercase().as_str() {
            "print" => Self::Print,
            "sizes" => Self::Sizes,
            "prices" => Self::Prices,
            "degree" => Self::Degree,
            "coefficients" => Self::Coefficients,
            "values" => Self::Values,
            "family" => Self::Family,
            "plot" => Self::Plot,
            "reload" => Self::Reload,
            "load" => Self::Load(None),
            "export" => Self::Export,
            "help" => Self::Help,
            "exit" => Self::Exit,
            _ => match token.parse::<f64>() {
                Ok(x) if x.is_finite() => Self::Evaluate(x),
                _ => Self::Invalid(token.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Whitespace tokenizer over line-based input.
struct Tokens<R> {
    input: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> Tokens<R> {
    fn new(input: R) -> Self {
        Self {
            input,
            pending: VecDeque::new(),
        }
    }

    /// Next token, or `None` at end of input.
    fn next(&mut self) -> Result<Option<String>, AppError> {
        while self.pending.is_empty() {
            let mut line = String::new();
            let bytes = self
                .input
                .read_line(&mut line)
                .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;
            if bytes == 0 {
                return Ok(None);
            }
            self.pending.extend(line.split_whitespace().map(str::to_string));
        }
        Ok(self.pending.pop_front())
    }
}

/// Interactive session around an engine.
pub struct Repl<P> {
    engine: Engine<P>,
    dir: PathBuf,
    family_override: Option<ModelFamily>,
}

impl<P: DatasetProvider> Repl<P> {
    /// `dir` holds `config.properties` and receives exports.
    pub fn new(engine: Engine<P>, dir: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            dir: dir.into(),
            family_override: None,
        }
    }

    /// Use `family` for every load instead of `curveFitterType`.
    pub fn with_family_override(mut self, family: Option<ModelFamily>) -> Self {
        self.family_override = family;
        self
    }

    pub fn engine(&self) -> &Engine<P> {
        &self.engine
    }

    /// Load `id` with the current contents of `config.properties`.
    pub fn load(&mut self, id: &str) -> Result<(), AppError> {
        let mut config = load_config(&self.dir)?;
        if let Some(family) = self.family_override {
            config.model_family = family;
        }
        self.engine.load(id, &config)?;
        Ok(())
    }

    /// Answer tokens from `input` until `exit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<(), AppError> {
        let mut tokens = Tokens::new(input);
        writeln!(out, "Enter a size to get its price, or a command (help lists them).").map_err(write_failed)?;

        loop {
            write!(out, "> ").map_err(write_failed)?;
            out.flush().map_err(write_failed)?;

            let Some(token) = tokens.next()? else {
                debug!("end of input");
                return Ok(());
            };

            let command = match ReplCommand::parse(&token) {
                ReplCommand::Load(None) => {
                    write!(out, "Dataset name: ").map_err(write_failed)?;
                    out.flush().map_err(write_failed)?;
                    match tokens.next()? {
                        Some(id) => ReplCommand::Load(Some(id)),
                        None => return Ok(()),
                    }
                }
                other => other,
            };

            match self.execute(command, out) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => return Ok(()),
                Err(err) => writeln!(out, "Error: {err}").map_err(write_failed)?,
            }
        }
    }

    fn execute<W: Write>(&mut self, command: ReplCommand, out: &mut W) -> Result<Flow, AppError> {
        match command {
            ReplCommand::Print => {
                let function = self.engine.function()?;
                writeln!(out, "Function: {function}").map_err(write_failed)?;
            }
            ReplCommand::Sizes => {
                let d = self.engine.describe()?;
                writeln!(out, "Sizes: {}", fmt_vec(&d.xs)).map_err(write_failed)?;
            }
            ReplCommand::Prices => {
                let d = self.engine.describe()?;
                writeln!(out, "Prices: {}", fmt_vec(&d.ys)).map_err(write_failed)?;
            }
            ReplCommand::Degree => {
                let d = self.engine.describe()?;
                writeln!(out, "Function Degree: {}", d.degree).map_err(write_failed)?;
            }
            ReplCommand::Coefficients => {
                let d = self.engine.describe()?;
                writeln!(out, "Function Coefficients: {}", fmt_vec(&d.coefficients)).map_err(write_failed)?;
            }
            ReplCommand::Values => {
                let state = self.engine.state().ok_or(EngineError::NoFunctionLoaded)?;
                writeln!(out, "Function Values: {}", format_values(state.samples.samples())).map_err(write_failed)?;
            }
            ReplCommand::Family => {
                let d = self.engine.describe()?;
                writeln!(out, "Family: {}", d.family).map_err(write_failed)?;
            }
            ReplCommand::Plot => {
                let state = self.engine.state().ok_or(EngineError::NoFunctionLoaded)?;
                let plot = render_ascii_plot(&state.samples, &state.function, PLOT_WIDTH, PLOT_HEIGHT);
                write!(out, "{plot}").map_err(write_failed)?;
            }
            ReplCommand::Reload => {
                let degree = self.engine.reload()?.degree();
                let id = self.engine.describe()?.dataset;
                writeln!(out, "Reloaded '{id}' (degree {degree})").map_err(write_failed)?;
            }
            ReplCommand::Load(id) => {
                let id = id.unwrap_or_default();
                self.load(&id)?;
                let degree = self.engine.function()?.degree();
                writeln!(out, "Loaded '{id}' (degree {degree})").map_err(write_failed)?;
            }
            ReplCommand::Export => {
                let text = self.engine.export()?;
                let d = self.engine.describe()?;
                let path = write_export(&self.dir, &d.dataset, d.family, &text)?;
                writeln!(out, "Exported to {}", path.display()).map_err(write_failed)?;
            }
            ReplCommand::Help => {
                writeln!(out, "Enter a size to get its price, or one of:").map_err(write_failed)?;
                for (name, about) in COMMANDS {
                    writeln!(out, "  {name:<13} {about}").map_err(write_failed)?;
                }
            }
            ReplCommand::Exit => {
                info!("exiting");
                writeln!(out, "Goodbye!").map_err(write_failed)?;
                return Ok(Flow::Exit);
            }
            ReplCommand::Evaluate(x) => {
                let y = self.engine.evaluate(x)?;
                writeln!(out, "{}", format_price(x, y)).map_err(write_failed)?;
            }
            ReplCommand::Invalid(token) => {
                writeln!(out, "Invalid input '{token}'. Enter a size or a command (help lists them).")
                    .map_err(write_failed)?;
            }
        }
        Ok(Flow::Continue)
    }
}

fn write_failed(e: io::Error) -> AppError {
    AppError::new(2, format!("Failed to write output: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::engine::MemoryProvider;
    use std::fs;
    use std::io::Cursor;

    fn provider() -> MemoryProvider {
        let mut p = MemoryProvider::new();
        p.insert("fish", [("10", 5.0), ("20", 12.0), ("30", 21.0)]);
        p.insert("line", [("1", 2.0), ("2", 4.0)]);
        p
    }

    fn session(script: &str) -> (String, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut repl = Repl::new(Engine::new(provider()), dir.path());
        repl.load("fish").unwrap();

        let mut out = Vec::new();
        repl.run(Cursor::new(script.to_string()), &mut out).unwrap();
        (String::from_utf8(out).unwrap(), dir)
    }

    #[test]
    fn parses_commands_and_numbers() {
        assert_eq!(ReplCommand::parse("EXIT"), ReplCommand::Exit);
        assert_eq!(ReplCommand::parse("load"), ReplCommand::Load(None));
        assert_eq!(ReplCommand::parse("15"), ReplCommand::Evaluate(15.0));
        assert_eq!(ReplCommand::parse("2.5"), ReplCommand::Evaluate(2.5));
        assert_eq!(ReplCommand::parse("NaN"), ReplCommand::Invalid("NaN".into()));
        assert_eq!(ReplCommand::parse("fishy"), ReplCommand::Invalid("fishy".into()));
    }

    #[test]
    fn answers_queries_for_the_loaded_dataset() {
        let (out, _dir) = session("sizes prices\ndegree\nvalues\nfamily\n15\nnope\n");
        assert!(out.contains("Sizes: [10.0, 20.0, 30.0]"));
        assert!(out.contains("Prices: [5.0, 12.0, 21.0]"));
        assert!(out.contains("Function Degree: 2"));
        assert!(out.contains("Function Values: {10.0=5.0, 20.0=12.0, 30.0=21.0}"));
        assert!(out.contains("Family: polynomial"));
        assert!(out.contains("Price for size 15.0: "));
        assert!(out.contains("(rounded: 8)"));
        assert!(out.contains("Invalid input 'nope'"));
    }

    #[test]
    fn load_takes_id_on_same_or_next_line() {
        let (out, _dir) = session("load line\n3\nload\nfish\ndegree\n");
        assert!(out.contains("Loaded 'line' (degree 1)"));
        assert!(out.contains("(rounded: 6)"));
        assert!(out.contains("Loaded 'fish' (degree 2)"));
    }

    #[test]
    fn failed_load_is_reported_and_keeps_function() {
        let (out, _dir) = session("load pike\nsizes\n");
        assert!(out.contains("Error: Failed to read dataset 'pike'"));
        assert!(out.contains("Sizes: [10.0, 20.0, 30.0]"));
    }

    #[test]
    fn exit_stops_reading() {
        let (out, _dir) = session("exit\nsizes\n");
        assert!(out.contains("Goodbye!"));
        assert!(!out.contains("Sizes:"));
    }

    #[test]
    fn export_writes_into_export_folder() {
        let (out, dir) = session("export\n");
        assert!(out.contains("Exported to "));

        let files: Vec<_> = fs::read_dir(dir.path().join("export")).unwrap().flatten().collect();
        assert_eq!(files.len(), 1);
        let text = fs::read_to_string(files[0].path()).unwrap();
        assert!(text.contains("Function Degree: 2"));
        assert!(files[0].file_name().to_string_lossy().starts_with("fish_func_export_polynomial_"));
    }

    #[test]
    fn load_reads_config_file_each_time() {
        let dir = tempfile::tempdir().unwrap();
        let mut repl = Repl::new(Engine::new(provider()), dir.path());

        fs::write(dir.path().join("config.properties"), "auto=false\ndegree=1\n").unwrap();
        repl.load("fish").unwrap();
        assert_eq!(repl.engine().function().unwrap().degree(), 1);

        fs::write(dir.path().join("config.properties"), "auto=true\n").unwrap();
        repl.load("fish").unwrap();
        assert_eq!(repl.engine().function().unwrap().degree(), 2);
    }

    #[test]
    fn family_override_beats_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.properties"), "curveFitterType=harmonic\n").unwrap();
        let mut repl = Repl::new(Engine::new(provider()), dir.path())
            .with_family_override(Some(ModelFamily::Polynomial));
        repl.load("fish").unwrap();
        assert_eq!(repl.engine().describe().unwrap().family, ModelFamily::Polynomial);
    }

    #[test]
    fn queries_without_a_load_print_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut repl = Repl::new(Engine::new(provider()), dir.path());
        let mut out = Vec::new();
        repl.run(Cursor::new("print\n10\n".to_string()), &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.matches("Error: No function loaded yet").count(), 2);
    }
}
