//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs logging
//! - bootstraps the working directory and reads `config.properties`
//! - dispatches to the interactive loop or a one-shot command

use std::io::{self, Write};
use std::path::Path;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::repl::Repl;
use crate::cli::{Cli, Command, DatasetArgs, EvalArgs, PlotArgs, ReplArgs};
use crate::domain::{FitConfig, ModelFamily};
use crate::error::AppError;
use crate::io::config::{bootstrap, load_config};
use crate::io::dataset::DirectoryProvider;

pub mod engine;

use engine::Engine;

/// Entry point for the `pricefit` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine; it only supplies PRICEFIT_DIR / RUST_LOG.
    dotenvy::dotenv().ok();
    init_tracing();

    // `pricefit` and `pricefit -d cod` behave like `pricefit repl ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);

    bootstrap(&cli.dir)?;
    debug!(dir = %cli.dir.display(), "working directory ready");

    match cli.command {
        Command::Repl(args) => handle_repl(&cli.dir, cli.family, args),
        Command::Eval(args) => handle_eval(&cli.dir, cli.family, args),
        Command::Describe(args) => handle_describe(&cli.dir, cli.family, args),
        Command::Export(args) => handle_export(&cli.dir, cli.family, args),
        Command::Plot(args) => handle_plot(&cli.dir, cli.family, args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Ignore "already set" when embedded in a process that installed its own.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .with_target(false)
        .try_init();
}

fn handle_repl(dir: &Path, family: Option<ModelFamily>, args: ReplArgs) -> Result<(), AppError> {
    info!("Fish price calculator: sizes and prices are read from '{}'", dir.display());

    let id = match args.dataset {
        Some(id) => id,
        None => crate::cli::picker::prompt_for_dataset(dir)?,
    };

    let mut repl = Repl::new(Engine::new(DirectoryProvider::new(dir)), dir).with_family_override(family);
    repl.load(&id)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    repl.run(stdin.lock(), &mut stdout)
}

fn handle_eval(dir: &Path, family: Option<ModelFamily>, args: EvalArgs) -> Result<(), AppError> {
    let engine = load_engine(dir, family, &args.target)?;
    for x in args.sizes {
        let y = engine.evaluate(x)?;
        println!("{}", crate::report::format_price(x, y));
    }
    Ok(())
}

fn handle_describe(dir: &Path, family: Option<ModelFamily>, args: DatasetArgs) -> Result<(), AppError> {
    let engine = load_engine(dir, family, &args)?;
    let function = engine.function()?;
    println!("Function: {function}");
    print!("{}", crate::report::format_description(&engine.describe()?));
    io::stdout()
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write output: {e}")))
}

fn handle_export(dir: &Path, family: Option<ModelFamily>, args: DatasetArgs) -> Result<(), AppError> {
    let engine = load_engine(dir, family, &args)?;
    let text = engine.export()?;
    let function = engine.function()?;
    let path = crate::io::export::write_export(dir, &args.dataset, function.family(), &text)?;
    println!("{}", path.display());
    Ok(())
}

fn handle_plot(dir: &Path, family: Option<ModelFamily>, args: PlotArgs) -> Result<(), AppError> {
    let engine = load_engine(dir, family, &args.target)?;
    let state = engine.state().ok_or(crate::error::EngineError::NoFunctionLoaded)?;
    let plot = crate::plot::render_ascii_plot(&state.samples, &state.function, args.width, args.height);
    print!("{plot}");
    Ok(())
}

/// Read the config, apply the CLI family override and load one dataset.
fn load_engine(
    dir: &Path,
    family: Option<ModelFamily>,
    target: &DatasetArgs,
) -> Result<Engine<DirectoryProvider>, AppError> {
    let config = effective_config(load_config(dir)?, family);
    let mut engine = Engine::new(DirectoryProvider::new(dir));
    engine.load(&target.dataset, &config)?;
    Ok(engine)
}

fn effective_config(mut config: FitConfig, family: Option<ModelFamily>) -> FitConfig {
    if let Some(family) = family {
        config.model_family = family;
    }
    config
}

/// Rewrite argv so `pricefit` defaults to `pricefit repl`.
///
/// Rules:
/// - `pricefit`                       -> `pricefit repl`
/// - `pricefit -d cod ...`            -> `pricefit repl -d cod ...`
/// - `pricefit --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("repl".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if first_positional(&argv).is_some_and(is_subcommand) {
        return argv;
    }

    // Only flags (e.g. `--dir x -d cod`): run the loop with them.
    if arg1.starts_with('-') {
        argv.push("repl".to_string());
        let repl_flags = split_repl_flags(&mut argv);
        argv.extend(repl_flags);
        return argv;
    }

    argv
}

/// First token that is neither a flag nor the value of one.
fn first_positional(argv: &[String]) -> Option<&str> {
    let mut tokens = argv.iter().skip(1);
    while let Some(token) = tokens.next() {
        if takes_value(token) {
            tokens.next();
        } else if !token.starts_with('-') {
            return Some(token);
        }
    }
    None
}

/// Flags whose value is the following token (`--flag=value` is one token).
fn takes_value(flag: &str) -> bool {
    matches!(flag, "-d" | "--dataset" | "--dir" | "--family")
}

fn is_subcommand(arg: &str) -> bool {
    matches!(arg, "repl" | "eval" | "describe" | "export" | "plot")
}

/// Move `-d/--dataset <id>` behind the trailing `repl` token.
fn split_repl_flags(argv: &mut Vec<String>) -> Vec<String> {
    let mut moved = Vec::new();
    let mut i = 1;
    while i < argv.len() {
        let arg = argv[i].as_str();
        if arg == "-d" || arg == "--dataset" {
            let end = (i + 2).min(argv.len() - 1);
            moved.extend(argv.drain(i..end));
            continue;
        }
        if arg.starts_with("--dataset=") {
            moved.push(argv.remove(i));
            continue;
        }
        i += 1;
    }
    moved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_repl() {
        assert_eq!(rewrite_args(args(&["pricefit"])), args(&["pricefit", "repl"]));
    }

    #[test]
    fn explicit_subcommands_and_help_are_untouched() {
        let eval = args(&["pricefit", "--dir", "data", "eval", "-d", "cod", "10"]);
        assert_eq!(rewrite_args(eval.clone()), eval);
        assert_eq!(rewrite_args(args(&["pricefit", "--help"])), args(&["pricefit", "--help"]));
    }

    #[test]
    fn flags_only_become_repl_flags() {
        assert_eq!(
            rewrite_args(args(&["pricefit", "-d", "cod"])),
            args(&["pricefit", "repl", "-d", "cod"])
        );
        assert_eq!(
            rewrite_args(args(&["pricefit", "--dir", "data", "--dataset=cod"])),
            args(&["pricefit", "--dir", "data", "repl", "--dataset=cod"])
        );
        assert_eq!(
            rewrite_args(args(&["pricefit", "--family", "gaussian"])),
            args(&["pricefit", "--family", "gaussian", "repl"])
        );
    }

    #[test]
    fn flag_values_named_like_subcommands_stay_values() {
        assert_eq!(
            rewrite_args(args(&["pricefit", "-d", "plot"])),
            args(&["pricefit", "repl", "-d", "plot"])
        );
        assert_eq!(
            rewrite_args(args(&["pricefit", "--dir", "export", "--dataset", "eval"])),
            args(&["pricefit", "--dir", "export", "repl", "--dataset", "eval"])
        );
        let describe = args(&["pricefit", "--dir", "repl", "describe", "-d", "cod"]);
        assert_eq!(rewrite_args(describe.clone()), describe);
    }

    #[test]
    fn family_override_replaces_config_family() {
        let config = effective_config(FitConfig::default(), Some(ModelFamily::Harmonic));
        assert_eq!(config.model_family, ModelFamily::Harmonic);
        assert_eq!(effective_config(FitConfig::default(), None), FitConfig::default());
    }
}
