//! Command-line parsing for the price curve fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::ModelFamily;

pub mod picker;
pub mod repl;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pricefit", version, about = "Fit price curves to size/price samples")]
pub struct Cli {
    /// Working directory holding config.properties and the datasets.
    #[arg(long, global = true, env = "PRICEFIT_DIR", default_value = "config")]
    pub dir: PathBuf,

    /// Model family to fit, overriding `curveFitterType` from the config file.
    #[arg(long, global = true, value_enum)]
    pub family: Option<ModelFamily>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the interactive command loop (default).
    Repl(ReplArgs),
    /// Print the fitted price for one or more sizes.
    Eval(EvalArgs),
    /// Print the fitted function, its degree and the samples.
    Describe(DatasetArgs),
    /// Write the fitted function to the export folder.
    Export(DatasetArgs),
    /// Draw the samples and the fitted function in the terminal.
    Plot(PlotArgs),
}

/// Options for the interactive loop.
#[derive(Debug, Parser, Clone)]
pub struct ReplArgs {
    /// Dataset to load first; without it a picker lists the available ones.
    #[arg(short, long)]
    pub dataset: Option<String>,
}

/// Options naming a dataset.
#[derive(Debug, Parser, Clone)]
pub struct DatasetArgs {
    /// Dataset name (file name without extension).
    #[arg(short, long)]
    pub dataset: String,
}

/// Options for one-shot evaluation.
#[derive(Debug, Parser, Clone)]
pub struct EvalArgs {
    #[command(flatten)]
    pub target: DatasetArgs,

    /// Sizes to price.
    #[arg(required = true, allow_negative_numbers = true)]
    pub sizes: Vec<f64>,
}

/// Options for plotting.
#[derive(Debug, Parser, Clone)]
pub struct PlotArgs {
    #[command(flatten)]
    pub target: DatasetArgs,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}
