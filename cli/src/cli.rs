use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "oxclassify")]
/// Classification of logical definitions with EL++ reasoning
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
    /// Format of the log lines written to stderr
    ///
    /// The verbosity is set with the `RUST_LOG` environment variable, `info` by default.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Subcommand)]
pub enum Command {
    /// Classify a set of logical definitions
    ///
    /// The taxonomy is written to the standard output as JSON.
    Classify {
        /// JSON file with the logical definitions to classify
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[command(flatten)]
        options: ClassifyOptions,
    },
    /// Classify a set of logical definitions then apply a batch of changes to the classification
    ///
    /// The changes file is a JSON object with a `deleted` array of concept ids and an `updated` array of logical definitions.
    /// The taxonomy after the changes is written to the standard output as JSON.
    Incremental {
        /// JSON file with the logical definitions to classify first
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// JSON file with the changes to apply
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        changes: PathBuf,
        #[command(flatten)]
        options: ClassifyOptions,
    },
}

#[derive(clap::Args)]
pub struct ClassifyOptions {
    /// Reasoner backend to use
    #[arg(short, long, value_enum, default_value_t = BackendArg::Native)]
    pub backend: BackendArg,
    /// Number of extraction threads
    ///
    /// By default, the number of available cores is used.
    #[arg(short, long)]
    pub threads: Option<usize>,
    /// Also output the necessary normal form of each concept
    #[arg(long)]
    pub inferred: bool,
    /// File to write the results to
    ///
    /// By default, the standard output is used.
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BackendArg {
    /// Direct translation to the saturation engine
    Native,
    /// OWL 2 EL axioms loaded into the reasoner
    Formal,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}
