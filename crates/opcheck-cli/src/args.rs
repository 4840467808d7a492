use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the opcheck binary.
#[derive(Parser, Debug)]
#[command(
    name = "opcheck",
    version,
    about = "Rule-based analysis of serialized operation trees"
)]
pub struct CliArgs {
    /// Compilation unit files (`*.json`) or directories to search for them.
    /// Defaults to the current directory.
    pub inputs: Vec<PathBuf>,

    /// Path to an `opcheck.json` options file.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Output format for diagnostics.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Analyze method bodies one at a time.
    #[arg(long)]
    pub sequential: bool,

    /// Number of worker threads for concurrent analysis.
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Print the available rules and exit.
    #[arg(long = "list-rules")]
    pub list_rules: bool,

    /// Disable colored output.
    #[arg(long = "no-color")]
    pub no_color: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
