use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "motifval - validates occurrences of small chemical motifs in macromolecular structures against their reference models.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads of the global thread pool.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate every candidate of a job file against its model and write CSV reports.
    Validate(ValidateArgs),
}

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    // --- Core Arguments ---
    /// Path to the validation job in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Directory the CSV reports are written to.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Geometry Overrides ---
    /// Override the longest ring, in atoms, considered by ring perception.
    #[arg(long, value_name = "INT")]
    pub max_ring_length: Option<usize>,

    /// Override the search radius for hydrogen bonding partners, in Angstroms.
    #[arg(long, value_name = "FLOAT")]
    pub hydrogen_bonding_radius: Option<f64>,

    /// Override the length below which a bond is suspicious, in Angstroms.
    #[arg(long, value_name = "FLOAT")]
    pub min_bond_length: Option<f64>,

    /// Override the planarity threshold, in degrees.
    #[arg(long, value_name = "DEGREES")]
    pub planarity_threshold: Option<f64>,

    // --- Matching Overrides ---
    /// Keep hydrogen atoms instead of stripping them before the comparison.
    #[arg(long)]
    pub keep_hydrogens: bool,

    /// Only pair atoms of identical elements when extending a pairing.
    #[arg(long)]
    pub no_substitutions: bool,

    // --- Parallelism Overrides ---
    /// Override the number of candidates analysed at once per model.
    #[arg(long, value_name = "INT")]
    pub candidate_parallelism: Option<usize>,

    /// Override the number of models analysed at once.
    #[arg(long, value_name = "INT")]
    pub model_parallelism: Option<usize>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S geometry.max-ring-length=7
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
