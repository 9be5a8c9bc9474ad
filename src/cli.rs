// CLI-specific types and structures
// This module contains the command-line interface definitions

use clap::Parser;

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One identifier per line
    #[default]
    Default,
    /// One `id_value` record per line
    Records,
    /// `{"top_ids": [...]}`
    Json,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OnDiscard {
    /// Warn about every discarded line on stderr
    #[default]
    Print,
    /// Print counts and examples per reason when done
    Summary,
    /// Stay silent
    Off,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatsFormat {
    #[default]
    Table,
    Json,
}

// CLI structure - contains all command-line arguments and options
#[derive(Parser, Debug)]
#[command(name = "topids")]
#[command(about = "Print the K identifiers with the highest values from an id_value record stream")]
#[command(
    long_about = "Print the K identifiers with the highest values from an id_value record stream\n\nInput is newline-separated records of the form <identifier>_<integer>.\nMalformed lines are reported and skipped. The input is streamed in fixed-size\nchunks and only K candidates are kept in memory. Gzip and zstd input is\ndecompressed automatically.\n\nEXAMPLES:\n  topids -k 10 data.txt\n  topids -k 3 -F json < data.txt.gz\n  topids -k 5 --sorted -F records --on-discard summary data.txt"
)]
#[command(version)]
#[command(args_override_self = true)]
pub struct Cli {
    /// Input file (stdin if not specified, or use "-" to explicitly specify stdin)
    pub file: Option<String>,

    /// Number of identifiers to return (must be a positive integer)
    #[arg(
        short = 'k',
        long = "top",
        allow_negative_numbers = true,
        help_heading = "Selection Options"
    )]
    pub top: i64,

    /// Field separator between identifier and value
    #[arg(long = "separator", default_value_t = '_', help_heading = "Input Options")]
    pub separator: char,

    /// Bytes read per chunk
    #[arg(
        long = "chunk-size",
        default_value_t = topids::DEFAULT_CHUNK_SIZE,
        value_parser = parse_chunk_size,
        help_heading = "Input Options"
    )]
    pub chunk_size: usize,

    /// Output format
    #[arg(
        short = 'F',
        long = "output-format",
        value_enum,
        default_value = "default",
        help_heading = "Output Options"
    )]
    pub output_format: OutputFormat,

    /// Order results by value, highest first (ties in input order)
    #[arg(long = "sorted", help_heading = "Output Options")]
    pub sorted: bool,

    /// How to report lines that are not valid records
    #[arg(
        long = "on-discard",
        value_enum,
        default_value = "print",
        help_heading = "Diagnostics"
    )]
    pub on_discard: OnDiscard,

    /// Print processing statistics to stderr
    #[arg(short = 's', long = "stats", help_heading = "Diagnostics")]
    pub stats: bool,

    /// Format for --stats
    #[arg(
        long = "stats-format",
        value_enum,
        default_value = "table",
        help_heading = "Diagnostics"
    )]
    pub stats_format: StatsFormat,

    /// Print elapsed time and memory usage to stderr
    #[arg(long = "profile", help_heading = "Diagnostics")]
    pub profile: bool,

    /// Suppress warnings and summaries (errors are still shown)
    #[arg(short = 'q', long = "quiet", help_heading = "Diagnostics")]
    pub quiet: bool,

    /// Use alias from configuration file
    #[arg(short = 'a', long = "alias", help_heading = "Configuration Options")]
    pub alias: Vec<String>,

    /// Specify custom configuration file path
    #[arg(long = "config-file", help_heading = "Configuration Options")]
    pub config_file: Option<String>,

    /// Show current configuration and search locations
    #[arg(long = "show-config", help_heading = "Configuration Options")]
    pub show_config: bool,

    /// Ignore configuration file
    #[arg(long = "ignore-config", help_heading = "Configuration Options")]
    pub ignore_config: bool,
}

fn parse_chunk_size(value: &str) -> Result<usize, String> {
    let size: usize = value
        .parse()
        .map_err(|_| format!("'{}' is not a byte count", value))?;
    if size == 0 {
        return Err("chunk size must be at least 1 byte".to_string());
    }
    Ok(size)
}
