use crate::cli::{Cli, OnDiscard, OutputFormat, StatsFormat};
use topids::{DiscardReportStyle, TopKRequest};

/// Main configuration struct for topids
#[derive(Debug, Clone)]
pub struct TopIdsConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub diagnostics: DiagnosticsConfig,
}

#[derive(Debug, Clone)]
pub struct InputConfig {
    /// `None` (or `-`) reads stdin
    pub file: Option<String>,
    pub separator: char,
    pub chunk_size: usize,
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub sorted: bool,
}

#[derive(Debug, Clone)]
pub struct DiagnosticsConfig {
    pub on_discard: OnDiscard,
    pub stats: bool,
    pub stats_format: StatsFormat,
    pub profile: bool,
    pub quiet: bool,
}

impl TopIdsConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            input: InputConfig {
                file: cli.file.clone(),
                separator: cli.separator,
                chunk_size: cli.chunk_size,
            },
            output: OutputConfig {
                format: cli.output_format,
                sorted: cli.sorted,
            },
            diagnostics: DiagnosticsConfig {
                on_discard: cli.on_discard,
                stats: cli.stats,
                stats_format: cli.stats_format,
                profile: cli.profile,
                quiet: cli.quiet,
            },
        }
    }

    /// Path to read, or `None` for stdin
    pub fn input_path(&self) -> Option<&str> {
        self.input.file.as_deref().filter(|path| *path != "-")
    }

    /// `--quiet` silences discard reporting regardless of `--on-discard`
    pub fn discard_style(&self) -> DiscardReportStyle {
        if self.diagnostics.quiet {
            return DiscardReportStyle::Off;
        }
        match self.diagnostics.on_discard {
            OnDiscard::Print => DiscardReportStyle::Print,
            OnDiscard::Summary => DiscardReportStyle::Summary,
            OnDiscard::Off => DiscardReportStyle::Off,
        }
    }

    pub fn request(&self, k: i64) -> TopKRequest {
        TopKRequest::new(k)
            .chunk_size(self.input.chunk_size)
            .field_separator(self.input.separator)
            .sorted(self.output.sorted)
    }

    pub fn format_error_message(&self, message: &str) -> String {
        format!("topids: {}", message)
    }
}
