use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches};
use crossbeam_channel::{unbounded, Receiver};

use topids::decompression::{maybe_decompress, open_input};
use topids::profile::{profiled, ProfileReport};
use topids::readers::ChannelChunkSource;
use topids::{validate_k, DiscardReporter, TopK, TopKError};

mod cli;
mod config;
mod config_file;
mod formatters;
mod platform;
mod tty;

use cli::{Cli, StatsFormat};
use config::TopIdsConfig;
use config_file::ConfigFile;
use formatters::create_formatter;
use platform::{Ctrl, ExitCode, SafeStderr, SafeStdout, ShutdownSignal, SignalHandler};

/// Open the input (file or stdin) and stream it from a background reader thread
fn open_chunks(config: &TopIdsConfig, ctrl_rx: Receiver<Ctrl>) -> Result<ChannelChunkSource<Ctrl>> {
    let reader = match config.input_path() {
        Some(path) => {
            open_input(path)
                .with_context(|| format!("Failed to open input file '{}'", path))?
                .1
        }
        None => maybe_decompress(std::io::stdin()).context("Failed to read stdin")?.1,
    };

    let source = ChannelChunkSource::spawn(reader, config.input.chunk_size)
        .context("Failed to start input reader")?;
    Ok(source.with_shutdown(ctrl_rx))
}

fn run(config: &TopIdsConfig, k: i64, ctrl_rx: Receiver<Ctrl>) -> Result<TopK> {
    let chunks = open_chunks(config, ctrl_rx)?;

    let mut reporter = DiscardReporter::new(config.discard_style(), SafeStderr::new());
    let result = config.request(k).run_chunks(chunks, &mut reporter)?;
    reporter.finish().context("Failed to write discard summary")?;

    Ok(result)
}

fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    match error.downcast_ref::<TopKError>() {
        Some(e) if e.is_interrupted() => SignalHandler::received()
            .map(ShutdownSignal::exit_code)
            .unwrap_or(ExitCode::SignalInt),
        Some(TopKError::InvalidParameter(_)) => ExitCode::InvalidUsage,
        _ => ExitCode::GeneralError,
    }
}

fn write_output(config: &TopIdsConfig, result: &TopK) -> Result<()> {
    let formatter = create_formatter(config.output.format, config.input.separator);
    let mut stdout = SafeStdout::new();
    for line in formatter.format(result.records()) {
        stdout.writeln(&line)?;
    }
    stdout.flush()
}

fn write_diagnostics(
    config: &TopIdsConfig,
    stderr: &mut SafeStderr,
    result: &TopK,
    profile: Option<ProfileReport>,
) -> Result<()> {
    if config.diagnostics.stats {
        let stats = result.stats();
        let line = match config.diagnostics.stats_format {
            StatsFormat::Table => stats.format_stats(),
            StatsFormat::Json => {
                serde_json::to_string(stats).context("Failed to serialize stats")?
            }
        };
        stderr.writeln(&config.format_error_message(&line))?;
    }

    if let Some(mut report) = profile {
        report.peak_buffer_bytes = Some(result.stats().peak_buffer_bytes);
        stderr.writeln(&config.format_error_message(&report.format()))?;
    }

    Ok(())
}

fn main() -> Result<()> {
    // Shutdown requests from the signal handler reach the reader loop here
    let (ctrl_tx, ctrl_rx) = unbounded::<Ctrl>();

    let _signal_handler = match SignalHandler::new(ctrl_tx) {
        Ok(handler) => handler,
        Err(e) => {
            eprintln!("topids: Failed to initialize signal handling: {}", e);
            ExitCode::GeneralError.exit();
        }
    };

    let mut stderr = SafeStderr::new();
    let cli = process_args_with_config(&mut stderr);
    let config = TopIdsConfig::from_cli(&cli);

    let (outcome, profile) = profiled(config.diagnostics.profile, || {
        run(&config, cli.top, ctrl_rx)
    });

    let result = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            let code = exit_code_for(&e);
            let message = if matches!(code, ExitCode::SignalInt | ExitCode::SignalTerm) {
                "Processing interrupted".to_string()
            } else {
                format!("Error: {:#}", e)
            };
            stderr
                .writeln(&config.format_error_message(&message))
                .unwrap_or(());
            code.exit();
        }
    };

    if let Err(e) = write_output(&config, &result) {
        stderr
            .writeln(&config.format_error_message(&format!("Error: {:#}", e)))
            .unwrap_or(());
        ExitCode::GeneralError.exit();
    }

    write_diagnostics(&config, &mut stderr, &result, profile)?;

    ExitCode::Success.exit();
}

/// Extract --config-file argument from raw args
fn extract_config_file_arg(args: &[String]) -> Option<String> {
    args.iter()
        .position(|arg| arg == "--config-file")
        .and_then(|i| args.get(i + 1).cloned())
}

fn process_args_with_config(stderr: &mut SafeStderr) -> Cli {
    let raw_args: Vec<String> = std::env::args().collect();

    if raw_args.iter().any(|arg| arg == "--show-config") {
        ConfigFile::show_config();
        ExitCode::Success.exit();
    }

    let processed_args = if raw_args.iter().any(|arg| arg == "--ignore-config") {
        raw_args
    } else {
        let config_file_path = extract_config_file_arg(&raw_args);
        match ConfigFile::load_with_custom_path(config_file_path.as_deref()) {
            Ok(config_file) => match config_file.process_args(raw_args) {
                Ok(processed) => processed,
                Err(e) => {
                    stderr
                        .writeln(&format!("topids: Config error: {:#}", e))
                        .unwrap_or(());
                    ExitCode::GeneralError.exit();
                }
            },
            Err(e) => {
                stderr
                    .writeln(&format!("topids: Config file error: {:#}", e))
                    .unwrap_or(());
                ExitCode::GeneralError.exit();
            }
        }
    };

    let matches = Cli::command().get_matches_from(processed_args);
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => {
            stderr.writeln(&format!("topids: Error: {}", e)).unwrap_or(());
            ExitCode::InvalidUsage.exit();
        }
    };

    // K is checked before the input is touched, even when only usage would be shown
    if let Err(e) = validate_k(cli.top) {
        stderr.writeln(&format!("topids: Error: {}", e)).unwrap_or(());
        ExitCode::InvalidUsage.exit();
    }

    // Show usage if on TTY and no input file provided (but not if "-" is explicitly specified)
    if tty::is_stdin_tty() && cli.file.is_none() {
        println!("{}", Cli::command().render_usage());
        println!("Print the K identifiers with the highest values from an id_value record stream");
        println!("Try 'topids --help' for more information.");
        ExitCode::Success.exit();
    }

    cli
}
