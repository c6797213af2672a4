//! sitefmt - Concurrent Batch Formatter for Generated Sites
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use sitefmt::config::{CliArgs, Command, FormatArgs, FormatConfig};
use sitefmt::pipeline::{FormatCoordinator, RunReport};
use sitefmt::progress::{print_header, print_summary, NoProgress, ProgressReporter, ProgressSink};
use sitefmt::transform::Tidy;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    if let Err(e) = setup_logging(args.verbose) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<ExitCode> {
    match args.command {
        Command::Format(format_args) => run_format(format_args),
        #[cfg(feature = "server")]
        Command::Serve(serve_args) => run_serve(serve_args),
    }
}

/// Format every matching file and print the summary
fn run_format(args: FormatArgs) -> Result<ExitCode> {
    // Validate and create config
    let config = FormatConfig::from_args(args).context("Invalid configuration")?;

    if config.show_progress {
        print_header(
            &config.root.display().to_string(),
            config.worker_count,
            &config.suffix,
        );
    }

    let progress: Arc<dyn ProgressSink> = if config.show_progress {
        Arc::new(ProgressReporter::new())
    } else {
        Arc::new(NoProgress)
    };

    let json = config.json;
    let transform = Arc::new(Tidy::new(config.max_blank_lines));
    let report = FormatCoordinator::new(config, transform)
        .with_progress(progress)
        .run()
        .context("Format failed")?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to encode report")?
        );
    } else if report.is_empty() {
        println!("No files found to format.");
    } else {
        print_summary(&report);
    }

    if report.has_errors() {
        info!(errors = report.stats.errors, "Format completed with errors");
    }
    Ok(exit_code(&report))
}

/// Non-zero when any file failed
fn exit_code(report: &RunReport) -> ExitCode {
    if report.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Serve a directory until interrupted
#[cfg(feature = "server")]
fn run_serve(args: sitefmt::config::ServeArgs) -> Result<ExitCode> {
    let config = sitefmt::config::ServeConfig::from_args(args);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;

    runtime
        .block_on(sitefmt::server::serve(&config))
        .context("Server failed")?;

    Ok(ExitCode::SUCCESS)
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("sitefmt=debug,warn")
    } else {
        EnvFilter::new("sitefmt=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set up logging: {}", e))?;

    Ok(())
}
