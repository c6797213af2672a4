//! Configuration types for sitefmt
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation

use crate::error::ConfigError;
use clap::Parser;
use regex::Regex;
use std::path::PathBuf;

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 512;

/// Batch formatter and static file server for generated sites
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sitefmt",
    version,
    about = "Batch formatter and static file server for generated sites",
    long_about = "Formats every matching file under a directory in parallel, writing back only \
                  the files whose content changed.\n\n\
                  The 'serve' subcommand serves a built site with extension allow-listing \
                  and .html / index.html fallbacks.",
    after_help = "EXAMPLES:\n    \
        sitefmt format --dir sites\n    \
        sitefmt format --dir public -w 8 --exclude '/vendor/'\n    \
        sitefmt format --dir public --json -q\n    \
        sitefmt serve --dir public --port 8080"
)]
pub struct CliArgs {
    /// Verbose output (debug logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Format every matching file under a directory
    Format(FormatArgs),

    /// Serve a directory over HTTP
    #[cfg(feature = "server")]
    Serve(ServeArgs),
}

/// Arguments for the `format` subcommand
#[derive(clap::Args, Debug, Clone)]
pub struct FormatArgs {
    /// Directory to format
    #[arg(short, long, default_value = "sites", value_name = "DIR")]
    pub dir: PathBuf,

    /// Number of worker threads
    #[arg(
        short = 'w',
        long,
        default_value_t = default_workers(),
        value_name = "NUM"
    )]
    pub workers: usize,

    /// Only files whose name ends with this suffix are formatted
    #[arg(long, default_value = ".html", value_name = "SUFFIX")]
    pub suffix: String,

    /// Exclude paths matching pattern (can be repeated)
    #[arg(long = "exclude", value_name = "PATTERN", action = clap::ArgAction::Append)]
    pub exclude_patterns: Vec<String>,

    /// Maximum consecutive blank lines kept by the formatter
    #[arg(long, default_value = "1", value_name = "NUM")]
    pub max_blank_lines: usize,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `serve` subcommand
#[cfg(feature = "server")]
#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Directory to serve files from
    #[arg(short, long, default_value = "public", value_name = "DIR")]
    pub dir: PathBuf,

    /// Port to serve on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: String,
}

fn default_workers() -> usize {
    num_cpus::get()
}

/// Validated runtime configuration for a format run
#[derive(Debug, Clone)]
pub struct FormatConfig {
    /// Root directory to walk
    pub root: PathBuf,

    /// Number of worker threads (also the task queue capacity)
    pub worker_count: usize,

    /// File name suffix filter
    pub suffix: String,

    /// Compiled exclude patterns
    pub exclude_patterns: Vec<Regex>,

    /// Blank line limit for the tidy formatter
    pub max_blank_lines: usize,

    /// Show progress indicator
    pub show_progress: bool,

    /// Emit JSON instead of the styled summary
    pub json: bool,
}

impl FormatConfig {
    /// Create a configuration with defaults for everything but the root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            worker_count: default_workers(),
            suffix: ".html".to_string(),
            exclude_patterns: Vec::new(),
            max_blank_lines: 1,
            show_progress: false,
            json: false,
        }
    }

    /// Override the worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.worker_count = workers;
        self
    }

    /// Override the suffix filter
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: FormatArgs) -> Result<Self, ConfigError> {
        // Validate worker count
        validate_workers(args.workers)?;

        if args.suffix.is_empty() {
            return Err(ConfigError::EmptySuffix);
        }

        if args.max_blank_lines == 0 {
            return Err(ConfigError::InvalidBlankLines(args.max_blank_lines));
        }

        // Compile exclude patterns
        let exclude_patterns = args
            .exclude_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| ConfigError::InvalidExcludePattern {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            root: args.dir,
            worker_count: args.workers,
            suffix: args.suffix,
            exclude_patterns,
            max_blank_lines: args.max_blank_lines,
            show_progress: !args.quiet && !args.json,
            json: args.json,
        })
    }

    /// Check that the worker count is in range
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_workers(self.worker_count)
    }

    /// Check if a path should be excluded
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude_patterns.iter().any(|re| re.is_match(path))
    }
}

fn validate_workers(count: usize) -> Result<(), ConfigError> {
    if count == 0 || count > MAX_WORKERS {
        return Err(ConfigError::InvalidWorkerCount {
            count,
            max: MAX_WORKERS,
        });
    }
    Ok(())
}

/// Validated runtime configuration for the static file server
#[cfg(feature = "server")]
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Root directory served
    pub root: PathBuf,

    /// Bind address
    pub bind: String,

    /// Listening port
    pub port: u16,
}

#[cfg(feature = "server")]
impl ServeConfig {
    /// Create configuration from CLI arguments
    pub fn from_args(args: ServeArgs) -> Self {
        Self {
            root: args.dir,
            bind: args.bind,
            port: args.port,
        }
    }
}
