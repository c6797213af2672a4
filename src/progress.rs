//! Progress reporting for format runs
//!
//! The aggregator drives a [`ProgressSink`] one unit per file outcome.
//! [`ProgressReporter`] renders an indicatif bar; [`NoProgress`] is used in
//! quiet mode and tests. Sink methods cannot fail, so a broken terminal never
//! aborts a run.

use crate::pipeline::RunReport;
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Receives progress events from the pipeline
pub trait ProgressSink: Send + Sync {
    /// Called once with the number of files about to be processed
    fn start(&self, total: u64);

    /// Advance by `n` processed files
    fn advance(&self, n: u64);

    /// Finish the display with a final message
    fn finish(&self, message: &str);
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn start(&self, _total: u64) {}

    fn advance(&self, _n: u64) {}

    fn finish(&self, _message: &str) {}
}

/// Progress bar on stderr
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());

        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.green}] {pos}/{len} files ({per_sec}) {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );

        Self { bar }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ProgressReporter {
    fn start(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.enable_steady_tick(Duration::from_millis(100));
    }

    fn advance(&self, n: u64) {
        self.bar.inc(n);
    }

    fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a header at the start of the run
pub fn print_header(root: &str, workers: usize, suffix: &str) {
    println!();
    println!(
        "{} {}",
        style("sitefmt").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Source:").bold(), root);
    println!("  {} {}", style("Workers:").bold(), workers);
    println!("  {} *{}", style("Filter:").bold(), suffix);
    println!();
}

/// Render the summary block for a finished run
pub fn render_summary(report: &RunReport) -> String {
    let stats = &report.stats;
    let duration_secs = report.duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        stats.total() as f64 / duration_secs
    } else {
        0.0
    };

    let mut out = String::new();
    out.push('\n');
    out.push_str(&format!("{}\n", style("Summary").green().bold()));
    out.push_str(&format!("{}\n", style("─".repeat(50)).dim()));
    out.push_str(&format!(
        "  {} {} files\n",
        style("✓ Formatted:").green().bold(),
        format_number(stats.formatted)
    ));
    out.push_str(&format!(
        "  {} {} files\n",
        style("• Skipped:").bold(),
        format_number(stats.skipped)
    ));
    let errors_label = if stats.errors > 0 {
        style("✗ Errors:").red().bold()
    } else {
        style("✗ Errors:").bold()
    };
    out.push_str(&format!(
        "  {} {} files\n",
        errors_label,
        format_number(stats.errors)
    ));
    out.push_str(&format!(
        "  {} {}\n",
        style("Total Size:").bold(),
        format_size(stats.bytes_in, BINARY)
    ));
    out.push_str(&format!(
        "  {} {:.2}s ({:.0} files/sec)\n",
        style("Total time:").bold(),
        duration_secs,
        rate
    ));
    out
}

/// Render the summary followed by one line per captured error message
pub fn render_report(report: &RunReport) -> String {
    let mut out = render_summary(report);
    for message in &report.errors {
        out.push_str(&format!("\n{} {}", style("Error:").red(), message));
    }
    out
}

/// Print the summary followed by every captured error message
pub fn print_summary(report: &RunReport) {
    println!("{}", render_report(report));
}
