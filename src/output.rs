//! CLI output formatting for run reports.
//!
//! # Display Contract
//!
//! Every routed file follows the same two-level pattern:
//!
//! 1. **Header line**: positional index + file name, and `→` plus the
//!    destination relative to the target directory.
//! 2. **Context line**: indented outcome with the sizes that decided it.
//!
//! # Output Format
//!
//! ```text
//! 001 big.jpg → compressed_images/big.jpg
//!     compressed: 4.0 MiB
//! 002 huge.jpg → compressed_images/huge.jpg
//!     resized: 6.0 MiB → 4.0 MiB
//! 003 unshrinkable.jpg → incompatible_originals/unshrinkable.jpg
//!     incompatible: still over 5.0 MiB after resize (7.0 MiB)
//!
//! Swept
//! 001 trip/day1/raw.tiff → incompatible_originals/raw.tiff
//!
//! Routed 3 files: 0 compliant, 1 compressed, 1 resized, 1 incompatible, 0 failed, 1 swept
//! ```
//!
//! # Architecture
//!
//! `format_*` functions return `Vec<String>` and do no I/O; `print_*`
//! wrappers write them to stdout.

use crate::pipeline::{RunReport, Summary};
use crate::router::{FileReport, IncompatibleReason, Outcome};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte size: bytes below 1 KiB, otherwise one decimal in KiB or MiB.
pub fn format_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    let b = bytes as f64;
    if b >= MIB {
        format!("{:.1} MiB", b / MIB)
    } else if b >= KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{} B", bytes)
    }
}

/// `path` relative to `base` when it lies beneath it, otherwise as given.
fn relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn header(index: usize, file: &FileReport, source_root: &Path, target: &Path) -> String {
    let name = relative(&file.source, source_root);
    match &file.destination {
        Some(dest) => format!(
            "{} {} \u{2192} {}",
            format_index(index),
            name,
            relative(dest, target)
        ),
        None => format!("{} {}", format_index(index), name),
    }
}

/// Context line for a routed file. `None` for swept files, which need no detail.
fn outcome_line(file: &FileReport, max_bytes: u64) -> Option<String> {
    let sizes: Vec<String> = file.attempts.iter().map(|a| format_size(a.size)).collect();
    let line = match &file.outcome {
        Outcome::Compliant => "compliant".to_string(),
        Outcome::Compressed | Outcome::Resized => {
            let label = if file.outcome == Outcome::Compressed {
                "compressed"
            } else {
                "resized"
            };
            format!("{}: {}", label, sizes.join(" \u{2192} "))
        }
        Outcome::Incompatible {
            reason: IncompatibleReason::StillOversized,
        } => format!(
            "incompatible: still over {} after resize ({})",
            format_size(max_bytes),
            sizes.last().map(String::as_str).unwrap_or("?")
        ),
        Outcome::Incompatible {
            reason: IncompatibleReason::CodecFailure(msg),
        } => format!("incompatible: codec failure ({})", msg),
        Outcome::Failed { error, .. } => format!("failed: {}", error),
        Outcome::Swept => return None,
    };
    Some(format!("{}{}", indent(1), line))
}

/// One-line totals.
pub fn format_summary(summary: &Summary) -> String {
    let routed = summary.routed();
    let mut line = format!(
        "Routed {} file{}: {} compliant, {} compressed, {} resized, {} incompatible, {} failed, {} swept",
        routed,
        if routed == 1 { "" } else { "s" },
        summary.compliant,
        summary.compressed,
        summary.resized,
        summary.incompatible,
        summary.failed,
        summary.swept,
    );
    if summary.sweep_failed > 0 {
        line.push_str(&format!(", {} could not be swept", summary.sweep_failed));
    }
    line
}

/// Format a whole run: routed files, swept files, then totals.
pub fn format_report(report: &RunReport, max_bytes: u64) -> Vec<String> {
    let routed = &report.files;
    let swept = &report.swept;

    let mut lines = Vec::new();
    if routed.is_empty() {
        lines.push(format!(
            "No image files found in {}",
            report.source.display()
        ));
    }
    for (i, file) in routed.iter().enumerate() {
        lines.push(header(i + 1, file, &report.source, &report.target));
        lines.extend(outcome_line(file, max_bytes));
    }

    if !swept.is_empty() {
        lines.push(String::new());
        lines.push("Swept".to_string());
        for (i, file) in swept.iter().enumerate() {
            lines.push(header(i + 1, file, &report.target, &report.target));
            lines.extend(outcome_line(file, max_bytes));
        }
    }

    lines.push(String::new());
    lines.push(format_summary(&report.summary));
    lines
}

/// Print a run report to stdout.
pub fn print_report(report: &RunReport, max_bytes: u64) {
    for line in format_report(report, max_bytes) {
        println!("{}", line);
    }
}
