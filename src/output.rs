//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure and do no I/O.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Sticker /tmp/6f1c….png
//!     Codec: lossless (png)
//!     Size: 402x402
//!     File: 498.2 KiB of 500.0 KiB (3 attempts)
//!     Description: A waving cat
//! ```
//!
//! ## Plan
//!
//! ```text
//! Source 1300x650
//!     Target: 618x618
//!     Fitted: 618x309
//!     Codec: lossy (jpg)
//!     Budget: 500.0 KiB
//! ```

use crate::imaging::{Codec, Size};
use crate::sticker::StickerCandidate;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Byte count as KiB with one decimal.
fn format_kib(bytes: u64) -> String {
    format!("{:.1} KiB", bytes as f64 / 1024.0)
}

/// Size rounded to whole pixels, `WxH`.
fn format_size(size: Size) -> String {
    format!("{:.0}x{:.0}", size.width, size.height)
}

// ============================================================================
// Build
// ============================================================================

pub fn format_sticker(candidate: &StickerCandidate, budget: u64) -> Vec<String> {
    let report = &candidate.report;
    let mut lines = vec![format!("Sticker {}", candidate.path.display())];
    lines.push(format!("{}Codec: {}", indent(1), candidate.codec));
    lines.push(format!("{}Size: {}x{}", indent(1), report.width, report.height));
    if let Some(q) = report.quality {
        lines.push(format!("{}Quality: {}", indent(1), q.value()));
    }
    let attempts = match report.attempts {
        1 => "1 attempt".to_string(),
        n => format!("{n} attempts"),
    };
    lines.push(format!(
        "{}File: {} of {} ({})",
        indent(1),
        format_kib(report.bytes),
        format_kib(budget),
        attempts
    ));
    if !candidate.description.is_empty() {
        lines.push(format!("{}Description: {}", indent(1), candidate.description));
    }
    lines
}

pub fn print_sticker(candidate: &StickerCandidate, budget: u64) {
    for line in format_sticker(candidate, budget) {
        println!("{}", line);
    }
}

// ============================================================================
// Plan
// ============================================================================

/// What a build would do, without encoding anything.
#[derive(Debug, Clone, PartialEq)]
pub struct StickerPlan {
    pub source: Size,
    pub target: Size,
    pub fitted: Size,
    pub codec: Codec,
    pub budget: u64,
}

pub fn format_plan(plan: &StickerPlan) -> Vec<String> {
    vec![
        format!("Source {}", format_size(plan.source)),
        format!("{}Target: {}", indent(1), format_size(plan.target)),
        format!("{}Fitted: {}", indent(1), format_size(plan.fitted)),
        format!("{}Codec: {}", indent(1), plan.codec),
        format!("{}Budget: {}", indent(1), format_kib(plan.budget)),
    ]
}

pub fn print_plan(plan: &StickerPlan) {
    for line in format_plan(plan) {
        println!("{}", line);
    }
}
