use std::path::PathBuf;

use crate::format::Format;

/// What a single conversion read and wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub source: Format,
    pub target: Format,
    pub rules_read: usize,
    pub rules_written: usize,
    pub destination: PathBuf,
}

pub fn render(summary: &ConversionSummary) -> String {
    format!(
        "convert_summary source={} target={} rules_read={} rules_written={}",
        summary.source, summary.target, summary.rules_read, summary.rules_written
    )
}
