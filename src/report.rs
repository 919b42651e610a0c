//! Human-readable output for load runs and reports

use crate::aggregate::{AggregateRow, DuplicateName};
use crate::loader::LoadReport;
use serde::Serialize;
use std::time::Duration;

pub fn region_line(row: &AggregateRow) -> String {
    format!("{}: {} habitantes em {} municípios", row.key, row.total, row.count)
}

pub fn homonym_line(dup: &DuplicateName) -> String {
    format!("{} - {} - {}", dup.name, dup.region_codes, dup.count)
}

pub fn elapsed_line(elapsed: Duration) -> String {
    format!("Tempo: {:?}", elapsed)
}

pub fn load_line(report: &LoadReport) -> String {
    format!(
        "Tempo de importação ({}): {:?} ({} linhas)",
        report.strategy.label(),
        report.elapsed,
        report.rows_written
    )
}

pub fn print_regions(rows: &[AggregateRow], elapsed: Duration) {
    for row in rows {
        println!("{}", region_line(row));
    }
    println!("{}", elapsed_line(elapsed));
}

pub fn print_homonyms(rows: &[DuplicateName], elapsed: Duration) {
    for dup in rows {
        println!("{}", homonym_line(dup));
    }
    println!("{}", elapsed_line(elapsed));
}

/// Pretty JSON for `--json` output (load summaries, aggregate rows)
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}
