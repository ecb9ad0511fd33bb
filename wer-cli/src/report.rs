//! Text and JSON output for single comparisons and directory batches

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use comfy_table::Table;
use comfy_table::presets::ASCII_FULL_CONDENSED;
use serde::Serialize;
use wer::{BatchReport, BatchSummary, Comparison, ComparisonResult};

const HEADERS: [&str; 4] = ["Filename", "Word Error Rate (WER)", "% Error", "% Success"];

fn percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// Shortest representation that round-trips, always with a decimal point
fn rate(value: f64) -> String {
    format!("{value:?}")
}

/// Output for a file pair
pub fn single_text(result: &ComparisonResult, visualization: Option<&str>) -> String {
    let mut out = String::from("\n");
    let _ = writeln!(out, "Word Error Rate (WER):  {}", rate(result.wer));
    let _ = writeln!(out, "Percent Error:  {}", percent(result.percent_error()));
    let _ = writeln!(out, "Percent Success:  {}", percent(result.percent_success()));
    let _ = writeln!(
        out,
        "Hits: {}  Substitutions: {}  Deletions: {}  Insertions: {}",
        result.hits, result.substitutions, result.deletions, result.insertions
    );
    if let Some(visualization) = visualization {
        out.push('\n');
        out.push_str(visualization);
        out.push('\n');
    }
    out.push('\n');
    out
}

#[derive(Serialize)]
struct FileReport<'a> {
    generated_at: DateTime<Utc>,
    expected: &'a Path,
    actual: &'a Path,
    result: &'a ComparisonResult,
    percent_error: f64,
    percent_success: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    alignment: Option<&'a wer::Alignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    visualization: Option<&'a str>,
}

pub fn single_json(
    expected: &Path,
    actual: &Path,
    comparison: &Comparison,
    visualization: Option<&str>,
) -> serde_json::Result<String> {
    let report = FileReport {
        generated_at: Utc::now(),
        expected,
        actual,
        result: &comparison.result,
        percent_error: comparison.result.percent_error(),
        percent_success: comparison.result.percent_success(),
        alignment: visualization.map(|_| &comparison.alignment),
        visualization,
    };
    serde_json::to_string_pretty(&report)
}

fn table_row(name: &str, wer: f64) -> Vec<String> {
    vec![
        name.to_string(),
        rate(wer),
        percent(wer * 100.0),
        percent((1.0 - wer) * 100.0),
    ]
}

/// Output for a directory pair: one row per file, then the summary rows
pub fn batch_text(report: &BatchReport, summary: Option<&BatchSummary>) -> String {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL_CONDENSED).set_header(HEADERS);
    for (name, result) in &report.results {
        table.add_row(table_row(name, result.wer));
    }
    if let Some(summary) = summary {
        table.add_row(table_row("mean", summary.mean.wer));
        table.add_row(table_row("median", summary.median.wer));
        table.add_row(table_row("pooled", summary.pooled.wer));
    }

    let mut out = String::from("\n");
    if !report.results.is_empty() {
        let _ = writeln!(out, "{table}");
    }
    if !report.failures.is_empty() {
        if !report.results.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "Failed ({}):", report.failures.len());
        for (name, err) in &report.failures {
            let _ = writeln!(out, "  {name}: {err}");
        }
    }
    out.push('\n');
    out
}

#[derive(Serialize)]
struct DirectoryReport<'a> {
    generated_at: DateTime<Utc>,
    expected: &'a Path,
    actual: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a BatchSummary>,
    failures: BTreeMap<&'a str, String>,
}

pub fn batch_json(
    expected: &Path,
    actual: &Path,
    report: &BatchReport,
    summary: Option<&BatchSummary>,
) -> serde_json::Result<String> {
    let report = DirectoryReport {
        generated_at: Utc::now(),
        expected,
        actual,
        summary,
        failures: report
            .failures
            .iter()
            .map(|(name, err)| (name.as_str(), err.to_string()))
            .collect(),
    };
    serde_json::to_string_pretty(&report)
}
