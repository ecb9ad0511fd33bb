//! Batch aggregation of per-pair results
//!
//! Summaries are always rebuilt from the full set of results; nothing here is
//! updated incrementally.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::ComparisonResult;

/// One statistic (mean or median) computed per metric.
///
/// Counts are fractional because the median of an even-sized batch averages
/// the two middle values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub wer: f64,
    pub hits: f64,
    pub deletions: f64,
    pub substitutions: f64,
    pub insertions: f64,
}

impl MetricSummary {
    fn from_fn(results: &[&ComparisonResult], stat: impl Fn(Vec<f64>) -> f64) -> Self {
        let column = |field: fn(&ComparisonResult) -> f64| -> f64 {
            stat(results.iter().map(|r| field(*r)).collect())
        };

        Self {
            wer: column(|r| r.wer),
            hits: column(|r| r.hits as f64),
            deletions: column(|r| r.deletions as f64),
            substitutions: column(|r| r.substitutions as f64),
            insertions: column(|r| r.insertions as f64),
        }
    }
}

/// Per-file results plus their summary statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub per_file: BTreeMap<String, ComparisonResult>,
    pub mean: MetricSummary,
    pub median: MetricSummary,
    /// Counts summed over all files, WER = total errors / total reference words
    pub pooled: ComparisonResult,
}

impl BatchSummary {
    pub fn len(&self) -> usize {
        self.per_file.len()
    }

    pub fn is_empty(&self) -> bool {
        self.per_file.is_empty()
    }
}

/// Arithmetic mean; callers guarantee a non-empty input
pub fn mean(values: Vec<f64>) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median, averaging the two middle values for an even count
pub fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

fn pooled(results: &[&ComparisonResult]) -> ComparisonResult {
    let mut total = ComparisonResult {
        wer: 0.0,
        hits: 0,
        deletions: 0,
        substitutions: 0,
        insertions: 0,
    };
    for result in results {
        total.hits += result.hits;
        total.deletions += result.deletions;
        total.substitutions += result.substitutions;
        total.insertions += result.insertions;
    }
    let reference_words = total.reference_words();
    if reference_words > 0 {
        total.wer = total.errors() as f64 / reference_words as f64;
    }
    total
}

/// Summarize a batch of results keyed by identifier.
///
/// Fails with [`Error::EmptyBatch`] when there is nothing to summarize.
pub fn aggregate(results: &BTreeMap<String, ComparisonResult>) -> Result<BatchSummary> {
    if results.is_empty() {
        return Err(Error::EmptyBatch);
    }

    let values: Vec<&ComparisonResult> = results.values().collect();

    Ok(BatchSummary {
        per_file: results.clone(),
        mean: MetricSummary::from_fn(&values, mean),
        median: MetricSummary::from_fn(&values, median),
        pooled: pooled(&values),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(wer: f64, deletions: usize) -> ComparisonResult {
        ComparisonResult {
            wer,
            hits: 10 - deletions,
            deletions,
            substitutions: 0,
            insertions: 0,
        }
    }

    #[test]
    fn test_mean_and_median_of_two() {
        let mut results = BTreeMap::new();
        results.insert("a.txt".to_string(), result(0.2, 2));
        results.insert("b.txt".to_string(), result(0.4, 4));

        let summary = aggregate(&results).unwrap();
        assert!((summary.mean.wer - 0.3).abs() < 1e-12);
        assert!((summary.median.wer - 0.3).abs() < 1e-12);
        assert_eq!(summary.mean.deletions, 3.0);
        assert_eq!(summary.len(), 2);
    }

    #[test]
    fn test_median_odd_count() {
        assert_eq!(median(vec![3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(vec![5.0]), 5.0);
        assert_eq!(median(vec![4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_pooled_weights_by_reference_length() {
        let mut results = BTreeMap::new();
        results.insert(
            "short".to_string(),
            ComparisonResult {
                wer: 1.0,
                hits: 0,
                deletions: 1,
                substitutions: 0,
                insertions: 0,
            },
        );
        results.insert(
            "long".to_string(),
            ComparisonResult {
                wer: 0.0,
                hits: 9,
                deletions: 0,
                substitutions: 0,
                insertions: 0,
            },
        );

        let summary = aggregate(&results).unwrap();
        assert_eq!(summary.mean.wer, 0.5);
        assert!((summary.pooled.wer - 0.1).abs() < 1e-12);
        assert_eq!(summary.pooled.reference_words(), 10);
    }

    #[test]
    fn test_empty_batch() {
        let results = BTreeMap::new();
        assert!(matches!(aggregate(&results), Err(Error::EmptyBatch)));
    }

    #[test]
    fn test_per_file_is_ordered_by_identifier() {
        let mut results = BTreeMap::new();
        results.insert("z".to_string(), result(0.1, 1));
        results.insert("a".to_string(), result(0.3, 3));
        let summary = aggregate(&results).unwrap();
        let ids: Vec<&str> = summary.per_file.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["a", "z"]);
    }
}
