//! Parallel scoring of many reference/hypothesis pairs
//!
//! Every pair runs its own normalize → align → score pipeline on a blocking
//! worker. Results are only aggregated once all workers have joined, and a
//! failure in one pair is recorded against its identifier without touching the
//! others. If a deadline is set and elapses, outstanding work is abandoned and
//! the batch fails as a whole rather than reporting statistics over a partial
//! set.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::metrics::{BatchSummary, aggregate};
use crate::normalize::Normalizer;
use crate::types::{ComparisonResult, NormalizationConfig};

/// One unit of batch work: raw lines for both sides under an identifier
#[derive(Debug, Clone)]
pub struct ComparisonPair {
    pub id: String,
    pub reference: Vec<String>,
    pub hypothesis: Vec<String>,
}

impl ComparisonPair {
    pub fn new(id: impl Into<String>, reference: Vec<String>, hypothesis: Vec<String>) -> Self {
        Self {
            id: id.into(),
            reference,
            hypothesis,
        }
    }
}

/// Outcome of a batch; successes and failures keyed by identifier
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: BTreeMap<String, ComparisonResult>,
    pub failures: BTreeMap<String, Error>,
}

impl BatchReport {
    /// Aggregate the successful comparisons
    pub fn summary(&self) -> Result<BatchSummary> {
        aggregate(&self.results)
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn total(&self) -> usize {
        self.results.len() + self.failures.len()
    }
}

/// Runs comparisons concurrently on the tokio blocking pool
pub struct BatchRunner {
    normalizer: Arc<Normalizer>,
    deadline: Option<Duration>,
}

impl BatchRunner {
    /// Compile the normalizer once for the whole batch
    pub fn new(config: &NormalizationConfig) -> Result<Self> {
        Ok(Self {
            normalizer: Arc::new(Normalizer::new(config)?),
            deadline: None,
        })
    }

    /// Abandon the batch if it has not finished within `deadline`
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Score every pair and collect the results.
    ///
    /// Duplicate identifiers are rejected before any work starts.
    pub async fn run(&self, pairs: Vec<ComparisonPair>) -> Result<BatchReport> {
        let mut seen = BTreeSet::new();
        for pair in &pairs {
            if !seen.insert(pair.id.as_str()) {
                return Err(Error::Shape(format!("duplicate identifier '{}'", pair.id)));
            }
        }

        let total = pairs.len();
        info!("Scoring {} pairs", total);

        let mut tasks = JoinSet::new();
        let mut ids = Vec::with_capacity(total);
        for pair in pairs {
            let normalizer = Arc::clone(&self.normalizer);
            let id = pair.id.clone();
            let handle = tasks.spawn_blocking(move || {
                let outcome = crate::compare_with(&normalizer, &pair.reference, &pair.hypothesis)
                    .map(|comparison| comparison.result);
                (pair.id, outcome)
            });
            ids.push((handle.id(), id));
        }

        let mut report = BatchReport::default();
        let collected = match self.deadline {
            Some(deadline) => {
                let joined =
                    tokio::time::timeout(deadline, join_all(&mut tasks, &ids, &mut report)).await;
                if joined.is_ok() {
                    Ok(())
                } else {
                    tasks.abort_all();
                    Err(Error::DeadlineExceeded {
                        completed: report.total(),
                        total,
                    })
                }
            }
            None => {
                join_all(&mut tasks, &ids, &mut report).await;
                Ok(())
            }
        };

        if let Err(err) = collected {
            warn!("{}", err);
            return Err(err);
        }

        info!(
            "Scored {} pairs ({} failed)",
            report.results.len(),
            report.failures.len()
        );
        Ok(report)
    }
}

type PairOutcome = (String, Result<ComparisonResult>);

async fn join_all(
    tasks: &mut JoinSet<PairOutcome>,
    ids: &[(tokio::task::Id, String)],
    report: &mut BatchReport,
) {
    while let Some(joined) = tasks.join_next_with_id().await {
        match joined {
            Ok((_, (id, Ok(result)))) => {
                debug!("{}: wer {}", id, result.wer);
                report.results.insert(id, result);
            }
            Ok((_, (id, Err(err)))) => {
                warn!("{}: {}", id, err);
                report.failures.insert(id, err);
            }
            Err(join_err) => {
                let task_id = join_err.id();
                let id = ids
                    .iter()
                    .find(|(candidate, _)| *candidate == task_id)
                    .map(|(_, id)| id.clone())
                    .unwrap_or_else(|| format!("task-{task_id}"));
                warn!("{}: worker failed: {}", id, join_err);
                report
                    .failures
                    .insert(id, Error::Worker(join_err.to_string()));
            }
        }
    }
}
