//! WER - word error rate scoring for speech transcripts
//!
//! Compares a hypothesis transcript against a reference transcript: both are
//! normalized through the same pipeline, aligned word by word with a minimum
//! edit path, and scored as (substitutions + deletions + insertions) divided by
//! the number of reference words. Alignments can be rendered as a REF/HYP diff,
//! and batches of comparisons are aggregated into mean, median and pooled
//! statistics.

pub mod alignment;
pub mod batch;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod scoring;
pub mod types;
pub mod visualize;

pub use error::{Error, Result};
pub use types::*;

pub use alignment::{Alignment, align, align_sequences, edit_distance, edit_vector};
pub use batch::{BatchReport, BatchRunner, ComparisonPair};
pub use metrics::{BatchSummary, MetricSummary, aggregate};
pub use normalize::{Normalizer, normalize};
pub use scoring::score;
pub use visualize::{RenderOptions, render, render_alignment};

/// A scored alignment
#[derive(Debug, Clone)]
pub struct Comparison {
    pub alignment: Alignment,
    pub result: ComparisonResult,
}

/// Normalize, align and score one reference/hypothesis pair
pub fn compare<S: AsRef<str>>(
    reference_lines: &[S],
    hypothesis_lines: &[S],
    config: &NormalizationConfig,
) -> Result<Comparison> {
    let normalizer = Normalizer::new(config)?;
    compare_with(&normalizer, reference_lines, hypothesis_lines)
}

/// Same as [`compare`] with an already compiled normalizer
pub fn compare_with<S: AsRef<str>>(
    normalizer: &Normalizer,
    reference_lines: &[S],
    hypothesis_lines: &[S],
) -> Result<Comparison> {
    let reference = normalizer.normalize(reference_lines);
    let hypothesis = normalizer.normalize(hypothesis_lines);
    let alignment = align_sequences(&reference, &hypothesis)?;
    tracing::debug!("Edit vector: {}", edit_vector(&alignment.ops));
    let result = score(&alignment.ops)?;
    Ok(Comparison { alignment, result })
}
