//! Turns an alignment into hit/error counts and a word error rate

use crate::error::{Error, Result};
use crate::types::{AlignmentOp, ComparisonResult};

/// Tally `ops` and compute WER = (S + D + I) / reference words.
///
/// Fails with [`Error::Division`] when the ops consume no reference words.
pub fn score(ops: &[AlignmentOp]) -> Result<ComparisonResult> {
    let mut hits = 0;
    let mut substitutions = 0;
    let mut deletions = 0;
    let mut insertions = 0;

    for op in ops {
        match op {
            AlignmentOp::Hit { .. } => hits += 1,
            AlignmentOp::Substitution { .. } => substitutions += 1,
            AlignmentOp::Deletion { .. } => deletions += 1,
            AlignmentOp::Insertion { .. } => insertions += 1,
        }
    }

    let reference_words = hits + substitutions + deletions;
    if reference_words == 0 {
        return Err(Error::Division);
    }

    let errors = substitutions + deletions + insertions;
    Ok(ComparisonResult {
        wer: errors as f64 / reference_words as f64,
        hits,
        deletions,
        substitutions,
        insertions,
    })
}
