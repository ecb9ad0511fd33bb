//! Word-level Levenshtein alignment
//!
//! Builds the full `(R + 1) x (H + 1)` cost table for a reference of `R` words
//! and a hypothesis of `H` words, then backtracks from the bottom-right corner
//! to recover one minimum-cost edit path. Time and memory are both O(R·H); this
//! is the dominant cost of scoring and no banding is applied, so the reported
//! distance is always exact.
//!
//! When several predecessors tie for the minimum the backtrace prefers
//! substitution, then deletion, then insertion. The tie-break never changes the
//! distance but it does decide which words the rendered diff pairs up.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{AlignmentOp, WordSequence};

/// Dense row-major cost table private to a single alignment
struct CostTable {
    width: usize,
    cells: Vec<usize>,
}

impl CostTable {
    fn build<S: AsRef<str>>(reference: &[S], hypothesis: &[S]) -> Self {
        let rows = reference.len() + 1;
        let width = hypothesis.len() + 1;
        let mut table = Self {
            width,
            cells: vec![0; rows * width],
        };

        // first row: insertions, first column: deletions
        for j in 0..width {
            table.set(0, j, j);
        }
        for i in 0..rows {
            table.set(i, 0, i);
        }

        for i in 1..rows {
            for j in 1..width {
                let cost = if reference[i - 1].as_ref() == hypothesis[j - 1].as_ref() {
                    table.get(i - 1, j - 1)
                } else {
                    1 + table
                        .get(i - 1, j - 1)
                        .min(table.get(i - 1, j))
                        .min(table.get(i, j - 1))
                };
                table.set(i, j, cost);
            }
        }

        table
    }

    fn get(&self, i: usize, j: usize) -> usize {
        self.cells[i * self.width + j]
    }

    fn set(&mut self, i: usize, j: usize, value: usize) {
        self.cells[i * self.width + j] = value;
    }
}

/// Minimum number of word edits turning `reference` into `hypothesis`
pub fn edit_distance<S: AsRef<str>>(reference: &[S], hypothesis: &[S]) -> usize {
    CostTable::build(reference, hypothesis).get(reference.len(), hypothesis.len())
}

/// Compute the canonical minimum-edit alignment between two token sequences
pub fn align<S: AsRef<str>>(reference: &[S], hypothesis: &[S]) -> Vec<AlignmentOp> {
    let table = CostTable::build(reference, hypothesis);
    debug!(
        "Aligning {} reference x {} hypothesis words (distance {})",
        reference.len(),
        hypothesis.len(),
        table.get(reference.len(), hypothesis.len())
    );

    let mut ops = Vec::with_capacity(reference.len().max(hypothesis.len()));
    let mut i = reference.len();
    let mut j = hypothesis.len();

    while i > 0 || j > 0 {
        let current = table.get(i, j);

        if i > 0 && j > 0 && reference[i - 1].as_ref() == hypothesis[j - 1].as_ref() {
            ops.push(AlignmentOp::Hit {
                reference: i - 1,
                hypothesis: j - 1,
            });
            i -= 1;
            j -= 1;
        } else if i > 0 && j > 0 && table.get(i - 1, j - 1) + 1 == current {
            ops.push(AlignmentOp::Substitution {
                reference: i - 1,
                hypothesis: j - 1,
            });
            i -= 1;
            j -= 1;
        } else if i > 0 && (j == 0 || table.get(i - 1, j) + 1 == current) {
            ops.push(AlignmentOp::Deletion { reference: i - 1 });
            i -= 1;
        } else {
            ops.push(AlignmentOp::Insertion { hypothesis: j - 1 });
            j -= 1;
        }
    }

    ops.reverse();
    ops
}

/// Generate the compact edit vector string, `H` for hits
pub fn edit_vector(ops: &[AlignmentOp]) -> String {
    ops.iter()
        .map(|op| match op {
            AlignmentOp::Hit { .. } => 'H',
            other => other.marker(),
        })
        .collect()
}

/// Alignment of a full reference/hypothesis pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    /// Flattened reference tokens
    pub reference: Vec<String>,
    /// Flattened hypothesis tokens
    pub hypothesis: Vec<String>,
    /// Ops indexing into the flattened tokens
    pub ops: Vec<AlignmentOp>,
    /// Span of `ops` belonging to each aligned line
    pub lines: Vec<Range<usize>>,
}

impl Alignment {
    /// Number of non-hit ops
    pub fn distance(&self) -> usize {
        self.ops.iter().filter(|op| op.is_error()).count()
    }

    /// Ops belonging to each line, in order
    pub fn line_ops(&self) -> impl Iterator<Item = &[AlignmentOp]> {
        self.lines.iter().map(|span| &self.ops[span.clone()])
    }
}

/// Align two normalized sequences.
///
/// Sentences are aligned as a whole. Per-line sequences are aligned line by
/// line so line N of the hypothesis is only ever compared with line N of the
/// reference, and the per-line ops are concatenated with indices offset into
/// the flattened tokens.
pub fn align_sequences(reference: &WordSequence, hypothesis: &WordSequence) -> Result<Alignment> {
    match (reference, hypothesis) {
        (WordSequence::Sentence(r), WordSequence::Sentence(h)) => {
            let ops = align(r, h);
            let span = 0..ops.len();
            Ok(Alignment {
                reference: r.clone(),
                hypothesis: h.clone(),
                ops,
                lines: vec![span],
            })
        }
        (WordSequence::Lines(r_lines), WordSequence::Lines(h_lines)) => {
            if r_lines.len() != h_lines.len() {
                return Err(Error::Shape(format!(
                    "reference has {} lines but hypothesis has {}",
                    r_lines.len(),
                    h_lines.len()
                )));
            }

            let mut alignment = Alignment {
                reference: Vec::with_capacity(reference.word_count()),
                hypothesis: Vec::with_capacity(hypothesis.word_count()),
                ops: Vec::new(),
                lines: Vec::with_capacity(r_lines.len()),
            };

            for (r, h) in r_lines.iter().zip(h_lines) {
                let r_offset = alignment.reference.len();
                let h_offset = alignment.hypothesis.len();
                let start = alignment.ops.len();

                alignment
                    .ops
                    .extend(align(r, h).into_iter().map(|op| op.offset(r_offset, h_offset)));
                alignment.reference.extend(r.iter().cloned());
                alignment.hypothesis.extend(h.iter().cloned());
                alignment.lines.push(start..alignment.ops.len());
            }

            Ok(alignment)
        }
        _ => Err(Error::Shape(
            "reference and hypothesis were normalized with different line modes".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_simple_substitution() {
        let ops = align(&words("the cat sat"), &words("a cat sat"));
        assert_eq!(edit_vector(&ops), "SHH");
        assert_eq!(
            ops[0],
            AlignmentOp::Substitution {
                reference: 0,
                hypothesis: 0
            }
        );
    }

    #[test]
    fn test_deletion() {
        let ops = align(&words("hello world"), &words("hello"));
        assert_eq!(
            ops,
            vec![
                AlignmentOp::Hit {
                    reference: 0,
                    hypothesis: 0
                },
                AlignmentOp::Deletion { reference: 1 },
            ]
        );
    }

    #[test]
    fn test_insertion() {
        let ops = align(&words("hello world"), &words("hello beautiful world"));
        assert_eq!(edit_vector(&ops), "HIH");
        assert_eq!(ops[1], AlignmentOp::Insertion { hypothesis: 1 });
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(edit_vector(&align(&words(""), &words("a b"))), "II");
        assert_eq!(edit_vector(&align(&words("a b"), &words(""))), "DD");
        assert!(align(&words(""), &words("")).is_empty());
    }

    #[test]
    fn test_tie_prefers_substitution_over_deletion() {
        // "a b" -> "c": S+D or D+S both cost 2; the backtrace starts at the
        // corner so the last reference word is substituted first
        let ops = align(&words("a b"), &words("c"));
        assert_eq!(edit_vector(&ops), "DS");
        assert_eq!(
            ops[1],
            AlignmentOp::Substitution {
                reference: 1,
                hypothesis: 0
            }
        );
    }

    #[test]
    fn test_tie_prefers_substitution_over_insertion() {
        let ops = align(&words("c"), &words("a b"));
        assert_eq!(edit_vector(&ops), "IS");
    }

    #[test]
    fn test_multiple_deletions() {
        let ops = align(&words("hello very big world"), &words("hello world"));
        assert_eq!(edit_vector(&ops), "HDDH");
    }

    #[test]
    fn test_edit_distance_matches_ops() {
        let r = words("the quick brown fox jumps");
        let h = words("a quick fox jumped over");
        let ops = align(&r, &h);
        let errors = ops.iter().filter(|op| op.is_error()).count();
        assert_eq!(errors, edit_distance(&r, &h));
        assert_eq!(edit_distance(&r, &h), edit_distance(&h, &r));
    }

    #[test]
    fn test_align_sequences_per_line_offsets() {
        let reference = WordSequence::Lines(vec![words("a b"), words("c")]);
        let hypothesis = WordSequence::Lines(vec![words("a"), words("c d")]);
        let alignment = align_sequences(&reference, &hypothesis).unwrap();

        assert_eq!(alignment.reference, words("a b c"));
        assert_eq!(alignment.hypothesis, words("a c d"));
        assert_eq!(alignment.lines, vec![0..2, 2..4]);
        assert_eq!(
            alignment.ops,
            vec![
                AlignmentOp::Hit {
                    reference: 0,
                    hypothesis: 0
                },
                AlignmentOp::Deletion { reference: 1 },
                AlignmentOp::Hit {
                    reference: 2,
                    hypothesis: 1
                },
                AlignmentOp::Insertion { hypothesis: 2 },
            ]
        );
        assert_eq!(alignment.distance(), 2);
    }

    #[test]
    fn test_per_line_never_crosses_lines() {
        // sentence mode would match "b" across the boundary; line mode may not
        let reference = WordSequence::Lines(vec![words("a b"), words("")]);
        let hypothesis = WordSequence::Lines(vec![words("a"), words("b")]);
        let alignment = align_sequences(&reference, &hypothesis).unwrap();
        assert_eq!(edit_vector(&alignment.ops), "HDI");
    }

    #[test]
    fn test_line_count_mismatch() {
        let reference = WordSequence::Lines(vec![words("a"), words("b"), words("c")]);
        let hypothesis = WordSequence::Lines(vec![words("a"), words("b")]);
        let err = align_sequences(&reference, &hypothesis).unwrap_err();
        assert!(matches!(err, Error::Shape(_)));
    }

    #[test]
    fn test_mixed_modes_rejected() {
        let reference = WordSequence::Sentence(words("a"));
        let hypothesis = WordSequence::Lines(vec![words("a")]);
        assert!(matches!(
            align_sequences(&reference, &hypothesis),
            Err(Error::Shape(_))
        ));
    }
}
