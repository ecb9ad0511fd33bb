//! Core types shared by the normalizer, aligner, scorer and aggregator

use serde::{Deserialize, Serialize};

/// Settings that control how raw text becomes word tokens.
///
/// The same configuration must be used for the reference and the hypothesis
/// of a pair, otherwise the comparison is not symmetric.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Regex whose matches are replaced with a single space before anything else
    pub ignore_pattern: Option<String>,
    /// Keep line boundaries and align line N only against line N
    pub enforce_line_count: bool,
}

impl NormalizationConfig {
    pub fn with_ignore_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.ignore_pattern = Some(pattern.into());
        self
    }

    pub fn with_enforced_line_count(mut self, enforce: bool) -> Self {
        self.enforce_line_count = enforce;
        self
    }
}

/// Normalized words of one side of a comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordSequence {
    /// All input lines merged into one sentence
    Sentence(Vec<String>),
    /// One token list per input line
    Lines(Vec<Vec<String>>),
}

impl WordSequence {
    /// Total number of words across all lines
    pub fn word_count(&self) -> usize {
        match self {
            Self::Sentence(words) => words.len(),
            Self::Lines(lines) => lines.iter().map(Vec::len).sum(),
        }
    }

    /// Number of lines; a sentence counts as one
    pub fn line_count(&self) -> usize {
        match self {
            Self::Sentence(_) => 1,
            Self::Lines(lines) => lines.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.word_count() == 0
    }

    /// Borrow each line's tokens in order
    pub fn lines(&self) -> Vec<&[String]> {
        match self {
            Self::Sentence(words) => vec![words.as_slice()],
            Self::Lines(lines) => lines.iter().map(Vec::as_slice).collect(),
        }
    }

    /// Flatten into a single token list
    pub fn into_words(self) -> Vec<String> {
        match self {
            Self::Sentence(words) => words,
            Self::Lines(lines) => lines.into_iter().flatten().collect(),
        }
    }
}

/// One step of an edit path between reference and hypothesis tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AlignmentOp {
    /// Tokens are identical
    Hit { reference: usize, hypothesis: usize },
    /// Reference token replaced by a different hypothesis token
    Substitution { reference: usize, hypothesis: usize },
    /// Reference token missing from the hypothesis
    Deletion { reference: usize },
    /// Hypothesis token with no reference counterpart
    Insertion { hypothesis: usize },
}

impl AlignmentOp {
    /// Marker character used in rendered diffs and edit vectors
    pub fn marker(&self) -> char {
        match self {
            Self::Hit { .. } => ' ',
            Self::Substitution { .. } => 'S',
            Self::Deletion { .. } => 'D',
            Self::Insertion { .. } => 'I',
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Hit { .. })
    }

    /// Reference index consumed by this op, if any
    pub fn reference_index(&self) -> Option<usize> {
        match *self {
            Self::Hit { reference, .. }
            | Self::Substitution { reference, .. }
            | Self::Deletion { reference } => Some(reference),
            Self::Insertion { .. } => None,
        }
    }

    /// Hypothesis index consumed by this op, if any
    pub fn hypothesis_index(&self) -> Option<usize> {
        match *self {
            Self::Hit { hypothesis, .. }
            | Self::Substitution { hypothesis, .. }
            | Self::Insertion { hypothesis } => Some(hypothesis),
            Self::Deletion { .. } => None,
        }
    }

    pub(crate) fn offset(self, reference_offset: usize, hypothesis_offset: usize) -> Self {
        match self {
            Self::Hit {
                reference,
                hypothesis,
            } => Self::Hit {
                reference: reference + reference_offset,
                hypothesis: hypothesis + hypothesis_offset,
            },
            Self::Substitution {
                reference,
                hypothesis,
            } => Self::Substitution {
                reference: reference + reference_offset,
                hypothesis: hypothesis + hypothesis_offset,
            },
            Self::Deletion { reference } => Self::Deletion {
                reference: reference + reference_offset,
            },
            Self::Insertion { hypothesis } => Self::Insertion {
                hypothesis: hypothesis + hypothesis_offset,
            },
        }
    }
}

/// Scores for a single reference/hypothesis pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub wer: f64,
    pub hits: usize,
    pub deletions: usize,
    pub substitutions: usize,
    pub insertions: usize,
}

impl ComparisonResult {
    /// hits + substitutions + deletions
    pub fn reference_words(&self) -> usize {
        self.hits + self.substitutions + self.deletions
    }

    /// hits + substitutions + insertions
    pub fn hypothesis_words(&self) -> usize {
        self.hits + self.substitutions + self.insertions
    }

    /// Total edit operations
    pub fn errors(&self) -> usize {
        self.substitutions + self.deletions + self.insertions
    }

    pub fn percent_error(&self) -> f64 {
        self.wer * 100.0
    }

    /// Goes negative when insertions push WER above 1
    pub fn percent_success(&self) -> f64 {
        (1.0 - self.wer) * 100.0
    }
}
