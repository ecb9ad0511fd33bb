//! Text normalization pipeline
//!
//! Turns raw transcript lines into comparable word tokens. The pipeline always
//! runs the same fixed sequence of stages; a stage that is switched off by the
//! configuration is replaced by [`TextStage::Identity`] rather than skipped, so
//! every stage can be exercised and tested on its own.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{NormalizationConfig, WordSequence};

/// Closed contraction table, in priority order
const CONTRACTIONS: &[(&str, &str)] = &[
    ("won't", "will not"),
    ("can't", "can not"),
    ("let's", "let us"),
    ("n't", " not"),
    ("'re", " are"),
    ("'s", " is"),
    ("'d", " would"),
    ("'ll", " will"),
    ("'t", " not"),
    ("'ve", " have"),
    ("'m", " am"),
];

const RIGHT_SINGLE_QUOTE: char = '\u{2019}';

/// Multi-pattern contraction expander
#[derive(Debug, Clone)]
pub struct Contractions {
    automaton: AhoCorasick,
    replacements: Vec<&'static str>,
}

impl Contractions {
    /// Build the automaton for the built-in table, accepting both `'` and `’`
    pub fn new() -> Result<Self> {
        let mut patterns = Vec::with_capacity(CONTRACTIONS.len() * 2);
        let mut replacements = Vec::with_capacity(CONTRACTIONS.len() * 2);
        for (contraction, expansion) in CONTRACTIONS {
            patterns.push(contraction.to_string());
            replacements.push(*expansion);
            patterns.push(contraction.replace('\'', &RIGHT_SINGLE_QUOTE.to_string()));
            replacements.push(*expansion);
        }

        let automaton = AhoCorasickBuilder::new()
            .match_kind(MatchKind::LeftmostFirst)
            .build(&patterns)
            .map_err(|e| Error::Config(format!("contraction table: {e}")))?;

        Ok(Self {
            automaton,
            replacements,
        })
    }

    /// Expand every contraction in `text`; leftmost match wins, then table order
    pub fn expand(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len() + 8);
        let mut last_end = 0;

        for m in self.automaton.find_iter(text) {
            result.push_str(&text[last_end..m.start()]);
            result.push_str(self.replacements[m.pattern().as_usize()]);
            last_end = m.end();
        }

        result.push_str(&text[last_end..]);
        result
    }
}

/// A `string -> string` stage applied to every line
#[derive(Debug, Clone)]
pub enum TextStage {
    Identity,
    /// Replace every match with a single space
    ReplacePattern(Regex),
    Lowercase,
    ExpandContractions(Contractions),
    /// Delete every match (built from `\p{P}`)
    RemovePunctuation(Regex),
    /// Collapse whitespace runs to one space and trim
    CollapseWhitespace,
}

impl TextStage {
    pub fn ignore_pattern(pattern: Option<&str>) -> Result<Self> {
        match pattern {
            Some(pattern) => Regex::new(pattern)
                .map(Self::ReplacePattern)
                .map_err(|e| Error::Config(format!("invalid ignore pattern '{pattern}': {e}"))),
            None => Ok(Self::Identity),
        }
    }

    pub fn remove_punctuation() -> Result<Self> {
        Regex::new(r"\p{P}")
            .map(Self::RemovePunctuation)
            .map_err(|e| Error::Config(format!("punctuation class: {e}")))
    }

    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::Identity => text.to_string(),
            Self::ReplacePattern(regex) => regex.replace_all(text, " ").into_owned(),
            Self::Lowercase => text.to_lowercase(),
            Self::ExpandContractions(contractions) => contractions.expand(text),
            Self::RemovePunctuation(regex) => regex.replace_all(text, "").into_owned(),
            Self::CollapseWhitespace => text.split_whitespace().collect::<Vec<_>>().join(" "),
        }
    }
}

/// Stage deciding whether line boundaries survive tokenization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStage {
    /// Keep one token list per line
    Identity,
    /// Join all non-empty lines into one sentence
    ReduceToSingleSentence,
}

impl LineStage {
    pub fn for_config(config: &NormalizationConfig) -> Self {
        if config.enforce_line_count {
            Self::Identity
        } else {
            Self::ReduceToSingleSentence
        }
    }

    pub fn apply(&self, lines: Vec<String>) -> Vec<String> {
        match self {
            Self::Identity => lines,
            Self::ReduceToSingleSentence => {
                let joined = lines
                    .into_iter()
                    .filter(|line| !line.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                vec![joined]
            }
        }
    }
}

/// Split on whitespace, never yielding empty tokens
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Compiled normalization pipeline; immutable and shareable across threads
#[derive(Debug, Clone)]
pub struct Normalizer {
    text_stages: Vec<TextStage>,
    line_stage: LineStage,
}

impl Normalizer {
    /// Compile the pipeline for `config`
    pub fn new(config: &NormalizationConfig) -> Result<Self> {
        let text_stages = vec![
            TextStage::ignore_pattern(config.ignore_pattern.as_deref())?,
            TextStage::Lowercase,
            TextStage::ExpandContractions(Contractions::new()?),
            TextStage::remove_punctuation()?,
            TextStage::CollapseWhitespace,
        ];

        debug!(
            "Compiled normalizer (ignore_pattern: {:?}, enforce_line_count: {})",
            config.ignore_pattern, config.enforce_line_count
        );

        Ok(Self {
            text_stages,
            line_stage: LineStage::for_config(config),
        })
    }

    /// Run all text stages over a single line
    pub fn transform(&self, line: &str) -> String {
        self.text_stages
            .iter()
            .fold(line.to_string(), |text, stage| stage.apply(&text))
    }

    /// Normalize raw lines into a word sequence
    pub fn normalize<S: AsRef<str>>(&self, lines: &[S]) -> WordSequence {
        let cleaned: Vec<String> = lines
            .iter()
            .map(|line| self.transform(line.as_ref()))
            .collect();
        let reduced = self.line_stage.apply(cleaned);

        match self.line_stage {
            LineStage::ReduceToSingleSentence => {
                WordSequence::Sentence(reduced.iter().flat_map(|line| tokenize(line)).collect())
            }
            LineStage::Identity => {
                WordSequence::Lines(reduced.iter().map(|line| tokenize(line)).collect())
            }
        }
    }
}

/// Normalize `lines` with a one-off pipeline built from `config`
pub fn normalize<S: AsRef<str>>(
    lines: &[S],
    config: &NormalizationConfig,
) -> Result<WordSequence> {
    Ok(Normalizer::new(config)?.normalize(lines))
}
