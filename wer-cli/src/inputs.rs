//! Reading transcripts from disk and pairing expected/actual inputs

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use thiserror::Error;
use tracing::{debug, warn};
use wer::ComparisonPair;

/// Problems with the paths given on the command line
#[derive(Debug, Error)]
pub enum InputError {
    #[error(
        "One or both of\n\n- {expected}\n- {actual}\n\ndoes not exist; please ensure the files exist in the right location."
    )]
    Missing { expected: String, actual: String },

    #[error(
        "A {expected} was provided to --expected, yet a {actual} was provided to --actual.\nPlease provide a file to both arguments, or a folder to both arguments."
    )]
    KindMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error(
        "The expected folder and actual folder have differing file contents (only in expected: [{}]; only in actual: [{}])",
        .only_expected.join(", "),
        .only_actual.join(", ")
    )]
    DifferingFiles {
        only_expected: Vec<String>,
        only_actual: Vec<String>,
    },
}

impl InputError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Missing { .. } | Self::KindMismatch { .. } => 2,
            Self::DifferingFiles { .. } => 3,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Inputs {
    Files,
    Directories,
}

fn kind(path: &Path) -> &'static str {
    if path.is_file() { "file" } else { "folder" }
}

/// Decide whether the two paths are a file pair or a directory pair
pub fn classify(expected: &Path, actual: &Path) -> Result<Inputs, InputError> {
    if expected.is_file() && actual.is_file() {
        Ok(Inputs::Files)
    } else if expected.is_dir() && actual.is_dir() {
        Ok(Inputs::Directories)
    } else if !expected.exists() || !actual.exists() {
        Err(InputError::Missing {
            expected: expected.display().to_string(),
            actual: actual.display().to_string(),
        })
    } else {
        Err(InputError::KindMismatch {
            expected: kind(expected),
            actual: kind(actual),
        })
    }
}

/// Remove the first matching speaker label, then trim
pub fn strip_speaker<'a>(line: &'a str, prefixes: &[String]) -> &'a str {
    prefixes
        .iter()
        .find_map(|prefix| line.strip_prefix(prefix.as_str()))
        .unwrap_or(line)
        .trim()
}

pub fn read_lines(path: &Path, prefixes: &[String]) -> wer::Result<Vec<String>> {
    let raw = fs::read_to_string(path)?;
    Ok(raw
        .lines()
        .map(|line| strip_speaker(line, prefixes).to_string())
        .collect())
}

fn file_names(dir: &Path) -> anyhow::Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    let entries = fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        if entry.path().is_file() {
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

/// Pair files by name; both directories must hold exactly the same names
pub fn pair_directories(
    expected: &Path,
    actual: &Path,
) -> anyhow::Result<Vec<(String, PathBuf, PathBuf)>> {
    let expected_names = file_names(expected)?;
    let actual_names = file_names(actual)?;

    if expected_names != actual_names {
        return Err(InputError::DifferingFiles {
            only_expected: expected_names.difference(&actual_names).cloned().collect(),
            only_actual: actual_names.difference(&expected_names).cloned().collect(),
        }
        .into());
    }

    debug!("Paired {} files", expected_names.len());
    Ok(expected_names
        .into_iter()
        .map(|name| {
            let expected_file = expected.join(&name);
            let actual_file = actual.join(&name);
            (name, expected_file, actual_file)
        })
        .collect())
}

/// Paired transcripts ready to score, plus the names that could not be read
#[derive(Debug, Default)]
pub struct LoadedPairs {
    pub pairs: Vec<ComparisonPair>,
    pub unreadable: BTreeMap<String, wer::Error>,
}

/// Read every paired file; a file that cannot be read fails only its own pair
pub fn load_pairs(
    expected: &Path,
    actual: &Path,
    prefixes: &[String],
) -> anyhow::Result<LoadedPairs> {
    let mut loaded = LoadedPairs::default();
    for (name, expected_file, actual_file) in pair_directories(expected, actual)? {
        let read = read_lines(&expected_file, prefixes).and_then(|reference| {
            read_lines(&actual_file, prefixes).map(|hypothesis| (reference, hypothesis))
        });
        match read {
            Ok((reference, hypothesis)) => {
                loaded
                    .pairs
                    .push(ComparisonPair::new(name, reference, hypothesis));
            }
            Err(err) => {
                warn!("{}: cannot read transcript: {}", name, err);
                loaded.unreadable.insert(name, err);
            }
        }
    }
    Ok(loaded)
}
