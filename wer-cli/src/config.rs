//! CLI configuration: optional JSON file overlaid with command-line flags

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;
use wer::{Error, NormalizationConfig};

use crate::Cli;

pub const DEFAULT_SPEAKER_PREFIXES: &[&str] = &["Agent:", "Customer:"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub normalization: NormalizationConfig,
    /// Labels stripped from the start of each line; the first match wins
    pub speaker_prefixes: Vec<String>,
    pub visualize: bool,
    pub markers: bool,
    pub format: OutputFormat,
    /// Abandon a directory comparison after this many seconds
    pub deadline_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            normalization: NormalizationConfig::default(),
            speaker_prefixes: DEFAULT_SPEAKER_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            visualize: false,
            markers: true,
            format: OutputFormat::Text,
            deadline_secs: None,
        }
    }
}

impl Config {
    /// Load `path` if given, otherwise start from defaults
    pub fn load(path: Option<&Path>) -> wer::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("invalid config {}: {e}", path.display())))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Flags given on the command line take precedence over the file
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(pattern) = &cli.ignore_pattern {
            self.normalization.ignore_pattern = Some(pattern.clone());
        }
        if cli.enforce_line_count {
            self.normalization.enforce_line_count = true;
        }
        if cli.visualize {
            self.visualize = true;
        }
        if cli.no_markers {
            self.markers = false;
        }
        if !cli.speaker_prefix.is_empty() {
            self.speaker_prefixes = cli.speaker_prefix.clone();
        }
        if let Some(format) = cli.format {
            self.format = format;
        }
        if cli.deadline_secs.is_some() {
            self.deadline_secs = cli.deadline_secs;
        }
        self
    }

    pub fn validate(&self) -> wer::Result<()> {
        if self.deadline_secs == Some(0) {
            return Err(Error::Config("deadline must be > 0 seconds".to_string()));
        }
        if self.speaker_prefixes.iter().any(String::is_empty) {
            return Err(Error::Config("speaker prefixes must not be empty".to_string()));
        }
        Ok(())
    }
}
