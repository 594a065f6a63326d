// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Harness configuration
//!
//! Explicit, serde-backed configuration structs replace ad-hoc option bags.
//! Everything is validated once at startup; an unrecognized embedding mode or
//! an inconsistent split fraction fails loudly before any data is loaded.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown embedding mode '{0}' (expected 'averaged' or 'concatenated')")]
    UnknownEmbedMode(String),

    #[error("unknown embedding model '{0}'")]
    UnknownEmbeddingModel(String),

    #[error("dataset '{id}': {reason}")]
    InvalidDataset { id: String, reason: String },

    #[error("invalid split fractions (train={train}, dev={dev}, test={test}): {reason}")]
    InvalidFractions {
        train: f64,
        dev: f64,
        test: f64,
        reason: String,
    },
}

/// Token aggregation mode for the embedding step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedMode {
    /// One fixed-dimension vector averaged over the whole token sequence
    Averaged,
    /// Per-token vectors concatenated up to a fixed window, zero-padded
    Concatenated,
}

impl FromStr for EmbedMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "averaged" => Ok(EmbedMode::Averaged),
            "concatenated" => Ok(EmbedMode::Concatenated),
            other => Err(ConfigError::UnknownEmbedMode(other.to_string())),
        }
    }
}

/// Embedding options for a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedConfig {
    #[serde(rename = "type")]
    pub mode: EmbedMode,
    /// Token window for concatenated mode (ignored in averaged mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<usize>,
}

impl EmbedConfig {
    pub const DEFAULT_WINDOW: usize = 10;

    pub fn averaged() -> Self {
        Self {
            mode: EmbedMode::Averaged,
            window: None,
        }
    }

    pub fn concatenated(window: usize) -> Self {
        Self {
            mode: EmbedMode::Concatenated,
            window: Some(window),
        }
    }

    pub fn window(&self) -> usize {
        self.window.unwrap_or(Self::DEFAULT_WINDOW)
    }
}

/// Text normalization options for a dataset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Minimum normalized length in characters; shorter texts are skipped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum normalized length in characters; longer texts are truncated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Reverse the normalized text before tokenization
    #[serde(default)]
    pub reverse: bool,
    /// Expected input encoding; only utf-8 is supported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

/// How to construct the loader for a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum LoaderKind {
    /// Seeded in-memory generator for tests and development
    Synthetic { size: usize },
    /// CSV file with numeric label and text columns (sentiment140-style)
    Csv {
        path: PathBuf,
        label_column: usize,
        text_column: usize,
    },
    /// Tab-separated label<TAB>text lines (IMDB-style exports)
    Tsv { path: PathBuf },
}

/// Per-dataset configuration bag, echoed verbatim into result records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetArgs {
    pub embed: EmbedConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalize: Option<NormalizeConfig>,
    #[serde(default)]
    pub shuffle_after_load: bool,
}

/// One dataset entry in the evaluation grid; immutable after startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSpec {
    pub id: String,
    pub loader: LoaderKind,
    pub args: DatasetArgs,
}

impl DatasetSpec {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id.is_empty() {
            return Err(ConfigError::InvalidDataset {
                id: "<empty>".to_string(),
                reason: "dataset id must not be empty".to_string(),
            });
        }

        if let EmbedMode::Concatenated = self.args.embed.mode {
            if self.args.embed.window() == 0 {
                return Err(ConfigError::InvalidDataset {
                    id: self.id.clone(),
                    reason: "concatenated embedding window must be at least 1".to_string(),
                });
            }
        }

        if let Some(ref norm) = self.args.normalize {
            if let (Some(min), Some(max)) = (norm.min_length, norm.max_length) {
                if min > max {
                    return Err(ConfigError::InvalidDataset {
                        id: self.id.clone(),
                        reason: format!("min_length {} exceeds max_length {}", min, max),
                    });
                }
            }
            if let Some(ref enc) = norm.encoding {
                if !enc.eq_ignore_ascii_case("utf-8") && !enc.eq_ignore_ascii_case("utf8") {
                    return Err(ConfigError::InvalidDataset {
                        id: self.id.clone(),
                        reason: format!("unsupported encoding '{}'", enc),
                    });
                }
            }
        }

        if let LoaderKind::Synthetic { size } = self.loader {
            if size == 0 {
                return Err(ConfigError::InvalidDataset {
                    id: self.id.clone(),
                    reason: "synthetic dataset size must be at least 1".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Train/dev/test partition fractions
///
/// The train and dev boundaries are floored; everything past the dev boundary
/// goes to the test slice, so the three slices always cover the whole input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SplitFractions {
    pub train: f64,
    pub dev: f64,
    pub test: f64,
}

impl Default for SplitFractions {
    fn default() -> Self {
        Self {
            train: 0.80,
            dev: 0.0,
            test: 0.20,
        }
    }
}

impl SplitFractions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fractions = [self.train, self.dev, self.test];
        if fractions.iter().any(|f| !(0.0..=1.0).contains(f)) {
            return Err(ConfigError::InvalidFractions {
                train: self.train,
                dev: self.dev,
                test: self.test,
                reason: "each fraction must be within [0, 1]".to_string(),
            });
        }
        let sum: f64 = fractions.iter().sum();
        if sum > 1.0 + 1e-9 {
            return Err(ConfigError::InvalidFractions {
                train: self.train,
                dev: self.dev,
                test: self.test,
                reason: format!("fractions sum to {:.4}, must not exceed 1.0", sum),
            });
        }
        Ok(())
    }
}
