// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Text normalization and tokenization
//!
//! Normalization lowercases, strips non-alphanumeric noise and enforces the
//! dataset's length bounds. Too-short input is the one recoverable failure in
//! the whole ingestion path; the ingestion stage skips such samples.

use crate::config::NormalizeConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessError {
    /// Recoverable: the sample is skipped and the valid-sample count adjusted
    #[error("text too short after normalization ({len} chars, minimum {min})")]
    TextTooShort { len: usize, min: usize },

    #[error("unsupported encoding '{0}'")]
    UnsupportedEncoding(String),
}

impl PreprocessError {
    /// Whether the ingestion stage may skip the sample and continue
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PreprocessError::TextTooShort { .. })
    }
}

/// Normalize raw text per the dataset's options
pub fn normalize(text: &str, config: &NormalizeConfig) -> Result<String, PreprocessError> {
    if let Some(ref encoding) = config.encoding {
        // Input is already decoded to &str; anything but utf-8 is a config error
        if !encoding.eq_ignore_ascii_case("utf-8") && !encoding.eq_ignore_ascii_case("utf8") {
            return Err(PreprocessError::UnsupportedEncoding(encoding.clone()));
        }
    }

    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let mut normalized = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    if let Some(min) = config.min_length {
        let len = normalized.chars().count();
        if len < min {
            return Err(PreprocessError::TextTooShort { len, min });
        }
    }

    if let Some(max) = config.max_length {
        if normalized.chars().count() > max {
            normalized = normalized.chars().take(max).collect();
        }
    }

    if config.reverse {
        normalized = normalized.chars().rev().collect();
    }

    Ok(normalized)
}

/// Split normalized text into tokens on non-alphanumeric boundaries
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
