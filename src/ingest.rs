// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Dataset ingestion stage
//!
//! Drives preprocessing and embedding over a loader's sample sequence to build
//! the feature matrix and label vector. A sample whose normalized text is too
//! short is skipped and counted; any other failure aborts ingestion. The
//! adjusted valid-sample count is part of the result value, never shared
//! mutable state on the loader.

use crate::config::{DatasetSpec, EmbedMode};
use crate::datasets::RawSample;
use crate::embedding::Embedder;
use crate::preprocess::{self, PreprocessError};
use anyhow::Result;

/// Feature matrix and label vector produced from one dataset
#[derive(Debug, Clone)]
pub struct Ingested {
    /// One fixed-dimension vector per accepted sample
    pub features: Vec<Vec<f32>>,
    /// Sentiment label per accepted sample, index-aligned with `features`
    pub labels: Vec<f32>,
    /// Samples accepted (raw count minus skipped)
    pub accepted: usize,
    /// Samples skipped for being too short
    pub skipped: usize,
}

const PROGRESS_INTERVAL: usize = 10_000;

/// Embed every usable sample into the feature matrix
pub fn ingest(
    samples: &[RawSample],
    spec: &DatasetSpec,
    embedder: &dyn Embedder,
) -> Result<Ingested> {
    let mut features = Vec::with_capacity(samples.len());
    let mut labels = Vec::with_capacity(samples.len());
    let mut skipped = 0usize;

    for (idx, sample) in samples.iter().enumerate() {
        if idx % PROGRESS_INTERVAL == 0 {
            tracing::info!("Embedding sample {} of {}...", idx, samples.len());
        }

        let tokens = match spec.args.normalize {
            Some(ref config) => match preprocess::normalize(&sample.text, config) {
                Ok(normalized) => preprocess::tokenize(&normalized),
                Err(PreprocessError::TextTooShort { .. }) => {
                    skipped += 1;
                    continue;
                }
                Err(err) => return Err(err.into()),
            },
            // No normalization configured: treat raw text as token input
            None => preprocess::tokenize(&sample.text),
        };

        let vector = match spec.args.embed.mode {
            EmbedMode::Averaged => embedder.embed_averaged(&tokens),
            EmbedMode::Concatenated => {
                embedder.embed_concatenated(&tokens, spec.args.embed.window())
            }
        };

        features.push(vector);
        labels.push(sample.label);
    }

    let accepted = features.len();
    debug_assert_eq!(accepted, labels.len());
    debug_assert_eq!(accepted + skipped, samples.len());

    Ok(Ingested {
        features,
        labels,
        accepted,
        skipped,
    })
}
