// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Dataset loaders for sentiment benchmarking
//!
//! Each loader turns a data source into (text, label) pairs with binary
//! sentiment labels (1.0 positive, 0.0 negative). Loaders report what the
//! source yields; the ingestion stage tracks the count of samples that were
//! actually usable.

use crate::config::{DatasetSpec, LoaderKind};
use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

/// A single (text, sentiment) pair produced by a loader
#[derive(Debug, Clone)]
pub struct RawSample {
    pub text: String,
    /// Binary sentiment score: 1.0 positive, 0.0 negative
    pub label: f32,
}

/// Interface every dataset source implements
pub trait DatasetLoader {
    /// Dataset identifier used in result records and filenames
    fn id(&self) -> &str;

    /// Produce the sample sequence; order is whatever the source yields
    fn load_data(&self) -> Result<Vec<RawSample>>;
}

/// Build the loader for a dataset spec
pub fn loader_for(spec: &DatasetSpec, seed: u64) -> Box<dyn DatasetLoader> {
    match &spec.loader {
        LoaderKind::Synthetic { size } => Box::new(SyntheticLoader {
            id: spec.id.clone(),
            size: *size,
            seed,
        }),
        LoaderKind::Csv {
            path,
            label_column,
            text_column,
        } => Box::new(CsvLoader {
            id: spec.id.clone(),
            path: path.clone(),
            label_column: *label_column,
            text_column: *text_column,
        }),
        LoaderKind::Tsv { path } => Box::new(TsvLoader {
            id: spec.id.clone(),
            path: path.clone(),
        }),
    }
}

/// CSV source with a numeric sentiment column and a text column
///
/// Covers sentiment140-style exports where the label column holds 0 for
/// negative and any positive value (e.g. 4) for positive.
pub struct CsvLoader {
    id: String,
    path: PathBuf,
    label_column: usize,
    text_column: usize,
}

impl CsvLoader {
    pub fn new(id: &str, path: PathBuf, label_column: usize, text_column: usize) -> Self {
        Self {
            id: id.to_string(),
            path,
            label_column,
            text_column,
        }
    }
}

impl DatasetLoader for CsvLoader {
    fn id(&self) -> &str {
        &self.id
    }

    fn load_data(&self) -> Result<Vec<RawSample>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open CSV dataset: {}", self.path.display()))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut samples = Vec::new();

        for (idx, result) in reader.records().enumerate() {
            let record = result
                .with_context(|| format!("Failed to read record {} in {}", idx, self.path.display()))?;

            let (raw_label, text) = match (record.get(self.label_column), record.get(self.text_column)) {
                (Some(label), Some(text)) => (label, text),
                _ => {
                    tracing::warn!(
                        "Skipping malformed record {} in {}: missing columns",
                        idx,
                        self.path.display()
                    );
                    continue;
                }
            };

            let score: f32 = raw_label.trim().parse().with_context(|| {
                format!(
                    "Invalid sentiment score '{}' at record {} in {}",
                    raw_label,
                    idx,
                    self.path.display()
                )
            })?;

            samples.push(RawSample {
                text: text.to_string(),
                label: if score > 0.0 { 1.0 } else { 0.0 },
            });
        }

        Ok(samples)
    }
}

/// Tab-separated `label<TAB>text` lines
pub struct TsvLoader {
    id: String,
    path: PathBuf,
}

impl TsvLoader {
    pub fn new(id: &str, path: PathBuf) -> Self {
        Self {
            id: id.to_string(),
            path,
        }
    }
}

impl DatasetLoader for TsvLoader {
    fn id(&self) -> &str {
        &self.id
    }

    fn load_data(&self) -> Result<Vec<RawSample>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open TSV dataset: {}", self.path.display()))?;
        let reader = BufReader::new(file);
        let mut samples = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line
                .with_context(|| format!("Failed to read line {} in {}", idx, self.path.display()))?;
            if line.is_empty() {
                continue;
            }

            let Some((raw_label, text)) = line.split_once('\t') else {
                tracing::warn!(
                    "Skipping malformed line {} in {}: no tab separator",
                    idx,
                    self.path.display()
                );
                continue;
            };

            let score: f32 = raw_label.trim().parse().with_context(|| {
                format!(
                    "Invalid sentiment score '{}' at line {} in {}",
                    raw_label,
                    idx,
                    self.path.display()
                )
            })?;

            samples.push(RawSample {
                text: text.to_string(),
                label: if score > 0.0 { 1.0 } else { 0.0 },
            });
        }

        Ok(samples)
    }
}

/// Seeded in-memory dataset for tests and development
pub struct SyntheticLoader {
    id: String,
    size: usize,
    seed: u64,
}

impl SyntheticLoader {
    pub fn new(id: &str, size: usize, seed: u64) -> Self {
        Self {
            id: id.to_string(),
            size,
            seed,
        }
    }
}

impl DatasetLoader for SyntheticLoader {
    fn id(&self) -> &str {
        &self.id
    }

    fn load_data(&self) -> Result<Vec<RawSample>> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let positive_phrases = [
            "absolutely loved this film, wonderful acting and a great story",
            "fantastic product, works exactly as described and arrived early",
            "one of the best purchases I have made this year, highly recommend",
            "brilliant direction and a moving performance from the entire cast",
            "excellent quality for the price, very happy with this",
        ];

        let negative_phrases = [
            "terrible movie, complete waste of time and money",
            "awful build quality, it broke within the first week",
            "one of the worst experiences I have had, do not recommend",
            "boring plot and wooden acting throughout, very disappointing",
            "poor value for the price, regret buying this",
        ];

        let samples = (0..self.size)
            .map(|i| {
                let positive = rng.gen_bool(0.5);
                let phrases = if positive {
                    &positive_phrases
                } else {
                    &negative_phrases
                };
                let phrase = phrases[rng.gen_range(0..phrases.len())];
                RawSample {
                    text: format!("{} (review {})", phrase, i),
                    label: if positive { 1.0 } else { 0.0 },
                }
            })
            .collect();

        Ok(samples)
    }
}
