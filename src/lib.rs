// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Benchmarking harness for sentiment classifiers
//!
//! This crate provides:
//! - Dataset loaders yielding (text, sentiment) pairs
//! - Text normalization and tokenization with a recoverable too-short skip
//! - Word-vector embedding (averaged and concatenated aggregation)
//! - Lock-step shuffle and train/dev/test split
//! - Four classifiers (logistic regression, random forest, Gaussian naive
//!   Bayes, linear SVM) behind an opaque train/predict trait
//! - Confusion-matrix metrics (accuracy, precision, recall, F1)
//! - Structured per-cell result records appended to JSON files
//! - A grid orchestrator over the embedding x dataset x classifier cross
//!   product with timed train/test/load phases

pub mod classifiers;
pub mod config;
pub mod datasets;
pub mod embedding;
pub mod harness;
pub mod ingest;
pub mod metrics;
pub mod preprocess;
pub mod results;
pub mod split;
pub mod timing;

pub use classifiers::{all_classifiers, Classifier};
pub use config::{DatasetArgs, DatasetSpec, EmbedConfig, EmbedMode, NormalizeConfig, SplitFractions};
pub use datasets::{DatasetLoader, RawSample};
pub use embedding::{embedder_for, Embedder, HashEmbedder};
pub use harness::{Harness, HarnessConfig, RunSummary};
pub use ingest::{ingest, Ingested};
pub use metrics::{ClassificationReport, ConfusionMatrix};
pub use results::{CellErrorReport, ResultRecord, ResultRecorder};
pub use split::{shuffle_in_lockstep, split, Split};
pub use timing::{timed, try_timed, Timed};
