// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Result persistence
//!
//! One structured record per grid cell, appended as a pretty-printed,
//! key-sorted JSON document to a file keyed by (dataset, embedding,
//! classifier). Files are never truncated within a run. Numeric fields are
//! written as native JSON numbers.

use crate::config::DatasetArgs;
use crate::metrics::ClassificationReport;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Test-set summary for one grid cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSummary {
    pub source: String,
    pub testsize: usize,
    pub positive: usize,
    pub negative: usize,
    pub time_in_seconds_loading: f64,
}

/// Embedding model metadata recorded with each cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingInfo {
    pub model: String,
    pub subset: String,
}

/// Confusion counts, derived metrics and timings for one grid cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    #[serde(rename = "TP")]
    pub tp: usize,
    #[serde(rename = "FP")]
    pub fp: usize,
    #[serde(rename = "TN")]
    pub tn: usize,
    #[serde(rename = "FN")]
    pub fn_: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub time_in_seconds_training: f64,
    pub time_in_seconds_testing: f64,
}

impl MetricsSummary {
    pub fn new(report: &ClassificationReport, training_seconds: f64, testing_seconds: f64) -> Self {
        Self {
            tp: report.confusion_matrix.tp,
            fp: report.confusion_matrix.fp,
            tn: report.confusion_matrix.tn,
            fn_: report.confusion_matrix.fn_,
            accuracy: report.accuracy,
            precision: report.precision,
            recall: report.recall,
            f1: report.f1_score,
            time_in_seconds_training: training_seconds,
            time_in_seconds_testing: testing_seconds,
        }
    }
}

/// Everything persisted for one (dataset, embedding, classifier) cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    pub classifier: String,
    pub data: DataSummary,
    pub embedding: EmbeddingInfo,
    /// Echo of the dataset's configuration bag
    pub data_args: DatasetArgs,
    pub metrics: MetricsSummary,
}

impl ResultRecord {
    /// Output filename for this record's grid cell
    pub fn filename(&self) -> String {
        format!(
            "{}_{}_{}.json",
            self.data.source, self.embedding.model, self.classifier
        )
    }
}

/// Structured report for a grid cell that failed non-recoverably
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellErrorReport {
    pub dataset: String,
    pub embedding: String,
    pub classifier: String,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

/// Appends result records and error reports under the output directory
pub struct ResultRecorder {
    dir: PathBuf,
}

impl ResultRecorder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Append one record to its per-cell file, creating the directory if
    /// absent; existing content is preserved
    pub fn append(&self, record: &ResultRecord) -> Result<PathBuf> {
        let path = self.dir.join(record.filename());
        self.append_document(&path, record)?;
        tracing::info!("Saved results to {}", path.display());
        Ok(path)
    }

    /// Append a per-cell error report under `errors/`
    pub fn append_error(&self, report: &CellErrorReport) -> Result<PathBuf> {
        let path = self.dir.join("errors").join(format!(
            "{}_{}_{}.error.json",
            report.dataset, report.embedding, report.classifier
        ));
        self.append_document(&path, report)?;
        tracing::warn!("Saved error report to {}", path.display());
        Ok(path)
    }

    fn append_document<T: Serialize>(&self, path: &Path, document: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
        }

        // Round-trip through Value so object keys come out sorted
        let value = serde_json::to_value(document)?;
        let json = serde_json::to_string_pretty(&value)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open result file {}", path.display()))?;
        writeln!(file, "{}", json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatasetArgs, EmbedConfig};
    use crate::metrics::ConfusionMatrix;
    use serde_json::Value;

    fn test_record(accuracy: f64) -> ResultRecord {
        let report = ClassificationReport::from_confusion_matrix(ConfusionMatrix {
            tp: 8,
            fp: 1,
            tn: 9,
            fn_: 2,
        });
        let mut metrics = MetricsSummary::new(&report, 0.5, 0.01);
        metrics.accuracy = accuracy;

        ResultRecord {
            classifier: "LogisticRegression".to_string(),
            data: DataSummary {
                source: "synthetic".to_string(),
                testsize: 20,
                positive: 10,
                negative: 10,
                time_in_seconds_loading: 1.25,
            },
            embedding: EmbeddingInfo {
                model: "glove".to_string(),
                subset: "6B.50d".to_string(),
            },
            data_args: DatasetArgs {
                embed: EmbedConfig::averaged(),
                normalize: None,
                shuffle_after_load: true,
            },
            metrics,
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "sentiment_bench_results_{}_{}",
            std::process::id(),
            name
        ));
        std::fs::remove_dir_all(&dir).ok();
        dir
    }

    fn parse_documents(content: &str) -> Vec<Value> {
        serde_json::Deserializer::from_str(content)
            .into_iter::<Value>()
            .collect::<Result<Vec<_>, _>>()
            .expect("file should hold valid JSON documents")
    }

    #[test]
    fn test_append_twice_preserves_both_records() {
        let dir = temp_dir("append");
        let recorder = ResultRecorder::new(&dir);

        let first = recorder.append(&test_record(0.85)).unwrap();
        let second = recorder.append(&test_record(0.91)).unwrap();
        assert_eq!(first, second);

        let content = std::fs::read_to_string(&first).unwrap();
        let documents = parse_documents(&content);
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0]["metrics"]["accuracy"], 0.85);
        assert_eq!(documents[1]["metrics"]["accuracy"], 0.91);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_filename_keyed_by_cell() {
        let record = test_record(0.5);
        assert_eq!(record.filename(), "synthetic_glove_LogisticRegression.json");
    }

    #[test]
    fn test_record_schema() {
        let dir = temp_dir("schema");
        let recorder = ResultRecorder::new(&dir);
        let path = recorder.append(&test_record(0.85)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let document = &parse_documents(&content)[0];

        assert_eq!(document["classifier"], "LogisticRegression");
        assert_eq!(document["data"]["source"], "synthetic");
        assert_eq!(document["data"]["testsize"], 20);
        assert_eq!(document["embedding"]["model"], "glove");
        assert_eq!(document["embedding"]["subset"], "6B.50d");
        assert_eq!(document["data_args"]["embed"]["type"], "averaged");
        assert_eq!(document["metrics"]["TP"], 8);
        assert_eq!(document["metrics"]["FN"], 2);
        assert!(document["metrics"]["time_in_seconds_training"].is_f64());

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_directory_creation_idempotent() {
        let dir = temp_dir("mkdir");
        let recorder = ResultRecorder::new(&dir);
        recorder.append(&test_record(0.5)).unwrap();
        recorder.append(&test_record(0.6)).unwrap();
        assert!(dir.is_dir());
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_error_report_append() {
        let dir = temp_dir("errors");
        let recorder = ResultRecorder::new(&dir);

        let report = CellErrorReport {
            dataset: "imdb".to_string(),
            embedding: "glove".to_string(),
            classifier: "LinearSVM".to_string(),
            error: "training aborted".to_string(),
            timestamp: Utc::now(),
        };
        let path = recorder.append_error(&report).unwrap();
        assert!(path.starts_with(dir.join("errors")));

        let content = std::fs::read_to_string(&path).unwrap();
        let documents = parse_documents(&content);
        assert_eq!(documents[0]["error"], "training aborted");

        std::fs::remove_dir_all(dir).ok();
    }
}
