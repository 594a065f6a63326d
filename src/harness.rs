// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Grid orchestrator
//!
//! Runs the full embedding × dataset × classifier cross product: one embedder
//! per embedding model, one timed ingest + split per (embedding, dataset)
//! pair, one fresh classifier per grid cell with timed train and predict,
//! metrics and a persisted result record per cell.
//!
//! Non-recoverable cell failures are isolated by default: the error is
//! captured into a structured report under the output directory and the run
//! continues. With isolation off, the first failure aborts the run.

use crate::classifiers::{all_classifiers, Classifier};
use crate::config::{ConfigError, DatasetSpec, SplitFractions};
use crate::datasets::loader_for;
use crate::embedding::{default_embedding_models, embedder_for, Embedder};
use crate::ingest::ingest;
use crate::metrics::ClassificationReport;
use crate::results::{
    CellErrorReport, DataSummary, EmbeddingInfo, MetricsSummary, ResultRecord, ResultRecorder,
};
use crate::split::{shuffle_in_lockstep, split, Split};
use crate::timing::{timed, try_timed};
use anyhow::Result;
use chrono::Utc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

/// Configuration for one harness run
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Seed for shuffling, synthetic data and classifier randomness
    pub seed: u64,
    /// Directory for result records and error reports
    pub output_dir: PathBuf,
    pub fractions: SplitFractions,
    /// Embedding models to evaluate (outer loop)
    pub embeddings: Vec<String>,
    /// Datasets to evaluate (middle loop)
    pub datasets: Vec<DatasetSpec>,
    /// Classifier names to run (empty = all)
    pub classifier_filter: Vec<String>,
    /// Capture per-cell failures into error reports instead of aborting
    pub isolate_failures: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            output_dir: PathBuf::from("results"),
            fractions: SplitFractions::default(),
            embeddings: default_embedding_models(),
            datasets: Vec::new(),
            classifier_filter: Vec::new(),
            isolate_failures: true,
        }
    }
}

/// Outcome of one completed harness run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub records: Vec<ResultRecord>,
    pub failures: Vec<CellErrorReport>,
}

impl RunSummary {
    pub fn cells_evaluated(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}

/// Feature and label slices for one (embedding, dataset) pair
struct PreparedData {
    features: Split<Vec<f32>>,
    labels: Split<f32>,
    seconds_loading: f64,
}

/// The top-level evaluation harness
pub struct Harness {
    config: HarnessConfig,
}

impl Harness {
    /// Validate the configuration and build the harness; invalid embedding
    /// models, datasets or fractions fail here, before any data is touched
    pub fn new(config: HarnessConfig) -> Result<Self, ConfigError> {
        config.fractions.validate()?;
        for spec in &config.datasets {
            spec.validate()?;
        }
        for model in &config.embeddings {
            embedder_for(model, config.seed)?;
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run the full grid
    pub fn run(&self) -> Result<RunSummary> {
        let recorder = ResultRecorder::new(&self.config.output_dir);
        let mut records = Vec::new();
        let mut failures = Vec::new();

        let total_cells = self.config.embeddings.len()
            * self.config.datasets.len()
            * all_classifiers(self.config.seed).len();
        tracing::info!(
            "Evaluating grid: {} embeddings x {} datasets x classifiers = {} cells",
            self.config.embeddings.len(),
            self.config.datasets.len(),
            total_cells
        );

        for model in &self.config.embeddings {
            // Validated in new(); a failure here is a programming error
            let embedder = embedder_for(model, self.config.seed)
                .map_err(anyhow::Error::from)?;

            for spec in &self.config.datasets {
                let prepared = match self.prepare_pair(&embedder, spec) {
                    Ok(prepared) => prepared,
                    Err(err) => {
                        // The whole (embedding, dataset) pair is lost; report
                        // it once with a wildcard classifier
                        self.handle_failure(
                            &recorder,
                            &mut failures,
                            spec.id.clone(),
                            model.clone(),
                            "*".to_string(),
                            err,
                        )?;
                        continue;
                    }
                };

                tracing::info!(
                    "Training on {}, testing on {}...",
                    prepared.labels.train.len(),
                    prepared.labels.test.len()
                );

                for classifier in all_classifiers(self.config.seed) {
                    let name = classifier.name().to_string();
                    if !self.config.classifier_filter.is_empty()
                        && !self.config.classifier_filter.contains(&name)
                    {
                        continue;
                    }

                    match self.run_cell(&embedder, spec, &prepared, classifier, &recorder) {
                        Ok(record) => records.push(record),
                        Err(err) => self.handle_failure(
                            &recorder,
                            &mut failures,
                            spec.id.clone(),
                            model.clone(),
                            name,
                            err,
                        )?,
                    }
                }
            }
        }

        tracing::info!(
            "Grid complete: {} records, {} failures",
            records.len(),
            failures.len()
        );

        Ok(RunSummary { records, failures })
    }

    /// Load, ingest, shuffle and split one (embedding, dataset) pair
    fn prepare_pair(&self, embedder: &dyn Embedder, spec: &DatasetSpec) -> Result<PreparedData> {
        let loader = loader_for(spec, self.config.seed);
        tracing::info!("Loading dataset {}...", spec.id);

        let loaded = try_timed(|| -> Result<_> {
            let samples = loader.load_data()?;
            ingest(&samples, spec, embedder)
        })?;
        let seconds_loading = loaded.elapsed_seconds;
        let ingested = loaded.value;

        tracing::info!(
            "Loaded {} samples ({} skipped) in {:.2}s",
            ingested.accepted,
            ingested.skipped,
            seconds_loading
        );

        let mut features = ingested.features;
        let mut labels = ingested.labels;

        if spec.args.shuffle_after_load {
            let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
            shuffle_in_lockstep(&mut features, &mut labels, &mut rng);
        }

        // Both sequences are split with the same boundaries over the same
        // index order, so the pairing survives partitioning
        let features = split(&features, &self.config.fractions);
        let labels = split(&labels, &self.config.fractions);

        Ok(PreparedData {
            features,
            labels,
            seconds_loading,
        })
    }

    /// Train, test, score and persist one grid cell
    fn run_cell(
        &self,
        embedder: &dyn Embedder,
        spec: &DatasetSpec,
        prepared: &PreparedData,
        mut classifier: Box<dyn Classifier>,
        recorder: &ResultRecorder,
    ) -> Result<ResultRecord> {
        tracing::info!("Training {} classifier...", classifier.name());
        let training = timed(|| classifier.train(&prepared.features.train, &prepared.labels.train));

        tracing::info!("Testing {} classifier...", classifier.name());
        let testing = timed(|| classifier.predict(&prepared.features.test));
        let predictions = &testing.value;

        let report = ClassificationReport::from_labels(&prepared.labels.test, predictions);

        let testsize = prepared.labels.test.len();
        let positive = prepared.labels.test.iter().filter(|l| **l > 0.5).count();

        let record = ResultRecord {
            classifier: classifier.name().to_string(),
            data: DataSummary {
                source: spec.id.clone(),
                testsize,
                positive,
                negative: testsize - positive,
                time_in_seconds_loading: prepared.seconds_loading,
            },
            embedding: EmbeddingInfo {
                model: embedder.model_name().to_string(),
                subset: embedder.model_subset().to_string(),
            },
            data_args: spec.args.clone(),
            metrics: MetricsSummary::new(&report, training.elapsed_seconds, testing.elapsed_seconds),
        };

        recorder.append(&record)?;
        Ok(record)
    }

    /// Either record an isolated failure or abort the run
    fn handle_failure(
        &self,
        recorder: &ResultRecorder,
        failures: &mut Vec<CellErrorReport>,
        dataset: String,
        embedding: String,
        classifier: String,
        err: anyhow::Error,
    ) -> Result<()> {
        if !self.config.isolate_failures {
            return Err(err);
        }

        tracing::error!(
            "Cell ({}, {}, {}) failed: {:#}",
            dataset,
            embedding,
            classifier,
            err
        );

        let report = CellErrorReport {
            dataset,
            embedding,
            classifier,
            error: format!("{:#}", err),
            timestamp: Utc::now(),
        };
        recorder.append_error(&report)?;
        failures.push(report);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatasetArgs, EmbedConfig, LoaderKind};
    use crate::metrics::ConfusionMatrix;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "sentiment_bench_harness_{}_{}",
            std::process::id(),
            name
        ));
        std::fs::remove_dir_all(&dir).ok();
        dir
    }

    fn synthetic_spec(shuffle: bool) -> DatasetSpec {
        DatasetSpec {
            id: "synthetic".to_string(),
            loader: LoaderKind::Synthetic { size: 100 },
            args: DatasetArgs {
                embed: EmbedConfig::averaged(),
                normalize: None,
                shuffle_after_load: shuffle,
            },
        }
    }

    #[test]
    fn test_full_grid_cell_count() {
        let dir = temp_dir("grid");
        let config = HarnessConfig {
            output_dir: dir.clone(),
            embeddings: vec!["glove".to_string(), "word2vec".to_string()],
            datasets: vec![synthetic_spec(true)],
            ..Default::default()
        };

        let harness = Harness::new(config).unwrap();
        let summary = harness.run().unwrap();

        // 2 embeddings x 1 dataset x 4 classifiers
        assert_eq!(summary.records.len(), 8);
        assert!(summary.failures.is_empty());

        for record in &summary.records {
            assert_eq!(record.data.testsize, 20);
            assert_eq!(record.data.positive + record.data.negative, 20);
            assert!((0.0..=1.0).contains(&record.metrics.accuracy));
            assert!(dir.join(record.filename()).is_file());
        }

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_classifier_filter() {
        let dir = temp_dir("filter");
        let config = HarnessConfig {
            output_dir: dir.clone(),
            embeddings: vec!["glove".to_string()],
            datasets: vec![synthetic_spec(false)],
            classifier_filter: vec!["LinearSVM".to_string()],
            ..Default::default()
        };

        let summary = Harness::new(config).unwrap().run().unwrap();
        assert_eq!(summary.records.len(), 1);
        assert_eq!(summary.records[0].classifier, "LinearSVM");

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_unknown_embedding_rejected_at_startup() {
        let config = HarnessConfig {
            embeddings: vec!["fasttext".to_string()],
            datasets: vec![synthetic_spec(false)],
            ..Default::default()
        };
        assert!(Harness::new(config).is_err());
    }

    #[test]
    fn test_missing_dataset_isolated_into_error_report() {
        let dir = temp_dir("isolated");
        let config = HarnessConfig {
            output_dir: dir.clone(),
            embeddings: vec!["glove".to_string()],
            datasets: vec![DatasetSpec {
                id: "imdb".to_string(),
                loader: LoaderKind::Tsv {
                    path: PathBuf::from("/nonexistent/imdb.tsv"),
                },
                args: DatasetArgs {
                    embed: EmbedConfig::averaged(),
                    normalize: None,
                    shuffle_after_load: false,
                },
            }],
            ..Default::default()
        };

        let summary = Harness::new(config).unwrap().run().unwrap();
        assert!(summary.records.is_empty());
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].classifier, "*");
        assert!(dir.join("errors").is_dir());

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_dataset_fatal_without_isolation() {
        let dir = temp_dir("fatal");
        let config = HarnessConfig {
            output_dir: dir.clone(),
            embeddings: vec!["glove".to_string()],
            datasets: vec![DatasetSpec {
                id: "imdb".to_string(),
                loader: LoaderKind::Tsv {
                    path: PathBuf::from("/nonexistent/imdb.tsv"),
                },
                args: DatasetArgs {
                    embed: EmbedConfig::averaged(),
                    normalize: None,
                    shuffle_after_load: false,
                },
            }],
            isolate_failures: false,
            ..Default::default()
        };

        assert!(Harness::new(config).unwrap().run().is_err());
        std::fs::remove_dir_all(dir).ok();
    }

    /// Always predicts the majority class seen in training
    struct MajorityClassifier {
        majority: f32,
    }

    impl Classifier for MajorityClassifier {
        fn train(&mut self, _features: &[Vec<f32>], labels: &[f32]) {
            let positive = labels.iter().filter(|l| **l > 0.5).count();
            self.majority = if positive * 2 > labels.len() { 1.0 } else { 0.0 };
        }

        fn predict(&self, features: &[Vec<f32>]) -> Vec<f32> {
            vec![self.majority; features.len()]
        }

        fn name(&self) -> &str {
            "Majority"
        }

        fn description(&self) -> &str {
            "Majority-class reference"
        }
    }

    #[test]
    fn test_end_to_end_majority_scenario() {
        // 10 samples, first five positive, no shuffle: the 8 training samples
        // hold 5 positives, so majority = 1.0; both test labels are 0.0
        let labels: Vec<f32> = vec![1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let features: Vec<Vec<f32>> = labels.iter().map(|l| vec![*l, 1.0 - l]).collect();

        let fractions = SplitFractions::default();
        let feature_split = split(&features, &fractions);
        let label_split = split(&labels, &fractions);
        assert_eq!(label_split.train.len(), 8);
        assert_eq!(label_split.test.len(), 2);

        let mut classifier = MajorityClassifier { majority: 0.0 };
        classifier.train(&feature_split.train, &label_split.train);
        let predictions = classifier.predict(&feature_split.test);

        let cm = ConfusionMatrix::from_labels(&label_split.test, &predictions);
        assert_eq!(cm.total(), 2);

        // Test accuracy equals the fraction of test labels matching the
        // training majority (here: none)
        let majority = 1.0;
        let expected = label_split
            .test
            .iter()
            .filter(|l| (**l - majority).abs() < 0.5)
            .count() as f64
            / label_split.test.len() as f64;
        assert!((cm.accuracy() - expected).abs() < 1e-9);
        assert_eq!(cm.accuracy(), 0.0);
        assert_eq!(cm.fp, 2);
    }
}
