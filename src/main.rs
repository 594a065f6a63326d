// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Sentiment benchmarking harness CLI
//!
//! Usage:
//!   sentiment-bench --dataset synthetic --seed 42
//!   sentiment-bench --dataset sentiment140 --format csv --path ./data/sentiment140.csv
//!   sentiment-bench --embeddings glove --classifiers LinearSVM,GaussianNaiveBayes

use anyhow::{bail, Result};
use clap::Parser;
use sentiment_bench::config::{
    DatasetArgs, DatasetSpec, EmbedConfig, EmbedMode, LoaderKind, NormalizeConfig, SplitFractions,
};
use sentiment_bench::harness::{Harness, HarnessConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sentiment-bench")]
#[command(about = "Cross-evaluate sentiment classifiers over embedding schemes and datasets")]
#[command(version)]
struct Args {
    /// Dataset identifier (used in result records and filenames)
    #[arg(short, long, default_value = "synthetic")]
    dataset: String,

    /// Dataset format (synthetic, csv, tsv)
    #[arg(short, long, default_value = "synthetic")]
    format: String,

    /// Path to the dataset file (required for csv/tsv)
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Label column index for csv datasets
    #[arg(long, default_value_t = 0)]
    label_column: usize,

    /// Text column index for csv datasets
    #[arg(long, default_value_t = 5)]
    text_column: usize,

    /// Number of samples for the synthetic dataset
    #[arg(short, long, default_value_t = 1000)]
    num_samples: usize,

    /// Embedding models to evaluate (comma-separated)
    #[arg(short, long, default_value = "glove,word2vec")]
    embeddings: String,

    /// Embedding aggregation mode (averaged, concatenated)
    #[arg(long, default_value = "averaged")]
    embed_mode: String,

    /// Token window for concatenated mode
    #[arg(long)]
    embed_window: Option<usize>,

    /// Specific classifiers to run (comma-separated, empty = all)
    #[arg(short, long)]
    classifiers: Option<String>,

    /// Random seed for reproducibility
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Shuffle samples after loading
    #[arg(long)]
    shuffle: bool,

    /// Minimum normalized text length; shorter samples are skipped
    #[arg(long)]
    min_length: Option<usize>,

    /// Maximum normalized text length; longer samples are truncated
    #[arg(long)]
    max_length: Option<usize>,

    /// Training fraction
    #[arg(long, default_value_t = 0.80)]
    train_fraction: f64,

    /// Dev fraction
    #[arg(long, default_value_t = 0.0)]
    dev_fraction: f64,

    /// Test fraction
    #[arg(long, default_value_t = 0.20)]
    test_fraction: f64,

    /// Output directory for result records
    #[arg(short, long, default_value = "results")]
    output: PathBuf,

    /// Abort the whole run on the first cell failure
    #[arg(long)]
    fail_fast: bool,
}

fn dataset_spec(args: &Args) -> Result<DatasetSpec> {
    let loader = match args.format.as_str() {
        "synthetic" => LoaderKind::Synthetic {
            size: args.num_samples,
        },
        "csv" => {
            let Some(ref path) = args.path else {
                bail!("--path is required for csv datasets");
            };
            LoaderKind::Csv {
                path: path.clone(),
                label_column: args.label_column,
                text_column: args.text_column,
            }
        }
        "tsv" => {
            let Some(ref path) = args.path else {
                bail!("--path is required for tsv datasets");
            };
            LoaderKind::Tsv { path: path.clone() }
        }
        other => bail!("unknown dataset format '{}' (expected synthetic, csv or tsv)", other),
    };

    let mode: EmbedMode = args.embed_mode.parse()?;
    let embed = EmbedConfig {
        mode,
        window: args.embed_window,
    };

    let normalize = if args.min_length.is_some() || args.max_length.is_some() {
        Some(NormalizeConfig {
            min_length: args.min_length,
            max_length: args.max_length,
            reverse: false,
            encoding: None,
        })
    } else {
        None
    };

    Ok(DatasetSpec {
        id: args.dataset.clone(),
        loader,
        args: DatasetArgs {
            embed,
            normalize,
            shuffle_after_load: args.shuffle,
        },
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    tracing::info!("Sentiment Classifier Benchmarking Harness");
    tracing::info!("=========================================");
    tracing::info!("Dataset: {} ({})", args.dataset, args.format);
    tracing::info!("Seed: {}", args.seed);

    let embeddings: Vec<String> = args
        .embeddings
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let classifier_filter: Vec<String> = args
        .classifiers
        .as_deref()
        .map(|c| c.split(',').map(|s| s.trim().to_string()).collect())
        .unwrap_or_default();

    let spec = dataset_spec(&args)?;

    let config = HarnessConfig {
        seed: args.seed,
        output_dir: args.output.clone(),
        fractions: SplitFractions {
            train: args.train_fraction,
            dev: args.dev_fraction,
            test: args.test_fraction,
        },
        embeddings,
        datasets: vec![spec],
        classifier_filter,
        isolate_failures: !args.fail_fast,
    };

    let harness = Harness::new(config)?;
    let summary = harness.run()?;

    // Print grid summary to console
    println!("\n{}", "=".repeat(78));
    println!("BENCHMARK SUMMARY");
    println!("{}", "=".repeat(78));
    println!(
        "{:<20} {:<12} {:<10} {:>9} {:>9} {:>8} {:>7}",
        "Classifier", "Dataset", "Embedding", "Accuracy", "F1", "Train(s)", "Test(s)"
    );
    println!("{:-<78}", "");

    for record in &summary.records {
        println!(
            "{:<20} {:<12} {:<10} {:>9.4} {:>9.4} {:>8.2} {:>7.3}",
            record.classifier,
            record.data.source,
            record.embedding.model,
            record.metrics.accuracy,
            record.metrics.f1,
            record.metrics.time_in_seconds_training,
            record.metrics.time_in_seconds_testing
        );
    }
    println!("{:-<78}", "");

    if !summary.failures.is_empty() {
        println!("\n{} cell(s) failed:", summary.failures.len());
        for failure in &summary.failures {
            println!(
                "  ({}, {}, {}): {}",
                failure.dataset, failure.embedding, failure.classifier, failure.error
            );
        }
    }

    println!(
        "\nResults written to: {} ({} records)",
        args.output.display(),
        summary.records.len()
    );
    println!("Benchmark complete!");

    Ok(())
}
