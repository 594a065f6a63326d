// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Sentiment classifiers evaluated by the harness
//!
//! Implements:
//! - Logistic regression (SGD, L2 penalty)
//! - Random forest of bagged decision stumps
//! - Gaussian naive Bayes
//! - Linear SVM (hinge-loss SGD)
//!
//! The harness treats every model opaquely through the `Classifier` trait:
//! train once on the train slice, predict once on the test slice. A fresh
//! instance is created per grid cell, so no state leaks between cells.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Trainable/predictable model interface
pub trait Classifier {
    /// Fit the model; features and labels are index-aligned
    fn train(&mut self, features: &[Vec<f32>], labels: &[f32]);

    /// Predict a binary label (0.0 or 1.0) per feature row
    fn predict(&self, features: &[Vec<f32>]) -> Vec<f32>;

    /// Model name used in result records and filenames
    fn name(&self) -> &str;

    fn description(&self) -> &str;
}

/// Fresh instances of every classifier variant, one set per grid cell
pub fn all_classifiers(seed: u64) -> Vec<Box<dyn Classifier>> {
    vec![
        Box::new(LogisticRegression::new(seed)),
        Box::new(RandomForest::new(seed)),
        Box::new(GaussianNaiveBayes::new()),
        Box::new(LinearSvm::new(seed)),
    ]
}

fn dot(weights: &[f32], x: &[f32]) -> f32 {
    weights.iter().zip(x).map(|(w, v)| w * v).sum()
}

fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

/// Logistic regression trained with stochastic gradient descent
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    weights: Vec<f32>,
    bias: f32,
    learning_rate: f32,
    l2: f32,
    epochs: usize,
    seed: u64,
}

impl LogisticRegression {
    pub fn new(seed: u64) -> Self {
        Self {
            weights: Vec::new(),
            bias: 0.0,
            learning_rate: 0.1,
            l2: 1e-4,
            epochs: 100,
            seed,
        }
    }
}

impl Classifier for LogisticRegression {
    fn train(&mut self, features: &[Vec<f32>], labels: &[f32]) {
        let dims = features.first().map_or(0, Vec::len);
        self.weights = vec![0.0; dims];
        self.bias = 0.0;
        if dims == 0 || features.is_empty() {
            return;
        }

        let mut order: Vec<usize> = (0..features.len()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        for _ in 0..self.epochs {
            order.shuffle(&mut rng);
            for &i in &order {
                let p = sigmoid(dot(&self.weights, &features[i]) + self.bias);
                let err = p - labels[i];
                for (w, x) in self.weights.iter_mut().zip(&features[i]) {
                    *w -= self.learning_rate * (err * x + self.l2 * *w);
                }
                self.bias -= self.learning_rate * err;
            }
        }
    }

    fn predict(&self, features: &[Vec<f32>]) -> Vec<f32> {
        features
            .iter()
            .map(|x| {
                let p = sigmoid(dot(&self.weights, x) + self.bias);
                if p > 0.5 {
                    1.0
                } else {
                    0.0
                }
            })
            .collect()
    }

    fn name(&self) -> &str {
        "LogisticRegression"
    }

    fn description(&self) -> &str {
        "Logistic regression, SGD with L2 penalty"
    }
}

#[derive(Debug, Clone)]
struct Stump {
    feature: usize,
    threshold: f32,
    below: f32,
    above: f32,
}

impl Stump {
    fn classify(&self, x: &[f32]) -> f32 {
        let value = x.get(self.feature).copied().unwrap_or(0.0);
        if value <= self.threshold {
            self.below
        } else {
            self.above
        }
    }
}

/// Random forest of bagged decision stumps
///
/// Each tree draws a bootstrap sample, tries sqrt(dims) random features and
/// keeps the stump with the fewest misclassifications on its bootstrap.
#[derive(Debug, Clone)]
pub struct RandomForest {
    stumps: Vec<Stump>,
    n_trees: usize,
    seed: u64,
}

impl RandomForest {
    pub fn new(seed: u64) -> Self {
        Self {
            stumps: Vec::new(),
            n_trees: 15,
            seed,
        }
    }

    fn fit_stump(
        sample: &[usize],
        features: &[Vec<f32>],
        labels: &[f32],
        feature_idx: usize,
    ) -> (Stump, usize) {
        // Threshold at the bootstrap mean of the feature
        let mean: f32 = sample
            .iter()
            .map(|&i| features[i].get(feature_idx).copied().unwrap_or(0.0))
            .sum::<f32>()
            / sample.len() as f32;

        let mut below_pos = 0usize;
        let mut below_neg = 0usize;
        let mut above_pos = 0usize;
        let mut above_neg = 0usize;

        for &i in sample {
            let value = features[i].get(feature_idx).copied().unwrap_or(0.0);
            let positive = labels[i] > 0.5;
            match (value <= mean, positive) {
                (true, true) => below_pos += 1,
                (true, false) => below_neg += 1,
                (false, true) => above_pos += 1,
                (false, false) => above_neg += 1,
            }
        }

        let below = if below_pos >= below_neg { 1.0 } else { 0.0 };
        let above = if above_pos >= above_neg { 1.0 } else { 0.0 };
        let below_errors = if below > 0.5 { below_neg } else { below_pos };
        let above_errors = if above > 0.5 { above_neg } else { above_pos };
        let errors = below_errors + above_errors;

        (
            Stump {
                feature: feature_idx,
                threshold: mean,
                below,
                above,
            },
            errors,
        )
    }
}

impl Classifier for RandomForest {
    fn train(&mut self, features: &[Vec<f32>], labels: &[f32]) {
        self.stumps.clear();
        let n = features.len();
        let dims = features.first().map_or(0, Vec::len);
        if n == 0 || dims == 0 {
            return;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let candidates = ((dims as f64).sqrt().ceil() as usize).max(1);

        for _ in 0..self.n_trees {
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();

            let mut best: Option<(Stump, usize)> = None;
            for _ in 0..candidates {
                let feature_idx = rng.gen_range(0..dims);
                let (stump, errors) = Self::fit_stump(&sample, features, labels, feature_idx);
                if best.as_ref().map_or(true, |(_, e)| errors < *e) {
                    best = Some((stump, errors));
                }
            }

            if let Some((stump, _)) = best {
                self.stumps.push(stump);
            }
        }
    }

    fn predict(&self, features: &[Vec<f32>]) -> Vec<f32> {
        features
            .iter()
            .map(|x| {
                let positive_votes = self
                    .stumps
                    .iter()
                    .filter(|stump| stump.classify(x) > 0.5)
                    .count();
                if positive_votes * 2 > self.stumps.len() {
                    1.0
                } else {
                    0.0
                }
            })
            .collect()
    }

    fn name(&self) -> &str {
        "RandomForest"
    }

    fn description(&self) -> &str {
        "Bagged decision stumps with random feature candidates"
    }
}

#[derive(Debug, Clone, Default)]
struct ClassStats {
    prior: f32,
    means: Vec<f32>,
    variances: Vec<f32>,
}

impl ClassStats {
    fn fit(rows: &[&Vec<f32>], dims: usize, prior: f32) -> Self {
        let mut means = vec![0.0f32; dims];
        let mut variances = vec![0.0f32; dims];

        if !rows.is_empty() {
            for row in rows {
                for (m, v) in means.iter_mut().zip(row.iter()) {
                    *m += v;
                }
            }
            let n = rows.len() as f32;
            for m in &mut means {
                *m /= n;
            }
            for row in rows {
                for ((var, v), m) in variances.iter_mut().zip(row.iter()).zip(&means) {
                    *var += (v - m) * (v - m);
                }
            }
            for var in &mut variances {
                *var /= n;
            }
        }

        Self {
            prior,
            means,
            variances,
        }
    }

    fn log_likelihood(&self, x: &[f32]) -> f32 {
        if self.prior <= 0.0 {
            return f32::NEG_INFINITY;
        }

        // Variance smoothing keeps constant features from zeroing the density
        const VAR_SMOOTHING: f32 = 1e-6;
        let mut score = self.prior.ln();
        for ((value, mean), variance) in x.iter().zip(&self.means).zip(&self.variances) {
            let var = variance + VAR_SMOOTHING;
            score += -0.5 * (2.0 * std::f32::consts::PI * var).ln()
                - (value - mean) * (value - mean) / (2.0 * var);
        }
        score
    }
}

/// Gaussian naive Bayes over per-class feature means and variances
#[derive(Debug, Clone, Default)]
pub struct GaussianNaiveBayes {
    positive: ClassStats,
    negative: ClassStats,
}

impl GaussianNaiveBayes {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Classifier for GaussianNaiveBayes {
    fn train(&mut self, features: &[Vec<f32>], labels: &[f32]) {
        let dims = features.first().map_or(0, Vec::len);
        let total = features.len();
        if total == 0 {
            self.positive = ClassStats::default();
            self.negative = ClassStats::default();
            return;
        }

        let positive_rows: Vec<&Vec<f32>> = features
            .iter()
            .zip(labels)
            .filter(|(_, l)| **l > 0.5)
            .map(|(f, _)| f)
            .collect();
        let negative_rows: Vec<&Vec<f32>> = features
            .iter()
            .zip(labels)
            .filter(|(_, l)| **l <= 0.5)
            .map(|(f, _)| f)
            .collect();

        self.positive = ClassStats::fit(
            &positive_rows,
            dims,
            positive_rows.len() as f32 / total as f32,
        );
        self.negative = ClassStats::fit(
            &negative_rows,
            dims,
            negative_rows.len() as f32 / total as f32,
        );
    }

    fn predict(&self, features: &[Vec<f32>]) -> Vec<f32> {
        features
            .iter()
            .map(|x| {
                if self.positive.log_likelihood(x) > self.negative.log_likelihood(x) {
                    1.0
                } else {
                    0.0
                }
            })
            .collect()
    }

    fn name(&self) -> &str {
        "GaussianNaiveBayes"
    }

    fn description(&self) -> &str {
        "Gaussian naive Bayes over feature means and variances"
    }
}

/// Linear SVM trained with hinge-loss SGD
#[derive(Debug, Clone)]
pub struct LinearSvm {
    weights: Vec<f32>,
    bias: f32,
    learning_rate: f32,
    lambda: f32,
    epochs: usize,
    seed: u64,
}

impl LinearSvm {
    pub fn new(seed: u64) -> Self {
        Self {
            weights: Vec::new(),
            bias: 0.0,
            learning_rate: 0.01,
            lambda: 0.01,
            epochs: 100,
            seed,
        }
    }
}

impl Classifier for LinearSvm {
    fn train(&mut self, features: &[Vec<f32>], labels: &[f32]) {
        let dims = features.first().map_or(0, Vec::len);
        self.weights = vec![0.0; dims];
        self.bias = 0.0;
        if dims == 0 || features.is_empty() {
            return;
        }

        let mut order: Vec<usize> = (0..features.len()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        for _ in 0..self.epochs {
            order.shuffle(&mut rng);
            for &i in &order {
                let y = if labels[i] > 0.5 { 1.0 } else { -1.0 };
                let margin = y * (dot(&self.weights, &features[i]) + self.bias);

                if margin < 1.0 {
                    for (w, x) in self.weights.iter_mut().zip(&features[i]) {
                        *w += self.learning_rate * (y * x - 2.0 * self.lambda * *w);
                    }
                    self.bias += self.learning_rate * y;
                } else {
                    for w in &mut self.weights {
                        *w -= self.learning_rate * 2.0 * self.lambda * *w;
                    }
                }
            }
        }
    }

    fn predict(&self, features: &[Vec<f32>]) -> Vec<f32> {
        features
            .iter()
            .map(|x| {
                if dot(&self.weights, x) + self.bias > 0.0 {
                    1.0
                } else {
                    0.0
                }
            })
            .collect()
    }

    fn name(&self) -> &str {
        "LinearSVM"
    }

    fn description(&self) -> &str {
        "Linear SVM, hinge-loss SGD"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two well-separated clusters on the first dimension
    fn separable_data() -> (Vec<Vec<f32>>, Vec<f32>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            let jitter = (i % 5) as f32 * 0.05;
            features.push(vec![1.0 + jitter, 0.5 - jitter]);
            labels.push(1.0);
            features.push(vec![-1.0 - jitter, -0.5 + jitter]);
            labels.push(0.0);
        }
        (features, labels)
    }

    fn assert_learns_separable(classifier: &mut dyn Classifier) {
        let (features, labels) = separable_data();
        classifier.train(&features, &labels);
        let predictions = classifier.predict(&features);

        let correct = predictions
            .iter()
            .zip(&labels)
            .filter(|(p, l)| (*p - *l).abs() < 0.5)
            .count();
        assert!(
            correct as f64 / labels.len() as f64 >= 0.9,
            "{} only classified {}/{} correctly",
            classifier.name(),
            correct,
            labels.len()
        );
    }

    #[test]
    fn test_logistic_regression_separable() {
        assert_learns_separable(&mut LogisticRegression::new(42));
    }

    #[test]
    fn test_random_forest_separable() {
        assert_learns_separable(&mut RandomForest::new(42));
    }

    #[test]
    fn test_naive_bayes_separable() {
        assert_learns_separable(&mut GaussianNaiveBayes::new());
    }

    #[test]
    fn test_linear_svm_separable() {
        assert_learns_separable(&mut LinearSvm::new(42));
    }

    #[test]
    fn test_predictions_are_binary() {
        let (features, labels) = separable_data();
        for mut classifier in all_classifiers(42) {
            classifier.train(&features, &labels);
            for p in classifier.predict(&features) {
                assert!(p == 0.0 || p == 1.0, "{} emitted {}", classifier.name(), p);
            }
        }
    }

    #[test]
    fn test_training_deterministic_per_seed() {
        let (features, labels) = separable_data();

        let mut a = LogisticRegression::new(7);
        let mut b = LogisticRegression::new(7);
        a.train(&features, &labels);
        b.train(&features, &labels);
        assert_eq!(a.predict(&features), b.predict(&features));
    }

    #[test]
    fn test_empty_training_is_harmless() {
        for mut classifier in all_classifiers(42) {
            classifier.train(&[], &[]);
            let predictions = classifier.predict(&[vec![0.0, 1.0]]);
            assert_eq!(predictions.len(), 1);
        }
    }

    #[test]
    fn test_all_classifiers() {
        let classifiers = all_classifiers(42);
        assert_eq!(classifiers.len(), 4);

        let names: Vec<_> = classifiers.iter().map(|c| c.name()).collect();
        assert!(names.contains(&"LogisticRegression"));
        assert!(names.contains(&"RandomForest"));
        assert!(names.contains(&"GaussianNaiveBayes"));
        assert!(names.contains(&"LinearSVM"));
    }
}
