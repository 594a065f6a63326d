// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Classification metrics for binary sentiment labels
//!
//! Confusion counts and accuracy/precision/recall/F1, all derivable from the
//! counts alone. Precision and recall are defined as 0.0 when their
//! denominator is 0.

use serde::{Deserialize, Serialize};

/// Confusion matrix for binary classification (positive class = sentiment 1)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// True positives (positive predicted positive)
    pub tp: usize,
    /// True negatives (negative predicted negative)
    pub tn: usize,
    /// False positives (negative predicted positive)
    pub fp: usize,
    /// False negatives (positive predicted negative)
    pub fn_: usize,
}

impl ConfusionMatrix {
    /// Build from true and predicted labels; floats are thresholded at 0.5
    pub fn from_labels(truth: &[f32], predicted: &[f32]) -> Self {
        assert_eq!(
            truth.len(),
            predicted.len(),
            "true and predicted label lengths must match"
        );

        let mut matrix = Self::default();
        for (t, p) in truth.iter().zip(predicted.iter()) {
            match (*t > 0.5, *p > 0.5) {
                (true, true) => matrix.tp += 1,
                (false, false) => matrix.tn += 1,
                (false, true) => matrix.fp += 1,
                (true, false) => matrix.fn_ += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    /// Accuracy: (TP + TN) / total
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.tp + self.tn) as f64 / total as f64
    }

    /// Precision: TP / (TP + FP), 0.0 when the denominator is 0
    pub fn precision(&self) -> f64 {
        let denom = self.tp + self.fp;
        if denom == 0 {
            return 0.0;
        }
        self.tp as f64 / denom as f64
    }

    /// Recall: TP / (TP + FN), 0.0 when the denominator is 0
    pub fn recall(&self) -> f64 {
        let denom = self.tp + self.fn_;
        if denom == 0 {
            return 0.0;
        }
        self.tp as f64 / denom as f64
    }

    /// F1: harmonic mean of precision and recall, 0.0 when both are 0
    pub fn f1_score(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        let denom = precision + recall;
        if denom == 0.0 {
            return 0.0;
        }
        2.0 * precision * recall / denom
    }
}

/// Confusion counts plus the derived metrics for one grid cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub confusion_matrix: ConfusionMatrix,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

impl ClassificationReport {
    pub fn from_confusion_matrix(cm: ConfusionMatrix) -> Self {
        Self {
            accuracy: cm.accuracy(),
            precision: cm.precision(),
            recall: cm.recall(),
            f1_score: cm.f1_score(),
            support: cm.total(),
            confusion_matrix: cm,
        }
    }

    pub fn from_labels(truth: &[f32], predicted: &[f32]) -> Self {
        Self::from_confusion_matrix(ConfusionMatrix::from_labels(truth, predicted))
    }

    /// Format as a human-readable string
    pub fn format(&self) -> String {
        format!(
            r#"Classification Report
=====================
Accuracy:  {:.4} ({:.2}%)
Precision: {:.4}
Recall:    {:.4}
F1 Score:  {:.4}
Support:   {}

Confusion Matrix:
                 Predicted
                 Positive  Negative
Actual Positive  {:>6}    {:>6}
       Negative  {:>6}    {:>6}
"#,
            self.accuracy,
            self.accuracy * 100.0,
            self.precision,
            self.recall,
            self.f1_score,
            self.support,
            self.confusion_matrix.tp,
            self.confusion_matrix.fn_,
            self.confusion_matrix.fp,
            self.confusion_matrix.tn,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confusion_matrix_perfect() {
        let truth = vec![1.0, 1.0, 0.0, 0.0];
        let predicted = vec![1.0, 1.0, 0.0, 0.0];

        let cm = ConfusionMatrix::from_labels(&truth, &predicted);
        assert_eq!(cm.tp, 2);
        assert_eq!(cm.tn, 2);
        assert_eq!(cm.fp, 0);
        assert_eq!(cm.fn_, 0);
        assert!((cm.accuracy() - 1.0).abs() < 1e-9);
        assert!((cm.f1_score() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_confusion_matrix_worst() {
        let truth = vec![1.0, 1.0, 0.0, 0.0];
        let predicted = vec![0.0, 0.0, 1.0, 1.0];

        let cm = ConfusionMatrix::from_labels(&truth, &predicted);
        assert_eq!(cm.tp, 0);
        assert_eq!(cm.tn, 0);
        assert_eq!(cm.fp, 2);
        assert_eq!(cm.fn_, 2);
        assert!(cm.accuracy().abs() < 1e-9);
        assert!(cm.f1_score().abs() < 1e-9);
    }

    #[test]
    fn test_metrics_consistency_from_counts() {
        let cm = ConfusionMatrix {
            tp: 30,
            fp: 10,
            tn: 45,
            fn_: 15,
        };

        let total = (cm.tp + cm.fp + cm.tn + cm.fn_) as f64;
        assert!((cm.accuracy() - (cm.tp + cm.tn) as f64 / total).abs() < 1e-12);
        assert!((cm.precision() - cm.tp as f64 / (cm.tp + cm.fp) as f64).abs() < 1e-12);
        assert!((cm.recall() - cm.tp as f64 / (cm.tp + cm.fn_) as f64).abs() < 1e-12);

        let expected_f1 =
            2.0 * cm.precision() * cm.recall() / (cm.precision() + cm.recall());
        assert!((cm.f1_score() - expected_f1).abs() < 1e-12);
    }

    #[test]
    fn test_zero_denominator_policy() {
        // No positive predictions at all: precision denominator is 0
        let truth = vec![1.0, 0.0, 0.0];
        let predicted = vec![0.0, 0.0, 0.0];

        let cm = ConfusionMatrix::from_labels(&truth, &predicted);
        assert_eq!(cm.precision(), 0.0);
        assert!((cm.recall() - 0.0).abs() < 1e-9);
        assert_eq!(cm.f1_score(), 0.0);

        // No samples at all
        let empty = ConfusionMatrix::default();
        assert_eq!(empty.accuracy(), 0.0);
        assert_eq!(empty.precision(), 0.0);
        assert_eq!(empty.recall(), 0.0);
        assert_eq!(empty.f1_score(), 0.0);
    }

    #[test]
    fn test_report_format() {
        let report = ClassificationReport::from_labels(&[1.0, 0.0], &[1.0, 1.0]);
        let formatted = report.format();
        assert!(formatted.contains("Classification Report"));
        assert!(formatted.contains("Accuracy"));
        assert!(formatted.contains("Confusion Matrix"));
    }
}
