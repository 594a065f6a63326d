// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Shuffle and train/dev/test split
//!
//! Shuffling applies one permutation to features and labels in lock-step;
//! permuting them independently would desynchronize the sample/label pairing.
//! Splitting floors the train and dev boundaries and assigns the remainder to
//! the test slice, so the three slices always reconstruct the input.

use crate::config::SplitFractions;
use rand::seq::SliceRandom;
use rand::Rng;

/// Three contiguous slices of a sequence, in train/dev/test order
#[derive(Debug, Clone)]
pub struct Split<T> {
    pub train: Vec<T>,
    pub dev: Vec<T>,
    pub test: Vec<T>,
}

/// Apply one random permutation to both sequences
///
/// Panics if the sequences differ in length; ingestion guarantees they never
/// do.
pub fn shuffle_in_lockstep<R: Rng>(
    features: &mut Vec<Vec<f32>>,
    labels: &mut Vec<f32>,
    rng: &mut R,
) {
    assert_eq!(
        features.len(),
        labels.len(),
        "feature/label lengths must match before shuffling"
    );

    let mut indices: Vec<usize> = (0..labels.len()).collect();
    indices.shuffle(rng);

    *features = indices.iter().map(|&i| features[i].clone()).collect();
    *labels = indices.iter().map(|&i| labels[i]).collect();
}

/// Partition a sequence into train/dev/test by the given fractions
///
/// Boundaries: `train_end = floor(train * n)`, `dev_end = train_end +
/// floor(dev * n)`, test takes everything past `dev_end`.
pub fn split<T: Clone>(items: &[T], fractions: &SplitFractions) -> Split<T> {
    let n = items.len();
    let train_end = (fractions.train * n as f64).floor() as usize;
    let dev_end = train_end + (fractions.dev * n as f64).floor() as usize;

    Split {
        train: items[..train_end].to_vec(),
        dev: items[train_end..dev_end].to_vec(),
        test: items[dev_end..].to_vec(),
    }
}
