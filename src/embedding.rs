// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Word-vector embedding models
//!
//! Maps token sequences to fixed-length numeric feature vectors in one of two
//! aggregation modes: averaged (one vector over the whole sequence) or
//! concatenated (per-token vectors joined up to a fixed window, zero-padded).
//!
//! The concrete model here derives per-token vectors from a seeded ChaCha8
//! stream keyed by the token hash, so the whole grid is reproducible without
//! shipping pretrained matrices. Real GloVe/word2vec weights can be swapped in
//! behind the same trait.

use crate::config::ConfigError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Embedding model interface
pub trait Embedder {
    /// Model identifier recorded in results (e.g. "glove")
    fn model_name(&self) -> &str;

    /// Vocabulary subset identifier recorded in results (e.g. "6B.50d")
    fn model_subset(&self) -> &str;

    /// Width of a single token vector
    fn dimensions(&self) -> usize;

    /// Average all token vectors into one fixed-dimension vector
    fn embed_averaged(&self, tokens: &[String]) -> Vec<f32>;

    /// Concatenate the first `window` token vectors, zero-padding short input
    fn embed_concatenated(&self, tokens: &[String], window: usize) -> Vec<f32>;
}

/// Deterministic stand-in for a pretrained word-vector model
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    name: String,
    subset: String,
    dimensions: usize,
    seed: u64,
}

impl HashEmbedder {
    pub fn new(name: &str, subset: &str, dimensions: usize, seed: u64) -> Self {
        Self {
            name: name.to_string(),
            subset: subset.to_string(),
            dimensions,
            seed,
        }
    }

    fn token_vector(&self, token: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        self.name.hash(&mut hasher);
        let mut rng = ChaCha8Rng::seed_from_u64(hasher.finish() ^ self.seed);
        (0..self.dimensions).map(|_| rng.gen_range(-1.0..1.0)).collect()
    }
}

impl Embedder for HashEmbedder {
    fn model_name(&self) -> &str {
        &self.name
    }

    fn model_subset(&self) -> &str {
        &self.subset
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed_averaged(&self, tokens: &[String]) -> Vec<f32> {
        let mut sum = vec![0.0f32; self.dimensions];
        if tokens.is_empty() {
            return sum;
        }
        for token in tokens {
            for (acc, v) in sum.iter_mut().zip(self.token_vector(token)) {
                *acc += v;
            }
        }
        let n = tokens.len() as f32;
        for acc in &mut sum {
            *acc /= n;
        }
        sum
    }

    fn embed_concatenated(&self, tokens: &[String], window: usize) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.dimensions * window);
        for token in tokens.iter().take(window) {
            out.extend(self.token_vector(token));
        }
        out.resize(self.dimensions * window, 0.0);
        out
    }
}

/// Embedding models evaluated by default
pub fn default_embedding_models() -> Vec<String> {
    vec!["glove".to_string(), "word2vec".to_string()]
}

/// Build the embedder for a named model; unknown names fail loudly
pub fn embedder_for(model: &str, seed: u64) -> Result<HashEmbedder, ConfigError> {
    match model {
        "glove" => Ok(HashEmbedder::new("glove", "6B.50d", 50, seed)),
        "word2vec" => Ok(HashEmbedder::new("word2vec", "news-100d", 100, seed ^ 0x9e37_79b9)),
        other => Err(ConfigError::UnknownEmbeddingModel(other.to_string())),
    }
}
