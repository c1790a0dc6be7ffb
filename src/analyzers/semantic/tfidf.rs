// SPDX-License-Identifier: PMPL-1.0-or-later
//! TF-IDF vector space and cosine similarity.
//!
//! Weighting follows the usual vectorizer defaults: lower-cased tokens of two
//! or more word characters, raw term counts, smoothed idf
//! `ln((1 + n) / (1 + df)) + 1`, and L2-normalised rows.

use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

fn token_pattern() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("valid token regex"))
}

/// Lower-case word tokens of at least two characters
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    token_pattern()
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Sparse, L2-normalised TF-IDF vector.
///
/// Ordered by term so every sum over it runs in the same order.
pub type TermVector = BTreeMap<String, f64>;

/// TF-IDF vectors for a small corpus, one per input document
#[derive(Debug, Clone)]
pub struct VectorSpace {
    vectors: Vec<TermVector>,
}

impl VectorSpace {
    /// Fit the vocabulary and idf weights over `documents` and vectorize them
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d.as_ref())).collect();
        let n_docs = tokenized.len() as f64;

        // Document frequency: how many documents contain each term.
        let mut df: HashMap<&str, usize> = HashMap::new();
        for tokens in &tokenized {
            let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in unique {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        let vectors = tokenized
            .iter()
            .map(|tokens| {
                let mut counts: HashMap<&str, usize> = HashMap::new();
                for token in tokens {
                    *counts.entry(token.as_str()).or_insert(0) += 1;
                }

                let mut vector: TermVector = counts
                    .into_iter()
                    .map(|(term, count)| {
                        let doc_freq = df.get(term).copied().unwrap_or(0) as f64;
                        let idf = ((1.0 + n_docs) / (1.0 + doc_freq)).ln() + 1.0;
                        (term.to_string(), count as f64 * idf)
                    })
                    .collect();

                let norm = vector.values().map(|w| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    vector.values_mut().for_each(|w| *w /= norm);
                }
                vector
            })
            .collect();

        Self { vectors }
    }

    /// Vector of the document at `index`
    pub fn vector(&self, index: usize) -> Option<&TermVector> {
        self.vectors.get(index)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Cosine similarity between two documents of the space
    pub fn similarity(&self, a: usize, b: usize) -> f64 {
        match (self.vectors.get(a), self.vectors.get(b)) {
            (Some(a), Some(b)) => cosine_similarity(a, b),
            _ => 0.0,
        }
    }
}

/// Cosine similarity between two sparse vectors.
/// Returns 0.0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .filter_map(|(term, x)| large.get(term).map(|y| x * y))
        .sum();
    let mag_a = a.values().map(|x| x * x).sum::<f64>().sqrt();
    let mag_b = b.values().map(|x| x * x).sum::<f64>().sqrt();
    let denom = mag_a * mag_b;
    if denom < f64::EPSILON || dot <= 0.0 {
        0.0
    } else {
        (dot / denom).clamp(0.0, 1.0)
    }
}
