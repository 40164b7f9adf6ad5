//! Text similarity scoring against a pre-fitted TF-IDF vocabulary.
//!
//! The vectorizer is trained offline and shipped as a versioned JSON artifact.
//! Vocabulary and IDF weights are fixed at load time, so every request maps
//! text into the same vector space.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading the vectorizer artifact
#[derive(Debug, Error)]
pub enum VectorizerError {
    #[error("Failed to read vectorizer artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse vectorizer artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid vectorizer artifact: {0}")]
    Invalid(String),
}

/// Sparse term-weight vector keyed by vocabulary column
pub type SparseVector = HashMap<usize, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L2,
    None,
}

fn default_true() -> bool { true }
fn default_ngram_range() -> (usize, usize) { (1, 1) }
fn default_norm() -> Norm { Norm::L2 }

/// On-disk artifact layout
#[derive(Debug, Deserialize)]
struct VectorizerArtifact {
    version: u32,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    #[serde(default = "default_true")]
    lowercase: bool,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default)]
    stop_words: Vec<String>,
    #[serde(default = "default_norm")]
    norm: Norm,
    #[serde(default)]
    sublinear_tf: bool,
}

/// Fitted TF-IDF vectorizer
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    version: u32,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    lowercase: bool,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
    norm: Norm,
    sublinear_tf: bool,
}

impl TfidfVectorizer {
    /// Load a vectorizer artifact from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, VectorizerError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| VectorizerError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Build a vectorizer from the JSON artifact contents
    pub fn from_json(raw: &str) -> Result<Self, VectorizerError> {
        let artifact: VectorizerArtifact = serde_json::from_str(raw)?;

        if artifact.vocabulary.is_empty() {
            return Err(VectorizerError::Invalid("vocabulary is empty".into()));
        }
        if let Some(max_col) = artifact.vocabulary.values().max() {
            if *max_col >= artifact.idf.len() {
                return Err(VectorizerError::Invalid(format!(
                    "vocabulary column {} has no idf weight ({} weights)",
                    max_col,
                    artifact.idf.len()
                )));
            }
        }
        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(VectorizerError::Invalid(format!(
                "bad ngram_range ({}, {})",
                min_n, max_n
            )));
        }

        Ok(Self {
            version: artifact.version,
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            lowercase: artifact.lowercase,
            ngram_range: artifact.ngram_range,
            stop_words: artifact.stop_words.into_iter().collect(),
            norm: artifact.norm,
            sublinear_tf: artifact.sublinear_tf,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Split text into word tokens of two or more alphanumeric characters
    fn tokenize(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase { text.to_lowercase() } else { text.to_string() };

        text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|token| token.chars().count() >= 2)
            .filter(|token| !self.stop_words.contains(*token))
            .map(str::to_string)
            .collect()
    }

    /// Expand tokens into the configured word n-grams
    fn ngrams(&self, tokens: &[String]) -> Vec<String> {
        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n == 1 {
                terms.extend(tokens.iter().cloned());
            } else {
                terms.extend(tokens.windows(n).map(|w| w.join(" ")));
            }
        }
        terms
    }

    /// Map one text into the fitted vector space
    pub fn transform_one(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in self.ngrams(&self.tokenize(text)) {
            if let Some(&col) = self.vocabulary.get(&term) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(col, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (col, tf * self.idf[col])
            })
            .collect();

        if self.norm == Norm::L2 {
            let norm = vector.values().map(|w| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                vector.values_mut().for_each(|w| *w /= norm);
            }
        }

        vector
    }

    /// Map a batch of texts into the fitted vector space
    pub fn transform<S: AsRef<str>>(&self, texts: &[S]) -> Vec<SparseVector> {
        texts.iter().map(|t| self.transform_one(t.as_ref())).collect()
    }
}

/// Cosine similarity between two sparse vectors, 0.0 when either is empty
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .filter_map(|(col, w)| large.get(col).map(|v| w * v))
        .sum();
    let norm_a = a.values().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b = b.values().map(|w| w * w).sum::<f64>().sqrt();
    let denom = norm_a * norm_b;
    if denom == 0.0 {
        0.0
    } else {
        (dot / denom).clamp(0.0, 1.0)
    }
}

/// Score each document text against the candidate text
///
/// Returns one similarity per document, in input order.
pub fn score_texts<S: AsRef<str>>(
    vectorizer: &TfidfVectorizer,
    candidate_text: &str,
    documents: &[S],
) -> Vec<f64> {
    let candidate = vectorizer.transform_one(candidate_text);
    vectorizer
        .transform(documents)
        .iter()
        .map(|doc| cosine_similarity(&candidate, doc))
        .collect()
}
