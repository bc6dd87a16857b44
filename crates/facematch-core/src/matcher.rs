//! Identity decision engine.
//!
//! Scores a query embedding against every gallery sample, aggregates the
//! evidence per label as a top-K mean, and returns the single best identity
//! at or above the confidence threshold — or nothing.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::gallery::Gallery;
use crate::scoring::{EuclideanScorer, ScoreError, Scorer};
use crate::types::{Embedding, FaceLocation, Prediction};

// Scores carry 4 decimal digits. Quantization happens before top-K
// selection so that near-equal scores order identically across runs.
const SCORE_QUANTUM: f32 = 10_000.0;

/// Quantize a raw score to 4 decimal digits, truncating toward zero.
fn quantize(score: f32) -> f32 {
    (score * SCORE_QUANTUM).trunc() / SCORE_QUANTUM
}

/// Identity matcher over a labeled gallery.
///
/// Pure and synchronous; holds no state beyond the scoring strategy, so one
/// matcher can serve concurrent lookups against a shared gallery.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<S = EuclideanScorer> {
    scorer: S,
}

impl Matcher<EuclideanScorer> {
    pub fn new() -> Self {
        Self {
            scorer: EuclideanScorer,
        }
    }
}

impl Default for Matcher<EuclideanScorer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scorer> Matcher<S> {
    /// Use a different scoring strategy. Thresholds are per-scorer.
    pub fn with_scorer(scorer: S) -> Self {
        Self { scorer }
    }

    /// Identify the single best-matching label for `query`, or `None`.
    ///
    /// Every gallery sample is scored, the scores are bucketed by label,
    /// and each label is reduced to the arithmetic mean of its `top_k`
    /// best samples (all of them if it has fewer). Labels whose aggregate
    /// falls strictly below `threshold` are discarded; survivors are ranked
    /// by aggregate descending with ties broken by lexical label order.
    ///
    /// An empty gallery is not an error: it is the normal unknown-face case
    /// and yields `None`. A dimensionality mismatch between the query and
    /// the gallery is fatal and surfaces before any scoring.
    pub fn identify(
        &self,
        query: &Embedding,
        gallery: &Gallery,
        location: &FaceLocation,
        threshold: f32,
        top_k: usize,
    ) -> Result<Option<Prediction>, ScoreError> {
        if let Some(dim) = gallery.dim() {
            if query.dim() != dim {
                return Err(ScoreError::DimensionMismatch {
                    left: query.dim(),
                    right: dim,
                });
            }
        }

        // Pass 1: one quantized score per gallery sample, bucketed by label.
        let mut by_label: BTreeMap<&str, Vec<f32>> = BTreeMap::new();
        for entry in gallery.entries() {
            let score = self.scorer.score(query, &entry.embedding)?;
            by_label
                .entry(entry.label.as_str())
                .or_default()
                .push(quantize(score));
        }

        // Pass 2: reduce each bucket to a top-K mean, gate on the threshold.
        let mut candidates: Vec<(&str, f32)> = Vec::new();
        for (label, mut scores) in by_label {
            scores.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
            let take = top_k.min(scores.len());
            if take == 0 {
                continue;
            }
            let aggregate = scores[..take].iter().sum::<f32>() / take as f32;
            tracing::debug!(label, aggregate, samples = take, "label aggregate");

            if aggregate >= threshold {
                candidates.push((label, aggregate));
            }
        }

        candidates.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });

        Ok(candidates.first().map(|&(label, score)| Prediction {
            label: label.to_string(),
            score,
            location: location.clone(),
        }))
    }

    /// Identify every query independently, preserving input order.
    ///
    /// One output slot per query, `None` for misses. A structural error
    /// fails the whole batch; no partial output is returned.
    pub fn identify_all(
        &self,
        queries: &[(Embedding, FaceLocation)],
        gallery: &Gallery,
        threshold: f32,
        top_k: usize,
    ) -> Result<Vec<Option<Prediction>>, ScoreError> {
        queries
            .iter()
            .map(|(query, location)| self.identify(query, gallery, location, threshold, top_k))
            .collect()
    }
}
