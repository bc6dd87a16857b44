//! facematch-core — Embedding gallery and identity-decision engine.
//!
//! Compares a query face embedding against a gallery of labeled reference
//! embeddings and decides on the single best identity above a confidence
//! threshold, or none. Embedding extraction stays behind the
//! [`EmbeddingProvider`] boundary; this crate performs no inference and
//! no I/O.

pub mod gallery;
pub mod matcher;
pub mod provider;
pub mod scoring;
pub mod types;

pub use gallery::{Gallery, GalleryError};
pub use matcher::Matcher;
pub use provider::{normalize_pixels, EmbeddingProvider, FaceImage, ProviderError};
pub use scoring::{CosineScorer, EuclideanScorer, ScoreError, Scorer};
pub use types::{Embedding, FaceLocation, LabelledEmbedding, Prediction};
