//! Labeled reference gallery.
//!
//! Built once from a set of reference images (one or more samples per
//! identity), then queried read-only by the matcher. Appends go through
//! `&mut self`, so the borrow checker enforces the single-writer discipline:
//! an in-flight identification can never observe a partial append.

use std::collections::BTreeMap;

use crate::provider::{EmbeddingProvider, FaceImage, ProviderError};
use crate::types::{Embedding, LabelledEmbedding};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("embedding extraction failed for label {label:?}: {source}")]
    Extraction {
        label: String,
        #[source]
        source: ProviderError,
    },
    #[error("gallery dimension mismatch for label {label:?}: expected {expected}, got {actual}")]
    Dimension {
        label: String,
        expected: usize,
        actual: usize,
    },
}

/// Append-only collection of labeled reference embeddings.
///
/// Insertion order is preserved. Every entry shares the dimensionality
/// established by the first entry; appends violating it are rejected, so a
/// corrupted entry can never enter silently.
#[derive(Debug, Clone, Default)]
pub struct Gallery {
    entries: Vec<LabelledEmbedding>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Embed every reference image and collect the results.
    ///
    /// Provider failures are propagated with the offending label attached;
    /// there is no retry and no partial skip. An empty reference set yields
    /// an empty gallery, which downstream always reports "no match" for.
    pub fn build<P, I>(provider: &P, references: I) -> Result<Self, GalleryError>
    where
        P: EmbeddingProvider,
        I: IntoIterator<Item = (String, FaceImage)>,
    {
        let mut gallery = Self::new();
        for (label, image) in references {
            let embedding = provider.embed(&image).map_err(|source| {
                GalleryError::Extraction {
                    label: label.clone(),
                    source,
                }
            })?;
            gallery.push(label, embedding)?;
        }

        tracing::info!(
            entries = gallery.len(),
            labels = gallery.label_counts().len(),
            dim = ?gallery.dim(),
            "gallery built"
        );

        Ok(gallery)
    }

    /// Build from embeddings the caller computed elsewhere.
    pub fn from_entries<I>(entries: I) -> Result<Self, GalleryError>
    where
        I: IntoIterator<Item = LabelledEmbedding>,
    {
        let mut gallery = Self::new();
        for entry in entries {
            gallery.push(entry.label, entry.embedding)?;
        }
        Ok(gallery)
    }

    /// Append one reference sample. New identities and additional samples
    /// for already-known identities are both valid.
    pub fn push(&mut self, label: String, embedding: Embedding) -> Result<(), GalleryError> {
        if let Some(expected) = self.dim() {
            if embedding.dim() != expected {
                return Err(GalleryError::Dimension {
                    label,
                    expected,
                    actual: embedding.dim(),
                });
            }
        }
        self.entries.push(LabelledEmbedding { label, embedding });
        Ok(())
    }

    /// Dimensionality shared by all entries; `None` while empty.
    pub fn dim(&self) -> Option<usize> {
        self.entries.first().map(|e| e.embedding.dim())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LabelledEmbedding] {
        &self.entries
    }

    /// Distinct labels with their reference sample counts, label-ordered.
    pub fn label_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.label.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// Deterministic stand-in for a real model: embeds an image as the mean
    /// of its pixels, repeated over a fixed dimensionality.
    struct MeanProvider {
        dim: usize,
    }

    impl EmbeddingProvider for MeanProvider {
        fn embed(&self, image: &FaceImage) -> Result<Embedding, ProviderError> {
            let mean = image.mean().ok_or_else(|| {
                ProviderError::InvalidInput("empty image".to_string())
            })?;
            Ok(Embedding::new(vec![mean; self.dim]))
        }
    }

    struct FailingProvider;

    impl EmbeddingProvider for FailingProvider {
        fn embed(&self, _image: &FaceImage) -> Result<Embedding, ProviderError> {
            Err(ProviderError::Inference("model exploded".to_string()))
        }
    }

    fn image(fill: f32) -> FaceImage {
        Array3::from_elem((3, 4, 4), fill)
    }

    #[test]
    fn test_build_preserves_order_and_multiplicity() {
        let provider = MeanProvider { dim: 8 };
        let refs = vec![
            ("alice".to_string(), image(0.1)),
            ("bob".to_string(), image(0.5)),
            ("alice".to_string(), image(0.2)),
        ];

        let gallery = Gallery::build(&provider, refs).unwrap();
        assert_eq!(gallery.len(), 3);
        assert_eq!(gallery.dim(), Some(8));
        assert_eq!(gallery.entries()[0].label, "alice");
        assert_eq!(gallery.entries()[1].label, "bob");
        assert_eq!(gallery.entries()[2].label, "alice");

        let counts = gallery.label_counts();
        assert_eq!(counts.get("alice"), Some(&2));
        assert_eq!(counts.get("bob"), Some(&1));
    }

    #[test]
    fn test_build_empty_reference_set() {
        let provider = MeanProvider { dim: 8 };
        let gallery = Gallery::build(&provider, Vec::new()).unwrap();
        assert!(gallery.is_empty());
        assert_eq!(gallery.dim(), None);
    }

    #[test]
    fn test_build_propagates_extraction_failure() {
        let refs = vec![("carol".to_string(), image(0.3))];
        let err = Gallery::build(&FailingProvider, refs).unwrap_err();
        match err {
            GalleryError::Extraction { label, .. } => assert_eq!(label, "carol"),
            other => panic!("expected Extraction error, got {other:?}"),
        }
    }

    #[test]
    fn test_push_rejects_dimension_mismatch() {
        let mut gallery = Gallery::new();
        gallery
            .push("alice".to_string(), Embedding::new(vec![0.0; 4]))
            .unwrap();

        let err = gallery
            .push("bob".to_string(), Embedding::new(vec![0.0; 5]))
            .unwrap_err();
        match err {
            GalleryError::Dimension {
                expected, actual, ..
            } => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 5);
            }
            other => panic!("expected Dimension error, got {other:?}"),
        }
        assert_eq!(gallery.len(), 1);
    }

    #[test]
    fn test_from_entries() {
        let entries = vec![
            LabelledEmbedding::new("a", Embedding::new(vec![0.0, 1.0])),
            LabelledEmbedding::new("b", Embedding::new(vec![1.0, 0.0])),
        ];
        let gallery = Gallery::from_entries(entries).unwrap();
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery.dim(), Some(2));
    }
}
