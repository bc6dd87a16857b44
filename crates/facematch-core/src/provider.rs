//! Embedding provider boundary.
//!
//! The engine never runs inference itself; it only requires that some
//! provider maps a fixed-size face crop to a fixed-length embedding.

use crate::types::Embedding;
use ndarray::{Array3, ArrayView3};
use thiserror::Error;

/// Pre-cropped, pre-resized face image as a channels × height × width
/// tensor, pixel values normalized to `[0, 1]` (see [`normalize_pixels`]).
pub type FaceImage = Array3<f32>;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("invalid input image: {0}")]
    InvalidInput(String),
}

/// Maps a face crop to an identity embedding.
///
/// Implementations must be deterministic: identical input pixels produce an
/// identical embedding, so gallery construction and querying stay
/// reproducible.
pub trait EmbeddingProvider {
    fn embed(&self, image: &FaceImage) -> Result<Embedding, ProviderError>;
}

/// Normalize raw `[0, 255]` channel values to the `[0, 1]` range expected
/// by embedding providers. Required preprocessing, not optional.
pub fn normalize_pixels(raw: ArrayView3<'_, u8>) -> FaceImage {
    raw.mapv(|v| v as f32 / 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_normalize_pixels_range() {
        let mut raw = Array3::<u8>::zeros((3, 2, 2));
        raw[[0, 0, 0]] = 255;
        raw[[1, 1, 1]] = 51;

        let img = normalize_pixels(raw.view());
        assert_eq!(img.shape(), &[3, 2, 2]);
        assert!((img[[0, 0, 0]] - 1.0).abs() < 1e-6);
        assert!((img[[1, 1, 1]] - 0.2).abs() < 1e-6);
        assert_eq!(img[[2, 0, 1]], 0.0);
    }
}
