use serde::{Deserialize, Serialize};

/// Face embedding vector (dimensionality fixed by the producing model).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Dimensionality of this embedding.
    pub fn dim(&self) -> usize {
        self.values.len()
    }
}

/// Region of the source image a face was detected in.
///
/// Opaque to the matching engine: coordinates arrive pre-clamped from the
/// localization provider and are only carried through to [`Prediction`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceLocation {
    pub left_x: f32,
    pub left_y: f32,
    pub width: f32,
    pub height: f32,
}

/// One labeled reference sample: a single embedding for a single identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelledEmbedding {
    pub label: String,
    pub embedding: Embedding,
}

impl LabelledEmbedding {
    pub fn new(label: impl Into<String>, embedding: Embedding) -> Self {
        Self {
            label: label.into(),
            embedding,
        }
    }
}

/// Result of identifying one query embedding against a gallery.
///
/// Higher score = more similar; the location ties the prediction back to
/// the face region the query was computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f32,
    pub location: FaceLocation,
}
