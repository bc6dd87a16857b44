//! CLI defaults, loaded from `FACEMATCH_*` environment variables.

/// Identification parameters used when the corresponding flag is absent.
pub struct Defaults {
    /// Minimum aggregate score for a positive match.
    pub threshold: f32,
    /// Reference samples per label averaged into the aggregate score.
    pub top_k: usize,
}

impl Defaults {
    pub fn from_env() -> Self {
        Self {
            threshold: env_f32("FACEMATCH_THRESHOLD", 0.5),
            top_k: env_usize("FACEMATCH_TOP_K", 3),
        }
    }
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
