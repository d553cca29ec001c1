//! Truncation parameters shared by the SVD-based sweeps.
//!
//! Singular values are first divided by the largest one. A value survives
//! when it is strictly greater than `threshold`; afterwards the surviving
//! count is capped at `max_rank` if one is set.

use crate::global_default::{GlobalDefault, InvalidToleranceError};

static DEFAULT_SVD_THRESHOLD: GlobalDefault = GlobalDefault::new(1e-14);

/// Global default threshold for normalised singular values.
///
/// The initial value is `1e-14`.
pub fn default_svd_threshold() -> f64 {
    DEFAULT_SVD_THRESHOLD.get()
}

/// Set the global default threshold for normalised singular values.
///
/// # Errors
/// Returns `InvalidToleranceError` if `threshold` is not finite or negative.
pub fn set_default_svd_threshold(threshold: f64) -> Result<(), InvalidToleranceError> {
    DEFAULT_SVD_THRESHOLD.set(threshold)
}

/// Threshold and rank cap applied to a singular value spectrum.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TruncationParams {
    /// Normalised singular values `σ_i / σ_max` must be strictly greater than
    /// this to be kept.
    ///
    /// If `None`, [`default_svd_threshold`] is used.
    pub threshold: Option<f64>,

    /// Maximum number of kept singular values.
    ///
    /// If `None`, no rank limit is applied.
    pub max_rank: Option<usize>,
}

impl TruncationParams {
    /// Parameters with every field unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Set the maximum rank.
    #[must_use]
    pub fn with_max_rank(mut self, max_rank: usize) -> Self {
        self.max_rank = Some(max_rank);
        self
    }

    /// Threshold to apply, falling back to the global default.
    #[must_use]
    pub fn effective_threshold(&self) -> f64 {
        self.threshold.unwrap_or_else(default_svd_threshold)
    }

    /// Number of singular values to keep from a descending spectrum.
    ///
    /// May be zero, when the spectrum is empty, identically zero, or the
    /// threshold rejects every value.
    #[must_use]
    pub fn retained_rank(&self, singular_values: &[f64]) -> usize {
        let s_max = singular_values.first().copied().unwrap_or(0.0);
        if s_max <= 0.0 {
            return 0;
        }
        let normalised: Vec<f64> = singular_values.iter().map(|s| s / s_max).collect();
        retained_rank(
            &normalised,
            self.effective_threshold(),
            self.max_rank.unwrap_or(0),
        )
    }
}

/// Count of already-normalised singular values kept by `threshold` and
/// `chi_max`.
///
/// Values strictly greater than `threshold` are kept; if `chi_max > 0` the
/// count is then capped at `chi_max`.
pub fn retained_rank(normalised: &[f64], threshold: f64, chi_max: usize) -> usize {
    let kept = normalised.iter().filter(|&&s| s > threshold).count();
    if chi_max > 0 {
        kept.min(chi_max)
    } else {
        kept
    }
}
