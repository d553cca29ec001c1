//! Options for canonicalisation and compression.

use tnchain_core::{default_solve_rcond, TruncationParams};

/// Options for [`Mps::left_canonise`](crate::Mps::left_canonise) and
/// [`Mps::right_canonise`](crate::Mps::right_canonise).
///
/// Left and right sweeps have different `partial_normalise` defaults; use
/// [`CanonicaliseOptions::left`] or [`CanonicaliseOptions::right`] to get
/// the matching one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanonicaliseOptions {
    /// Threshold on normalised singular values and bond dimension cap
    pub truncation: TruncationParams,
    /// Divide the terminal site by its norm instead of re-absorbing the
    /// accumulated rescaling
    pub normalise: bool,
    /// Leave the accumulated rescaling out of the site after a partial sweep
    pub partial_normalise: bool,
}

impl CanonicaliseOptions {
    /// Defaults for a left sweep: `partial_normalise = true`.
    pub fn left() -> Self {
        Self {
            truncation: TruncationParams::new(),
            normalise: false,
            partial_normalise: true,
        }
    }

    /// Defaults for a right sweep: `partial_normalise = false`.
    pub fn right() -> Self {
        Self {
            partial_normalise: false,
            ..Self::left()
        }
    }

    /// Cap every bond at `chi_max`; `0` means no cap.
    #[must_use]
    pub fn with_chi_max(mut self, chi_max: usize) -> Self {
        self.truncation.max_rank = (chi_max > 0).then_some(chi_max);
        self
    }

    /// Set the threshold on normalised singular values.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.truncation.threshold = Some(threshold);
        self
    }

    /// Set `normalise`.
    #[must_use]
    pub fn with_normalise(mut self, normalise: bool) -> Self {
        self.normalise = normalise;
        self
    }

    /// Set `partial_normalise`.
    #[must_use]
    pub fn with_partial_normalise(mut self, partial_normalise: bool) -> Self {
        self.partial_normalise = partial_normalise;
        self
    }
}

impl Default for CanonicaliseOptions {
    fn default() -> Self {
        Self::left()
    }
}

/// Options for [`svd_compress`](crate::svd_compress).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvdCompressOptions {
    /// Bond dimension cap
    pub chi: usize,
    /// Threshold on normalised singular values, in both passes
    pub threshold: f64,
    /// Normalise the compressed state
    pub normalise: bool,
}

impl SvdCompressOptions {
    /// Compress to bond dimension `chi` with the default threshold `1e-15`.
    pub fn new(chi: usize) -> Self {
        Self {
            chi,
            threshold: 1e-15,
            normalise: false,
        }
    }

    /// Set the threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set `normalise`.
    #[must_use]
    pub fn with_normalise(mut self, normalise: bool) -> Self {
        self.normalise = normalise;
        self
    }
}

/// Options for [`variational_compress`](crate::variational_compress).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariationalOptions {
    /// Bond dimension cap of the ansatz
    pub chi: usize,
    /// Number of left-to-right sweeps
    pub max_sweeps: usize,
    /// Threshold used when seeding the ansatz by SVD compression
    pub seed_threshold: f64,
    /// Pivot ratio at or below which a local system counts as singular;
    /// `None` uses the process-wide solver default
    pub rcond: Option<f64>,
}

impl VariationalOptions {
    /// Compress to bond dimension `chi` with 20 sweeps.
    pub fn new(chi: usize) -> Self {
        Self {
            chi,
            max_sweeps: 20,
            seed_threshold: 1e-15,
            rcond: None,
        }
    }

    /// Set the number of sweeps.
    #[must_use]
    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = max_sweeps;
        self
    }

    /// Set the seed threshold.
    #[must_use]
    pub fn with_seed_threshold(mut self, threshold: f64) -> Self {
        self.seed_threshold = threshold;
        self
    }

    /// Set the pivot ratio below which local solves fail.
    #[must_use]
    pub fn with_rcond(mut self, rcond: f64) -> Self {
        self.rcond = Some(rcond);
        self
    }

    /// Pivot ratio threshold to use.
    pub fn effective_rcond(&self) -> f64 {
        self.rcond.unwrap_or_else(default_solve_rcond)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asymmetric_partial_normalise_defaults() {
        assert!(CanonicaliseOptions::left().partial_normalise);
        assert!(!CanonicaliseOptions::right().partial_normalise);
        assert_eq!(CanonicaliseOptions::default(), CanonicaliseOptions::left());
    }

    #[test]
    fn test_chi_zero_means_uncapped() {
        let opts = CanonicaliseOptions::left().with_chi_max(4);
        assert_eq!(opts.truncation.max_rank, Some(4));
        let opts = opts.with_chi_max(0);
        assert_eq!(opts.truncation.max_rank, None);
    }

    #[test]
    fn test_variational_defaults() {
        let opts = VariationalOptions::new(3).with_max_sweeps(5);
        assert_eq!(opts.chi, 3);
        assert_eq!(opts.max_sweeps, 5);
        assert_eq!(opts.effective_rcond(), default_solve_rcond());
        assert_eq!(opts.with_rcond(1e-8).effective_rcond(), 1e-8);
    }
}
