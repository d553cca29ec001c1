//! Process-wide tolerance defaults with atomic access.

use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Error for invalid tolerance values.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[error("Invalid tolerance {0}: must be finite and non-negative")]
pub struct InvalidToleranceError(pub f64);

/// A global default `f64` with atomic access.
///
/// Used for tolerances such as the SVD truncation threshold or the
/// pivot ratio threshold of the dense solver.
///
/// # Example
///
/// ```
/// use tnchain_core::GlobalDefault;
///
/// static MY_TOLERANCE: GlobalDefault = GlobalDefault::new(1e-12);
///
/// assert_eq!(MY_TOLERANCE.get(), 1e-12);
/// MY_TOLERANCE.set(1e-10).unwrap();
/// assert_eq!(MY_TOLERANCE.get(), 1e-10);
/// ```
pub struct GlobalDefault {
    value: AtomicU64,
}

impl GlobalDefault {
    /// Create a new global default. Usable in `static` declarations.
    #[must_use]
    pub const fn new(initial: f64) -> Self {
        Self {
            value: AtomicU64::new(initial.to_bits()),
        }
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.value.load(Ordering::Relaxed))
    }

    /// Replace the value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidToleranceError` if the value is not finite or is
    /// negative; the stored value is left untouched.
    pub fn set(&self, value: f64) -> Result<(), InvalidToleranceError> {
        if !value.is_finite() || value < 0.0 {
            return Err(InvalidToleranceError(value));
        }
        self.value.store(value.to_bits(), Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        static TEST_DEFAULT: GlobalDefault = GlobalDefault::new(1e-12);

        assert!((TEST_DEFAULT.get() - 1e-12).abs() < 1e-20);
        TEST_DEFAULT.set(1e-10).unwrap();
        assert!((TEST_DEFAULT.get() - 1e-10).abs() < 1e-20);
    }

    #[test]
    fn test_invalid_values_rejected() {
        static TEST_DEFAULT: GlobalDefault = GlobalDefault::new(1e-12);

        assert!(TEST_DEFAULT.set(f64::NAN).is_err());
        assert!(TEST_DEFAULT.set(f64::INFINITY).is_err());
        assert_eq!(TEST_DEFAULT.set(-1.0), Err(InvalidToleranceError(-1.0)));
        assert!((TEST_DEFAULT.get() - 1e-12).abs() < 1e-20);
    }

    #[test]
    fn test_error_display() {
        let msg = InvalidToleranceError(-1.0).to_string();
        assert!(msg.contains("-1"));
        assert!(msg.contains("non-negative"));
    }
}
