//! Error types for chain operations

use thiserror::Error;
use tnchain_core::{Label, TensorError};

/// Result type for chain operations
pub type Result<T> = std::result::Result<T, MpsError>;

/// Errors that can occur during MPS/MPO operations
#[derive(Error, Debug)]
pub enum MpsError {
    /// A chain needs at least one tensor
    #[error("Chain is empty")]
    Empty,

    /// Site index past the end of the chain
    #[error("Site {site} out of range for chain of length {len}")]
    SiteOutOfRange {
        /// Requested site
        site: usize,
        /// Chain length
        len: usize,
    },

    /// Sweep interval is not a sub-interval of the chain
    #[error("Invalid interval [{start}, {end}) for chain of length {len}")]
    InvalidRange {
        /// Interval start (inclusive)
        start: usize,
        /// Interval end (exclusive)
        end: usize,
        /// Chain length
        len: usize,
    },

    /// Two chains that must be combined site by site differ in length
    #[error("Chain length mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        /// Length of the first operand
        expected: usize,
        /// Length of the second operand
        got: usize,
    },

    /// Adjacent tensors disagree on the dimension of their shared bond
    #[error("Bond dimension mismatch at site {site}: right dim {left_right}, next left dim {right_left}")]
    BondMismatch {
        /// Site whose right axis is inconsistent with the next site
        site: usize,
        /// Right dimension of `site`
        left_right: usize,
        /// Left dimension of `site + 1`
        right_left: usize,
    },

    /// A tensor lacks an axis the chain binds to a role
    #[error("Tensor at site {site} has no axis labeled {label}")]
    MissingRole {
        /// Offending site
        site: usize,
        /// Missing label
        label: Label,
    },

    /// Truncation left a bond with no singular values
    #[error("Bond to the right of site {site} truncated to zero width")]
    UnderflowBond {
        /// Site whose right bond vanished
        site: usize,
    },

    /// Failure in the underlying tensor algebra
    #[error(transparent)]
    Tensor(#[from] TensorError),
}
