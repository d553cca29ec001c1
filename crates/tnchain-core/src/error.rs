//! Error types for tensor operations

use crate::label::Label;
use thiserror::Error;

/// Result type for tensor operations
pub type Result<T> = std::result::Result<T, TensorError>;

/// Errors that can occur during tensor operations
#[derive(Error, Debug)]
pub enum TensorError {
    /// The same label appears on two axes of one tensor
    #[error("Duplicate label {label} on a single tensor")]
    DuplicateLabel {
        /// The repeated label
        label: Label,
    },

    /// A label that was asked for is not present on the tensor
    #[error("Label {label} not found on tensor")]
    LabelNotFound {
        /// The missing label
        label: Label,
    },

    /// Two axes that must be contracted together have different dimensions
    #[error("Shape mismatch on {label}: {left} vs {right}")]
    ShapeMismatch {
        /// Label of the offending axis (taken from the left operand)
        label: Label,
        /// Dimension on the left operand
        left: usize,
        /// Dimension on the right operand
        right: usize,
    },

    /// Number of labels does not match the number of dimensions
    #[error("Label count mismatch: {labels} labels for {dims} dimensions")]
    LabelCountMismatch {
        /// Number of labels supplied
        labels: usize,
        /// Number of dimensions supplied
        dims: usize,
    },

    /// Data length does not match the product of dimensions
    #[error("Data length mismatch: expected {expected}, got {got}")]
    DataLength {
        /// Product of the dimensions
        expected: usize,
        /// Length of the supplied buffer
        got: usize,
    },

    /// A square system or identity was requested with non-square operands
    #[error("Matrix is not square: {rows}x{cols}")]
    NotSquare {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// Dense solve was asked to invert a singular or ill-conditioned matrix
    #[error("Singular linear system (pivot ratio {rcond:e})")]
    SingularSystem {
        /// Ratio of the smallest to the largest LU pivot magnitude
        rcond: f64,
    },

    /// Failure reported by the linear algebra backend
    #[error("Linear algebra backend failed: {0}")]
    Backend(#[from] anyhow::Error),
}
