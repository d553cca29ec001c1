#![warn(missing_docs)]
//! Labeled dense tensors
//!
//! This crate provides the tensor algebra used by the one-dimensional
//! tensor network crate `tnchain-mps`:
//! - [`Tensor`]: dense complex tensor whose axes are addressed by [`Label`]
//! - [`contract`] and [`tensor_product`]: label-based contraction
//! - [`svd`]: SVD split by an index partition, with fresh bond labels
//! - [`solve`]: dense linear solve with singular-system detection
//! - [`TruncationParams`] and [`GlobalDefault`] tolerances
//!
//! # Example
//!
//! ```
//! use tnchain_core::{contract, Label, Tensor};
//!
//! let a = Tensor::from_real(vec!["i".into(), "k".into()], vec![2, 2], vec![1.0, 2.0, 3.0, 4.0])
//!     .unwrap();
//! let id = Tensor::identity("k".into(), "j".into(), 2).unwrap();
//! let c = contract(&a, &id, &[Label::from("k")], &[Label::from("k")]).unwrap();
//!
//! let mut expected = a.clone();
//! expected.replace_label(&"k".into(), "j".into()).unwrap();
//! assert!(c.approx_eq(&expected, 1e-14));
//! ```

pub mod backend;
pub mod contract;
pub mod error;
pub mod global_default;
pub mod label;
pub mod solve;
pub mod svd;
pub mod tensor;
pub mod truncation;

pub use contract::{contract, tensor_product};
pub use error::{Result, TensorError};
pub use global_default::{GlobalDefault, InvalidToleranceError};
pub use label::{BondId, Label, Role};
pub use solve::{default_solve_rcond, set_default_solve_rcond, solve, solve_with_rcond};
pub use svd::{svd, SvdDecomp};
pub use tensor::{Tensor, Unfolding};
pub use truncation::{
    default_svd_threshold, retained_rank, set_default_svd_threshold, TruncationParams,
};

pub use num_complex::Complex64;
