#![warn(missing_docs)]
//! One-dimensional tensor networks
//!
//! This crate provides matrix product states and operators built on the
//! labeled tensors of `tnchain-core`:
//! - [`Chain`], [`Mps`], [`Mpo`]: chains of tensors with bound role labels
//! - Left/right canonicalisation by SVD sweeps, with optional truncation
//! - [`check_canonical_form`]: where canonical form breaks down
//! - [`svd_compress`] and [`variational_compress`]: bond dimension control
//! - [`inner_product`], [`contract_mps_mpo`], [`contract_virtual_indices`]
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use tnchain_mps::{frob_distance_squared, svd_compress, Mps, SvdCompressOptions};
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(0);
//! let mps = Mps::random(&[2, 2, 2, 2], &[2, 4, 2], &mut rng).unwrap();
//!
//! let compressed = svd_compress(&mps, &SvdCompressOptions::new(2)).unwrap();
//! assert!(compressed.bond_dims().iter().all(|&d| d <= 2));
//!
//! let distance = frob_distance_squared(&compressed, &mps).unwrap();
//! println!("Discarded weight: {}", distance);
//! ```

pub mod canonical;
pub mod chain;
pub mod compression;
pub mod contraction;
pub mod error;
pub mod inspect;
pub mod mpo;
pub mod mps;
pub mod options;
pub mod variational;

pub use canonical::{left_canonical_form, reverse_mps, right_canonical_form, SweepNorm};
pub use chain::Chain;
pub use compression::svd_compress;
pub use contraction::{
    contract_mps_mpo, contract_multi_index_tensor_with_chain, contract_virtual_indices,
    frob_distance_squared, inner_product, inner_product_tensor,
};
pub use error::{MpsError, Result};
pub use inspect::{check_canonical_form, CanonicalForm, CanonicalFormReport};
pub use mpo::Mpo;
pub use mps::Mps;
pub use options::{CanonicaliseOptions, SvdCompressOptions, VariationalOptions};
pub use variational::variational_compress;
