//! Variational compression by single-site alternating least squares.
//!
//! The ansatz `φ` is seeded with [`svd_compress`] and then refined one site
//! at a time. At site `i` the distance `‖φ - ψ‖²` is quadratic in the site
//! tensor `x`:
//!
//! ```text
//! ‖φ - ψ‖² = x† N x - x† b - b† x + ⟨ψ|ψ⟩
//! ```
//!
//! where `N` is the environment of `⟨φ|φ⟩` around site `i` (tensored with
//! the identity on the physical axis) and `b` is the environment of `⟨φ|ψ⟩`
//! applied to `ψ_i`. The minimiser solves `N x = b`.
//!
//! Environments are cached: right environments are rebuilt once per sweep
//! and left environments are extended by one site after every update.

use tnchain_core::{contract, solve_with_rcond, tensor_product, Label, Tensor};
use tracing::{debug, trace, Level};

use crate::compression::svd_compress;
use crate::contraction::frob_distance_squared;
use crate::error::Result;
use crate::mps::Mps;
use crate::options::{SvdCompressOptions, VariationalOptions};

/// Labels of the ket (`L`, `R`, `P`) and of the conjugated bra (`L'`, `R'`,
/// `P'`) used while building environments.
struct Legs {
    left: Label,
    right: Label,
    phys: Label,
    bra_left: Label,
    bra_right: Label,
    bra_phys: Label,
}

impl Legs {
    fn new() -> Self {
        Self {
            left: Label::LEFT,
            right: Label::RIGHT,
            phys: Label::PHYS,
            bra_left: Label::LEFT.prime(),
            bra_right: Label::RIGHT.prime(),
            bra_phys: Label::PHYS.prime(),
        }
    }

    /// Conjugated copy of a site tensor with bra labels.
    fn bra(&self, t: &Tensor) -> Result<Tensor> {
        let mut b = t.conj();
        b.replace_labels(&[
            (self.left.clone(), self.bra_left.clone()),
            (self.right.clone(), self.bra_right.clone()),
            (self.phys.clone(), self.bra_phys.clone()),
        ])?;
        Ok(b)
    }

    /// Left boundary `[L', L]` of the chain.
    fn left_edge(&self, ket: &Tensor) -> Result<Tensor> {
        let d = ket.dim_of(&self.left)?;
        Ok(Tensor::identity(self.bra_left.clone(), self.left.clone(), d)?)
    }

    /// Right boundary `[R', R]` of the chain.
    fn right_edge(&self, ket: &Tensor) -> Result<Tensor> {
        let d = ket.dim_of(&self.right)?;
        Ok(Tensor::identity(self.bra_right.clone(), self.right.clone(), d)?)
    }

    /// Absorb one site into a left environment `[L', L]`.
    fn extend_left(&self, env: &Tensor, ket: &Tensor, bra: &Tensor) -> Result<Tensor> {
        let t = contract(env, ket, &[self.left.clone()], &[self.left.clone()])?;
        let mut t = contract(
            &t,
            bra,
            &[self.bra_left.clone(), self.phys.clone()],
            &[self.bra_left.clone(), self.bra_phys.clone()],
        )?;
        t.replace_labels(&[
            (self.right.clone(), self.left.clone()),
            (self.bra_right.clone(), self.bra_left.clone()),
        ])?;
        Ok(t)
    }

    /// Absorb one site into a right environment `[R', R]`.
    fn extend_right(&self, env: &Tensor, ket: &Tensor, bra: &Tensor) -> Result<Tensor> {
        let t = contract(ket, env, &[self.right.clone()], &[self.right.clone()])?;
        let mut t = contract(
            &t,
            bra,
            &[self.bra_right.clone(), self.phys.clone()],
            &[self.bra_right.clone(), self.bra_phys.clone()],
        )?;
        t.replace_labels(&[
            (self.left.clone(), self.right.clone()),
            (self.bra_left.clone(), self.bra_right.clone()),
        ])?;
        Ok(t)
    }
}

/// Left and right environments of one overlap `⟨bra|ket⟩`.
///
/// `left[i]` covers sites `0..i` and `right[i]` covers sites `i+1..n`.
struct Environments {
    left: Vec<Tensor>,
    right: Vec<Tensor>,
}

impl Environments {
    /// Build every right environment, and the left boundary.
    fn build(legs: &Legs, ket: &Mps, bra: &[Tensor]) -> Result<Self> {
        let n = ket.len();
        let kets = ket.tensors();

        let mut right = Vec::with_capacity(n);
        right.push(legs.right_edge(&kets[n - 1])?);
        for i in (1..n).rev() {
            let next = legs.extend_right(&right[right.len() - 1], &kets[i], &bra[i])?;
            right.push(next);
        }
        right.reverse();

        let mut left = Vec::with_capacity(n);
        left.push(legs.left_edge(&kets[0])?);
        Ok(Self { left, right })
    }

    /// Extend the left environments past site `i`.
    fn advance(&mut self, legs: &Legs, i: usize, ket: &Tensor, bra: &Tensor) -> Result<()> {
        let next = legs.extend_left(&self.left[i], ket, bra)?;
        self.left.truncate(i + 1);
        self.left.push(next);
        Ok(())
    }
}

/// Compress `mps` to an ansatz with bond dimension at most `options.chi`.
///
/// The ansatz starts from [`svd_compress`] and is refined by
/// `options.max_sweeps` left-to-right sweeps, each solving the local linear
/// system at every site in turn. The result carries the labels of `mps`,
/// which is not modified.
///
/// # Errors
/// - `SingularSystem` (inside [`MpsError::Tensor`](crate::MpsError::Tensor))
///   if a local system has a vanishing pivot, or a pivot ratio at or below
///   `options.rcond`; no regularisation is applied
/// - `UnderflowBond` from the seeding compression
pub fn variational_compress(mps: &Mps, options: &VariationalOptions) -> Result<Mps> {
    let legs = Legs::new();
    let n = mps.len();

    let mut psi = mps.clone();
    psi.standard_labels(0)?;

    let seed = SvdCompressOptions::new(options.chi).with_threshold(options.seed_threshold);
    let mut phi = svd_compress(&psi, &seed)?;
    let rcond = options.effective_rcond();

    let rows = [
        legs.bra_left.clone(),
        legs.bra_phys.clone(),
        legs.bra_right.clone(),
    ];
    let cols = [legs.left.clone(), legs.phys.clone(), legs.right.clone()];

    for sweep in 0..options.max_sweeps {
        let bra: Vec<Tensor> = phi
            .iter()
            .map(|t| legs.bra(t))
            .collect::<Result<_>>()?;
        let mut quad = Environments::build(&legs, &phi, &bra)?;
        let mut lin = Environments::build(&legs, &psi, &bra)?;

        for i in 0..n {
            let d = phi.tensors()[i].dim_of(&legs.phys)?;
            let id = Tensor::identity(legs.bra_phys.clone(), legs.phys.clone(), d)?;
            let n_mat = tensor_product(&tensor_product(&quad.left[i], &id)?, &quad.right[i])?;

            let t = contract(&lin.left[i], &psi.tensors()[i], &[legs.left.clone()], &[legs.left.clone()])?;
            let mut b = contract(&t, &lin.right[i], &[legs.right.clone()], &[legs.right.clone()])?;
            b.replace_label(&legs.phys, legs.bra_phys.clone())?;

            let x = solve_with_rcond(&n_mat, &b, &rows, &cols, rcond)?;
            trace!(sweep, site = i, "local update");
            phi.set(i, x)?;

            if i + 1 < n {
                let bra_i = legs.bra(&phi.tensors()[i])?;
                quad.advance(&legs, i, &phi.tensors()[i], &bra_i)?;
                lin.advance(&legs, i, &psi.tensors()[i], &bra_i)?;
            }
        }

        if tracing::enabled!(Level::DEBUG) {
            let distance = frob_distance_squared(&phi, &psi)?;
            debug!(sweep, distance, "variational sweep");
        }
    }

    phi.replace_left_right_phys_labels(
        Some(mps.left_label().clone()),
        Some(mps.right_label().clone()),
        Some(mps.phys_label().clone()),
    )?;
    Ok(phi)
}
