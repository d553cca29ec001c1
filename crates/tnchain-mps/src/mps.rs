//! Matrix product states.

use std::slice;

use rand::Rng;
use tnchain_core::{Label, Tensor};

use crate::chain::Chain;
use crate::contraction::inner_product;
use crate::error::{MpsError, Result};

/// Matrix product state: a [`Chain`] whose tensors also carry a physical
/// axis.
///
/// The three role labels are bound once on the state. Canonical form is not
/// stored; use [`check_canonical_form`](crate::check_canonical_form) to
/// inspect it.
#[derive(Debug, Clone, PartialEq)]
pub struct Mps {
    chain: Chain,
    phys: Label,
}

impl Mps {
    /// Build a state from owned tensors and its role labels.
    ///
    /// Boundary tensors missing `left` or `right` get size-1 dummy axes.
    /// Every tensor must carry `phys`.
    pub fn new(tensors: Vec<Tensor>, left: Label, right: Label, phys: Label) -> Result<Self> {
        if let Some(site) = tensors.iter().position(|t| !t.has_label(&phys)) {
            return Err(MpsError::MissingRole { site, label: phys });
        }
        Ok(Self {
            chain: Chain::new(tensors, left, right)?,
            phys,
        })
    }

    /// Build a state whose tensors use [`Label::LEFT`], [`Label::RIGHT`] and
    /// [`Label::PHYS`].
    pub fn from_tensors(tensors: Vec<Tensor>) -> Result<Self> {
        Self::new(tensors, Label::LEFT, Label::RIGHT, Label::PHYS)
    }

    /// Random state with open boundaries and standard labels.
    ///
    /// `bond_dims` holds the `len - 1` inner bond dimensions. Each site is
    /// laid out as `[left, phys, right]` with entries uniform in the unit
    /// square of the complex plane.
    pub fn random<R: Rng>(phys_dims: &[usize], bond_dims: &[usize], rng: &mut R) -> Result<Self> {
        if phys_dims.is_empty() {
            return Err(MpsError::Empty);
        }
        if bond_dims.len() + 1 != phys_dims.len() {
            return Err(MpsError::LengthMismatch {
                expected: phys_dims.len() - 1,
                got: bond_dims.len(),
            });
        }
        let n = phys_dims.len();
        let tensors = (0..n)
            .map(|i| {
                let left = if i == 0 { 1 } else { bond_dims[i - 1] };
                let right = if i + 1 == n { 1 } else { bond_dims[i] };
                Tensor::random(
                    vec![Label::LEFT, Label::PHYS, Label::RIGHT],
                    vec![left, phys_dims[i], right],
                    rng,
                )
            })
            .collect::<tnchain_core::Result<Vec<_>>>()?;
        Self::from_tensors(tensors)
    }

    /// Number of sites.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always false: a state has at least one site.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Label bound to the left role.
    pub fn left_label(&self) -> &Label {
        self.chain.left_label()
    }

    /// Label bound to the right role.
    pub fn right_label(&self) -> &Label {
        self.chain.right_label()
    }

    /// Label bound to the physical role.
    pub fn phys_label(&self) -> &Label {
        &self.phys
    }

    /// Tensor at `site`.
    pub fn get(&self, site: usize) -> Option<&Tensor> {
        self.chain.get(site)
    }

    /// Iterate over the site tensors from left to right.
    pub fn iter(&self) -> slice::Iter<'_, Tensor> {
        self.chain.iter()
    }

    /// All site tensors.
    pub fn tensors(&self) -> &[Tensor] {
        self.chain.tensors()
    }

    /// Underlying chain.
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Consume the state, returning its chain.
    pub fn into_chain(self) -> Chain {
        self.chain
    }

    pub(crate) fn tensors_mut(&mut self) -> &mut [Tensor] {
        self.chain.tensors_mut()
    }

    /// Replace the tensor at `site`. The tensor must carry the physical
    /// label; missing virtual axes are added as dummies.
    pub fn set(&mut self, site: usize, tensor: Tensor) -> Result<()> {
        if !tensor.has_label(&self.phys) {
            return Err(MpsError::MissingRole {
                site,
                label: self.phys.clone(),
            });
        }
        self.chain.set(site, tensor)
    }

    /// Right bond dimension of every site but the last.
    pub fn bond_dims(&self) -> Vec<usize> {
        self.chain.bond_dims()
    }

    /// Physical dimension of every site.
    pub fn phys_dims(&self) -> Vec<usize> {
        self.iter()
            .map(|t| t.dim_of(&self.phys).unwrap_or(0))
            .collect()
    }

    /// Largest bond dimension, 1 for a single site.
    pub fn max_bond_dim(&self) -> usize {
        self.bond_dims().into_iter().max().unwrap_or(1)
    }

    /// Reverse the site order and swap the left and right role bindings.
    pub fn reverse(&mut self) {
        self.chain.reverse();
    }

    /// Reversed state, see [`reverse`](Self::reverse).
    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.reverse();
        self
    }

    /// Rebind the role labels, renaming the matching axis on every tensor.
    ///
    /// `None` keeps the current label. Every tensor is renamed or none is.
    pub fn replace_left_right_phys_labels(
        &mut self,
        left: Option<Label>,
        right: Option<Label>,
        phys: Option<Label>,
    ) -> Result<()> {
        let left = left.unwrap_or_else(|| self.left_label().clone());
        let right = right.unwrap_or_else(|| self.right_label().clone());
        let phys = phys.unwrap_or_else(|| self.phys.clone());
        let pairs = [
            (self.left_label().clone(), left),
            (self.right_label().clone(), right),
            (self.phys.clone(), phys.clone()),
        ];
        self.chain.replace_labels(&pairs)?;
        self.phys = phys;
        Ok(())
    }

    /// Rebind to the standard role labels primed `prime_level` times.
    pub fn standard_labels(&mut self, prime_level: usize) -> Result<()> {
        self.replace_left_right_phys_labels(
            Some(Label::LEFT.primed(prime_level)),
            Some(Label::RIGHT.primed(prime_level)),
            Some(Label::PHYS.primed(prime_level)),
        )
    }

    /// Copy with every entry complex-conjugated.
    #[must_use]
    pub fn complex_conjugate(&self) -> Self {
        let mut out = self.clone();
        out.chain.conjugate();
        out
    }

    /// Norm `sqrt(<ψ|ψ>)`.
    pub fn norm(&self) -> Result<f64> {
        Ok(inner_product(self, self, true)?.re.max(0.0).sqrt())
    }

    /// Highest prime level among the role labels.
    pub(crate) fn max_prime_level(&self) -> usize {
        [self.left_label(), self.right_label(), &self.phys]
            .iter()
            .map(|l| l.prime_level())
            .max()
            .unwrap_or(0)
    }
}

impl AsRef<Chain> for Mps {
    fn as_ref(&self) -> &Chain {
        &self.chain
    }
}

impl<'a> IntoIterator for &'a Mps {
    type Item = &'a Tensor;
    type IntoIter = slice::Iter<'a, Tensor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
