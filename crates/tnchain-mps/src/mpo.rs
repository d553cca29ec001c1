//! Matrix product operators.

use std::slice;

use tnchain_core::{Label, Tensor};

use crate::chain::Chain;
use crate::error::{MpsError, Result};

/// Matrix product operator: a [`Chain`] whose tensors carry an input and an
/// output physical axis. Open boundaries are assumed.
#[derive(Debug, Clone, PartialEq)]
pub struct Mpo {
    chain: Chain,
    phys_in: Label,
    phys_out: Label,
}

impl Mpo {
    /// Build an operator from owned tensors and its role labels.
    pub fn new(
        tensors: Vec<Tensor>,
        left: Label,
        right: Label,
        phys_in: Label,
        phys_out: Label,
    ) -> Result<Self> {
        for (site, t) in tensors.iter().enumerate() {
            for label in [&phys_in, &phys_out] {
                if !t.has_label(label) {
                    return Err(MpsError::MissingRole {
                        site,
                        label: label.clone(),
                    });
                }
            }
        }
        Ok(Self {
            chain: Chain::new(tensors, left, right)?,
            phys_in,
            phys_out,
        })
    }

    /// Build an operator whose tensors use the standard role labels.
    pub fn from_tensors(tensors: Vec<Tensor>) -> Result<Self> {
        Self::new(
            tensors,
            Label::LEFT,
            Label::RIGHT,
            Label::PHYS_IN,
            Label::PHYS_OUT,
        )
    }

    /// Identity operator with bond dimension 1.
    pub fn identity(phys_dims: &[usize]) -> Result<Self> {
        let tensors = phys_dims
            .iter()
            .map(|&d| Tensor::identity(Label::PHYS_OUT, Label::PHYS_IN, d))
            .collect::<tnchain_core::Result<Vec<_>>>()?;
        Self::from_tensors(tensors)
    }

    /// Number of sites.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always false: an operator has at least one site.
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

    /// Label of the axis the operator acts on.
    pub fn phys_in_label(&self) -> &Label {
        &self.phys_in
    }

    /// Label of the axis the operator produces.
    pub fn phys_out_label(&self) -> &Label {
        &self.phys_out
    }

    /// Tensor at `site`.
    pub fn get(&self, site: usize) -> Option<&Tensor> {
        self.chain.get(site)
    }

    /// Iterate over the site tensors from left to right.
    pub fn iter(&self) -> slice::Iter<'_, Tensor> {
        self.chain.iter()
    }

    /// Underlying chain.
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Right bond dimension of every site but the last.
    pub fn bond_dims(&self) -> Vec<usize> {
        self.chain.bond_dims()
    }

    /// Reverse the site order and swap the left and right role bindings.
    pub fn reverse(&mut self) {
        self.chain.reverse();
    }

    /// Reversed operator, see [`reverse`](Self::reverse).
    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.reverse();
        self
    }
}

impl AsRef<Chain> for Mpo {
    fn as_ref(&self) -> &Chain {
        &self.chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_shape() {
        let mpo = Mpo::identity(&[2, 3]).unwrap();
        assert_eq!(mpo.len(), 2);
        assert_eq!(mpo.bond_dims(), vec![1]);
        let t = mpo.get(1).unwrap();
        assert_eq!(t.dim_of(&Label::PHYS_IN).unwrap(), 3);
        assert_eq!(t.dim_of(&Label::LEFT).unwrap(), 1);
    }

    #[test]
    fn test_missing_phys_in() {
        let t = Tensor::zeros(vec![Label::PHYS_OUT], vec![2]).unwrap();
        assert!(matches!(
            Mpo::from_tensors(vec![t]),
            Err(MpsError::MissingRole { site: 0, .. })
        ));
    }

    #[test]
    fn test_reverse() {
        let mpo = Mpo::identity(&[2, 3]).unwrap().reversed();
        assert_eq!(mpo.left_label(), &Label::RIGHT);
        assert_eq!(mpo.get(0).unwrap().dim_of(&Label::PHYS_OUT).unwrap(), 3);
    }
}
