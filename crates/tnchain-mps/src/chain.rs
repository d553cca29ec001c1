//! Ordered chain of tensors linked by virtual axes.
//!
//! A [`Chain`] binds two labels to the left and right virtual roles. Every
//! tensor exposes both: boundary tensors without one get a size-1 dummy
//! axis at construction, so open boundary chains carry dimension-1 axes at
//! their ends.

use std::slice;

use tnchain_core::{Label, Tensor};

use crate::error::{MpsError, Result};

/// Sequence of tensors sharing a left/right role binding.
///
/// Cloning a chain deep-copies every tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    tensors: Vec<Tensor>,
    left: Label,
    right: Label,
}

/// Add missing role axes as size-1 dummies: left in front, right at the back.
fn expose_roles(tensor: &mut Tensor, left: &Label, right: &Label) -> Result<()> {
    if !tensor.has_label(left) {
        tensor.add_dummy_index(left.clone(), 0)?;
    }
    if !tensor.has_label(right) {
        tensor.add_dummy_index(right.clone(), tensor.rank())?;
    }
    Ok(())
}

impl Chain {
    /// Build a chain from owned tensors.
    ///
    /// Tensors that lack `left` or `right` get a size-1 dummy axis with that
    /// label. Adjacent tensors must agree on their shared bond dimension.
    ///
    /// The role labels must not coincide with any other axis label of the
    /// tensors.
    pub fn new(tensors: Vec<Tensor>, left: Label, right: Label) -> Result<Self> {
        if tensors.is_empty() {
            return Err(MpsError::Empty);
        }
        let mut tensors = tensors;
        for t in tensors.iter_mut() {
            expose_roles(t, &left, &right)?;
        }
        let chain = Self {
            tensors,
            left,
            right,
        };
        chain.check_bonds()?;
        Ok(chain)
    }

    fn check_bonds(&self) -> Result<()> {
        for (site, pair) in self.tensors.windows(2).enumerate() {
            let left_right = pair[0].dim_of(&self.right)?;
            let right_left = pair[1].dim_of(&self.left)?;
            if left_right != right_left {
                return Err(MpsError::BondMismatch {
                    site,
                    left_right,
                    right_left,
                });
            }
        }
        Ok(())
    }

    /// Number of sites.
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    /// Always false: a chain has at least one site.
    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Label bound to the left role.
    pub fn left_label(&self) -> &Label {
        &self.left
    }

    /// Label bound to the right role.
    pub fn right_label(&self) -> &Label {
        &self.right
    }

    /// Tensor at `site`.
    pub fn get(&self, site: usize) -> Option<&Tensor> {
        self.tensors.get(site)
    }

    /// Iterate over the tensors from left to right.
    pub fn iter(&self) -> slice::Iter<'_, Tensor> {
        self.tensors.iter()
    }

    /// All tensors, left to right.
    pub fn tensors(&self) -> &[Tensor] {
        &self.tensors
    }

    /// Consume the chain, returning its tensors.
    pub fn into_tensors(self) -> Vec<Tensor> {
        self.tensors
    }

    pub(crate) fn tensors_mut(&mut self) -> &mut [Tensor] {
        &mut self.tensors
    }

    /// Replace the tensor at `site`.
    ///
    /// Missing role axes are added as dummies. Bond dimensions are not
    /// checked, so a sweep may update neighbours one at a time.
    pub fn set(&mut self, site: usize, tensor: Tensor) -> Result<()> {
        let len = self.len();
        let slot = self
            .tensors
            .get_mut(site)
            .ok_or(MpsError::SiteOutOfRange { site, len })?;
        let mut tensor = tensor;
        expose_roles(&mut tensor, &self.left, &self.right)?;
        *slot = tensor;
        Ok(())
    }

    /// Right bond dimension of every site but the last.
    pub fn bond_dims(&self) -> Vec<usize> {
        self.tensors[..self.len().saturating_sub(1)]
            .iter()
            .map(|t| t.dim_of(&self.right).unwrap_or(0))
            .collect()
    }

    /// Reverse the site order and swap the left and right role bindings.
    pub fn reverse(&mut self) {
        self.tensors.reverse();
        std::mem::swap(&mut self.left, &mut self.right);
    }

    /// Reversed chain, see [`reverse`](Self::reverse).
    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.reverse();
        self
    }

    /// Rename axes on every tensor and update the role binding.
    ///
    /// All renames are validated before anything changes, so on error the
    /// chain is untouched.
    pub(crate) fn replace_labels(&mut self, pairs: &[(Label, Label)]) -> Result<()> {
        let renamed = self
            .tensors
            .iter()
            .map(|t| {
                let mut t = t.clone();
                t.replace_labels(pairs)?;
                Ok(t)
            })
            .collect::<Result<Vec<_>>>()?;

        let rebind = |label: &Label| {
            pairs
                .iter()
                .find(|(old, _)| old == label)
                .map_or_else(|| label.clone(), |(_, new)| new.clone())
        };
        self.left = rebind(&self.left);
        self.right = rebind(&self.right);
        self.tensors = renamed;
        Ok(())
    }

    /// Complex-conjugate every tensor in place.
    pub fn conjugate(&mut self) {
        for t in self.tensors.iter_mut() {
            t.conjugate();
        }
    }
}

impl AsRef<Chain> for Chain {
    fn as_ref(&self) -> &Chain {
        self
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Tensor;
    type IntoIter = slice::Iter<'a, Tensor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
