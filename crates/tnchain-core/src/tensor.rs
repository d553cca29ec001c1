//! Dense labeled tensor.
//!
//! A [`Tensor`] stores complex entries in row-major order together with one
//! [`Label`] and one dimension per axis. Axes are always addressed by label;
//! positions are an internal detail resolved on each operation.

use std::collections::HashSet;

use mdarray::{DynRank, Shape};
use num_complex::Complex64;
use num_traits::{One, Zero};
use rand::Rng;

use crate::backend::{matrix_from_row_major, matrix_to_row_major, Matrix};
use crate::error::{Result, TensorError};
use crate::label::Label;

/// Row-major strides for the given dimensions.
pub(crate) fn strides(dims: &[usize]) -> Vec<usize> {
    let mut s = vec![1; dims.len()];
    for i in (0..dims.len().saturating_sub(1)).rev() {
        s[i] = s[i + 1] * dims[i + 1];
    }
    s
}

/// Reorder row-major data so that output axis `i` is input axis `perm[i]`.
pub(crate) fn permute_data(data: &[Complex64], dims: &[usize], perm: &[usize]) -> Vec<Complex64> {
    if perm.iter().enumerate().all(|(i, &p)| i == p) {
        return data.to_vec();
    }
    let dense: mdarray::Tensor<Complex64> = mdarray::Tensor::from(data.to_vec()).into_shape(DynRank::from_dims(dims));
    dense.permute(perm).to_tensor().into_vec()
}

fn check_unique(labels: &[Label]) -> Result<()> {
    let mut seen = HashSet::with_capacity(labels.len());
    for label in labels {
        if !seen.insert(label) {
            return Err(TensorError::DuplicateLabel {
                label: label.clone(),
            });
        }
    }
    Ok(())
}

/// A matrix view of a tensor, together with the axis bookkeeping needed to
/// fold it back.
#[derive(Debug, Clone)]
pub struct Unfolding {
    /// The matrix, rows = `row_labels`, columns = `col_labels`
    pub matrix: Matrix,
    /// Labels merged into the row index, slowest first
    pub row_labels: Vec<Label>,
    /// Dimensions of `row_labels`
    pub row_dims: Vec<usize>,
    /// Labels merged into the column index, slowest first
    pub col_labels: Vec<Label>,
    /// Dimensions of `col_labels`
    pub col_dims: Vec<usize>,
}

/// Dense complex tensor with labeled axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    labels: Vec<Label>,
    dims: Vec<usize>,
    data: Vec<Complex64>,
}

impl Tensor {
    /// Create a tensor from labels, dimensions and row-major data.
    pub fn new(labels: Vec<Label>, dims: Vec<usize>, data: Vec<Complex64>) -> Result<Self> {
        if labels.len() != dims.len() {
            return Err(TensorError::LabelCountMismatch {
                labels: labels.len(),
                dims: dims.len(),
            });
        }
        let expected: usize = dims.iter().product();
        if data.len() != expected {
            return Err(TensorError::DataLength {
                expected,
                got: data.len(),
            });
        }
        check_unique(&labels)?;
        Ok(Self { labels, dims, data })
    }

    /// Create a tensor from real row-major data.
    pub fn from_real(labels: Vec<Label>, dims: Vec<usize>, data: Vec<f64>) -> Result<Self> {
        Self::new(
            labels,
            dims,
            data.into_iter().map(|x| Complex64::new(x, 0.0)).collect(),
        )
    }

    /// Create a tensor whose entry at each multi-index is given by `f`.
    pub fn from_fn<F>(labels: Vec<Label>, dims: Vec<usize>, mut f: F) -> Result<Self>
    where
        F: FnMut(&[usize]) -> Complex64,
    {
        let data = mdarray::Tensor::from_fn(&dims[..], |idx| f(idx)).into_vec();
        Self::new(labels, dims, data)
    }

    /// Zero-filled tensor.
    pub fn zeros(labels: Vec<Label>, dims: Vec<usize>) -> Result<Self> {
        let total = dims.iter().product();
        Self::new(labels, dims, vec![Complex64::zero(); total])
    }

    /// Rank-0 tensor holding a single value.
    pub fn scalar(value: Complex64) -> Self {
        Self {
            labels: Vec::new(),
            dims: Vec::new(),
            data: vec![value],
        }
    }

    /// Identity matrix `δ(row, col)` of size `dim × dim`.
    pub fn identity(row: Label, col: Label, dim: usize) -> Result<Self> {
        Self::from_fn(vec![row, col], vec![dim, dim], |idx| {
            if idx[0] == idx[1] {
                Complex64::one()
            } else {
                Complex64::zero()
            }
        })
    }

    /// Diagonal matrix with the given real values on the diagonal.
    pub fn diag(row: Label, col: Label, values: &[f64]) -> Result<Self> {
        let n = values.len();
        Self::from_fn(vec![row, col], vec![n, n], |idx| {
            if idx[0] == idx[1] {
                Complex64::new(values[idx[0]], 0.0)
            } else {
                Complex64::zero()
            }
        })
    }

    /// Tensor with real and imaginary parts drawn uniformly from `[-1, 1)`.
    pub fn random<R: Rng>(labels: Vec<Label>, dims: Vec<usize>, rng: &mut R) -> Result<Self> {
        Self::from_fn(labels, dims, |_| {
            Complex64::new(
                rng.random::<f64>() * 2.0 - 1.0,
                rng.random::<f64>() * 2.0 - 1.0,
            )
        })
    }

    /// Tensor with real entries drawn uniformly from `[-1, 1)`.
    pub fn random_real<R: Rng>(
        labels: Vec<Label>,
        dims: Vec<usize>,
        rng: &mut R,
    ) -> Result<Self> {
        Self::from_fn(labels, dims, |_| {
            Complex64::new(rng.random::<f64>() * 2.0 - 1.0, 0.0)
        })
    }

    /// Axis labels, in storage order.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Axis dimensions, in storage order.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Row-major entries.
    pub fn data(&self) -> &[Complex64] {
        &self.data
    }

    /// Mutable row-major entries.
    pub fn data_mut(&mut self) -> &mut [Complex64] {
        &mut self.data
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.labels.len()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor has no entries (some axis has dimension zero).
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether an axis with this label exists.
    pub fn has_label(&self, label: &Label) -> bool {
        self.labels.contains(label)
    }

    /// Storage position of the axis with this label.
    pub fn position(&self, label: &Label) -> Result<usize> {
        self.labels
            .iter()
            .position(|l| l == label)
            .ok_or_else(|| TensorError::LabelNotFound {
                label: label.clone(),
            })
    }

    /// Dimension of the axis with this label.
    pub fn dim_of(&self, label: &Label) -> Result<usize> {
        Ok(self.dims[self.position(label)?])
    }

    /// Entry at a multi-index given in storage order.
    pub fn get(&self, index: &[usize]) -> Option<Complex64> {
        if index.len() != self.rank() || index.iter().zip(&self.dims).any(|(&i, &d)| i >= d) {
            return None;
        }
        let offset: usize = index
            .iter()
            .zip(strides(&self.dims))
            .map(|(&i, s)| i * s)
            .sum();
        self.data.get(offset).copied()
    }

    /// The single entry of a tensor with exactly one element.
    pub fn to_scalar(&self) -> Option<Complex64> {
        if self.data.len() == 1 {
            Some(self.data[0])
        } else {
            None
        }
    }

    /// Frobenius norm.
    pub fn norm(&self) -> f64 {
        self.data.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt()
    }

    /// Multiply every entry by `factor`.
    pub fn scale<T: Into<Complex64>>(&mut self, factor: T) {
        let factor = factor.into();
        for x in self.data.iter_mut() {
            *x *= factor;
        }
    }

    /// Complex-conjugate every entry in place.
    pub fn conjugate(&mut self) {
        for x in self.data.iter_mut() {
            *x = x.conj();
        }
    }

    /// Complex conjugate copy.
    #[must_use]
    pub fn conj(&self) -> Self {
        let mut out = self.clone();
        out.conjugate();
        out
    }

    /// Rename the axis labeled `old` to `new`.
    pub fn replace_label(&mut self, old: &Label, new: Label) -> Result<()> {
        self.replace_labels(&[(old.clone(), new)])
    }

    /// Rename several axes at once.
    ///
    /// Renames are applied simultaneously, so swapping two labels is allowed.
    /// Nothing is modified if any old label is missing or the result would
    /// contain a duplicate.
    pub fn replace_labels(&mut self, pairs: &[(Label, Label)]) -> Result<()> {
        let mut labels = self.labels.clone();
        for (old, new) in pairs {
            let pos = self.position(old)?;
            labels[pos] = new.clone();
        }
        check_unique(&labels)?;
        self.labels = labels;
        Ok(())
    }

    /// Insert a new axis of dimension 1 at `position` (clamped to the rank).
    pub fn add_dummy_index(&mut self, label: Label, position: usize) -> Result<()> {
        if self.has_label(&label) {
            return Err(TensorError::DuplicateLabel { label });
        }
        let position = position.min(self.rank());
        self.labels.insert(position, label);
        self.dims.insert(position, 1);
        Ok(())
    }

    /// Remove an axis of dimension 1.
    pub fn remove_dummy_index(&mut self, label: &Label) -> Result<()> {
        let pos = self.position(label)?;
        if self.dims[pos] != 1 {
            return Err(TensorError::ShapeMismatch {
                label: label.clone(),
                left: self.dims[pos],
                right: 1,
            });
        }
        self.labels.remove(pos);
        self.dims.remove(pos);
        Ok(())
    }

    /// Remove every axis of dimension 1.
    pub fn remove_all_dummy_indices(&mut self) {
        let keep: Vec<bool> = self.dims.iter().map(|&d| d != 1).collect();
        let mut it = keep.iter();
        self.labels.retain(|_| *it.next().unwrap_or(&true));
        self.dims.retain(|&d| d != 1);
    }

    /// Copy of this tensor with axes in the given label order.
    pub fn permute(&self, order: &[Label]) -> Result<Self> {
        if order.len() != self.rank() {
            return Err(TensorError::LabelCountMismatch {
                labels: order.len(),
                dims: self.rank(),
            });
        }
        check_unique(order)?;
        let perm = order
            .iter()
            .map(|l| self.position(l))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.permute_positions(&perm))
    }

    pub(crate) fn permute_positions(&self, perm: &[usize]) -> Self {
        Self {
            labels: perm.iter().map(|&p| self.labels[p].clone()).collect(),
            dims: perm.iter().map(|&p| self.dims[p]).collect(),
            data: permute_data(&self.data, &self.dims, perm),
        }
    }

    /// Move one axis to `position` (clamped), keeping the others in order.
    pub fn move_index(&mut self, label: &Label, position: usize) -> Result<()> {
        let from = self.position(label)?;
        let mut perm: Vec<usize> = (0..self.rank()).filter(|&p| p != from).collect();
        perm.insert(position.min(perm.len()), from);
        *self = self.permute_positions(&perm);
        Ok(())
    }

    /// Trace over two axes of equal dimension, removing both.
    pub fn contract_internal(&mut self, a: &Label, b: &Label) -> Result<()> {
        let pa = self.position(a)?;
        let pb = self.position(b)?;
        if pa == pb {
            return Err(TensorError::DuplicateLabel { label: a.clone() });
        }
        let d = self.dims[pa];
        if self.dims[pb] != d {
            return Err(TensorError::ShapeMismatch {
                label: a.clone(),
                left: d,
                right: self.dims[pb],
            });
        }

        let mut perm: Vec<usize> = (0..self.rank()).filter(|&p| p != pa && p != pb).collect();
        let rest_labels: Vec<Label> = perm.iter().map(|&p| self.labels[p].clone()).collect();
        let rest_dims: Vec<usize> = perm.iter().map(|&p| self.dims[p]).collect();
        perm.push(pa);
        perm.push(pb);
        let data = permute_data(&self.data, &self.dims, &perm);

        let rows: usize = rest_dims.iter().product();
        let block = d * d;
        let traced = (0..rows)
            .map(|r| (0..d).map(|k| data[r * block + k * d + k]).sum())
            .collect();

        self.labels = rest_labels;
        self.dims = rest_dims;
        self.data = traced;
        Ok(())
    }

    /// Merge the given axes into a single axis labeled `new_label`.
    ///
    /// The merged axis is placed last; its index runs over the fused axes
    /// in the order given, slowest first.
    pub fn fuse_indices(&mut self, labels: &[Label], new_label: Label) -> Result<()> {
        check_unique(labels)?;
        let fused = labels
            .iter()
            .map(|l| self.position(l))
            .collect::<Result<Vec<_>>>()?;
        let mut perm: Vec<usize> = (0..self.rank()).filter(|p| !fused.contains(p)).collect();
        let mut new_labels: Vec<Label> = perm.iter().map(|&p| self.labels[p].clone()).collect();
        let mut new_dims: Vec<usize> = perm.iter().map(|&p| self.dims[p]).collect();
        let fused_dim = fused.iter().map(|&p| self.dims[p]).product();
        perm.extend_from_slice(&fused);
        new_labels.push(new_label);
        new_dims.push(fused_dim);
        check_unique(&new_labels)?;

        self.data = permute_data(&self.data, &self.dims, &perm);
        self.labels = new_labels;
        self.dims = new_dims;
        Ok(())
    }

    /// Keep only the first `keep` entries along one axis.
    pub fn truncate_axis(&mut self, label: &Label, keep: usize) -> Result<()> {
        let pos = self.position(label)?;
        let d = self.dims[pos];
        if keep >= d {
            return Ok(());
        }
        let mut perm = vec![pos];
        perm.extend((0..self.rank()).filter(|&p| p != pos));
        let front = self.permute_positions(&perm);
        let rest: usize = front.dims[1..].iter().product();

        let mut truncated = front;
        truncated.data.truncate(keep * rest);
        truncated.dims[0] = keep;

        let mut inverse = vec![0; perm.len()];
        for (i, &p) in perm.iter().enumerate() {
            inverse[p] = i;
        }
        *self = truncated.permute_positions(&inverse);
        Ok(())
    }

    /// Matrix whose rows run over `rows` and columns over `cols`.
    ///
    /// Together `rows` and `cols` must name every axis exactly once.
    pub fn matrix(&self, rows: &[Label], cols: &[Label]) -> Result<Matrix> {
        let order: Vec<Label> = rows.iter().chain(cols).cloned().collect();
        let permuted = self.permute(&order)?;
        let m: usize = permuted.dims[..rows.len()].iter().product();
        let n: usize = permuted.dims[rows.len()..].iter().product();
        Ok(matrix_from_row_major(&permuted.data, m, n))
    }

    /// Unfold into a matrix with `rows` as row axes and every other axis,
    /// in storage order, as column axes.
    pub fn unfold(&self, rows: &[Label]) -> Result<Unfolding> {
        check_unique(rows)?;
        for label in rows {
            self.position(label)?;
        }
        let col_labels: Vec<Label> = self
            .labels
            .iter()
            .filter(|l| !rows.contains(l))
            .cloned()
            .collect();
        let matrix = self.matrix(rows, &col_labels)?;
        let row_dims = rows
            .iter()
            .map(|l| self.dim_of(l))
            .collect::<Result<Vec<_>>>()?;
        let col_dims = col_labels
            .iter()
            .map(|l| self.dim_of(l))
            .collect::<Result<Vec<_>>>()?;
        Ok(Unfolding {
            matrix,
            row_labels: rows.to_vec(),
            row_dims,
            col_labels,
            col_dims,
        })
    }

    /// Fold a matrix back into a tensor with the given row and column axes.
    pub fn from_matrix(
        matrix: &Matrix,
        row_labels: Vec<Label>,
        row_dims: Vec<usize>,
        col_labels: Vec<Label>,
        col_dims: Vec<usize>,
    ) -> Result<Self> {
        let mut labels = row_labels;
        labels.extend(col_labels);
        let mut dims = row_dims;
        dims.extend(col_dims);
        Self::new(labels, dims, matrix_to_row_major(matrix))
    }

    /// Whether `other` has the same axes (in any order) and entries within
    /// `tol` in Frobenius norm.
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        if self.rank() != other.rank() {
            return false;
        }
        let Ok(aligned) = other.permute(&self.labels) else {
            return false;
        };
        if aligned.dims != self.dims {
            return false;
        }
        let diff: f64 = self
            .data
            .iter()
            .zip(&aligned.data)
            .map(|(a, b)| (a - b).norm_sqr())
            .sum();
        diff.sqrt() <= tol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    fn ranged(labels: &[&str], dims: Vec<usize>) -> Tensor {
        let total: usize = dims.iter().product();
        Tensor::from_real(
            labels.iter().map(|&l| Label::from(l)).collect(),
            dims,
            (0..total).map(|x| x as f64).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_validates() {
        assert!(matches!(
            Tensor::zeros(vec!["a".into()], vec![2, 3]),
            Err(TensorError::LabelCountMismatch { .. })
        ));
        assert!(matches!(
            Tensor::new(vec!["a".into()], vec![2], vec![c(1.0)]),
            Err(TensorError::DataLength { expected: 2, got: 1 })
        ));
        assert!(matches!(
            Tensor::zeros(vec!["a".into(), "a".into()], vec![2, 2]),
            Err(TensorError::DuplicateLabel { .. })
        ));
    }

    #[test]
    fn test_permute_moves_entries() {
        let t = ranged(&["a", "b", "c"], vec![2, 3, 4]);
        let p = t.permute(&["c".into(), "a".into(), "b".into()]).unwrap();
        assert_eq!(p.dims(), &[4, 2, 3]);
        for a in 0..2 {
            for b in 0..3 {
                for cc in 0..4 {
                    assert_eq!(t.get(&[a, b, cc]), p.get(&[cc, a, b]));
                }
            }
        }
        assert!(t.approx_eq(&p, 0.0));
    }

    #[test]
    fn test_move_index() {
        let mut t = ranged(&["a", "b", "c"], vec![2, 3, 4]);
        t.move_index(&"c".into(), 0).unwrap();
        assert_eq!(t.labels(), &[Label::from("c"), Label::from("a"), Label::from("b")]);
        assert_eq!(t.get(&[3, 1, 2]), Some(c((12 + 2 * 4 + 3) as f64)));
    }

    #[test]
    fn test_replace_labels_swap() {
        let mut t = ranged(&["a", "b"], vec![2, 3]);
        t.replace_labels(&[("a".into(), "b".into()), ("b".into(), "a".into())])
            .unwrap();
        assert_eq!(t.labels(), &[Label::from("b"), Label::from("a")]);

        let before = t.clone();
        assert!(t.replace_label(&"a".into(), "b".into()).is_err());
        assert_eq!(t, before);
    }

    #[test]
    fn test_dummy_indices() {
        let mut t = ranged(&["a"], vec![3]);
        t.add_dummy_index(Label::LEFT, 0).unwrap();
        t.add_dummy_index(Label::RIGHT, 5).unwrap();
        assert_eq!(t.dims(), &[1, 3, 1]);
        assert_eq!(t.labels()[2], Label::RIGHT);
        assert!(t.add_dummy_index(Label::LEFT, 0).is_err());

        t.remove_dummy_index(&Label::LEFT).unwrap();
        assert!(t.remove_dummy_index(&"a".into()).is_err());
        t.remove_all_dummy_indices();
        assert_eq!(t.labels(), &[Label::from("a")]);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn test_contract_internal_trace() {
        let t = ranged(&["x", "i", "j"], vec![2, 3, 3]);
        let mut traced = t.clone();
        traced.contract_internal(&"i".into(), &"j".into()).unwrap();
        assert_eq!(traced.labels(), &[Label::from("x")]);
        for x in 0..2 {
            let expected: Complex64 = (0..3).map(|k| t.get(&[x, k, k]).unwrap()).sum();
            assert_eq!(traced.get(&[x]), Some(expected));
        }
    }

    #[test]
    fn test_fuse_indices() {
        let mut t = ranged(&["a", "b", "c"], vec![2, 3, 4]);
        let orig = t.clone();
        t.fuse_indices(&["c".into(), "a".into()], "ca".into()).unwrap();
        assert_eq!(t.labels(), &[Label::from("b"), Label::from("ca")]);
        assert_eq!(t.dims(), &[3, 8]);
        assert_eq!(t.get(&[1, 3 * 2 + 1]), orig.get(&[1, 1, 3]));
    }

    #[test]
    fn test_truncate_axis() {
        let mut t = ranged(&["a", "b"], vec![3, 4]);
        let orig = t.clone();
        t.truncate_axis(&"b".into(), 2).unwrap();
        assert_eq!(t.dims(), &[3, 2]);
        for a in 0..3 {
            for b in 0..2 {
                assert_eq!(t.get(&[a, b]), orig.get(&[a, b]));
            }
        }
    }

    #[test]
    fn test_unfold_and_fold_back() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let t = Tensor::random(
            vec!["a".into(), "b".into(), "c".into()],
            vec![2, 3, 2],
            &mut rng,
        )
        .unwrap();
        let u = t.unfold(&["c".into(), "a".into()]).unwrap();
        assert_eq!(u.matrix.dim(0), 4);
        assert_eq!(u.matrix.dim(1), 3);
        let back = Tensor::from_matrix(&u.matrix, u.row_labels, u.row_dims, u.col_labels, u.col_dims)
            .unwrap();
        assert!(back.approx_eq(&t, 1e-14));
    }

    #[test]
    fn test_norm_scale_conj() {
        let mut t = Tensor::new(
            vec!["a".into()],
            vec![2],
            vec![Complex64::new(3.0, 4.0), c(0.0)],
        )
        .unwrap();
        assert!((t.norm() - 5.0).abs() < 1e-14);
        t.scale(2.0);
        assert!((t.norm() - 10.0).abs() < 1e-14);
        assert_eq!(t.conj().data()[0], Complex64::new(6.0, -8.0));
    }
}
