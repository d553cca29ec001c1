//! Label-based tensor contraction.

use crate::backend::{matmul, matrix_from_row_major, matrix_to_row_major};
use crate::error::{Result, TensorError};
use crate::label::Label;
use crate::tensor::{permute_data, Tensor};

/// Contract `labels_a` of `a` with `labels_b` of `b`, pairwise.
///
/// The result carries the uncontracted axes of `a` (in their order)
/// followed by the uncontracted axes of `b`. Contracting with empty label
/// lists is the tensor product.
///
/// # Errors
/// - `LabelNotFound` if a label is missing on its operand
/// - `ShapeMismatch` if a contracted pair has different dimensions
/// - `DuplicateLabel` if the same label is listed twice or the result would
///   carry a label twice
pub fn contract(a: &Tensor, b: &Tensor, labels_a: &[Label], labels_b: &[Label]) -> Result<Tensor> {
    if labels_a.len() != labels_b.len() {
        return Err(TensorError::LabelCountMismatch {
            labels: labels_a.len(),
            dims: labels_b.len(),
        });
    }

    let pos_a = positions(a, labels_a)?;
    let pos_b = positions(b, labels_b)?;

    for (k, (&pa, &pb)) in pos_a.iter().zip(&pos_b).enumerate() {
        if a.dims()[pa] != b.dims()[pb] {
            return Err(TensorError::ShapeMismatch {
                label: labels_a[k].clone(),
                left: a.dims()[pa],
                right: b.dims()[pb],
            });
        }
    }

    let free_a: Vec<usize> = (0..a.rank()).filter(|p| !pos_a.contains(p)).collect();
    let free_b: Vec<usize> = (0..b.rank()).filter(|p| !pos_b.contains(p)).collect();

    let labels: Vec<Label> = free_a
        .iter()
        .map(|&p| a.labels()[p].clone())
        .chain(free_b.iter().map(|&p| b.labels()[p].clone()))
        .collect();
    let dims: Vec<usize> = free_a
        .iter()
        .map(|&p| a.dims()[p])
        .chain(free_b.iter().map(|&p| b.dims()[p]))
        .collect();

    let m: usize = free_a.iter().map(|&p| a.dims()[p]).product();
    let k: usize = pos_a.iter().map(|&p| a.dims()[p]).product();
    let n: usize = free_b.iter().map(|&p| b.dims()[p]).product();

    let perm_a: Vec<usize> = free_a.iter().chain(&pos_a).copied().collect();
    let perm_b: Vec<usize> = pos_b.iter().chain(&free_b).copied().collect();
    let data_a = permute_data(a.data(), a.dims(), &perm_a);
    let data_b = permute_data(b.data(), b.dims(), &perm_b);

    let product = matmul(
        &matrix_from_row_major(&data_a, m, k),
        &matrix_from_row_major(&data_b, k, n),
    )?;

    Tensor::new(labels, dims, matrix_to_row_major(&product))
}

/// Tensor (outer) product of two tensors with disjoint labels.
pub fn tensor_product(a: &Tensor, b: &Tensor) -> Result<Tensor> {
    contract(a, b, &[], &[])
}

fn positions(t: &Tensor, labels: &[Label]) -> Result<Vec<usize>> {
    let mut out = Vec::with_capacity(labels.len());
    for label in labels {
        let p = t.position(label)?;
        if out.contains(&p) {
            return Err(TensorError::DuplicateLabel {
                label: label.clone(),
            });
        }
        out.push(p);
    }
    Ok(out)
}
