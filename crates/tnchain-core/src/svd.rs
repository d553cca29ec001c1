//! SVD of a labeled tensor split by an index partition.

use num_complex::Complex64;

use crate::backend::svd_backend;
use crate::error::Result;
use crate::label::Label;
use crate::tensor::Tensor;

/// Thin SVD `A = U · S · Vᴴ` of a tensor unfolded into rows and columns.
///
/// `u` carries the row axes followed by `u_bond`; `v` carries `v_bond`
/// followed by the column axes and is already conjugate-transposed, so that
/// contracting `u`, [`s_tensor`](Self::s_tensor) and `v` over the two bonds
/// rebuilds the input. Both bonds are freshly minted labels.
#[derive(Debug, Clone)]
pub struct SvdDecomp {
    /// Left factor, labels `[rows..., u_bond]`
    pub u: Tensor,
    /// Singular values, descending
    pub singular_values: Vec<f64>,
    /// Right factor (Vᴴ), labels `[v_bond, cols...]`
    pub v: Tensor,
    /// Bond between `u` and the singular values
    pub u_bond: Label,
    /// Bond between the singular values and `v`
    pub v_bond: Label,
}

impl SvdDecomp {
    /// Number of singular values.
    pub fn rank(&self) -> usize {
        self.singular_values.len()
    }

    /// Singular values as a diagonal tensor labeled `[u_bond, v_bond]`.
    pub fn s_tensor(&self) -> Result<Tensor> {
        Tensor::diag(
            self.u_bond.clone(),
            self.v_bond.clone(),
            &self.singular_values,
        )
    }

    /// Keep only the `keep` largest singular values and their vectors.
    pub fn truncate(&mut self, keep: usize) -> Result<()> {
        if keep >= self.rank() {
            return Ok(());
        }
        self.singular_values.truncate(keep);
        self.u.truncate_axis(&self.u_bond, keep)?;
        self.v.truncate_axis(&self.v_bond, keep)?;
        Ok(())
    }
}

/// SVD of `t` with `row_labels` as rows and the remaining axes, in storage
/// order, as columns.
pub fn svd(t: &Tensor, row_labels: &[Label]) -> Result<SvdDecomp> {
    let unfolding = t.unfold(row_labels)?;
    let decomposed = svd_backend(&unfolding.matrix)?;
    let k = decomposed.s.len();

    let u_bond = Label::fresh_bond();
    let v_bond = Label::fresh_bond();

    let u = Tensor::from_matrix(
        &decomposed.u,
        unfolding.row_labels,
        unfolding.row_dims,
        vec![u_bond.clone()],
        vec![k],
    )?;

    // Vᴴ, row-major over (bond, columns)
    let n = decomposed.v.dim(0);
    let vh: Vec<Complex64> = (0..k)
        .flat_map(|j| (0..n).map(move |i| (i, j)))
        .map(|(i, j)| decomposed.v[[i, j]].conj())
        .collect();
    let mut v_labels = vec![v_bond.clone()];
    v_labels.extend(unfolding.col_labels);
    let mut v_dims = vec![k];
    v_dims.extend(unfolding.col_dims);
    let v = Tensor::new(v_labels, v_dims, vh)?;

    Ok(SvdDecomp {
        u,
        singular_values: decomposed.s,
        v,
        u_bond,
        v_bond,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::contract;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rebuild(d: &SvdDecomp) -> Tensor {
        let us = contract(&d.u, &d.s_tensor().unwrap(), &[d.u_bond.clone()], &[d.u_bond.clone()])
            .unwrap();
        contract(&us, &d.v, &[d.v_bond.clone()], &[d.v_bond.clone()]).unwrap()
    }

    #[test]
    fn test_svd_reconstructs_tensor() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let t = Tensor::random(
            vec!["a".into(), "b".into(), "c".into()],
            vec![2, 3, 4],
            &mut rng,
        )
        .unwrap();
        let d = svd(&t, &["c".into(), "a".into()]).unwrap();
        assert_eq!(d.rank(), 3);
        assert_eq!(d.u.labels()[..2], [Label::from("c"), Label::from("a")]);
        assert_eq!(d.v.labels()[1], Label::from("b"));
        assert!(rebuild(&d).approx_eq(&t, 1e-12));
    }

    #[test]
    fn test_u_is_isometry() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let t = Tensor::random(vec!["a".into(), "b".into()], vec![5, 3], &mut rng).unwrap();
        let d = svd(&t, &["a".into()]).unwrap();
        let mut udag = d.u.conj();
        udag.replace_label(&d.u_bond, "k".into()).unwrap();
        let gram = contract(&udag, &d.u, &["a".into()], &["a".into()]).unwrap();
        let id = Tensor::identity("k".into(), d.u_bond.clone(), 3).unwrap();
        assert!(gram.approx_eq(&id, 1e-12));
    }

    #[test]
    fn test_truncate_keeps_leading_values() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let t = Tensor::random(vec!["a".into(), "b".into()], vec![4, 4], &mut rng).unwrap();
        let mut d = svd(&t, &["a".into()]).unwrap();
        let leading = d.singular_values[..2].to_vec();
        d.truncate(2).unwrap();
        assert_eq!(d.singular_values, leading);
        assert_eq!(d.u.dim_of(&d.u_bond).unwrap(), 2);
        assert_eq!(d.v.dim_of(&d.v_bond).unwrap(), 2);

        let discarded = t.norm().powi(2) - leading.iter().map(|s| s * s).sum::<f64>();
        let err = rebuild(&d);
        let mut diff = t.clone();
        let aligned = err.permute(t.labels()).unwrap();
        for (x, y) in diff.data_mut().iter_mut().zip(aligned.data()) {
            *x -= y;
        }
        assert!((diff.norm().powi(2) - discarded).abs() < 1e-10);
    }
}
