//! Contraction of chains: inner products, operator application and full
//! contraction of the virtual bonds.

use std::collections::HashSet;

use num_complex::Complex64;
use tnchain_core::{contract, Label, Tensor};
use tracing::trace;

use crate::chain::Chain;
use crate::error::{MpsError, Result};
use crate::mpo::Mpo;
use crate::mps::Mps;

/// Contract every virtual bond of a chain.
///
/// Each right axis is contracted with the next site's left axis, then the
/// leftover boundary axes are traced together (size 1 for open boundaries).
/// The result carries the remaining axes of every site in site order. A
/// label found on more than one site, such as the shared physical label of
/// an [`Mps`], is tagged with its site via [`Label::at_site`].
pub fn contract_virtual_indices<C: AsRef<Chain>>(chain: C) -> Result<Tensor> {
    let chain = chain.as_ref();
    let left = chain.left_label();
    let right = chain.right_label();

    let mut seen = HashSet::new();
    let mut repeated = HashSet::new();
    for t in chain {
        for label in t.labels() {
            if label != left && label != right && !seen.insert(label) {
                repeated.insert(label.clone());
            }
        }
    }

    let mut c: Option<Tensor> = None;
    for (site, t) in chain.iter().enumerate() {
        let mut t = t.clone();
        let tags: Vec<(Label, Label)> = t
            .labels()
            .iter()
            .filter(|l| repeated.contains(*l))
            .map(|l| (l.clone(), l.at_site(site)))
            .collect();
        t.replace_labels(&tags)?;
        c = Some(match c {
            None => t,
            Some(acc) => contract(&acc, &t, &[right.clone()], &[left.clone()])?,
        });
    }
    let mut c = c.ok_or(MpsError::Empty)?;
    c.contract_internal(right, left)?;
    Ok(c)
}

/// Contract a tensor with one axis per site against a chain.
///
/// `labels[i]` of `tensor` is contracted with the `site_label` axis of site
/// `i`, and all virtual bonds are contracted along the way. Finally the
/// chain's boundary axes are traced together. `tensor` must not carry the
/// chain's left or right labels.
pub fn contract_multi_index_tensor_with_chain<C: AsRef<Chain>>(
    tensor: &Tensor,
    labels: &[Label],
    chain: C,
    site_label: &Label,
) -> Result<Tensor> {
    let chain = chain.as_ref();
    if labels.len() != chain.len() {
        return Err(MpsError::LengthMismatch {
            expected: chain.len(),
            got: labels.len(),
        });
    }
    let left = chain.left_label();
    let right = chain.right_label();

    let mut c = contract(tensor, &chain.tensors()[0], &labels[..1], &[site_label.clone()])?;
    for (t, label) in chain.iter().zip(labels).skip(1) {
        c = contract(
            &c,
            t,
            &[right.clone(), label.clone()],
            &[left.clone(), site_label.clone()],
        )?;
    }
    c.contract_internal(right, left)?;
    Ok(c)
}

/// Boundary tensor of `<bra|ket>` before the boundary axes are traced.
///
/// Returns the boundary tensor together with the bra's left/right and the
/// ket's left/right labels it carries.
fn overlap_boundary(
    bra: &Mps,
    ket: &Mps,
    conjugate_bra: bool,
) -> Result<(Tensor, [Label; 4])> {
    if bra.len() != ket.len() {
        return Err(MpsError::LengthMismatch {
            expected: bra.len(),
            got: ket.len(),
        });
    }

    // Prime the bra past every ket label so the two never collide.
    let level = ket.max_prime_level() + 1;
    let mut bra = if conjugate_bra {
        bra.complex_conjugate()
    } else {
        bra.clone()
    };
    bra.replace_left_right_phys_labels(
        Some(ket.left_label().primed(level)),
        Some(ket.right_label().primed(level)),
        Some(ket.phys_label().primed(level)),
    )?;

    let (bl, br, bp) = (bra.left_label(), bra.right_label(), bra.phys_label());
    let (kl, kr, kp) = (ket.left_label(), ket.right_label(), ket.phys_label());

    let mut boundary = contract(&bra.tensors()[0], &ket.tensors()[0], &[bp.clone()], &[kp.clone()])?;
    for (i, (b, k)) in bra.iter().zip(ket.iter()).enumerate().skip(1) {
        boundary = contract(&boundary, b, &[br.clone()], &[bl.clone()])?;
        boundary = contract(&boundary, k, &[kr.clone(), bp.clone()], &[kl.clone(), kp.clone()])?;
        trace!(site = i, size = boundary.len(), "overlap boundary");
    }
    Ok((
        boundary,
        [bl.clone(), br.clone(), kl.clone(), kr.clone()],
    ))
}

/// Inner product `<bra|ket>`.
///
/// With `conjugate_bra` the bra is complex-conjugated first; without it the
/// plain bilinear form is returned. The two states must have the same
/// length and physical dimensions. Neither state is modified.
///
/// # Errors
/// - `LengthMismatch` if the states differ in length
/// - `ShapeMismatch` (inside [`MpsError::Tensor`]) at the first site whose
///   physical or boundary dimensions disagree
pub fn inner_product(bra: &Mps, ket: &Mps, conjugate_bra: bool) -> Result<Complex64> {
    let (mut boundary, [bl, br, kl, kr]) = overlap_boundary(bra, ket, conjugate_bra)?;
    boundary.contract_internal(&br, &bl)?;
    boundary.contract_internal(&kr, &kl)?;
    Ok(boundary.data()[0])
}

/// Full boundary tensor of `<bra|ket>`.
///
/// Like [`inner_product`] but the outer virtual axes are left open: size-1
/// axes are removed and any remaining ones (periodic boundaries) keep the
/// ket's labels, and the ket's labels primed for the bra.
pub fn inner_product_tensor(bra: &Mps, ket: &Mps, conjugate_bra: bool) -> Result<Tensor> {
    let (mut boundary, _) = overlap_boundary(bra, ket, conjugate_bra)?;
    boundary.remove_all_dummy_indices();
    Ok(boundary)
}

/// Squared Frobenius distance `<a|a> + <b|b> - 2 Re<a|b>`.
pub fn frob_distance_squared(a: &Mps, b: &Mps) -> Result<f64> {
    let aa = inner_product(a, a, true)?.re;
    let bb = inner_product(b, b, true)?.re;
    let ab = inner_product(a, b, true)?.re;
    Ok(aa + bb - 2.0 * ab)
}

/// Apply an operator to a state.
///
/// Each site's physical axis is contracted with the operator's input axis
/// and the doubled virtual axes are fused. The result keeps the state's
/// left/right labels and takes the operator's output label as its physical
/// label.
pub fn contract_mps_mpo(mps: &Mps, mpo: &Mpo) -> Result<Mps> {
    if mps.len() != mpo.len() {
        return Err(MpsError::LengthMismatch {
            expected: mps.len(),
            got: mpo.len(),
        });
    }
    let left = mps.left_label();
    let right = mps.right_label();
    let phys = mps.phys_label();

    let level = mps.max_prime_level() + 1;
    let op_left = left.primed(level);
    let op_right = right.primed(level);
    let op_in = phys.primed(level);

    let tensors = mps
        .iter()
        .zip(mpo.iter())
        .map(|(s, o)| {
            let mut o = o.clone();
            o.replace_labels(&[
                (mpo.left_label().clone(), op_left.clone()),
                (mpo.right_label().clone(), op_right.clone()),
                (mpo.phys_in_label().clone(), op_in.clone()),
            ])?;
            let mut t = contract(s, &o, &[phys.clone()], &[op_in.clone()])?;
            t.fuse_indices(&[left.clone(), op_left.clone()], left.clone())?;
            t.fuse_indices(&[right.clone(), op_right.clone()], right.clone())?;
            Ok(t)
        })
        .collect::<Result<Vec<_>>>()?;

    Mps::new(
        tensors,
        left.clone(),
        right.clone(),
        mpo.phys_out_label().clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tnchain_core::TensorError;

    fn random_mps(seed: u64, phys: &[usize], bonds: &[usize]) -> Mps {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Mps::random(phys, bonds, &mut rng).unwrap()
    }

    #[test]
    fn test_inner_product_matches_dense_vector() {
        let mps = random_mps(1, &[2, 3, 2], &[2, 2]);
        let dense = contract_virtual_indices(&mps).unwrap();
        assert_eq!(dense.len(), 12);
        let expected: f64 = dense.data().iter().map(|x| x.norm_sqr()).sum();
        let ip = inner_product(&mps, &mps, true).unwrap();
        assert!((ip.re - expected).abs() < 1e-10 * expected);
        assert!(ip.im.abs() < 1e-10 * expected);
    }

    #[test]
    fn test_inner_product_is_sesquilinear() {
        let a = random_mps(2, &[2, 2, 2], &[2, 2]);
        let b = random_mps(3, &[2, 2, 2], &[3, 2]);
        let ab = inner_product(&a, &b, true).unwrap();
        let ba = inner_product(&b, &a, true).unwrap();
        assert!((ab - ba.conj()).norm() < 1e-10);

        let plain = inner_product(&a, &b, false).unwrap();
        let conj_a = a.complex_conjugate();
        let via_conj = inner_product(&conj_a, &b, true).unwrap();
        assert!((plain - via_conj).norm() < 1e-10);
    }

    #[test]
    fn test_inner_product_leaves_labels_alone() {
        let mut a = random_mps(4, &[2, 2], &[2]);
        a.replace_left_right_phys_labels(Some("l".into()), Some("r".into()), Some("p".into()))
            .unwrap();
        let before = a.clone();
        let b = random_mps(5, &[2, 2], &[3]);
        let mut b_renamed = b.clone();
        b_renamed.standard_labels(2).unwrap();

        let x = inner_product(&a, &b, true).unwrap();
        let y = inner_product(&a, &b_renamed, true).unwrap();
        assert!((x - y).norm() < 1e-12);
        assert_eq!(a, before);
    }

    #[test]
    fn test_phys_dim_mismatch() {
        let a = random_mps(6, &[2, 2], &[2]);
        let b = random_mps(7, &[2, 3], &[2]);
        assert!(matches!(
            inner_product(&a, &b, true),
            Err(MpsError::Tensor(TensorError::ShapeMismatch { .. }))
        ));
        assert!(frob_distance_squared(&a, &b).is_err());
        let c = random_mps(8, &[2, 2, 2], &[2, 2]);
        assert!(matches!(
            inner_product(&a, &c, true),
            Err(MpsError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_frob_distance_to_self_and_scaled() {
        let a = random_mps(9, &[2, 2, 2], &[2, 2]);
        assert!(frob_distance_squared(&a, &a).unwrap().abs() < 1e-10);

        let mut twice = a.clone();
        twice.tensors_mut()[1].scale(2.0);
        let norm_sq = inner_product(&a, &a, true).unwrap().re;
        let d = frob_distance_squared(&a, &twice).unwrap();
        assert!((d - norm_sq).abs() < 1e-10 * norm_sq);
    }

    #[test]
    fn test_identity_mpo() {
        let mps = random_mps(10, &[2, 3, 2], &[3, 2]);
        let id = Mpo::identity(&[2, 3, 2]).unwrap();
        let out = contract_mps_mpo(&mps, &id).unwrap();
        assert_eq!(out.phys_label(), &Label::PHYS_OUT);
        assert_eq!(out.bond_dims(), mps.bond_dims());

        let mut out = out;
        out.replace_left_right_phys_labels(None, None, Some(Label::PHYS))
            .unwrap();
        assert!(frob_distance_squared(&mps, &out).unwrap().abs() < 1e-10);
    }

    #[test]
    fn test_mpo_bond_dims_multiply() {
        let mps = random_mps(11, &[2, 2, 2], &[2, 2]);
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let labels = vec![Label::LEFT, Label::PHYS_OUT, Label::PHYS_IN, Label::RIGHT];
        let tensors = [(1, 3), (3, 3), (3, 1)]
            .iter()
            .map(|&(l, r)| Tensor::random(labels.clone(), vec![l, 2, 2, r], &mut rng))
            .collect::<tnchain_core::Result<Vec<_>>>()
            .unwrap();
        let mpo = Mpo::from_tensors(tensors).unwrap();
        let out = contract_mps_mpo(&mps, &mpo).unwrap();
        assert_eq!(out.bond_dims(), vec![6, 6]);

        let dense_out = contract_virtual_indices(&out).unwrap();
        let dense_mpo = contract_virtual_indices(&mpo).unwrap();
        let dense_mps = contract_virtual_indices(&mps).unwrap();
        let phys_in: Vec<Label> = (0..3).map(|i| Label::PHYS_IN.at_site(i)).collect();
        let phys: Vec<Label> = (0..3).map(|i| Label::PHYS.at_site(i)).collect();
        let applied = contract(&dense_mpo, &dense_mps, &phys_in, &phys).unwrap();
        assert!(dense_out.approx_eq(&applied, 1e-10 * applied.norm()));
    }

    #[test]
    fn test_multi_index_tensor_with_chain() {
        let mps = random_mps(13, &[2, 2, 2], &[2, 2]);
        let mut rng = ChaCha8Rng::seed_from_u64(14);
        let w = Tensor::random(
            vec!["a".into(), "b".into(), "c".into(), "x".into()],
            vec![2, 2, 2, 3],
            &mut rng,
        )
        .unwrap();
        let got = contract_multi_index_tensor_with_chain(
            &w,
            &["a".into(), "b".into(), "c".into()],
            &mps,
            &Label::PHYS,
        )
        .unwrap();
        assert_eq!(got.labels(), &[Label::from("x")]);

        let dense = contract_virtual_indices(&mps).unwrap();
        let sites: Vec<Label> = (0..3).map(|i| Label::PHYS.at_site(i)).collect();
        assert_eq!(dense.labels(), sites.as_slice());
        for x in 0..3 {
            let mut expected = Complex64::new(0.0, 0.0);
            for a in 0..2 {
                for b in 0..2 {
                    for c in 0..2 {
                        expected += w.get(&[a, b, c, x]).unwrap() * dense.data()[a * 4 + b * 2 + c];
                    }
                }
            }
            assert!((got.get(&[x]).unwrap() - expected).norm() < 1e-10);
        }
    }
}
