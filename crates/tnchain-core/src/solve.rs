//! Dense linear solve on labeled tensors.

use tracing::trace;

use crate::backend::lu_solve;
use crate::error::{Result, TensorError};
use crate::global_default::{GlobalDefault, InvalidToleranceError};
use crate::label::Label;
use crate::tensor::Tensor;

static DEFAULT_SOLVE_RCOND: GlobalDefault = GlobalDefault::new(0.0);

/// Pivot ratio at or below which [`solve`] reports a singular system.
///
/// The initial value is `0`, so only exactly vanishing pivots are rejected.
pub fn default_solve_rcond() -> f64 {
    DEFAULT_SOLVE_RCOND.get()
}

/// Set the pivot ratio at or below which [`solve`] reports a singular system.
///
/// # Errors
/// Returns `InvalidToleranceError` if `rcond` is not finite or negative.
pub fn set_default_solve_rcond(rcond: f64) -> std::result::Result<(), InvalidToleranceError> {
    DEFAULT_SOLVE_RCOND.set(rcond)
}

/// Solve `A x = b` with [`default_solve_rcond`].
///
/// See [`solve_with_rcond`].
pub fn solve(a: &Tensor, b: &Tensor, rows: &[Label], cols: &[Label]) -> Result<Tensor> {
    solve_with_rcond(a, b, rows, cols, default_solve_rcond())
}

/// Solve `A x = b` where `A` is read as a matrix with `rows` as row axes and
/// `cols` as column axes.
///
/// `b` must carry exactly the `rows` axes (in any order). The solution
/// carries the `cols` axes in the given order.
///
/// The system is solved by LU factorisation with partial pivoting. The
/// ratio of the smallest to the largest pivot magnitude is compared with
/// `rcond`; badly scaled but regular systems still solve with `rcond = 0`.
///
/// # Errors
/// - `NotSquare` if the row and column spaces differ in size
/// - `SingularSystem` if a pivot vanishes, the solution is not finite, or
///   the pivot ratio is `<= rcond`
pub fn solve_with_rcond(
    a: &Tensor,
    b: &Tensor,
    rows: &[Label],
    cols: &[Label],
    rcond: f64,
) -> Result<Tensor> {
    let matrix = a.matrix(rows, cols)?;
    let m = matrix.dim(0);
    let n = matrix.dim(1);
    if m != n {
        return Err(TensorError::NotSquare { rows: m, cols: n });
    }

    let rhs = b.permute(rows)?;
    for (label, d) in rows.iter().zip(rhs.dims()) {
        let expected = a.dim_of(label)?;
        if *d != expected {
            return Err(TensorError::ShapeMismatch {
                label: label.clone(),
                left: expected,
                right: *d,
            });
        }
    }

    let lu = lu_solve(&matrix, rhs.data())?;
    trace!(dim = n, pivot_ratio = lu.pivot_ratio, "dense solve");
    if lu.pivot_ratio <= rcond {
        return Err(TensorError::SingularSystem {
            rcond: lu.pivot_ratio,
        });
    }

    let dims = cols
        .iter()
        .map(|l| a.dim_of(l))
        .collect::<Result<Vec<_>>>()?;
    Tensor::new(cols.to_vec(), dims, lu.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::contract;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_solve_random_system() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let a = Tensor::random(
            vec!["r1".into(), "r2".into(), "c1".into(), "c2".into()],
            vec![2, 3, 3, 2],
            &mut rng,
        )
        .unwrap();
        let x_true = Tensor::random(vec!["c2".into(), "c1".into()], vec![2, 3], &mut rng).unwrap();
        let b = contract(&a, &x_true, &["c1".into(), "c2".into()], &["c1".into(), "c2".into()])
            .unwrap();

        let x = solve(&a, &b, &["r1".into(), "r2".into()], &["c1".into(), "c2".into()]).unwrap();
        assert_eq!(x.labels(), &[Label::from("c1"), Label::from("c2")]);
        assert!(x.approx_eq(&x_true, 1e-10));
    }

    #[test]
    fn test_singular_system_rejected() {
        let a = Tensor::from_real(
            vec!["r".into(), "c".into()],
            vec![2, 2],
            vec![1.0, 2.0, 2.0, 4.0],
        )
        .unwrap();
        let b = Tensor::from_real(vec!["r".into()], vec![2], vec![1.0, 1.0]).unwrap();
        let err = solve(&a, &b, &["r".into()], &["c".into()]).unwrap_err();
        assert!(matches!(err, TensorError::SingularSystem { .. }));

        let zero = Tensor::zeros(vec!["r".into(), "c".into()], vec![2, 2]).unwrap();
        assert!(matches!(
            solve(&zero, &b, &["r".into()], &["c".into()]),
            Err(TensorError::SingularSystem { .. })
        ));
    }

    #[test]
    fn test_badly_scaled_system_solves() {
        // condition number 1e16, exactly representable solution
        let a = Tensor::from_real(
            vec!["r".into(), "c".into()],
            vec![2, 2],
            vec![1.0, 0.0, 0.0, 1e-16],
        )
        .unwrap();
        let b = Tensor::from_real(vec!["r".into()], vec![2], vec![1.0, 2e-16]).unwrap();
        let x = solve(&a, &b, &["r".into()], &["c".into()]).unwrap();
        let expected = Tensor::from_real(vec!["c".into()], vec![2], vec![1.0, 2.0]).unwrap();
        assert!(x.approx_eq(&expected, 1e-12));

        // an explicit threshold still rejects it
        assert!(matches!(
            solve_with_rcond(&a, &b, &["r".into()], &["c".into()], 1e-13),
            Err(TensorError::SingularSystem { .. })
        ));
    }

    #[test]
    fn test_not_square() {
        let a = Tensor::zeros(vec!["r".into(), "c".into()], vec![2, 3]).unwrap();
        let b = Tensor::zeros(vec!["r".into()], vec![2]).unwrap();
        assert!(matches!(
            solve(&a, &b, &["r".into()], &["c".into()]),
            Err(TensorError::NotSquare { rows: 2, cols: 3 })
        ));
    }
}
