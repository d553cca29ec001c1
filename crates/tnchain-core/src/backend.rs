//! Dense linear algebra backend.
//!
//! Matrices cross this boundary as row-major [`mdarray::DTensor`]s; the
//! decompositions themselves run on `faer`. All faer types are kept private
//! to this module so upstream API changes stay contained here.

use anyhow::{anyhow, Result};
use faer::linalg::solvers::Solve;
use faer::{Mat, MatRef};
use mdarray::DTensor;
use num_complex::Complex64;

/// Dense complex matrix used at the backend boundary.
pub type Matrix = DTensor<Complex64, 2>;

/// Zero-filled `rows × cols` matrix.
pub fn matrix_zeros(rows: usize, cols: usize) -> Matrix {
    DTensor::<Complex64, 2>::from_elem([rows, cols], Complex64::new(0.0, 0.0))
}

/// Build a matrix from a row-major buffer.
pub fn matrix_from_row_major(data: &[Complex64], rows: usize, cols: usize) -> Matrix {
    debug_assert_eq!(data.len(), rows * cols);
    DTensor::<Complex64, 2>::from_fn([rows, cols], |idx| data[idx[0] * cols + idx[1]])
}

/// Flatten a matrix into a row-major buffer.
pub fn matrix_to_row_major(m: &Matrix) -> Vec<Complex64> {
    let rows = m.dim(0);
    let cols = m.dim(1);
    let mut out = Vec::with_capacity(rows * cols);
    for i in 0..rows {
        for j in 0..cols {
            out.push(m[[i, j]]);
        }
    }
    out
}

fn to_faer(m: &Matrix) -> Mat<Complex64> {
    Mat::from_fn(m.dim(0), m.dim(1), |i, j| m[[i, j]])
}

fn from_faer(m: MatRef<'_, Complex64>) -> Matrix {
    DTensor::<Complex64, 2>::from_fn([m.nrows(), m.ncols()], |idx| m[(idx[0], idx[1])])
}

/// Result of a thin SVD `A = U · diag(s) · Vᴴ`.
///
/// For an `m × n` matrix with `k = min(m, n)`:
/// - `u` is `m × k` with orthonormal columns
/// - `s` holds `k` non-negative singular values in descending order
/// - `v` is `n × k` with orthonormal columns (V, not Vᴴ)
#[derive(Debug, Clone)]
pub struct SvdResult {
    /// Left singular vectors
    pub u: Matrix,
    /// Singular values, descending
    pub s: Vec<f64>,
    /// Right singular vectors
    pub v: Matrix,
}

/// Thin SVD of a dense matrix.
pub fn svd_backend(a: &Matrix) -> Result<SvdResult> {
    let m = a.dim(0);
    let n = a.dim(1);
    let k = m.min(n);
    if k == 0 {
        return Ok(SvdResult {
            u: matrix_zeros(m, 0),
            s: Vec::new(),
            v: matrix_zeros(n, 0),
        });
    }

    let decomp = to_faer(a)
        .thin_svd()
        .map_err(|e| anyhow!("SVD computation failed: {e:?}"))?;

    // faer stores the singular values of a complex matrix as complex numbers
    // with zero imaginary part.
    let s_diag = decomp.S().column_vector();
    let raw_s: Vec<f64> = (0..k).map(|i| s_diag[i].re).collect();
    let u_full = from_faer(decomp.U());
    let v_full = from_faer(decomp.V());

    // Enforce descending order regardless of backend convention.
    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&x, &y| raw_s[y].total_cmp(&raw_s[x]));

    let s = order.iter().map(|&i| raw_s[i].max(0.0)).collect();
    let u = DTensor::<Complex64, 2>::from_fn([m, k], |idx| u_full[[idx[0], order[idx[1]]]]);
    let v = DTensor::<Complex64, 2>::from_fn([n, k], |idx| v_full[[idx[0], order[idx[1]]]]);

    Ok(SvdResult { u, s, v })
}

/// Solution of a square system by LU factorisation with partial pivoting.
#[derive(Debug, Clone)]
pub struct LuSolution {
    /// Solution vector; empty when a pivot vanished
    pub x: Vec<Complex64>,
    /// `min |u_ii| / max |u_ii|` over the pivots of `U`, `0` if singular
    pub pivot_ratio: f64,
}

/// Solve `a · x = b` for a square `a`.
pub fn lu_solve(a: &Matrix, b: &[Complex64]) -> Result<LuSolution> {
    let n = a.dim(0);
    if a.dim(1) != n || b.len() != n {
        return Err(anyhow!(
            "LU solve shape mismatch: {}x{} matrix, right-hand side of length {}",
            a.dim(0),
            a.dim(1),
            b.len()
        ));
    }
    if n == 0 {
        return Ok(LuSolution {
            x: Vec::new(),
            pivot_ratio: 1.0,
        });
    }

    let lu = to_faer(a).partial_piv_lu();
    let u = lu.U();
    let pivots: Vec<f64> = (0..n).map(|i| u[(i, i)].norm()).collect();
    let p_max = pivots.iter().copied().fold(0.0, f64::max);
    let p_min = pivots.iter().copied().fold(f64::INFINITY, f64::min);
    if p_max <= 0.0 || p_min <= 0.0 || !p_max.is_finite() {
        return Ok(LuSolution {
            x: Vec::new(),
            pivot_ratio: 0.0,
        });
    }

    let rhs = Mat::from_fn(n, 1, |i, _| b[i]);
    let sol = lu.solve(rhs.as_ref());
    let x: Vec<Complex64> = (0..n).map(|i| sol[(i, 0)]).collect();
    let pivot_ratio = if x.iter().all(|v| v.re.is_finite() && v.im.is_finite()) {
        p_min / p_max
    } else {
        0.0
    };
    Ok(LuSolution { x, pivot_ratio })
}

/// Dense matrix product `a · b`.
pub fn matmul(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    if a.dim(1) != b.dim(0) {
        return Err(anyhow!(
            "matmul inner dimension mismatch: {}x{} times {}x{}",
            a.dim(0),
            a.dim(1),
            b.dim(0),
            b.dim(1)
        ));
    }
    if a.dim(1) == 0 {
        return Ok(matrix_zeros(a.dim(0), b.dim(1)));
    }
    let c = &to_faer(a) * &to_faer(b);
    Ok(from_faer(c.as_ref()))
}
