//! Left and right canonical forms by SVD sweeps
//!
//! A left sweep over `[start, end)` decomposes each site with rows
//! `{phys, left}` against `{right}`, keeps `U` on the site and pushes `S·V`
//! into the right neighbour. Singular values are divided by the largest one
//! before truncation; the product of those largest values is tracked in
//! [`SweepNorm::accumulated`]. A right sweep is a left sweep over the
//! reversed chain.

use std::ops::Range;

use tnchain_core::{contract, svd};
use tracing::{debug, trace};

use crate::error::{MpsError, Result};
use crate::mps::Mps;
use crate::options::CanonicaliseOptions;

/// Rescaling collected during a canonicalisation sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepNorm {
    /// Product of the largest singular value at every swept cut
    pub accumulated: f64,
    /// Norm of the chain's final site before the terminal rescale, when the
    /// sweep reached it
    pub terminal: Option<f64>,
}

impl SweepNorm {
    /// `accumulated * terminal`: the norm of the state before a full sweep.
    pub fn norm(&self) -> f64 {
        self.accumulated * self.terminal.unwrap_or(1.0)
    }
}

impl Mps {
    /// Left-canonise the whole state in place.
    pub fn left_canonise(&mut self, options: &CanonicaliseOptions) -> Result<SweepNorm> {
        self.left_canonise_range(0..self.len(), options)
    }

    /// Left-canonise sites `range` in place.
    ///
    /// Afterwards every swept site except the chain's last contracts with
    /// its conjugate over `{phys, left}` to the identity. If the sweep
    /// reaches the last site, that site is divided by its norm when
    /// `options.normalise` is set, and otherwise multiplied by the
    /// accumulated rescaling. If the sweep stops earlier and
    /// `options.partial_normalise` is false, the accumulated rescaling is
    /// absorbed into the site after the range.
    ///
    /// # Errors
    /// - `InvalidRange` if `range` is not within the chain
    /// - `UnderflowBond` if a cut is identically zero or truncation removes
    ///   every singular value; sites before that cut are already updated
    pub fn left_canonise_range(
        &mut self,
        range: Range<usize>,
        options: &CanonicaliseOptions,
    ) -> Result<SweepNorm> {
        let n = self.len();
        if range.start > range.end || range.end > n {
            return Err(MpsError::InvalidRange {
                start: range.start,
                end: range.end,
                len: n,
            });
        }

        let left = self.left_label().clone();
        let right = self.right_label().clone();
        let phys = self.phys_label().clone();
        let end = range.end;

        let mut norm = 1.0;
        for i in range {
            let tensors = self.tensors_mut();

            if i == n - 1 {
                let terminal = tensors[i].norm();
                if options.normalise {
                    if terminal == 0.0 {
                        return Err(MpsError::UnderflowBond { site: i });
                    }
                    tensors[i].scale(1.0 / terminal);
                } else {
                    tensors[i].scale(norm);
                }
                trace!(site = i, terminal, "terminal site");
                return Ok(SweepNorm {
                    accumulated: norm,
                    terminal: Some(terminal),
                });
            }

            let mut decomp = svd(&tensors[i], &[phys.clone(), left.clone()])?;
            let s_max = decomp.singular_values.first().copied().unwrap_or(0.0);
            if s_max <= 0.0 {
                return Err(MpsError::UnderflowBond { site: i });
            }
            for s in decomp.singular_values.iter_mut() {
                *s /= s_max;
            }
            norm *= s_max;

            let keep = options.truncation.retained_rank(&decomp.singular_values);
            if keep == 0 {
                return Err(MpsError::UnderflowBond { site: i });
            }
            decomp.truncate(keep)?;
            trace!(site = i, bond = keep, s_max, "left sweep cut");
            let s = decomp.s_tensor()?;

            let mut u = decomp.u;
            u.replace_label(&decomp.u_bond, right.clone())?;

            let v_next = contract(&decomp.v, &tensors[i + 1], &[right.clone()], &[left.clone()])?;
            let mut next = contract(&s, &v_next, &[decomp.v_bond.clone()], &[decomp.v_bond])?;
            next.replace_label(&decomp.u_bond, left.clone())?;
            if i + 1 == end && !options.partial_normalise {
                next.scale(norm);
            }

            tensors[i] = u;
            tensors[i + 1] = next;
        }

        debug!(len = n, end, accumulated = norm, "left sweep finished");
        Ok(SweepNorm {
            accumulated: norm,
            terminal: None,
        })
    }

    /// Right-canonise the whole state in place.
    pub fn right_canonise(&mut self, options: &CanonicaliseOptions) -> Result<SweepNorm> {
        self.right_canonise_range(0..self.len(), options)
    }

    /// Right-canonise sites `range` in place.
    ///
    /// Runs [`left_canonise_range`](Self::left_canonise_range) on the
    /// mirrored interval of the reversed state. Afterwards every swept site
    /// except the first contracts with its conjugate over `{phys, right}` to
    /// the identity. [`SweepNorm::terminal`] refers to site 0.
    pub fn right_canonise_range(
        &mut self,
        range: Range<usize>,
        options: &CanonicaliseOptions,
    ) -> Result<SweepNorm> {
        let n = self.len();
        if range.start > range.end || range.end > n {
            return Err(MpsError::InvalidRange {
                start: range.start,
                end: range.end,
                len: n,
            });
        }
        self.reverse();
        let result = self.left_canonise_range(n - range.end..n - range.start, options);
        self.reverse();
        result
    }
}

/// Left-canonical copy of `mps`.
pub fn left_canonical_form(mps: &Mps, options: &CanonicaliseOptions) -> Result<Mps> {
    let mut out = mps.clone();
    out.left_canonise(options)?;
    Ok(out)
}

/// Right-canonical copy of `mps`.
pub fn right_canonical_form(mps: &Mps, options: &CanonicaliseOptions) -> Result<Mps> {
    let mut out = mps.clone();
    out.right_canonise(options)?;
    Ok(out)
}

/// Reversed copy of `mps`, with left and right roles swapped.
pub fn reverse_mps(mps: &Mps) -> Mps {
    mps.clone().reversed()
}
