//! Canonical-form inspection.

use std::fmt;

use tnchain_core::{contract, Label, Tensor};
use tracing::debug;

use crate::error::Result;
use crate::mps::Mps;

/// Canonical form of a state as seen by [`check_canonical_form`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalForm {
    /// Every site but the last is left-canonical.
    Left {
        /// Last site has unit norm
        normalised: bool,
    },
    /// Every site but the first is right-canonical.
    Right {
        /// First site has unit norm
        normalised: bool,
    },
    /// Left-canonical before `center`, right-canonical after it.
    Mixed {
        /// Orthogonality centre
        center: usize,
    },
    /// Neither of the above.
    Partial {
        /// First site that is not left-canonical, `None` if that is site 0
        left_up_to: Option<usize>,
        /// First site from the right that is not right-canonical, `None` if
        /// that is the last site
        right_up_to: Option<usize>,
    },
}

impl fmt::Display for CanonicalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let norm = |n: bool| if n { "normalised" } else { "unnormalised" };
        match self {
            CanonicalForm::Left { normalised } => {
                write!(f, "MPS in left canonical form ({})", norm(*normalised))
            }
            CanonicalForm::Right { normalised } => {
                write!(f, "MPS in right canonical form ({})", norm(*normalised))
            }
            CanonicalForm::Mixed { center } => write!(
                f,
                "MPS in mixed canonical form with orthogonality centre at site {center}"
            ),
            CanonicalForm::Partial {
                left_up_to,
                right_up_to,
            } => {
                match left_up_to {
                    Some(l) => write!(f, "Tensors left canonised up to site {l}")?,
                    None => f.write_str("No tensors left canonised")?,
                }
                f.write_str("; ")?;
                match right_up_to {
                    Some(r) => write!(f, "tensors right canonised up to site {r}"),
                    None => f.write_str("no tensors right canonised"),
                }
            }
        }
    }
}

/// Result of [`check_canonical_form`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalFormReport {
    /// First site from the left that is not left-canonical (`len - 1` if
    /// none before the last site)
    pub first_not_left: usize,
    /// First site from the right that is not right-canonical (`0` if none
    /// after the first site)
    pub first_not_right: usize,
    /// Classification of the pair
    pub form: CanonicalForm,
}

impl CanonicalFormReport {
    /// The `(first_not_left, first_not_right)` pair.
    pub fn sites(&self) -> (usize, usize) {
        (self.first_not_left, self.first_not_right)
    }
}

/// Frobenius distance between `t`, read as a matrix over `(a, b)`, and the
/// identity.
fn identity_deviation(t: &Tensor, a: &Label, b: &Label) -> Result<f64> {
    let m = t.permute(&[a.clone(), b.clone()])?;
    let cols = m.dims()[1];
    let sq: f64 = m
        .data()
        .iter()
        .enumerate()
        .map(|(k, x)| {
            let target = if k / cols == k % cols { 1.0 } else { 0.0 };
            (*x - target).norm_sqr()
        })
        .sum();
    Ok(sq.sqrt())
}

/// Locate where left- and right-canonical form break down.
///
/// Scanning from the left, `first_not_left` is the first site whose
/// contraction with its conjugate over `{phys, left}` differs from the
/// identity by more than `threshold` in Frobenius norm. `first_not_right`
/// is found the same way from the right over `{phys, right}`. Read-only.
pub fn check_canonical_form(mps: &Mps, threshold: f64) -> Result<CanonicalFormReport> {
    let n = mps.len();
    let left = mps.left_label();
    let right = mps.right_label();
    let phys = mps.phys_label();

    let level = mps.max_prime_level() + 1;
    let mut cc = mps.complex_conjugate();
    cc.replace_left_right_phys_labels(
        Some(left.primed(level)),
        Some(right.primed(level)),
        Some(phys.primed(level)),
    )?;

    let mut first_not_left = n - 1;
    for i in 0..n - 1 {
        let gram = contract(
            &mps.tensors()[i],
            &cc.tensors()[i],
            &[phys.clone(), left.clone()],
            &[cc.phys_label().clone(), cc.left_label().clone()],
        )?;
        if identity_deviation(&gram, right, cc.right_label())? > threshold {
            first_not_left = i;
            break;
        }
    }

    let mut first_not_right = 0;
    for i in (1..n).rev() {
        let gram = contract(
            &mps.tensors()[i],
            &cc.tensors()[i],
            &[phys.clone(), right.clone()],
            &[cc.phys_label().clone(), cc.right_label().clone()],
        )?;
        if identity_deviation(&gram, left, cc.left_label())? > threshold {
            first_not_right = i;
            break;
        }
    }

    let unit = |t: &Tensor| (t.norm() - 1.0).abs() <= threshold;
    let form = if first_not_left == first_not_right {
        if first_not_left == n - 1 {
            CanonicalForm::Left {
                normalised: unit(&mps.tensors()[n - 1]),
            }
        } else if first_not_left == 0 {
            CanonicalForm::Right {
                normalised: unit(&mps.tensors()[0]),
            }
        } else {
            CanonicalForm::Mixed {
                center: first_not_right,
            }
        }
    } else {
        CanonicalForm::Partial {
            left_up_to: (first_not_left != 0).then_some(first_not_left),
            right_up_to: (first_not_right != n - 1).then_some(first_not_right),
        }
    };

    debug!(first_not_left, first_not_right, %form, "canonical form check");
    Ok(CanonicalFormReport {
        first_not_left,
        first_not_right,
        form,
    })
}

impl Mps {
    /// See [`check_canonical_form`].
    pub fn check_canonical_form(&self, threshold: f64) -> Result<CanonicalFormReport> {
        check_canonical_form(self, threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CanonicaliseOptions;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn random_mps(seed: u64) -> Mps {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Mps::random(&[2, 2, 2, 2], &[2, 3, 2], &mut rng).unwrap()
    }

    #[test]
    fn test_random_state_is_not_canonical() {
        let report = random_mps(1).check_canonical_form(1e-12).unwrap();
        assert_eq!(report.sites(), (0, 3));
        assert_eq!(
            report.form,
            CanonicalForm::Partial {
                left_up_to: None,
                right_up_to: None
            }
        );
    }

    #[test]
    fn test_left_form_detected() {
        let mut mps = random_mps(2);
        mps.left_canonise(&CanonicaliseOptions::left().with_normalise(true))
            .unwrap();
        let report = check_canonical_form(&mps, 1e-12).unwrap();
        assert_eq!(report.form, CanonicalForm::Left { normalised: true });
    }

    #[test]
    fn test_right_form_detected_unnormalised() {
        let mut mps = random_mps(3);
        mps.tensors_mut()[3].scale(5.0);
        mps.right_canonise(&CanonicaliseOptions::right()).unwrap();
        let report = check_canonical_form(&mps, 1e-10).unwrap();
        assert_eq!(report.sites(), (0, 0));
        assert!(matches!(report.form, CanonicalForm::Right { .. }));
    }

    #[test]
    fn test_mixed_form_detected() {
        let mut mps = random_mps(4);
        let opts = CanonicaliseOptions::left();
        mps.left_canonise_range(0..2, &opts).unwrap();
        mps.right_canonise_range(3..4, &CanonicaliseOptions::right())
            .unwrap();
        let report = check_canonical_form(&mps, 1e-10).unwrap();
        assert_eq!(report.form, CanonicalForm::Mixed { center: 2 });
        assert!(report.form.to_string().contains("site 2"));
    }

    #[test]
    fn test_display_partial() {
        let form = CanonicalForm::Partial {
            left_up_to: Some(2),
            right_up_to: None,
        };
        assert_eq!(
            form.to_string(),
            "Tensors left canonised up to site 2; no tensors right canonised"
        );
    }
}
