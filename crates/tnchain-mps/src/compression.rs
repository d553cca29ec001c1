//! Direct compression through the canonical forms.

use tracing::debug;

use crate::canonical::{left_canonical_form, right_canonical_form};
use crate::error::Result;
use crate::mps::Mps;
use crate::options::{CanonicaliseOptions, SvdCompressOptions};

/// Compress `mps` to bond dimension at most `options.chi`.
///
/// The state is first brought to left-canonical form without a bond cap,
/// then right-canonicalised with the cap. Only the second pass discards
/// weight. `mps` itself is not modified.
///
/// # Errors
/// Propagates `UnderflowBond` from either pass.
pub fn svd_compress(mps: &Mps, options: &SvdCompressOptions) -> Result<Mps> {
    let left = CanonicaliseOptions::left()
        .with_threshold(options.threshold)
        .with_normalise(options.normalise);
    let canonical = left_canonical_form(mps, &left)?;

    let right = CanonicaliseOptions::right()
        .with_chi_max(options.chi)
        .with_threshold(options.threshold)
        .with_normalise(options.normalise);
    let compressed = right_canonical_form(&canonical, &right)?;

    debug!(
        chi = options.chi,
        bonds = ?compressed.bond_dims(),
        "svd compression"
    );
    Ok(compressed)
}
