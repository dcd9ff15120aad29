//! Vector-angle classification of a committed reading against a reference
//! table.
//!
//! Both the sample and every reference row are treated as 3-vectors in
//! RGB-frequency space; the winning row is the one at the smallest angle
//! from the sample.  Angle, not Euclidean distance: absolute illumination
//! scales the whole sample vector without moving it angularly, so only the
//! colour ratio decides the match.

use crate::reference::ReferenceTable;

use super::snapshot::ChannelReading;

/// A winning reference row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'t> {
    /// pH label of the closest row.
    pub label: &'t str,
    /// Angle to the sample in radians.
    pub angle: f64,
}

/// Find the reference row at the smallest angle from `sample`.
///
/// Returns `None` when the sample is unusable (all channels 0 Hz) or when
/// no table row is matchable.  Zero-magnitude rows are skipped — the table
/// loader rejects them, but a row built in memory must not reach the
/// division below either.
///
/// Ties resolve to the earliest row: a later row must be at a strictly
/// smaller angle to displace the current best.
pub fn classify<'t>(sample: &ChannelReading, table: &'t ReferenceTable) -> Option<Match<'t>> {
    if sample.is_empty() {
        return None;
    }

    let s = sample.hertz;
    let s_len = (s[0] * s[0] + s[1] * s[1] + s[2] * s[2]).sqrt();

    let mut best: Option<Match<'t>> = None;
    for entry in table.entries() {
        let r = entry.rgb;
        let r_len = (r[0] * r[0] + r[1] * r[1] + r[2] * r[2]).sqrt();
        if r_len == 0.0 {
            continue;
        }

        let dot = r[0] * s[0] + r[1] * s[1] + r[2] * s[2];
        // Rounding can push a perfect match's cosine past 1.0; clamp before
        // acos or the angle comes back NaN.
        let cos_theta = (dot / (r_len * s_len)).clamp(-1.0, 1.0);
        let angle = cos_theta.acos();

        if best.as_ref().is_none_or(|b| angle < b.angle) {
            best = Some(Match {
                label: &entry.label,
                angle,
            });
        }
    }

    best
}
