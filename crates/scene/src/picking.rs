use foundation::bounds::{Aabb2, PixelPoint, PixelRect};
use foundation::math::precision::stable_total_cmp_f64;

use crate::pick::PickDepth;

/// Where the pick is aimed, in viewer pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PickTarget {
    Ray(PixelPoint),
    Rect(PixelRect),
}

/// A pickable primitive projected into screen space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickCandidate {
    pub index: usize,
    pub bounds: Aabb2,
    /// Distance from the viewer; smaller is nearer.
    pub depth: f64,
}

/// Deterministic screen-space picking.
///
/// Ordering contract:
/// - Hits are ordered nearest first.
/// - If multiple candidates are hit at the same depth, the lower `index` wins.
///
/// Notes:
/// - Ray picks honor `depth`: `Closest` keeps only the first hit.
/// - Rectangle picks always report every intersecting candidate.
/// - Candidates with non-finite depth are ignored.
pub fn pick_candidates<I>(candidates: I, target: PickTarget, depth: PickDepth) -> Vec<usize>
where
    I: IntoIterator<Item = PickCandidate>,
{
    let mut hits: Vec<(f64, usize)> = candidates
        .into_iter()
        .filter(|c| c.depth.is_finite())
        .filter(|c| match target {
            PickTarget::Ray(p) => c.bounds.contains_point(p.x as f64, p.y as f64),
            PickTarget::Rect(r) => c.bounds.intersects_rect(&r),
        })
        .map(|c| (c.depth, c.index))
        .collect();

    hits.sort_by(|(da, ia), (db, ib)| stable_total_cmp_f64(*da, *db).then_with(|| ia.cmp(ib)));

    if matches!(target, PickTarget::Ray(_)) && depth == PickDepth::Closest {
        hits.truncate(1);
    }

    hits.into_iter().map(|(_, idx)| idx).collect()
}
