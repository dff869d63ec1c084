//! Candidate reduction.
//!
//! Collapses each ray's raw candidate group into the canonical (entry, exit)
//! pair. The buffers keep the numeric [`SENTINEL`] convention so they stay
//! bit-compatible with existing data; [`Intersection`] is the typed view of
//! one pair.

use glam::Vec3A;
use log::debug;
use rayon::prelude::*;
use smallvec::SmallVec;

use crate::group::GroupView;
use crate::ray::SENTINEL;

/// Entries per ray in the canonical buffers.
pub const PAIR_GROUP_SIZE: usize = 2;

/// A single surface crossing: flight time from the ray origin and the point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    /// Time of flight from the ray's position.
    pub time: f32,
    /// Crossing point.
    pub point: Vec3A,
}

/// Canonical intersection of one ray with the solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    /// The ray's forward path crosses the solid, `entry.time <= exit.time`.
    Hit {
        /// Where the ray enters (or its position if it starts inside).
        entry: Crossing,
        /// Where the ray leaves.
        exit: Crossing,
    },
    /// No forward intersection.
    Miss,
}

impl Intersection {
    /// Decode a canonical pair. Anything but two finite, non-negative times is
    /// a miss.
    pub fn from_pair(times: &[f32], points: &[Vec3A]) -> Self {
        let (t0, t1) = (times[0], times[1]);
        if !(t0.is_finite() && t1.is_finite()) || t0 < 0.0 || t1 < 0.0 {
            return Intersection::Miss;
        }
        Intersection::Hit {
            entry: Crossing { time: t0, point: points[0] },
            exit: Crossing { time: t1, point: points[1] },
        }
    }

    /// Encode into a canonical slot group, padding extra slots with the
    /// sentinel.
    pub fn write(&self, times: &mut [f32], points: &mut [Vec3A]) {
        times.fill(SENTINEL);
        points.fill(Vec3A::ZERO);
        if let Intersection::Hit { entry, exit } = self {
            times[0] = entry.time;
            points[0] = entry.point;
            times[1] = exit.time;
            points[1] = exit.point;
        }
    }

    /// True for [`Intersection::Hit`].
    pub fn is_hit(&self) -> bool {
        matches!(self, Intersection::Hit { .. })
    }
}

/// Reduce one ray's candidates to its canonical intersection.
///
/// Non-finite candidates are dropped. The remaining crossings of a convex solid
/// bound the segment of the ray's line inside it; that segment is clipped to
/// the forward direction (t >= 0). A ray starting inside therefore enters at
/// t = 0 at `origin`, and a solid entirely behind the ray is a miss, as is a
/// ray sitting on the surface and leaving it. A single surviving crossing is a
/// grazing contact with entry == exit.
pub fn reduce_candidates(times: &[f32], points: &[Vec3A], origin: Vec3A) -> Intersection {
    let mut valid: SmallVec<[Crossing; 8]> = times
        .iter()
        .zip(points)
        .filter(|(t, p)| t.is_finite() && p.is_finite())
        .map(|(&time, &point)| Crossing { time, point })
        .collect();

    if valid.is_empty() {
        return Intersection::Miss;
    }
    // Stable, so equal-time crossings keep their slot order on re-reduction
    valid.sort_by(|a, b| a.time.total_cmp(&b.time));

    let first = valid[0];
    let exit = valid[valid.len() - 1];
    if exit.time < 0.0 || (exit.time == 0.0 && first.time < 0.0) {
        return Intersection::Miss;
    }

    let entry = if first.time < 0.0 {
        Crossing { time: 0.0, point: origin }
    } else {
        first
    };

    Intersection::Hit { entry, exit }
}

/// Simplify raw candidate groups into canonical groups.
///
/// `times` and `points` are read with their own strides (they may differ when a
/// solid stores more points than times). `origins` holds each ray's current
/// position, used as the entry point of rays that start inside. Each output
/// group of `output_group` entries receives the entry and exit crossings in its
/// first two slots and the sentinel in the rest; a miss is all sentinel.
pub fn simplify_time_point_pairs(
    times: GroupView<'_, f32>,
    points: GroupView<'_, Vec3A>,
    origins: &[Vec3A],
    output_group: usize,
    out_times: &mut [f32],
    out_points: &mut [Vec3A],
) {
    debug_assert!(output_group >= PAIR_GROUP_SIZE);
    debug_assert_eq!(origins.len(), times.rays());
    debug_assert_eq!(out_times.len(), times.rays() * output_group);
    debug_assert_eq!(out_points.len(), out_times.len());

    let hits: usize = out_times
        .par_chunks_exact_mut(output_group)
        .zip(out_points.par_chunks_exact_mut(output_group))
        .enumerate()
        .map(|(i, (ot, op))| {
            let (ts, ps) = (times.group(i), points.group(i));
            let n = ts.len().min(ps.len());
            let found = reduce_candidates(&ts[..n], &ps[..n], origins[i]);
            found.write(ot, op);
            usize::from(found.is_hit())
        })
        .sum();

    debug!("simplify: {} of {} rays intersect", hits, times.rays());
}

/// Swap each canonical pair so that entry time <= exit time.
///
/// Time and point move together. All-sentinel pairs are already ordered.
pub fn force_intersection_order(times: &mut [f32], points: &mut [Vec3A]) {
    debug_assert_eq!(times.len(), points.len());

    times
        .par_chunks_exact_mut(PAIR_GROUP_SIZE)
        .zip(points.par_chunks_exact_mut(PAIR_GROUP_SIZE))
        .for_each(|(ts, ps)| {
            if ts[0] > ts[1] {
                ts.swap(0, 1);
                ps.swap(0, 1);
            }
        });
}
