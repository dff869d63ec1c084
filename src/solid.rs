//! Ray-solid intersection.
//!
//! Defines the [`Solid`] trait for geometric shapes and the [`intersect`] kernel
//! that fills each ray's candidate group. The only shape provided is the
//! axis-aligned [`Block`]; other solids plug in by implementing the trait.

use glam::Vec3A;
use log::debug;
use rayon::prelude::*;

use crate::interval::Interval;
use crate::quadratic::solve_quadratic;

/// Marker for candidate slots that received no intersection.
///
/// Non-finite, so the reducer drops it together with any degenerate result.
pub const UNUSED_SLOT: f32 = f32::NAN;

/// Relative slack applied to face bounds so that edge and corner crossings
/// survive rounding.
const FACE_TOLERANCE: f32 = 1e-5;

/// Trait for solids that rays can be intersected with.
///
/// Must be thread-safe (Sync + Send): one instance is shared read-only by every
/// lane of the intersection kernel.
pub trait Solid: Sync + Send {
    /// Number of (time, point) slots each ray needs in the candidate buffers.
    fn group_size(&self) -> usize;

    /// Write the candidate crossings of the line `origin + t * velocity` with
    /// the solid's surface into `times`/`points`, compacted from slot 0.
    ///
    /// Both slices have length [`Solid::group_size`]. Crossings behind the
    /// origin (t < 0) are reported too; the reducer clips them. Returns the
    /// number of slots written.
    fn candidates(&self, origin: Vec3A, velocity: Vec3A, times: &mut [f32], points: &mut [Vec3A]) -> usize;
}

/// Axis-aligned rectangular volume centered at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    /// Full widths along X, Y and Z.
    pub extents: Vec3A,
}

impl Block {
    /// Create a block with the given full widths.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            extents: Vec3A::new(x, y, z),
        }
    }

    /// Half widths, i.e. the face coordinates along each axis.
    pub fn half_extents(&self) -> Vec3A {
        self.extents * 0.5
    }

    /// True if `p` lies inside or on the surface of the block.
    pub fn contains(&self, p: Vec3A) -> bool {
        p.abs().cmple(self.half_extents()).all()
    }
}

impl Solid for Block {
    fn group_size(&self) -> usize {
        6
    }

    fn candidates(&self, origin: Vec3A, velocity: Vec3A, times: &mut [f32], points: &mut [Vec3A]) -> usize {
        let half = self.half_extents();
        let mut written = 0;

        // Two faces per axis, each a plane `origin[axis] + t * velocity[axis] = face`
        for axis in 0..3 {
            let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
            let bounds_u = Interval::centered(half[u]).expand(half[u] * FACE_TOLERANCE);
            let bounds_v = Interval::centered(half[v]).expand(half[v] * FACE_TOLERANCE);

            for face in [-half[axis], half[axis]] {
                let Some((t, _)) = solve_quadratic(0.0, velocity[axis], origin[axis] - face) else {
                    continue;
                };

                let mut p = origin + t * velocity;
                if !(bounds_u.contains(p[u]) && bounds_v.contains(p[v])) {
                    continue;
                }
                // Pin the crossing onto the plane it was solved against
                p[axis] = face;

                times[written] = t;
                points[written] = p;
                written += 1;
            }
        }

        written
    }
}

/// Intersection Solver kernel.
///
/// For every ray, clears its group of `solid.group_size()` slots to
/// [`UNUSED_SLOT`] and writes the solid's candidates from the front. Output
/// buffers must hold `N * group_size` entries.
pub fn intersect<S: Solid + ?Sized>(
    solid: &S,
    positions: &[Vec3A],
    velocities: &[Vec3A],
    times_out: &mut [f32],
    points_out: &mut [Vec3A],
) {
    let group = solid.group_size();
    debug_assert_eq!(positions.len(), velocities.len());
    debug_assert_eq!(times_out.len(), positions.len() * group);
    debug_assert_eq!(points_out.len(), positions.len() * group);

    let found: usize = times_out
        .par_chunks_exact_mut(group)
        .zip(points_out.par_chunks_exact_mut(group))
        .zip(positions.par_iter().zip(velocities.par_iter()))
        .map(|((ts, ps), (&origin, &velocity))| {
            ts.fill(UNUSED_SLOT);
            ps.fill(Vec3A::ZERO);
            solid.candidates(origin, velocity, ts, ps)
        })
        .sum();

    debug!("intersect: {} candidates for {} rays", found, positions.len());
}
