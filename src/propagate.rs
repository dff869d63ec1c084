//! Commit sampled scattering sites into the ray state.

use glam::Vec3A;
use rayon::prelude::*;

use crate::ray::is_sentinel;

/// Propagator kernel.
///
/// Moves every ray with a scattering event to `scat_points[i]` and advances
/// `times[i]` by the flight time `scat_times[i]`. Rays whose scattering time
/// is the sentinel pass through unchanged.
pub fn propagate(positions: &mut [Vec3A], times: &mut [f32], scat_points: &[Vec3A], scat_times: &[f32]) {
    debug_assert_eq!(positions.len(), times.len());
    debug_assert_eq!(scat_points.len(), positions.len());
    debug_assert_eq!(scat_times.len(), positions.len());

    positions
        .par_iter_mut()
        .zip(times.par_iter_mut())
        .zip(scat_points.par_iter().zip(scat_times.par_iter()))
        .for_each(|((pos, t), (&sp, &st))| {
            if !is_sentinel(st) {
                *pos = sp;
                *t += st;
            }
        });
}
