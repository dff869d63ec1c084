//! Beer-Lambert weight update.

use glam::Vec3A;
use log::debug;
use rayon::prelude::*;

use crate::group::GroupView;
use crate::ray::is_sentinel;

/// Transmission factor over `distance` in a medium with attenuation `atten`.
#[inline]
pub fn transmission(atten: f32, distance: f32) -> f32 {
    (-atten * distance).exp()
}

/// Probability Updater kernel.
///
/// For each ray with a scattering event, multiplies its weight by
/// `exp(-atten * |p1 - p0|)` where `p1` and `p0` are the first entries of the
/// ray's groups in the two point buffers (typically the scattering site and the
/// entry point of the canonical pair). Rays whose `scat_times` entry is the
/// sentinel keep their weight bit for bit.
///
/// `atten` must be non-negative; callers validate it before launch.
pub fn update_probability(
    probabilities: &mut [f32],
    p1: GroupView<'_, Vec3A>,
    p0: GroupView<'_, Vec3A>,
    scat_times: &[f32],
    atten: f32,
) {
    debug_assert!(atten >= 0.0);
    debug_assert_eq!(p1.rays(), probabilities.len());
    debug_assert_eq!(p0.rays(), probabilities.len());
    debug_assert_eq!(scat_times.len(), probabilities.len());

    if atten == 0.0 {
        debug!("probability: zero attenuation, weights unchanged");
        return;
    }

    probabilities
        .par_iter_mut()
        .zip(scat_times.par_iter())
        .enumerate()
        .for_each(|(i, (prob, &st))| {
            if is_sentinel(st) {
                return;
            }
            let distance = p1.first(i).distance(*p0.first(i));
            *prob *= transmission(atten, distance);
        });
}
