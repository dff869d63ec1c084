//! Scattering site sampling.
//!
//! The free path inside the solid follows an exponential law with the
//! macroscopic cross section as its rate, truncated to the chord between entry
//! and exit. It is drawn by inverting the truncated CDF, one uniform per ray.

use glam::Vec3A;
use log::debug;
use rayon::prelude::*;

use crate::random::RngContext;
use crate::ray::{SENTINEL, SENTINEL_POINT};
use crate::reduce::{Crossing, Intersection, PAIR_GROUP_SIZE};

/// Below this optical depth the truncated exponential is sampled as uniform.
const THIN_LIMIT: f32 = 1e-6;

/// Map a uniform `u` in [0, 1) to a free path in [0, length].
///
/// Inverse CDF of the exponential with rate `rate` truncated to
/// [0, length]: d = -ln(1 - u (1 - e^(-rate length))) / rate.
pub fn sample_free_path(u: f32, rate: f32, length: f32) -> f32 {
    if !(length > 0.0) {
        return 0.0;
    }

    let depth = rate * length;
    let d = if depth < THIN_LIMIT {
        u * length
    } else {
        let reach = -(-depth).exp_m1();
        -(-u * reach).ln_1p() / rate
    };

    d.clamp(0.0, length)
}

/// Sample the scattering position and its flight time from the ray's current
/// position for a hit.
///
/// The flight time is never negative, so it cannot collide with [`SENTINEL`].
/// Returns `None` without touching `rng` when the ray has no usable speed.
pub fn sample_site(
    entry: Crossing,
    exit: Crossing,
    velocity: Vec3A,
    cross_section: f32,
    rng: &mut RngContext,
) -> Option<(Vec3A, f32)> {
    let speed = velocity.length();
    if !(speed > 0.0 && speed.is_finite()) {
        return None;
    }

    let length = (exit.time - entry.time) * speed;
    let d = sample_free_path(rng.uniform(), cross_section, length);

    let position = entry.point + (d / speed) * velocity;
    let time = entry.time + d / speed;
    Some((position, time))
}

/// Scattering Site Sampler kernel.
///
/// Reads the canonical pairs (`2 * N` entries) and writes one site per ray,
/// with its time as flight time from the ray's current position. Misses get
/// [`SENTINEL`] / [`SENTINEL_POINT`] and their RNG context is not advanced.
pub fn calc_scattering_sites(
    pair_times: &[f32],
    pair_points: &[Vec3A],
    velocities: &[Vec3A],
    rngs: &mut [RngContext],
    cross_section: f32,
    scat_points: &mut [Vec3A],
    scat_times: &mut [f32],
) {
    let n = velocities.len();
    debug_assert_eq!(pair_times.len(), n * PAIR_GROUP_SIZE);
    debug_assert_eq!(pair_points.len(), n * PAIR_GROUP_SIZE);
    debug_assert_eq!(rngs.len(), n);

    let events: usize = scat_points
        .par_iter_mut()
        .zip(scat_times.par_iter_mut())
        .zip(rngs.par_iter_mut())
        .enumerate()
        .map(|(i, ((sp, st), rng))| {
            let pair = i * PAIR_GROUP_SIZE..(i + 1) * PAIR_GROUP_SIZE;
            let site = match Intersection::from_pair(&pair_times[pair.clone()], &pair_points[pair]) {
                Intersection::Hit { entry, exit } => {
                    sample_site(entry, exit, velocities[i], cross_section, rng)
                }
                Intersection::Miss => None,
            };

            let (p, t) = site.unwrap_or((SENTINEL_POINT, SENTINEL));
            *sp = p;
            *st = t;
            usize::from(site.is_some())
        })
        .sum();

    debug!("scatter: {} scattering events for {} rays", events, n);
}
