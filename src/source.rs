//! Beam source: initial ray population.
//!
//! Rays start on the plane x = -distance with transverse offsets drawn
//! uniformly over a width x height rectangle, fly along +x with the configured
//! speed, weight 1 and time 0.

use glam::Vec3A;
use rayon::prelude::*;

use crate::config::SourceConfig;
use crate::fill::init_array;
use crate::random::RngContext;
use crate::ray::RayBuffers;

/// Key offset separating source sampling from the transport generators.
const SOURCE_KEY: u64 = 0x5eed_50ce;

/// Generate `n` rays from `source` reproducibly under `seed`.
pub fn emit(source: &SourceConfig, n: usize, seed: u64) -> RayBuffers {
    let mut rays = RayBuffers::with_len(n);
    let velocity = Vec3A::X * source.speed;
    let (hw, hh) = (0.5 * source.width, 0.5 * source.height);

    rays.positions.par_iter_mut().enumerate().for_each(|(i, p)| {
        let mut rng = RngContext::new(seed ^ SOURCE_KEY, i as u64);
        let y = rng.uniform_range(-hw, hw);
        let z = rng.uniform_range(-hh, hh);
        *p = Vec3A::new(-source.distance, y, z);
    });
    init_array(&mut rays.velocities, velocity);
    init_array(&mut rays.times, 0.0);
    init_array(&mut rays.probabilities, 1.0);

    rays
}
