//! Neutron ray representation.
//!
//! A ray is defined as r(t) = position + t * velocity, so the ray parameter t is
//! a time of flight measured from the ray's current time. The pipeline stores
//! rays as a structure of arrays ([`RayBuffers`]); [`Ray`] is the gathered view
//! of a single index.

use std::io::{self, Write};

use glam::Vec3A;

/// Value used for times (and companion points) that carry no valid result.
pub const SENTINEL: f32 = -1.0;

/// Point written next to a sentinel scattering time.
pub const SENTINEL_POINT: Vec3A = Vec3A::splat(SENTINEL);

/// Returns true if `t` is the "no intersection / no event" marker.
#[inline]
pub fn is_sentinel(t: f32) -> bool {
    t == SENTINEL
}

/// Kinematic and statistical state of one simulated neutron.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Current position in the solid's frame.
    pub position: Vec3A,

    /// Velocity vector.
    ///
    /// Not normalized: its length is the neutron speed, which converts flight
    /// distances into elapsed time.
    pub velocity: Vec3A,

    /// Elapsed time at `position`.
    pub time: f32,

    /// Statistical weight, multiplied down by attenuation.
    pub probability: f32,
}

impl Ray {
    /// Create a ray with unit weight at time zero.
    pub fn new(position: Vec3A, velocity: Vec3A) -> Self {
        Self {
            position,
            velocity,
            time: 0.0,
            probability: 1.0,
        }
    }

    /// Compute the point reached after flying for `t`.
    pub fn at(&self, t: f32) -> Vec3A {
        self.position + t * self.velocity
    }

    /// Length of the velocity vector.
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Structure-of-arrays storage for a ray population.
///
/// Index `i` denotes the same neutron in every buffer.
#[derive(Debug, Clone, Default)]
pub struct RayBuffers {
    /// Positions, one per ray.
    pub positions: Vec<Vec3A>,
    /// Velocities, one per ray.
    pub velocities: Vec<Vec3A>,
    /// Elapsed times, one per ray.
    pub times: Vec<f32>,
    /// Statistical weights, one per ray.
    pub probabilities: Vec<f32>,
}

impl RayBuffers {
    /// Allocate `n` rays at the origin with zero velocity and unit weight.
    pub fn with_len(n: usize) -> Self {
        Self {
            positions: vec![Vec3A::ZERO; n],
            velocities: vec![Vec3A::ZERO; n],
            times: vec![0.0; n],
            probabilities: vec![1.0; n],
        }
    }

    /// Scatter a slice of rays into SoA buffers.
    pub fn from_rays(rays: &[Ray]) -> Self {
        Self {
            positions: rays.iter().map(|r| r.position).collect(),
            velocities: rays.iter().map(|r| r.velocity).collect(),
            times: rays.iter().map(|r| r.time).collect(),
            probabilities: rays.iter().map(|r| r.probability).collect(),
        }
    }

    /// Number of rays.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True if the population is empty.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// True if every attribute buffer has the same length.
    pub fn is_aligned(&self) -> bool {
        let n = self.positions.len();
        self.velocities.len() == n && self.times.len() == n && self.probabilities.len() == n
    }

    /// Gather the state of ray `i`.
    pub fn ray(&self, i: usize) -> Ray {
        Ray {
            position: self.positions[i],
            velocity: self.velocities[i],
            time: self.times[i],
            probability: self.probabilities[i],
        }
    }

    /// Write the population as little-endian f32 blobs.
    ///
    /// Layout: positions (3 floats per ray), velocities (3 per ray), times,
    /// probabilities. Vec3A padding lanes are not written.
    pub fn write_raw<W: Write>(&self, mut w: W) -> io::Result<()> {
        w.write_all(bytemuck::cast_slice::<[u32; 3], u8>(flatten_points(&self.positions).as_slice()))?;
        w.write_all(bytemuck::cast_slice::<[u32; 3], u8>(flatten_points(&self.velocities).as_slice()))?;
        w.write_all(bytemuck::cast_slice::<u32, u8>(to_le(&self.times).as_slice()))?;
        w.write_all(bytemuck::cast_slice::<u32, u8>(to_le(&self.probabilities).as_slice()))?;
        w.flush()
    }
}

/// Pack points into `[x, y, z]` triples with little-endian float bits.
pub fn flatten_points(points: &[Vec3A]) -> Vec<[u32; 3]> {
    points
        .iter()
        .map(|p| p.to_array().map(|c| c.to_bits().to_le()))
        .collect()
}

fn to_le(values: &[f32]) -> Vec<u32> {
    values.iter().map(|v| v.to_bits().to_le()).collect()
}
