//! Stage orchestration.
//!
//! One [`Pipeline::step`] runs the kernels in order over the whole population:
//!
//! ```text
//! intersect -> simplify + force order -> sample sites -> propagate -> update weights
//! ```
//!
//! Each kernel returns only after every ray is done, which is the barrier
//! between stages. Transient buffers live in a [`Workspace`] that is reused
//! across steps.

use std::time::{Duration, Instant};

use glam::Vec3A;
use log::debug;
use rayon::prelude::*;

use crate::config::MediumParams;
use crate::error::{check_len, PipelineResult};
use crate::group::GroupView;
use crate::probability::update_probability;
use crate::propagate::propagate;
use crate::random::RngContext;
use crate::ray::{is_sentinel, RayBuffers};
use crate::reduce::{force_intersection_order, simplify_time_point_pairs, Intersection, PAIR_GROUP_SIZE};
use crate::scatter::calc_scattering_sites;
use crate::solid::{intersect, Solid};

/// Transient per-ray buffers shared by the stages of one step.
#[derive(Debug, Clone)]
pub struct Workspace {
    group_size: usize,
    /// Raw candidate times, `group_size` per ray.
    pub candidate_times: Vec<f32>,
    /// Raw candidate points, `group_size` per ray.
    pub candidate_points: Vec<Vec3A>,
    /// Canonical (entry, exit) times, 2 per ray.
    pub pair_times: Vec<f32>,
    /// Canonical (entry, exit) points, 2 per ray.
    pub pair_points: Vec<Vec3A>,
    /// Sampled scattering positions, 1 per ray.
    pub scat_points: Vec<Vec3A>,
    /// Sampled flight times to the scattering site, 1 per ray.
    pub scat_times: Vec<f32>,
}

impl Workspace {
    /// Allocate buffers for `n` rays and a candidate group of `group_size`.
    pub fn new(n: usize, group_size: usize) -> Self {
        Self {
            group_size,
            candidate_times: vec![0.0; n * group_size],
            candidate_points: vec![Vec3A::ZERO; n * group_size],
            pair_times: vec![0.0; n * PAIR_GROUP_SIZE],
            pair_points: vec![Vec3A::ZERO; n * PAIR_GROUP_SIZE],
            scat_points: vec![Vec3A::ZERO; n],
            scat_times: vec![0.0; n],
        }
    }

    /// Number of rays the workspace was sized for.
    pub fn rays(&self) -> usize {
        self.scat_times.len()
    }

    /// Candidate slots per ray.
    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// Canonical intersection of ray `i` from the last step.
    pub fn intersection(&self, i: usize) -> Intersection {
        let pair = i * PAIR_GROUP_SIZE..(i + 1) * PAIR_GROUP_SIZE;
        Intersection::from_pair(&self.pair_times[pair.clone()], &self.pair_points[pair])
    }
}

/// Wall-clock time spent in each stage.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageTimings {
    /// Intersection Solver.
    pub intersect: Duration,
    /// Simplify and force-order passes.
    pub reduce: Duration,
    /// Scattering Site Sampler.
    pub scatter: Duration,
    /// Propagator.
    pub propagate: Duration,
    /// Probability Updater.
    pub probability: Duration,
}

impl StageTimings {
    /// Sum over all stages.
    pub fn total(&self) -> Duration {
        self.intersect + self.reduce + self.scatter + self.propagate + self.probability
    }
}

/// Outcome of one step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    /// Population size.
    pub rays: usize,
    /// Rays that scattered inside the solid.
    pub events: usize,
    /// Per-stage timings.
    pub timings: StageTimings,
}

impl StepReport {
    /// Rays that passed through without interaction.
    pub fn misses(&self) -> usize {
        self.rays - self.events
    }
}

/// Kernel sequence bound to a solid and a medium.
#[derive(Debug, Clone)]
pub struct Pipeline<S: Solid> {
    solid: S,
    medium: MediumParams,
}

fn timed<F: FnOnce()>(f: F) -> Duration {
    let start = Instant::now();
    f();
    start.elapsed()
}

impl<S: Solid> Pipeline<S> {
    /// Build a pipeline, rejecting invalid medium coefficients.
    pub fn new(solid: S, medium: MediumParams) -> PipelineResult<Self> {
        medium.validate()?;
        Ok(Self { solid, medium })
    }

    /// The solid rays are traced against.
    pub fn solid(&self) -> &S {
        &self.solid
    }

    /// Medium coefficients.
    pub fn medium(&self) -> MediumParams {
        self.medium
    }

    /// Workspace sized for `n` rays and this pipeline's solid.
    pub fn workspace(&self, n: usize) -> Workspace {
        Workspace::new(n, self.solid.group_size())
    }

    /// Validate buffer layout before a launch.
    pub fn check(&self, rays: &RayBuffers, rngs: &[RngContext], ws: &Workspace) -> PipelineResult<()> {
        let n = rays.len();
        check_len("velocities", n, rays.velocities.len())?;
        check_len("times", n, rays.times.len())?;
        check_len("probabilities", n, rays.probabilities.len())?;
        check_len("rng contexts", n, rngs.len())?;
        check_len("candidate group", self.solid.group_size(), ws.group_size())?;
        let group = ws.group_size();
        check_len("candidate times", n * group, ws.candidate_times.len())?;
        check_len("candidate points", n * group, ws.candidate_points.len())?;
        check_len("pair times", n * PAIR_GROUP_SIZE, ws.pair_times.len())?;
        check_len("pair points", n * PAIR_GROUP_SIZE, ws.pair_points.len())?;
        check_len("scattering points", n, ws.scat_points.len())?;
        check_len("scattering times", n, ws.rays())
    }

    /// Run every stage once over the population.
    pub fn step(&self, rays: &mut RayBuffers, rngs: &mut [RngContext], ws: &mut Workspace) -> PipelineResult<StepReport> {
        self.check(rays, rngs, ws)?;
        let group = ws.group_size;
        let mut timings = StageTimings::default();

        timings.intersect = timed(|| {
            intersect(&self.solid, &rays.positions, &rays.velocities, &mut ws.candidate_times, &mut ws.candidate_points)
        });

        timings.reduce = timed(|| {
            simplify_time_point_pairs(
                GroupView::new(&ws.candidate_times, group),
                GroupView::new(&ws.candidate_points, group),
                &rays.positions,
                PAIR_GROUP_SIZE,
                &mut ws.pair_times,
                &mut ws.pair_points,
            );
            force_intersection_order(&mut ws.pair_times, &mut ws.pair_points);
        });

        timings.scatter = timed(|| {
            calc_scattering_sites(
                &ws.pair_times,
                &ws.pair_points,
                &rays.velocities,
                rngs,
                self.medium.cross_section,
                &mut ws.scat_points,
                &mut ws.scat_times,
            )
        });

        timings.propagate = timed(|| propagate(&mut rays.positions, &mut rays.times, &ws.scat_points, &ws.scat_times));

        timings.probability = timed(|| {
            update_probability(
                &mut rays.probabilities,
                GroupView::new(&ws.scat_points, 1),
                GroupView::new(&ws.pair_points, PAIR_GROUP_SIZE),
                &ws.scat_times,
                self.medium.attenuation,
            )
        });

        let events = ws.scat_times.par_iter().filter(|&&t| !is_sentinel(t)).count();
        debug!(
            "step: {} rays, {} events, {:.2?} (intersect {:.2?}, reduce {:.2?}, scatter {:.2?}, propagate {:.2?}, probability {:.2?})",
            rays.len(),
            events,
            timings.total(),
            timings.intersect,
            timings.reduce,
            timings.scatter,
            timings.propagate,
            timings.probability
        );

        Ok(StepReport {
            rays: rays.len(),
            events,
            timings,
        })
    }

    /// Run `steps` consecutive steps, reusing `rngs` and one workspace.
    pub fn run(&self, rays: &mut RayBuffers, rngs: &mut [RngContext], steps: u32) -> PipelineResult<Vec<StepReport>> {
        let mut ws = self.workspace(rays.len());
        (0..steps).map(|_| self.step(rays, rngs, &mut ws)).collect()
    }
}
