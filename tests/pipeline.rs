//! End-to-end checks of the kernel sequence on a box sample.

use glam::Vec3A;

use scatterpath::group::GroupView;
use scatterpath::reduce::{force_intersection_order, simplify_time_point_pairs, PAIR_GROUP_SIZE};
use scatterpath::{
    source, Block, Intersection, MediumParams, Pipeline, Ray, RayBuffers, RngContext, SourceConfig, SENTINEL,
};

fn unit_box(attenuation: f32) -> Pipeline<Block> {
    Pipeline::new(Block::new(2.0, 2.0, 2.0), MediumParams { attenuation, cross_section: 1.5 }).unwrap()
}

/// Rays scattered around the box with random directions and speeds.
fn random_population(n: usize, seed: u64) -> RayBuffers {
    let rays: Vec<Ray> = (0..n)
        .map(|i| {
            let mut rng = RngContext::new(seed, i as u64);
            let position = Vec3A::new(
                rng.uniform_range(-3.0, 3.0),
                rng.uniform_range(-3.0, 3.0),
                rng.uniform_range(-3.0, 3.0),
            );
            let direction = Vec3A::new(
                rng.uniform_range(-1.0, 1.0),
                rng.uniform_range(-1.0, 1.0),
                rng.uniform_range(-1.0, 1.0),
            );
            let speed = rng.uniform_range(0.5, 4.0);
            Ray::new(position, direction.normalize_or_zero() * speed)
        })
        .collect();
    RayBuffers::from_rays(&rays)
}

#[test]
fn test_axis_ray_canonical_pair() {
    let p = unit_box(0.5);
    let mut rays = RayBuffers::from_rays(&[Ray::new(Vec3A::new(-5.0, 0.0, 0.0), Vec3A::X)]);
    let mut rngs = RngContext::population(1, 1);
    let mut ws = p.workspace(1);

    p.step(&mut rays, &mut rngs, &mut ws).unwrap();

    assert_eq!(ws.pair_times, vec![4.0, 6.0]);
    assert_eq!(ws.pair_points, vec![Vec3A::new(-1.0, 0.0, 0.0), Vec3A::new(1.0, 0.0, 0.0)]);
}

#[test]
fn test_receding_ray_stays_sentinel_everywhere() {
    let p = unit_box(0.5);
    let start = Ray { time: 2.0, probability: 0.75, ..Ray::new(Vec3A::new(0.0, 5.0, 0.0), Vec3A::Y) };
    let mut rays = RayBuffers::from_rays(&[start]);
    let mut rngs = RngContext::population(1, 1);
    let mut ws = p.workspace(1);

    let report = p.step(&mut rays, &mut rngs, &mut ws).unwrap();

    assert_eq!(report.events, 0);
    assert_eq!(ws.pair_times, vec![SENTINEL, SENTINEL]);
    assert_eq!(ws.scat_times, vec![SENTINEL]);
    assert_eq!(rays.ray(0), start);
    assert_eq!(rngs[0], RngContext::new(1, 0));
}

#[test]
fn test_zero_attenuation_keeps_weight_exactly() {
    let p = unit_box(0.0);
    let mut rays = random_population(256, 4);
    let before = rays.probabilities.clone();
    let mut rngs = RngContext::population(4, 256);
    let mut ws = p.workspace(256);

    let report = p.step(&mut rays, &mut rngs, &mut ws).unwrap();

    assert!(report.events > 0);
    assert_eq!(rays.probabilities, before);
}

#[test]
fn test_grazing_corner_scatters_at_entry() {
    let p = unit_box(1.0);
    let mut rays = RayBuffers::from_rays(&[Ray::new(Vec3A::new(-2.0, 0.0, 0.0), Vec3A::new(1.0, 1.0, 0.0))]);
    let mut rngs = RngContext::population(8, 1);
    let mut ws = p.workspace(1);

    p.step(&mut rays, &mut rngs, &mut ws).unwrap();

    let corner = Vec3A::new(-1.0, 1.0, 0.0);
    assert_eq!(ws.pair_times, vec![1.0, 1.0]);
    assert_eq!(ws.scat_points, vec![corner]);
    assert_eq!(rays.positions[0], corner);
    assert_eq!(rays.times[0], 1.0);
    assert_eq!(rays.probabilities[0], 1.0);
}

#[test]
fn test_negative_start_time_reaching_minus_one_still_scatters() {
    let p = unit_box(1.0);
    let start = Ray { time: -2.0, ..Ray::new(Vec3A::new(-2.0, 0.0, 0.0), Vec3A::new(1.0, 1.0, 0.0)) };
    let mut rays = RayBuffers::from_rays(&[start]);
    let mut rngs = RngContext::population(8, 1);
    let mut ws = p.workspace(1);

    let report = p.step(&mut rays, &mut rngs, &mut ws).unwrap();

    assert_eq!(report.events, 1);
    assert_eq!(ws.scat_times, vec![1.0]);
    assert_eq!(rays.positions[0], Vec3A::new(-1.0, 1.0, 0.0));
    assert_eq!(rays.times[0], -1.0);
    assert_ne!(rngs[0], RngContext::new(8, 0));
}

#[test]
fn test_ray_leaving_through_its_face_is_a_miss() {
    let p = unit_box(0.5);
    let start = Ray::new(Vec3A::new(-1.0, 0.0, 0.0), Vec3A::NEG_X);
    let mut rays = RayBuffers::from_rays(&[start]);
    let mut rngs = RngContext::population(6, 1);
    let mut ws = p.workspace(1);

    let report = p.step(&mut rays, &mut rngs, &mut ws).unwrap();

    assert_eq!(report.events, 0);
    assert_eq!(ws.pair_times, vec![SENTINEL, SENTINEL]);
    assert_eq!(rays.ray(0), start);
    assert_eq!(rngs[0], RngContext::new(6, 0));
}

#[test]
fn test_inside_rays_enter_exactly_at_their_position() {
    let n = 2000;
    let p = unit_box(0.5);
    let rays: Vec<Ray> = (0..n)
        .map(|i| {
            let mut rng = RngContext::new(13, i as u64);
            let position = Vec3A::new(
                rng.uniform_range(-0.9, 0.9),
                rng.uniform_range(-0.9, 0.9),
                rng.uniform_range(-0.9, 0.9),
            );
            let velocity = Vec3A::new(
                rng.uniform_range(-1.0, 1.0),
                rng.uniform_range(-1.0, 1.0),
                rng.uniform_range(-1.0, 1.0),
            );
            Ray::new(position, velocity)
        })
        .collect();
    let mut buffers = RayBuffers::from_rays(&rays);
    let mut rngs = RngContext::population(13, n);
    let mut ws = p.workspace(n);

    p.step(&mut buffers, &mut rngs, &mut ws).unwrap();

    for (i, ray) in rays.iter().enumerate() {
        match ws.intersection(i) {
            Intersection::Hit { entry, .. } => {
                assert_eq!(entry.time, 0.0, "ray {i}");
                assert_eq!(entry.point, ray.position, "ray {i}");
            }
            Intersection::Miss => panic!("ray {i} starts inside the box"),
        }
    }
}

#[test]
fn test_origin_inside_enters_at_current_position() {
    let p = unit_box(0.5);
    let mut rays = RayBuffers::from_rays(&[Ray::new(Vec3A::new(0.5, 0.25, 0.0), Vec3A::X * 2.0)]);
    let mut rngs = RngContext::population(3, 1);
    let mut ws = p.workspace(1);

    p.step(&mut rays, &mut rngs, &mut ws).unwrap();

    match ws.intersection(0) {
        Intersection::Hit { entry, exit } => {
            assert_eq!(entry.time, 0.0);
            assert_eq!(entry.point, Vec3A::new(0.5, 0.25, 0.0));
            assert!((exit.time - 0.25).abs() < 1e-6);
            assert_eq!(exit.point, Vec3A::new(1.0, 0.25, 0.0));
        }
        Intersection::Miss => panic!("ray inside the box must intersect"),
    }
}

#[test]
fn test_population_invariants() {
    let n = 4096;
    let p = unit_box(0.7);
    let mut rays = random_population(n, 21);
    let before = rays.clone();
    let mut rngs = RngContext::population(21, n);
    let mut ws = p.workspace(n);

    let report = p.step(&mut rays, &mut rngs, &mut ws).unwrap();
    assert!(report.events > 0 && report.misses() > 0);

    for i in 0..n {
        let pair = &ws.pair_times[i * 2..i * 2 + 2];
        let hit = ws.intersection(i);

        // Ordered pair or full sentinel
        assert!(pair[0] <= pair[1] || (pair[0] == SENTINEL && pair[1] == SENTINEL), "ray {i}: {pair:?}");

        match hit {
            Intersection::Hit { entry, exit } => {
                let chord = entry.point.distance(exit.point);
                let d = entry.point.distance(ws.scat_points[i]);
                assert!(d <= chord + 1e-4, "ray {i}: {d} > {chord}");
                assert!((rays.positions[i].abs() - Vec3A::ONE).max_element() <= 1e-4, "ray {i} left the box");
                assert!(rays.probabilities[i] <= before.probabilities[i]);
            }
            Intersection::Miss => {
                assert_eq!(rays.ray(i), before.ray(i));
                assert_eq!(rngs[i], RngContext::new(21, i as u64));
            }
        }
    }
}

#[test]
fn test_reduction_is_idempotent_on_canonical_pairs() {
    let n = 512;
    let p = unit_box(0.5);
    let mut rays = random_population(n, 5);
    let mut rngs = RngContext::population(5, n);
    let mut ws = p.workspace(n);
    p.step(&mut rays, &mut rngs, &mut ws).unwrap();

    let mut times = vec![0.0; n * PAIR_GROUP_SIZE];
    let mut points = vec![Vec3A::ZERO; n * PAIR_GROUP_SIZE];
    simplify_time_point_pairs(
        GroupView::new(&ws.pair_times, PAIR_GROUP_SIZE),
        GroupView::new(&ws.pair_points, PAIR_GROUP_SIZE),
        &rays.positions,
        PAIR_GROUP_SIZE,
        &mut times,
        &mut points,
    );
    force_intersection_order(&mut times, &mut points);

    assert_eq!(times, ws.pair_times);
    assert_eq!(points, ws.pair_points);
}

#[test]
fn test_same_seed_reproduces_run() {
    let p = unit_box(0.3);
    let beam = SourceConfig { distance: 4.0, width: 3.0, height: 3.0, speed: 5.0 };

    let run = || {
        let mut rays = source::emit(&beam, 1000, 77);
        let mut rngs = RngContext::population(77, 1000);
        p.run(&mut rays, &mut rngs, 2).unwrap();
        rays
    };

    let (a, b) = (run(), run());
    assert_eq!(a.positions, b.positions);
    assert_eq!(a.times, b.times);
    assert_eq!(a.probabilities, b.probabilities);
}
