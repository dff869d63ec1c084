use std::fs::File;
use std::io::BufWriter;
use std::time::{Duration, Instant};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use rayon::prelude::*;

use scatterpath::{source, Pipeline, RayBuffers, RngContext, SimulationConfig};

mod cli;
mod logger;

use cli::Args;
use logger::init_logger;

/// Population sizes for benchmark mode, capped by the configured neutron count.
const BENCH_LADDER: [usize; 9] = [
    10_000, 30_000, 100_000, 300_000, 1_000_000, 3_000_000, 10_000_000, 30_000_000, 100_000_000,
];

type BoxError = Box<dyn std::error::Error>;

fn main() {
    let args = Args::parse();

    init_logger(args.debug_level.into());

    // Log application startup with version information
    info!("ScatterPath - Git Version {} ({})", env!("GIT_HASH"), env!("GIT_DATE"));

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), BoxError> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path);
            SimulationConfig::load(path)?
        }
        None => SimulationConfig::default(),
    };
    args.apply(&mut config)?;
    config.validate()?;

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new().num_threads(threads).build_global()?;
    }
    info!("Using {} worker threads", rayon::current_num_threads());

    if args.bench {
        run_benchmark(&config)
    } else {
        simulate(&config, args.output.as_deref())
    }
}

fn progress_bar(len: u64, template: &str) -> Result<ProgressBar, BoxError> {
    let pb = ProgressBar::new(len);
    pb.set_style(ProgressStyle::default_bar().template(template)?);
    Ok(pb)
}

/// Trace the configured beam through the box for `config.steps` steps.
fn simulate(config: &SimulationConfig, output: Option<&str>) -> Result<(), BoxError> {
    let n = config.neutrons;
    info!(
        "Box {:?}, attenuation {}, cross section {}, {} neutrons, {} step(s), seed {}",
        config.extents, config.medium.attenuation, config.medium.cross_section, n, config.steps, config.seed
    );

    let pipeline = Pipeline::new(config.block(), config.medium)?;
    let mut rays = source::emit(&config.source, n, config.seed);
    let mut rngs = RngContext::population(config.seed, n);
    let mut ws = pipeline.workspace(n);

    let pb = progress_bar(u64::from(config.steps), "{bar:40} step {pos}/{len} ETA: {eta}")?;
    let start = Instant::now();
    let mut kernel_time = Duration::ZERO;
    let mut last_events = 0;
    for _ in 0..config.steps {
        let report = pipeline.step(&mut rays, &mut rngs, &mut ws)?;
        kernel_time += report.timings.total();
        last_events = report.events;
        pb.inc(1);
    }
    pb.finish_and_clear();
    let elapsed = start.elapsed();

    summarize(&rays, last_events, config.steps, elapsed, kernel_time);

    if let Some(path) = output {
        let file = File::create(path)?;
        rays.write_raw(BufWriter::new(file))?;
        info!("Ray buffers written to {}", path);
    }
    Ok(())
}

fn summarize(rays: &RayBuffers, events: usize, steps: u32, elapsed: Duration, kernel_time: Duration) {
    let n = rays.len();
    let total_weight: f64 = rays.probabilities.par_iter().map(|&p| f64::from(p)).sum();
    let rate = (n as f64 * f64::from(steps)) / kernel_time.as_secs_f64().max(f64::EPSILON);

    info!("================== RUN SUMMARY ==================");
    info!("Neutrons:            {}", n);
    info!("Scattered (last):    {} ({:.2}%)", events, 100.0 * events as f64 / n.max(1) as f64);
    info!("Mean weight:         {:.6}", total_weight / n.max(1) as f64);
    info!("Kernel time:         {:.2?}", kernel_time);
    info!("Wall time:           {:.2?}", elapsed);
    info!("Throughput:          {:.3e} neutrons/s", rate);
    info!("=================================================");

    if events == 0 {
        warn!("No neutron reached the sample; check the source size and distance");
    }
}

/// Measure single-step throughput across population sizes
fn run_benchmark(config: &SimulationConfig) -> Result<(), BoxError> {
    let sizes: Vec<usize> = BENCH_LADDER.iter().copied().filter(|&n| n <= config.neutrons).collect();
    if sizes.is_empty() {
        warn!("Benchmark needs at least {} neutrons", BENCH_LADDER[0]);
        return Ok(());
    }

    info!("🏁 Starting benchmark over {} population sizes", sizes.len());
    let pipeline = Pipeline::new(config.block(), config.medium)?;
    let pb = progress_bar(sizes.len() as u64, "{bar:40} {pos}/{len} sizes ETA: {eta}")?;

    let mut results = Vec::with_capacity(sizes.len());
    for &n in &sizes {
        let mut rays = source::emit(&config.source, n, config.seed);
        let mut rngs = RngContext::population(config.seed, n);
        let mut ws = pipeline.workspace(n);

        let report = pipeline.step(&mut rays, &mut rngs, &mut ws)?;
        results.push((n, report.timings.total()));
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!("================== BENCHMARK RESULTS ==================");
    info!("{:>12}  {:>12}  {:>16}", "Neutrons", "Time (ms)", "Neutrons/s");
    info!("--------------------------------------------------------");
    for (n, time) in results {
        let rate = n as f64 / time.as_secs_f64().max(f64::EPSILON);
        info!("{:>12}  {:>12.3}  {:>16.3e}", n, time.as_secs_f64() * 1e3, rate);
    }
    info!("========================================================");
    Ok(())
}
