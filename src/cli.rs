use clap::{Parser, ValueEnum};
use log::LevelFilter;

use scatterpath::{ConfigError, SimulationConfig};

/// Custom enum for log levels that can be used with clap's ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convert our custom LogLevel enum to log crate's LevelFilter
impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments structure using clap derive macros
#[derive(Parser, Debug)]
#[command(name = "scatterpath")]
#[command(about = "Monte Carlo neutron scattering through a box-shaped sample")]
pub struct Args {
    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    pub config: Option<String>,

    /// Set the logging level (defaults to "info")
    #[arg(long, default_value = "info", help = "Set the logging level")]
    pub debug_level: LogLevel,

    /// Number of neutrons to simulate
    #[arg(short, long)]
    pub neutrons: Option<usize>,

    /// Number of pipeline steps; random streams carry over between steps
    #[arg(long)]
    pub steps: Option<u32>,

    /// Global random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Box widths as X,Y,Z
    #[arg(long, value_delimiter = ',')]
    pub extents: Option<Vec<f32>>,

    /// Attenuation coefficient for the weight update
    #[arg(long)]
    pub atten: Option<f32>,

    /// Scattering cross section used to sample the free path
    #[arg(long)]
    pub cross_section: Option<f32>,

    /// Worker threads (defaults to one per core)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Write the final ray buffers as raw little-endian f32 arrays
    #[arg(short, long)]
    pub output: Option<String>,

    /// Measure throughput over a ladder of population sizes up to --neutrons
    #[arg(long)]
    pub bench: bool,
}

impl Args {
    /// Overlay the flags that were given on top of `config`.
    pub fn apply(&self, config: &mut SimulationConfig) -> Result<(), ConfigError> {
        if let Some(n) = self.neutrons {
            config.neutrons = n;
        }
        if let Some(steps) = self.steps {
            config.steps = steps;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(extents) = &self.extents {
            config.extents = <[f32; 3]>::try_from(extents.as_slice())
                .map_err(|_| ConfigError::Other(format!("--extents takes 3 values, got {}", extents.len())))?;
        }
        if let Some(atten) = self.atten {
            config.medium.attenuation = atten;
        }
        if let Some(xs) = self.cross_section {
            config.medium.cross_section = xs;
        }
        Ok(())
    }
}
