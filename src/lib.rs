//! ScatterPath neutron scattering kernels
//!
//! Data-parallel Monte Carlo pipeline that traces a neutron population through
//! a box-shaped sample: intersection, candidate reduction, free-path sampling,
//! propagation and Beer-Lambert weight update. Each stage is a kernel over
//! structure-of-arrays buffers, run with rayon.

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod ray;
pub mod interval;
pub mod group;
pub mod fill;
pub mod quadratic;
pub mod solid;
pub mod reduce;
pub mod random;
pub mod scatter;
pub mod propagate;
pub mod probability;
pub mod pipeline;
pub mod config;
pub mod source;
pub mod error;

pub use config::{MediumParams, SimulationConfig, SourceConfig};
pub use error::{ConfigError, PipelineError, PipelineResult};
pub use pipeline::{Pipeline, StepReport, Workspace};
pub use random::RngContext;
pub use ray::{Ray, RayBuffers, SENTINEL};
pub use reduce::Intersection;
pub use solid::{Block, Solid};
