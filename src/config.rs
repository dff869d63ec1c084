//! Simulation configuration.
//!
//! Loaded from an optional JSON file; every field has a default, so a file only
//! needs the values it changes. Command line flags override file values.

use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, PipelineError, PipelineResult};
use crate::solid::Block;

/// Material parameters consumed by the sampler and the weight update.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MediumParams {
    /// Attenuation coefficient for the Beer-Lambert weight update (1/length).
    pub attenuation: f32,
    /// Macroscopic scattering cross section, the free-path rate (1/length).
    pub cross_section: f32,
}

impl Default for MediumParams {
    fn default() -> Self {
        Self {
            attenuation: 0.5,
            cross_section: 1.0,
        }
    }
}

impl MediumParams {
    /// Reject negative or non-finite coefficients.
    pub fn validate(&self) -> PipelineResult<()> {
        non_negative("attenuation", self.attenuation)?;
        non_negative("cross_section", self.cross_section)
    }
}

/// Planar beam upstream of the solid, travelling along +x.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Distance from the box center to the source plane.
    pub distance: f32,
    /// Beam width along y.
    pub width: f32,
    /// Beam height along z.
    pub height: f32,
    /// Neutron speed.
    pub speed: f32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            distance: 5.0,
            width: 3.0,
            height: 3.0,
            speed: 2200.0,
        }
    }
}

/// Complete description of a run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Box widths along X, Y and Z.
    pub extents: [f32; 3],
    /// Medium coefficients.
    pub medium: MediumParams,
    /// Global seed for the per-ray generators.
    pub seed: u64,
    /// Number of neutrons.
    pub neutrons: usize,
    /// Pipeline steps to run; generator state carries over between steps.
    pub steps: u32,
    /// Beam source.
    pub source: SourceConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            extents: [2.0, 2.0, 2.0],
            medium: MediumParams::default(),
            seed: 0,
            neutrons: 1_000_000,
            steps: 1,
            source: SourceConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse a JSON document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// The solid described by `extents`.
    pub fn block(&self) -> Block {
        let [x, y, z] = self.extents;
        Block::new(x, y, z)
    }

    /// Check the configuration before any buffer is allocated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in ["extents.x", "extents.y", "extents.z"].into_iter().zip(self.extents) {
            positive(name, value)?;
        }
        self.medium.validate()?;
        positive("source.speed", self.source.speed)?;
        non_negative("source.width", self.source.width)?;
        non_negative("source.height", self.source.height)?;
        if !self.source.distance.is_finite() {
            return Err(invalid("source.distance", self.source.distance, "must be finite").into());
        }
        if self.neutrons == 0 {
            return Err(ConfigError::Other("neutron count must be positive".to_string()));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, value: f32, reason: &'static str) -> PipelineError {
    PipelineError::InvalidParameter { name, value, reason }
}

fn positive(name: &'static str, value: f32) -> PipelineResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(name, value, "must be finite and positive"))
    }
}

fn non_negative(name: &'static str, value: f32) -> PipelineResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(name, value, "must be finite and non-negative"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = SimulationConfig::from_json(r#"{ "extents": [1, 2, 3], "medium": { "attenuation": 0 } }"#).unwrap();
        assert_eq!(cfg.extents, [1.0, 2.0, 3.0]);
        assert_eq!(cfg.medium.attenuation, 0.0);
        assert_eq!(cfg.medium.cross_section, MediumParams::default().cross_section);
        assert_eq!(cfg.block(), Block::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_rejects_negative_attenuation() {
        let mut cfg = SimulationConfig::default();
        cfg.medium.attenuation = -0.1;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("attenuation"));
    }

    #[test]
    fn test_rejects_flat_box_and_zero_speed() {
        let mut cfg = SimulationConfig::default();
        cfg.extents[1] = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = SimulationConfig::default();
        cfg.source.speed = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "neutrons": 10, "seed": 3, "source": {{ "speed": 1.5 }} }}"#).unwrap();

        let cfg = SimulationConfig::load(file.path()).unwrap();
        assert_eq!(cfg.neutrons, 10);
        assert_eq!(cfg.seed, 3);
        assert_eq!(cfg.source.speed, 1.5);
        assert_eq!(cfg.source.distance, SourceConfig::default().distance);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(SimulationConfig::load("/nonexistent/run.json"), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(SimulationConfig::from_json("{ nope"), Err(ConfigError::Json(_))));
    }
}
