use crate::complex::Complex;
use crate::error::ConfigError;
use crate::params::FlowParameters;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "windtunnel.json";

/// Tunnel settings. Every field is optional in the JSON file; missing fields keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Nominal tick interval in ms. Also the advection time step.
    pub frame_interval_ms: f64,
    /// Smoke particles older than this are retired (ms).
    pub particle_lifespan_ms: f64,
    /// Minimum spacing between pointer-driven spawns (ms).
    pub min_spawn_interval_ms: f64,
    pub smoke_line_count: usize,
    /// Pixels per circle-plane unit.
    pub display_scale: f64,
    pub outline_samples: usize,
    /// Hard cap on live particles.
    pub max_particles: usize,
    /// Air density for the lift-per-span readout (kg/m^3).
    pub density: f64,
    pub freestream: f64,
    pub center_x: f64,
    pub center_y: f64,
    /// Radians.
    pub angle_of_attack: f64,
    pub smoke_saturation: f64,
    pub smoke_lightness: f64,
    pub log_level: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            frame_interval_ms: 1000.0 / 60.0,
            particle_lifespan_ms: 20_000.0,
            min_spawn_interval_ms: 20.0,
            smoke_line_count: 30,
            display_scale: 100.0,
            outline_samples: 360,
            max_particles: 20_000,
            density: 1.225,
            freestream: 0.5,
            center_x: -0.1,
            center_y: 0.0,
            angle_of_attack: 0.0,
            smoke_saturation: 1.0,
            smoke_lightness: 0.5,
            log_level: "info".to_string(),
        }
    }
}

impl SimulationConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("frame_interval_ms", self.frame_interval_ms),
            ("particle_lifespan_ms", self.particle_lifespan_ms),
            ("display_scale", self.display_scale),
            ("density", self.density),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::ValidationError(format!("{name} must be positive, got {value}")));
            }
        }
        if !self.min_spawn_interval_ms.is_finite() || self.min_spawn_interval_ms < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "min_spawn_interval_ms must be non-negative, got {}",
                self.min_spawn_interval_ms
            )));
        }
        if self.outline_samples < 3 {
            return Err(ConfigError::ValidationError(format!(
                "outline_samples must be at least 3, got {}",
                self.outline_samples
            )));
        }
        self.initial_parameters()?;
        Ok(())
    }

    pub fn initial_parameters(&self) -> Result<FlowParameters, ConfigError> {
        Ok(FlowParameters::new(
            self.freestream,
            Complex::new(self.center_x, self.center_y),
            self.angle_of_attack,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_relative_eq!(config.frame_interval_ms, 16.666666666666668);
        let params = config.initial_parameters().unwrap();
        assert_relative_eq!(params.radius(), 1.1, epsilon = 1e-12);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimulationConfig::from_json(r#"{ "max_particles": 500, "freestream": 0.8 }"#).unwrap();
        assert_eq!(config.max_particles, 500);
        assert_relative_eq!(config.freestream, 0.8);
        assert_eq!(config.smoke_line_count, 30);
    }

    #[test]
    fn test_invalid_json_values_rejected() {
        assert!(matches!(
            SimulationConfig::from_json(r#"{ "display_scale": 0.0 }"#),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            SimulationConfig::from_json(r#"{ "freestream": -1.0 }"#),
            Err(ConfigError::ParameterError(_))
        ));
        assert!(matches!(
            SimulationConfig::from_json("{ not json"),
            Err(ConfigError::JsonError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SimulationConfig::load("definitely/not/here.json"),
            Err(ConfigError::FileError(_))
        ));
    }
}
