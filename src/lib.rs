//! Potential flow around a Joukowski airfoil, visualized with smoke tracers.
//!
//! The circle plane carries the closed-form solution (freestream + vortex + doublet, with the
//! circulation fixed by the Kutta condition). The Joukowski transform maps it onto the airfoil
//! plane, and smoke particles are advected through the resulting velocity field.

pub mod analysis;
pub mod color;
pub mod complex;
pub mod config;
pub mod error;
pub mod flow;
pub mod mapping;
pub mod outline;
pub mod params;
pub mod particles;
pub mod simulation;

pub use complex::Complex;
pub use config::SimulationConfig;
pub use error::{ConfigError, ParameterError};
pub use flow::{evaluate_velocity, FlowSample, SampleQuality};
pub use mapping::DisplayTransform;
pub use params::FlowParameters;
pub use particles::{Particle, ParticleId, ParticleStore};
pub use simulation::{Frame, FrameStats, RenderedParticle, Simulation};
