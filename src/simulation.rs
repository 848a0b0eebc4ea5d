//! Simulation context: owns the flow parameters, the smoke and the cached outline, and
//! turns input events and frame ticks into calls on the flow and particle modules.

use crate::complex::Complex;
use crate::config::SimulationConfig;
use crate::error::{ConfigError, ParameterError};
use crate::mapping::DisplayTransform;
use crate::outline::OutlineCache;
use crate::params::FlowParameters;
use crate::particles::ParticleStore;
use nalgebra as na;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedParticle {
    pub position: na::Point2<f64>,
    pub color: [u8; 3],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub live: usize,
    pub spawned: usize,
    pub retired: usize,
    pub degenerate: usize,
    pub singular: usize,
}

/// Everything the renderer needs for one frame.
#[derive(Debug)]
pub struct Frame<'a> {
    pub outline: &'a [na::Point2<f64>],
    pub particles: Vec<RenderedParticle>,
    pub stats: FrameStats,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pointer {
    position: na::Point2<f64>,
    held: bool,
}

impl Pointer {
    fn released() -> Self {
        Pointer {
            position: na::Point2::origin(),
            held: false,
        }
    }
}

pub struct Simulation {
    config: SimulationConfig,
    params: FlowParameters,
    particles: ParticleStore,
    outline: OutlineCache,
    pointer: Pointer,
    smoke_line_pending: bool,
    display: DisplayTransform,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let params = config.initial_parameters()?;
        let particles = ParticleStore::new(
            config.max_particles,
            config.particle_lifespan_ms,
            config.min_spawn_interval_ms,
        );
        let display = DisplayTransform::centered(config.display_scale, 0.0, 0.0);
        Ok(Simulation {
            config,
            params,
            particles,
            outline: OutlineCache::default(),
            pointer: Pointer::released(),
            smoke_line_pending: false,
            display,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn parameters(&self) -> &FlowParameters {
        &self.params
    }

    pub fn particles(&self) -> &ParticleStore {
        &self.particles
    }

    /// Replaces the flow parameters wholesale. On error the previous parameters stay.
    pub fn set_parameters(
        &mut self,
        freestream: f64,
        center_x: f64,
        center_y: f64,
        angle_of_attack: f64,
    ) -> Result<(), ParameterError> {
        let params = FlowParameters::new(freestream, Complex::new(center_x, center_y), angle_of_attack)
            .map_err(|err| {
                warn!("rejected flow parameters: {}", err);
                err
            })?;
        debug!(
            freestream,
            center_x,
            center_y,
            angle_of_attack,
            radius = params.radius(),
            "flow parameters updated"
        );
        self.params = params;
        self.outline.invalidate();
        Ok(())
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.pointer = Pointer {
            position: na::Point2::new(x, y),
            held: true,
        };
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.pointer.position = na::Point2::new(x, y);
    }

    pub fn pointer_up(&mut self) {
        self.pointer.held = false;
    }

    /// Queues a burst along the left edge; it is emitted on the next tick.
    pub fn emit_smoke_line(&mut self) {
        self.smoke_line_pending = true;
    }

    pub fn clear_smoke(&mut self) {
        self.particles.clear();
    }

    /// Advances one frame: spawn, advect by the nominal frame interval, retire.
    pub fn tick(&mut self, now: f64, viewport_width: f64, viewport_height: f64) -> Frame<'_> {
        let display = DisplayTransform::centered(self.config.display_scale, viewport_width, viewport_height);
        if display != self.display {
            debug!(viewport_width, viewport_height, "viewport changed");
            self.display = display;
        }

        let mut stats = FrameStats::default();
        if self.smoke_line_pending {
            self.smoke_line_pending = false;
            stats.spawned += self
                .particles
                .spawn_line(viewport_height, self.config.smoke_line_count, now);
        }
        if self.pointer.held && self.particles.spawn_at(self.pointer.position, now).is_some() {
            stats.spawned += 1;
        }

        let advect = self
            .particles
            .advect(&self.params, &self.display, self.config.frame_interval_ms);
        stats.degenerate = advect.degenerate;
        stats.singular = advect.singular;
        stats.retired = self.particles.retire(now, viewport_width, viewport_height);
        stats.live = self.particles.len();

        let freestream = self.params.freestream();
        let (saturation, lightness) = (self.config.smoke_saturation, self.config.smoke_lightness);
        let particles = self
            .particles
            .iter()
            .map(|(_, p)| RenderedParticle {
                position: p.position,
                color: p.color(freestream, saturation, lightness),
            })
            .collect();

        let outline = self
            .outline
            .get_or_generate(&self.params, &self.display, self.config.outline_samples);

        Frame {
            outline,
            particles,
            stats,
        }
    }
}
