//! Smoke tracers and the slot arena that owns them.

use crate::color::{speed_hue, Hsl};
use crate::flow::{self, SampleQuality};
use crate::mapping::DisplayTransform;
use crate::params::FlowParameters;
use nalgebra as na;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: na::Point2<f64>,
    /// Solver output at `position` as of the last advection step; zero at spawn.
    pub velocity: na::Vector2<f64>,
    pub born: f64,
}

impl Particle {
    pub fn new(position: na::Point2<f64>, born: f64) -> Self {
        Particle {
            position,
            velocity: na::Vector2::zeros(),
            born,
        }
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    pub fn age(&self, now: f64) -> f64 {
        now - self.born
    }

    pub fn color(&self, freestream: f64, saturation: f64, lightness: f64) -> [u8; 3] {
        Hsl::new(speed_hue(self.speed(), freestream), saturation, lightness).to_rgb()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(usize);

impl ParticleId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvectStats {
    pub advected: usize,
    pub degenerate: usize,
    pub singular: usize,
}

#[derive(Debug, Clone)]
pub struct ParticleStore {
    slots: Vec<Option<Particle>>,
    free: Vec<usize>,
    live: usize,
    capacity: usize,
    lifespan: f64,
    min_spawn_interval: f64,
    last_spawn: Option<f64>,
}

impl ParticleStore {
    pub fn new(capacity: usize, lifespan: f64, min_spawn_interval: f64) -> Self {
        ParticleStore {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            capacity,
            lifespan,
            min_spawn_interval,
            last_spawn: None,
        }
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn is_full(&self) -> bool {
        self.live >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParticleId, &Particle)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|p| (ParticleId(index), p)))
    }

    /// Stores a particle, reusing a freed slot when one exists. Refused at capacity.
    pub fn insert(&mut self, particle: Particle) -> Option<ParticleId> {
        if self.is_full() {
            debug!(capacity = self.capacity, "particle store full, spawn refused");
            return None;
        }
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(particle);
                index
            }
            None => {
                self.slots.push(Some(particle));
                self.slots.len() - 1
            }
        };
        self.live += 1;
        Some(ParticleId(index))
    }

    pub fn remove(&mut self, id: ParticleId) -> Option<Particle> {
        let removed = self.slots.get_mut(id.0).and_then(Option::take);
        if removed.is_some() {
            self.free.push(id.0);
            self.live -= 1;
        }
        removed
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
        self.last_spawn = None;
    }

    /// Throttled single spawn: at most one per `min_spawn_interval`.
    pub fn spawn_at(&mut self, position: na::Point2<f64>, now: f64) -> Option<ParticleId> {
        if let Some(last) = self.last_spawn {
            if now - last <= self.min_spawn_interval {
                return None;
            }
        }
        let id = self.insert(Particle::new(position, now))?;
        self.last_spawn = Some(now);
        Some(id)
    }

    /// Vertical line of `count` particles along the left edge, ignoring the throttle.
    pub fn spawn_line(&mut self, height: f64, count: usize, now: f64) -> usize {
        if count == 0 {
            return 0;
        }
        let spacing = height / count as f64;
        (0..count)
            .map(|i| na::Point2::new(0.0, (i as f64 + 0.5) * spacing))
            .take_while(|&position| self.insert(Particle::new(position, now)).is_some())
            .count()
    }

    /// Forward-Euler step. A singular sample keeps the particle's previous velocity.
    pub fn advect(&mut self, params: &FlowParameters, display: &DisplayTransform, dt: f64) -> AdvectStats {
        let mut stats = AdvectStats::default();
        for particle in self.slots.iter_mut().flatten() {
            let sample = flow::evaluate_velocity(params, display, &particle.position);
            match sample.quality {
                SampleQuality::Singular => stats.singular += 1,
                SampleQuality::Degenerate => {
                    stats.degenerate += 1;
                    particle.velocity = sample.velocity;
                }
                SampleQuality::Regular => particle.velocity = sample.velocity,
            }
            particle.position += particle.velocity * dt;
            stats.advected += 1;
        }
        if stats.singular > 0 || stats.degenerate > 0 {
            trace!(
                degenerate = stats.degenerate,
                singular = stats.singular,
                "irregular flow evaluations"
            );
        }
        stats
    }

    /// Drops particles older than the lifespan or outside the open (0, width) x (0, height)
    /// viewport. Returns how many were removed.
    pub fn retire(&mut self, now: f64, width: f64, height: f64) -> usize {
        let mut retired = 0;
        for index in 0..self.slots.len() {
            let expired = match &self.slots[index] {
                Some(p) => {
                    p.age(now) > self.lifespan
                        || !(p.position.x > 0.0 && p.position.x < width && p.position.y > 0.0 && p.position.y < height)
                }
                None => false,
            };
            if expired && self.remove(ParticleId(index)).is_some() {
                retired += 1;
            }
        }
        retired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::Complex;
    use approx::assert_abs_diff_eq;

    const LIFESPAN: f64 = 20_000.0;

    fn store() -> ParticleStore {
        ParticleStore::new(1000, LIFESPAN, 20.0)
    }

    #[test]
    fn test_lifespan_boundary() {
        let mut store = store();
        let t0 = 5_000.0;
        let id = store.spawn_at(na::Point2::new(100.0, 100.0), t0).unwrap();

        store.retire(t0 + LIFESPAN - 1.0, 800.0, 600.0);
        assert!(store.get(id).is_some());

        store.retire(t0 + LIFESPAN + 1.0, 800.0, 600.0);
        assert!(store.get(id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_outside_viewport_is_retired() {
        let mut store = store();
        store.insert(Particle::new(na::Point2::new(810.0, 100.0), 0.0));
        store.insert(Particle::new(na::Point2::new(100.0, -1.0), 0.0));
        store.insert(Particle::new(na::Point2::new(0.0, 50.0), 0.0));
        let keep = store.insert(Particle::new(na::Point2::new(400.0, 300.0), 0.0)).unwrap();

        assert_eq!(store.retire(10.0, 800.0, 600.0), 3);
        assert_eq!(store.len(), 1);
        assert!(store.get(keep).is_some());
    }

    #[test]
    fn test_spawn_throttle_bound() {
        let min_spacing = 20.0;
        let mut store = ParticleStore::new(1000, LIFESPAN, min_spacing);
        let interval = 95.0;
        let requests = 200;
        for k in 0..requests {
            let now = 1_000.0 + interval * k as f64 / (requests - 1) as f64;
            store.spawn_at(na::Point2::new(50.0, 50.0), now);
        }
        let bound = (interval / min_spacing).floor() as usize + 1;
        assert!(store.len() <= bound, "{} spawned, bound {}", store.len(), bound);
        assert!(store.len() >= 2);
    }

    #[test]
    fn test_spawn_within_interval_refused() {
        let mut store = store();
        assert!(store.spawn_at(na::Point2::new(1.0, 1.0), 100.0).is_some());
        assert!(store.spawn_at(na::Point2::new(1.0, 1.0), 110.0).is_none());
        assert!(store.spawn_at(na::Point2::new(1.0, 1.0), 120.0).is_none());
        assert!(store.spawn_at(na::Point2::new(1.0, 1.0), 120.5).is_some());
    }

    #[test]
    fn test_spawn_line_ignores_throttle() {
        let mut store = store();
        store.spawn_at(na::Point2::new(1.0, 1.0), 100.0);
        assert_eq!(store.spawn_line(600.0, 30, 101.0), 30);
        assert_eq!(store.len(), 31);

        let ys: Vec<f64> = store.iter().skip(1).map(|(_, p)| p.position.y).collect();
        for pair in ys.windows(2) {
            assert_abs_diff_eq!(pair[1] - pair[0], 20.0, epsilon = 1e-9);
        }
        assert!(store.iter().skip(1).all(|(_, p)| p.position.x == 0.0));
    }

    #[test]
    fn test_capacity_is_hard_limit() {
        let mut store = ParticleStore::new(10, LIFESPAN, 0.0);
        assert_eq!(store.spawn_line(600.0, 30, 0.0), 10);
        assert!(store.is_full());
        assert!(store.spawn_at(na::Point2::new(5.0, 5.0), 1_000.0).is_none());
    }

    #[test]
    fn test_slots_are_reused() {
        let mut store = store();
        let a = store.insert(Particle::new(na::Point2::new(1.0, 1.0), 0.0)).unwrap();
        let b = store.insert(Particle::new(na::Point2::new(2.0, 2.0), 0.0)).unwrap();
        store.remove(a);
        let c = store.insert(Particle::new(na::Point2::new(3.0, 3.0), 0.0)).unwrap();
        assert_eq!(c.index(), a.index());
        assert_eq!(store.get(b).unwrap().position.x, 2.0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_advect_uses_solver_velocity() {
        let params = FlowParameters::new(0.5, Complex::new(-0.1, 0.0), 0.0).unwrap();
        let display = DisplayTransform::centered(100.0, 800.0, 600.0);
        let mut store = store();
        let start = na::Point2::new(20.0, 30.0);
        let id = store.insert(Particle::new(start, 0.0)).unwrap();

        let expected = flow::evaluate_velocity(&params, &display, &start).velocity;
        let dt = 1000.0 / 60.0;
        let stats = store.advect(&params, &display, dt);
        assert_eq!(stats.advected, 1);

        let particle = store.get(id).unwrap();
        assert_eq!(particle.velocity, expected);
        assert_abs_diff_eq!(particle.position.x, start.x + expected.x * dt, epsilon = 1e-12);
        assert_abs_diff_eq!(particle.position.y, start.y + expected.y * dt, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_sample_keeps_previous_velocity() {
        let params = FlowParameters::new(0.5, Complex::new(-0.1, 0.0), 0.0).unwrap();
        let display = DisplayTransform::centered(100.0, 800.0, 600.0);
        let dt = 1000.0 / 60.0;
        let mut store = store();
        // Trailing edge: psi = 2 maps to xi = 1, where the Jacobian vanishes
        let start = na::Point2::new(600.0, 300.0);
        let mut particle = Particle::new(start, 0.0);
        particle.velocity = na::Vector2::new(0.25, 0.0);
        let id = store.insert(particle).unwrap();

        let stats = store.advect(&params, &display, dt);
        assert_eq!(stats.singular, 1);
        let particle = store.get(id).unwrap();
        assert_eq!(particle.velocity, na::Vector2::new(0.25, 0.0));
        assert!(particle.position.x.is_finite() && particle.position.y.is_finite());
        assert_abs_diff_eq!(particle.position.x, 600.0 + 0.25 * dt, epsilon = 1e-9);
        assert_abs_diff_eq!(particle.position.y, 300.0, epsilon = 1e-9);
    }

    #[test]
    fn test_color_at_freestream_is_blue() {
        let mut particle = Particle::new(na::Point2::new(0.0, 0.0), 0.0);
        particle.velocity = na::Vector2::new(0.5, 0.0);
        assert_eq!(particle.color(0.5, 1.0, 0.5), [0, 0, 255]);
    }
}
