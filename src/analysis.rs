//! Surface pressure and lift readouts derived from the circle-plane solution.

use crate::complex::Complex;
use crate::flow;
use crate::mapping::joukowski;
use crate::params::FlowParameters;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    /// Position along the chord (physical-plane real axis).
    pub x: f64,
    /// Physical-plane imaginary component; negative values are drawn above the chord on
    /// screen because display y grows downward.
    pub y: f64,
    pub cp: f64,
}

impl SurfacePoint {
    pub fn is_upper(&self) -> bool {
        self.y < 0.0
    }
}

/// Pressure coefficient at `samples` points around the surface. Samples are offset by half a
/// step so none lands on the trailing edge, where speed is the 0/0 limit of the mapping.
pub fn surface_pressure(params: &FlowParameters, samples: usize) -> Vec<SurfacePoint> {
    let step = 2.0 * PI / samples.max(1) as f64;
    let uinf = params.freestream();

    (0..samples)
        .filter_map(|i| {
            let theta = (i as f64 + 0.5) * step;
            let xi = params.center() + Complex::from_polar(params.radius(), theta);
            let speed = flow::circle_plane_velocity(params, xi).norm() / flow::jacobian(xi).norm();
            let psi = joukowski(xi);
            let cp = 1.0 - (speed / uinf).powi(2);
            cp.is_finite().then_some(SurfacePoint { x: psi.re, y: psi.im, cp })
        })
        .collect()
}

/// Extent of the section along the physical real axis.
pub fn chord_length(params: &FlowParameters) -> f64 {
    let (min, max) = (0..720)
        .map(|i| {
            let xi = params.center() + Complex::from_polar(params.radius(), i as f64 * PI / 360.0);
            joukowski(xi).re
        })
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(x), hi.max(x)));
    max - min
}

/// Kutta-Joukowski lift coefficient, Cl = 2*Gamma / (Uinf * chord).
pub fn lift_coefficient(params: &FlowParameters) -> f64 {
    2.0 * flow::circulation(params) / (params.freestream() * chord_length(params))
}

/// Lift per unit span, L' = rho * Uinf * Gamma.
pub fn lift_per_span(params: &FlowParameters, density: f64) -> f64 {
    density * params.freestream() * flow::circulation(params)
}
