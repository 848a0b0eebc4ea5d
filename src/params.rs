use crate::complex::Complex;
use crate::error::ParameterError;
use std::f64::consts::FRAC_PI_2;

/// Smallest circle radius accepted; anything tighter collapses the airfoil onto a point.
pub const MIN_RADIUS: f64 = 1e-6;

/// Flow parameters shared by the mapper, the solver and the outline generator.
///
/// The radius is always derived so that the circle passes through (1, 0) in the circle
/// plane, which is what gives the mapped airfoil its sharp trailing edge.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowParameters {
    freestream: f64,
    center: Complex,
    angle_of_attack: f64,
    radius: f64,
    sin_alpha: f64,
    cos_alpha: f64,
    tan_alpha: f64,
}

impl FlowParameters {
    pub fn new(freestream: f64, center: Complex, angle_of_attack: f64) -> Result<Self, ParameterError> {
        if !freestream.is_finite() || freestream <= 0.0 {
            return Err(ParameterError::InvalidFreestream(freestream));
        }
        if !center.is_finite() {
            return Err(ParameterError::InvalidCenter(center.re, center.im));
        }
        if !angle_of_attack.is_finite() || angle_of_attack.abs() >= FRAC_PI_2 {
            return Err(ParameterError::InvalidAngle(angle_of_attack));
        }

        let radius = ((1.0 - center.re).powi(2) + center.im.powi(2)).sqrt();
        if radius < MIN_RADIUS {
            return Err(ParameterError::DegenerateRadius(radius));
        }

        Ok(FlowParameters {
            freestream,
            center,
            angle_of_attack,
            radius,
            sin_alpha: angle_of_attack.sin(),
            cos_alpha: angle_of_attack.cos(),
            tan_alpha: angle_of_attack.tan(),
        })
    }

    pub fn freestream(&self) -> f64 {
        self.freestream
    }

    pub fn center(&self) -> Complex {
        self.center
    }

    pub fn angle_of_attack(&self) -> f64 {
        self.angle_of_attack
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn sin_alpha(&self) -> f64 {
        self.sin_alpha
    }

    pub fn cos_alpha(&self) -> f64 {
        self.cos_alpha
    }

    pub fn tan_alpha(&self) -> f64 {
        self.tan_alpha
    }
}

impl Default for FlowParameters {
    fn default() -> Self {
        let center = Complex::new(-0.1, 0.0);
        FlowParameters {
            freestream: 0.5,
            center,
            angle_of_attack: 0.0,
            radius: ((1.0 - center.re).powi(2) + center.im.powi(2)).sqrt(),
            sin_alpha: 0.0,
            cos_alpha: 1.0,
            tan_alpha: 0.0,
        }
    }
}
