use crate::complex::Complex;
use crate::mapping::{self, DisplayTransform};
use crate::params::FlowParameters;
use nalgebra as na;
use std::f64::consts::PI;

/// Distance from the vortex/doublet pole, or magnitude of the mapping Jacobian, below which
/// an evaluation is treated as singular.
const SINGULAR_EPS: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleQuality {
    Regular,
    /// The inverse map could not tell the exterior root apart; the farther one was used.
    Degenerate,
    /// Pole or Jacobian zero; the velocity is forced to zero and must not move a particle.
    Singular,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowSample {
    pub velocity: na::Vector2<f64>,
    pub quality: SampleQuality,
}

impl FlowSample {
    fn singular() -> Self {
        FlowSample {
            velocity: na::Vector2::zeros(),
            quality: SampleQuality::Singular,
        }
    }

    pub fn is_singular(&self) -> bool {
        self.quality == SampleQuality::Singular
    }
}

/// Circulation required by the Kutta condition: the stagnation point sits on the trailing
/// edge, xi = 1.
pub fn circulation(params: &FlowParameters) -> f64 {
    let beta = (params.center().im / params.radius()).asin();
    4.0 * PI * params.freestream() * params.radius() * (params.angle_of_attack() + beta).sin()
}

/// Complex velocity dw/dxi in the circle plane: freestream + vortex - doublet.
pub fn circle_plane_velocity(params: &FlowParameters, xi: Complex) -> Complex {
    let uinf = params.freestream();
    let alpha = params.angle_of_attack();
    let gamma = circulation(params);
    let offset = xi - params.center();

    let freestream = Complex::cis(-alpha) * uinf;
    let vortex = (Complex::I * gamma) / (offset * (2.0 * PI));
    let doublet = (Complex::cis(alpha) * (uinf * params.radius().powi(2))) / offset.square();

    freestream + vortex - doublet
}

/// d(psi)/d(xi) of the Joukowski transform.
pub fn jacobian(xi: Complex) -> Complex {
    Complex::ONE - xi.square().recip()
}

/// Velocity at a display-space point, in display axes.
pub fn evaluate_velocity(params: &FlowParameters, display: &DisplayTransform, point: &na::Point2<f64>) -> FlowSample {
    let mapped = mapping::inverse_map(params, display, point);
    let xi = mapped.xi;

    if !xi.is_finite() || (xi - params.center()).norm() < SINGULAR_EPS {
        return FlowSample::singular();
    }
    let jac = jacobian(xi);
    if !jac.is_finite() || jac.norm() < SINGULAR_EPS {
        return FlowSample::singular();
    }

    // W = u - iv in the physical plane
    let w = circle_plane_velocity(params, xi) / jac;
    let (s, c) = (params.sin_alpha(), params.cos_alpha());
    let u = w.re * c + w.im * s;
    let v = -w.re * s - w.im * c;

    if !u.is_finite() || !v.is_finite() {
        return FlowSample::singular();
    }

    FlowSample {
        velocity: na::Vector2::new(u, v),
        quality: if mapped.degenerate {
            SampleQuality::Degenerate
        } else {
            SampleQuality::Regular
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn display() -> DisplayTransform {
        DisplayTransform::centered(100.0, 800.0, 600.0)
    }

    #[test]
    fn test_kutta_condition_at_trailing_edge() {
        for degrees in [0.0_f64, 10.0] {
            let params = FlowParameters::new(0.5, Complex::new(-0.1, 0.0), degrees.to_radians()).unwrap();
            let trailing_edge = params.center() + (Complex::ONE - params.center());
            let w = circle_plane_velocity(&params, trailing_edge);
            assert_abs_diff_eq!(w.norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_kutta_condition_off_axis_center() {
        let params = FlowParameters::new(1.0, Complex::new(-0.1, 0.15), 5f64.to_radians()).unwrap();
        let w = circle_plane_velocity(&params, Complex::ONE);
        assert_abs_diff_eq!(w.norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_no_penetration_on_circle() {
        let params = FlowParameters::new(0.5, Complex::new(-0.1, 0.05), 0.1).unwrap();
        for k in 0..12 {
            let theta = k as f64 * PI / 6.0 + 0.1;
            let normal = Complex::cis(theta);
            let xi = params.center() + normal * params.radius();
            // dw/dxi = u - iv, so the radial component is Re(W * n)
            let radial = (circle_plane_velocity(&params, xi) * normal).re;
            assert_abs_diff_eq!(radial, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zero_circulation_for_symmetric_section_at_zero_incidence() {
        let params = FlowParameters::new(0.5, Complex::new(-0.1, 0.0), 0.0).unwrap();
        assert_abs_diff_eq!(circulation(&params), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_far_downstream_matches_freestream() {
        let params = FlowParameters::new(0.5, Complex::new(-0.1, 0.0), 0.0).unwrap();
        assert_relative_eq!(params.radius(), 1.1, epsilon = 1e-12);

        let display = display();
        let far = na::Point2::new(display.origin.x + 1.0e6, display.origin.y);
        let sample = evaluate_velocity(&params, &display, &far);
        assert_eq!(sample.quality, SampleQuality::Regular);
        assert_abs_diff_eq!(sample.velocity.x, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(sample.velocity.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_far_field_converges_to_rotated_freestream() {
        let display = display();
        for degrees in [-6.0_f64, 4.0, 10.0] {
            let alpha = degrees.to_radians();
            let params = FlowParameters::new(0.8, Complex::new(-0.1, 0.05), alpha).unwrap();

            // Far away W -> Uinf*exp(-i*alpha); display axes then apply the fixed rotation.
            let w_inf = Complex::cis(-alpha) * params.freestream();
            let expected_u = w_inf.re * alpha.cos() + w_inf.im * alpha.sin();
            let expected_v = -w_inf.re * alpha.sin() - w_inf.im * alpha.cos();

            for &(dx, dy) in &[(1.0e6, 0.0), (-1.0e6, 3.0e5), (2.0e5, -8.0e5)] {
                let p = na::Point2::new(display.origin.x + dx, display.origin.y + dy);
                let sample = evaluate_velocity(&params, &display, &p);
                assert_abs_diff_eq!(sample.velocity.x, expected_u, epsilon = 1e-4);
                assert_abs_diff_eq!(sample.velocity.y, expected_v, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_flow_accelerates_over_thickness() {
        let params = FlowParameters::new(0.5, Complex::new(-0.1, 0.0), 0.0).unwrap();
        let display = display();
        // Just above the thickest part of the section
        let above = na::Point2::new(display.origin.x - 30.0, display.origin.y - 40.0);
        let sample = evaluate_velocity(&params, &display, &above);
        assert_eq!(sample.quality, SampleQuality::Regular);
        assert!(sample.velocity.norm() > params.freestream());
    }

    #[test]
    fn test_singular_points_do_not_produce_nan() {
        let params = FlowParameters::new(0.5, Complex::new(-0.1, 0.0), 0.0).unwrap();
        let display = display();
        // psi = 2 maps to xi = 1, where the Jacobian vanishes
        let trailing_edge = na::Point2::new(display.origin.x + 200.0, display.origin.y);
        let sample = evaluate_velocity(&params, &display, &trailing_edge);
        assert!(sample.velocity.x.is_finite() && sample.velocity.y.is_finite());

        let nan_point = na::Point2::new(f64::NAN, 10.0);
        let sample = evaluate_velocity(&params, &display, &nan_point);
        assert!(sample.is_singular());
        assert_eq!(sample.velocity, na::Vector2::zeros());
    }
}
