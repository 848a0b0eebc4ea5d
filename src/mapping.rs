//! Conformal mapping between the circle plane and the display plane.
//!
//! Forward: psi = xi + 1/xi (Joukowski), then rotate by the negative angle of attack so the
//! airfoil tilts while the freestream stays horizontal on screen, then scale and translate
//! into pixels. Display y grows downward.
//!
//! Inverse: undo the display transform, then solve xi^2 - z*xi + 1 = 0 and keep the root
//! that lies in the flow region outside the circle.

use crate::complex::Complex;
use crate::params::FlowParameters;
use nalgebra as na;

/// Pixels per circle-plane unit and the pixel position of the circle-plane origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTransform {
    pub scale: f64,
    pub origin: na::Point2<f64>,
}

impl DisplayTransform {
    pub fn new(scale: f64, origin: na::Point2<f64>) -> Self {
        DisplayTransform { scale, origin }
    }

    /// Origin at the center of a `width` x `height` viewport.
    pub fn centered(scale: f64, width: f64, height: f64) -> Self {
        DisplayTransform::new(scale, na::Point2::new(width * 0.5, height * 0.5))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseMapping {
    pub xi: Complex,
    /// Neither or both roots lay outside the circle; `xi` is the farther one.
    pub degenerate: bool,
}

pub fn joukowski(xi: Complex) -> Complex {
    xi + xi.recip()
}

pub fn forward_map(params: &FlowParameters, display: &DisplayTransform, xi: Complex) -> na::Point2<f64> {
    let psi = joukowski(xi);
    let (s, c) = (params.sin_alpha(), params.cos_alpha());
    na::Point2::new(
        display.scale * (psi.re * c + psi.im * s) + display.origin.x,
        display.scale * (-psi.re * s + psi.im * c) + display.origin.y,
    )
}

/// Removes the display scale and rotation, giving the physical-plane value z = psi.
pub fn unmap(params: &FlowParameters, display: &DisplayTransform, point: &na::Point2<f64>) -> Complex {
    let x = point.x - display.origin.x;
    let y = point.y - display.origin.y;
    let (s, c, t) = (params.sin_alpha(), params.cos_alpha(), params.tan_alpha());
    let scale = display.scale;

    let unmap_y = (y + x * t) / (scale * (t * s + c));
    let unmap_x = x / (scale * c) - unmap_y * t;
    Complex::new(unmap_x, unmap_y)
}

/// Both preimages of `z` under the Joukowski transform, `[xi+, xi-]`.
pub fn inverse_roots(z: Complex) -> [Complex; 2] {
    let root = (z.square() - 4.0).sqrt();
    [(z + root) * 0.5, (z - root) * 0.5]
}

pub fn inverse_map(params: &FlowParameters, display: &DisplayTransform, point: &na::Point2<f64>) -> InverseMapping {
    let z = unmap(params, display, point);
    let [xi_plus, xi_minus] = inverse_roots(z);

    let center = params.center();
    let r_plus = (xi_plus - center).norm();
    let r_minus = (xi_minus - center).norm();
    let outside_plus = r_plus > params.radius();
    let outside_minus = r_minus > params.radius();

    match (outside_plus, outside_minus) {
        (true, false) => InverseMapping { xi: xi_plus, degenerate: false },
        (false, true) => InverseMapping { xi: xi_minus, degenerate: false },
        _ => InverseMapping {
            xi: if r_plus >= r_minus { xi_plus } else { xi_minus },
            degenerate: true,
        },
    }
}
