use crate::complex::Complex;
use crate::mapping::{self, DisplayTransform};
use crate::params::FlowParameters;
use geo::{Coord, LineString, Polygon, TriangulateEarcut};
use nalgebra as na;
use std::f64::consts::PI;

pub const DEFAULT_OUTLINE_SAMPLES: usize = 360;

/// Circle-plane points equally spaced around the body circle.
pub fn circle_samples(params: &FlowParameters, sample_count: usize) -> impl Iterator<Item = Complex> + '_ {
    let step = 2.0 * PI / sample_count.max(1) as f64;
    (0..sample_count).map(move |i| params.center() + Complex::from_polar(params.radius(), i as f64 * step))
}

/// Closed airfoil polygon in display coordinates.
pub fn generate_outline(params: &FlowParameters, display: &DisplayTransform, sample_count: usize) -> Vec<na::Point2<f64>> {
    circle_samples(params, sample_count)
        .map(|xi| mapping::forward_map(params, display, xi))
        .collect()
}

/// Ear-clipped triangles covering the closed outline. Cambered sections are not star-shaped
/// about any interior point, so a fan cannot fill them.
pub fn fill_triangles(outline: &[na::Point2<f64>]) -> Vec<[na::Point2<f64>; 3]> {
    if outline.len() < 3 {
        return Vec::new();
    }
    let coords: Vec<Coord<f64>> = outline.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
    let triangulation = Polygon::new(LineString::new(coords), Vec::new()).earcut_triangles_raw();
    let vertices = triangulation.vertices;
    let vertex = |i: usize| na::Point2::new(vertices[2 * i], vertices[2 * i + 1]);

    triangulation
        .triangle_indices
        .chunks_exact(3)
        .map(|tri| [vertex(tri[0]), vertex(tri[1]), vertex(tri[2])])
        .collect()
}

/// Last generated outline, keyed on the display transform it was built for.
#[derive(Debug, Default)]
pub struct OutlineCache {
    display: Option<DisplayTransform>,
    points: Vec<na::Point2<f64>>,
}

impl OutlineCache {
    pub fn invalidate(&mut self) {
        self.display = None;
    }

    pub fn is_valid_for(&self, display: &DisplayTransform) -> bool {
        self.display.as_ref() == Some(display)
    }

    pub fn get_or_generate(
        &mut self,
        params: &FlowParameters,
        display: &DisplayTransform,
        sample_count: usize,
    ) -> &[na::Point2<f64>] {
        if !self.is_valid_for(display) {
            self.points = generate_outline(params, display, sample_count);
            self.display = Some(*display);
        }
        &self.points
    }
}
