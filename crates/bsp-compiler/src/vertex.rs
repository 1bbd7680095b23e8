//! Vertex types carried by polygons.
//!
//! Splitting a polygon creates new vertices on the splitting plane; every
//! attribute a vertex carries has to be interpolated at the exact crossing
//! parameter so that texture coordinates stay continuous across the cut.

use nalgebra::Point3;

/// A polygon vertex: a position plus any attributes that vary linearly
/// across the polygon.
pub trait Vertex: Clone {
    /// The vertex position.
    fn position(&self) -> Point3<f64>;

    /// Linear interpolation between `self` (`t = 0`) and `other` (`t = 1`).
    fn interpolate(&self, other: &Self, t: f64) -> Self;
}

impl Vertex for Point3<f64> {
    #[inline]
    fn position(&self) -> Point3<f64> {
        *self
    }

    #[inline]
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

/// A vertex with texture coordinates, used by rendering polygons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexturedVertex {
    pub position: Point3<f64>,
    pub u: f64,
    pub v: f64,
}

impl TexturedVertex {
    pub fn new(position: Point3<f64>, u: f64, v: f64) -> Self {
        Self { position, u, v }
    }
}

impl Vertex for TexturedVertex {
    #[inline]
    fn position(&self) -> Point3<f64> {
        self.position
    }

    fn interpolate(&self, other: &Self, t: f64) -> Self {
        Self {
            position: self.position + (other.position - self.position) * t,
            u: self.u + (other.u - self.u) * t,
            v: self.v + (other.v - self.v) * t,
        }
    }
}
