//! Generic convex polygon representation for BSP compilation.

use nalgebra::{Point3, Vector3};

use crate::error::{CompileError, CompileResult};
use crate::{Classification, Plane3D, PlaneSide, TexturedVertex, Vertex, PLANE_EPSILON};

/// Polygons with less area than this are considered degenerate.
pub const MIN_POLYGON_AREA: f64 = 1e-6;

/// A convex polygon in 3D space, defined by an ordered list of vertices and
/// a polygon-level auxiliary value.
///
/// Vertices should be coplanar and in counter-clockwise winding order
/// when viewed from the front (the direction the normal points).
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon<V = Point3<f64>, A = ()> {
    vertices: Vec<V>,
    aux: A,
}

/// Texture name attached to a rendering polygon.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextureName(pub String);

/// Auxiliary data of a collision polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionInfo {
    pub walkable: bool,
}

/// A textured polygon, as used for rendering.
pub type RenderingPolygon = Polygon<TexturedVertex, TextureName>;

/// A collision polygon.
pub type CollisionPolygon = Polygon<Point3<f64>, CollisionInfo>;

impl<V: Vertex, A: Clone> Polygon<V, A> {
    /// Creates a new polygon from a list of vertices.
    ///
    /// # Panics (debug builds only)
    /// Panics if fewer than 3 vertices are provided.
    pub fn new(vertices: Vec<V>, aux: A) -> Self {
        debug_assert!(
            vertices.len() >= 3,
            "Polygon must have at least 3 vertices"
        );
        Self { vertices, aux }
    }

    /// Builds a polygon from a raw vertex loop, dropping consecutive
    /// duplicate vertices. Returns `None` if the result is degenerate.
    pub fn from_loop(vertices: Vec<V>, aux: A) -> Option<Self> {
        let mut cleaned: Vec<V> = Vec::with_capacity(vertices.len());
        for v in vertices {
            let duplicate = cleaned
                .last()
                .is_some_and(|last| (last.position() - v.position()).norm() <= PLANE_EPSILON);
            if !duplicate {
                cleaned.push(v);
            }
        }
        while cleaned.len() > 1 {
            let first = cleaned[0].position();
            let last = cleaned[cleaned.len() - 1].position();
            if (first - last).norm() <= PLANE_EPSILON {
                cleaned.pop();
            } else {
                break;
            }
        }

        if cleaned.len() < 3 {
            return None;
        }
        let polygon = Self {
            vertices: cleaned,
            aux,
        };
        if polygon.area() < MIN_POLYGON_AREA {
            None
        } else {
            Some(polygon)
        }
    }

    /// Returns the vertices of the polygon.
    #[inline]
    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    /// Returns the polygon-level auxiliary data.
    #[inline]
    pub fn aux(&self) -> &A {
        &self.aux
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if the polygon has no vertices (always false for valid polygons).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterates over the vertex positions.
    pub fn positions(&self) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.vertices.iter().map(Vertex::position)
    }

    /// Iterates over the edges as `(start, end)` position pairs.
    pub fn edges(&self) -> impl Iterator<Item = (Point3<f64>, Point3<f64>)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| {
            (
                self.vertices[i].position(),
                self.vertices[(i + 1) % n].position(),
            )
        })
    }

    /// Computes the (unnormalized) normal vector of the polygon using
    /// Newell's method. Its length is twice the polygon's area.
    pub fn normal(&self) -> Vector3<f64> {
        let mut normal = Vector3::zeros();
        for (a, b) in self.edges() {
            normal.x += (a.y - b.y) * (a.z + b.z);
            normal.y += (a.z - b.z) * (a.x + b.x);
            normal.z += (a.x - b.x) * (a.y + b.y);
        }
        normal
    }

    /// Computes the unit normal vector of the polygon.
    ///
    /// Returns `None` if the polygon has no area.
    pub fn unit_normal(&self) -> Option<Vector3<f64>> {
        let n = self.normal();
        let len = n.norm();
        if len > f64::EPSILON {
            Some(n / len)
        } else {
            None
        }
    }

    /// Returns the plane that this polygon lies on, or `None` if the
    /// polygon is degenerate.
    pub fn plane(&self) -> Option<Plane3D> {
        Plane3D::from_point_and_normal(self.centroid(), self.unit_normal()?)
    }

    /// Computes the area of the polygon.
    pub fn area(&self) -> f64 {
        self.normal().norm() * 0.5
    }

    /// Computes the centroid (vertex average) of the polygon.
    pub fn centroid(&self) -> Point3<f64> {
        let sum: Vector3<f64> = self.positions().map(|p| p.coords).sum();
        Point3::from(sum / self.vertices.len() as f64)
    }

    /// Classifies this polygon relative to a plane.
    ///
    /// Returns:
    /// - `Coplanar` if all vertices lie on the plane
    /// - `Front` if no vertex is behind the plane
    /// - `Back` if no vertex is in front of the plane
    /// - `Straddling` if vertices are strictly on both sides
    pub fn classify(&self, plane: &Plane3D) -> Classification {
        let mut front = 0;
        let mut back = 0;

        for position in self.positions() {
            match plane.classify_point(&position) {
                PlaneSide::Front => front += 1,
                PlaneSide::Back => back += 1,
                PlaneSide::OnPlane => {}
            }
        }

        match (front, back) {
            (0, 0) => Classification::Coplanar,
            (_, 0) => Classification::Front,
            (0, _) => Classification::Back,
            _ => Classification::Straddling,
        }
    }

    /// Returns true if the polygon faces the same way as the plane's normal.
    pub fn faces_same_direction(&self, plane: &Plane3D) -> bool {
        self.normal().dot(&plane.normal()) > 0.0
    }

    /// Returns the polygon with its winding (and hence its normal) reversed.
    pub fn flipped(&self) -> Self {
        let mut vertices = self.vertices.clone();
        vertices.reverse();
        Self {
            vertices,
            aux: self.aux.clone(),
        }
    }

    /// Replaces the auxiliary data.
    pub fn with_aux<B: Clone>(self, aux: B) -> Polygon<V, B> {
        Polygon {
            vertices: self.vertices,
            aux,
        }
    }

    /// Checks that the polygon is usable as compiler input: at least three
    /// vertices, a non-zero area, planar and convex.
    pub fn validate(&self) -> CompileResult<()> {
        if self.vertices.len() < 3 {
            return Err(CompileError::geometry(format!(
                "polygon has {} vertices, at least 3 are required",
                self.vertices.len()
            )));
        }
        let plane = match self.plane() {
            Some(plane) if self.area() >= MIN_POLYGON_AREA => plane,
            _ => return Err(CompileError::geometry("polygon has no area")),
        };

        // Must agree with `classify`, or a polygon could straddle its own plane.
        if let Some(p) = self
            .positions()
            .find(|p| plane.signed_distance(p).abs() > PLANE_EPSILON)
        {
            return Err(CompileError::geometry(format!(
                "polygon is not planar (vertex {p} is off its plane)"
            )));
        }

        let n = self.vertices.len();
        let normal = plane.normal();
        for i in 0..n {
            let a = self.vertices[i].position();
            let b = self.vertices[(i + 1) % n].position();
            let c = self.vertices[(i + 2) % n].position();
            if (b - a).cross(&(c - b)).dot(&normal) < -PLANE_EPSILON {
                return Err(CompileError::geometry(format!(
                    "polygon is not convex at vertex {b}"
                )));
            }
        }
        Ok(())
    }
}

impl<V: Vertex, A: Clone> TryFrom<&Polygon<V, A>> for Plane3D {
    type Error = CompileError;

    fn try_from(polygon: &Polygon<V, A>) -> CompileResult<Self> {
        polygon
            .plane()
            .ok_or_else(|| CompileError::geometry("polygon has no plane"))
    }
}
