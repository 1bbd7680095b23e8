//! Polygon cutting/splitting operations for BSP compilation.

use crate::{Classification, Plane3D, PlaneSide, Polygon, Vertex, PLANE_EPSILON};

/// Trait for geometry that can be cut by a plane.
pub trait Cuttable: Sized {
    /// Splits the geometry into the parts in front of and behind a plane.
    ///
    /// Vertices on the plane go to both parts, and every edge that crosses
    /// the plane contributes an interpolated vertex to both parts.
    /// Degenerate parts (fewer than three distinct vertices or no area)
    /// are discarded.
    fn split(&self, plane: &Plane3D) -> (Option<Self>, Option<Self>);

    /// Cuts the geometry by a plane.
    ///
    /// Returns `(front, back)`. By classification:
    ///
    /// - **Front**: `(Some(self), None)`
    /// - **Back**: `(None, Some(self))`
    /// - **Coplanar**: routed by facing direction, front if the geometry
    ///   faces the same way as the plane
    /// - **Straddling**: `split`
    fn cut(&self, plane: &Plane3D) -> (Option<Self>, Option<Self>);

    /// Keeps only the part of the geometry on one side of a plane.
    ///
    /// Coplanar geometry is always kept. With `PlaneSide::OnPlane` nothing
    /// but coplanar geometry survives.
    fn clip(&self, plane: &Plane3D, keep: PlaneSide) -> Option<Self>;
}

impl<V: Vertex, A: Clone> Cuttable for Polygon<V, A> {
    fn split(&self, plane: &Plane3D) -> (Option<Self>, Option<Self>) {
        split_polygon(self, plane)
    }

    fn cut(&self, plane: &Plane3D) -> (Option<Self>, Option<Self>) {
        match self.classify(plane) {
            Classification::Front => (Some(self.clone()), None),
            Classification::Back => (None, Some(self.clone())),
            Classification::Coplanar => {
                if self.faces_same_direction(plane) {
                    (Some(self.clone()), None)
                } else {
                    (None, Some(self.clone()))
                }
            }
            Classification::Straddling => split_polygon(self, plane),
        }
    }

    fn clip(&self, plane: &Plane3D, keep: PlaneSide) -> Option<Self> {
        match (self.classify(plane), keep) {
            (Classification::Coplanar, _) => Some(self.clone()),
            (_, PlaneSide::OnPlane) => None,
            (Classification::Front, PlaneSide::Front) => Some(self.clone()),
            (Classification::Back, PlaneSide::Back) => Some(self.clone()),
            (Classification::Front, PlaneSide::Back) => None,
            (Classification::Back, PlaneSide::Front) => None,
            (Classification::Straddling, PlaneSide::Front) => split_polygon(self, plane).0,
            (Classification::Straddling, PlaneSide::Back) => split_polygon(self, plane).1,
        }
    }
}

/// Splits a polygon into front and back parts.
///
/// Uses a variant of the Sutherland-Hodgman algorithm:
/// walks the polygon edges and builds two vertex lists,
/// adding interpolated vertices where edges cross the plane.
fn split_polygon<V: Vertex, A: Clone>(
    polygon: &Polygon<V, A>,
    plane: &Plane3D,
) -> (Option<Polygon<V, A>>, Option<Polygon<V, A>>) {
    let vertices = polygon.vertices();
    let n = vertices.len();

    let mut front_verts = Vec::with_capacity(n + 1);
    let mut back_verts = Vec::with_capacity(n + 1);

    // Classify all vertices upfront
    let distances: Vec<f64> = vertices
        .iter()
        .map(|v| plane.signed_distance(&v.position()))
        .collect();
    let sides: Vec<PlaneSide> = distances
        .iter()
        .map(|&d| Plane3D::side_of_distance(d, PLANE_EPSILON))
        .collect();

    for i in 0..n {
        let j = (i + 1) % n;
        let current = &vertices[i];

        match sides[i] {
            PlaneSide::Front => front_verts.push(current.clone()),
            PlaneSide::Back => back_verts.push(current.clone()),
            PlaneSide::OnPlane => {
                front_verts.push(current.clone());
                back_verts.push(current.clone());
            }
        }

        let crosses = matches!(
            (sides[i], sides[j]),
            (PlaneSide::Front, PlaneSide::Back) | (PlaneSide::Back, PlaneSide::Front)
        );

        if crosses {
            let t = distances[i] / (distances[i] - distances[j]);
            let crossing = current.interpolate(&vertices[j], t);
            front_verts.push(crossing.clone());
            back_verts.push(crossing);
        }
    }

    let front = if sides.contains(&PlaneSide::Front) {
        Polygon::from_loop(front_verts, polygon.aux().clone())
    } else {
        None
    };
    let back = if sides.contains(&PlaneSide::Back) {
        Polygon::from_loop(back_verts, polygon.aux().clone())
    } else {
        None
    };

    (front, back)
}
