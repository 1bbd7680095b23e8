//! Antipenumbra clipping.
//!
//! Looking through a source portal and then a target portal, everything
//! that can be seen beyond the target lies inside a convex region bounded
//! by separating planes. Each such plane passes through an edge of one
//! portal and a vertex of the other and has the two portals on opposite
//! sides.

use nalgebra::Point3;

use crate::{Classification, Cuttable, Plane3D, PlaneSide, Polygon, Vertex};

/// The region visible through a source portal and then a target portal.
#[derive(Debug, Clone)]
pub struct Antipenumbra {
    planes: Vec<Plane3D>,
}

impl Antipenumbra {
    pub fn new<V: Vertex, A: Clone, W: Vertex, B: Clone>(
        source: &Polygon<V, A>,
        target: &Polygon<W, B>,
    ) -> Self {
        let source_points: Vec<Point3<f64>> = source.positions().collect();
        let target_points: Vec<Point3<f64>> = target.positions().collect();

        let mut planes: Vec<Plane3D> = Vec::new();
        let pairings = [
            (&source_points, &target_points),
            (&target_points, &source_points),
        ];
        for (edge_points, vertex_points) in pairings {
            let n = edge_points.len();
            for i in 0..n {
                let (a, b) = (edge_points[i], edge_points[(i + 1) % n]);
                for c in vertex_points {
                    let Some(plane) = Plane3D::from_three_points(a, b, *c) else {
                        continue;
                    };
                    let Some(plane) = separating(plane, source, target) else {
                        continue;
                    };
                    if !planes.iter().any(|p| p.approx_eq(&plane)) {
                        planes.push(plane);
                    }
                }
            }
        }
        Self { planes }
    }

    /// The separating planes, each facing towards the target portal.
    pub fn planes(&self) -> &[Plane3D] {
        &self.planes
    }

    /// Keeps the part of `polygon` on the target's side of every plane.
    /// Returns `None` if nothing (or only a sliver) survives.
    pub fn clip<V: Vertex, A: Clone>(&self, polygon: &Polygon<V, A>) -> Option<Polygon<V, A>> {
        let mut clipped = polygon.clone();
        for plane in &self.planes {
            clipped = clipped.clip(plane, PlaneSide::Front)?;
        }
        Some(clipped)
    }
}

/// Orients `plane` so the target is in front, or returns `None` if it does
/// not put the two portals on opposite sides.
fn separating<V: Vertex, A: Clone, W: Vertex, B: Clone>(
    plane: Plane3D,
    source: &Polygon<V, A>,
    target: &Polygon<W, B>,
) -> Option<Plane3D> {
    match (source.classify(&plane), target.classify(&plane)) {
        (Classification::Back, Classification::Front) => Some(plane),
        (Classification::Front, Classification::Back) => Some(plane.flipped()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A unit square on the plane `x = x`, starting at height `y`.
    fn make_square(x: f64, y: f64) -> Polygon {
        Polygon::new(
            vec![
                Point3::new(x, y, 0.0),
                Point3::new(x, y + 1.0, 0.0),
                Point3::new(x, y + 1.0, 1.0),
                Point3::new(x, y, 1.0),
            ],
            (),
        )
    }

    #[test]
    fn planes_separate_the_portals() {
        let source = make_square(0.0, 0.0);
        let target = make_square(1.0, 0.0);
        let antipenumbra = Antipenumbra::new(&source, &target);
        assert!(!antipenumbra.planes().is_empty());
        for plane in antipenumbra.planes() {
            assert_eq!(target.classify(plane), Classification::Front);
            assert_eq!(source.classify(plane), Classification::Back);
        }
    }

    #[test]
    fn clip_keeps_the_visible_cone() {
        let antipenumbra = Antipenumbra::new(&make_square(0.0, 0.0), &make_square(1.0, 0.0));

        // Straight ahead: fully visible.
        let ahead = make_square(2.0, 0.0);
        let kept = antipenumbra.clip(&ahead).unwrap();
        assert!((kept.area() - 1.0).abs() < 1e-9);

        // Beyond the target the cone widens to y in [-1, 2].
        let partly = make_square(2.0, 1.5);
        let kept = antipenumbra.clip(&partly).unwrap();
        assert!((kept.area() - 0.5).abs() < 1e-9);

        // Far off to the side: hidden.
        assert!(antipenumbra.clip(&make_square(2.0, 10.0)).is_none());
    }
}
