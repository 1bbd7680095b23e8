//! Plane representation and operations for BSP compilation.

use nalgebra::{Point3, Vector3};

/// Default epsilon for plane classification.
/// Points within this distance of the plane are considered "on" the plane.
pub const PLANE_EPSILON: f64 = 1e-5;

/// Which side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Point is in front of the plane (positive side of normal)
    Front,
    /// Point is behind the plane (negative side of normal)
    Back,
    /// Point lies on the plane (within epsilon tolerance)
    OnPlane,
}

impl PlaneSide {
    /// The opposite side. `OnPlane` stays `OnPlane`.
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            PlaneSide::Front => PlaneSide::Back,
            PlaneSide::Back => PlaneSide::Front,
            PlaneSide::OnPlane => PlaneSide::OnPlane,
        }
    }
}

/// Classification of a polygon relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// No vertex is behind the plane and at least one is in front
    Front,
    /// No vertex is in front of the plane and at least one is behind
    Back,
    /// All vertices are on the plane
    Coplanar,
    /// Vertices are strictly on both sides
    Straddling,
}

/// A plane in 3D space, represented as `normal · point = offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane3D {
    normal: Vector3<f64>,
    offset: f64,
}

impl Plane3D {
    /// Creates a new plane from a normal vector and offset.
    /// The normal will be normalized automatically.
    ///
    /// Returns `None` if the normal has (near) zero length.
    pub fn new(normal: Vector3<f64>, offset: f64) -> Option<Self> {
        let norm = normal.norm();
        if norm <= f64::EPSILON {
            return None;
        }
        // Already unit length: keep the values bit-for-bit so that saved
        // planes load back unchanged.
        if (norm - 1.0).abs() <= 4.0 * f64::EPSILON {
            return Some(Self { normal, offset });
        }
        Some(Self {
            normal: normal / norm,
            offset: offset / norm,
        })
    }

    /// Creates a plane from a point on the plane and a normal vector.
    ///
    /// Returns `None` if the normal has (near) zero length.
    pub fn from_point_and_normal(point: Point3<f64>, normal: Vector3<f64>) -> Option<Self> {
        let norm = normal.norm();
        if norm <= f64::EPSILON {
            return None;
        }
        let unit_normal = normal / norm;
        let offset = unit_normal.dot(&point.coords);
        Some(Self {
            normal: unit_normal,
            offset,
        })
    }

    /// Creates a plane from three points.
    /// The normal direction follows the right-hand rule: (b - a) × (c - a).
    ///
    /// Returns `None` if the points are collinear (or nearly so).
    pub fn from_three_points(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Option<Self> {
        let normal = (b - a).cross(&(c - a));
        Self::from_point_and_normal(a, normal)
    }

    /// Returns the unit normal vector of the plane.
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// Returns the signed distance from the origin to the plane along the normal.
    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Computes the signed distance from a point to the plane.
    /// Positive in front (the side the normal points to), negative behind.
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.offset
    }

    /// Classifies which side of the plane a point lies on.
    /// Uses the default `PLANE_EPSILON` tolerance.
    #[inline]
    pub fn classify_point(&self, point: &Point3<f64>) -> PlaneSide {
        self.classify_point_with_epsilon(point, PLANE_EPSILON)
    }

    /// Classifies which side of the plane a point lies on, with a custom epsilon.
    pub fn classify_point_with_epsilon(&self, point: &Point3<f64>, epsilon: f64) -> PlaneSide {
        Self::side_of_distance(self.signed_distance(point), epsilon)
    }

    /// Maps a signed distance to a side.
    #[inline]
    pub(crate) fn side_of_distance(dist: f64, epsilon: f64) -> PlaneSide {
        if dist > epsilon {
            PlaneSide::Front
        } else if dist < -epsilon {
            PlaneSide::Back
        } else {
            PlaneSide::OnPlane
        }
    }

    /// Returns a new plane with the normal flipped (facing the opposite direction).
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
        }
    }

    /// Projects a point onto the plane (finds the closest point on the plane).
    #[inline]
    pub fn project_point(&self, point: &Point3<f64>) -> Point3<f64> {
        point - self.normal * self.signed_distance(point)
    }

    /// Returns the point on the plane closest to the origin.
    #[inline]
    pub fn anchor(&self) -> Point3<f64> {
        Point3::from(self.normal * self.offset)
    }

    /// Returns two unit vectors spanning the plane, such that
    /// `u × v == normal`.
    pub fn basis(&self) -> (Vector3<f64>, Vector3<f64>) {
        // Pick the world axis least aligned with the normal.
        let n = self.normal;
        let axis = if n.x.abs() <= n.y.abs() && n.x.abs() <= n.z.abs() {
            Vector3::x()
        } else if n.y.abs() <= n.z.abs() {
            Vector3::y()
        } else {
            Vector3::z()
        };
        let u = axis.cross(&n).normalize();
        let v = n.cross(&u);
        (u, v)
    }

    /// Returns true if both planes describe the same oriented plane within
    /// tolerance.
    pub fn approx_eq(&self, other: &Plane3D) -> bool {
        (self.normal - other.normal).norm() < PLANE_EPSILON
            && (self.offset - other.offset).abs() < PLANE_EPSILON
    }

    /// Computes the intersection of a line segment with the plane.
    ///
    /// Returns `Some((t, point))` where `t` is the interpolation parameter
    /// (0.0 = start, 1.0 = end). Returns `None` if the segment is parallel to
    /// the plane or doesn't reach it.
    pub fn intersect_segment(
        &self,
        start: &Point3<f64>,
        end: &Point3<f64>,
    ) -> Option<(f64, Point3<f64>)> {
        let direction = end - start;
        let denom = self.normal.dot(&direction);

        // Segment is parallel to plane
        if denom.abs() < f64::EPSILON {
            return None;
        }

        let t = (self.offset - self.normal.dot(&start.coords)) / denom;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }

        Some((t, start + direction * t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground() -> Plane3D {
        Plane3D::new(Vector3::new(0.0, 0.0, 2.0), 0.0).unwrap()
    }

    #[test]
    fn new_normalizes_normal_and_offset() {
        let plane = Plane3D::new(Vector3::new(0.0, 3.0, 0.0), 6.0).unwrap();
        assert!((plane.normal() - Vector3::y()).norm() < 1e-12);
        assert!((plane.offset() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn zero_normal_is_rejected() {
        assert!(Plane3D::new(Vector3::zeros(), 1.0).is_none());
        assert!(
            Plane3D::from_three_points(
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            )
            .is_none()
        );
    }

    #[test]
    fn classify_point_with_tolerance() {
        let plane = ground();
        assert_eq!(plane.classify_point(&Point3::new(0.0, 0.0, 1.0)), PlaneSide::Front);
        assert_eq!(plane.classify_point(&Point3::new(0.0, 0.0, -1.0)), PlaneSide::Back);
        assert_eq!(
            plane.classify_point(&Point3::new(5.0, 5.0, PLANE_EPSILON / 2.0)),
            PlaneSide::OnPlane
        );
    }

    #[test]
    fn three_points_follow_right_hand_rule() {
        let plane = Plane3D::from_three_points(
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        )
        .unwrap();
        assert!((plane.normal() - Vector3::z()).norm() < 1e-12);
        assert!((plane.offset() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn flipped_swaps_sides() {
        let plane = ground().flipped();
        assert_eq!(plane.classify_point(&Point3::new(0.0, 0.0, 1.0)), PlaneSide::Back);
    }

    #[test]
    fn basis_is_orthonormal_and_right_handed() {
        let plane = Plane3D::new(Vector3::new(1.0, 2.0, -0.5), 3.0).unwrap();
        let (u, v) = plane.basis();
        assert!(u.dot(&v).abs() < 1e-12);
        assert!(u.dot(&plane.normal()).abs() < 1e-12);
        assert!((u.cross(&v) - plane.normal()).norm() < 1e-12);
    }

    #[test]
    fn segment_intersection() {
        let plane = ground();
        let (t, p) = plane
            .intersect_segment(&Point3::new(0.0, 0.0, -1.0), &Point3::new(0.0, 0.0, 3.0))
            .unwrap();
        assert!((t - 0.25).abs() < 1e-12);
        assert!(p.z.abs() < 1e-12);
        assert!(
            plane
                .intersect_segment(&Point3::new(0.0, 0.0, 1.0), &Point3::new(1.0, 0.0, 1.0))
                .is_none()
        );
    }
}
