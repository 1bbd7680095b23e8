//! Closed box levels shared by the integration tests.

#![allow(dead_code)]

use bsp_compiler::Polygon;
use nalgebra::{Point3, Vector3};

/// A quad `origin, origin + u, origin + u + v, origin + v`. It faces along
/// `u × v`.
pub fn make_quad(origin: [f64; 3], u: [f64; 3], v: [f64; 3]) -> Polygon {
    let o = Point3::from(origin);
    let u = Vector3::from(u);
    let v = Vector3::from(v);
    Polygon::new(vec![o, o + u, o + u + v, o + v], ())
}

/// The six inward-facing faces of an axis-aligned box.
pub fn room(min: [f64; 3], max: [f64; 3]) -> Vec<Polygon> {
    let [x0, y0, z0] = min;
    let [x1, y1, z1] = max;
    let (dx, dy, dz) = (x1 - x0, y1 - y0, z1 - z0);
    vec![
        make_quad([x0, y0, z0], [0.0, dy, 0.0], [0.0, 0.0, dz]),
        make_quad([x1, y0, z0], [0.0, 0.0, dz], [0.0, dy, 0.0]),
        make_quad([x0, y0, z0], [0.0, 0.0, dz], [dx, 0.0, 0.0]),
        make_quad([x0, y1, z0], [dx, 0.0, 0.0], [0.0, 0.0, dz]),
        make_quad([x0, y0, z0], [dx, 0.0, 0.0], [0.0, dy, 0.0]),
        make_quad([x0, y0, z1], [0.0, dy, 0.0], [dx, 0.0, 0.0]),
    ]
}

/// Room A (`0 <= x <= 10`) and room B (`12 <= x <= 22`), both spanning
/// `0..10` in y and z, joined by a full-height passage at `4 <= y <= 6`.
pub fn two_rooms_with_doorway() -> Vec<Polygon> {
    vec![
        // Room A.
        make_quad([0.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0, 0.0, 10.0]),
        make_quad([0.0, 0.0, 0.0], [0.0, 0.0, 10.0], [10.0, 0.0, 0.0]),
        make_quad([0.0, 10.0, 0.0], [10.0, 0.0, 0.0], [0.0, 0.0, 10.0]),
        make_quad([0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [0.0, 10.0, 0.0]),
        make_quad([0.0, 0.0, 10.0], [0.0, 10.0, 0.0], [10.0, 0.0, 0.0]),
        make_quad([10.0, 0.0, 0.0], [0.0, 0.0, 10.0], [0.0, 4.0, 0.0]),
        make_quad([10.0, 6.0, 0.0], [0.0, 0.0, 10.0], [0.0, 4.0, 0.0]),
        // Passage.
        make_quad([10.0, 4.0, 0.0], [0.0, 0.0, 10.0], [2.0, 0.0, 0.0]),
        make_quad([10.0, 6.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 10.0]),
        make_quad([10.0, 4.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]),
        make_quad([10.0, 4.0, 10.0], [0.0, 2.0, 0.0], [2.0, 0.0, 0.0]),
        // Room B.
        make_quad([12.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 10.0]),
        make_quad([12.0, 6.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 10.0]),
        make_quad([22.0, 0.0, 0.0], [0.0, 0.0, 10.0], [0.0, 10.0, 0.0]),
        make_quad([12.0, 0.0, 0.0], [0.0, 0.0, 10.0], [10.0, 0.0, 0.0]),
        make_quad([12.0, 10.0, 0.0], [10.0, 0.0, 0.0], [0.0, 0.0, 10.0]),
        make_quad([12.0, 0.0, 0.0], [10.0, 0.0, 0.0], [0.0, 10.0, 0.0]),
        make_quad([12.0, 0.0, 10.0], [0.0, 10.0, 0.0], [10.0, 0.0, 0.0]),
    ]
}

/// The same two rooms with no passage between them.
pub fn two_sealed_rooms() -> Vec<Polygon> {
    let mut polygons = room([0.0, 0.0, 0.0], [10.0, 10.0, 10.0]);
    polygons.extend(room([12.0, 0.0, 0.0], [22.0, 10.0, 10.0]));
    polygons
}

pub fn room_a_center() -> Point3<f64> {
    Point3::new(5.0, 5.0, 5.0)
}

pub fn passage_center() -> Point3<f64> {
    Point3::new(11.0, 5.0, 5.0)
}

pub fn room_b_center() -> Point3<f64> {
    Point3::new(17.0, 5.0, 5.0)
}
