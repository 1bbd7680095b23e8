//! Portal generation from a compiled tree.

use std::time::Instant;

use log::{debug, info, warn};
use nalgebra::{Point3, Vector3};

use crate::bsp::{BspNode, BspTree, NodeIndex};
use crate::{Classification, Cuttable, Plane3D, PlaneSide, Polygon, Vertex};

use super::{Portal, PortalInfo, PortalSet};

/// Default enlargement of the level bounds.
pub const DEFAULT_PORTAL_MARGIN: f64 = 64.0;

/// Settings for portal generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortalOptions {
    /// How far the level bounding box is enlarged on every side before
    /// splitter planes are clipped to it.
    pub margin: f64,
}

impl Default for PortalOptions {
    fn default() -> Self {
        Self {
            margin: DEFAULT_PORTAL_MARGIN,
        }
    }
}

/// Finds the portals between the empty leaves of `tree`.
///
/// For each branch a polygon covering its whole splitter plane (within the
/// level bounds) is cut down to the branch's cell, pushed through the front
/// subtree and then the back subtree. Every piece that ends up between two
/// empty leaves is a portal.
pub fn generate_portals<V: Vertex, A: Clone>(
    tree: &BspTree,
    polygons: &[Polygon<V, A>],
    options: &PortalOptions,
) -> PortalSet {
    let start = Instant::now();
    let empty_leaf_count = tree.empty_leaf_count();

    let Some((min, max)) = bounds(polygons) else {
        warn!("No polygons to bound the level; no portals generated");
        return PortalSet::new(empty_leaf_count, Vec::new());
    };
    let margin = Vector3::repeat(options.margin.max(0.0));
    let (min, max) = (min - margin, max + margin);
    let box_planes = box_planes(&min, &max);

    let parents = tree.parents();
    let mut portals = Vec::new();

    for (index, node) in tree.nodes().iter().enumerate() {
        let BspNode::Branch {
            splitter,
            front,
            back,
        } = node
        else {
            continue;
        };

        let fragment = plane_polygon(splitter, &min, &max)
            .and_then(|polygon| clip_to_box(polygon, &box_planes))
            .and_then(|polygon| clip_to_cell(tree, &parents, index, polygon));
        let Some(fragment) = fragment else {
            continue;
        };

        let normal = splitter.normal();
        let mut front_pieces = Vec::new();
        push_down(tree, *front, fragment, &normal, &mut front_pieces);

        for (piece, front_leaf) in front_pieces {
            let mut back_pieces = Vec::new();
            push_down(tree, *back, piece, &(-normal), &mut back_pieces);
            for (piece, back_leaf) in back_pieces {
                if back_leaf != front_leaf {
                    portals.push(piece.with_aux(PortalInfo::new(front_leaf, back_leaf)));
                }
            }
        }
    }

    info!(
        "Generated {} portals between {} empty leaves in {:.2}ms",
        portals.len(),
        empty_leaf_count,
        start.elapsed().as_secs_f64() * 1000.0
    );
    if log::log_enabled!(log::Level::Debug) {
        for leaf in 0..empty_leaf_count {
            let count = portals
                .iter()
                .filter(|p: &&Portal| p.aux().front_leaf == leaf || p.aux().back_leaf == leaf)
                .count();
            debug!("Leaf {leaf}: {count} portals");
        }
    }

    PortalSet::new(empty_leaf_count, portals)
}

/// Axis-aligned bounds of every polygon vertex.
fn bounds<V: Vertex, A: Clone>(polygons: &[Polygon<V, A>]) -> Option<(Point3<f64>, Point3<f64>)> {
    let mut positions = polygons.iter().flat_map(|p| p.positions());
    let first = positions.next()?;
    Some(positions.fold((first, first), |(min, max), p| {
        (min.inf(&p), max.sup(&p))
    }))
}

/// The six inward-facing planes of a box.
fn box_planes(min: &Point3<f64>, max: &Point3<f64>) -> Vec<Plane3D> {
    let mut planes = Vec::with_capacity(6);
    for axis in 0..3 {
        let mut normal = Vector3::zeros();
        normal[axis] = 1.0;
        planes.extend(Plane3D::new(normal, min[axis]));
        planes.extend(Plane3D::new(-normal, -max[axis]));
    }
    planes
}

/// A square on `plane`, centered on the box center's projection and large
/// enough to cover the box.
fn plane_polygon(plane: &Plane3D, min: &Point3<f64>, max: &Point3<f64>) -> Option<Polygon> {
    let center = Point3::from((min.coords + max.coords) * 0.5);
    let center = plane.project_point(&center);
    let size = (max - min).norm();
    let (u, v) = plane.basis();
    let (u, v) = (u * size, v * size);
    Polygon::from_loop(
        vec![
            center - u - v,
            center + u - v,
            center + u + v,
            center - u + v,
        ],
        (),
    )
}

fn clip_to_box(polygon: Polygon, box_planes: &[Plane3D]) -> Option<Polygon> {
    box_planes
        .iter()
        .try_fold(polygon, |polygon, plane| polygon.clip(plane, PlaneSide::Front))
}

/// Clips `fragment` by every ancestor of `node`, keeping the side the path
/// from the root takes.
fn clip_to_cell(
    tree: &BspTree,
    parents: &[Option<(NodeIndex, PlaneSide)>],
    node: NodeIndex,
    mut fragment: Polygon,
) -> Option<Polygon> {
    let mut current = node;
    while let Some((parent, side)) = parents[current] {
        let splitter = tree.node(parent).splitter()?;
        fragment = fragment.clip(splitter, side)?;
        current = parent;
    }
    Some(fragment)
}

/// Sends a polygon lying on a splitter plane down a subtree, collecting the
/// pieces that reach empty leaves. A coplanar plane deeper down sends the
/// polygon towards `toward`.
fn push_down(
    tree: &BspTree,
    node: NodeIndex,
    polygon: Polygon,
    toward: &Vector3<f64>,
    out: &mut Vec<(Polygon, usize)>,
) {
    match tree.node(node) {
        BspNode::Leaf(leaf) => {
            if !leaf.is_solid() {
                out.push((polygon, leaf.leaf_index()));
            }
        }
        BspNode::Branch {
            splitter,
            front,
            back,
        } => match polygon.classify(splitter) {
            Classification::Front => push_down(tree, *front, polygon, toward, out),
            Classification::Back => push_down(tree, *back, polygon, toward, out),
            Classification::Coplanar => {
                let child = if splitter.normal().dot(toward) > 0.0 {
                    *front
                } else {
                    *back
                };
                push_down(tree, child, polygon, toward, out);
            }
            Classification::Straddling => {
                let (front_part, back_part) = polygon.split(splitter);
                if let Some(part) = front_part {
                    push_down(tree, *front, part, toward, out);
                }
                if let Some(part) = back_part {
                    push_down(tree, *back, part, toward, out);
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsp::{compile, BalancedSplitter};

    fn make_quad(corners: [[f64; 3]; 4]) -> Polygon {
        Polygon::new(
            corners
                .iter()
                .map(|c| Point3::new(c[0], c[1], c[2]))
                .collect(),
            (),
        )
    }

    fn cube(size: f64) -> Vec<Polygon> {
        let s = size;
        vec![
            make_quad([[0.0, 0.0, 0.0], [0.0, s, 0.0], [0.0, s, s], [0.0, 0.0, s]]),
            make_quad([[s, 0.0, 0.0], [s, 0.0, s], [s, s, s], [s, s, 0.0]]),
            make_quad([[0.0, 0.0, 0.0], [0.0, 0.0, s], [s, 0.0, s], [s, 0.0, 0.0]]),
            make_quad([[0.0, s, 0.0], [s, s, 0.0], [s, s, s], [0.0, s, s]]),
            make_quad([[0.0, 0.0, 0.0], [s, 0.0, 0.0], [s, s, 0.0], [0.0, s, 0.0]]),
            make_quad([[0.0, 0.0, s], [0.0, s, s], [s, s, s], [s, 0.0, s]]),
        ]
    }

    #[test]
    fn closed_room_has_no_portals() {
        let level = compile(cube(4.0), vec![], &BalancedSplitter::default()).unwrap();
        let portals = generate_portals(level.tree(), level.polygons(), &PortalOptions::default());
        assert_eq!(portals.empty_leaf_count(), 1);
        assert!(portals.is_empty());
    }

    #[test]
    fn hint_split_room_has_one_portal() {
        let hint = make_quad([[2.0, 0.0, 0.0], [2.0, 4.0, 0.0], [2.0, 4.0, 4.0], [2.0, 0.0, 4.0]]);
        let level = compile(cube(4.0), vec![hint], &BalancedSplitter::default()).unwrap();
        let portals = generate_portals(level.tree(), level.polygons(), &PortalOptions::default());

        assert_eq!(portals.len(), 1);
        let portal = &portals.portals()[0];
        assert!((portal.area() - 16.0).abs() < 1e-6);
        assert!(portal.positions().all(|p| (p.x - 2.0).abs() < 1e-9));

        // The normal points from the back leaf into the front leaf.
        let info = *portal.aux();
        let tree = level.tree();
        let ahead = portal.centroid() + portal.unit_normal().unwrap();
        assert_eq!(tree.find_leaf(&ahead), info.front_leaf);
        let behind = portal.centroid() - portal.unit_normal().unwrap();
        assert_eq!(tree.find_leaf(&behind), info.back_leaf);
        assert_eq!(portals.portals_of_leaf(info.front_leaf), vec![0]);
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let (min, max) = bounds(&cube(3.0)).unwrap();
        assert_eq!(min, Point3::origin());
        assert_eq!(max, Point3::new(3.0, 3.0, 3.0));
        assert!(bounds::<Point3<f64>, ()>(&[]).is_none());
    }

    #[test]
    fn plane_polygon_covers_the_box() {
        let plane = Plane3D::new(Vector3::new(1.0, 1.0, 0.0), 1.0).unwrap();
        let min = Point3::new(-1.0, -1.0, -1.0);
        let max = Point3::new(1.0, 1.0, 1.0);
        let polygon = plane_polygon(&plane, &min, &max).unwrap();
        assert!(polygon.faces_same_direction(&plane));
        let polygon = clip_to_box(polygon, &box_planes(&min, &max)).unwrap();
        assert!(polygon.positions().all(|p| plane.signed_distance(&p).abs() < 1e-9));
        assert!(polygon.area() > 0.0);
    }
}
