//! Leaf-to-leaf potentially visible set calculation.

use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;

use crate::portal::PortalSet;
use crate::{Cuttable, Plane3D, PlaneSide, Polygon, PLANE_EPSILON};

use super::antipenumbra::Antipenumbra;
use super::table::{LeafVisState, LeafVisTable, PortalVisState, VisTable};

/// A portal seen from one side: its polygon faces into `to_leaf`.
#[derive(Debug, Clone)]
struct DirectedPortal {
    polygon: Polygon,
    plane: Plane3D,
    from_leaf: usize,
    to_leaf: usize,
}

/// Computes which empty leaves can see which, by flowing visibility
/// through the portals.
pub fn calculate_vis(portals: &PortalSet) -> LeafVisTable {
    let start = Instant::now();
    let leaf_count = portals.empty_leaf_count();
    let directed = directed_portals(portals);
    info!(
        "Calculating visibility for {} leaves through {} directed portals",
        leaf_count,
        directed.len()
    );

    let might_see = initial_portal_vis(&directed);
    let mut outgoing = vec![Vec::new(); leaf_count];
    for (i, portal) in directed.iter().enumerate() {
        outgoing[portal.from_leaf].push(i);
    }

    let flow = PortalFlow {
        directed: &directed,
        outgoing: &outgoing,
        might_see: &might_see,
        leaf_count,
    };
    let rows: Vec<(usize, Vec<bool>)> = (0..directed.len())
        .into_par_iter()
        .map(|source| (directed[source].from_leaf, flow.visible_from(source)))
        .collect();

    let mut table = VisTable::new(leaf_count, LeafVisState::No);
    for (leaf, row) in rows {
        for (other, _) in row.iter().enumerate().filter(|(_, seen)| **seen) {
            table[(leaf, other)] = LeafVisState::Yes;
            table[(other, leaf)] = LeafVisState::Yes;
        }
    }
    for leaf in 0..leaf_count {
        table[(leaf, leaf)] = LeafVisState::Yes;
    }

    info!(
        "Visibility calculated in {:.2}ms",
        start.elapsed().as_secs_f64() * 1000.0
    );
    for leaf in 0..leaf_count {
        debug!("Leaf {leaf} sees {} leaves", table.visible_count(leaf));
    }
    table
}

/// Splits each portal into its two directions.
fn directed_portals(portals: &PortalSet) -> Vec<DirectedPortal> {
    let mut directed = Vec::with_capacity(portals.len() * 2);
    for portal in portals.portals() {
        let info = *portal.aux();
        let forward = portal.clone().with_aux(());
        let backward = forward.flipped();
        for (polygon, from_leaf, to_leaf) in [
            (forward, info.back_leaf, info.front_leaf),
            (backward, info.front_leaf, info.back_leaf),
        ] {
            let Some(plane) = polygon.plane() else {
                continue;
            };
            directed.push(DirectedPortal {
                polygon,
                plane,
                from_leaf,
                to_leaf,
            });
        }
    }
    directed
}

/// `q` might be seen through `p` only if part of `q` lies beyond `p` and
/// part of `p` lies before `q`.
fn initial_portal_vis(directed: &[DirectedPortal]) -> VisTable<PortalVisState> {
    let n = directed.len();
    let mut table = VisTable::new(n, PortalVisState::No);
    for (i, p) in directed.iter().enumerate() {
        for (j, q) in directed.iter().enumerate() {
            if i == j {
                continue;
            }
            let q_beyond_p = q
                .polygon
                .positions()
                .any(|v| p.plane.signed_distance(&v) > PLANE_EPSILON);
            let p_before_q = p
                .polygon
                .positions()
                .any(|v| q.plane.signed_distance(&v) < -PLANE_EPSILON);
            if q_beyond_p && p_before_q {
                table[(i, j)] = PortalVisState::Maybe;
            }
        }
    }
    table
}

/// Shared, read-only state of the visibility flow.
struct PortalFlow<'a> {
    directed: &'a [DirectedPortal],
    outgoing: &'a [Vec<usize>],
    might_see: &'a VisTable<PortalVisState>,
    leaf_count: usize,
}

impl PortalFlow<'_> {
    /// The leaves visible from the source portal's leaf through it.
    fn visible_from(&self, source: usize) -> Vec<bool> {
        let portal = &self.directed[source];
        let mut visible = vec![false; self.leaf_count];
        visible[portal.from_leaf] = true;
        visible[portal.to_leaf] = true;

        let mut path = vec![portal.from_leaf, portal.to_leaf];
        self.flow(source, portal.to_leaf, None, &mut path, &mut visible);
        visible
    }

    /// Continues through `leaf`, which was entered through `pass` (`None`
    /// when it was entered through the source itself).
    fn flow(
        &self,
        source: usize,
        leaf: usize,
        pass: Option<&Polygon>,
        path: &mut Vec<usize>,
        visible: &mut [bool],
    ) {
        let source_portal = &self.directed[source];
        let antipenumbra = pass.map(|pass| Antipenumbra::new(&source_portal.polygon, pass));

        for &next in &self.outgoing[leaf] {
            let candidate = &self.directed[next];
            if path.contains(&candidate.to_leaf)
                || self.might_see[(source, next)] == PortalVisState::No
            {
                continue;
            }
            let Some(fragment) = candidate
                .polygon
                .clip(&source_portal.plane, PlaneSide::Front)
            else {
                continue;
            };
            let fragment = match &antipenumbra {
                Some(antipenumbra) => match antipenumbra.clip(&fragment) {
                    Some(fragment) => fragment,
                    None => continue,
                },
                None => fragment,
            };

            visible[candidate.to_leaf] = true;
            path.push(candidate.to_leaf);
            self.flow(source, candidate.to_leaf, Some(&fragment), path, visible);
            path.pop();
        }
    }
}
