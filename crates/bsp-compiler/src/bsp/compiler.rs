//! Recursive polygon-set partitioning.
//!
//! The compiler keeps every polygon in an append-only arena. Splitting a
//! polygon appends its two fragments and marks the parent inactive; nothing
//! in the arena is mutated in place. Each recursion step works on a list of
//! arena handles, each flagged as to whether its plane may still be chosen
//! as a splitter.

use std::time::Instant;

use log::{debug, info, warn};

use crate::error::{CompileError, CompileResult};
use crate::{Classification, Cuttable, Plane3D, Polygon, Vertex};

use super::node::{BspLeaf, BspNode, NodeIndex};
use super::selector::{rank_by_cost, SplitCounts, SplitterMetric};
use super::tree::BspTree;

/// Append-only polygon storage.
#[derive(Debug, Clone)]
struct PolygonArena<V, A> {
    polygons: Vec<Polygon<V, A>>,
    origins: Vec<usize>,
    active: Vec<bool>,
}

impl<V: Vertex, A: Clone> PolygonArena<V, A> {
    fn new(polygons: Vec<Polygon<V, A>>) -> Self {
        let count = polygons.len();
        Self {
            polygons,
            origins: (0..count).collect(),
            active: vec![true; count],
        }
    }

    fn len(&self) -> usize {
        self.polygons.len()
    }

    fn get(&self, handle: usize) -> &Polygon<V, A> {
        &self.polygons[handle]
    }

    fn push(&mut self, polygon: Polygon<V, A>, origin: usize) -> usize {
        self.polygons.push(polygon);
        self.origins.push(origin);
        self.active.push(true);
        self.polygons.len() - 1
    }

    /// Splits the polygon at `handle`, appending the fragments and
    /// retiring the parent.
    fn split(&mut self, handle: usize, plane: &Plane3D) -> (Option<usize>, Option<usize>) {
        let (front, back) = self.polygons[handle].split(plane);
        let origin = self.origins[handle];
        self.active[handle] = false;
        (
            front.map(|p| self.push(p, origin)),
            back.map(|p| self.push(p, origin)),
        )
    }
}

/// A polygon in the current partition set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PolyRef {
    handle: usize,
    split_candidate: bool,
}

/// A chosen splitting plane and the polygons (or hints) it was taken from.
/// Those are always routed as lying on the plane, whatever their vertices
/// say.
#[derive(Debug, Clone)]
struct Splitter {
    plane: Plane3D,
    sources: Vec<usize>,
    from_hints: bool,
}

impl Splitter {
    fn is_source_polygon(&self, handle: usize) -> bool {
        !self.from_hints && self.sources.contains(&handle)
    }

    fn is_source_hint(&self, handle: usize) -> bool {
        self.from_hints && self.sources.contains(&handle)
    }
}

/// The output of a successful compile.
#[derive(Debug, Clone)]
pub struct CompiledLevel<V, A> {
    polygons: Vec<Polygon<V, A>>,
    origins: Vec<usize>,
    tree: BspTree,
}

impl<V, A> CompiledLevel<V, A> {
    /// The final polygon array that leaves index into.
    pub fn polygons(&self) -> &[Polygon<V, A>] {
        &self.polygons
    }

    /// Index of the input polygon that output polygon `index` came from.
    pub fn origin(&self, index: usize) -> usize {
        self.origins[index]
    }

    pub fn tree(&self) -> &BspTree {
        &self.tree
    }

    pub fn into_parts(self) -> (Vec<Polygon<V, A>>, BspTree) {
        (self.polygons, self.tree)
    }

    /// For every empty leaf, the sorted, de-duplicated input polygon
    /// indices whose fragments ended up in it.
    pub fn leaf_origins(&self) -> Vec<Vec<usize>> {
        (0..self.tree.empty_leaf_count())
            .map(|leaf| {
                let mut origins: Vec<usize> = self
                    .tree
                    .leaf(leaf)
                    .polygon_indices()
                    .iter()
                    .map(|&i| self.origins[i])
                    .collect();
                origins.sort_unstable();
                origins.dedup();
                origins
            })
            .collect()
    }
}

/// Builds a BSP tree from polygons and optional hint polygons.
pub struct BspCompiler<'m, V, A, M: SplitterMetric> {
    polygons: PolygonArena<V, A>,
    hints: PolygonArena<V, A>,
    metric: &'m M,
    nodes: Vec<BspNode>,
}

impl<'m, V: Vertex, A: Clone, M: SplitterMetric> BspCompiler<'m, V, A, M> {
    /// Validates the input and prepares a compiler.
    ///
    /// Hint polygons are only used to choose splitters: while any hint
    /// remains in a partition set, only hint planes are considered. Hints
    /// never appear in leaves.
    pub fn new(
        polygons: Vec<Polygon<V, A>>,
        hints: Vec<Polygon<V, A>>,
        metric: &'m M,
    ) -> CompileResult<Self> {
        validate_all(&polygons, "polygon")?;
        validate_all(&hints, "hint polygon")?;
        Ok(Self {
            polygons: PolygonArena::new(polygons),
            hints: PolygonArena::new(hints),
            metric,
            nodes: Vec::new(),
        })
    }

    /// Runs the compile.
    pub fn build(mut self) -> CompileResult<CompiledLevel<V, A>> {
        let start = Instant::now();
        let input_count = self.polygons.len();
        info!(
            "Compiling BSP tree from {} polygons ({} hints)",
            input_count,
            self.hints.len()
        );

        let polys: Vec<PolyRef> = (0..input_count)
            .map(|handle| PolyRef {
                handle,
                split_candidate: true,
            })
            .collect();
        let hints: Vec<usize> = (0..self.hints.len()).collect();

        if polys.is_empty() {
            warn!("No input polygons; the tree is a single empty leaf");
            self.nodes.push(BspNode::Leaf(BspLeaf::empty(0, Vec::new())));
        } else {
            self.build_subtree(polys, hints)?;
        }

        let level = self.finish()?;
        info!(
            "BSP tree built: {} nodes (depth {}), {} leaves ({} empty), {} polygons from {} inputs in {:.2}ms",
            level.tree.node_count(),
            level.tree.depth(),
            level.tree.leaf_count(),
            level.tree.empty_leaf_count(),
            level.polygons.len(),
            input_count,
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(level)
    }

    /// Recursively partitions a non-empty polygon set. Returns the index of
    /// the subtree root; children are pushed before their parent.
    fn build_subtree(&mut self, polys: Vec<PolyRef>, hints: Vec<usize>) -> CompileResult<NodeIndex> {
        if hints.is_empty() && !polys.iter().any(|p| p.split_candidate) {
            let handles = polys.iter().map(|p| p.handle).collect();
            return Ok(self.push_node(BspNode::Leaf(BspLeaf::empty(0, handles))));
        }

        let chosen = self.choose_splitter(&polys, &hints)?;
        let splitter = chosen.plane.clone();

        let mut front_polys = Vec::new();
        let mut back_polys = Vec::new();
        for p in polys {
            let polygon = self.polygons.get(p.handle);
            let class = if chosen.is_source_polygon(p.handle) {
                Classification::Coplanar
            } else {
                polygon.classify(&splitter)
            };
            match class {
                Classification::Front => front_polys.push(p),
                Classification::Back => back_polys.push(p),
                Classification::Coplanar => {
                    if polygon.faces_same_direction(&splitter) {
                        front_polys.push(PolyRef {
                            handle: p.handle,
                            split_candidate: false,
                        });
                    } else {
                        back_polys.push(p);
                    }
                }
                Classification::Straddling => {
                    let (front, back) = self.polygons.split(p.handle, &splitter);
                    front_polys.extend(front.map(|handle| PolyRef { handle, ..p }));
                    back_polys.extend(back.map(|handle| PolyRef { handle, ..p }));
                }
            }
        }

        let mut front_hints = Vec::new();
        let mut back_hints = Vec::new();
        for h in hints {
            if chosen.is_source_hint(h) {
                continue;
            }
            match self.hints.get(h).classify(&splitter) {
                Classification::Front => front_hints.push(h),
                Classification::Back => back_hints.push(h),
                // Consumed by this split.
                Classification::Coplanar => {}
                Classification::Straddling => {
                    let (front, back) = self.hints.split(h, &splitter);
                    front_hints.extend(front);
                    back_hints.extend(back);
                }
            }
        }

        debug!(
            "Split with {:?}: {} front, {} back",
            splitter,
            front_polys.len(),
            back_polys.len()
        );

        // A side without real polygons is a leaf whatever hints remain
        // there: empty in front of a splitter, solid behind it.
        let front = if front_polys.is_empty() {
            self.push_node(BspNode::Leaf(BspLeaf::empty(0, Vec::new())))
        } else {
            self.build_subtree(front_polys, front_hints)?
        };
        let back = if back_polys.is_empty() {
            self.push_node(BspNode::Leaf(BspLeaf::solid(0)))
        } else {
            self.build_subtree(back_polys, back_hints)?
        };

        Ok(self.push_node(BspNode::Branch {
            splitter,
            front,
            back,
        }))
    }

    /// Picks the cheapest non-degenerate splitter. Hint planes take strict
    /// priority over polygon planes.
    fn choose_splitter(&self, polys: &[PolyRef], hints: &[usize]) -> CompileResult<Splitter> {
        let from_hints = !hints.is_empty();
        let sources: Vec<(usize, &Polygon<V, A>)> = if from_hints {
            hints.iter().map(|&h| (h, self.hints.get(h))).collect()
        } else {
            polys
                .iter()
                .filter(|p| p.split_candidate)
                .map(|p| (p.handle, self.polygons.get(p.handle)))
                .collect()
        };

        let mut candidates: Vec<Splitter> = Vec::new();
        for (handle, polygon) in sources {
            let Some(plane) = polygon.plane() else {
                continue;
            };
            match candidates.iter_mut().find(|c| c.plane.approx_eq(&plane)) {
                Some(existing) => existing.sources.push(handle),
                None => candidates.push(Splitter {
                    plane,
                    sources: vec![handle],
                    from_hints,
                }),
            }
        }

        let mut costs = Vec::with_capacity(candidates.len());
        let mut degenerate = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            let (counts, is_degenerate) = self.measure(candidate, polys);
            costs.push(self.metric.cost(&counts));
            degenerate.push(is_degenerate);
        }

        match rank_by_cost(&costs).into_iter().find(|&i| !degenerate[i]) {
            Some(best) => Ok(candidates.swap_remove(best)),
            None => {
                let mut indices: Vec<usize> =
                    polys.iter().map(|p| self.polygons.origins[p.handle]).collect();
                indices.sort_unstable();
                indices.dedup();
                Err(CompileError::NoValidSplitter {
                    count: polys.len(),
                    indices,
                })
            }
        }
    }

    /// Counts how `splitter` would partition `polys`, and whether any split
    /// would leave a degenerate fragment.
    fn measure(&self, splitter: &Splitter, polys: &[PolyRef]) -> (SplitCounts, bool) {
        let plane = &splitter.plane;
        let mut counts = SplitCounts::default();
        let mut degenerate = false;
        for p in polys {
            let polygon = self.polygons.get(p.handle);
            if splitter.is_source_polygon(p.handle) {
                counts.front += 1;
                continue;
            }
            match polygon.classify(plane) {
                Classification::Front => counts.front += 1,
                Classification::Back => counts.back += 1,
                Classification::Coplanar => {
                    if polygon.faces_same_direction(plane) {
                        counts.front += 1;
                    } else {
                        counts.back += 1;
                    }
                }
                Classification::Straddling => {
                    counts.straddling += 1;
                    if !matches!(polygon.split(plane), (Some(_), Some(_))) {
                        degenerate = true;
                    }
                }
            }
        }
        (counts, degenerate)
    }

    fn push_node(&mut self, node: BspNode) -> NodeIndex {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Compacts the arena to the polygons that ended in leaves and numbers
    /// the leaves, empty ones first.
    fn finish(self) -> CompileResult<CompiledLevel<V, A>> {
        let arena = self.polygons;
        let mut remap = vec![usize::MAX; arena.len()];
        let mut polygons = Vec::new();
        let mut origins = Vec::new();
        for (handle, polygon) in arena.polygons.into_iter().enumerate() {
            if arena.active[handle] {
                remap[handle] = polygons.len();
                polygons.push(polygon);
                origins.push(arena.origins[handle]);
            }
        }

        let mut nodes = self.nodes;
        let empty_count = nodes
            .iter()
            .filter(|n| n.as_leaf().is_some_and(|l| !l.is_solid()))
            .count();
        let (mut next_empty, mut next_solid) = (0, empty_count);
        for node in &mut nodes {
            if let BspNode::Leaf(leaf) = node {
                leaf.remap_polygons(&remap);
                if leaf.is_solid() {
                    leaf.set_leaf_index(next_solid);
                    next_solid += 1;
                } else {
                    leaf.set_leaf_index(next_empty);
                    next_empty += 1;
                }
            }
        }

        Ok(CompiledLevel {
            polygons,
            origins,
            tree: BspTree::from_nodes(nodes)?,
        })
    }
}

/// Compiles polygons (and hints) into a tree using the given metric.
pub fn compile<V: Vertex, A: Clone, M: SplitterMetric>(
    polygons: Vec<Polygon<V, A>>,
    hints: Vec<Polygon<V, A>>,
    metric: &M,
) -> CompileResult<CompiledLevel<V, A>> {
    BspCompiler::new(polygons, hints, metric)?.build()
}

fn validate_all<V: Vertex, A: Clone>(polygons: &[Polygon<V, A>], what: &str) -> CompileResult<()> {
    for (i, polygon) in polygons.iter().enumerate() {
        polygon.validate().map_err(|e| match e {
            CompileError::Geometry(cause) => CompileError::Geometry(format!("{what} {i}: {cause}")),
            other => other,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsp::{BalancedSplitter, FirstCandidate};
    use crate::PlaneSide;
    use nalgebra::Point3;

    fn quad(corners: [[f64; 3]; 4]) -> Polygon {
        Polygon::new(
            corners
                .iter()
                .map(|c| Point3::new(c[0], c[1], c[2]))
                .collect(),
            (),
        )
    }

    /// Inward-facing faces of an axis-aligned box.
    fn room(min: [f64; 3], max: [f64; 3]) -> Vec<Polygon> {
        let [x0, y0, z0] = min;
        let [x1, y1, z1] = max;
        vec![
            quad([[x0, y0, z0], [x0, y1, z0], [x0, y1, z1], [x0, y0, z1]]),
            quad([[x1, y0, z0], [x1, y0, z1], [x1, y1, z1], [x1, y1, z0]]),
            quad([[x0, y0, z0], [x0, y0, z1], [x1, y0, z1], [x1, y0, z0]]),
            quad([[x0, y1, z0], [x1, y1, z0], [x1, y1, z1], [x0, y1, z1]]),
            quad([[x0, y0, z0], [x1, y0, z0], [x1, y1, z0], [x0, y1, z0]]),
            quad([[x0, y0, z1], [x0, y1, z1], [x1, y1, z1], [x1, y0, z1]]),
        ]
    }

    #[test]
    fn room_faces_point_inward() {
        let center = Point3::new(0.5, 0.5, 0.5);
        for face in room([0.0; 3], [1.0; 3]) {
            let plane = face.plane().unwrap();
            assert_eq!(plane.classify_point(&center), PlaneSide::Front);
        }
    }

    #[test]
    fn single_room_is_one_empty_leaf() {
        let level = compile(room([0.0; 3], [4.0; 3]), vec![], &BalancedSplitter::default()).unwrap();
        let tree = level.tree();
        assert_eq!(tree.empty_leaf_count(), 1);
        assert_eq!(tree.leaf(0).polygon_indices().len(), 6);
        // Six walls, each with a solid region behind it.
        assert_eq!(tree.leaf_count(), 7);
        assert_eq!(level.polygons().len(), 6);
        assert_eq!(tree.find_leaf(&Point3::new(2.0, 2.0, 2.0)), 0);
        assert!(tree.leaf(tree.find_leaf(&Point3::new(-1.0, 2.0, 2.0))).is_solid());
    }

    #[test]
    fn straddling_polygons_are_split_into_the_arena() {
        let mut polygons = room([0.0; 3], [4.0; 3]);
        // A floor strip poking out of the room through the x = 4 wall.
        polygons.push(quad([[2.0, 1.0, 1.0], [6.0, 1.0, 1.0], [6.0, 2.0, 1.0], [2.0, 2.0, 1.0]]));
        let level = compile(polygons, vec![], &FirstCandidate).unwrap();
        assert!(level.polygons().len() > 7);
        let origins: Vec<usize> = (0..level.polygons().len()).map(|i| level.origin(i)).collect();
        assert!(origins.iter().filter(|&&o| o == 6).count() >= 2);
    }

    #[test]
    fn hints_choose_the_first_splitter() {
        let hint = quad([[2.0, 0.0, 0.0], [2.0, 4.0, 0.0], [2.0, 4.0, 4.0], [2.0, 0.0, 4.0]]);
        let hint_plane = hint.plane().unwrap();
        let level = compile(
            room([0.0; 3], [4.0; 3]),
            vec![hint],
            &BalancedSplitter::default(),
        )
        .unwrap();
        let tree = level.tree();
        let root = tree.node(tree.root());
        assert!(root.splitter().unwrap().approx_eq(&hint_plane));
        // The room is now two empty leaves.
        assert_eq!(tree.empty_leaf_count(), 2);
        // Hints never become leaf polygons; four walls were split in two.
        assert_eq!(level.polygons().len(), 10);
    }

    #[test]
    fn invalid_input_names_the_polygon() {
        let mut polygons = room([0.0; 3], [1.0; 3]);
        polygons.push(quad([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [3.0, 0.0, 0.0]]));
        let err = compile(polygons, vec![], &FirstCandidate).unwrap_err();
        match err {
            CompileError::Geometry(cause) => assert!(cause.starts_with("polygon 6")),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn nearly_planar_floor_compiles() {
        let mut polygons = room([0.0; 3], [4.0; 3]);
        polygons[4] = quad([[0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [4.0, 4.0, 5e-6], [0.0, 4.0, 0.0]]);
        let level = compile(polygons, vec![], &BalancedSplitter::default()).unwrap();
        assert_eq!(level.tree().empty_leaf_count(), 1);
        assert_eq!(level.polygons().len(), 6);
    }

    #[test]
    fn warped_floor_is_rejected() {
        let mut polygons = room([0.0; 3], [4.0; 3]);
        polygons[4] = quad([[0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [4.0, 4.0, 4e-4], [0.0, 4.0, 0.0]]);
        match compile(polygons, vec![], &BalancedSplitter::default()).unwrap_err() {
            CompileError::Geometry(cause) => assert!(cause.starts_with("polygon 4")),
            other => panic!("unexpected error {other}"),
        }
    }

    /// Two triangles whose planes each shave a sliver off the other.
    fn shaving_pair() -> Vec<Polygon> {
        let x = 1.0 - 3e-5;
        vec![
            Polygon::new(
                vec![
                    Point3::new(0.0, 0.0, 0.0),
                    Point3::new(1.0, 0.0, 0.0),
                    Point3::new(0.0, 1.0, 0.0),
                ],
                (),
            ),
            Polygon::new(
                vec![
                    Point3::new(x, 0.5, -3e-5),
                    Point3::new(x, 0.0, 1.0),
                    Point3::new(x, 1.0, 1.0),
                ],
                (),
            ),
        ]
    }

    #[test]
    fn no_valid_splitter_lists_the_inputs() {
        let err = compile(shaving_pair(), vec![], &FirstCandidate).unwrap_err();
        match err {
            CompileError::NoValidSplitter { count, indices } => {
                assert_eq!(count, 2);
                assert_eq!(indices, vec![0, 1]);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn degenerate_planes_fall_through_to_the_next_candidate() {
        let mut polygons = shaving_pair();
        let far = quad([[5.0, 0.0, 5.0], [5.0, 1.0, 5.0], [6.0, 1.0, 5.0], [6.0, 0.0, 5.0]]);
        let far_plane = far.plane().unwrap();
        polygons.push(far);

        let compiler = BspCompiler::new(polygons, vec![], &FirstCandidate).unwrap();
        let polys: Vec<PolyRef> = (0..3)
            .map(|handle| PolyRef {
                handle,
                split_candidate: true,
            })
            .collect();
        let chosen = compiler.choose_splitter(&polys, &[]).unwrap();
        assert!(chosen.plane.approx_eq(&far_plane));
        assert_eq!(chosen.sources, vec![2]);
    }

    #[test]
    fn empty_input_is_one_empty_leaf() {
        let level = compile::<Point3<f64>, (), _>(vec![], vec![], &FirstCandidate).unwrap();
        assert_eq!(level.tree().leaf_count(), 1);
        assert_eq!(level.tree().empty_leaf_count(), 1);
    }
}
