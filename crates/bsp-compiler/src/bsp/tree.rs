//! BSP tree container and queries.

use nalgebra::Point3;

use crate::error::{CompileError, CompileResult};
use crate::PlaneSide;

use super::node::{BspLeaf, BspNode, NodeIndex};

/// A compiled Binary Space Partitioning tree.
///
/// The nodes live in a flat arena in post-order: every branch comes after
/// both of its children, and the root is the last node. Leaves carry a
/// leaf index; empty leaves are numbered `0..empty_leaf_count()` and solid
/// leaves follow.
#[derive(Debug, Clone, PartialEq)]
pub struct BspTree {
    nodes: Vec<BspNode>,
    leaf_nodes: Vec<NodeIndex>,
    empty_leaf_count: usize,
}

impl BspTree {
    /// Assembles a tree from a post-ordered node arena, checking that the
    /// arena describes a single well-formed tree.
    pub fn from_nodes(nodes: Vec<BspNode>) -> CompileResult<Self> {
        if nodes.is_empty() {
            return Err(CompileError::format("tree has no nodes"));
        }

        let mut referenced = vec![false; nodes.len()];
        for (i, node) in nodes.iter().enumerate() {
            if let Some((front, back)) = node.children() {
                for child in [front, back] {
                    if child >= i {
                        return Err(CompileError::format(format!(
                            "node {i} refers to node {child}, which does not precede it"
                        )));
                    }
                    if std::mem::replace(&mut referenced[child], true) {
                        return Err(CompileError::format(format!(
                            "node {child} has more than one parent"
                        )));
                    }
                }
            }
        }
        let root = nodes.len() - 1;
        if let Some(orphan) = (0..root).find(|&i| !referenced[i]) {
            return Err(CompileError::format(format!("node {orphan} is unreachable")));
        }

        let leaf_total = nodes.iter().filter(|n| n.is_leaf()).count();
        let empty_leaf_count = nodes
            .iter()
            .filter_map(BspNode::as_leaf)
            .filter(|l| !l.is_solid())
            .count();
        let mut leaf_nodes = vec![usize::MAX; leaf_total];
        for (i, node) in nodes.iter().enumerate() {
            let Some(leaf) = node.as_leaf() else { continue };
            let index = leaf.leaf_index();
            if index >= leaf_total || leaf_nodes[index] != usize::MAX {
                return Err(CompileError::format(format!(
                    "leaf index {index} is out of range or repeated"
                )));
            }
            if leaf.is_solid() == (index < empty_leaf_count) {
                return Err(CompileError::format(format!(
                    "leaf {index} is numbered out of order: empty leaves come before solid ones"
                )));
            }
            leaf_nodes[index] = i;
        }

        Ok(Self {
            nodes,
            leaf_nodes,
            empty_leaf_count,
        })
    }

    /// All nodes, in post-order.
    #[inline]
    pub fn nodes(&self) -> &[BspNode] {
        &self.nodes
    }

    #[inline]
    pub fn node(&self, index: NodeIndex) -> &BspNode {
        &self.nodes[index]
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Index of the root node, which is always the last node.
    #[inline]
    pub fn root(&self) -> NodeIndex {
        self.nodes.len() - 1
    }

    #[inline]
    pub fn leaf_count(&self) -> usize {
        self.leaf_nodes.len()
    }

    #[inline]
    pub fn empty_leaf_count(&self) -> usize {
        self.empty_leaf_count
    }

    /// Returns the leaf with the given leaf index.
    pub fn leaf(&self, leaf_index: usize) -> &BspLeaf {
        match &self.nodes[self.leaf_nodes[leaf_index]] {
            BspNode::Leaf(leaf) => leaf,
            BspNode::Branch { .. } => unreachable!("leaf table points at a branch"),
        }
    }

    /// Returns the node index holding the given leaf.
    #[inline]
    pub fn leaf_node(&self, leaf_index: usize) -> NodeIndex {
        self.leaf_nodes[leaf_index]
    }

    /// Iterates over the empty leaves in leaf-index order.
    pub fn empty_leaves(&self) -> impl Iterator<Item = &BspLeaf> + '_ {
        (0..self.empty_leaf_count).map(|i| self.leaf(i))
    }

    /// Returns the leaf index of the leaf containing `point`. Points on a
    /// splitting plane are placed on its front side.
    pub fn find_leaf(&self, point: &Point3<f64>) -> usize {
        let mut index = self.root();
        loop {
            match &self.nodes[index] {
                BspNode::Leaf(leaf) => return leaf.leaf_index(),
                BspNode::Branch {
                    splitter,
                    front,
                    back,
                } => {
                    index = match splitter.classify_point(point) {
                        PlaneSide::Back => *back,
                        PlaneSide::Front | PlaneSide::OnPlane => *front,
                    };
                }
            }
        }
    }

    /// Returns the maximum depth of the tree (1 for a lone leaf).
    pub fn depth(&self) -> usize {
        // Post-order means children are always finished before parents.
        let mut depths = vec![0usize; self.nodes.len()];
        for (i, node) in self.nodes.iter().enumerate() {
            depths[i] = match node.children() {
                Some((front, back)) => 1 + depths[front].max(depths[back]),
                None => 1,
            };
        }
        depths[self.root()]
    }

    /// For each node, its parent and which side of the parent it lies on.
    /// The root has no parent.
    pub fn parents(&self) -> Vec<Option<(NodeIndex, PlaneSide)>> {
        let mut parents = vec![None; self.nodes.len()];
        for (i, node) in self.nodes.iter().enumerate() {
            if let Some((front, back)) = node.children() {
                parents[front] = Some((i, PlaneSide::Front));
                parents[back] = Some((i, PlaneSide::Back));
            }
        }
        parents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Plane3D;
    use nalgebra::Vector3;

    /// Two stacked planes: z = 0 and, in front of it, z = 1.
    ///
    /// ```text
    ///   z > 1      leaf 0 (empty)
    ///   0 < z < 1  leaf 1 (empty)
    ///   z < 0      leaf 2 (solid)
    /// ```
    fn make_tree() -> BspTree {
        let upper = Plane3D::new(Vector3::z(), 1.0).unwrap();
        let lower = Plane3D::new(Vector3::z(), 0.0).unwrap();
        BspTree::from_nodes(vec![
            BspNode::Leaf(BspLeaf::empty(0, vec![0])),
            BspNode::Leaf(BspLeaf::empty(1, vec![1])),
            BspNode::Branch {
                splitter: upper,
                front: 0,
                back: 1,
            },
            BspNode::Leaf(BspLeaf::solid(2)),
            BspNode::Branch {
                splitter: lower,
                front: 2,
                back: 3,
            },
        ])
        .unwrap()
    }

    #[test]
    fn accessors() {
        let tree = make_tree();
        assert_eq!(tree.root(), 4);
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.leaf_count(), 3);
        assert_eq!(tree.empty_leaf_count(), 2);
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.leaf_node(2), 3);
        assert!(tree.leaf(2).is_solid());
        assert_eq!(tree.empty_leaves().count(), 2);
    }

    #[test]
    fn find_leaf_descends_by_side() {
        let tree = make_tree();
        assert_eq!(tree.find_leaf(&Point3::new(0.0, 0.0, 5.0)), 0);
        assert_eq!(tree.find_leaf(&Point3::new(0.0, 0.0, 0.5)), 1);
        assert_eq!(tree.find_leaf(&Point3::new(0.0, 0.0, -5.0)), 2);
        // On a plane counts as in front.
        assert_eq!(tree.find_leaf(&Point3::new(3.0, 0.0, 1.0)), 0);
    }

    #[test]
    fn parents_record_sides() {
        let tree = make_tree();
        let parents = tree.parents();
        assert_eq!(parents[4], None);
        assert_eq!(parents[2], Some((4, PlaneSide::Front)));
        assert_eq!(parents[3], Some((4, PlaneSide::Back)));
        assert_eq!(parents[1], Some((2, PlaneSide::Back)));
    }

    #[test]
    fn from_nodes_rejects_malformed_arenas() {
        assert!(BspTree::from_nodes(vec![]).is_err());

        let plane = Plane3D::new(Vector3::x(), 0.0).unwrap();
        let forward_ref = vec![
            BspNode::Branch {
                splitter: plane.clone(),
                front: 1,
                back: 2,
            },
            BspNode::Leaf(BspLeaf::empty(0, vec![])),
            BspNode::Leaf(BspLeaf::solid(1)),
        ];
        assert!(BspTree::from_nodes(forward_ref).is_err());

        let solid_first = vec![
            BspNode::Leaf(BspLeaf::empty(1, vec![])),
            BspNode::Leaf(BspLeaf::solid(0)),
            BspNode::Branch {
                splitter: plane.clone(),
                front: 0,
                back: 1,
            },
        ];
        assert!(BspTree::from_nodes(solid_first).is_err());

        let orphan = vec![
            BspNode::Leaf(BspLeaf::empty(0, vec![])),
            BspNode::Leaf(BspLeaf::empty(1, vec![])),
            BspNode::Leaf(BspLeaf::solid(2)),
            BspNode::Branch {
                splitter: plane,
                front: 1,
                back: 2,
            },
        ];
        assert!(BspTree::from_nodes(orphan).is_err());
    }
}
