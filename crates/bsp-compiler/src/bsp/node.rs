//! BSP tree node implementation.

use crate::Plane3D;

/// Index of a node in the tree's node arena.
pub type NodeIndex = usize;

/// A node in the BSP tree.
///
/// Nodes live by value in the tree's arena; a branch refers to its children
/// by arena index. Trees are stored in post-order, so a branch's children
/// always have smaller indices than the branch itself.
#[derive(Debug, Clone, PartialEq)]
pub enum BspNode {
    /// An internal node splitting space by a plane.
    Branch {
        /// The splitting plane for this node.
        splitter: Plane3D,
        /// Subtree on the FRONT of the splitting plane.
        front: NodeIndex,
        /// Subtree BEHIND the splitting plane.
        back: NodeIndex,
    },
    /// A convex region of space that is either solid or empty.
    Leaf(BspLeaf),
}

/// A terminal region of the partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BspLeaf {
    leaf_index: usize,
    solid: bool,
    polygon_indices: Vec<usize>,
}

impl BspLeaf {
    /// Creates an empty (open) leaf bounded by the given polygons.
    pub fn empty(leaf_index: usize, polygon_indices: Vec<usize>) -> Self {
        Self {
            leaf_index,
            solid: false,
            polygon_indices,
        }
    }

    /// Creates a solid leaf. Solid leaves never hold polygons.
    pub fn solid(leaf_index: usize) -> Self {
        Self {
            leaf_index,
            solid: true,
            polygon_indices: Vec::new(),
        }
    }

    /// Index of this leaf among all leaves. Empty leaves come first.
    #[inline]
    pub fn leaf_index(&self) -> usize {
        self.leaf_index
    }

    #[inline]
    pub fn is_solid(&self) -> bool {
        self.solid
    }

    /// Indices into the compiled polygon array, in ascending order.
    #[inline]
    pub fn polygon_indices(&self) -> &[usize] {
        &self.polygon_indices
    }

    pub(crate) fn set_leaf_index(&mut self, leaf_index: usize) {
        self.leaf_index = leaf_index;
    }

    pub(crate) fn remap_polygons(&mut self, remap: &[usize]) {
        for index in &mut self.polygon_indices {
            *index = remap[*index];
        }
        self.polygon_indices.sort_unstable();
    }
}

impl BspNode {
    /// Checks if this node is a leaf.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, BspNode::Leaf(_))
    }

    /// Returns the leaf data if this node is a leaf.
    #[inline]
    pub fn as_leaf(&self) -> Option<&BspLeaf> {
        match self {
            BspNode::Leaf(leaf) => Some(leaf),
            BspNode::Branch { .. } => None,
        }
    }

    /// Returns the splitting plane if this node is a branch.
    #[inline]
    pub fn splitter(&self) -> Option<&Plane3D> {
        match self {
            BspNode::Branch { splitter, .. } => Some(splitter),
            BspNode::Leaf(_) => None,
        }
    }

    /// Returns `(front, back)` child indices if this node is a branch.
    #[inline]
    pub fn children(&self) -> Option<(NodeIndex, NodeIndex)> {
        match self {
            BspNode::Branch { front, back, .. } => Some((*front, *back)),
            BspNode::Leaf(_) => None,
        }
    }
}
