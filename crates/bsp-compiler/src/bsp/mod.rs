//! Binary Space Partitioning tree compilation for static levels.
//!
//! The compiler recursively partitions a set of inward-facing polygons by
//! planes chosen from the polygons themselves (or from hint polygons),
//! producing a tree whose leaves are convex regions. A leaf is either
//! empty (open space, holding the polygons that bound it) or solid.
//!
//! # Example
//!
//! ```ignore
//! use bsp_compiler::bsp::{compile, BalancedSplitter};
//! use nalgebra::Point3;
//!
//! let polygons: Vec<Polygon> = /* create polygons */;
//! let level = compile(polygons, vec![], &BalancedSplitter::default())?;
//!
//! let leaf = level.tree().find_leaf(&Point3::new(0.0, 0.0, 10.0));
//! ```
//!
//! # Architecture
//!
//! - [`BspCompiler`]: Builds a tree, splitting polygons into an arena
//! - [`BspTree`]: The post-ordered node arena with point location
//! - [`BspNode`]: A branch with a splitting plane, or a leaf
//! - [`SplitterMetric`]: Strategy trait for scoring splitting planes

mod compiler;
mod node;
mod selector;
mod tree;

pub use compiler::{compile, BspCompiler, CompiledLevel};
pub use node::{BspLeaf, BspNode, NodeIndex};
pub use selector::{
    rank_by_cost, BalancedSplitter, FirstCandidate, SplitCounts, SplitterMetric,
    DEFAULT_SPLITTER_WEIGHT,
};
pub use tree::BspTree;
