//! Text encoding of BSP trees.
//!
//! Nodes are written one per line in post-order, so the root is last:
//!
//! ```text
//! 0 L 0 E [ 0 1 2 ]
//! 1 L 1 S
//! 2 B 0 1 ( 0 0 1 4 )
//! ```

use std::io::{BufRead, Write};

use nalgebra::Vector3;

use crate::bsp::{BspLeaf, BspNode, BspTree};
use crate::error::{CompileError, CompileResult};
use crate::Plane3D;

use super::lines::{at_line, LineReader, Tokens};

/// Formats one node line.
pub fn node_to_line(index: usize, node: &BspNode) -> String {
    match node {
        BspNode::Branch {
            splitter,
            front,
            back,
        } => {
            let n = splitter.normal();
            format!(
                "{index} B {front} {back} ( {} {} {} {} )",
                n.x,
                n.y,
                n.z,
                splitter.offset()
            )
        }
        BspNode::Leaf(leaf) if leaf.is_solid() => format!("{index} L {} S", leaf.leaf_index()),
        BspNode::Leaf(leaf) => {
            let mut line = format!("{index} L {} E [", leaf.leaf_index());
            for polygon in leaf.polygon_indices() {
                line.push_str(&format!(" {polygon}"));
            }
            line.push_str(" ]");
            line
        }
    }
}

/// Parses one node line, checking that it carries the expected index.
pub fn node_from_line(expected_index: usize, line: &str) -> CompileResult<BspNode> {
    let mut tokens = Tokens::new(line);
    let index: usize = tokens.parse("a node index")?;
    if index != expected_index {
        return Err(CompileError::format(format!(
            "expected node {expected_index}, found node {index}"
        )));
    }
    let node = match tokens.next_token("a node kind")? {
        "B" => {
            let front = tokens.parse("a front child index")?;
            let back = tokens.parse("a back child index")?;
            tokens.expect("(")?;
            let normal = Vector3::new(
                tokens.parse("a normal x component")?,
                tokens.parse("a normal y component")?,
                tokens.parse("a normal z component")?,
            );
            let offset = tokens.parse("a plane offset")?;
            tokens.expect(")")?;
            let splitter = Plane3D::new(normal, offset)
                .ok_or_else(|| CompileError::format("splitter has a zero normal"))?;
            BspNode::Branch {
                splitter,
                front,
                back,
            }
        }
        "L" => {
            let leaf_index = tokens.parse("a leaf index")?;
            match tokens.next_token("a leaf kind")? {
                "S" => BspNode::Leaf(BspLeaf::solid(leaf_index)),
                "E" => {
                    tokens.expect("[")?;
                    let mut polygons = Vec::new();
                    while tokens.peek() != Some("]") {
                        polygons.push(tokens.parse("a polygon index or `]`")?);
                    }
                    tokens.expect("]")?;
                    BspNode::Leaf(BspLeaf::empty(leaf_index, polygons))
                }
                other => {
                    return Err(CompileError::format(format!(
                        "expected a leaf kind (S or E), found `{other}`"
                    )));
                }
            }
        }
        other => {
            return Err(CompileError::format(format!(
                "expected a node kind (B or L), found `{other}`"
            )));
        }
    };
    tokens.finish()?;
    Ok(node)
}

/// Writes a `Tree` section.
pub fn write_tree_section<W: Write>(out: &mut W, tree: &BspTree) -> CompileResult<()> {
    writeln!(out, "Tree")?;
    writeln!(out, "{{")?;
    writeln!(out, "{}", tree.node_count())?;
    for (index, node) in tree.nodes().iter().enumerate() {
        writeln!(out, "{}", node_to_line(index, node))?;
    }
    writeln!(out, "}}")?;
    Ok(())
}

/// Reads a `Tree` section. Leaves may only refer to polygons below
/// `polygon_count`.
pub fn read_tree_section<R: BufRead>(
    reader: &mut LineReader<R>,
    polygon_count: usize,
) -> CompileResult<BspTree> {
    reader.begin_section("Tree")?;
    let count: usize = reader.read_value("the node count")?;
    let mut nodes = Vec::new();
    for index in 0..count {
        let line = reader.read_line("a tree node")?;
        let node = node_from_line(index, &line).map_err(|e| at_line(reader.line_number(), e))?;
        if let Some(&bad) = node
            .as_leaf()
            .and_then(|leaf| leaf.polygon_indices().iter().find(|&&p| p >= polygon_count))
        {
            return Err(reader.error(format!(
                "leaf refers to polygon {bad}, but there are only {polygon_count}"
            )));
        }
        nodes.push(node);
    }
    reader.end_section()?;
    BspTree::from_nodes(nodes)
}
