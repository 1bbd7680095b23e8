//! Whole-file loading and saving for each compile stage.
//!
//! | File     | Sections                                      |
//! |----------|-----------------------------------------------|
//! | geometry | `Polygons`                                    |
//! | tree     | `Polygons`, `Tree`                            |
//! | portals  | `Portals`                                     |
//! | vis      | `VisTable`                                    |
//! | level    | `HLEVEL`, `Polygons`, `Tree`, `Portals`, `VisTable` |

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;

use crate::bsp::BspTree;
use crate::error::{CompileError, CompileResult};
use crate::portal::PortalSet;
use crate::vis::LeafVisTable;
use crate::{Polygon, Vertex};

use super::lines::LineReader;
use super::polygon_text::{read_polygons_section, write_polygons_section, TextValue};
use super::portal_text::{read_portals_section, write_portals_section};
use super::tree_text::{read_tree_section, write_tree_section};
use super::vis_text::{read_vis_section, write_vis_section};

/// First line of a level file.
pub const LEVEL_HEADER: &str = "HLEVEL";

/// The contents of a collated level file.
#[derive(Debug, Clone)]
pub struct Level<V, A> {
    pub polygons: Vec<Polygon<V, A>>,
    pub tree: BspTree,
    pub portals: PortalSet,
    pub vis: LeafVisTable,
}

fn open(path: &Path) -> CompileResult<LineReader<BufReader<File>>> {
    let file = File::open(path).map_err(|source| CompileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LineReader::new(BufReader::new(file)))
}

fn create(path: &Path) -> CompileResult<BufWriter<File>> {
    let file = File::create(path).map_err(|source| CompileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufWriter::new(file))
}

/// Loads a geometry (or hint) file.
pub fn load_geometry<V, A>(path: &Path) -> CompileResult<Vec<Polygon<V, A>>>
where
    V: Vertex + TextValue,
    A: Clone + TextValue,
{
    let polygons = read_polygons_section(&mut open(path)?)?;
    debug!("Loaded {} polygons from {}", polygons.len(), path.display());
    Ok(polygons)
}

pub fn save_geometry<V, A>(path: &Path, polygons: &[Polygon<V, A>]) -> CompileResult<()>
where
    V: Vertex + TextValue,
    A: Clone + TextValue,
{
    let mut out = create(path)?;
    write_polygons_section(&mut out, polygons)?;
    out.flush()?;
    Ok(())
}

/// Loads a tree file: the compiled polygons and the tree over them.
pub fn load_tree<V, A>(path: &Path) -> CompileResult<(Vec<Polygon<V, A>>, BspTree)>
where
    V: Vertex + TextValue,
    A: Clone + TextValue,
{
    let mut reader = open(path)?;
    let polygons = read_polygons_section(&mut reader)?;
    let tree = read_tree_section(&mut reader, polygons.len())?;
    debug!(
        "Loaded {} polygons and {} nodes from {}",
        polygons.len(),
        tree.node_count(),
        path.display()
    );
    Ok((polygons, tree))
}

pub fn save_tree<V, A>(path: &Path, polygons: &[Polygon<V, A>], tree: &BspTree) -> CompileResult<()>
where
    V: Vertex + TextValue,
    A: Clone + TextValue,
{
    let mut out = create(path)?;
    write_polygons_section(&mut out, polygons)?;
    write_tree_section(&mut out, tree)?;
    out.flush()?;
    Ok(())
}

pub fn load_portals(path: &Path) -> CompileResult<PortalSet> {
    let portals = read_portals_section(&mut open(path)?)?;
    debug!("Loaded {} portals from {}", portals.len(), path.display());
    Ok(portals)
}

pub fn save_portals(path: &Path, portals: &PortalSet) -> CompileResult<()> {
    let mut out = create(path)?;
    write_portals_section(&mut out, portals)?;
    out.flush()?;
    Ok(())
}

pub fn load_vis(path: &Path) -> CompileResult<LeafVisTable> {
    read_vis_section(&mut open(path)?)
}

pub fn save_vis(path: &Path, table: &LeafVisTable) -> CompileResult<()> {
    let mut out = create(path)?;
    write_vis_section(&mut out, table)?;
    out.flush()?;
    Ok(())
}

/// Checks that a tree, its portals and its table describe the same set of
/// empty leaves.
pub fn check_consistency(tree: &BspTree, portals: &PortalSet, vis: &LeafVisTable) -> CompileResult<()> {
    let leaves = tree.empty_leaf_count();
    if portals.empty_leaf_count() != leaves || vis.size() != leaves {
        return Err(CompileError::format(format!(
            "the tree has {leaves} empty leaves, the portals {} and the visibility table {}",
            portals.empty_leaf_count(),
            vis.size()
        )));
    }
    Ok(())
}

pub fn load_level<V, A>(path: &Path) -> CompileResult<Level<V, A>>
where
    V: Vertex + TextValue,
    A: Clone + TextValue,
{
    let mut reader = open(path)?;
    reader.read_checked_line(LEVEL_HEADER)?;
    let polygons = read_polygons_section(&mut reader)?;
    let tree = read_tree_section(&mut reader, polygons.len())?;
    let portals = read_portals_section(&mut reader)?;
    let vis = read_vis_section(&mut reader)?;
    check_consistency(&tree, &portals, &vis)?;
    Ok(Level {
        polygons,
        tree,
        portals,
        vis,
    })
}

pub fn save_level<V, A>(path: &Path, level: &Level<V, A>) -> CompileResult<()>
where
    V: Vertex + TextValue,
    A: Clone + TextValue,
{
    check_consistency(&level.tree, &level.portals, &level.vis)?;
    let mut out = create(path)?;
    writeln!(out, "{LEVEL_HEADER}")?;
    write_polygons_section(&mut out, &level.polygons)?;
    write_tree_section(&mut out, &level.tree)?;
    write_portals_section(&mut out, &level.portals)?;
    write_vis_section(&mut out, &level.vis)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_names_the_path() {
        let path = Path::new("/nonexistent/level.geom");
        let err = load_portals(path).unwrap_err();
        match &err {
            CompileError::Io { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error {other}"),
        }
        assert!(err.to_string().contains("/nonexistent/level.geom"));
    }
}
