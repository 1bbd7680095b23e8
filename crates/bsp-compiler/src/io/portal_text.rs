//! Text encoding of portals.

use std::io::{BufRead, Write};

use crate::error::CompileResult;
use crate::portal::{Portal, PortalSet};

use super::lines::LineReader;
use super::polygon_text::{read_polygon_lines, write_polygon_lines};

/// Writes a `Portals` section: the empty leaf count, then the portals.
pub fn write_portals_section<W: Write>(out: &mut W, portals: &PortalSet) -> CompileResult<()> {
    writeln!(out, "Portals")?;
    writeln!(out, "{{")?;
    writeln!(out, "{}", portals.empty_leaf_count())?;
    write_polygon_lines(out, portals.portals())?;
    writeln!(out, "}}")?;
    Ok(())
}

/// Reads a `Portals` section, checking that every portal connects two
/// distinct, existing empty leaves.
pub fn read_portals_section<R: BufRead>(reader: &mut LineReader<R>) -> CompileResult<PortalSet> {
    reader.begin_section("Portals")?;
    let empty_leaf_count: usize = reader.read_value("the empty leaf count")?;
    let portals: Vec<Portal> = read_polygon_lines(reader)?;
    reader.end_section()?;

    for (i, portal) in portals.iter().enumerate() {
        let info = portal.aux();
        if info.front_leaf >= empty_leaf_count
            || info.back_leaf >= empty_leaf_count
            || info.front_leaf == info.back_leaf
        {
            return Err(reader.error(format!(
                "portal {i} links leaves {} and {}, which is not a pair of distinct empty leaves below {empty_leaf_count}",
                info.front_leaf, info.back_leaf
            )));
        }
    }
    Ok(PortalSet::new(empty_leaf_count, portals))
}
