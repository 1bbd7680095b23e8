//! Text encoding of the leaf visibility table.
//!
//! One row per line, one `0`/`1` character per column.

use std::io::{BufRead, Write};

use crate::error::CompileResult;
use crate::vis::{LeafVisState, LeafVisTable, VisTable};

use super::lines::LineReader;

/// Writes a `VisTable` section.
pub fn write_vis_section<W: Write>(out: &mut W, table: &LeafVisTable) -> CompileResult<()> {
    writeln!(out, "VisTable")?;
    writeln!(out, "{{")?;
    writeln!(out, "{}", table.size())?;
    for i in 0..table.size() {
        let row: String = table
            .row(i)
            .iter()
            .map(|state| match state {
                LeafVisState::No => '0',
                LeafVisState::Yes => '1',
            })
            .collect();
        writeln!(out, "{row}")?;
    }
    writeln!(out, "}}")?;
    Ok(())
}

/// Reads a `VisTable` section.
pub fn read_vis_section<R: BufRead>(reader: &mut LineReader<R>) -> CompileResult<LeafVisTable> {
    reader.begin_section("VisTable")?;
    let size: usize = reader.read_value("the table size")?;
    if size.checked_mul(size).is_none() {
        return Err(reader.error(format!("table size {size} is too large")));
    }
    let mut cells = Vec::new();
    for _ in 0..size {
        let line = reader.read_line("a table row")?;
        let row = line.trim();
        if row.len() != size {
            return Err(reader.error(format!(
                "expected a row of {size} entries, found {}",
                row.len()
            )));
        }
        for c in row.chars() {
            cells.push(match c {
                '0' => LeafVisState::No,
                '1' => LeafVisState::Yes,
                other => {
                    return Err(reader.error(format!("expected `0` or `1`, found `{other}`")));
                }
            });
        }
    }
    reader.end_section()?;
    VisTable::from_cells(size, cells).ok_or_else(|| reader.error("table is not square"))
}
