//! Text file formats.
//!
//! Every artifact is a sequence of tagged sections: a name line, a `{`
//! line, content lines and a `}` line.

mod files;
mod lines;
mod polygon_text;
mod portal_text;
mod tree_text;
mod vis_text;

pub use files::{
    check_consistency, load_geometry, load_level, load_portals, load_tree, load_vis,
    save_geometry, save_level, save_portals, save_tree, save_vis, Level, LEVEL_HEADER,
};
pub use lines::{LineReader, Tokens};
pub use polygon_text::{
    polygon_from_line, polygon_to_line, read_polygon_lines, read_polygons_section,
    write_polygon_lines, write_polygons_section, TextValue,
};
pub use portal_text::{read_portals_section, write_portals_section};
pub use tree_text::{node_from_line, node_to_line, read_tree_section, write_tree_section};
pub use vis_text::{read_vis_section, write_vis_section};
