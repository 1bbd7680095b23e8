//! hcollate: merges the compile outputs into a single level file.

use std::path::PathBuf;
use std::process::ExitCode;

use argh::FromArgs;
use bsp_compiler::io::{load_portals, load_tree, load_vis, save_level, Level};
use bsp_compiler::{TextureName, TexturedVertex};
use bsp_tools::{finish, init_logging, ToolResult};
use log::info;

/// Collate a rendering tree, its portals and its visibility table into a level file.
#[derive(Debug, FromArgs)]
struct Args {
    /// verbose level: off, error, warn, info, debug, trace
    #[argh(option)]
    verbose: Option<log::LevelFilter>,
    /// input tree file (rendering polygons)
    #[argh(positional)]
    tree: PathBuf,
    /// input portals file
    #[argh(positional)]
    portals: PathBuf,
    /// input visibility file
    #[argh(positional)]
    vis: PathBuf,
    /// output level file
    #[argh(positional)]
    output: PathBuf,
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();
    finish(run(&args))
}

fn run(args: &Args) -> ToolResult<()> {
    init_logging(args.verbose)?;
    let (polygons, tree) = load_tree::<TexturedVertex, TextureName>(&args.tree)?;
    let level = Level {
        polygons,
        tree,
        portals: load_portals(&args.portals)?,
        vis: load_vis(&args.vis)?,
    };
    save_level(&args.output, &level)?;
    info!(
        "Wrote {} ({} polygons, {} leaves, {} portals)",
        args.output.display(),
        level.polygons.len(),
        level.tree.leaf_count(),
        level.portals.len()
    );
    Ok(())
}
