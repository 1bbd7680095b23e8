//! hvis: calculates the leaf-to-leaf potentially visible set.

use std::path::PathBuf;
use std::process::ExitCode;

use argh::FromArgs;
use bsp_compiler::io::{load_portals, load_tree, save_vis, TextValue};
use bsp_compiler::vis::calculate_vis;
use bsp_compiler::{CollisionInfo, CompileError, TextureName, TexturedVertex, Vertex};
use bsp_tools::{finish, init_logging, PolygonKind, ToolResult};
use log::info;
use nalgebra::Point3;

/// Calculate which empty leaves can see each other.
#[derive(Debug, FromArgs)]
struct Args {
    /// the tree holds rendering polygons
    #[argh(switch, short = 'r')]
    rendering: bool,
    /// the tree holds collision polygons
    #[argh(switch, short = 'c')]
    collision: bool,
    /// verbose level: off, error, warn, info, debug, trace
    #[argh(option)]
    verbose: Option<log::LevelFilter>,
    /// input tree file
    #[argh(positional)]
    tree: PathBuf,
    /// input portals file
    #[argh(positional)]
    portals: PathBuf,
    /// output visibility file
    #[argh(positional)]
    output: PathBuf,
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();
    finish(run(&args))
}

fn run(args: &Args) -> ToolResult<()> {
    init_logging(args.verbose)?;
    match PolygonKind::from_switches(args.rendering, args.collision)? {
        PolygonKind::Rendering => calculate::<TexturedVertex, TextureName>(args),
        PolygonKind::Collision => calculate::<Point3<f64>, CollisionInfo>(args),
    }
}

fn calculate<V, A>(args: &Args) -> ToolResult<()>
where
    V: Vertex + TextValue,
    A: Clone + TextValue,
{
    let (_, tree) = load_tree::<V, A>(&args.tree)?;
    let portals = load_portals(&args.portals)?;
    if portals.empty_leaf_count() != tree.empty_leaf_count() {
        return Err(CompileError::Format(format!(
            "{} has {} empty leaves but {} was generated for {}",
            args.tree.display(),
            tree.empty_leaf_count(),
            args.portals.display(),
            portals.empty_leaf_count()
        ))
        .into());
    }

    let table = calculate_vis(&portals);
    save_vis(&args.output, &table)?;
    info!("Wrote {}", args.output.display());
    Ok(())
}
