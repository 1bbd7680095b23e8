//! hportal: finds the portals between the empty leaves of a BSP tree.

use std::path::PathBuf;
use std::process::ExitCode;

use argh::FromArgs;
use bsp_compiler::io::{load_tree, save_portals, TextValue};
use bsp_compiler::portal::{generate_portals, PortalOptions, DEFAULT_PORTAL_MARGIN};
use bsp_compiler::{CollisionInfo, TextureName, TexturedVertex, Vertex};
use bsp_tools::{finish, init_logging, PolygonKind, ToolResult};
use log::info;
use nalgebra::Point3;

/// Generate the portals of a compiled BSP tree.
#[derive(Debug, FromArgs)]
struct Args {
    /// the tree holds rendering polygons
    #[argh(switch, short = 'r')]
    rendering: bool,
    /// the tree holds collision polygons
    #[argh(switch, short = 'c')]
    collision: bool,
    /// how far the level bounds are enlarged before clipping splitter planes
    #[argh(option, default = "DEFAULT_PORTAL_MARGIN")]
    margin: f64,
    /// verbose level: off, error, warn, info, debug, trace
    #[argh(option)]
    verbose: Option<log::LevelFilter>,
    /// input tree file
    #[argh(positional)]
    input: PathBuf,
    /// output portals file
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
        PolygonKind::Rendering => generate::<TexturedVertex, TextureName>(args),
        PolygonKind::Collision => generate::<Point3<f64>, CollisionInfo>(args),
    }
}

fn generate<V, A>(args: &Args) -> ToolResult<()>
where
    V: Vertex + TextValue,
    A: Clone + TextValue,
{
    let (polygons, tree) = load_tree::<V, A>(&args.input)?;
    let options = PortalOptions {
        margin: args.margin,
    };
    let portals = generate_portals(&tree, &polygons, &options);
    save_portals(&args.output, &portals)?;
    info!("Wrote {}", args.output.display());
    Ok(())
}
