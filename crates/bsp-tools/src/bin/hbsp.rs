//! hbsp: compiles level geometry into a BSP tree.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use argh::FromArgs;
use bsp_compiler::bsp::{compile, BalancedSplitter, DEFAULT_SPLITTER_WEIGHT};
use bsp_compiler::io::{load_geometry, save_tree, TextValue};
use bsp_compiler::{CollisionInfo, TextureName, TexturedVertex, Vertex};
use bsp_tools::{finish, init_logging, PolygonKind, ToolError, ToolResult};
use log::{info, warn};
use nalgebra::Point3;

/// Build a BSP tree from a geometry file, optionally guided by hint polygons.
#[derive(Debug, FromArgs)]
struct Args {
    /// compile rendering polygons
    #[argh(switch, short = 'r')]
    rendering: bool,
    /// compile collision polygons
    #[argh(switch, short = 'c')]
    collision: bool,
    /// splitter weight: the cost of one split relative to one polygon of imbalance
    #[argh(option, short = 'w', default = "DEFAULT_SPLITTER_WEIGHT")]
    weight: f64,
    /// verbose level: off, error, warn, info, debug, trace
    #[argh(option)]
    verbose: Option<log::LevelFilter>,
    /// input geometry file
    #[argh(positional)]
    input: PathBuf,
    /// hint geometry file, or `nohints`
    #[argh(positional)]
    hints: String,
    /// output tree file
    #[argh(positional)]
    output: PathBuf,
}

fn main() -> ExitCode {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    match parse_args(&raw) {
        Ok(args) => finish(run(&args)),
        Err(exit) => match exit.status {
            Ok(()) => {
                println!("{}", exit.output);
                ExitCode::SUCCESS
            }
            Err(()) => {
                eprintln!("{}\nRun hbsp --help for more information.", exit.output);
                ExitCode::FAILURE
            }
        },
    }
}

fn parse_args(raw: &[String]) -> Result<Args, argh::EarlyExit> {
    let expanded = expand_glued_weight(raw);
    let refs: Vec<&str> = expanded.iter().map(String::as_str).collect();
    Args::from_args(&["hbsp"], &refs)
}

/// Splits `-w<weight>` into `-w <weight>`. Arguments after `--` are left
/// alone.
fn expand_glued_weight(raw: &[String]) -> Vec<String> {
    let mut expanded = Vec::with_capacity(raw.len() + 1);
    let mut options_done = false;
    for arg in raw {
        if options_done {
            expanded.push(arg.clone());
            continue;
        }
        match arg.strip_prefix("-w") {
            Some(weight) if !weight.is_empty() => {
                expanded.push("-w".to_owned());
                expanded.push(weight.to_owned());
            }
            _ => {
                options_done = arg == "--";
                expanded.push(arg.clone());
            }
        }
    }
    expanded
}

fn run(args: &Args) -> ToolResult<()> {
    init_logging(args.verbose)?;
    if !args.weight.is_finite() || args.weight < 0.0 {
        return Err(ToolError::Usage(format!(
            "the splitter weight must be a non-negative number, not {}",
            args.weight
        )));
    }
    match PolygonKind::from_switches(args.rendering, args.collision)? {
        PolygonKind::Rendering => build::<TexturedVertex, TextureName>(args),
        PolygonKind::Collision => build::<Point3<f64>, CollisionInfo>(args),
    }
}

fn build<V, A>(args: &Args) -> ToolResult<()>
where
    V: Vertex + TextValue,
    A: Clone + TextValue,
{
    let polygons = load_geometry::<V, A>(&args.input)?;
    if polygons.is_empty() {
        warn!("{} contains no polygons", args.input.display());
    }
    let hints = if args.hints == "nohints" {
        Vec::new()
    } else {
        load_geometry::<V, A>(Path::new(&args.hints))?
    };

    let metric = BalancedSplitter::new(args.weight);
    let level = compile(polygons, hints, &metric)?;
    save_tree(&args.output, level.polygons(), level.tree())?;
    info!("Wrote {}", args.output.display());
    Ok(())
}
