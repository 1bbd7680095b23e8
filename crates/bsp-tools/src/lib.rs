//! Shared plumbing for the `hbsp`, `hportal`, `hvis` and `hcollate` tools.

use std::process::ExitCode;

use bsp_compiler::CompileError;
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use thiserror::Error;

/// Errors a tool can stop with.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The command line was well-formed but not meaningful.
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("could not start logging: {0}")]
    Logger(#[from] log::SetLoggerError),
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Which polygon type a tool operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonKind {
    /// Textured polygons (`-r`).
    Rendering,
    /// Collision polygons with a walkable flag (`-c`).
    Collision,
}

impl PolygonKind {
    /// Resolves the `-r`/`-c` switches; exactly one must be given.
    pub fn from_switches(rendering: bool, collision: bool) -> ToolResult<Self> {
        match (rendering, collision) {
            (true, false) => Ok(PolygonKind::Rendering),
            (false, true) => Ok(PolygonKind::Collision),
            _ => Err(ToolError::Usage(
                "exactly one of -r (rendering) or -c (collision) is required".to_owned(),
            )),
        }
    }
}

/// Starts terminal logging at `info`, or at the requested level.
pub fn init_logging(verbose: Option<LevelFilter>) -> ToolResult<()> {
    TermLogger::init(
        verbose.unwrap_or(LevelFilter::Info),
        ConfigBuilder::default()
            .set_time_level(LevelFilter::Trace)
            .build(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;
    Ok(())
}

/// Turns a tool's result into its exit status, printing the cause of a
/// failure on standard output.
pub fn finish(result: ToolResult<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
