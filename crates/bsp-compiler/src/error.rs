//! Error type shared by every compile stage and file format.
//!
//! The compiler is fail-fast: errors propagate to the caller untouched and
//! there is no local recovery.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading, compiling or saving level data.
#[derive(Error, Debug)]
pub enum CompileError {
    /// A file could not be opened or created.
    #[error("could not open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading or writing failed part way through a stream.
    #[error("I/O failure: {0}")]
    Stream(#[from] std::io::Error),

    /// The text did not follow the expected layout.
    #[error("{0}")]
    Format(String),

    /// A polygon is degenerate, non-planar or non-convex.
    #[error("bad geometry: {0}")]
    Geometry(String),

    /// Every splitter candidate for a polygon set was rejected.
    #[error("no valid splitter for a set of {count} polygons (indices {indices:?})")]
    NoValidSplitter { count: usize, indices: Vec<usize> },
}

impl CompileError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        CompileError::Format(message.into())
    }

    pub(crate) fn geometry(message: impl Into<String>) -> Self {
        CompileError::Geometry(message.into())
    }
}

/// Result type alias for compile operations.
pub type CompileResult<T> = Result<T, CompileError>;
