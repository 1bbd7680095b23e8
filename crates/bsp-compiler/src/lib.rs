//! Offline spatial compiler for static polygonal levels.
//!
//! The pipeline has three stages, each reading the previous stage's text
//! output:
//!
//! 1. [`bsp`]: partition the level polygons into a BSP tree whose leaves
//!    are convex empty or solid regions.
//! 2. [`portal`]: find the openings between adjacent empty leaves.
//! 3. [`vis`]: flow visibility through the portals to get a leaf-to-leaf
//!    potentially visible set.

pub mod bsp;
mod cuttable;
pub mod error;
pub mod io;
mod plane;
mod polygon;
pub mod portal;
mod vertex;
pub mod vis;

pub use cuttable::Cuttable;
pub use error::{CompileError, CompileResult};
pub use plane::{Classification, Plane3D, PlaneSide, PLANE_EPSILON};
pub use polygon::{
    CollisionInfo, CollisionPolygon, Polygon, RenderingPolygon, TextureName, MIN_POLYGON_AREA,
};
pub use vertex::{TexturedVertex, Vertex};
