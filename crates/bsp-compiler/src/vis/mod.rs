//! Potentially visible set calculation.
//!
//! Each portal is considered in both directions. Starting from every
//! directed portal, visibility flows from leaf to leaf through further
//! portals, narrowed at each step by the antipenumbra of the source portal
//! and the portal last passed through. The result is a symmetric,
//! reflexive table over the empty leaves.

mod antipenumbra;
mod calculator;
mod table;

pub use antipenumbra::Antipenumbra;
pub use calculator::calculate_vis;
pub use table::{LeafVisState, LeafVisTable, PortalVisState, VisTable};
