//! Portals: the openings between adjacent empty leaves.
//!
//! A portal is a convex polygon lying on a splitting plane, tagged with the
//! two leaves it connects. Its normal points from `back_leaf` into
//! `front_leaf`.

mod generator;

use nalgebra::Point3;

use crate::Polygon;

pub use generator::{generate_portals, PortalOptions, DEFAULT_PORTAL_MARGIN};

/// The leaves a portal connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortalInfo {
    pub front_leaf: usize,
    pub back_leaf: usize,
}

impl PortalInfo {
    pub fn new(front_leaf: usize, back_leaf: usize) -> Self {
        Self {
            front_leaf,
            back_leaf,
        }
    }

    /// The same connection seen from the other side.
    pub fn reversed(self) -> Self {
        Self::new(self.back_leaf, self.front_leaf)
    }
}

/// A portal polygon.
pub type Portal = Polygon<Point3<f64>, PortalInfo>;

/// The portals of a level together with the number of empty leaves they
/// connect.
#[derive(Debug, Clone, PartialEq)]
pub struct PortalSet {
    empty_leaf_count: usize,
    portals: Vec<Portal>,
}

impl PortalSet {
    pub fn new(empty_leaf_count: usize, portals: Vec<Portal>) -> Self {
        Self {
            empty_leaf_count,
            portals,
        }
    }

    #[inline]
    pub fn empty_leaf_count(&self) -> usize {
        self.empty_leaf_count
    }

    #[inline]
    pub fn portals(&self) -> &[Portal] {
        &self.portals
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.portals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.portals.is_empty()
    }

    /// Indices of the portals touching `leaf` on either side.
    pub fn portals_of_leaf(&self, leaf: usize) -> Vec<usize> {
        self.portals
            .iter()
            .enumerate()
            .filter(|(_, p)| p.aux().front_leaf == leaf || p.aux().back_leaf == leaf)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn into_portals(self) -> Vec<Portal> {
        self.portals
    }
}
