//! Dense square relation tables.

use std::ops::{Index, IndexMut};

/// Whether one leaf can see another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeafVisState {
    #[default]
    No,
    Yes,
}

/// Whether one directed portal might be seen through another, before any
/// flow is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PortalVisState {
    #[default]
    No,
    Maybe,
}

/// An `n x n` table relating an ordered set of objects (leaves or directed
/// portals), stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisTable<T> {
    size: usize,
    cells: Vec<T>,
}

/// The leaf-to-leaf visibility table.
pub type LeafVisTable = VisTable<LeafVisState>;

impl<T: Clone> VisTable<T> {
    /// Creates a table with every cell set to `initial`.
    pub fn new(size: usize, initial: T) -> Self {
        Self {
            size,
            cells: vec![initial; size * size],
        }
    }

    /// Builds a table from row-major cells. Returns `None` unless there are
    /// exactly `size * size` of them.
    pub fn from_cells(size: usize, cells: Vec<T>) -> Option<Self> {
        (size.checked_mul(size) == Some(cells.len())).then_some(Self { size, cells })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns row `i`.
    pub fn row(&self, i: usize) -> &[T] {
        &self.cells[i * self.size..(i + 1) * self.size]
    }
}

impl<T: Clone + PartialEq> VisTable<T> {
    /// Returns true if `table[(i, j)] == table[(j, i)]` everywhere.
    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| (0..i).all(|j| self[(i, j)] == self[(j, i)]))
    }
}

impl LeafVisTable {
    /// Number of leaves visible from leaf `i` (including itself).
    pub fn visible_count(&self, i: usize) -> usize {
        self.row(i)
            .iter()
            .filter(|&&state| state == LeafVisState::Yes)
            .count()
    }
}

impl<T> Index<(usize, usize)> for VisTable<T> {
    type Output = T;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        debug_assert!(i < self.size && j < self.size);
        &self.cells[i * self.size + j]
    }
}

impl<T> IndexMut<(usize, usize)> for VisTable<T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        debug_assert!(i < self.size && j < self.size);
        &mut self.cells[i * self.size + j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_row_major() {
        let mut table = VisTable::new(3, LeafVisState::No);
        table[(1, 2)] = LeafVisState::Yes;
        assert_eq!(table.row(1), &[LeafVisState::No, LeafVisState::No, LeafVisState::Yes]);
        assert_eq!(table[(2, 1)], LeafVisState::No);
        assert!(!table.is_symmetric());
        table[(2, 1)] = LeafVisState::Yes;
        assert!(table.is_symmetric());
        assert_eq!(table.visible_count(1), 1);
    }

    #[test]
    fn from_cells_checks_size() {
        assert!(VisTable::from_cells(2, vec![PortalVisState::No; 4]).is_some());
        assert!(VisTable::from_cells(2, vec![PortalVisState::No; 3]).is_none());
        assert_eq!(VisTable::<LeafVisState>::new(0, LeafVisState::No).size(), 0);
        assert!(VisTable::from_cells(usize::MAX, vec![PortalVisState::No; 1]).is_none());
    }
}
