//! Sparse hash grid for efficient spatial queries

use ahash::AHashMap;

use crate::core::types::Vec2;

/// Sparse hash grid over arena indices
#[derive(Debug, Clone)]
pub struct SparseHashGrid {
    cell_size: f32,
    cells: AHashMap<(i32, i32), Vec<usize>>,
}

impl SparseHashGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(f32::EPSILON),
            cells: AHashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    fn cell_coord(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, index: usize, pos: Vec2) {
        let coord = self.cell_coord(pos);
        self.cells.entry(coord).or_default().push(index);
    }

    pub fn remove(&mut self, index: usize, pos: Vec2) {
        let coord = self.cell_coord(pos);
        if let Some(cell) = self.cells.get_mut(&coord) {
            cell.retain(|&e| e != index);
        }
    }

    /// Query all entries in cells within `reach` cells of `pos`
    pub fn query_neighbors(&self, pos: Vec2, reach: i32) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = self.cell_coord(pos);

        (-reach..=reach).flat_map(move |dx| {
            (-reach..=reach).flat_map(move |dy| {
                self.cells
                    .get(&(cx + dx, cy + dy))
                    .into_iter()
                    .flatten()
                    .copied()
            })
        })
    }

    /// Entries within `radius` of `center`, sorted ascending
    ///
    /// `positions` is indexed by the values stored in the grid.
    pub fn query_radius(&self, center: Vec2, radius: f32, positions: &[Vec2]) -> Vec<usize> {
        let reach = ((radius / self.cell_size).ceil() as i32).max(1);
        let mut found: Vec<usize> = self
            .query_neighbors(center, reach)
            .filter(|&idx| {
                positions
                    .get(idx)
                    .map(|pos| center.distance(pos) <= radius)
                    .unwrap_or(false)
            })
            .collect();
        found.sort_unstable();
        found
    }

    /// Rebuild grid from positions
    pub fn rebuild(&mut self, entries: impl Iterator<Item = (usize, Vec2)>) {
        self.clear();
        for (index, pos) in entries {
            self.insert(index, pos);
        }
    }
}
