use std::collections::HashSet;

use rand::Rng;
use rand::seq::IteratorRandom;

pub const GRID_W: i32 = 40;
pub const GRID_H: i32 = 30;

// Rejection sampling gives up after this many misses and scans the free cells instead
const SAMPLE_ATTEMPTS: usize = 256;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    pub fn offset(self, (dx, dy): (i32, i32)) -> Self {
        wrap(Cell::new(self.x + dx, self.y + dy))
    }
}

/// Folds a cell back onto the torus, both coordinates always non-negative.
pub fn wrap(cell: Cell) -> Cell {
    Cell::new(cell.x.rem_euclid(GRID_W), cell.y.rem_euclid(GRID_H))
}

pub fn all_cells() -> impl Iterator<Item = Cell> {
    (0..GRID_H).flat_map(|y| (0..GRID_W).map(move |x| Cell::new(x, y)))
}

/// Picks a uniformly random cell not in `excluded`.
///
/// Returns `None` only when every cell of the grid is excluded.
pub fn random_empty_cell<R: Rng>(rng: &mut R, excluded: &HashSet<Cell>) -> Option<Cell> {
    for _ in 0..SAMPLE_ATTEMPTS {
        let cell = Cell::new(rng.gen_range(0..GRID_W), rng.gen_range(0..GRID_H));
        if !excluded.contains(&cell) {
            return Some(cell);
        }
    }

    all_cells().filter(|c| !excluded.contains(c)).choose(rng)
}
