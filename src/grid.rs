//! Toroidal grid and Von-Neumann neighborhood queries.
//!
//! Cells are stored column by column (`index = x * height + y`), which is also
//! the order every per-cell pass and every random draw visits them.

use crate::cell::{Cell, FitnessSums, NeighborCounts, Strategy};

/// Orthogonal offsets around a cell, center first
const VON_NEUMANN: [(isize, isize); 5] = [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)];

/// Wraparound geometry for a `width x height` grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Torus {
    width: usize,
    height: usize,
}

impl Torus {
    /// Both dimensions must be at least 1; `Config::validate` guarantees it.
    pub fn new(width: usize, height: usize) -> Self {
        debug_assert!(width > 0 && height > 0);
        Self { width, height }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        x * self.height + y
    }

    #[inline]
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index / self.height, index % self.height)
    }

    /// Map any integer coordinate onto the grid
    #[inline]
    pub fn wrap(&self, x: isize, y: isize) -> (usize, usize) {
        (
            x.rem_euclid(self.width as isize) as usize,
            y.rem_euclid(self.height as isize) as usize,
        )
    }

    /// Radius-1 Von-Neumann neighborhood including the center.
    ///
    /// Wrapped coordinates that coincide (grids narrower than 3 cells) are
    /// listed once.
    pub fn von_neumann(&self, x: usize, y: usize) -> Neighborhood {
        let mut hood = Neighborhood::default();
        for (dx, dy) in VON_NEUMANN {
            let (nx, ny) = self.wrap(x as isize + dx, y as isize + dy);
            hood.push(self.index(nx, ny));
        }
        hood
    }
}

/// Up to five distinct cell indices
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Neighborhood {
    cells: [usize; 5],
    len: usize,
}

impl Neighborhood {
    fn push(&mut self, index: usize) {
        if !self.as_slice().contains(&index) {
            self.cells[self.len] = index;
            self.len += 1;
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.cells[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// The cell grid with precomputed neighborhoods
#[derive(Clone, Debug)]
pub struct Grid {
    torus: Torus,
    cells: Vec<Cell>,
    neighborhoods: Vec<Neighborhood>,
}

impl Grid {
    /// Build a grid, asking `strategy_at` for every coordinate in storage order.
    pub fn populate<F>(width: usize, height: usize, mut strategy_at: F) -> Self
    where
        F: FnMut(usize, usize) -> Strategy,
    {
        let torus = Torus::new(width, height);
        let cells = (0..torus.len())
            .map(|index| {
                let (x, y) = torus.coords(index);
                Cell::new(index as u64 + 1, x, y, strategy_at(x, y))
            })
            .collect();
        Self::from_cells(width, height, cells)
    }

    /// Rebuild from stored cells. Returns `None` if the count does not match
    /// or a cell's coordinates disagree with its storage position.
    pub fn try_from_cells(width: usize, height: usize, cells: Vec<Cell>) -> Option<Self> {
        if width == 0 || height == 0 || cells.len() != width * height {
            return None;
        }
        let torus = Torus::new(width, height);
        let in_place = cells
            .iter()
            .enumerate()
            .all(|(index, cell)| (cell.x, cell.y) == torus.coords(index));
        if !in_place {
            return None;
        }
        Some(Self::from_cells(width, height, cells))
    }

    fn from_cells(width: usize, height: usize, cells: Vec<Cell>) -> Self {
        let torus = Torus::new(width, height);
        let neighborhoods = (0..torus.len())
            .map(|index| {
                let (x, y) = torus.coords(index);
                torus.von_neumann(x, y)
            })
            .collect();
        Self {
            torus,
            cells,
            neighborhoods,
        }
    }

    #[inline]
    pub fn torus(&self) -> Torus {
        self.torus
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Cell at a coordinate; out-of-range coordinates wrap.
    pub fn get(&self, x: usize, y: usize) -> &Cell {
        let (x, y) = self.torus.wrap(x as isize, y as isize);
        &self.cells[self.torus.index(x, y)]
    }

    /// Cells in the neighborhood of `index`, the cell itself included
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.neighborhoods[index]
            .as_slice()
            .iter()
            .map(move |&i| &self.cells[i])
    }

    /// Strategy counts around `index`
    pub fn count_neighbors(&self, index: usize) -> NeighborCounts {
        let mut counts = NeighborCounts::default();
        for neighbor in self.neighbors(index) {
            counts.add(neighbor.strategy);
        }
        counts
    }

    /// Current fitness summed by neighbor strategy around `index`
    pub fn sum_neighbor_fitness(&self, index: usize) -> FitnessSums {
        let mut sums = FitnessSums::default();
        for neighbor in self.neighbors(index) {
            sums.add(neighbor.strategy, neighbor.fitness);
        }
        sums
    }

    /// Whole-grid strategy tally
    pub fn census(&self) -> NeighborCounts {
        let mut counts = NeighborCounts::default();
        for cell in &self.cells {
            counts.add(cell.strategy);
        }
        counts
    }
}
