//! Fixed-size 2D storage indexed by `Coord`

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use super::{Coord, Rect};

/// Bounded column-major array; `cells[x][y]`
///
/// Indexing outside the grid is a contract violation and panics. Use
/// [`Grid::get`] when a position may be off the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: i32,
    height: i32,
    cells: Vec<Vec<T>>,
}

impl<T: Clone> Grid<T> {
    pub fn new(width: i32, height: i32, fill: T) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        Self {
            width,
            height,
            cells: vec![vec![fill; height as usize]; width as usize],
        }
    }

    /// Overwrite every cell
    pub fn fill(&mut self, value: T) {
        for col in &mut self.cells {
            for cell in col.iter_mut() {
                *cell = value.clone();
            }
        }
    }
}

impl<T> Grid<T> {
    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, c: Coord) -> bool {
        c.x >= 0 && c.x < self.width && c.y >= 0 && c.y < self.height
    }

    pub fn get(&self, c: Coord) -> Option<&T> {
        if self.contains(c) {
            Some(&self.cells[c.x as usize][c.y as usize])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, c: Coord) -> Option<&mut T> {
        if self.contains(c) {
            Some(&mut self.cells[c.x as usize][c.y as usize])
        } else {
            None
        }
    }

    /// The whole grid as a rectangle
    pub fn bounds(&self) -> Rect {
        Rect::new(Coord::origin(), Coord::new(self.width - 1, self.height - 1))
    }

    /// Every coordinate, column by column
    pub fn coords(&self) -> impl Iterator<Item = Coord> + use<T> {
        let (w, h) = (self.width, self.height);
        (0..w).flat_map(move |x| (0..h).map(move |y| Coord::new(x, y)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord, &T)> {
        self.cells.iter().enumerate().flat_map(|(x, col)| {
            col.iter()
                .enumerate()
                .map(move |(y, v)| (Coord::new(x as i32, y as i32), v))
        })
    }

    fn check(&self, c: Coord) {
        assert!(
            self.contains(c),
            "grid access out of bounds: ({}, {}) on {}x{}",
            c.x,
            c.y,
            self.width,
            self.height
        );
    }
}

impl<T: Copy + PartialEq> Grid<T> {
    /// Set every cell of `rect` (clipped to the grid)
    pub fn fill_rect(&mut self, rect: Rect, value: T) {
        for c in rect.cells() {
            if let Some(cell) = self.get_mut(c) {
                *cell = value;
            }
        }
    }

    /// Replace `from` with `to` inside `rect`; returns how many cells changed
    pub fn replace_in_rect(&mut self, rect: Rect, from: T, to: T) -> usize {
        let mut changed = 0;
        for c in rect.cells() {
            if let Some(cell) = self.get_mut(c) {
                if *cell == from {
                    *cell = to;
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Count cells equal to `value` inside `rect`
    pub fn count_in_rect(&self, rect: Rect, value: T) -> usize {
        rect.cells()
            .filter(|c| self.get(*c).is_some_and(|v| *v == value))
            .count()
    }

    /// Count in-grid cells *not* equal to `value` inside `rect`
    pub fn count_not_in_rect(&self, rect: Rect, value: T) -> usize {
        rect.cells()
            .filter(|c| self.get(*c).is_some_and(|v| *v != value))
            .count()
    }

    /// Count matching cells over the whole grid
    pub fn count(&self, value: T) -> usize {
        self.iter().filter(|(_, v)| **v == value).count()
    }
}

impl<T> Index<Coord> for Grid<T> {
    type Output = T;

    fn index(&self, c: Coord) -> &T {
        self.check(c);
        &self.cells[c.x as usize][c.y as usize]
    }
}

impl<T> IndexMut<Coord> for Grid<T> {
    fn index_mut(&mut self, c: Coord) -> &mut T {
        self.check(c);
        &mut self.cells[c.x as usize][c.y as usize]
    }
}
