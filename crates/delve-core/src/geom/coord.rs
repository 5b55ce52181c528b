//! Integer coordinates, distance metrics and rectangles

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::consts::{GXM, GYM, MAPGEN_BORDER, X_BOUND_1, X_BOUND_2, Y_BOUND_1, Y_BOUND_2};

/// A cell position or a displacement between two cells
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

/// The eight neighbouring offsets, clockwise from north
pub const COMPASS: [Coord; 8] = [
    Coord::new(0, -1),
    Coord::new(1, -1),
    Coord::new(1, 0),
    Coord::new(1, 1),
    Coord::new(0, 1),
    Coord::new(-1, 1),
    Coord::new(-1, 0),
    Coord::new(-1, -1),
];

/// The four orthogonal offsets
pub const ORTHOGONAL: [Coord; 4] = [
    Coord::new(0, -1),
    Coord::new(1, 0),
    Coord::new(0, 1),
    Coord::new(-1, 0),
];

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn origin() -> Self {
        Self { x: 0, y: 0 }
    }

    pub const fn is_origin(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Chebyshev length of this vector
    pub const fn rdist(&self) -> i32 {
        let ax = self.x.abs();
        let ay = self.y.abs();
        if ax > ay { ax } else { ay }
    }

    /// Squared Euclidean length of this vector
    pub const fn abs(&self) -> i32 {
        self.x * self.x + self.y * self.y
    }

    /// Chebyshev distance to another cell
    pub const fn distance_to(&self, other: Coord) -> i32 {
        Coord::new(self.x - other.x, self.y - other.y).rdist()
    }

    /// Squared Euclidean distance to another cell
    pub const fn distance_sq_to(&self, other: Coord) -> i32 {
        Coord::new(self.x - other.x, self.y - other.y).abs()
    }

    /// Component-wise sign, turning a displacement into a unit step
    pub const fn sgn(&self) -> Coord {
        Coord::new(self.x.signum(), self.y.signum())
    }

    /// The eight cells around this one (may fall outside the map)
    pub fn neighbours(self) -> impl Iterator<Item = Coord> {
        COMPASS.into_iter().map(move |d| self + d)
    }

    /// The four orthogonal cells around this one
    pub fn orthogonal_neighbours(self) -> impl Iterator<Item = Coord> {
        ORTHOGONAL.into_iter().map(move |d| self + d)
    }
}

impl Add for Coord {
    type Output = Coord;
    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Coord {
    fn add_assign(&mut self, rhs: Coord) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Coord {
    type Output = Coord;
    fn sub(self, rhs: Coord) -> Coord {
        Coord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Coord {
    fn sub_assign(&mut self, rhs: Coord) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for Coord {
    type Output = Coord;
    fn neg(self) -> Coord {
        Coord::new(-self.x, -self.y)
    }
}

impl Mul<i32> for Coord {
    type Output = Coord;
    fn mul(self, rhs: i32) -> Coord {
        Coord::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Coord::new(x, y)
    }
}

/// Anywhere in the backing array
pub const fn in_bounds(c: Coord) -> bool {
    c.x >= 0 && c.x < GXM && c.y >= 0 && c.y < GYM
}

/// Inside the outer ring of permanent rock
pub const fn in_map_bounds(c: Coord) -> bool {
    c.x >= X_BOUND_1 && c.x <= X_BOUND_2 && c.y >= Y_BOUND_1 && c.y <= Y_BOUND_2
}

/// Inside the margin that generation passes are allowed to touch
pub const fn in_gen_bounds(c: Coord) -> bool {
    c.x >= MAPGEN_BORDER
        && c.x < GXM - MAPGEN_BORDER
        && c.y >= MAPGEN_BORDER
        && c.y < GYM - MAPGEN_BORDER
}

/// Inclusive axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub tl: Coord,
    pub br: Coord,
}

impl Rect {
    /// Build from any two opposite corners
    pub fn new(a: Coord, b: Coord) -> Self {
        Self {
            tl: Coord::new(a.x.min(b.x), a.y.min(b.y)),
            br: Coord::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn from_size(tl: Coord, size: Coord) -> Self {
        Self::new(tl, tl + size - Coord::new(1, 1))
    }

    pub fn width(&self) -> i32 {
        self.br.x - self.tl.x + 1
    }

    pub fn height(&self) -> i32 {
        self.br.y - self.tl.y + 1
    }

    pub fn contains(&self, c: Coord) -> bool {
        c.x >= self.tl.x && c.x <= self.br.x && c.y >= self.tl.y && c.y <= self.br.y
    }

    /// True if `c` lies on the outermost ring of the rectangle
    pub fn on_edge(&self, c: Coord) -> bool {
        self.contains(c)
            && (c.x == self.tl.x || c.x == self.br.x || c.y == self.tl.y || c.y == self.br.y)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.tl.x <= other.br.x
            && other.tl.x <= self.br.x
            && self.tl.y <= other.br.y
            && other.tl.y <= self.br.y
    }

    /// Grow (or shrink, for negative `by`) on every side
    pub fn inflate(&self, by: i32) -> Rect {
        Rect {
            tl: self.tl - Coord::new(by, by),
            br: self.br + Coord::new(by, by),
        }
    }

    pub fn center(&self) -> Coord {
        Coord::new((self.tl.x + self.br.x) / 2, (self.tl.y + self.br.y) / 2)
    }

    /// Every cell, column by column
    pub fn cells(&self) -> impl Iterator<Item = Coord> + use<> {
        let (tl, br) = (self.tl, self.br);
        (tl.x..=br.x).flat_map(move |x| (tl.y..=br.y).map(move |y| Coord::new(x, y)))
    }

    /// Cells on the outer ring only
    pub fn edge_cells(&self) -> impl Iterator<Item = Coord> + use<> {
        let r = *self;
        r.cells().filter(move |c| r.on_edge(*c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distances() {
        let d = Coord::new(3, -4);
        assert_eq!(d.rdist(), 4);
        assert_eq!(d.abs(), 25);
        assert_eq!(Coord::new(1, 1).distance_to(Coord::new(4, 2)), 3);
        assert_eq!(Coord::new(1, 1).distance_sq_to(Coord::new(4, 2)), 10);
    }

    #[test]
    fn test_vector_ops() {
        let a = Coord::new(2, 5);
        let b = Coord::new(-1, 3);
        assert_eq!(a + b, Coord::new(1, 8));
        assert_eq!(a - b, Coord::new(3, 2));
        assert_eq!(-a, Coord::new(-2, -5));
        assert_eq!(b * 3, Coord::new(-3, 9));
        assert_eq!(Coord::new(-7, 0).sgn(), Coord::new(-1, 0));
    }

    #[test]
    fn test_bounds_helpers() {
        assert!(in_bounds(Coord::new(0, 0)));
        assert!(!in_bounds(Coord::new(GXM, 0)));
        assert!(!in_map_bounds(Coord::new(0, 5)));
        assert!(in_map_bounds(Coord::new(1, 1)));
        assert!(!in_gen_bounds(Coord::new(1, 1)));
        assert!(in_gen_bounds(Coord::new(MAPGEN_BORDER, MAPGEN_BORDER)));
    }

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(Coord::new(5, 5), Coord::new(2, 3));
        assert_eq!(r.tl, Coord::new(2, 3));
        assert_eq!(r.width(), 4);
        assert_eq!(r.height(), 3);
        assert_eq!(r.cells().count(), 12);
        assert_eq!(r.edge_cells().count(), 10);
        assert!(r.on_edge(Coord::new(2, 4)));
        assert!(!r.on_edge(Coord::new(3, 4)));
    }

    #[test]
    fn test_cell_iterators_outlive_the_rect() {
        let ring: Vec<Coord> = {
            let r = Rect::new(Coord::new(1, 1), Coord::new(3, 3));
            r.edge_cells()
        }
        .collect();
        assert_eq!(ring.len(), 8);
        assert!(!ring.contains(&Coord::new(2, 2)));
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::from_size(Coord::new(0, 0), Coord::new(4, 4));
        let b = Rect::from_size(Coord::new(3, 3), Coord::new(2, 2));
        let c = Rect::from_size(Coord::new(4, 0), Coord::new(2, 2));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.inflate(1).intersects(&c));
    }
}
