//! Grid and geometry primitives shared by the level builder and the beam engine

mod coord;
mod grid;
mod ray;

pub use coord::{COMPASS, Coord, ORTHOGONAL, Rect, in_bounds, in_gen_bounds, in_map_bounds};
pub use grid::Grid;
pub use ray::Ray;
