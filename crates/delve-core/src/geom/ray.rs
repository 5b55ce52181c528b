//! Digital ray casting with regress and bounce

use super::Coord;

/// A digital line from a source through a target, extended indefinitely
///
/// Steps follow Bresenham's error accumulator, so every cell on the line is
/// produced exactly once per pass and the ray keeps going past the target.
/// The ray remembers a single previous state so that a step into a solid
/// cell can be undone (`regress`) or reflected (`bounce`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ray {
    source: Coord,
    pos: Coord,
    step: Coord,
    dx: i32,
    dy: i32,
    err: i32,
    prev: Option<(Coord, i32)>,
}

impl Ray {
    pub fn new(source: Coord, target: Coord) -> Self {
        let d = target - source;
        let dx = d.x.abs();
        let dy = -d.y.abs();
        Self {
            source,
            pos: source,
            step: d.sgn(),
            dx,
            dy,
            err: dx + dy,
            prev: None,
        }
    }

    pub fn source(&self) -> Coord {
        self.source
    }

    pub fn pos(&self) -> Coord {
        self.pos
    }

    /// Unit step signs currently in effect
    pub fn direction(&self) -> Coord {
        self.step
    }

    /// Source and target coincide; the ray never leaves its cell
    pub fn aimed_at_self(&self) -> bool {
        self.step.is_origin()
    }

    /// Move one cell along the line and return the new position
    pub fn advance(&mut self) -> Coord {
        if self.aimed_at_self() {
            return self.pos;
        }
        self.prev = Some((self.pos, self.err));
        let e2 = 2 * self.err;
        if e2 >= self.dy {
            self.err += self.dy;
            self.pos.x += self.step.x;
        }
        if e2 <= self.dx {
            self.err += self.dx;
            self.pos.y += self.step.y;
        }
        self.pos
    }

    /// Where the next `advance` would land, without moving
    pub fn peek(&self) -> Coord {
        let mut probe = *self;
        probe.advance()
    }

    /// Undo the last step; returns false if there is nothing to undo
    pub fn regress(&mut self) -> bool {
        match self.prev.take() {
            Some((pos, err)) => {
                self.pos = pos;
                self.err = err;
                true
            }
            None => false,
        }
    }

    /// Reflect off the solid cell the ray has just stepped onto
    ///
    /// The ray backs up to its previous cell and mirrors one or both axes,
    /// preferring the reflection implied by the shape of the wall. Returns
    /// false, leaving the ray on the previous cell, when every reflection
    /// leads straight into another solid cell.
    pub fn bounce(&mut self, is_solid: impl Fn(Coord) -> bool) -> bool {
        let Some((prev_pos, _)) = self.prev else {
            return false;
        };
        let moved = self.pos - prev_pos;
        self.regress();

        let candidates: [(bool, bool); 3] = if moved.x != 0 && moved.y != 0 {
            let side_x = is_solid(prev_pos + Coord::new(moved.x, 0));
            let side_y = is_solid(prev_pos + Coord::new(0, moved.y));
            match (side_x, side_y) {
                (true, false) => [(true, false), (true, true), (false, true)],
                (false, true) => [(false, true), (true, true), (true, false)],
                _ => [(true, true), (true, false), (false, true)],
            }
        } else if moved.x != 0 {
            [(true, false), (true, true), (false, true)]
        } else {
            [(false, true), (true, true), (true, false)]
        };

        for (flip_x, flip_y) in candidates {
            let mut trial = *self;
            if flip_x {
                trial.step.x = -trial.step.x;
            }
            if flip_y {
                trial.step.y = -trial.step.y;
            }
            if trial.step == self.step {
                continue;
            }
            if !is_solid(trial.peek()) {
                *self = trial;
                return true;
            }
        }
        false
    }

    /// Advance until reaching a cell for which `visited` is false
    ///
    /// Gives up after `max_steps` steps and returns `None`.
    pub fn advance_skipping(
        &mut self,
        visited: impl Fn(Coord) -> bool,
        max_steps: usize,
    ) -> Option<Coord> {
        if self.aimed_at_self() {
            return None;
        }
        for _ in 0..max_steps {
            let pos = self.advance();
            if !visited(pos) {
                return Some(pos);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(ray: &mut Ray, n: usize) -> Vec<Coord> {
        (0..n).map(|_| ray.advance()).collect()
    }

    #[test]
    fn test_straight_and_diagonal_lines() {
        let mut ray = Ray::new(Coord::new(0, 0), Coord::new(3, 0));
        assert_eq!(
            walk(&mut ray, 4),
            vec![
                Coord::new(1, 0),
                Coord::new(2, 0),
                Coord::new(3, 0),
                Coord::new(4, 0)
            ]
        );

        let mut ray = Ray::new(Coord::new(5, 5), Coord::new(2, 2));
        assert_eq!(walk(&mut ray, 2), vec![Coord::new(4, 4), Coord::new(3, 3)]);
    }

    #[test]
    fn test_line_reaches_target_in_rdist_steps() {
        for target in [
            Coord::new(7, 3),
            Coord::new(-4, 9),
            Coord::new(2, -6),
            Coord::new(-5, -5),
        ] {
            let mut ray = Ray::new(Coord::origin(), target);
            let path = walk(&mut ray, target.rdist() as usize);
            assert_eq!(*path.last().unwrap(), target);
            for pair in path.windows(2) {
                assert_eq!((pair[1] - pair[0]).rdist(), 1);
            }
        }
    }

    #[test]
    fn test_regress_undoes_one_step() {
        let mut ray = Ray::new(Coord::new(0, 0), Coord::new(5, 2));
        ray.advance();
        let before = ray;
        ray.advance();
        assert!(ray.regress());
        assert_eq!(ray, Ray { prev: None, ..before });
        assert!(!ray.regress());
    }

    #[test]
    fn test_aimed_at_self_never_moves() {
        let mut ray = Ray::new(Coord::new(4, 4), Coord::new(4, 4));
        assert!(ray.aimed_at_self());
        assert_eq!(ray.advance(), Coord::new(4, 4));
        assert!(ray.advance_skipping(|_| true, 10).is_none());
    }

    #[test]
    fn test_bounce_off_vertical_wall_reverses_x() {
        let wall_x = 5;
        let solid = |c: Coord| c.x >= wall_x;
        let mut ray = Ray::new(Coord::new(0, 0), Coord::new(10, 0));
        let mut pos = ray.advance();
        while !solid(pos) {
            pos = ray.advance();
        }
        assert!(ray.bounce(solid));
        assert_eq!(ray.pos(), Coord::new(4, 0));
        assert_eq!(ray.advance(), Coord::new(3, 0));
    }

    #[test]
    fn test_diagonal_bounce_off_horizontal_wall_keeps_x() {
        let solid = |c: Coord| c.y <= 0;
        let mut ray = Ray::new(Coord::new(0, 3), Coord::new(3, 0));
        let mut pos = ray.advance();
        while !solid(pos) {
            pos = ray.advance();
        }
        assert!(ray.bounce(solid));
        assert_eq!(ray.direction(), Coord::new(1, 1));
    }

    #[test]
    fn test_bounce_fails_when_boxed_in() {
        let open = Coord::new(2, 2);
        let solid = move |c: Coord| c != open;
        let mut ray = Ray::new(open, Coord::new(6, 2));
        ray.advance();
        assert!(!ray.bounce(solid));
        assert_eq!(ray.pos(), open);
    }

    #[test]
    fn test_advance_skipping_jumps_visited_cells() {
        let mut ray = Ray::new(Coord::new(0, 0), Coord::new(9, 0));
        let next = ray.advance_skipping(|c| c.x < 4, 20);
        assert_eq!(next, Some(Coord::new(4, 0)));
        assert!(ray.advance_skipping(|_| true, 5).is_none());
    }
}
