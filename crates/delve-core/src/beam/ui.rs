//! Rendering and prompt hooks called while a beam resolves

use super::flavour::Flavour;
use crate::geom::Coord;

/// Display collaborator; every hook defaults to doing nothing
pub trait BeamUi {
    fn draw_beam(&mut self, _pos: Coord, _flavour: Flavour) {}

    fn draw_explosion_cell(&mut self, _pos: Coord, _flavour: Flavour, _resisted: bool) {}

    fn flash(&mut self, _flavour: Flavour) {}

    /// Ask whether to fire through an ally; true fires anyway
    fn confirm_fire_through(&mut self, _ally: &str) -> bool {
        true
    }
}

/// Headless hosts and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct NullUi;

impl BeamUi for NullUi {}

/// Records every call, answering prompts with a fixed reply
#[derive(Debug, Clone, Default)]
pub struct RecordingUi {
    pub drawn: Vec<Coord>,
    pub explosion: Vec<(Coord, bool)>,
    pub flashes: Vec<Flavour>,
    pub prompts: Vec<String>,
    pub answer: bool,
}

impl RecordingUi {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            ..Self::default()
        }
    }
}

impl BeamUi for RecordingUi {
    fn draw_beam(&mut self, pos: Coord, _flavour: Flavour) {
        self.drawn.push(pos);
    }

    fn draw_explosion_cell(&mut self, pos: Coord, _flavour: Flavour, resisted: bool) {
        self.explosion.push((pos, resisted));
    }

    fn flash(&mut self, flavour: Flavour) {
        self.flashes.push(flavour);
    }

    fn confirm_fire_through(&mut self, ally: &str) -> bool {
        self.prompts.push(ally.to_string());
        self.answer
    }
}
