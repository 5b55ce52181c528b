//! Cloud layer

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::geom::Coord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum CloudKind {
    Fire,
    Cold,
    Poison,
    Steam,
    Fog,
    Miasma,
    Rain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cloud {
    pub kind: CloudKind,
    /// Turns left; ignored while `generator` is set
    pub duration: i32,
    /// Fog machines keep emitting and never expire
    pub generator: bool,
}

impl Cloud {
    pub fn new(kind: CloudKind, duration: i32) -> Self {
        Self {
            kind,
            duration: duration.max(1),
            generator: false,
        }
    }

    pub fn fog_machine() -> Self {
        Self {
            kind: CloudKind::Fog,
            duration: 1,
            generator: true,
        }
    }
}

/// A cloud cell as stored in snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudEntry {
    pub pos: Coord,
    pub cloud: Cloud,
}
