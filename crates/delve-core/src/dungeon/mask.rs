//! Per-cell placement constraints that sit alongside the terrain

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Map mask flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MapMask: u8 {
        /// Owned by a placed vault
        const VAULT = 0x01;
        /// Random monster generation may not use this cell
        const NO_MONS = 0x02;
        /// Random item generation may not use this cell
        const NO_ITEM = 0x04;
        /// Corridor diggers may not pass through
        const OPAQUE = 0x08;
        /// Door placement may not use this cell
        const NO_DOOR = 0x10;
    }
}

impl MapMask {
    /// Cells a joining corridor must route around
    pub const DIG_FORBIDDEN: MapMask = MapMask::VAULT.union(MapMask::OPAQUE);
}

// Manual serde impl for MapMask
impl Serialize for MapMask {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MapMask {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(MapMask::from_bits_truncate(bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_serde_roundtrip_keeps_bits() {
        let m = MapMask::VAULT | MapMask::NO_ITEM;
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "5");
        let back: MapMask = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_unknown_bits_are_dropped() {
        let back: MapMask = serde_json::from_str("255").unwrap();
        assert_eq!(back, MapMask::all());
    }
}
