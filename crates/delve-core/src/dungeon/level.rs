//! The level context shared by generation and the beam engine
//!
//! All mutable world state for one level lives here and is passed by
//! reference; nothing is global.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::branch::LevelId;
use super::cloud::{Cloud, CloudEntry};
use super::corruption::CorruptionSeed;
use super::feature::Feature;
use super::mask::MapMask;
use super::shop::ShopInfo;
use super::trap::{Trap, TrapKind};
use super::vault::{VaultId, VaultPlacement};
use crate::actor::{Monster, MonsterId, MonsterSpec};
use crate::consts::{GXM, GYM, X_BOUND_1, X_BOUND_2, Y_BOUND_1, Y_BOUND_2};
use crate::errors::SnapshotError;
use crate::geom::{Coord, Grid, in_bounds};
use crate::item::{Item, ItemId, ItemSpec};
use crate::rng::GameRng;

/// One dungeon level
#[derive(Debug, Clone)]
pub struct Level {
    pub id: LevelId,
    pub grid: Grid<Feature>,
    pub mask: Grid<MapMask>,
    /// Which vault owns each cell
    pub vault_owner: Grid<Option<VaultId>>,
    pub vaults: Vec<VaultPlacement>,
    pub monsters: Vec<Monster>,
    pub items: Vec<Item>,
    pub traps: Vec<Trap>,
    pub shops: Vec<ShopInfo>,
    pub clouds: HashMap<Coord, Cloud>,
    pub corruption: Vec<CorruptionSeed>,
    next_monster_id: u32,
    next_item_id: u32,
    next_vault_id: u32,
}

impl Level {
    /// A level of solid rock
    pub fn new(id: LevelId) -> Self {
        Self {
            id,
            grid: Grid::new(GXM, GYM, Feature::RockWall),
            mask: Grid::new(GXM, GYM, MapMask::empty()),
            vault_owner: Grid::new(GXM, GYM, None),
            vaults: Vec::new(),
            monsters: Vec::new(),
            items: Vec::new(),
            traps: Vec::new(),
            shops: Vec::new(),
            clouds: HashMap::new(),
            corruption: Vec::new(),
            next_monster_id: 1,
            next_item_id: 1,
            next_vault_id: 1,
        }
    }

    /// A level of open floor inside a rock border, for tests and arenas
    pub fn open(id: LevelId) -> Self {
        let mut level = Self::new(id);
        for c in level.grid.coords() {
            if c.x >= X_BOUND_1 && c.x <= X_BOUND_2 && c.y >= Y_BOUND_1 && c.y <= Y_BOUND_2 {
                level.grid[c] = Feature::Floor;
            }
        }
        level
    }

    /// Back to solid rock with every table emptied
    pub fn reset(&mut self) {
        *self = Self::new(self.id);
    }

    pub fn feature(&self, c: Coord) -> Feature {
        self.grid[c]
    }

    pub fn set_feature(&mut self, c: Coord, f: Feature) {
        self.grid[c] = f;
    }

    /// Off-map cells count as solid
    pub fn is_solid(&self, c: Coord) -> bool {
        self.grid.get(c).is_none_or(|f| f.is_solid())
    }

    pub fn is_traversable(&self, c: Coord) -> bool {
        self.grid.get(c).is_some_and(|f| f.is_traversable())
    }

    pub fn is_vault(&self, c: Coord) -> bool {
        self.mask.get(c).is_some_and(|m| m.contains(MapMask::VAULT))
    }

    pub fn has_mask(&self, c: Coord, flags: MapMask) -> bool {
        self.mask.get(c).is_some_and(|m| m.intersects(flags))
    }

    /// Count of non-solid neighbours, used to recognise open floor
    pub fn open_neighbours(&self, c: Coord) -> usize {
        c.neighbours().filter(|n| !self.is_solid(*n)).count()
    }

    // ------------------------------------------------------------------
    // Monsters
    // ------------------------------------------------------------------

    pub fn monster_index_at(&self, c: Coord) -> Option<usize> {
        self.monsters.iter().position(|m| m.pos == c && m.hp > 0)
    }

    pub fn monster_at(&self, c: Coord) -> Option<&Monster> {
        self.monster_index_at(c).map(|i| &self.monsters[i])
    }

    pub fn monster(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters.iter().find(|m| m.id == id)
    }

    pub fn monster_mut(&mut self, id: MonsterId) -> Option<&mut Monster> {
        self.monsters.iter_mut().find(|m| m.id == id)
    }

    /// Whether a monster could stand on `c` right now
    pub fn can_hold_monster(&self, c: Coord) -> bool {
        in_bounds(c)
            && !self.grid[c].is_solid()
            && !matches!(self.grid[c], Feature::Lava | Feature::DeepWater)
            && self.monster_index_at(c).is_none()
    }

    /// Spawn a monster; `None` if the cell cannot hold it
    pub fn spawn_monster(&mut self, spec: &MonsterSpec, pos: Coord) -> Option<MonsterId> {
        if !self.can_hold_monster(pos) {
            return None;
        }
        let id = MonsterId(self.next_monster_id);
        self.next_monster_id += 1;
        self.monsters.push(Monster::from_spec(id, spec, pos));
        Some(id)
    }

    /// Drop dead monsters from the table
    pub fn remove_dead(&mut self) -> Vec<MonsterId> {
        let dead: Vec<MonsterId> = self
            .monsters
            .iter()
            .filter(|m| m.hp <= 0)
            .map(|m| m.id)
            .collect();
        self.monsters.retain(|m| m.hp > 0);
        dead
    }

    // ------------------------------------------------------------------
    // Items, traps, clouds
    // ------------------------------------------------------------------

    pub fn create_item(&mut self, spec: &ItemSpec, pos: Coord) -> ItemId {
        let id = ItemId(self.next_item_id);
        self.next_item_id += 1;
        self.items.push(Item::from_spec(id, spec, Some(pos)));
        id
    }

    pub fn items_at(&self, c: Coord) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(move |i| i.pos == Some(c))
    }

    pub fn has_items_at(&self, c: Coord) -> bool {
        self.items_at(c).next().is_some()
    }

    pub fn add_trap(&mut self, pos: Coord, kind: TrapKind) {
        self.grid[pos] = Feature::Trap;
        self.traps.retain(|t| t.pos != pos);
        self.traps.push(Trap { pos, kind });
    }

    pub fn trap_at(&self, c: Coord) -> Option<&Trap> {
        self.traps.iter().find(|t| t.pos == c)
    }

    pub fn cloud_at(&self, c: Coord) -> Option<&Cloud> {
        self.clouds.get(&c)
    }

    /// Place a cloud; an existing cloud on the cell is replaced
    pub fn add_cloud(&mut self, pos: Coord, cloud: Cloud) {
        if !self.is_solid(pos) {
            self.clouds.insert(pos, cloud);
        }
    }

    pub(crate) fn next_vault_id(&mut self) -> VaultId {
        let id = VaultId(self.next_vault_id);
        self.next_vault_id += 1;
        id
    }

    pub fn vault(&self, id: VaultId) -> Option<&VaultPlacement> {
        self.vaults.iter().find(|v| v.id == id)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn find_all(&self, f: Feature) -> Vec<Coord> {
        self.grid
            .iter()
            .filter(|(_, v)| **v == f)
            .map(|(c, _)| c)
            .collect()
    }

    pub fn find_where(&self, pred: impl Fn(Feature) -> bool) -> Vec<Coord> {
        self.grid
            .iter()
            .filter(|(_, v)| pred(**v))
            .map(|(c, _)| c)
            .collect()
    }

    /// Stone up stairs and branch exits
    pub fn up_stairs(&self) -> Vec<Coord> {
        self.find_where(|f| f.is_stone_stair_up() || f == Feature::ExitBranch)
    }

    pub fn down_stairs(&self) -> Vec<Coord> {
        self.find_where(|f| f.is_stone_stair_down())
    }

    /// A random in-map floor cell with none of `forbid` set
    pub fn random_floor(&self, rng: &mut GameRng, forbid: MapMask) -> Option<Coord> {
        self.random_cell_where(rng, |level, c| {
            level.grid[c] == Feature::Floor && !level.mask[c].intersects(forbid)
        })
    }

    /// A random in-map cell satisfying `pred`
    ///
    /// Samples randomly first and falls back to a full scan, so it only
    /// returns `None` when no cell qualifies.
    pub fn random_cell_where(
        &self,
        rng: &mut GameRng,
        pred: impl Fn(&Level, Coord) -> bool,
    ) -> Option<Coord> {
        for _ in 0..500 {
            let c = Coord::new(
                rng.random_range(X_BOUND_1, X_BOUND_2),
                rng.random_range(Y_BOUND_1, Y_BOUND_2),
            );
            if pred(self, c) {
                return Some(c);
            }
        }
        let candidates: Vec<Coord> = self
            .grid
            .coords()
            .filter(|c| {
                c.x >= X_BOUND_1
                    && c.x <= X_BOUND_2
                    && c.y >= Y_BOUND_1
                    && c.y <= Y_BOUND_2
                    && pred(self, *c)
            })
            .collect();
        rng.choose(&candidates).copied()
    }

    /// Text rendering, one row per line
    pub fn dump(&self) -> String {
        let mut out = String::with_capacity(((GXM + 1) * GYM) as usize);
        for y in 0..self.grid.height() {
            for x in 0..self.grid.width() {
                out.push(self.grid[Coord::new(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> LevelSnapshot {
        let mut clouds: Vec<CloudEntry> = self
            .clouds
            .iter()
            .map(|(pos, cloud)| CloudEntry {
                pos: *pos,
                cloud: *cloud,
            })
            .collect();
        clouds.sort_by_key(|e| e.pos);
        LevelSnapshot {
            id: self.id,
            grid: self.grid.clone(),
            mask: self.mask.clone(),
            vaults: self.vaults.clone(),
            monsters: self.monsters.clone(),
            items: self.items.clone(),
            traps: self.traps.clone(),
            shops: self.shops.clone(),
            clouds,
            corruption: self.corruption.clone(),
        }
    }

    pub fn restore(snapshot: LevelSnapshot) -> Result<Self, SnapshotError> {
        for grid_size in [
            (snapshot.grid.width(), snapshot.grid.height()),
            (snapshot.mask.width(), snapshot.mask.height()),
        ] {
            if grid_size != (GXM, GYM) {
                return Err(SnapshotError::Dimensions {
                    width: grid_size.0,
                    height: grid_size.1,
                    expected_width: GXM,
                    expected_height: GYM,
                });
            }
        }

        let mut level = Self::new(snapshot.id);
        level.grid = snapshot.grid;
        level.mask = snapshot.mask;
        for vault in &snapshot.vaults {
            for c in &vault.cells {
                if let Some(owner) = level.vault_owner.get_mut(*c) {
                    *owner = Some(vault.id);
                }
            }
        }
        level.next_vault_id = snapshot.vaults.iter().map(|v| v.id.0 + 1).max().unwrap_or(1);
        level.next_monster_id = snapshot.monsters.iter().map(|m| m.id.0 + 1).max().unwrap_or(1);
        level.next_item_id = snapshot.items.iter().map(|i| i.id.0 + 1).max().unwrap_or(1);
        level.vaults = snapshot.vaults;
        level.monsters = snapshot.monsters;
        level.items = snapshot.items;
        level.traps = snapshot.traps;
        level.shops = snapshot.shops;
        level.clouds = snapshot
            .clouds
            .into_iter()
            .map(|e| (e.pos, e.cloud))
            .collect();
        level.corruption = snapshot.corruption;
        Ok(level)
    }
}

/// Serializable level state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub id: LevelId,
    pub grid: Grid<Feature>,
    pub mask: Grid<MapMask>,
    pub vaults: Vec<VaultPlacement>,
    pub monsters: Vec<Monster>,
    pub items: Vec<Item>,
    pub traps: Vec<Trap>,
    pub shops: Vec<ShopInfo>,
    /// Cloud table as a list, since JSON object keys must be strings
    pub clouds: Vec<CloudEntry>,
    pub corruption: Vec<CorruptionSeed>,
}

impl LevelSnapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}
