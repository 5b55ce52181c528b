//! Vault definitions, placements and the vault catalogue
//!
//! A vault is a rectangular glyph map with a per-glyph meaning. Glyphs
//! without an override use the standard table in [`default_glyph`].
//! Parsing the vault-definition language is out of scope: maps arrive
//! already resolved, either built in or as JSON.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::feature::Feature;
use super::shop::ShopKind;
use super::trap::TrapKind;
use crate::actor::MonsterSpec;
use crate::consts::{GXM, GYM};
use crate::errors::SnapshotError;
use crate::geom::{Coord, Rect};
use crate::item::ItemSpec;
use crate::rarity::{DepthEntry, DepthPicker, DistribShape};
use crate::rng::GameRng;

bitflags! {
    /// Boolean vault tags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VaultTags: u16 {
        /// May be placed over water
        const WATER_OK = 0x0001;
        /// Corridor diggers may cross the vault
        const TRANSPARENT = 0x0002;
        const NO_MONSTER_GEN = 0x0004;
        const NO_ITEM_GEN = 0x0008;
        /// Vault monsters start awake
        const GENERATE_AWAKE = 0x0010;
        /// Rock and stone walls become metal
        const DIS = 0x0020;
        /// Replaces the whole level
        const ENCOMPASS = 0x0040;
        /// Placed in the extra-vault pass
        const EXTRA = 0x0080;
        const MINIVAULT = 0x0100;
        /// Pandemonium level content
        const PAN = 0x0200;
        /// Labyrinth centre piece
        const LABYRINTH = 0x0400;
        /// Guardian vault at the bottom of a branch
        const BRANCH_END = 0x0800;
        /// May be placed without touching existing open ground
        const CLOBBER = 0x1000;
    }
}

const TAG_NAMES: [(&str, VaultTags); 13] = [
    ("water_ok", VaultTags::WATER_OK),
    ("transparent", VaultTags::TRANSPARENT),
    ("no_monster_gen", VaultTags::NO_MONSTER_GEN),
    ("no_item_gen", VaultTags::NO_ITEM_GEN),
    ("generate_awake", VaultTags::GENERATE_AWAKE),
    ("dis", VaultTags::DIS),
    ("encompass", VaultTags::ENCOMPASS),
    ("extra", VaultTags::EXTRA),
    ("minivault", VaultTags::MINIVAULT),
    ("pan", VaultTags::PAN),
    ("labyrinth", VaultTags::LABYRINTH),
    ("branch_end", VaultTags::BRANCH_END),
    ("clobber", VaultTags::CLOBBER),
];

impl VaultTags {
    /// Parse space-separated tag names; unknown names are returned as the error
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut tags = VaultTags::empty();
        for word in text.split_whitespace() {
            match TAG_NAMES.iter().find(|(name, _)| *name == word) {
                Some((_, tag)) => tags |= *tag,
                None => return Err(word.to_string()),
            }
        }
        Ok(tags)
    }

    /// Space-separated tag names
    pub fn to_tag_string(&self) -> String {
        TAG_NAMES
            .iter()
            .filter(|(_, tag)| self.contains(*tag))
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// Tags travel as the tag strings of the vault-definition language
impl Serialize for VaultTags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_tag_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for VaultTags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        VaultTags::parse(&text)
            .map_err(|tag| serde::de::Error::custom(format!("unknown vault tag '{tag}'")))
    }
}

/// What a glyph paints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlyphSpec {
    Feature(Feature),
    /// Floor, and an exit for corridor digging
    Exit,
    /// Leave the cell untouched and unowned
    Transparent,
    RandomAltar,
    Gold,
    RandomItem,
    Item(ItemSpec),
    Monster(MonsterSpec),
    RandomMonster { out_of_depth: bool },
    Trap(Option<TrapKind>),
    Shop(Option<ShopKind>),
}

impl GlyphSpec {
    /// Terrain the glyph leaves behind
    pub fn base_feature(&self) -> Option<Feature> {
        match self {
            GlyphSpec::Feature(f) => Some(*f),
            GlyphSpec::Transparent => None,
            GlyphSpec::Trap(_) => Some(Feature::Trap),
            GlyphSpec::Shop(_) => Some(Feature::EnterShop),
            // altar god is rolled at paint time
            GlyphSpec::RandomAltar => Some(Feature::Altar(Default::default())),
            _ => Some(Feature::Floor),
        }
    }
}

/// Standard glyph meanings
pub fn default_glyph(glyph: char) -> Option<GlyphSpec> {
    let f = GlyphSpec::Feature;
    Some(match glyph {
        'x' => f(Feature::RockWall),
        'c' => f(Feature::StoneWall),
        'v' => f(Feature::MetalWall),
        'b' => f(Feature::CrystalWall),
        'a' => f(Feature::WaxWall),
        'X' => f(Feature::PermaRock),
        '.' => f(Feature::Floor),
        '+' => f(Feature::ClosedDoor),
        '=' => f(Feature::SecretDoor),
        'w' => f(Feature::DeepWater),
        'W' => f(Feature::ShallowWater),
        'l' => f(Feature::Lava),
        'G' => f(Feature::Statue),
        'T' => f(Feature::Fountain),
        '{' => f(Feature::StairsUpI),
        '(' => f(Feature::StairsUpII),
        '[' => f(Feature::StairsUpIII),
        '}' => f(Feature::StairsDownI),
        ')' => f(Feature::StairsDownII),
        ']' => f(Feature::StairsDownIII),
        '<' => f(Feature::HatchUp),
        '>' => f(Feature::HatchDown),
        'C' => GlyphSpec::RandomAltar,
        '^' => GlyphSpec::Trap(None),
        '@' => GlyphSpec::Exit,
        '$' => GlyphSpec::Gold,
        '*' => GlyphSpec::RandomItem,
        '0' => GlyphSpec::RandomMonster {
            out_of_depth: false,
        },
        '8' => GlyphSpec::RandomMonster { out_of_depth: true },
        'A' => GlyphSpec::Shop(None),
        ' ' => GlyphSpec::Transparent,
        _ => return None,
    })
}

/// A resolved vault definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultMap {
    pub name: String,
    pub lines: Vec<String>,
    /// Per-glyph overrides of the standard table
    #[serde(default)]
    pub glyphs: Vec<(char, GlyphSpec)>,
    #[serde(default)]
    pub tags: VaultTags,
    #[serde(default = "default_min_depth")]
    pub min_depth: i32,
    #[serde(default = "default_max_depth")]
    pub max_depth: i32,
    #[serde(default = "default_weight")]
    pub weight: i32,
    #[serde(default)]
    pub shape: DistribShape,
}

fn default_min_depth() -> i32 {
    1
}

fn default_max_depth() -> i32 {
    crate::consts::MAX_DEPTH + 1
}

fn default_weight() -> i32 {
    10
}

impl VaultMap {
    pub fn new(name: impl Into<String>, lines: &[&str]) -> Self {
        Self {
            name: name.into(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
            glyphs: Vec::new(),
            tags: VaultTags::empty(),
            min_depth: default_min_depth(),
            max_depth: default_max_depth(),
            weight: default_weight(),
            shape: DistribShape::Flat,
        }
    }

    pub fn with_tags(mut self, tags: VaultTags) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_depth(mut self, min_depth: i32, max_depth: i32, shape: DistribShape) -> Self {
        self.min_depth = min_depth;
        self.max_depth = max_depth;
        self.shape = shape;
        self
    }

    pub fn with_weight(mut self, weight: i32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_glyph(mut self, glyph: char, spec: GlyphSpec) -> Self {
        self.glyphs.retain(|(g, _)| *g != glyph);
        self.glyphs.push((glyph, spec));
        self
    }

    pub fn width(&self) -> i32 {
        self.lines
            .iter()
            .map(|l| l.chars().count() as i32)
            .max()
            .unwrap_or(0)
    }

    pub fn height(&self) -> i32 {
        self.lines.len() as i32
    }

    pub fn size(&self) -> Coord {
        Coord::new(self.width(), self.height())
    }

    pub fn has_tag(&self, tag: VaultTags) -> bool {
        self.tags.contains(tag)
    }

    /// Glyph at a map-relative position; short lines are padded with spaces
    pub fn glyph_at(&self, rel: Coord) -> char {
        if rel.y < 0 || rel.x < 0 {
            return ' ';
        }
        self.lines
            .get(rel.y as usize)
            .and_then(|line| line.chars().nth(rel.x as usize))
            .unwrap_or(' ')
    }

    /// Meaning of a glyph: override first, then the standard table
    pub fn spec_for(&self, glyph: char) -> Option<GlyphSpec> {
        self.glyphs
            .iter()
            .find(|(g, _)| *g == glyph)
            .map(|(_, spec)| spec.clone())
            .or_else(|| default_glyph(glyph))
    }

    /// Every map-relative cell with its glyph, row by row
    pub fn cells(&self) -> impl Iterator<Item = (Coord, char)> + '_ {
        let w = self.width();
        (0..self.height())
            .flat_map(move |y| (0..w).map(move |x| Coord::new(x, y)))
            .map(|rel| (rel, self.glyph_at(rel)))
    }

    /// Glyphs with no meaning, if any
    pub fn unknown_glyphs(&self) -> Vec<char> {
        let mut unknown: Vec<char> = self
            .cells()
            .map(|(_, g)| g)
            .filter(|g| self.spec_for(*g).is_none())
            .collect();
        unknown.sort_unstable();
        unknown.dedup();
        unknown
    }

    /// Map-relative cells marked as exits
    pub fn marked_exits(&self) -> Vec<Coord> {
        self.cells()
            .filter(|(_, g)| matches!(self.spec_for(*g), Some(GlyphSpec::Exit)))
            .map(|(rel, _)| rel)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VaultId(pub u32);

/// A vault as placed on a level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultPlacement {
    pub id: VaultId,
    pub name: String,
    /// Top-left corner on the level
    pub pos: Coord,
    pub size: Coord,
    pub tags: VaultTags,
    /// Level cells used as corridor starting points
    pub exits: Vec<Coord>,
    /// Level cells owned by the vault
    pub cells: Vec<Coord>,
}

impl VaultPlacement {
    pub fn rect(&self) -> Rect {
        Rect::from_size(self.pos, self.size)
    }

    pub fn owns(&self, c: Coord) -> bool {
        self.cells.contains(&c)
    }
}

/// The set of vault maps generation may choose from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaultCatalogue {
    maps: Vec<VaultMap>,
}

impl VaultCatalogue {
    pub fn new(maps: Vec<VaultMap>) -> Self {
        Self { maps }
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn maps(&self) -> &[VaultMap] {
        &self.maps
    }

    pub fn push(&mut self, map: VaultMap) {
        self.maps.push(map);
    }

    pub fn get(&self, name: &str) -> Option<&VaultMap> {
        self.maps.iter().find(|m| m.name == name)
    }

    /// Depth-weighted choice among maps carrying all of `want` and none of `avoid`
    pub fn pick(
        &self,
        depth: i32,
        want: VaultTags,
        avoid: VaultTags,
        rng: &mut GameRng,
    ) -> Option<&VaultMap> {
        let picker = DepthPicker::new(
            self.maps
                .iter()
                .enumerate()
                .filter(|(_, m)| m.tags.contains(want) && !m.tags.intersects(avoid))
                .map(|(i, m)| DepthEntry::new(i, m.min_depth, m.max_depth, m.weight, m.shape))
                .collect(),
        );
        picker.pick(depth, rng).map(|&i| &self.maps[i])
    }

    /// The maps shipped with the crate
    pub fn builtin() -> Self {
        let mini = VaultTags::MINIVAULT;
        let mut maps = vec![
            VaultMap::new(
                "fountain_court",
                &[
                    ".......", ".xx.xx.", ".x.T.x.", "...T...", ".x.T.x.", ".xx.xx.", ".......",
                ],
            )
            .with_tags(mini),
            VaultMap::new(
                "guard_post",
                &[
                    "xxxxxxx", "x..0..x", "x.x.x.x", "@..8..@", "x.x.x.x", "x..*..x", "xxxxxxx",
                ],
            )
            .with_tags(mini)
            .with_depth(3, 20, DistribShape::Peak),
            VaultMap::new("small_treasure", &["ccccc", "c$*$c", "c*C*c", "cc+cc"])
                .with_tags(mini | VaultTags::NO_ITEM_GEN)
                .with_depth(5, 28, DistribShape::Up),
            VaultMap::new(
                "pool_garden",
                &[
                    ".......", ".wwWww.", ".wW.Ww.", ".W.T.W.", ".wW.Ww.", ".wwWww.", ".......",
                ],
            )
            .with_tags(mini | VaultTags::WATER_OK)
            .with_depth(4, 28, DistribShape::Flat),
            VaultMap::new("crystal_shrine", &["bbbbb", "b...b", "b.C.b", "b...b", "bb.bb"])
                .with_tags(mini | VaultTags::TRANSPARENT)
                .with_depth(8, 28, DistribShape::Semi)
                .with_weight(5),
            VaultMap::new("iron_cell", &["xxxxxxx", "x.....x", "x.x0x.x", "x.....x", "xxx@xxx"])
                .with_tags(mini | VaultTags::DIS)
                .with_depth(10, 28, DistribShape::Up)
                .with_weight(5),
            VaultMap::new("awake_den", &["xxxxx", "x000x", "x.0.x", "xx.xx"])
                .with_tags(mini | VaultTags::GENERATE_AWAKE | VaultTags::NO_MONSTER_GEN)
                .with_depth(4, 20, DistribShape::Flat)
                .with_weight(5),
            VaultMap::new(
                "bazaar_stall",
                &["xxxxx", "x.A.x", "x...x", "xx@xx"],
            )
            .with_tags(mini)
            .with_depth(5, 28, DistribShape::Flat)
            .with_weight(3),
            VaultMap::new(
                "trapped_hall",
                &["  ...  ", " .^.^. ", "..^.^..", " .^.^. ", "  ...  "],
            )
            .with_tags(mini)
            .with_depth(6, 28, DistribShape::Flat)
            .with_weight(5),
            VaultMap::new(
                "statue_hall",
                &[".........", ".G.G.G.G.", ".........", ".G.G.G.G.", "........."],
            )
            .with_tags(VaultTags::EXTRA)
            .with_depth(6, 28, DistribShape::Flat),
            VaultMap::new("altar_nook", &["xxxxx", "x.C.x", "x...x", "xx@xx"])
                .with_tags(VaultTags::EXTRA),
            VaultMap::new(
                "pan_hall",
                &["vvvvvvvvv", "v.......v", "v.v.8.v.v", "v...*...v", "vvvv.vvvv"],
            )
            .with_tags(VaultTags::PAN)
            .with_depth(1, 99, DistribShape::Flat),
            VaultMap::new(
                "pan_furnace",
                &["  lllll  ", " ll...ll ", "ll..8..ll", " ll.*.ll ", "  ll.ll  "],
            )
            .with_tags(VaultTags::PAN)
            .with_depth(1, 99, DistribShape::Flat)
            .with_weight(5),
            VaultMap::new(
                "labyrinth_centre",
                &["ccccccc", "c*.$.*c", "c..8..c", "c*.$.*c", "ccc@ccc"],
            )
            .with_tags(VaultTags::LABYRINTH | VaultTags::NO_ITEM_GEN)
            .with_depth(1, 99, DistribShape::Flat),
            VaultMap::new("lair_end", &["xxxxxxx", "x.*8*.x", "x.....x", "xxx@xxx"])
                .with_tags(VaultTags::BRANCH_END),
            VaultMap::new("orc_end", &["ccccccc", "c$*0*$c", "c.0.0.c", "ccc@ccc"])
                .with_tags(VaultTags::BRANCH_END),
            VaultMap::new("vaults_end", &["vvvvvvv", "v*$8$*v", "v.....v", "vvv+vvv"])
                .with_tags(VaultTags::BRANCH_END),
            VaultMap::new("crypt_end", &["xxxxxxx", "x*.8.*x", "x.G.G.x", "xxx@xxx"])
                .with_tags(VaultTags::BRANCH_END | VaultTags::GENERATE_AWAKE),
        ];
        maps.push(pillared_hall());
        Self::new(maps)
    }
}

/// Full-level layout: an open hall studded with pillars
fn pillared_hall() -> VaultMap {
    let stairs = [
        (Coord::new(6, 6), '{'),
        (Coord::new(6, GYM / 2), '('),
        (Coord::new(6, GYM - 7), '['),
        (Coord::new(GXM - 7, 6), '}'),
        (Coord::new(GXM - 7, GYM / 2), ')'),
        (Coord::new(GXM - 7, GYM - 7), ']'),
    ];
    let lines: Vec<String> = (0..GYM)
        .map(|y| {
            (0..GXM)
                .map(|x| {
                    let c = Coord::new(x, y);
                    if let Some((_, g)) = stairs.iter().find(|(p, _)| *p == c) {
                        *g
                    } else if x < 3 || y < 3 || x >= GXM - 3 || y >= GYM - 3 {
                        'x'
                    } else if x % 5 == 0 && y % 5 == 0 {
                        'c'
                    } else {
                        '.'
                    }
                })
                .collect()
        })
        .collect();
    let mut map = VaultMap::new("pillared_hall", &[]);
    map.lines = lines;
    map.with_tags(VaultTags::ENCOMPASS)
        .with_depth(4, 20, DistribShape::Semi)
        .with_weight(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_maps_are_well_formed() {
        for map in VaultCatalogue::builtin().maps() {
            assert!(map.unknown_glyphs().is_empty(), "{} has unknown glyphs", map.name);
            assert!(map.width() > 0 && map.height() > 0);
            assert!(map.width() <= GXM && map.height() <= GYM);
        }
    }

    #[test]
    fn test_tag_strings_round_trip() {
        let tags = VaultTags::parse("minivault water_ok dis").unwrap();
        assert!(tags.contains(VaultTags::MINIVAULT | VaultTags::WATER_OK | VaultTags::DIS));
        assert_eq!(VaultTags::parse(&tags.to_tag_string()).unwrap(), tags);
        assert_eq!(VaultTags::parse("bogus"), Err("bogus".to_string()));
        let clobber = VaultTags::parse("extra clobber").unwrap();
        assert!(clobber.contains(VaultTags::CLOBBER));
        assert_eq!(clobber.to_tag_string(), "extra clobber");
    }

    #[test]
    fn test_override_beats_default_table() {
        let map = VaultMap::new("t", &["xQx"]).with_glyph('x', GlyphSpec::Feature(Feature::Lava));
        assert_eq!(map.spec_for('x'), Some(GlyphSpec::Feature(Feature::Lava)));
        assert_eq!(map.unknown_glyphs(), vec!['Q']);
    }

    #[test]
    fn test_short_lines_pad_with_space() {
        let map = VaultMap::new("t", &["...", "."]);
        assert_eq!(map.glyph_at(Coord::new(2, 1)), ' ');
        assert_eq!(map.spec_for(' '), Some(GlyphSpec::Transparent));
    }

    #[test]
    fn test_pick_respects_tags_and_depth() {
        let cat = VaultCatalogue::builtin();
        let mut rng = GameRng::new(5);
        for _ in 0..200 {
            let map = cat
                .pick(2, VaultTags::MINIVAULT, VaultTags::ENCOMPASS, &mut rng)
                .unwrap();
            assert!(map.has_tag(VaultTags::MINIVAULT));
            assert!(map.min_depth <= 2);
        }
        assert!(cat.pick(2, VaultTags::PAN | VaultTags::MINIVAULT, VaultTags::empty(), &mut rng).is_none());
    }

    #[test]
    fn test_catalogue_json() {
        let json = r#"{"maps": [{"name": "box", "lines": ["xxx", "x.x", "x@x"], "tags": "minivault"}]}"#;
        let cat = VaultCatalogue::from_json(json).unwrap();
        let map = cat.get("box").unwrap();
        assert_eq!(map.marked_exits(), vec![Coord::new(1, 2)]);
        assert_eq!(map.weight, 10);
        assert!(VaultCatalogue::from_json(r#"{"maps": [{"name": "b", "lines": [], "tags": "nope"}]}"#).is_err());
    }

    #[test]
    fn test_pillared_hall_fills_level() {
        let hall = pillared_hall();
        assert_eq!(hall.size(), Coord::new(GXM, GYM));
        assert!(hall.has_tag(VaultTags::ENCOMPASS));
    }
}
