//! The level builder state machine
//!
//! One attempt runs every stage in order. Any stage may veto; a veto
//! throws the attempt away and the next one starts from a reset level
//! with a fresh random stream. Running out of attempts is the only fatal
//! outcome.

use strum::{Display, EnumIter};
use tracing::{debug, error, info, warn};

use super::abyss::build_abyss;
use super::basic::builder_basic;
use super::branch::{Branch, BranchLayout, LevelId, LevelType};
use super::extras::builder_extras;
use super::labyrinth::build_labyrinth;
use super::level::Level;
use super::pandemonium::build_pandemonium;
use super::pits::{SpecialRoomKind, fixup_special_rooms, special_room};
use super::place::{VaultPosition, place_vault};
use super::plans::{LayoutPlan, PlanOutcome, spotty_level};
use super::populate::{
    fixup_stairs, place_altars, place_branch_entrances, place_fog_machines, place_items,
    place_monsters, place_shops, place_traps, seal_border,
};
use super::vault::{VaultCatalogue, VaultId, VaultMap, VaultTags};
use super::zones::{count_disconnected_zones, stairs_connected};
use crate::config::GenOptions;
use crate::errors::{GenerationError, VetoReason};
use crate::logging::GEN_TARGET;
use crate::rng::GameRng;

/// Stages of one generation attempt, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum BuildStage {
    Reset,
    LayoutSkeleton,
    Basic,
    Extras,
    Minivaults,
    BranchEntrances,
    ExtraVaults,
    ConnectivityCheck,
    TrapsAndFog,
    Items,
    Monsters,
    Shops,
    Fixup,
}

/// How the skeleton stage went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skeleton {
    /// A special level type built everything itself
    TakenOver,
    /// Generic stages follow; `basic` asks for the corridor builder
    Continue { basic: bool },
}

/// Guardian vault that must close off a branch's last level
pub fn branch_end_vault(branch: Branch) -> Option<&'static str> {
    match branch {
        Branch::Lair => Some("lair_end"),
        Branch::OrcishMines => Some("orc_end"),
        Branch::Vaults => Some("vaults_end"),
        Branch::Crypt => Some("crypt_end"),
        Branch::Dungeon | Branch::Gehenna | Branch::Cocytus => None,
    }
}

/// Generates whole levels from a vault catalogue and tuning options
#[derive(Debug, Clone)]
pub struct LevelBuilder {
    catalogue: VaultCatalogue,
    opts: GenOptions,
}

/// State carried through a single attempt
struct Attempt<'a> {
    level: &'a mut Level,
    rng: &'a mut GameRng,
    retries_left: u32,
    /// Vault names tried so far, placed or not
    vaults: Vec<String>,
}

impl Default for LevelBuilder {
    fn default() -> Self {
        Self::new(VaultCatalogue::builtin(), GenOptions::default())
    }
}

impl LevelBuilder {
    pub fn new(catalogue: VaultCatalogue, opts: GenOptions) -> Self {
        Self { catalogue, opts }
    }

    pub fn catalogue(&self) -> &VaultCatalogue {
        &self.catalogue
    }

    pub fn options(&self) -> &GenOptions {
        &self.opts
    }

    /// Build the level `id`, retrying on vetoes until the budget runs out
    pub fn generate(&self, id: LevelId, rng: &mut GameRng) -> Result<Level, GenerationError> {
        let budget = self.opts.retry_budget.max(1);
        let mut level = Level::new(id);
        let mut last_veto = VetoReason::StairsUnreachable;
        let mut last_vaults = Vec::new();

        for attempt in 1..=budget {
            let mut attempt_rng = rng.fork();
            let mut state = Attempt {
                level: &mut level,
                rng: &mut attempt_rng,
                retries_left: budget - attempt,
                vaults: Vec::new(),
            };
            let outcome = self.run_attempt(&mut state);
            let vaults = state.vaults;
            match outcome {
                Ok(()) => {
                    info!(
                        target: GEN_TARGET,
                        level = %id,
                        attempts = attempt,
                        vaults = ?vaults,
                        "level built"
                    );
                    return Ok(level);
                }
                Err(veto) => {
                    warn!(target: GEN_TARGET, level = %id, attempt, %veto, "generation vetoed");
                    last_veto = veto;
                    last_vaults = vaults;
                }
            }
        }

        error!(
            target: GEN_TARGET,
            level = %id,
            attempts = budget,
            veto = %last_veto,
            "level generation failed"
        );
        Err(GenerationError::LevelGenerationFailed {
            level: id,
            attempts: budget,
            last_vaults,
            veto: last_veto,
        })
    }

    fn random_vaults_allowed(&self, state: &Attempt<'_>) -> bool {
        state.retries_left > self.opts.disable_random_vaults_below
    }

    fn run_attempt(&self, state: &mut Attempt<'_>) -> Result<(), VetoReason> {
        stage(state, BuildStage::Reset);
        state.level.reset();

        stage(state, BuildStage::LayoutSkeleton);
        let skeleton = self.layout_skeleton(state)?;

        if let Skeleton::Continue { basic } = skeleton {
            if basic {
                stage(state, BuildStage::Basic);
                builder_basic(state.level, state.rng);
            }
            self.special_room_pass(state);

            stage(state, BuildStage::Extras);
            builder_extras(state.level, state.rng);

            stage(state, BuildStage::Minivaults);
            if self.random_vaults_allowed(state) && state.rng.one_in(self.opts.minivault_chance) {
                self.random_vault(state, VaultTags::MINIVAULT)?;
            }

            stage(state, BuildStage::BranchEntrances);
            place_branch_entrances(state.level, state.rng)?;

            stage(state, BuildStage::ExtraVaults);
            self.branch_end(state)?;
            if self.random_vaults_allowed(state) {
                while state.rng.one_in(self.opts.extra_vault_chance) {
                    if !self.random_vault(state, VaultTags::EXTRA)? {
                        break;
                    }
                }
            }

            stage(state, BuildStage::ConnectivityCheck);
            fixup_special_rooms(state.level);
            fixup_stairs(state.level, state.rng)?;
            if !stairs_connected(state.level) {
                return Err(VetoReason::StairsUnreachable);
            }

            stage(state, BuildStage::TrapsAndFog);
            place_traps(state.level, state.rng);
            place_fog_machines(state.level, state.rng);

            stage(state, BuildStage::Items);
            place_items(state.level, state.rng);

            stage(state, BuildStage::Monsters);
            place_monsters(state.level, state.rng);

            stage(state, BuildStage::Shops);
            place_shops(state.level, state.rng);
            place_altars(state.level, state.rng);
        }

        stage(state, BuildStage::Fixup);
        fixup_special_rooms(state.level);
        seal_border(state.level);
        if skeleton != Skeleton::TakenOver {
            fixup_stairs(state.level, state.rng)?;
        }
        if !stairs_connected(state.level) {
            return Err(VetoReason::StairsUnreachable);
        }
        Ok(())
    }

    fn layout_skeleton(&self, state: &mut Attempt<'_>) -> Result<Skeleton, VetoReason> {
        let id = state.level.id;
        match id.level_type {
            LevelType::Labyrinth => {
                state.vaults.push("labyrinth centre".to_string());
                build_labyrinth(state.level, &self.catalogue, &self.opts, state.rng)?;
                return Ok(Skeleton::TakenOver);
            }
            LevelType::Abyss => {
                build_abyss(state.level, state.rng);
                return Ok(Skeleton::TakenOver);
            }
            LevelType::Pandemonium => {
                build_pandemonium(state.level, &self.catalogue, &self.opts, state.rng)?;
                if let Some(v) = state.level.vaults.first() {
                    state.vaults.push(v.name.clone());
                }
                return Ok(Skeleton::TakenOver);
            }
            LevelType::Normal => {}
        }

        match id.branch.layout() {
            BranchLayout::Spotty => {
                let boxy = id.branch == Branch::OrcishMines;
                let iterations = 100 + state.rng.rn2(500);
                spotty_level(state.level, state.rng, false, iterations, boxy);
                Ok(Skeleton::Continue { basic: false })
            }
            BranchLayout::City => {
                let outcome = LayoutPlan::City.build(state.level, state.rng);
                Ok(Skeleton::Continue {
                    basic: outcome == PlanOutcome::NeedsStairs,
                })
            }
            BranchLayout::Generic => {
                let depth = id.absolute_depth();
                if self.random_vaults_allowed(state) && state.rng.one_in(20) {
                    if let Some(map) = self.catalogue.pick(
                        depth,
                        VaultTags::ENCOMPASS,
                        VaultTags::empty(),
                        state.rng,
                    ) {
                        state.vaults.push(map.name.clone());
                        match place_vault(
                            state.level,
                            map,
                            VaultPosition::Float,
                            true,
                            &self.opts,
                            state.rng,
                        ) {
                            Ok(_) => return Ok(Skeleton::Continue { basic: false }),
                            Err(e) => {
                                debug!(target: GEN_TARGET, error = %e, "encompass vault failed");
                                state.level.reset();
                            }
                        }
                    }
                }
                let plan = LayoutPlan::random(state.rng);
                debug!(target: GEN_TARGET, %plan, "layout plan");
                let outcome = plan.build(state.level, state.rng);
                Ok(Skeleton::Continue {
                    basic: outcome == PlanOutcome::NeedsStairs,
                })
            }
        }
    }

    /// A monster pit or treasury in untouched rock, from depth 6
    fn special_room_pass(&self, state: &mut Attempt<'_>) {
        let depth = state.level.id.absolute_depth();
        if depth < 6 || !state.rng.one_in(self.opts.special_room_chance) {
            return;
        }
        let kind = SpecialRoomKind::random(depth, state.rng);
        if special_room(state.level, kind, state.rng).is_none() {
            debug!(target: GEN_TARGET, %kind, "no room for special room");
        }
    }

    /// The branch's guardian vault on its last level
    fn branch_end(&self, state: &mut Attempt<'_>) -> Result<(), VetoReason> {
        let id = state.level.id;
        if !id.is_branch_bottom() {
            return Ok(());
        }
        let Some(name) = branch_end_vault(id.branch) else {
            return Ok(());
        };
        let map = self
            .catalogue
            .get(name)
            .ok_or_else(|| VetoReason::MandatoryVaultFailed {
                vault: name.to_string(),
            })?;
        if !self.checked_place(state, map)? {
            return Err(VetoReason::MandatoryVaultFailed {
                vault: name.to_string(),
            });
        }
        Ok(())
    }

    /// Place a random vault tagged `want`
    ///
    /// Returns false when nothing fitted; that is not a veto.
    fn random_vault(&self, state: &mut Attempt<'_>, want: VaultTags) -> Result<bool, VetoReason> {
        let depth = state.level.id.absolute_depth();
        let avoid = VaultTags::ENCOMPASS | VaultTags::PAN | VaultTags::LABYRINTH | VaultTags::BRANCH_END;
        let Some(map) = self.catalogue.pick(depth, want, avoid, state.rng) else {
            return Ok(false);
        };
        self.checked_place(state, map)
    }

    /// Float a vault onto the level, vetoing if it splits the level
    fn checked_place(&self, state: &mut Attempt<'_>, map: &VaultMap) -> Result<bool, VetoReason> {
        state.vaults.push(map.name.clone());
        let placed = place_vault_checked(state.level, map, &self.opts, state.rng)?;
        Ok(placed.is_some())
    }
}

/// Float a vault onto the level, vetoing if it splits the level
///
/// A vault that finds no room is not an error (`Ok(None)`); one that
/// raises the disconnected zone count is.
pub fn place_vault_checked(
    level: &mut Level,
    map: &VaultMap,
    opts: &GenOptions,
    rng: &mut GameRng,
) -> Result<Option<VaultId>, VetoReason> {
    let before = count_disconnected_zones(level);
    match place_vault(level, map, VaultPosition::Float, false, opts, rng) {
        Ok(id) => {
            let after = count_disconnected_zones(level);
            if after > before {
                return Err(VetoReason::ConnectivityBroken {
                    before,
                    after,
                    vault: map.name.clone(),
                });
            }
            Ok(Some(id))
        }
        Err(e) => {
            debug!(target: GEN_TARGET, error = %e, "vault not placed");
            Ok(None)
        }
    }
}

fn stage(state: &Attempt<'_>, stage: BuildStage) {
    debug!(target: GEN_TARGET, level = %state.level.id, %stage, retries_left = state.retries_left, "stage");
}
