//! Beam and bolt engine
//!
//! A shot goes through the same path for real and tracer mode:
//!
//! 1. [`Bolt::new`] resolves the attack kind into damage, range and flags
//!    from the [`attack::ATTACKS`] table.
//! 2. [`fire`] walks the ray cell by cell. Walls may be dug, blasted or
//!    bounced off, and actors in the path go through the [`EffectSink`].
//! 3. Explosions and big clouds detonate where the bolt comes to rest.
//!
//! [`fire_player_shot`] runs a tracer first so the player can decline to
//! shoot through an ally; [`trace_for_ai`] only returns the statistics.

pub mod affect;
pub mod attack;
mod bolt;
pub mod corrosion;
pub mod explode;
pub mod flavour;
mod sink;
mod trace;
mod ui;
pub mod walls;

pub use affect::{ActorRef, BeamWorld, HitOutcome};
pub use attack::{AttackKind, AttackSpec, Dice};
pub use bolt::{BeamResult, BeamStep, Bolt, DamageRecord, Thrower};
pub use corrosion::{CorrosionOutcome, corrode_item};
pub use explode::{explode, explosion_cells};
pub use flavour::{Flavour, ResistNote};
pub use sink::{EffectSink, RealEffects, TracerCount, TracerSink, TracerStats};
pub use trace::{fire, fire_player_shot, trace_for_ai};
pub use ui::{BeamUi, NullUi, RecordingUi};
pub use walls::WallChange;
