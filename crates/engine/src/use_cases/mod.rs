//! Use cases - the engine's operations.
//!
//! Each use case holds its ports as `Arc<dyn Port>` and is shared through the
//! [`crate::App`] container.

pub mod combat;
pub mod notify;
pub mod npc;
pub mod territory;

pub use combat::{
    AttackReport, AttackResolver, CombatError, CombatLifecycle, CombatUseCases, ExperienceAward,
    ExperienceAwarder, TickError, TickOutcome, TurnScheduler,
};
pub use npc::{NpcRespawnScheduler, RespawnError, RespawnSchedule};
pub use territory::{Declaration, SweepReport, TerritoryCoordinator, TerritoryError};
