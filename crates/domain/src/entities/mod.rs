//! Entities - records with identity that live inside aggregates or stand alone

pub mod combat_log;
pub mod territory_ownership;

pub use combat_log::{CombatLog, CombatLogEntry, CombatantStatistics, LogEntryKind};
pub use territory_ownership::TerritoryOwnership;
