//! Warbanner domain: combatants, combat sessions, territory battles and the
//! pure rules that govern them. No I/O, no clocks, no RNG.

extern crate self as warbanner_domain;

pub mod aggregates;
pub mod combat;
pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod value_objects;

pub use aggregates::{
    BattleSide, BattleStatus, Character, Clan, ClanMembership, ClanRank, CombatKind,
    CombatSession, CombatStatus, Combatant, Npc, TerritoryBattle,
};

pub use combat::{CombatDice, ExchangeOutcome, Termination};

pub use entities::{CombatLog, CombatLogEntry, CombatantStatistics, LogEntryKind, TerritoryOwnership};

pub use error::DomainError;

pub use events::{BattleResolution, DamageOutcome, ExperienceGain, RespawnOutcome};

// Re-export ID types
pub use ids::{
    CharacterId, ClanId, CombatSessionId, CombatantId, LocationId, NpcId, TerritoryBattleId,
};

pub use value_objects::{
    Attributes, ClanName, CombatantName, DerivedStats, Health, BLOCK_CAP, CRIT_CAP, DODGE_CAP,
};
