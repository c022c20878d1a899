//! Aggregate roots - domain objects that own their related data
//!
//! Each aggregate:
//! - Has a unique identity
//! - Exposes behavior through methods, not public fields
//! - Returns domain events (or `DomainError`) from mutations
//!
//! | Concern | Rustic Equivalent |
//! |---------|-------------------|
//! | Validated fields | Newtypes valid by construction (`Health`, `CombatantName`) |
//! | Polymorphic combatants | `Combatant` enum with exhaustive matches |
//! | Domain Events | Return enums from mutations |

pub mod character;
pub mod clan;
pub mod combat_session;
pub mod combatant;
pub mod npc;
pub mod territory_battle;

pub use character::{Character, ClanMembership, ClanRank};
pub use clan::Clan;
pub use combat_session::{CombatKind, CombatSession, CombatStatus};
pub use combatant::Combatant;
pub use npc::Npc;
pub use territory_battle::{BattleSide, BattleStatus, TerritoryBattle};
