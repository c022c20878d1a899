//! Domain Events
//!
//! Return types from aggregate mutations, communicating what happened when
//! state was modified so callers can react (log, persist, broadcast).

pub mod battle_events;
pub mod combatant_events;

pub use battle_events::*;
pub use combatant_events::*;
