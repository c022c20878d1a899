//! In-memory storage adapters.
//!
//! Backed by `DashMap`, these implement the repository ports for the bundled
//! binary and the end-to-end tests. A real deployment swaps them for a
//! database-backed persistence layer without touching the use cases.

mod combatants;
mod sessions;
mod territory;

pub use combatants::InMemoryCombatants;
pub use sessions::InMemorySessions;
pub use territory::{InMemoryClans, InMemoryTerritory};
