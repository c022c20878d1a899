//! NPC use cases.
//!
//! Handles NPC death bookkeeping and respawn timers.

mod respawn;

pub use respawn::{NpcRespawnScheduler, RespawnError, RespawnSchedule};
