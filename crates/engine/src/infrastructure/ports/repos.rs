// Port traits define the full contract - not every adapter uses every method
#![allow(dead_code)]

//! Repository port traits for storage access.
//!
//! These are implemented by the persistence layer. The engine only ever talks
//! to storage through them.

use async_trait::async_trait;
use warbanner_domain::{
    Character, CharacterId, Clan, ClanId, CombatLogEntry, CombatSession, CombatSessionId,
    Combatant, CombatantId, ExperienceGain, LocationId, Npc, NpcId, TerritoryBattle, TerritoryBattleId,
    TerritoryOwnership,
};

use super::error::RepoError;

// =============================================================================
// Combatants
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CombatantRepo: Send + Sync {
    /// Snapshot of either combatant variant.
    async fn get_combatant(&self, id: CombatantId) -> Result<Option<Combatant>, RepoError>;

    /// Overwrite current health. Values above max are clamped by the adapter.
    async fn update_combatant_health(&self, id: CombatantId, value: u32) -> Result<(), RepoError>;

    async fn get_character(&self, id: CharacterId) -> Result<Option<Character>, RepoError>;
    async fn save_character(&self, character: &Character) -> Result<(), RepoError>;

    /// Add experience and recompute the level in place. Health and every
    /// other field are left as stored.
    async fn add_experience(
        &self,
        id: CharacterId,
        amount: u64,
    ) -> Result<ExperienceGain, RepoError>;

    async fn get_npc(&self, id: NpcId) -> Result<Option<Npc>, RepoError>;
    async fn save_npc(&self, npc: &Npc) -> Result<(), RepoError>;

    /// NPCs currently dead (used to re-arm respawn timers at startup).
    async fn list_dead_npcs(&self) -> Result<Vec<Npc>, RepoError>;
}

// =============================================================================
// Combat Sessions
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CombatSessionRepo: Send + Sync {
    async fn get(&self, id: CombatSessionId) -> Result<Option<CombatSession>, RepoError>;

    /// Store a new session and bind its participants to it.
    async fn insert(&self, session: &CombatSession) -> Result<(), RepoError>;

    /// Overwrite a session (turn counter, log, status, participants).
    ///
    /// Participant bindings follow the status: an active session binds its
    /// characters and NPCs, a finished one releases them.
    async fn save(&self, session: &CombatSession) -> Result<(), RepoError>;

    async fn append_log_entry(
        &self,
        id: CombatSessionId,
        entry: &CombatLogEntry,
    ) -> Result<(), RepoError>;

    /// The active session a combatant is bound to, if any.
    async fn get_active_session(
        &self,
        combatant_id: CombatantId,
    ) -> Result<Option<CombatSessionId>, RepoError>;

    async fn list_active(&self) -> Result<Vec<CombatSessionId>, RepoError>;
}

// =============================================================================
// Territory
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TerritoryRepo: Send + Sync {
    async fn get_battle(&self, id: TerritoryBattleId)
        -> Result<Option<TerritoryBattle>, RepoError>;
    async fn save_battle(&self, battle: &TerritoryBattle) -> Result<(), RepoError>;

    /// The non-completed battle for a location, if any.
    async fn find_open_battle(
        &self,
        location_id: LocationId,
    ) -> Result<Option<TerritoryBattle>, RepoError>;
    async fn list_open_battles(&self) -> Result<Vec<TerritoryBattle>, RepoError>;

    async fn get_ownership(
        &self,
        location_id: LocationId,
    ) -> Result<Option<TerritoryOwnership>, RepoError>;
    async fn update_ownership(&self, ownership: &TerritoryOwnership) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClanRepo: Send + Sync {
    async fn get(&self, id: ClanId) -> Result<Option<Clan>, RepoError>;
    async fn save(&self, clan: &Clan) -> Result<(), RepoError>;
}
