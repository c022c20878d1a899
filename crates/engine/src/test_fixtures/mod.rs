//! Test fixtures and common test helpers.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_fixtures::{character_at, TestWorld};
//!
//! #[tokio::test]
//! async fn test_duel() {
//!     let world = TestWorld::new();
//!     let hero = world.add_character(character_at("Hero", location, attrs, 50));
//!     let app = world.app();
//!     // ... test logic
//! }
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::broadcast;
use warbanner_domain::{
    Attributes, Character, CharacterId, Clan, ClanId, ClanMembership, ClanName, ClanRank,
    Combatant, CombatantId, CombatantName, ExperienceGain, LocationId, Npc, NpcId,
};
use warbanner_shared::ServerMessage;

use crate::app::{App, Repositories};
use crate::infrastructure::broadcast::ChannelBroadcaster;
use crate::infrastructure::clock::{FixedClock, ScriptedRandom};
use crate::infrastructure::memory::{
    InMemoryClans, InMemoryCombatants, InMemorySessions, InMemoryTerritory,
};
use crate::infrastructure::ports::{BroadcastPort, CombatantRepo, RepoError};
use crate::infrastructure::settings::EngineSettings;

// =============================================================================
// Builders
// =============================================================================

/// The "now" every fixed clock starts at.
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

pub fn character_at(
    name: &str,
    location_id: LocationId,
    attributes: Attributes,
    max_health: u32,
) -> Character {
    Character::new(
        CombatantName::new(name).unwrap(),
        location_id,
        attributes,
        max_health,
    )
}

/// An NPC spawning at `location_id` with no reward and no respawn.
pub fn npc_at(name: &str, location_id: LocationId, attributes: Attributes, max_health: u32) -> Npc {
    Npc::new(CombatantName::new(name).unwrap(), attributes, max_health)
        .with_spawn_location(location_id)
}

pub fn clan(name: &str, influence_points: u32) -> Clan {
    Clan::new(ClanName::new(name).unwrap()).with_influence(influence_points)
}

pub fn member_of(character: Character, clan_id: ClanId) -> Character {
    character.with_clan(ClanMembership {
        clan_id,
        rank: ClanRank::Member,
    })
}

/// Pull every message currently buffered on a subscription.
pub fn drain(rx: &mut broadcast::Receiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut messages = Vec::new();
    while let Ok(message) = rx.try_recv() {
        messages.push(message);
    }
    messages
}

// =============================================================================
// Test World
// =============================================================================

/// In-memory adapters plus deterministic clock and dice.
pub struct TestWorld {
    pub combatants: Arc<InMemoryCombatants>,
    pub sessions: Arc<InMemorySessions>,
    pub territory: Arc<InMemoryTerritory>,
    pub clans: Arc<InMemoryClans>,
    pub clock: Arc<FixedClock>,
    pub random: Arc<ScriptedRandom>,
    pub broadcaster: Arc<ChannelBroadcaster>,
    pub settings: EngineSettings,
}

impl TestWorld {
    pub fn new() -> Self {
        Self {
            combatants: Arc::new(InMemoryCombatants::new()),
            sessions: Arc::new(InMemorySessions::new()),
            territory: Arc::new(InMemoryTerritory::new()),
            clans: Arc::new(InMemoryClans::new()),
            clock: Arc::new(FixedClock::new(fixed_time())),
            random: Arc::new(ScriptedRandom::new()),
            broadcaster: Arc::new(ChannelBroadcaster::default()),
            settings: EngineSettings {
                store_retries: 0,
                store_retry_delay_ms: 1,
                ..EngineSettings::default()
            },
        }
    }

    pub fn add_character(&self, character: Character) -> CharacterId {
        let id = character.id();
        self.combatants.insert_character(character);
        id
    }

    pub fn add_npc(&self, npc: Npc) -> NpcId {
        let id = npc.id();
        self.combatants.insert_npc(npc);
        id
    }

    pub fn add_clan(&self, clan: Clan) -> ClanId {
        let id = clan.id();
        self.clans.insert(clan);
        id
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            combatants: self.combatants.clone(),
            sessions: self.sessions.clone(),
            territory: self.territory.clone(),
            clans: self.clans.clone(),
        }
    }

    pub fn app(&self) -> App {
        App::new(
            self.repositories(),
            self.clock.clone(),
            self.random.clone(),
            self.broadcaster.clone(),
            self.settings.clone(),
        )
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// An app over arbitrary (usually mocked) repositories.
pub fn app_with(repositories: Repositories, broadcast: Arc<dyn BroadcastPort>) -> App {
    App::new(
        repositories,
        Arc::new(FixedClock::new(fixed_time())),
        Arc::new(ScriptedRandom::new()),
        broadcast,
        EngineSettings {
            store_retries: 0,
            ..EngineSettings::default()
        },
    )
}

// =============================================================================
// Failure Injection
// =============================================================================

/// In-memory combatants whose next few NPC saves fail.
pub struct FlakyCombatants {
    inner: Arc<InMemoryCombatants>,
    failing_npc_saves: AtomicUsize,
}

impl FlakyCombatants {
    pub fn new(inner: Arc<InMemoryCombatants>) -> Self {
        Self {
            inner,
            failing_npc_saves: AtomicUsize::new(0),
        }
    }

    pub fn fail_npc_saves(&self, count: usize) {
        self.failing_npc_saves.store(count, Ordering::SeqCst);
    }
}

#[async_trait]
impl CombatantRepo for FlakyCombatants {
    async fn get_combatant(&self, id: CombatantId) -> Result<Option<Combatant>, RepoError> {
        self.inner.get_combatant(id).await
    }

    async fn update_combatant_health(&self, id: CombatantId, value: u32) -> Result<(), RepoError> {
        self.inner.update_combatant_health(id, value).await
    }

    async fn get_character(&self, id: CharacterId) -> Result<Option<Character>, RepoError> {
        self.inner.get_character(id).await
    }

    async fn save_character(&self, character: &Character) -> Result<(), RepoError> {
        self.inner.save_character(character).await
    }

    async fn add_experience(
        &self,
        id: CharacterId,
        amount: u64,
    ) -> Result<ExperienceGain, RepoError> {
        self.inner.add_experience(id, amount).await
    }

    async fn get_npc(&self, id: NpcId) -> Result<Option<Npc>, RepoError> {
        self.inner.get_npc(id).await
    }

    async fn save_npc(&self, npc: &Npc) -> Result<(), RepoError> {
        let failing = self
            .failing_npc_saves
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(RepoError::database("save_npc", "connection reset"));
        }
        self.inner.save_npc(npc).await
    }

    async fn list_dead_npcs(&self) -> Result<Vec<Npc>, RepoError> {
        self.inner.list_dead_npcs().await
    }
}
