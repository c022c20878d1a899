//! Application state and composition.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::infrastructure::{
    broadcast::ChannelBroadcaster,
    clock::{SystemClock, SystemRandom},
    memory::{InMemoryClans, InMemoryCombatants, InMemorySessions, InMemoryTerritory},
    ports::{
        BroadcastPort, ClanRepo, ClockPort, CombatSessionRepo, CombatantRepo, RandomPort,
        RepoError, TerritoryRepo,
    },
    settings::EngineSettings,
};
use crate::use_cases::{
    AttackResolver, CombatLifecycle, CombatUseCases, ExperienceAwarder, NpcRespawnScheduler,
    TerritoryCoordinator, TurnScheduler,
};

/// Main application state.
///
/// Holds the storage ports and every use case wired against them.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
    pub broadcast: Arc<dyn BroadcastPort>,
    pub settings: EngineSettings,
}

/// Container for all repository ports.
pub struct Repositories {
    pub combatants: Arc<dyn CombatantRepo>,
    pub sessions: Arc<dyn CombatSessionRepo>,
    pub territory: Arc<dyn TerritoryRepo>,
    pub clans: Arc<dyn ClanRepo>,
}

/// Container for all use cases.
pub struct UseCases {
    pub combat: CombatUseCases,
    pub respawn: Arc<NpcRespawnScheduler>,
    pub territory: Arc<TerritoryCoordinator>,
}

/// What [`App::restore`] found in storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub sessions: usize,
    pub respawns: usize,
}

impl App {
    pub fn new(
        repositories: Repositories,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
        broadcast: Arc<dyn BroadcastPort>,
        settings: EngineSettings,
    ) -> Self {
        let respawn = Arc::new(NpcRespawnScheduler::new(
            repositories.combatants.clone(),
            clock.clone(),
            broadcast.clone(),
        ));
        let experience = Arc::new(ExperienceAwarder::new(
            repositories.combatants.clone(),
            repositories.sessions.clone(),
            clock.clone(),
        ));
        let resolver = Arc::new(AttackResolver::new(
            repositories.combatants.clone(),
            experience.clone(),
            respawn.clone(),
            clock.clone(),
            random.clone(),
            settings.store_retry(),
        ));
        let scheduler = Arc::new(TurnScheduler::new(
            repositories.sessions.clone(),
            repositories.combatants.clone(),
            resolver.clone(),
            random,
            clock.clone(),
            broadcast.clone(),
            settings.tick_timeout(),
        ));
        let lifecycle = Arc::new(CombatLifecycle::new(
            repositories.sessions.clone(),
            repositories.combatants.clone(),
            scheduler.clone(),
            experience.clone(),
            clock.clone(),
        ));
        let territory = Arc::new(TerritoryCoordinator::new(
            repositories.territory.clone(),
            repositories.clans.clone(),
            repositories.combatants.clone(),
            clock,
            broadcast.clone(),
            settings.preparation_window(),
            settings.territory_xp_bonus,
        ));

        let use_cases = UseCases {
            combat: CombatUseCases::new(lifecycle, scheduler, resolver, experience),
            respawn,
            territory,
        };

        Self {
            repositories,
            use_cases,
            broadcast,
            settings,
        }
    }

    /// An app backed by the in-memory adapters, the system clock and a
    /// channel broadcaster the caller can subscribe to.
    pub fn in_memory(settings: EngineSettings) -> (Self, Arc<ChannelBroadcaster>) {
        let repositories = Repositories {
            combatants: Arc::new(InMemoryCombatants::new()),
            sessions: Arc::new(InMemorySessions::new()),
            territory: Arc::new(InMemoryTerritory::new()),
            clans: Arc::new(InMemoryClans::new()),
        };
        let broadcaster = Arc::new(ChannelBroadcaster::default());
        let app = Self::new(
            repositories,
            Arc::new(SystemClock::new()),
            Arc::new(SystemRandom::new()),
            broadcaster.clone(),
            settings,
        );
        (app, broadcaster)
    }

    /// Pick up work left in storage by a previous run: active sessions go
    /// back to the scheduler, dead NPCs get their respawn timers re-armed.
    pub async fn restore(&self) -> Result<RestoreSummary, RepoError> {
        let sessions = self.use_cases.combat.scheduler.restore_active().await?;
        let respawns = self.use_cases.respawn.restore_pending().await?;
        Ok(RestoreSummary { sessions, respawns })
    }

    /// Spawn the combat tick loop and the territory sweep loop.
    pub fn spawn_background(&self, cancel: &CancellationToken) -> Vec<JoinHandle<()>> {
        let scheduler = self.use_cases.combat.scheduler.clone();
        let territory = self.use_cases.territory.clone();
        vec![
            tokio::spawn(scheduler.run(self.settings.tick_interval(), cancel.child_token())),
            tokio::spawn(territory.run(
                self.settings.territory_sweep_interval(),
                cancel.child_token(),
            )),
        ]
    }

    /// Stop timers that are not tied to a background loop.
    pub fn shutdown(&self) {
        self.use_cases.respawn.shutdown();
    }
}
