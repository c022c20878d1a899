//! NPC respawn timers.
//!
//! A death arms a one-shot timer; expiry restores the NPC to full health and
//! back into its spawn pool. A manual respawn cancels the pending timer.
//! Both paths run under one lock and the timer only fires while its entry is
//! still the current one, so an NPC is never revived twice for one death.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use warbanner_domain::{Npc, NpcId, RespawnOutcome};

use crate::infrastructure::ports::{BroadcastPort, ClockPort, CombatantRepo, RepoError};
use crate::use_cases::notify;

/// Delay before retrying a respawn whose save failed.
const RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespawnSchedule {
    /// Respawn delay is zero: the NPC stays dead until respawned manually.
    Never,
    At(DateTime<Utc>),
}

#[derive(Debug, thiserror::Error)]
pub enum RespawnError {
    #[error("NPC {0} not found")]
    NpcNotFound(NpcId),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

struct PendingRespawn {
    token: CancellationToken,
    generation: u64,
    due_at: DateTime<Utc>,
}

pub struct NpcRespawnScheduler {
    combatants: Arc<dyn CombatantRepo>,
    clock: Arc<dyn ClockPort>,
    broadcast: Arc<dyn BroadcastPort>,
    pending: DashMap<NpcId, PendingRespawn>,
    generation: AtomicU64,
    respawn_lock: Mutex<()>,
    shutdown: CancellationToken,
}

impl NpcRespawnScheduler {
    pub fn new(
        combatants: Arc<dyn CombatantRepo>,
        clock: Arc<dyn ClockPort>,
        broadcast: Arc<dyn BroadcastPort>,
    ) -> Self {
        Self {
            combatants,
            clock,
            broadcast,
            pending: DashMap::new(),
            generation: AtomicU64::new(0),
            respawn_lock: Mutex::new(()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Record a death and arm the respawn timer.
    ///
    /// Calling this again for an NPC whose timer is already pending returns
    /// the existing schedule.
    pub async fn handle_death(
        self: &Arc<Self>,
        npc_id: NpcId,
    ) -> Result<RespawnSchedule, RespawnError> {
        let _guard = self.respawn_lock.lock().await;
        self.record_death(npc_id).await
    }

    /// Keep retrying a death hand-off that failed, once per [`RETRY_DELAY`],
    /// until it is recorded.
    ///
    /// Stops early if the NPC is alive again (a manual respawn got there
    /// first), no longer exists, or the scheduler shuts down.
    pub fn retry_death(self: &Arc<Self>, npc_id: NpcId) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut attempt = 1u32;
            loop {
                tokio::select! {
                    _ = this.shutdown.cancelled() => return,
                    _ = tokio::time::sleep(RETRY_DELAY) => {}
                }

                let _guard = this.respawn_lock.lock().await;
                let result = match this.combatants.get_npc(npc_id).await {
                    Ok(Some(npc)) if npc.is_alive() => return,
                    Ok(Some(_)) => this.record_death(npc_id).await,
                    Ok(None) => return,
                    Err(e) => Err(e.into()),
                };
                match result {
                    Ok(schedule) => {
                        tracing::info!(
                            npc_id = %npc_id,
                            attempt = attempt,
                            schedule = ?schedule,
                            "NPC death recorded after retry"
                        );
                        return;
                    }
                    Err(RespawnError::NpcNotFound(_)) => return,
                    Err(e) => {
                        tracing::warn!(
                            npc_id = %npc_id,
                            attempt = attempt,
                            error = %e,
                            "NPC death hand-off failed again"
                        );
                    }
                }
                attempt = attempt.saturating_add(1);
            }
        });
    }

    /// Mark the NPC dead and arm its timer. Callers hold `respawn_lock`.
    async fn record_death(
        self: &Arc<Self>,
        npc_id: NpcId,
    ) -> Result<RespawnSchedule, RespawnError> {
        if let Some(pending) = self.pending.get(&npc_id) {
            return Ok(RespawnSchedule::At(pending.due_at));
        }

        let mut npc = self
            .combatants
            .get_npc(npc_id)
            .await?
            .ok_or(RespawnError::NpcNotFound(npc_id))?;
        let now = self.clock.now();
        npc.mark_dead(now);
        self.combatants.save_npc(&npc).await?;

        let Some(due_at) = npc.respawn_due_at() else {
            tracing::info!(npc_id = %npc_id, "NPC died and does not respawn");
            return Ok(RespawnSchedule::Never);
        };

        self.arm(npc_id, Duration::from_secs(npc.respawn_secs()), due_at);
        tracing::info!(
            npc_id = %npc_id,
            respawn_secs = npc.respawn_secs(),
            due_at = %due_at,
            "NPC died, respawn scheduled"
        );
        Ok(RespawnSchedule::At(due_at))
    }

    /// Respawn now, cancelling any pending timer.
    pub async fn respawn_now(&self, npc_id: NpcId) -> Result<RespawnOutcome, RespawnError> {
        let _guard = self.respawn_lock.lock().await;
        if let Some((_, pending)) = self.pending.remove(&npc_id) {
            pending.token.cancel();
            tracing::debug!(npc_id = %npc_id, "Cancelled pending respawn timer");
        }
        self.revive(npc_id).await
    }

    pub fn is_pending(&self, npc_id: NpcId) -> bool {
        self.pending.contains_key(&npc_id)
    }

    pub fn pending_due_at(&self, npc_id: NpcId) -> Option<DateTime<Utc>> {
        self.pending.get(&npc_id).map(|p| p.due_at)
    }

    /// Re-arm timers for NPCs that were already dead at startup.
    ///
    /// The remaining delay is measured from the recorded death; overdue NPCs
    /// respawn right away. An NPC that is dead without a death timestamp is
    /// treated as having died now.
    pub async fn restore_pending(self: &Arc<Self>) -> Result<usize, RepoError> {
        let dead = self.combatants.list_dead_npcs().await?;
        let now = self.clock.now();
        let mut armed = 0;

        for mut npc in dead {
            if !npc.respawns() || self.is_pending(npc.id()) {
                continue;
            }
            if npc.died_at().is_none() {
                npc.mark_dead(now);
                self.combatants.save_npc(&npc).await?;
            }
            let Some(due_at) = npc.respawn_due_at() else {
                continue;
            };
            let remaining = (due_at - now).to_std().unwrap_or(Duration::ZERO);
            self.arm(npc.id(), remaining, due_at);
            armed += 1;
        }

        if armed > 0 {
            tracing::info!(count = armed, "Restored pending NPC respawns");
        }
        Ok(armed)
    }

    /// Cancel every pending timer.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    fn arm(self: &Arc<Self>, npc_id: NpcId, delay: Duration, due_at: DateTime<Utc>) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let token = self.shutdown.child_token();
        let previous = self.pending.insert(
            npc_id,
            PendingRespawn {
                token: token.clone(),
                generation,
                due_at,
            },
        );
        if let Some(previous) = previous {
            previous.token.cancel();
        }

        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    this.fire(npc_id, generation, due_at).await;
                }
            }
        });
    }

    async fn fire(self: Arc<Self>, npc_id: NpcId, generation: u64, due_at: DateTime<Utc>) {
        let _guard = self.respawn_lock.lock().await;
        if self
            .pending
            .remove_if(&npc_id, |_, p| p.generation == generation)
            .is_none()
        {
            // superseded or cancelled while waiting for the lock
            return;
        }

        if let Err(e) = self.revive(npc_id).await {
            tracing::warn!(npc_id = %npc_id, error = %e, "Timed respawn failed, retrying");
            if matches!(e, RespawnError::Repo(_)) {
                self.arm(npc_id, RETRY_DELAY, due_at);
            }
        }
    }

    async fn revive(&self, npc_id: NpcId) -> Result<RespawnOutcome, RespawnError> {
        let mut npc: Npc = self
            .combatants
            .get_npc(npc_id)
            .await?
            .ok_or(RespawnError::NpcNotFound(npc_id))?;

        let outcome = npc.revive();
        if let RespawnOutcome::Respawned { health } = outcome {
            self.combatants.save_npc(&npc).await?;
            self.broadcast.broadcast(notify::npc_respawned(&npc));
            tracing::info!(npc_id = %npc_id, health = health, "NPC respawned");
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::memory::InMemoryCombatants;
    use crate::infrastructure::ports::{MockBroadcastPort, MockCombatantRepo};
    use crate::test_fixtures::{fixed_time, npc_at, FlakyCombatants};
    use warbanner_domain::{Attributes, LocationId};
    use warbanner_shared::ServerMessage;

    fn counting_broadcast(expected: usize) -> MockBroadcastPort {
        let mut broadcast = MockBroadcastPort::new();
        broadcast
            .expect_broadcast()
            .withf(|m| matches!(m, ServerMessage::NpcRespawned { .. }))
            .times(expected)
            .return_const(());
        broadcast
    }

    fn scheduler(
        combatants: Arc<InMemoryCombatants>,
        broadcast: MockBroadcastPort,
    ) -> Arc<NpcRespawnScheduler> {
        Arc::new(NpcRespawnScheduler::new(
            combatants,
            Arc::new(FixedClock::new(fixed_time())),
            Arc::new(broadcast),
        ))
    }

    fn dead_wolf(respawn_secs: u64) -> Npc {
        let mut npc = npc_at("Wolf", LocationId::new(), Attributes::new(5, 5, 5, 5), 30)
            .with_respawn_secs(respawn_secs);
        npc.set_current_health(0);
        npc
    }

    #[tokio::test(start_paused = true)]
    async fn timer_restores_full_health_after_delay() {
        let combatants = Arc::new(InMemoryCombatants::new());
        let npc = dead_wolf(30);
        let npc_id = npc.id();
        combatants.insert_npc(npc);
        let respawn = scheduler(combatants.clone(), counting_broadcast(1));

        let schedule = respawn.handle_death(npc_id).await.unwrap();
        assert_eq!(
            schedule,
            RespawnSchedule::At(fixed_time() + chrono::Duration::seconds(30))
        );
        assert!(respawn.is_pending(npc_id));

        tokio::time::sleep(Duration::from_secs(29)).await;
        let npc = combatants.get_npc(npc_id).await.unwrap().unwrap();
        assert!(!npc.is_alive());

        tokio::time::sleep(Duration::from_secs(2)).await;
        let npc = combatants.get_npc(npc_id).await.unwrap().unwrap();
        assert!(npc.is_alive());
        assert_eq!(npc.health().current(), npc.health().max());
        assert_eq!(npc.died_at(), None);
        assert!(!respawn.is_pending(npc_id));
    }

    #[tokio::test(start_paused = true)]
    async fn manual_respawn_cancels_timer() {
        let combatants = Arc::new(InMemoryCombatants::new());
        let npc = dead_wolf(30);
        let npc_id = npc.id();
        combatants.insert_npc(npc);
        let respawn = scheduler(combatants.clone(), counting_broadcast(1));

        respawn.handle_death(npc_id).await.unwrap();
        let outcome = respawn.respawn_now(npc_id).await.unwrap();
        assert_eq!(outcome, RespawnOutcome::Respawned { health: 30 });
        assert!(!respawn.is_pending(npc_id));

        // Kill it again without a timer; the cancelled timer must not revive it.
        let mut npc = combatants.get_npc(npc_id).await.unwrap().unwrap();
        npc.mark_dead(fixed_time());
        combatants.save_npc(&npc).await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;

        let npc = combatants.get_npc(npc_id).await.unwrap().unwrap();
        assert!(!npc.is_alive());
    }

    #[tokio::test(start_paused = true)]
    async fn death_retry_stops_once_a_manual_respawn_got_there_first() {
        let combatants = Arc::new(InMemoryCombatants::new());
        let npc = dead_wolf(30);
        let npc_id = npc.id();
        combatants.insert_npc(npc);
        let flaky = Arc::new(FlakyCombatants::new(combatants.clone()));
        flaky.fail_npc_saves(1);
        let respawn = Arc::new(NpcRespawnScheduler::new(
            flaky,
            Arc::new(FixedClock::new(fixed_time())),
            Arc::new(counting_broadcast(1)),
        ));

        assert!(matches!(
            respawn.handle_death(npc_id).await,
            Err(RespawnError::Repo(_))
        ));
        respawn.retry_death(npc_id);
        respawn.respawn_now(npc_id).await.unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!respawn.is_pending(npc_id));
        let npc = combatants.get_npc(npc_id).await.unwrap().unwrap();
        assert!(npc.is_alive());
        assert_eq!(npc.died_at(), None);
    }

    #[tokio::test]
    async fn zero_delay_never_respawns() {
        let combatants = Arc::new(InMemoryCombatants::new());
        let npc = dead_wolf(0);
        let npc_id = npc.id();
        combatants.insert_npc(npc);
        let respawn = scheduler(combatants.clone(), counting_broadcast(0));

        assert_eq!(
            respawn.handle_death(npc_id).await.unwrap(),
            RespawnSchedule::Never
        );
        assert!(!respawn.is_pending(npc_id));
        let npc = combatants.get_npc(npc_id).await.unwrap().unwrap();
        assert_eq!(npc.died_at(), Some(fixed_time()));
    }

    #[tokio::test]
    async fn respawning_a_living_npc_is_a_no_op() {
        let combatants = Arc::new(InMemoryCombatants::new());
        let npc = npc_at("Wolf", LocationId::new(), Attributes::new(5, 5, 5, 5), 30);
        let npc_id = npc.id();
        combatants.insert_npc(npc);
        let respawn = scheduler(combatants, counting_broadcast(0));

        assert_eq!(
            respawn.respawn_now(npc_id).await.unwrap(),
            RespawnOutcome::NotDead
        );
    }

    #[tokio::test]
    async fn when_npc_not_found_returns_error() {
        let mut combatants = MockCombatantRepo::new();
        combatants.expect_get_npc().returning(|_| Ok(None));
        let respawn = Arc::new(NpcRespawnScheduler::new(
            Arc::new(combatants),
            Arc::new(FixedClock::new(fixed_time())),
            Arc::new(MockBroadcastPort::new()),
        ));

        let result = respawn.handle_death(NpcId::new()).await;
        assert!(matches!(result, Err(RespawnError::NpcNotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn restore_uses_remaining_delay() {
        let combatants = Arc::new(InMemoryCombatants::new());
        let mut npc = npc_at("Wolf", LocationId::new(), Attributes::new(5, 5, 5, 5), 30)
            .with_respawn_secs(60);
        // died 45 seconds before "now"
        npc.mark_dead(fixed_time() - chrono::Duration::seconds(45));
        let npc_id = npc.id();
        combatants.insert_npc(npc);
        let respawn = scheduler(combatants.clone(), counting_broadcast(1));

        assert_eq!(respawn.restore_pending().await.unwrap(), 1);
        tokio::time::sleep(Duration::from_secs(16)).await;
        assert!(combatants.get_npc(npc_id).await.unwrap().unwrap().is_alive());
    }
}
