//! Turn scheduler - drives every active combat session one turn per tick.
//!
//! Sessions are pulled from a registry rather than owning their own timers.
//! Each session has a gate (`tokio::sync::Mutex`): a tick takes it with
//! `try_lock`, so two ticks of one session never overlap and a session whose
//! previous tick is still running is skipped instead of queued. Sessions do
//! not share anything else, so they tick in parallel.
//!
//! A tick either commits as a whole (target health, turn counter, log) or is
//! abandoned and retried on the next cycle:
//!
//! ```text
//! load session ──► load combatants ──► termination? ──► finish + broadcast
//!                                        │
//!                                        ▼
//!                    pick actor ──► advance turn ──fail──► force finish
//!                                        │
//!                                        ▼
//!                    pick target ──► resolve (health write)
//!                                        │
//!                                        ▼
//!                    save session ──fail──► rollback health
//!                                        │
//!                                        ▼
//!                                 settle + broadcast delta
//! ```

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures_util::future::join_all;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::{timeout_at, Instant};
use tokio_util::sync::CancellationToken;
use warbanner_domain::combat::{acting_index, check_termination, eligible_targets, turn_order};
use warbanner_domain::{CombatSession, CombatSessionId, Combatant, CombatantId};

use super::attack::AttackResolver;
use super::error::TickError;
use crate::infrastructure::ports::{
    BroadcastPort, ClockPort, CombatSessionRepo, CombatantRepo, RandomPort, RepoError,
};
use crate::use_cases::notify;

/// Result of one tick for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// An exchange was resolved and committed.
    Attacked {
        actor: CombatantId,
        target: CombatantId,
    },
    /// The turn advanced without an attack (actor down or no target).
    Skipped,
    /// The session is finished and no longer scheduled.
    Finished,
    /// The session no longer exists in storage and was dropped.
    Dropped,
    /// The previous tick of this session is still running.
    Busy,
    /// Nothing was committed; the session is retried next cycle.
    Retry,
}

pub struct TurnScheduler {
    sessions: Arc<dyn CombatSessionRepo>,
    combatants: Arc<dyn CombatantRepo>,
    resolver: Arc<AttackResolver>,
    random: Arc<dyn RandomPort>,
    clock: Arc<dyn ClockPort>,
    broadcast: Arc<dyn BroadcastPort>,
    tick_timeout: Duration,
    registry: DashMap<CombatSessionId, Arc<Mutex<()>>>,
}

impl TurnScheduler {
    pub fn new(
        sessions: Arc<dyn CombatSessionRepo>,
        combatants: Arc<dyn CombatantRepo>,
        resolver: Arc<AttackResolver>,
        random: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
        broadcast: Arc<dyn BroadcastPort>,
        tick_timeout: Duration,
    ) -> Self {
        Self {
            sessions,
            combatants,
            resolver,
            random,
            clock,
            broadcast,
            tick_timeout,
            registry: DashMap::new(),
        }
    }

    // =========================================================================
    // Registry
    // =========================================================================

    /// Start scheduling a session. Returns `false` if it already was.
    pub fn register(&self, session_id: CombatSessionId) -> bool {
        let mut inserted = false;
        self.registry.entry(session_id).or_insert_with(|| {
            inserted = true;
            Arc::new(Mutex::new(()))
        });
        if inserted {
            tracing::debug!(session_id = %session_id, "Session registered for ticking");
        }
        inserted
    }

    /// Stop scheduling a session. An in-flight tick is allowed to finish.
    pub fn deregister(&self, session_id: CombatSessionId) -> bool {
        let removed = self.registry.remove(&session_id).is_some();
        if removed {
            tracing::debug!(session_id = %session_id, "Session deregistered");
        }
        removed
    }

    pub fn is_registered(&self, session_id: CombatSessionId) -> bool {
        self.registry.contains_key(&session_id)
    }

    pub fn registered(&self) -> Vec<CombatSessionId> {
        let mut ids: Vec<CombatSessionId> = self.registry.iter().map(|e| *e.key()).collect();
        ids.sort();
        ids
    }

    /// Wait for the session's gate so no tick runs while the caller edits the
    /// session. `None` when the session is not scheduled.
    pub async fn exclusive(&self, session_id: CombatSessionId) -> Option<OwnedMutexGuard<()>> {
        let gate = self.gate(session_id)?;
        Some(gate.lock_owned().await)
    }

    fn gate(&self, session_id: CombatSessionId) -> Option<Arc<Mutex<()>>> {
        self.registry.get(&session_id).map(|g| Arc::clone(g.value()))
    }

    /// Re-register every active session found in storage.
    pub async fn restore_active(&self) -> Result<usize, RepoError> {
        let active = self.sessions.list_active().await?;
        let restored = active.into_iter().filter(|id| self.register(*id)).count();
        if restored > 0 {
            tracing::info!(count = restored, "Restored active combat sessions");
        }
        Ok(restored)
    }

    // =========================================================================
    // Ticking
    // =========================================================================

    /// Tick every registered session in parallel.
    pub async fn tick_all(&self) -> Vec<(CombatSessionId, TickOutcome)> {
        let ids = self.registered();
        let outcomes = join_all(ids.iter().map(|id| self.tick(*id))).await;
        ids.into_iter().zip(outcomes).collect()
    }

    /// Tick on a fixed interval until cancelled.
    ///
    /// Each session's tick is spawned separately, so a slow session only
    /// delays itself.
    pub async fn run(self: Arc<Self>, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        tracing::info!(interval_ms = interval.as_millis() as u64, "Turn scheduler started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    for session_id in self.registered() {
                        let this = Arc::clone(&self);
                        tokio::spawn(async move {
                            this.tick(session_id).await;
                        });
                    }
                }
            }
        }
        tracing::info!("Turn scheduler stopped");
    }

    /// Advance one session by one turn.
    pub async fn tick(&self, session_id: CombatSessionId) -> TickOutcome {
        let gate = self.gate(session_id);
        let Some(gate) = gate else {
            return TickOutcome::Dropped;
        };
        let Ok(_guard) = gate.try_lock_owned() else {
            tracing::debug!(session_id = %session_id, "Previous tick still running, skipping");
            return TickOutcome::Busy;
        };

        match self.tick_locked(session_id).await {
            Ok(outcome) => outcome,
            Err(TickError::Invariant(reason)) => {
                tracing::error!(
                    session_id = %session_id,
                    reason = %reason,
                    "Invariant violated, force-finishing session"
                );
                self.force_finish(session_id, &reason).await
            }
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Tick abandoned");
                TickOutcome::Retry
            }
        }
    }

    async fn tick_locked(&self, session_id: CombatSessionId) -> Result<TickOutcome, TickError> {
        let deadline = Instant::now() + self.tick_timeout;

        let Some(mut session) = bounded(deadline, self.sessions.get(session_id)).await? else {
            tracing::info!(session_id = %session_id, "Session vanished from storage, dropping");
            self.deregister(session_id);
            return Ok(TickOutcome::Dropped);
        };
        if !session.is_active() {
            self.deregister(session_id);
            return Ok(TickOutcome::Finished);
        }

        let combatants = bounded(deadline, self.load_combatants(&session)).await?;

        if let Some(termination) = check_termination(session.kind(), &combatants) {
            self.finish(&mut session, termination.describe(), deadline)
                .await?;
            return Ok(TickOutcome::Finished);
        }

        let order = turn_order(&combatants);
        let index = acting_index(session.turn_counter(), order.len()).ok_or_else(|| {
            TickError::Invariant("turn order computed over zero combatants".to_string())
        })?;
        let actor_id = order[index].id();
        // Fails before anything is written if the session cannot take another turn.
        session
            .advance_turn()
            .map_err(|e| TickError::Invariant(e.to_string()))?;

        // The actor may have died since the snapshot was taken.
        let actor = bounded(deadline, self.combatants.get_combatant(actor_id))
            .await?
            .filter(Combatant::is_alive);
        let target = actor
            .as_ref()
            .and_then(|actor| self.pick_target(&session, actor, &combatants));

        let log_len = session.log().len();
        let (outcome, report) = match (actor, target) {
            (Some(actor), Some(target)) => {
                let report = match timeout_at(
                    deadline,
                    self.resolver.resolve(&actor, target, &mut session),
                )
                .await
                {
                    Ok(result) => result?,
                    Err(_) => {
                        // The health write may have landed; put it back.
                        let _ = self
                            .resolver
                            .restore_health(target.id(), target.health().current())
                            .await;
                        return Err(TickError::TimedOut);
                    }
                };
                (
                    TickOutcome::Attacked {
                        actor: actor_id,
                        target: target.id(),
                    },
                    Some(report),
                )
            }
            _ => {
                tracing::debug!(
                    session_id = %session_id,
                    actor = %actor_id,
                    "No attack this turn"
                );
                (TickOutcome::Skipped, None)
            }
        };

        if let Err(e) = bounded(deadline, self.sessions.save(&session)).await {
            if let Some(report) = &report {
                let _ = self.resolver.rollback(report).await;
            }
            return Err(e);
        }

        if let Some(report) = &report {
            let settle = tokio::time::timeout(
                self.tick_timeout,
                self.resolver.settle(report, &mut session),
            )
            .await;
            match settle {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => tracing::warn!(
                    session_id = %session_id,
                    error = %e,
                    "Failed to apply post-attack effects"
                ),
                Err(_) => tracing::warn!(
                    session_id = %session_id,
                    "Post-attack effects timed out"
                ),
            }
        }

        self.broadcast
            .broadcast(notify::combat_log_delta(&session, log_len));
        Ok(outcome)
    }

    async fn load_combatants(&self, session: &CombatSession) -> Result<Vec<Combatant>, RepoError> {
        let mut combatants = Vec::new();
        for id in session.participants() {
            match self.combatants.get_combatant(id).await? {
                Some(combatant) => combatants.push(combatant),
                None => tracing::warn!(
                    session_id = %session.id(),
                    combatant = %id,
                    "Participant missing from storage, treating as defeated"
                ),
            }
        }
        Ok(combatants)
    }

    fn pick_target<'a>(
        &self,
        session: &CombatSession,
        actor: &Combatant,
        combatants: &'a [Combatant],
    ) -> Option<&'a Combatant> {
        let targets = eligible_targets(session.kind(), actor, combatants);
        match targets.len() {
            0 => None,
            1 => targets.first().copied(),
            n => {
                let max = i32::try_from(n - 1).unwrap_or(i32::MAX);
                let pick = usize::try_from(self.random.gen_range(0, max)).unwrap_or(0);
                targets.get(pick).copied()
            }
        }
    }

    async fn finish(
        &self,
        session: &mut CombatSession,
        reason: &str,
        deadline: Instant,
    ) -> Result<(), TickError> {
        let log_len = session.log().len();
        session.finish(self.clock.now(), reason);
        bounded(deadline, self.sessions.save(session)).await?;
        self.deregister(session.id());

        tracing::info!(
            session_id = %session.id(),
            turns = session.turn_counter(),
            reason = reason,
            "Combat session finished"
        );
        self.broadcast
            .broadcast(notify::combat_log_delta(session, log_len));
        self.broadcast
            .broadcast(notify::combat_finished(session, reason));
        Ok(())
    }

    /// Finish a session that cannot continue. Best effort: a failed save
    /// still stops scheduling it.
    async fn force_finish(&self, session_id: CombatSessionId, reason: &str) -> TickOutcome {
        let deadline = Instant::now() + self.tick_timeout;
        let reason = format!("aborted: {reason}");
        match bounded(deadline, self.sessions.get(session_id)).await {
            Ok(Some(mut session)) => {
                if let Err(e) = self.finish(&mut session, &reason, deadline).await {
                    tracing::error!(
                        session_id = %session_id,
                        error = %e,
                        "Failed to persist forced finish"
                    );
                }
            }
            Ok(None) => {}
            Err(e) => tracing::error!(
                session_id = %session_id,
                error = %e,
                "Failed to load session for forced finish"
            ),
        }
        self.deregister(session_id);
        TickOutcome::Finished
    }
}

/// Run a storage call against the tick deadline.
async fn bounded<T>(
    deadline: Instant,
    call: impl std::future::Future<Output = Result<T, RepoError>>,
) -> Result<T, TickError> {
    match timeout_at(deadline, call).await {
        Ok(result) => result.map_err(TickError::from),
        Err(_) => Err(TickError::TimedOut),
    }
}
