//! Attack resolution against storage.
//!
//! A resolution is split in three steps so the scheduler can keep health and
//! log consistent:
//!
//! 1. [`AttackResolver::resolve`] rolls the exchange, writes the target's new
//!    health (with bounded retry) and only then appends log entries to the
//!    caller's copy of the session.
//! 2. If the session write that follows fails, [`AttackResolver::rollback`]
//!    puts the previous health back.
//! 3. Once the session is committed, [`AttackResolver::settle`] applies the
//!    follow-up effects of a kill: respawn hand-off and experience.

use std::sync::Arc;

use warbanner_domain::combat::{
    resolve_exchange, CombatDice, BLOCK_REDUCTION_MAX, BLOCK_REDUCTION_MIN,
};
use warbanner_domain::{
    CombatLogEntry, CombatSession, Combatant, CombatantId, ExchangeOutcome, LogEntryKind,
};

use super::experience::{ExperienceAward, ExperienceAwarder};
use crate::infrastructure::ports::{ClockPort, CombatantRepo, RandomPort, RepoError};
use crate::infrastructure::retry::RetryConfig;
use crate::use_cases::npc::NpcRespawnScheduler;

/// What one resolution did.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackReport {
    pub attacker: CombatantId,
    pub target: CombatantId,
    pub outcome: ExchangeOutcome,
    pub previous_health: u32,
    pub new_health: u32,
    /// Reward the target grants when defeated; `None` for characters.
    pub experience_reward: Option<u64>,
}

impl AttackReport {
    /// Whether the target's health was written.
    pub fn wrote_health(&self) -> bool {
        matches!(self.outcome, ExchangeOutcome::Hit { .. })
    }

    pub fn defeated(&self) -> bool {
        self.wrote_health() && self.previous_health > 0 && self.new_health == 0
    }
}

/// Adapts the random port to the domain's dice.
struct PortDice<'a> {
    random: &'a dyn RandomPort,
}

impl CombatDice for PortDice<'_> {
    fn percent(&mut self) -> f64 {
        self.random.gen_unit() * 100.0
    }

    fn damage(&mut self, min: u32, max: u32) -> u32 {
        let lo = i32::try_from(min).unwrap_or(i32::MAX);
        let hi = i32::try_from(max).unwrap_or(i32::MAX).max(lo);
        u32::try_from(self.random.gen_range(lo, hi)).unwrap_or(min)
    }

    fn block_fraction(&mut self) -> f64 {
        BLOCK_REDUCTION_MIN + self.random.gen_unit() * (BLOCK_REDUCTION_MAX - BLOCK_REDUCTION_MIN)
    }
}

pub struct AttackResolver {
    combatants: Arc<dyn CombatantRepo>,
    experience: Arc<ExperienceAwarder>,
    respawn: Arc<NpcRespawnScheduler>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
    retry: RetryConfig,
}

impl AttackResolver {
    pub fn new(
        combatants: Arc<dyn CombatantRepo>,
        experience: Arc<ExperienceAwarder>,
        respawn: Arc<NpcRespawnScheduler>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            combatants,
            experience,
            respawn,
            clock,
            random,
            retry,
        }
    }

    /// Roll one exchange and persist its effect on the target.
    ///
    /// On error nothing was appended to `session`'s log and, as far as this
    /// call knows, the health write did not happen.
    pub async fn resolve(
        &self,
        attacker: &Combatant,
        target: &Combatant,
        session: &mut CombatSession,
    ) -> Result<AttackReport, RepoError> {
        let mut dice = PortDice {
            random: self.random.as_ref(),
        };
        let outcome = resolve_exchange(&attacker.derived_stats(), &target.derived_stats(), &mut dice);

        let attacker_id = attacker.id();
        let target_id = target.id();
        let previous_health = target.health().current();
        let experience_reward = target.as_npc().map(|npc| npc.experience_reward());

        let (damage, critical, blocked) = match outcome {
            ExchangeOutcome::Dodged => {
                let entry = CombatLogEntry::new(
                    self.clock.now(),
                    LogEntryKind::Dodge,
                    format!("{} dodges {}'s attack", target.name(), attacker.name()),
                )
                .with_actor(attacker_id)
                .with_target(target_id);
                session.append_log(entry);
                tracing::debug!(
                    session_id = %session.id(),
                    attacker = %attacker_id,
                    target = %target_id,
                    "Attack dodged"
                );
                return Ok(AttackReport {
                    attacker: attacker_id,
                    target: target_id,
                    outcome,
                    previous_health,
                    new_health: previous_health,
                    experience_reward,
                });
            }
            ExchangeOutcome::Hit {
                critical,
                blocked,
                damage,
                ..
            } => (damage, critical, blocked),
        };

        let new_health = previous_health.saturating_sub(damage);
        let combatants = &self.combatants;
        self.retry
            .run("update_combatant_health", || {
                combatants.update_combatant_health(target_id, new_health)
            })
            .await?;

        let now = self.clock.now();
        if let Some(absorbed) = blocked {
            session.append_log(
                CombatLogEntry::new(
                    now,
                    LogEntryKind::Block,
                    format!("{} blocks {} damage", target.name(), absorbed),
                )
                .with_actor(attacker_id)
                .with_target(target_id)
                .with_amount(absorbed),
            );
        }

        let mut message = format!(
            "{} hits {} for {} damage",
            attacker.name(),
            target.name(),
            damage
        );
        if critical {
            message.push_str(" (critical)");
        }
        session.append_log(
            CombatLogEntry::new(now, LogEntryKind::Attack, message)
                .with_actor(attacker_id)
                .with_target(target_id)
                .with_amount(damage),
        );

        if new_health == 0 {
            session.append_log(
                CombatLogEntry::new(
                    now,
                    LogEntryKind::Damage,
                    format!("{} has been defeated", target.name()),
                )
                .with_actor(attacker_id)
                .with_target(target_id),
            );
            tracing::info!(
                session_id = %session.id(),
                attacker = %attacker_id,
                target = %target_id,
                "Combatant defeated"
            );
        }

        tracing::debug!(
            session_id = %session.id(),
            attacker = %attacker_id,
            target = %target_id,
            damage = damage,
            critical = critical,
            blocked = ?blocked,
            remaining = new_health,
            "Attack resolved"
        );

        Ok(AttackReport {
            attacker: attacker_id,
            target: target_id,
            outcome,
            previous_health,
            new_health,
            experience_reward,
        })
    }

    /// Undo the health write of a resolution whose session write failed.
    pub async fn rollback(&self, report: &AttackReport) -> Result<(), RepoError> {
        if !report.wrote_health() {
            return Ok(());
        }
        self.restore_health(report.target, report.previous_health)
            .await
    }

    /// Put a combatant's health back to a known value.
    pub async fn restore_health(&self, target: CombatantId, value: u32) -> Result<(), RepoError> {
        let combatants = &self.combatants;
        let result = self
            .retry
            .run("restore_combatant_health", || {
                combatants.update_combatant_health(target, value)
            })
            .await;
        if let Err(e) = &result {
            tracing::error!(
                target = %target,
                health = value,
                error = %e,
                "Failed to restore health after abandoned tick"
            );
        }
        result
    }

    /// Apply the effects of a committed resolution.
    ///
    /// A defeated NPC is handed to the respawn scheduler and its reward is
    /// shared with every living character of the session. A hand-off that
    /// fails keeps being retried in the background, so the NPC is never left
    /// dead without a timer.
    pub async fn settle(
        &self,
        report: &AttackReport,
        session: &mut CombatSession,
    ) -> Result<Vec<ExperienceAward>, RepoError> {
        if !report.defeated() {
            return Ok(Vec::new());
        }

        match report.target {
            CombatantId::Npc(npc_id) => {
                if let Err(e) = self.respawn.handle_death(npc_id).await {
                    tracing::warn!(
                        npc_id = %npc_id,
                        error = %e,
                        "Failed to schedule NPC respawn, retrying in the background"
                    );
                    self.respawn.retry_death(npc_id);
                }
                let reward = report.experience_reward.unwrap_or(0);
                self.experience.award(session, npc_id, reward).await
            }
            CombatantId::Character(character_id) => {
                tracing::info!(
                    session_id = %session.id(),
                    character_id = %character_id,
                    "Character knocked out"
                );
                Ok(Vec::new())
            }
        }
    }
}
