//! Combat log - the append-only audit trail of a session.
//!
//! The log is the ground truth for everything shown to players after the
//! fact: replaying it reproduces final health, and per-combatant statistics
//! are derived from it rather than tracked separately.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::CombatantId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEntryKind {
    Attack,
    Dodge,
    Block,
    Damage,
    Join,
    Leave,
    Experience,
    End,
}

impl LogEntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Dodge => "dodge",
            Self::Block => "block",
            Self::Damage => "damage",
            Self::Join => "join",
            Self::Leave => "leave",
            Self::Experience => "experience",
            Self::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatLogEntry {
    pub timestamp: DateTime<Utc>,
    pub kind: LogEntryKind,
    pub actor: Option<CombatantId>,
    pub target: Option<CombatantId>,
    pub amount: Option<u32>,
    pub message: String,
}

impl CombatLogEntry {
    pub fn new(timestamp: DateTime<Utc>, kind: LogEntryKind, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            kind,
            actor: None,
            target: None,
            amount: None,
            message: message.into(),
        }
    }

    pub fn with_actor(mut self, actor: CombatantId) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn with_target(mut self, target: CombatantId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_amount(mut self, amount: u32) -> Self {
        self.amount = Some(amount);
        self
    }
}

/// Per-combatant figures derived from the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombatantStatistics {
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub turns_acted: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombatLog {
    entries: Vec<CombatLogEntry>,
}

impl CombatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: CombatLogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[CombatLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries appended after the first `count`.
    pub fn entries_since(&self, count: usize) -> &[CombatLogEntry] {
        self.entries.get(count..).unwrap_or(&[])
    }

    /// Drop everything after the first `len` entries.
    ///
    /// Only used to discard entries of a tick whose writes were rolled back.
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// Fold every `Attack` entry over `initial` health values.
    ///
    /// Rolls are not regenerated; the recorded damage is authoritative.
    pub fn replay_health(
        &self,
        initial: &HashMap<CombatantId, u32>,
    ) -> HashMap<CombatantId, u32> {
        let mut health = initial.clone();
        for entry in &self.entries {
            if entry.kind != LogEntryKind::Attack {
                continue;
            }
            if let (Some(target), Some(amount)) = (entry.target, entry.amount) {
                if let Some(current) = health.get_mut(&target) {
                    *current = current.saturating_sub(amount);
                }
            }
        }
        health
    }

    pub fn statistics(&self) -> HashMap<CombatantId, CombatantStatistics> {
        let mut stats: HashMap<CombatantId, CombatantStatistics> = HashMap::new();
        for entry in &self.entries {
            match entry.kind {
                LogEntryKind::Attack => {
                    let amount = u64::from(entry.amount.unwrap_or(0));
                    if let Some(actor) = entry.actor {
                        let s = stats.entry(actor).or_default();
                        s.damage_dealt += amount;
                        s.turns_acted += 1;
                    }
                    if let Some(target) = entry.target {
                        stats.entry(target).or_default().damage_taken += amount;
                    }
                }
                LogEntryKind::Dodge => {
                    if let Some(actor) = entry.actor {
                        stats.entry(actor).or_default().turns_acted += 1;
                    }
                }
                _ => {}
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{CharacterId, NpcId};

    fn attack(actor: CombatantId, target: CombatantId, amount: u32) -> CombatLogEntry {
        CombatLogEntry::new(Utc::now(), LogEntryKind::Attack, "hit")
            .with_actor(actor)
            .with_target(target)
            .with_amount(amount)
    }

    #[test]
    fn replay_saturates_at_zero() {
        let hero = CombatantId::Character(CharacterId::new());
        let wolf = CombatantId::Npc(NpcId::new());
        let mut log = CombatLog::new();
        log.push(attack(hero, wolf, 12));
        log.push(CombatLogEntry::new(Utc::now(), LogEntryKind::Dodge, "miss").with_actor(wolf));
        log.push(attack(hero, wolf, 40));

        let initial = HashMap::from([(hero, 20), (wolf, 30)]);
        let replayed = log.replay_health(&initial);
        assert_eq!(replayed[&wolf], 0);
        assert_eq!(replayed[&hero], 20);
    }

    #[test]
    fn statistics_count_dodged_turns() {
        let hero = CombatantId::Character(CharacterId::new());
        let wolf = CombatantId::Npc(NpcId::new());
        let mut log = CombatLog::new();
        log.push(attack(hero, wolf, 7));
        log.push(
            CombatLogEntry::new(Utc::now(), LogEntryKind::Dodge, "miss")
                .with_actor(wolf)
                .with_target(hero),
        );

        let stats = log.statistics();
        assert_eq!(stats[&hero].damage_dealt, 7);
        assert_eq!(stats[&hero].turns_acted, 1);
        assert_eq!(stats[&wolf].damage_taken, 7);
        assert_eq!(stats[&wolf].turns_acted, 1);
    }

    #[test]
    fn entries_since_out_of_range_is_empty() {
        let log = CombatLog::new();
        assert!(log.entries_since(3).is_empty());
    }
}
