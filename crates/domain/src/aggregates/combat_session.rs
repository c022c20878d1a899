//! CombatSession aggregate - one running fight with its own turn counter and log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{CombatLog, CombatLogEntry, LogEntryKind};
use crate::error::DomainError;
use crate::ids::{CharacterId, CombatSessionId, CombatantId, LocationId, NpcId};

/// Which combatants may target each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatKind {
    /// Characters fight NPCs, never each other
    Pve,
    /// Characters fight each other
    Pvp,
    /// Anyone may target anyone
    Mixed,
}

impl CombatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pve => "pve",
            Self::Pvp => "pvp",
            Self::Mixed => "mixed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatStatus {
    Active,
    Finished,
}

/// A combat session.
///
/// # Invariants
///
/// - `turn_counter` only ever increases, by exactly one per `advance_turn`
/// - participant lists contain no duplicates and keep insertion order
/// - once `Finished`, the session accepts no further turns or participants
/// - the log is append-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatSession {
    id: CombatSessionId,
    location_id: LocationId,
    kind: CombatKind,
    status: CombatStatus,
    characters: Vec<CharacterId>,
    npcs: Vec<NpcId>,
    turn_counter: u64,
    log: CombatLog,
    created_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl CombatSession {
    pub fn new(location_id: LocationId, kind: CombatKind, now: DateTime<Utc>) -> Self {
        Self {
            id: CombatSessionId::new(),
            location_id,
            kind,
            status: CombatStatus::Active,
            characters: Vec::new(),
            npcs: Vec::new(),
            turn_counter: 0,
            log: CombatLog::new(),
            created_at: now,
            finished_at: None,
        }
    }

    pub fn with_id(mut self, id: CombatSessionId) -> Self {
        self.id = id;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> CombatSessionId {
        self.id
    }

    #[inline]
    pub fn location_id(&self) -> LocationId {
        self.location_id
    }

    #[inline]
    pub fn kind(&self) -> CombatKind {
        self.kind
    }

    #[inline]
    pub fn status(&self) -> CombatStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == CombatStatus::Active
    }

    pub fn characters(&self) -> &[CharacterId] {
        &self.characters
    }

    pub fn npcs(&self) -> &[NpcId] {
        &self.npcs
    }

    /// All participants, characters first, each in join order.
    pub fn participants(&self) -> Vec<CombatantId> {
        self.characters
            .iter()
            .map(|id| CombatantId::Character(*id))
            .chain(self.npcs.iter().map(|id| CombatantId::Npc(*id)))
            .collect()
    }

    pub fn has_participant(&self, id: CombatantId) -> bool {
        match id {
            CombatantId::Character(c) => self.characters.contains(&c),
            CombatantId::Npc(n) => self.npcs.contains(&n),
        }
    }

    #[inline]
    pub fn turn_counter(&self) -> u64 {
        self.turn_counter
    }

    pub fn log(&self) -> &CombatLog {
        &self.log
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a participant. Returns `false` when already present.
    pub fn add_participant(&mut self, id: CombatantId) -> Result<bool, DomainError> {
        self.ensure_active("add participant")?;
        if self.has_participant(id) {
            return Ok(false);
        }
        match id {
            CombatantId::Character(c) => self.characters.push(c),
            CombatantId::Npc(n) => self.npcs.push(n),
        }
        Ok(true)
    }

    pub fn append_log(&mut self, entry: CombatLogEntry) {
        self.log.push(entry);
    }

    /// Discard log entries past `len`; used when a tick's writes are rolled back.
    pub fn rewind_log(&mut self, len: usize) {
        self.log.truncate(len);
    }

    pub fn advance_turn(&mut self) -> Result<u64, DomainError> {
        self.ensure_active("advance turn")?;
        self.turn_counter = self.turn_counter.checked_add(1).ok_or_else(|| {
            DomainError::constraint(format!("turn counter of session {} is exhausted", self.id))
        })?;
        Ok(self.turn_counter)
    }

    /// Finish the session and append the closing entry.
    ///
    /// Finishing an already finished session is a no-op.
    pub fn finish(&mut self, now: DateTime<Utc>, reason: impl Into<String>) -> bool {
        if !self.is_active() {
            return false;
        }
        self.status = CombatStatus::Finished;
        self.finished_at = Some(now);
        self.log
            .push(CombatLogEntry::new(now, LogEntryKind::End, reason));
        true
    }

    fn ensure_active(&self, operation: &str) -> Result<(), DomainError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(DomainError::invalid_state_transition(format!(
                "cannot {} on finished session {}",
                operation, self.id
            )))
        }
    }
}
