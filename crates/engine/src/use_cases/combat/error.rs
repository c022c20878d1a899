//! Combat lifecycle and scheduler errors.

use warbanner_domain::{CharacterId, CombatSessionId, CombatantId, DomainError, LocationId};

use crate::infrastructure::ports::RepoError;

/// Errors returned by lifecycle operations.
///
/// Everything except `Repo` is a validation failure: it is returned to the
/// caller as-is and never retried.
#[derive(Debug, thiserror::Error)]
pub enum CombatError {
    #[error("Combatant {combatant_id} is already in combat session {session_id}")]
    AlreadyInCombat {
        combatant_id: CombatantId,
        session_id: CombatSessionId,
    },
    #[error("Character {character_id} is already fighting in session {session_id}")]
    AlreadyElsewhere {
        character_id: CharacterId,
        session_id: CombatSessionId,
    },
    #[error("Combatant {combatant_id} is not at location {location_id}")]
    LocationMismatch {
        combatant_id: CombatantId,
        location_id: LocationId,
    },
    #[error("Combat session {0} is not active")]
    CombatNotActive(CombatSessionId),
    #[error("Combat session {0} not found")]
    SessionNotFound(CombatSessionId),
    #[error("Combatant {0} not found")]
    CombatantNotFound(CombatantId),
    #[error("Combatant {0} is defeated")]
    CombatantDefeated(CombatantId),
    #[error("A combat needs at least two participants, got {0}")]
    NotEnoughParticipants(usize),
    #[error("Invalid participants: {0}")]
    InvalidComposition(String),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl CombatError {
    /// Bad input from the caller, as opposed to a storage failure.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Repo(_))
    }
}

impl From<DomainError> for CombatError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidStateTransition(msg)
            | DomainError::Validation(msg)
            | DomainError::Constraint(msg) => Self::InvalidComposition(msg),
        }
    }
}

/// Why a tick was abandoned.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// Storage failed; nothing was committed and the tick is retried next cycle.
    #[error("Transient storage failure: {0}")]
    Transient(#[from] RepoError),
    #[error("Tick exceeded its time budget")]
    TimedOut,
    /// The session cannot continue; it is force-finished.
    #[error("Invariant violated: {0}")]
    Invariant(String),
}
