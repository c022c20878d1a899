//! Combat lifecycle - starting and joining sessions.
//!
//! Admission is serialized by one async mutex: the "one active session per
//! combatant" check and the write that binds the participants happen without
//! another start or join interleaving. NPCs are bound like characters, so no
//! combatant's health has two sessions writing it.

use std::sync::Arc;

use tokio::sync::Mutex;
use warbanner_domain::{
    CharacterId, CombatKind, CombatLogEntry, CombatSession, CombatSessionId, Combatant,
    CombatantId, LocationId, LogEntryKind, NpcId,
};

use super::error::CombatError;
use super::experience::{ExperienceAward, ExperienceAwarder};
use super::scheduler::TurnScheduler;
use crate::infrastructure::ports::{ClockPort, CombatSessionRepo, CombatantRepo};

pub struct CombatLifecycle {
    sessions: Arc<dyn CombatSessionRepo>,
    combatants: Arc<dyn CombatantRepo>,
    scheduler: Arc<TurnScheduler>,
    experience: Arc<ExperienceAwarder>,
    clock: Arc<dyn ClockPort>,
    admission: Mutex<()>,
}

impl CombatLifecycle {
    pub fn new(
        sessions: Arc<dyn CombatSessionRepo>,
        combatants: Arc<dyn CombatantRepo>,
        scheduler: Arc<TurnScheduler>,
        experience: Arc<ExperienceAwarder>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            sessions,
            combatants,
            scheduler,
            experience,
            clock,
            admission: Mutex::new(()),
        }
    }

    /// Start a session, inferring its kind: `pve` when any NPC takes part,
    /// `pvp` otherwise.
    pub async fn start(
        &self,
        location_id: LocationId,
        participants: &[CombatantId],
    ) -> Result<CombatSession, CombatError> {
        let kind = if participants.iter().any(CombatantId::is_npc) {
            CombatKind::Pve
        } else {
            CombatKind::Pvp
        };
        self.start_with_kind(location_id, participants, kind).await
    }

    /// Start a session of an explicit kind.
    ///
    /// # Errors
    ///
    /// - `NotEnoughParticipants` - fewer than two distinct participants
    /// - `InvalidComposition` - `pve` without both sides, or NPCs in `pvp`
    /// - `CombatantNotFound` / `CombatantDefeated` - unknown or dead participant
    /// - `LocationMismatch` - a participant is not at `location_id`
    /// - `AlreadyInCombat` - a participant is bound to another active session
    pub async fn start_with_kind(
        &self,
        location_id: LocationId,
        participants: &[CombatantId],
        kind: CombatKind,
    ) -> Result<CombatSession, CombatError> {
        let mut distinct: Vec<CombatantId> = Vec::with_capacity(participants.len());
        for id in participants {
            if !distinct.contains(id) {
                distinct.push(*id);
            }
        }
        validate_composition(kind, &distinct)?;

        let _admission = self.admission.lock().await;

        let mut ready = Vec::with_capacity(distinct.len());
        for id in &distinct {
            let combatant = self.load_ready(*id, location_id).await?;
            if let Some(session_id) = self.sessions.get_active_session(*id).await? {
                return Err(CombatError::AlreadyInCombat {
                    combatant_id: *id,
                    session_id,
                });
            }
            ready.push(combatant);
        }

        let now = self.clock.now();
        let mut session = CombatSession::new(location_id, kind, now);
        for combatant in &ready {
            session.add_participant(combatant.id())?;
            session.append_log(
                CombatLogEntry::new(
                    now,
                    LogEntryKind::Join,
                    format!("{} enters the fight", combatant.name()),
                )
                .with_actor(combatant.id()),
            );
        }
        self.sessions.insert(&session).await?;
        self.scheduler.register(session.id());

        tracing::info!(
            session_id = %session.id(),
            location_id = %location_id,
            kind = kind.as_str(),
            participants = distinct.len(),
            "Combat session started"
        );
        Ok(session)
    }

    /// Add a character to an active session. Joining twice is a no-op.
    pub async fn join(
        &self,
        session_id: CombatSessionId,
        character_id: CharacterId,
    ) -> Result<CombatSession, CombatError> {
        let _admission = self.admission.lock().await;
        // Keep ticks out while the participant list changes.
        let _gate = self.scheduler.exclusive(session_id).await;

        let mut session = self
            .sessions
            .get(session_id)
            .await?
            .ok_or(CombatError::SessionNotFound(session_id))?;
        if !session.is_active() {
            return Err(CombatError::CombatNotActive(session_id));
        }

        let combatant_id = CombatantId::Character(character_id);
        if session.has_participant(combatant_id) {
            return Ok(session);
        }

        let character = self
            .load_ready(combatant_id, session.location_id())
            .await?;
        if let Some(bound) = self.sessions.get_active_session(combatant_id).await? {
            if bound != session_id {
                return Err(CombatError::AlreadyElsewhere {
                    character_id,
                    session_id: bound,
                });
            }
        }

        session.add_participant(combatant_id)?;
        session.append_log(
            CombatLogEntry::new(
                self.clock.now(),
                LogEntryKind::Join,
                format!("{} joins the fight", character.name()),
            )
            .with_actor(combatant_id),
        );
        self.sessions.save(&session).await?;
        self.scheduler.register(session_id);

        tracing::info!(
            session_id = %session_id,
            character_id = %character_id,
            "Character joined combat"
        );
        Ok(session)
    }

    /// Share a defeated NPC's reward among the session's living characters.
    pub async fn award_experience(
        &self,
        session_id: CombatSessionId,
        npc_id: NpcId,
    ) -> Result<Vec<ExperienceAward>, CombatError> {
        let _gate = self.scheduler.exclusive(session_id).await;

        let mut session = self
            .sessions
            .get(session_id)
            .await?
            .ok_or(CombatError::SessionNotFound(session_id))?;
        let npc = self
            .combatants
            .get_npc(npc_id)
            .await?
            .ok_or(CombatError::CombatantNotFound(CombatantId::Npc(npc_id)))?;

        Ok(self
            .experience
            .award(&mut session, npc_id, npc.experience_reward())
            .await?)
    }

    pub async fn get_session(
        &self,
        session_id: CombatSessionId,
    ) -> Result<CombatSession, CombatError> {
        self.sessions
            .get(session_id)
            .await?
            .ok_or(CombatError::SessionNotFound(session_id))
    }

    /// Load a combatant and check it can fight at `location_id`.
    async fn load_ready(
        &self,
        id: CombatantId,
        location_id: LocationId,
    ) -> Result<Combatant, CombatError> {
        let combatant = self
            .combatants
            .get_combatant(id)
            .await?
            .ok_or(CombatError::CombatantNotFound(id))?;
        if !combatant.is_alive() {
            return Err(CombatError::CombatantDefeated(id));
        }
        if !combatant.is_at(location_id) {
            return Err(CombatError::LocationMismatch {
                combatant_id: id,
                location_id,
            });
        }
        Ok(combatant)
    }
}

fn validate_composition(kind: CombatKind, participants: &[CombatantId]) -> Result<(), CombatError> {
    if participants.len() < 2 {
        return Err(CombatError::NotEnoughParticipants(participants.len()));
    }
    let npcs = participants.iter().filter(|id| id.is_npc()).count();
    let characters = participants.len() - npcs;
    match kind {
        CombatKind::Pve if characters == 0 || npcs == 0 => Err(CombatError::InvalidComposition(
            "pve needs at least one character and one NPC".to_string(),
        )),
        CombatKind::Pvp if npcs > 0 => Err(CombatError::InvalidComposition(
            "pvp is between characters only".to_string(),
        )),
        _ => Ok(()),
    }
}
