//! Experience awards for defeated NPCs.

use std::sync::Arc;

use warbanner_domain::{
    CharacterId, CombatLogEntry, CombatSession, CombatantId, ExperienceGain, LogEntryKind, NpcId,
};

use crate::infrastructure::ports::{ClockPort, CombatSessionRepo, CombatantRepo, RepoError};

/// One character's share of an award.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExperienceAward {
    pub character_id: CharacterId,
    pub gain: ExperienceGain,
}

/// Grants an NPC's experience reward to every living character of a session.
///
/// Each award is added to the stored character's experience without
/// rewriting the rest of it, and recorded as an `experience` log entry both
/// in the caller's copy of the session and in storage.
pub struct ExperienceAwarder {
    combatants: Arc<dyn CombatantRepo>,
    sessions: Arc<dyn CombatSessionRepo>,
    clock: Arc<dyn ClockPort>,
}

impl ExperienceAwarder {
    pub fn new(
        combatants: Arc<dyn CombatantRepo>,
        sessions: Arc<dyn CombatSessionRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            combatants,
            sessions,
            clock,
        }
    }

    pub async fn award(
        &self,
        session: &mut CombatSession,
        npc_id: NpcId,
        reward: u64,
    ) -> Result<Vec<ExperienceAward>, RepoError> {
        if reward == 0 {
            return Ok(Vec::new());
        }

        let mut awards = Vec::new();
        for character_id in session.characters().to_vec() {
            let Some(character) = self.combatants.get_character(character_id).await? else {
                tracing::warn!(
                    session_id = %session.id(),
                    character_id = %character_id,
                    "Participant missing while awarding experience"
                );
                continue;
            };
            if !character.is_alive() {
                continue;
            }

            let gain = self.combatants.add_experience(character_id, reward).await?;

            let mut message = format!("{} gains {} experience", character.name(), reward);
            if gain.leveled_up() {
                message.push_str(&format!(" and reaches level {}", gain.level_after));
            }
            let entry = CombatLogEntry::new(self.clock.now(), LogEntryKind::Experience, message)
                .with_actor(CombatantId::Character(character_id))
                .with_target(CombatantId::Npc(npc_id))
                .with_amount(u32::try_from(reward).unwrap_or(u32::MAX));
            self.sessions.append_log_entry(session.id(), &entry).await?;
            session.append_log(entry);

            if gain.leveled_up() {
                tracing::info!(
                    character_id = %character_id,
                    level = gain.level_after,
                    "Character leveled up"
                );
            }
            awards.push(ExperienceAward { character_id, gain });
        }
        Ok(awards)
    }
}
