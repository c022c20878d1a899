use async_trait::async_trait;
use dashmap::DashMap;
use warbanner_domain::{CombatLogEntry, CombatSession, CombatSessionId, CombatantId};

use crate::infrastructure::ports::{CombatSessionRepo, RepoError};

/// Sessions plus the combatant -> active session index.
#[derive(Default)]
pub struct InMemorySessions {
    sessions: DashMap<CombatSessionId, CombatSession>,
    active_by_combatant: DashMap<CombatantId, CombatSessionId>,
}

impl InMemorySessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a session entirely, as an expiring persistence layer would.
    pub fn remove(&self, id: CombatSessionId) {
        self.sessions.remove(&id);
        self.active_by_combatant.retain(|_, session_id| *session_id != id);
    }

    fn sync_bindings(&self, session: &CombatSession) {
        let id = session.id();
        if session.is_active() {
            for combatant_id in session.participants() {
                self.active_by_combatant.insert(combatant_id, id);
            }
        } else {
            for combatant_id in session.participants() {
                self.active_by_combatant
                    .remove_if(&combatant_id, |_, bound| *bound == id);
            }
        }
    }
}

#[async_trait]
impl CombatSessionRepo for InMemorySessions {
    async fn get(&self, id: CombatSessionId) -> Result<Option<CombatSession>, RepoError> {
        Ok(self.sessions.get(&id).map(|s| s.clone()))
    }

    async fn insert(&self, session: &CombatSession) -> Result<(), RepoError> {
        if self.sessions.contains_key(&session.id()) {
            return Err(RepoError::constraint(format!(
                "combat session {} already exists",
                session.id()
            )));
        }
        self.sessions.insert(session.id(), session.clone());
        self.sync_bindings(session);
        Ok(())
    }

    async fn save(&self, session: &CombatSession) -> Result<(), RepoError> {
        if !self.sessions.contains_key(&session.id()) {
            return Err(RepoError::not_found("CombatSession", session.id()));
        }
        self.sessions.insert(session.id(), session.clone());
        self.sync_bindings(session);
        Ok(())
    }

    async fn append_log_entry(
        &self,
        id: CombatSessionId,
        entry: &CombatLogEntry,
    ) -> Result<(), RepoError> {
        let mut session = self
            .sessions
            .get_mut(&id)
            .ok_or_else(|| RepoError::not_found("CombatSession", id))?;
        session.append_log(entry.clone());
        Ok(())
    }

    async fn get_active_session(
        &self,
        combatant_id: CombatantId,
    ) -> Result<Option<CombatSessionId>, RepoError> {
        Ok(self.active_by_combatant.get(&combatant_id).map(|id| *id))
    }

    async fn list_active(&self) -> Result<Vec<CombatSessionId>, RepoError> {
        let mut ids: Vec<CombatSessionId> = self
            .sessions
            .iter()
            .filter(|s| s.is_active())
            .map(|s| s.id())
            .collect();
        ids.sort();
        Ok(ids)
    }
}
