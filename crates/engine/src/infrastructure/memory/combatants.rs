use async_trait::async_trait;
use dashmap::DashMap;
use warbanner_domain::{
    Character, CharacterId, Combatant, CombatantId, ExperienceGain, Npc, NpcId,
};

use crate::infrastructure::ports::{CombatantRepo, RepoError};

#[derive(Default)]
pub struct InMemoryCombatants {
    characters: DashMap<CharacterId, Character>,
    npcs: DashMap<NpcId, Npc>,
}

impl InMemoryCombatants {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_character(&self, character: Character) {
        self.characters.insert(character.id(), character);
    }

    pub fn insert_npc(&self, npc: Npc) {
        self.npcs.insert(npc.id(), npc);
    }
}

#[async_trait]
impl CombatantRepo for InMemoryCombatants {
    async fn get_combatant(&self, id: CombatantId) -> Result<Option<Combatant>, RepoError> {
        Ok(match id {
            CombatantId::Character(cid) => self
                .characters
                .get(&cid)
                .map(|c| Combatant::Character(c.clone())),
            CombatantId::Npc(nid) => self.npcs.get(&nid).map(|n| Combatant::Npc(n.clone())),
        })
    }

    async fn update_combatant_health(&self, id: CombatantId, value: u32) -> Result<(), RepoError> {
        match id {
            CombatantId::Character(cid) => {
                let mut character = self
                    .characters
                    .get_mut(&cid)
                    .ok_or_else(|| RepoError::not_found("Character", cid))?;
                character.set_current_health(value);
            }
            CombatantId::Npc(nid) => {
                let mut npc = self
                    .npcs
                    .get_mut(&nid)
                    .ok_or_else(|| RepoError::not_found("Npc", nid))?;
                npc.set_current_health(value);
            }
        }
        Ok(())
    }

    async fn get_character(&self, id: CharacterId) -> Result<Option<Character>, RepoError> {
        Ok(self.characters.get(&id).map(|c| c.clone()))
    }

    async fn save_character(&self, character: &Character) -> Result<(), RepoError> {
        self.characters.insert(character.id(), character.clone());
        Ok(())
    }

    async fn add_experience(
        &self,
        id: CharacterId,
        amount: u64,
    ) -> Result<ExperienceGain, RepoError> {
        let mut character = self
            .characters
            .get_mut(&id)
            .ok_or_else(|| RepoError::not_found("Character", id))?;
        Ok(character.gain_experience(amount))
    }

    async fn get_npc(&self, id: NpcId) -> Result<Option<Npc>, RepoError> {
        Ok(self.npcs.get(&id).map(|n| n.clone()))
    }

    async fn save_npc(&self, npc: &Npc) -> Result<(), RepoError> {
        self.npcs.insert(npc.id(), npc.clone());
        Ok(())
    }

    async fn list_dead_npcs(&self) -> Result<Vec<Npc>, RepoError> {
        Ok(self
            .npcs
            .iter()
            .filter(|n| !n.is_alive())
            .map(|n| n.clone())
            .collect())
    }
}
