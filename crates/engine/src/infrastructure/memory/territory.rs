use async_trait::async_trait;
use dashmap::DashMap;
use warbanner_domain::{
    Clan, ClanId, LocationId, TerritoryBattle, TerritoryBattleId, TerritoryOwnership,
};

use crate::infrastructure::ports::{ClanRepo, RepoError, TerritoryRepo};

#[derive(Default)]
pub struct InMemoryTerritory {
    battles: DashMap<TerritoryBattleId, TerritoryBattle>,
    ownership: DashMap<LocationId, TerritoryOwnership>,
}

impl InMemoryTerritory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_ownership(&self, ownership: TerritoryOwnership) {
        self.ownership.insert(ownership.location_id, ownership);
    }
}

#[async_trait]
impl TerritoryRepo for InMemoryTerritory {
    async fn get_battle(
        &self,
        id: TerritoryBattleId,
    ) -> Result<Option<TerritoryBattle>, RepoError> {
        Ok(self.battles.get(&id).map(|b| b.clone()))
    }

    async fn save_battle(&self, battle: &TerritoryBattle) -> Result<(), RepoError> {
        self.battles.insert(battle.id(), battle.clone());
        Ok(())
    }

    async fn find_open_battle(
        &self,
        location_id: LocationId,
    ) -> Result<Option<TerritoryBattle>, RepoError> {
        Ok(self
            .battles
            .iter()
            .find(|b| b.location_id() == location_id && b.is_open())
            .map(|b| b.clone()))
    }

    async fn list_open_battles(&self) -> Result<Vec<TerritoryBattle>, RepoError> {
        let mut open: Vec<TerritoryBattle> = self
            .battles
            .iter()
            .filter(|b| b.is_open())
            .map(|b| b.clone())
            .collect();
        open.sort_by_key(|b| (b.battle_start_time(), b.id()));
        Ok(open)
    }

    async fn get_ownership(
        &self,
        location_id: LocationId,
    ) -> Result<Option<TerritoryOwnership>, RepoError> {
        Ok(self.ownership.get(&location_id).map(|o| *o))
    }

    async fn update_ownership(&self, ownership: &TerritoryOwnership) -> Result<(), RepoError> {
        self.ownership.insert(ownership.location_id, *ownership);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryClans {
    clans: DashMap<ClanId, Clan>,
}

impl InMemoryClans {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, clan: Clan) {
        self.clans.insert(clan.id(), clan);
    }
}

#[async_trait]
impl ClanRepo for InMemoryClans {
    async fn get(&self, id: ClanId) -> Result<Option<Clan>, RepoError> {
        Ok(self.clans.get(&id).map(|c| c.clone()))
    }

    async fn save(&self, clan: &Clan) -> Result<(), RepoError> {
        self.clans.insert(clan.id(), clan.clone());
        Ok(())
    }
}
