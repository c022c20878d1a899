//! Territory battle errors.

use warbanner_domain::{CharacterId, ClanId, DomainError, LocationId, TerritoryBattleId};

use crate::infrastructure::ports::RepoError;

#[derive(Debug, thiserror::Error)]
pub enum TerritoryError {
    #[error("Clan {0} has no influence points left")]
    InsufficientInfluence(ClanId),
    #[error("A battle for location {0} is already in progress")]
    BattleAlreadyInProgress(LocationId),
    #[error("Character {0} is not in a clan")]
    NotInClan(CharacterId),
    #[error("Location {location_id} already belongs to clan {clan_id}")]
    AlreadyOwned {
        location_id: LocationId,
        clan_id: ClanId,
    },
    #[error("Territory battle {0} not found")]
    BattleNotFound(TerritoryBattleId),
    #[error("Territory battle {0} is already completed")]
    BattleClosed(TerritoryBattleId),
    #[error("Clan {0} is not part of this battle")]
    ClanNotInvolved(ClanId),
    #[error("Character {0} not found")]
    CharacterNotFound(CharacterId),
    #[error("Clan {0} not found")]
    ClanNotFound(ClanId),
    #[error("Validation error: {0}")]
    Validation(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl TerritoryError {
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Repo(_))
    }
}
