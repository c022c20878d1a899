//! TerritoryBattle aggregate - a timed clan conflict over one location
//!
//! State machine: `Preparing -> Active -> Completed`. Neutral locations never
//! create a battle; they are captured directly by the coordinator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::events::BattleResolution;
use crate::ids::{CharacterId, ClanId, LocationId, TerritoryBattleId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleStatus {
    Preparing,
    Active,
    Completed,
}

impl BattleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preparing => "preparing",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

/// Which side of a battle a clan fights on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BattleSide {
    Attacker,
    Defender,
}

/// # Invariants
///
/// - `winner.is_some()` iff `status == Completed`
/// - `participants` has no duplicates
/// - `defending_clan != Some(attacking_clan)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryBattle {
    id: TerritoryBattleId,
    location_id: LocationId,
    attacking_clan: ClanId,
    defending_clan: Option<ClanId>,
    declared_by: CharacterId,
    battle_start_time: DateTime<Utc>,
    status: BattleStatus,
    winner: Option<ClanId>,
    participants: Vec<CharacterId>,
    completed_at: Option<DateTime<Utc>>,
}

impl TerritoryBattle {
    /// Declare a battle in the `Preparing` state.
    ///
    /// The declarer is enrolled as the first participant.
    pub fn declare(
        location_id: LocationId,
        attacking_clan: ClanId,
        defending_clan: Option<ClanId>,
        declared_by: CharacterId,
        battle_start_time: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if defending_clan == Some(attacking_clan) {
            return Err(DomainError::validation(
                "a clan cannot declare battle on its own territory",
            ));
        }
        Ok(Self {
            id: TerritoryBattleId::new(),
            location_id,
            attacking_clan,
            defending_clan,
            declared_by,
            battle_start_time,
            status: BattleStatus::Preparing,
            winner: None,
            participants: vec![declared_by],
            completed_at: None,
        })
    }

    pub fn with_id(mut self, id: TerritoryBattleId) -> Self {
        self.id = id;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> TerritoryBattleId {
        self.id
    }

    #[inline]
    pub fn location_id(&self) -> LocationId {
        self.location_id
    }

    #[inline]
    pub fn attacking_clan(&self) -> ClanId {
        self.attacking_clan
    }

    #[inline]
    pub fn defending_clan(&self) -> Option<ClanId> {
        self.defending_clan
    }

    #[inline]
    pub fn declared_by(&self) -> CharacterId {
        self.declared_by
    }

    #[inline]
    pub fn battle_start_time(&self) -> DateTime<Utc> {
        self.battle_start_time
    }

    #[inline]
    pub fn status(&self) -> BattleStatus {
        self.status
    }

    #[inline]
    pub fn winner(&self) -> Option<ClanId> {
        self.winner
    }

    pub fn participants(&self) -> &[CharacterId] {
        &self.participants
    }

    #[inline]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn is_open(&self) -> bool {
        self.status != BattleStatus::Completed
    }

    pub fn side_of(&self, clan_id: ClanId) -> Option<BattleSide> {
        if clan_id == self.attacking_clan {
            Some(BattleSide::Attacker)
        } else if Some(clan_id) == self.defending_clan {
            Some(BattleSide::Defender)
        } else {
            None
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Enroll a character. Returns `false` if already enrolled.
    pub fn enlist(&mut self, character_id: CharacterId) -> Result<bool, DomainError> {
        if !self.is_open() {
            return Err(DomainError::invalid_state_transition(format!(
                "battle {} is already completed",
                self.id
            )));
        }
        if self.participants.contains(&character_id) {
            return Ok(false);
        }
        self.participants.push(character_id);
        Ok(true)
    }

    /// `Preparing -> Active` once the start time has passed.
    ///
    /// Returns `false` when it is not yet time or the battle is not preparing.
    pub fn activate_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != BattleStatus::Preparing || now < self.battle_start_time {
            return false;
        }
        self.status = BattleStatus::Active;
        true
    }

    /// Decide the winner by comparing summed power. Ties keep the defender.
    pub fn resolve_by_power(&self, attacker_power: u64, defender_power: u64) -> BattleResolution {
        let winner = match self.defending_clan {
            Some(defender) if defender_power >= attacker_power => defender,
            _ => self.attacking_clan,
        };
        BattleResolution {
            winner,
            attacker_power,
            defender_power,
        }
    }

    /// `Active -> Completed` with the given winner.
    pub fn complete(&mut self, winner: ClanId, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status != BattleStatus::Active {
            return Err(DomainError::invalid_state_transition(format!(
                "battle {} cannot complete from {}",
                self.id,
                self.status.as_str()
            )));
        }
        if self.side_of(winner).is_none() {
            return Err(DomainError::validation(format!(
                "clan {} is not part of battle {}",
                winner, self.id
            )));
        }
        self.status = BattleStatus::Completed;
        self.winner = Some(winner);
        self.completed_at = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn battle(now: DateTime<Utc>) -> TerritoryBattle {
        TerritoryBattle::declare(
            LocationId::new(),
            ClanId::new(),
            Some(ClanId::new()),
            CharacterId::new(),
            now + Duration::minutes(5),
        )
        .unwrap()
    }

    #[test]
    fn declaring_against_own_clan_rejected() {
        let clan = ClanId::new();
        let result = TerritoryBattle::declare(
            LocationId::new(),
            clan,
            Some(clan),
            CharacterId::new(),
            Utc::now(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn activation_waits_for_start_time() {
        let now = Utc::now();
        let mut b = battle(now);
        assert!(!b.activate_if_due(now + Duration::minutes(4)));
        assert_eq!(b.status(), BattleStatus::Preparing);
        assert!(b.activate_if_due(now + Duration::minutes(5)));
        assert_eq!(b.status(), BattleStatus::Active);
        assert!(!b.activate_if_due(now + Duration::minutes(6)));
    }

    #[test]
    fn tie_goes_to_defender() {
        let b = battle(Utc::now());
        let resolution = b.resolve_by_power(100, 100);
        assert_eq!(Some(resolution.winner), b.defending_clan());
        let resolution = b.resolve_by_power(101, 100);
        assert_eq!(resolution.winner, b.attacking_clan());
    }

    #[test]
    fn complete_requires_active() {
        let now = Utc::now();
        let mut b = battle(now);
        let attacker = b.attacking_clan();
        assert!(b.complete(attacker, now).is_err());
        b.activate_if_due(now + Duration::minutes(5));
        b.complete(attacker, now).unwrap();
        assert_eq!(b.winner(), Some(attacker));
        assert!(!b.is_open());
        assert!(b.enlist(CharacterId::new()).is_err());
    }

    #[test]
    fn enlist_is_idempotent() {
        let mut b = battle(Utc::now());
        let id = CharacterId::new();
        assert!(b.enlist(id).unwrap());
        assert!(!b.enlist(id).unwrap());
        assert_eq!(b.participants().len(), 2);
    }
}
