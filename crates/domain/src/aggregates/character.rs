//! Character aggregate - player-controlled combatant
//!
//! # Rustic DDD Design
//!
//! - **Private fields**: All fields are encapsulated
//! - **Newtypes**: `CombatantName` for validated name, `Health` for the pool
//! - **Valid by construction**: `new()` takes pre-validated types
//! - **Builder pattern**: Fluent API for optional fields
//! - **Events**: mutations return outcome enums instead of booleans

use serde::{Deserialize, Serialize};

use crate::events::{DamageOutcome, ExperienceGain};
use crate::ids::{CharacterId, ClanId, LocationId};
use crate::value_objects::{level_for_experience, Attributes, CombatantName, Health};

/// Rank inside a clan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClanRank {
    Recruit,
    Member,
    Officer,
    Leader,
}

/// Membership of a character in a clan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClanMembership {
    pub clan_id: ClanId,
    pub rank: ClanRank,
}

/// A player character as seen by the combat engine.
///
/// # Invariants
///
/// - `health.current() <= health.max()` (enforced by `Health`)
/// - `is_alive == false` implies `health.current() == 0`
/// - `level >= 1` and never decreases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    id: CharacterId,
    name: CombatantName,
    location_id: LocationId,
    clan: Option<ClanMembership>,
    health: Health,
    attributes: Attributes,
    experience: u64,
    level: u32,
    is_alive: bool,
}

impl Character {
    // =========================================================================
    // Constructor
    // =========================================================================

    /// Create a level 1 character at full health.
    pub fn new(
        name: CombatantName,
        location_id: LocationId,
        attributes: Attributes,
        max_health: u32,
    ) -> Self {
        Self {
            id: CharacterId::new(),
            name,
            location_id,
            clan: None,
            health: Health::full(max_health),
            attributes,
            experience: 0,
            level: 1,
            is_alive: max_health > 0,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    pub fn with_id(mut self, id: CharacterId) -> Self {
        self.id = id;
        self
    }

    pub fn with_clan(mut self, membership: ClanMembership) -> Self {
        self.clan = Some(membership);
        self
    }

    /// Set the health pool (used when loading from storage).
    pub fn with_health(mut self, health: Health) -> Self {
        self.health = health;
        self.is_alive = !health.is_depleted();
        self
    }

    /// Set experience and level (used when loading from storage).
    pub fn with_progress(mut self, experience: u64, level: u32) -> Self {
        self.experience = experience;
        self.level = level.max(1);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> CharacterId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &CombatantName {
        &self.name
    }

    #[inline]
    pub fn location_id(&self) -> LocationId {
        self.location_id
    }

    #[inline]
    pub fn clan(&self) -> Option<ClanMembership> {
        self.clan
    }

    pub fn clan_id(&self) -> Option<ClanId> {
        self.clan.map(|membership| membership.clan_id)
    }

    #[inline]
    pub fn health(&self) -> Health {
        self.health
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    #[inline]
    pub fn experience(&self) -> u64 {
        self.experience
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.is_alive
    }

    // =========================================================================
    // Mutation Methods (return domain events)
    // =========================================================================

    /// Apply damage, saturating at zero health.
    pub fn apply_damage(&mut self, amount: u32) -> DamageOutcome {
        if !self.is_alive {
            return DamageOutcome::AlreadyDead;
        }
        let remaining_hp = self.health.apply_damage(amount);
        if remaining_hp == 0 {
            self.is_alive = false;
            DamageOutcome::Killed {
                damage_dealt: amount,
            }
        } else {
            DamageOutcome::Wounded {
                damage_dealt: amount,
                remaining_hp,
            }
        }
    }

    /// Overwrite current health (storage-level update). Liveness follows health.
    pub fn set_current_health(&mut self, value: u32) {
        self.health.set_current(value);
        self.is_alive = !self.health.is_depleted();
    }

    pub fn move_to(&mut self, location_id: LocationId) {
        self.location_id = location_id;
    }

    /// Add experience and recompute the level. The level never goes down.
    pub fn gain_experience(&mut self, amount: u64) -> ExperienceGain {
        let level_before = self.level;
        self.experience = self.experience.saturating_add(amount);
        self.level = level_for_experience(self.experience, self.level);
        ExperienceGain {
            amount,
            total: self.experience,
            level_before,
            level_after: self.level,
        }
    }

    /// Territory power: `10 * level + sum of attributes`.
    pub fn power(&self) -> u64 {
        10 * u64::from(self.level) + self.attributes.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn character(max_health: u32) -> Character {
        Character::new(
            CombatantName::new("Rurik").unwrap(),
            LocationId::new(),
            Attributes::new(10, 10, 10, 10),
            max_health,
        )
    }

    #[test]
    fn new_character_is_level_one_and_alive() {
        let c = character(50);
        assert_eq!(c.level(), 1);
        assert!(c.is_alive());
        assert_eq!(c.health().current(), 50);
    }

    #[test]
    fn lethal_damage_kills() {
        let mut c = character(1);
        assert_eq!(c.apply_damage(5), DamageOutcome::Killed { damage_dealt: 5 });
        assert!(!c.is_alive());
        assert_eq!(c.health().current(), 0);
        assert_eq!(c.apply_damage(5), DamageOutcome::AlreadyDead);
    }

    #[test]
    fn experience_levels_up() {
        let mut c = character(50);
        let gain = c.gain_experience(150);
        assert!(gain.leveled_up());
        assert_eq!(gain.level_after, 2);
        assert_eq!(c.experience(), 150);
    }

    #[test]
    fn experience_never_lowers_level() {
        let mut c = character(50).with_progress(0, 5);
        let gain = c.gain_experience(10);
        assert_eq!(gain.level_after, 5);
    }

    #[test]
    fn power_combines_level_and_attributes() {
        let c = character(50).with_progress(0, 3);
        assert_eq!(c.power(), 30 + 40);
    }

    #[test]
    fn with_health_tracks_liveness() {
        let c = character(50).with_health(Health::new(0, 50).unwrap());
        assert!(!c.is_alive());
    }
}
