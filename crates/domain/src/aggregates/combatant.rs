//! Combatant - the read view the combat engine works with.
//!
//! Every branch between characters and NPCs goes through an exhaustive match
//! on this enum (derived stats, health mutation, experience eligibility).

use serde::{Deserialize, Serialize};

use super::{Character, Npc};
use crate::events::DamageOutcome;
use crate::ids::{CombatantId, LocationId};
use crate::value_objects::{Attributes, CombatantName, DerivedStats, Health};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Combatant {
    Character(Character),
    Npc(Npc),
}

impl Combatant {
    pub fn id(&self) -> CombatantId {
        match self {
            Self::Character(c) => CombatantId::Character(c.id()),
            Self::Npc(n) => CombatantId::Npc(n.id()),
        }
    }

    pub fn name(&self) -> &CombatantName {
        match self {
            Self::Character(c) => c.name(),
            Self::Npc(n) => n.name(),
        }
    }

    pub fn health(&self) -> Health {
        match self {
            Self::Character(c) => c.health(),
            Self::Npc(n) => n.health(),
        }
    }

    pub fn attributes(&self) -> &Attributes {
        match self {
            Self::Character(c) => c.attributes(),
            Self::Npc(n) => n.attributes(),
        }
    }

    pub fn derived_stats(&self) -> DerivedStats {
        DerivedStats::from_attributes(self.attributes())
    }

    /// Alive and above zero health: may act and may be targeted.
    pub fn is_alive(&self) -> bool {
        let alive = match self {
            Self::Character(c) => c.is_alive(),
            Self::Npc(n) => n.is_alive(),
        };
        alive && !self.health().is_depleted()
    }

    pub fn is_npc(&self) -> bool {
        matches!(self, Self::Npc(_))
    }

    /// Whether the combatant currently stands at `location_id`.
    pub fn is_at(&self, location_id: LocationId) -> bool {
        match self {
            Self::Character(c) => c.location_id() == location_id,
            Self::Npc(n) => n.is_present_at(location_id),
        }
    }

    /// Agility drives turn order.
    pub fn agility(&self) -> u32 {
        self.attributes().agility
    }

    pub fn apply_damage(&mut self, amount: u32) -> DamageOutcome {
        match self {
            Self::Character(c) => c.apply_damage(amount),
            Self::Npc(n) => n.apply_damage(amount),
        }
    }

    pub fn as_character(&self) -> Option<&Character> {
        match self {
            Self::Character(c) => Some(c),
            Self::Npc(_) => None,
        }
    }

    pub fn as_npc(&self) -> Option<&Npc> {
        match self {
            Self::Character(_) => None,
            Self::Npc(n) => Some(n),
        }
    }
}

impl From<Character> for Combatant {
    fn from(value: Character) -> Self {
        Self::Character(value)
    }
}

impl From<Npc> for Combatant {
    fn from(value: Npc) -> Self {
        Self::Npc(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depleted_combatant_is_not_alive() {
        let npc = Npc::new(
            CombatantName::new("Rat").unwrap(),
            Attributes::default(),
            5,
        )
        .with_health(Health::new(0, 5).unwrap());
        assert!(!Combatant::from(npc).is_alive());
    }

    #[test]
    fn id_reflects_variant() {
        let character = Character::new(
            CombatantName::new("Ilsa").unwrap(),
            LocationId::new(),
            Attributes::default(),
            10,
        );
        let expected = CombatantId::Character(character.id());
        assert_eq!(Combatant::from(character).id(), expected);
    }
}
