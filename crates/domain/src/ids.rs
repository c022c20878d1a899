use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            pub fn to_uuid(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

// Combatant IDs
define_id!(CharacterId);
define_id!(NpcId);

// World IDs
define_id!(LocationId);
define_id!(ClanId);

// Conflict IDs
define_id!(CombatSessionId);
define_id!(TerritoryBattleId);

/// Identity of either combatant variant.
///
/// Ordering is kind first (characters before NPCs), then id. Turn order relies
/// on this to break agility ties the same way on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CombatantId {
    Character(CharacterId),
    Npc(NpcId),
}

impl CombatantId {
    pub fn as_character(&self) -> Option<CharacterId> {
        match self {
            Self::Character(id) => Some(*id),
            Self::Npc(_) => None,
        }
    }

    pub fn as_npc(&self) -> Option<NpcId> {
        match self {
            Self::Character(_) => None,
            Self::Npc(id) => Some(*id),
        }
    }

    pub fn is_npc(&self) -> bool {
        matches!(self, Self::Npc(_))
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Character(id) => write!(f, "character:{}", id),
            Self::Npc(id) => write!(f, "npc:{}", id),
        }
    }
}

impl From<CharacterId> for CombatantId {
    fn from(value: CharacterId) -> Self {
        Self::Character(value)
    }
}

impl From<NpcId> for CombatantId {
    fn from(value: NpcId) -> Self {
        Self::Npc(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn characters_sort_before_npcs_regardless_of_uuid() {
        let npc = CombatantId::Npc(NpcId::from_uuid(Uuid::nil()));
        let character = CombatantId::Character(CharacterId::from_uuid(Uuid::max()));
        assert!(character < npc);
    }

    #[test]
    fn display_includes_kind_prefix() {
        let id = NpcId::from_uuid(Uuid::nil());
        assert_eq!(
            CombatantId::from(id).to_string(),
            "npc:00000000-0000-0000-0000-000000000000"
        );
    }
}
