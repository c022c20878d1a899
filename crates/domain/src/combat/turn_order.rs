//! Turn order, termination and target eligibility.

use crate::aggregates::{CombatKind, Combatant};
use crate::ids::CombatantId;

/// Order alive combatants by agility, fastest first.
///
/// Ties fall back to [`CombatantId`] ordering (characters before NPCs, then
/// id), so equal agility produces the same order on every tick.
pub fn turn_order(combatants: &[Combatant]) -> Vec<&Combatant> {
    let mut order: Vec<&Combatant> = combatants.iter().filter(|c| c.is_alive()).collect();
    order.sort_by(|a, b| {
        b.agility()
            .cmp(&a.agility())
            .then_with(|| a.id().cmp(&b.id()))
    });
    order
}

/// Index of the acting combatant for a given turn.
///
/// `None` when there is nobody to act.
pub fn acting_index(turn_counter: u64, order_len: usize) -> Option<usize> {
    if order_len == 0 {
        return None;
    }
    let len = order_len as u64;
    usize::try_from(turn_counter % len).ok()
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// pve: every character is down
    CharactersDefeated,
    /// pve: every NPC is down
    NpcsDefeated,
    /// pvp/mixed: at most one combatant left standing
    LastStanding,
}

impl Termination {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::CharactersDefeated => "all characters have fallen",
            Self::NpcsDefeated => "all enemies have been defeated",
            Self::LastStanding => "only one combatant remains standing",
        }
    }
}

/// Evaluate the termination rule for a session kind.
pub fn check_termination(kind: CombatKind, combatants: &[Combatant]) -> Option<Termination> {
    let alive_characters = combatants
        .iter()
        .filter(|c| c.is_alive() && !c.is_npc())
        .count();
    let alive_npcs = combatants
        .iter()
        .filter(|c| c.is_alive() && c.is_npc())
        .count();

    match kind {
        CombatKind::Pve => {
            if alive_characters == 0 {
                Some(Termination::CharactersDefeated)
            } else if alive_npcs == 0 {
                Some(Termination::NpcsDefeated)
            } else {
                None
            }
        }
        CombatKind::Pvp | CombatKind::Mixed => {
            if alive_characters + alive_npcs < 2 {
                Some(Termination::LastStanding)
            } else {
                None
            }
        }
    }
}

/// Alive combatants `actor` may attack under the session's rules.
pub fn eligible_targets<'a>(
    kind: CombatKind,
    actor: &Combatant,
    combatants: &'a [Combatant],
) -> Vec<&'a Combatant> {
    let actor_id = actor.id();
    combatants
        .iter()
        .filter(|c| c.is_alive() && c.id() != actor_id)
        .filter(|c| match kind {
            CombatKind::Pve => c.is_npc() != actor.is_npc(),
            CombatKind::Pvp | CombatKind::Mixed => true,
        })
        .collect()
}

/// Ids in turn order; handy for logging and assertions.
pub fn order_ids(order: &[&Combatant]) -> Vec<CombatantId> {
    order.iter().map(|c| c.id()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregates::{Character, Npc};
    use crate::ids::LocationId;
    use crate::value_objects::{Attributes, CombatantName, Health};

    fn character(name: &str, strength: u32, agility: u32) -> Combatant {
        Character::new(
            CombatantName::new(name).unwrap(),
            LocationId::new(),
            Attributes::new(strength, agility, 5, 5),
            50,
        )
        .into()
    }

    fn npc(name: &str, agility: u32, hp: u32) -> Combatant {
        Npc::new(CombatantName::new(name).unwrap(), Attributes::new(5, agility, 5, 5), 30)
            .with_health(Health::new(hp, 30).unwrap())
            .into()
    }

    #[test]
    fn faster_character_acts_first() {
        let slow = character("Slow", 10, 10);
        let fast = character("Fast", 10, 15);
        let combatants = vec![slow.clone(), fast.clone()];

        for turn in [0u64, 2, 4, 100] {
            let order = turn_order(&combatants);
            let idx = acting_index(turn, order.len()).unwrap();
            assert_eq!(order[idx].id(), fast.id());
        }
        let order = turn_order(&combatants);
        assert_eq!(order_ids(&order), vec![fast.id(), slow.id()]);
    }

    #[test]
    fn ties_are_stable_across_input_order() {
        let a = character("A", 10, 12);
        let b = npc("B", 12, 30);
        let c = character("C", 10, 12);
        let forward = vec![a.clone(), b.clone(), c.clone()];
        let backward = vec![c, b, a];
        assert_eq!(
            order_ids(&turn_order(&forward)),
            order_ids(&turn_order(&backward))
        );
        // characters precede the NPC on equal agility
        assert!(turn_order(&forward)[2].is_npc());
    }

    #[test]
    fn dead_combatants_are_excluded() {
        let combatants = vec![character("A", 10, 10), npc("Dead", 50, 0)];
        assert_eq!(turn_order(&combatants).len(), 1);
    }

    #[test]
    fn acting_index_wraps() {
        assert_eq!(acting_index(5, 3), Some(2));
        assert_eq!(acting_index(0, 0), None);
    }

    #[test]
    fn pve_ends_when_npcs_are_down() {
        let combatants = vec![character("A", 10, 10), npc("Wolf", 10, 0)];
        assert_eq!(
            check_termination(CombatKind::Pve, &combatants),
            Some(Termination::NpcsDefeated)
        );
    }

    #[test]
    fn pve_ends_when_characters_are_down() {
        let combatants = vec![npc("Wolf", 10, 30)];
        assert_eq!(
            check_termination(CombatKind::Pve, &combatants),
            Some(Termination::CharactersDefeated)
        );
    }

    #[test]
    fn pvp_continues_with_two_standing() {
        let combatants = vec![character("A", 10, 10), character("B", 10, 10)];
        assert_eq!(check_termination(CombatKind::Pvp, &combatants), None);
        assert_eq!(
            check_termination(CombatKind::Pvp, &combatants[..1]),
            Some(Termination::LastStanding)
        );
    }

    #[test]
    fn pve_targets_only_the_other_side() {
        let hero = character("Hero", 10, 10);
        let ally = character("Ally", 10, 10);
        let wolf = npc("Wolf", 10, 30);
        let combatants = vec![hero.clone(), ally, wolf.clone()];
        let targets = eligible_targets(CombatKind::Pve, &hero, &combatants);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].id(), wolf.id());
    }

    #[test]
    fn mixed_targets_anyone_else() {
        let hero = character("Hero", 10, 10);
        let ally = character("Ally", 10, 10);
        let wolf = npc("Wolf", 10, 30);
        let combatants = vec![hero.clone(), ally, wolf];
        assert_eq!(eligible_targets(CombatKind::Mixed, &hero, &combatants).len(), 2);
    }
}
