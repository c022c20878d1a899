//! NPC aggregate - engine-controlled combatant with a respawn cycle

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::events::{DamageOutcome, RespawnOutcome};
use crate::ids::{LocationId, NpcId};
use crate::value_objects::{Attributes, CombatantName, Health};

/// A non-player combatant.
///
/// # Invariants
///
/// - `is_alive == false` implies `health.current() == 0`
/// - `died_at.is_some()` only while dead
/// - `respawn_secs == 0` means the NPC never respawns on its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    id: NpcId,
    name: CombatantName,
    spawn_locations: Vec<LocationId>,
    health: Health,
    attributes: Attributes,
    experience_reward: u64,
    respawn_secs: u64,
    died_at: Option<DateTime<Utc>>,
    is_alive: bool,
}

impl Npc {
    pub fn new(name: CombatantName, attributes: Attributes, max_health: u32) -> Self {
        Self {
            id: NpcId::new(),
            name,
            spawn_locations: Vec::new(),
            health: Health::full(max_health),
            attributes,
            experience_reward: 0,
            respawn_secs: 0,
            died_at: None,
            is_alive: max_health > 0,
        }
    }

    pub fn with_id(mut self, id: NpcId) -> Self {
        self.id = id;
        self
    }

    pub fn with_spawn_location(mut self, location_id: LocationId) -> Self {
        if !self.spawn_locations.contains(&location_id) {
            self.spawn_locations.push(location_id);
        }
        self
    }

    pub fn with_experience_reward(mut self, reward: u64) -> Self {
        self.experience_reward = reward;
        self
    }

    pub fn with_respawn_secs(mut self, secs: u64) -> Self {
        self.respawn_secs = secs;
        self
    }

    pub fn with_health(mut self, health: Health) -> Self {
        self.health = health;
        self.is_alive = !health.is_depleted();
        self
    }

    #[inline]
    pub fn id(&self) -> NpcId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &CombatantName {
        &self.name
    }

    pub fn spawn_locations(&self) -> &[LocationId] {
        &self.spawn_locations
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
    pub fn experience_reward(&self) -> u64 {
        self.experience_reward
    }

    #[inline]
    pub fn respawn_secs(&self) -> u64 {
        self.respawn_secs
    }

    #[inline]
    pub fn died_at(&self) -> Option<DateTime<Utc>> {
        self.died_at
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.is_alive
    }

    /// Whether this NPC respawns on its own after death.
    pub fn respawns(&self) -> bool {
        self.respawn_secs > 0
    }

    /// An NPC is present at a location while alive and spawned there.
    pub fn is_present_at(&self, location_id: LocationId) -> bool {
        self.is_alive && self.spawn_locations.contains(&location_id)
    }

    /// When the pending respawn is due, if any.
    pub fn respawn_due_at(&self) -> Option<DateTime<Utc>> {
        if !self.respawns() {
            return None;
        }
        let delay = Duration::try_seconds(i64::try_from(self.respawn_secs).ok()?)?;
        self.died_at?.checked_add_signed(delay)
    }

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

    pub fn set_current_health(&mut self, value: u32) {
        self.health.set_current(value);
        self.is_alive = !self.health.is_depleted();
        if self.is_alive {
            self.died_at = None;
        }
    }

    /// Record death: zero health, dead flag, death timestamp.
    pub fn mark_dead(&mut self, now: DateTime<Utc>) {
        self.health.set_current(0);
        self.is_alive = false;
        self.died_at = Some(now);
    }

    /// Restore to full health and clear the death record.
    pub fn revive(&mut self) -> RespawnOutcome {
        if self.is_alive {
            return RespawnOutcome::NotDead;
        }
        self.health.restore();
        self.is_alive = true;
        self.died_at = None;
        RespawnOutcome::Respawned {
            health: self.health.current(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn wolf() -> Npc {
        Npc::new(
            CombatantName::new("Grey Wolf").unwrap(),
            Attributes::new(8, 12, 2, 6),
            30,
        )
        .with_respawn_secs(60)
        .with_experience_reward(25)
    }

    #[test]
    fn overkill_leaves_zero_health() {
        let mut npc = wolf();
        assert_eq!(npc.apply_damage(40), DamageOutcome::Killed { damage_dealt: 40 });
        assert_eq!(npc.health().current(), 0);
        assert!(!npc.is_alive());
    }

    #[test]
    fn respawn_due_after_delay() {
        let mut npc = wolf();
        let died = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        npc.mark_dead(died);
        assert_eq!(
            npc.respawn_due_at(),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 12, 1, 0).unwrap())
        );
    }

    #[test]
    fn zero_delay_never_respawns() {
        let mut npc = wolf().with_respawn_secs(0);
        npc.mark_dead(Utc::now());
        assert!(npc.respawn_due_at().is_none());
    }

    #[test]
    fn revive_restores_full_health_once() {
        let mut npc = wolf();
        npc.mark_dead(Utc::now());
        assert_eq!(npc.revive(), RespawnOutcome::Respawned { health: 30 });
        assert!(npc.is_alive());
        assert!(npc.died_at().is_none());
        assert_eq!(npc.revive(), RespawnOutcome::NotDead);
    }

    #[test]
    fn dead_npc_is_not_present() {
        let location = LocationId::new();
        let mut npc = wolf().with_spawn_location(location);
        assert!(npc.is_present_at(location));
        npc.mark_dead(Utc::now());
        assert!(!npc.is_present_at(location));
    }
}
