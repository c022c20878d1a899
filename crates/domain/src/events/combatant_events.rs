//! Combatant-related domain events

/// Outcome of applying damage to a combatant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Combatant was already at zero health, no effect
    AlreadyDead,
    /// Combatant took damage but survived
    Wounded { damage_dealt: u32, remaining_hp: u32 },
    /// Combatant was brought to zero health by this damage
    Killed { damage_dealt: u32 },
}

/// Result of awarding experience to a character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExperienceGain {
    pub amount: u64,
    pub total: u64,
    pub level_before: u32,
    pub level_after: u32,
}

impl ExperienceGain {
    pub fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }
}

/// Outcome of attempting to respawn an NPC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespawnOutcome {
    /// NPC was not dead, nothing changed
    NotDead,
    /// NPC restored to full health
    Respawned { health: u32 },
}
