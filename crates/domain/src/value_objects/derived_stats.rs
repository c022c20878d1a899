//! Combat values derived from primary attributes.
//!
//! Pure and deterministic. The probability caps keep any attribute spread from
//! producing an always-dodge, always-block or always-crit combatant.

use serde::{Deserialize, Serialize};

use super::attributes::Attributes;

/// Upper bound for dodge chance, in percent.
pub const DODGE_CAP: f64 = 30.0;
/// Upper bound for block chance, in percent.
pub const BLOCK_CAP: f64 = 25.0;
/// Upper bound for critical chance, in percent.
pub const CRIT_CAP: f64 = 20.0;

/// Damage range and percentage chances for one combatant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub damage_min: u32,
    pub damage_max: u32,
    /// Percent, 0..=30
    pub dodge_chance: f64,
    /// Percent, 0..=25
    pub block_chance: f64,
    /// Percent, 0..=20
    pub crit_chance: f64,
}

impl DerivedStats {
    /// Compute derived stats.
    ///
    /// Base damage is `strength * 1.2`; the range spans 80%..130% of it.
    /// Both bounds are evaluated in integer arithmetic (`strength * 96 / 100`
    /// and `strength * 156 / 100`) so that floor never lands one below the
    /// exact value through float error.
    pub fn from_attributes(attributes: &Attributes) -> Self {
        let strength = u64::from(attributes.strength);
        let damage_min = saturate(strength * 96 / 100);
        let damage_max = saturate(strength * 156 / 100);

        Self {
            damage_min,
            damage_max,
            dodge_chance: (f64::from(attributes.agility) * 0.8).min(DODGE_CAP),
            block_chance: (f64::from(attributes.endurance) * 0.6).min(BLOCK_CAP),
            crit_chance: (f64::from(attributes.intelligence) * 0.5).min(CRIT_CAP),
        }
    }
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
