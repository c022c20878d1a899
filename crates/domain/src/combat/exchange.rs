//! One attacker-vs-target exchange.
//!
//! Rolls happen in a fixed order and short-circuit: a dodge ends the exchange
//! before any damage, critical or block roll is drawn. Randomness comes from
//! the caller through [`CombatDice`], so the engine can plug in its random
//! port and tests can script every roll.

use crate::value_objects::DerivedStats;

/// Multiplier applied to damage on a critical hit (floored).
pub const CRIT_MULTIPLIER: f64 = 1.5;
/// Lower bound of the fraction a block removes.
pub const BLOCK_REDUCTION_MIN: f64 = 0.3;
/// Upper bound (exclusive) of the fraction a block removes.
pub const BLOCK_REDUCTION_MAX: f64 = 0.5;

/// Source of random rolls for an exchange.
pub trait CombatDice {
    /// Uniform in `[0, 100)`.
    fn percent(&mut self) -> f64;
    /// Uniform integer in `[min, max]`.
    fn damage(&mut self, min: u32, max: u32) -> u32;
    /// Uniform in `[BLOCK_REDUCTION_MIN, BLOCK_REDUCTION_MAX)`.
    fn block_fraction(&mut self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExchangeOutcome {
    /// Target dodged; nothing else was rolled.
    Dodged,
    Hit {
        /// Raw damage roll before critical and block.
        rolled: u32,
        critical: bool,
        /// Damage absorbed by a block, if the target blocked.
        blocked: Option<u32>,
        /// Damage that lands on the target.
        damage: u32,
    },
}

impl ExchangeOutcome {
    pub fn damage(&self) -> u32 {
        match self {
            Self::Dodged => 0,
            Self::Hit { damage, .. } => *damage,
        }
    }
}

/// Resolve an exchange from the two combatants' derived stats.
pub fn resolve_exchange(
    attacker: &DerivedStats,
    target: &DerivedStats,
    dice: &mut impl CombatDice,
) -> ExchangeOutcome {
    if dice.percent() < target.dodge_chance {
        return ExchangeOutcome::Dodged;
    }

    let rolled = dice.damage(attacker.damage_min, attacker.damage_max);
    let mut damage = rolled;

    let critical = dice.percent() < attacker.crit_chance;
    if critical {
        damage = floor_u32(f64::from(damage) * CRIT_MULTIPLIER);
    }

    let mut blocked = None;
    if dice.percent() < target.block_chance {
        let fraction = dice
            .block_fraction()
            .clamp(BLOCK_REDUCTION_MIN, BLOCK_REDUCTION_MAX);
        let reduced = floor_u32(f64::from(damage) * (1.0 - fraction));
        blocked = Some(damage - reduced.min(damage));
        damage = reduced.min(damage);
    }

    ExchangeOutcome::Hit {
        rolled,
        critical,
        blocked,
        damage,
    }
}

fn floor_u32(value: f64) -> u32 {
    if value <= 0.0 {
        0
    } else if value >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        value.floor() as u32
    }
}
