//! Primary attributes and health pool.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The four primary attributes every combatant carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Attributes {
    pub strength: u32,
    pub agility: u32,
    pub intelligence: u32,
    pub endurance: u32,
}

impl Attributes {
    pub fn new(strength: u32, agility: u32, intelligence: u32, endurance: u32) -> Self {
        Self {
            strength,
            agility,
            intelligence,
            endurance,
        }
    }

    /// Sum of all four attributes.
    pub fn total(&self) -> u64 {
        u64::from(self.strength)
            + u64::from(self.agility)
            + u64::from(self.intelligence)
            + u64::from(self.endurance)
    }
}

/// Current and maximum health.
///
/// # Invariants
///
/// - `current <= max` at all times
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "HealthRepr", into = "HealthRepr")]
pub struct Health {
    current: u32,
    max: u32,
}

#[derive(Serialize, Deserialize)]
struct HealthRepr {
    current: u32,
    max: u32,
}

impl Health {
    /// Create a health pool.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `current` exceeds `max`.
    pub fn new(current: u32, max: u32) -> Result<Self, DomainError> {
        if current > max {
            return Err(DomainError::validation(format!(
                "Current health {} exceeds maximum {}",
                current, max
            )));
        }
        Ok(Self { current, max })
    }

    /// A full health pool.
    pub fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    #[inline]
    pub fn current(&self) -> u32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> u32 {
        self.max
    }

    #[inline]
    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }

    /// Subtract damage, saturating at zero. Returns the new current value.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        self.current = self.current.saturating_sub(amount);
        self.current
    }

    /// Set the current value, clamped to `max`.
    pub fn set_current(&mut self, value: u32) {
        self.current = value.min(self.max);
    }

    pub fn restore(&mut self) {
        self.current = self.max;
    }
}

impl TryFrom<HealthRepr> for Health {
    type Error = DomainError;

    fn try_from(value: HealthRepr) -> Result<Self, Self::Error> {
        Self::new(value.current, value.max)
    }
}

impl From<Health> for HealthRepr {
    fn from(value: Health) -> Self {
        Self {
            current: value.current,
            max: value.max,
        }
    }
}
