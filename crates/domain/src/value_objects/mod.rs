//! Value objects - Immutable objects defined by their attributes

mod attributes;
mod derived_stats;
mod names;
mod progression;

pub use attributes::{Attributes, Health};

// Combat values derived from attributes
pub use derived_stats::{DerivedStats, BLOCK_CAP, CRIT_CAP, DODGE_CAP};

pub use names::{ClanName, CombatantName};

pub use progression::{level_for_experience, level_requirement};
