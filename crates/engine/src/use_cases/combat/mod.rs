//! Combat use cases.
//!
//! Session admission, turn scheduling, attack resolution and experience.

mod attack;
mod error;
mod experience;
mod lifecycle;
mod scheduler;

use std::sync::Arc;

pub use attack::{AttackReport, AttackResolver};
pub use error::{CombatError, TickError};
pub use experience::{ExperienceAward, ExperienceAwarder};
pub use lifecycle::CombatLifecycle;
pub use scheduler::{TickOutcome, TurnScheduler};

/// Container for combat use cases.
pub struct CombatUseCases {
    pub lifecycle: Arc<CombatLifecycle>,
    pub scheduler: Arc<TurnScheduler>,
    pub resolver: Arc<AttackResolver>,
    pub experience: Arc<ExperienceAwarder>,
}

impl CombatUseCases {
    pub fn new(
        lifecycle: Arc<CombatLifecycle>,
        scheduler: Arc<TurnScheduler>,
        resolver: Arc<AttackResolver>,
        experience: Arc<ExperienceAwarder>,
    ) -> Self {
        Self {
            lifecycle,
            scheduler,
            resolver,
            experience,
        }
    }
}
