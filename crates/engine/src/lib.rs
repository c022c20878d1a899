//! Warbanner Engine library.
//!
//! Server-side combat and territory engine.
//!
//! ## Structure
//!
//! - `use_cases/` - combat lifecycle, turn scheduler, attack resolution, NPC
//!   respawn, territory battles
//! - `infrastructure/` - ports, in-memory adapters, settings, retry
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

/// Shared builders for unit and end-to-end tests.
#[cfg(test)]
pub mod test_fixtures;

/// End-to-end flows against the in-memory adapters.
#[cfg(test)]
mod e2e_tests;

pub use app::{App, Repositories, RestoreSummary, UseCases};
