//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Storage access (combatants, sessions, territory, clans)
//! - Notifications to the real-time transport layer
//! - Clock/Random (for testing)

mod error;
mod external;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{ClanRepo, CombatSessionRepo, CombatantRepo, TerritoryRepo};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::BroadcastPort;

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::{MockClanRepo, MockCombatSessionRepo, MockCombatantRepo, MockTerritoryRepo};

#[cfg(test)]
pub use external::MockBroadcastPort;

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::{ClockPort, RandomPort};

// =============================================================================
// Error Types
// =============================================================================
pub use error::RepoError;
