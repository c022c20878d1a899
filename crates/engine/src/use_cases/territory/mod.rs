//! Territory use cases.
//!
//! Clan battles over location ownership: declaration, enrollment and the
//! periodic sweep that starts and resolves battles.

mod coordinator;
mod error;

pub use coordinator::{Declaration, SweepReport, TerritoryCoordinator};
pub use error::TerritoryError;
