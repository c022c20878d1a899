//! Infrastructure implementations.
//!
//! Contains port trait definitions and the adapters bundled with the engine.

pub mod broadcast;
pub mod clock;
pub mod memory;
pub mod ports;
pub mod retry;
pub mod settings;
