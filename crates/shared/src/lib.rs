//! Warbanner Shared - wire types for the real-time transport layer
//!
//! The engine emits these payloads through its broadcast port; the transport
//! layer (out of this workspace) relays them to clients.
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde and serde_json
//! 2. **No business logic** - Pure data types and serialization
//! 3. **No domain IDs** - ids travel as strings

pub mod messages;

pub use messages::{LogEntryData, ServerMessage};
