//! Outbound notification port.

use warbanner_shared::ServerMessage;

/// Sink for events relayed to connected clients.
///
/// Must not block: implementations drop or buffer rather than wait on a slow
/// consumer.
#[cfg_attr(test, mockall::automock)]
pub trait BroadcastPort: Send + Sync {
    fn broadcast(&self, message: ServerMessage);
}
