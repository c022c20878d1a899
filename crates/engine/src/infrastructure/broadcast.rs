//! Broadcast sink backed by a tokio broadcast channel.
//!
//! The real-time transport layer subscribes and relays messages to clients.
//! Sending never waits: with no subscriber the message is dropped, and a
//! subscriber that falls behind loses the oldest messages.

use tokio::sync::broadcast;
use warbanner_shared::ServerMessage;

use super::ports::BroadcastPort;

const DEFAULT_CAPACITY: usize = 1024;

pub struct ChannelBroadcaster {
    sender: broadcast::Sender<ServerMessage>,
}

impl ChannelBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChannelBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl BroadcastPort for ChannelBroadcaster {
    fn broadcast(&self, message: ServerMessage) {
        let kind = message.kind();
        if let Err(e) = self.sender.send(message) {
            tracing::trace!(kind = kind, error = %e, "No subscribers for broadcast");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished(id: &str) -> ServerMessage {
        ServerMessage::CombatFinished {
            session_id: id.into(),
            reason: "done".into(),
        }
    }

    #[tokio::test]
    async fn subscribers_receive_messages_in_order() {
        let broadcaster = ChannelBroadcaster::default();
        let mut rx = broadcaster.subscribe();
        broadcaster.broadcast(finished("a"));
        broadcaster.broadcast(finished("b"));
        assert_eq!(rx.recv().await.unwrap(), finished("a"));
        assert_eq!(rx.recv().await.unwrap(), finished("b"));
    }

    #[test]
    fn broadcasting_without_subscribers_does_not_fail() {
        let broadcaster = ChannelBroadcaster::new(1);
        assert_eq!(broadcaster.subscriber_count(), 0);
        broadcaster.broadcast(finished("a"));
    }

    #[tokio::test]
    async fn lagging_subscriber_never_blocks_sender() {
        let broadcaster = ChannelBroadcaster::new(2);
        let mut rx = broadcaster.subscribe();
        for i in 0..10 {
            broadcaster.broadcast(finished(&i.to_string()));
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
    }
}
