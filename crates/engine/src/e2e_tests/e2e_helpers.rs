//! Helpers shared by the end-to-end flows.

use std::collections::HashMap;

use tokio::sync::broadcast;
use warbanner_domain::{CombatSessionId, CombatantId};
use warbanner_shared::{LogEntryData, ServerMessage};

use crate::app::App;
use crate::test_fixtures::{drain, TestWorld};
use crate::use_cases::TickOutcome;

/// Upper bound on ticks for a fight that should end on its own.
pub const MAX_TICKS: usize = 200;

/// A world, the app built over it and a subscription opened before anything
/// was broadcast.
pub struct E2EContext {
    pub world: TestWorld,
    pub app: App,
    pub messages: broadcast::Receiver<ServerMessage>,
}

impl E2EContext {
    pub fn new(world: TestWorld) -> Self {
        let messages = world.broadcaster.subscribe();
        let app = world.app();
        Self {
            world,
            app,
            messages,
        }
    }

    /// Tick one session until it finishes; returns the number of ticks.
    pub async fn fight_to_the_end(&self, session_id: CombatSessionId) -> usize {
        let scheduler = &self.app.use_cases.combat.scheduler;
        for tick in 1..=MAX_TICKS {
            if scheduler.tick(session_id).await == TickOutcome::Finished {
                return tick;
            }
        }
        panic!("session {session_id} still running after {MAX_TICKS} ticks");
    }

    pub fn take_messages(&mut self) -> Vec<ServerMessage> {
        drain(&mut self.messages)
    }
}

/// Concatenate every log delta broadcast for one session, in order.
pub fn streamed_entries(messages: &[ServerMessage], session_id: CombatSessionId) -> Vec<LogEntryData> {
    let session_id = session_id.to_string();
    messages
        .iter()
        .filter_map(|m| match m {
            ServerMessage::CombatLogDelta {
                session_id: id,
                entries,
                ..
            } if *id == session_id => Some(entries.clone()),
            _ => None,
        })
        .flatten()
        .collect()
}

pub fn full_health(pairs: &[(CombatantId, u32)]) -> HashMap<CombatantId, u32> {
    pairs.iter().copied().collect()
}
