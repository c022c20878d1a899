//! Server-to-client notification payloads.
//!
//! ## Versioning Policy
//!
//! - New variants can be added at the end (forward compatible)
//! - Renaming variants is a breaking change
//! - Unknown variants deserialize to `Unknown`

use serde::{Deserialize, Serialize};

/// One combat log entry on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntryData {
    pub timestamp: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u32>,
    pub message: String,
}

/// Messages from the engine to connected clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// New combat log entries for a session, in order
    CombatLogDelta {
        session_id: String,
        turn: u64,
        entries: Vec<LogEntryData>,
    },
    /// A session reached a termination condition
    CombatFinished { session_id: String, reason: String },
    /// A territory battle changed state
    TerritoryBattleStatus {
        battle_id: String,
        location_id: String,
        status: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        winner: Option<String>,
    },
    /// A location changed hands (neutral capture or battle win)
    TerritoryCaptured {
        location_id: String,
        clan_id: String,
        captured_by: String,
    },
    /// An NPC is back in its spawn pool
    NpcRespawned {
        npc_id: String,
        location_ids: Vec<String>,
    },
    #[serde(other)]
    Unknown,
}

impl ServerMessage {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CombatLogDelta { .. } => "combat_log_delta",
            Self::CombatFinished { .. } => "combat_finished",
            Self::TerritoryBattleStatus { .. } => "territory_battle_status",
            Self::TerritoryCaptured { .. } => "territory_captured",
            Self::NpcRespawned { .. } => "npc_respawned",
            Self::Unknown => "unknown",
        }
    }
}
