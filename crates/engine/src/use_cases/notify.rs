//! Conversions from domain state to broadcast payloads.

use warbanner_domain::{CombatLogEntry, CombatSession, Npc, TerritoryBattle, TerritoryOwnership};
use warbanner_shared::{LogEntryData, ServerMessage};

pub fn log_entry_data(entry: &CombatLogEntry) -> LogEntryData {
    LogEntryData {
        timestamp: entry.timestamp.to_rfc3339(),
        kind: entry.kind.as_str().to_string(),
        actor: entry.actor.map(|id| id.to_string()),
        target: entry.target.map(|id| id.to_string()),
        amount: entry.amount,
        message: entry.message.clone(),
    }
}

/// Log entries appended to `session` after the first `since`.
pub fn combat_log_delta(session: &CombatSession, since: usize) -> ServerMessage {
    ServerMessage::CombatLogDelta {
        session_id: session.id().to_string(),
        turn: session.turn_counter(),
        entries: session
            .log()
            .entries_since(since)
            .iter()
            .map(log_entry_data)
            .collect(),
    }
}

pub fn combat_finished(session: &CombatSession, reason: &str) -> ServerMessage {
    ServerMessage::CombatFinished {
        session_id: session.id().to_string(),
        reason: reason.to_string(),
    }
}

pub fn battle_status(battle: &TerritoryBattle) -> ServerMessage {
    ServerMessage::TerritoryBattleStatus {
        battle_id: battle.id().to_string(),
        location_id: battle.location_id().to_string(),
        status: battle.status().as_str().to_string(),
        winner: battle.winner().map(|clan| clan.to_string()),
    }
}

pub fn territory_captured(ownership: &TerritoryOwnership) -> ServerMessage {
    ServerMessage::TerritoryCaptured {
        location_id: ownership.location_id.to_string(),
        clan_id: ownership.clan_id.to_string(),
        captured_by: ownership.captured_by.to_string(),
    }
}

pub fn npc_respawned(npc: &Npc) -> ServerMessage {
    ServerMessage::NpcRespawned {
        npc_id: npc.id().to_string(),
        location_ids: npc.spawn_locations().iter().map(|l| l.to_string()).collect(),
    }
}
