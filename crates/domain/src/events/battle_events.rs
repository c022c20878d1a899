//! Territory battle domain events

use crate::ids::ClanId;

/// Outcome of resolving a territory battle by power comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleResolution {
    pub winner: ClanId,
    pub attacker_power: u64,
    pub defender_power: u64,
}

impl BattleResolution {
    /// Whether ownership changes hands.
    pub fn attacker_won(&self, attacking_clan: ClanId) -> bool {
        self.winner == attacking_clan
    }
}
