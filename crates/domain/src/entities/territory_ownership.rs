//! Territory ownership record - which clan holds a location.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CharacterId, ClanId, LocationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryOwnership {
    pub location_id: LocationId,
    pub clan_id: ClanId,
    pub captured_at: DateTime<Utc>,
    pub captured_by: CharacterId,
}

impl TerritoryOwnership {
    pub fn new(
        location_id: LocationId,
        clan_id: ClanId,
        captured_by: CharacterId,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            location_id,
            clan_id,
            captured_at,
            captured_by,
        }
    }
}
