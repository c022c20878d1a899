//! Clan aggregate - owner of territory and holder of influence points

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::ClanId;
use crate::value_objects::ClanName;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clan {
    id: ClanId,
    name: ClanName,
    influence_points: u32,
}

impl Clan {
    pub fn new(name: ClanName) -> Self {
        Self {
            id: ClanId::new(),
            name,
            influence_points: 0,
        }
    }

    pub fn with_id(mut self, id: ClanId) -> Self {
        self.id = id;
        self
    }

    pub fn with_influence(mut self, points: u32) -> Self {
        self.influence_points = points;
        self
    }

    #[inline]
    pub fn id(&self) -> ClanId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &ClanName {
        &self.name
    }

    #[inline]
    pub fn influence_points(&self) -> u32 {
        self.influence_points
    }

    /// Spend one influence point.
    ///
    /// # Errors
    ///
    /// `DomainError::Constraint` when the clan has none left.
    pub fn consume_influence(&mut self) -> Result<u32, DomainError> {
        if self.influence_points == 0 {
            return Err(DomainError::constraint(format!(
                "clan {} has no influence points",
                self.name
            )));
        }
        self.influence_points -= 1;
        Ok(self.influence_points)
    }
}
