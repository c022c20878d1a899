//! Territory battle coordinator.
//!
//! Declaring on a neutral location captures it on the spot. Declaring on an
//! owned location schedules a battle after the preparation window; the
//! periodic sweep activates it once the start time has passed and resolves it
//! on the following sweep by comparing the summed power of each side.
//!
//! Every operation runs under one mutex, so the "one open battle per
//! location" check, influence spending and resolution never interleave.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use warbanner_domain::{
    BattleSide, BattleStatus, CharacterId, Clan, ClanId, LocationId, TerritoryBattle,
    TerritoryBattleId, TerritoryOwnership,
};

use super::error::TerritoryError;
use crate::infrastructure::ports::{
    BroadcastPort, ClanRepo, ClockPort, CombatantRepo, RepoError, TerritoryRepo,
};
use crate::use_cases::notify;

/// What a declaration did.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// The location was neutral and now belongs to the declarer's clan.
    Captured(TerritoryOwnership),
    /// A battle against the current owner is preparing.
    BattleScheduled(TerritoryBattle),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub activated: usize,
    pub completed: usize,
    pub failed: usize,
}

pub struct TerritoryCoordinator {
    territory: Arc<dyn TerritoryRepo>,
    clans: Arc<dyn ClanRepo>,
    combatants: Arc<dyn CombatantRepo>,
    clock: Arc<dyn ClockPort>,
    broadcast: Arc<dyn BroadcastPort>,
    preparation: chrono::Duration,
    experience_bonus: u64,
    lock: Mutex<()>,
}

impl TerritoryCoordinator {
    pub fn new(
        territory: Arc<dyn TerritoryRepo>,
        clans: Arc<dyn ClanRepo>,
        combatants: Arc<dyn CombatantRepo>,
        clock: Arc<dyn ClockPort>,
        broadcast: Arc<dyn BroadcastPort>,
        preparation: chrono::Duration,
        experience_bonus: u64,
    ) -> Self {
        Self {
            territory,
            clans,
            combatants,
            clock,
            broadcast,
            preparation,
            experience_bonus,
            lock: Mutex::new(()),
        }
    }

    /// Declare a battle for `location_id` on behalf of the character's clan.
    ///
    /// One influence point is spent on success, whether the location was
    /// neutral or owned. If the capture or battle cannot be stored, the
    /// point is refunded.
    pub async fn declare(
        &self,
        location_id: LocationId,
        character_id: CharacterId,
    ) -> Result<Declaration, TerritoryError> {
        let _lock = self.lock.lock().await;

        let character = self
            .combatants
            .get_character(character_id)
            .await?
            .ok_or(TerritoryError::CharacterNotFound(character_id))?;
        let clan_id = character
            .clan_id()
            .ok_or(TerritoryError::NotInClan(character_id))?;

        let mut clan = self
            .clans
            .get(clan_id)
            .await?
            .ok_or(TerritoryError::ClanNotFound(clan_id))?;
        if clan.influence_points() == 0 {
            return Err(TerritoryError::InsufficientInfluence(clan_id));
        }
        if self.territory.find_open_battle(location_id).await?.is_some() {
            return Err(TerritoryError::BattleAlreadyInProgress(location_id));
        }
        let owner = self.territory.get_ownership(location_id).await?;
        if let Some(owner) = owner {
            if owner.clan_id == clan_id {
                return Err(TerritoryError::AlreadyOwned {
                    location_id,
                    clan_id,
                });
            }
        }

        let unspent = clan.clone();
        clan.consume_influence()
            .map_err(|_| TerritoryError::InsufficientInfluence(clan_id))?;
        self.clans.save(&clan).await?;

        let result = self
            .claim(location_id, clan_id, character_id, owner.map(|o| o.clan_id))
            .await;
        if result.is_err() {
            self.refund(&unspent).await;
        }
        result
    }

    /// Enroll a character on their clan's side. Joining twice is a no-op.
    pub async fn join(
        &self,
        battle_id: TerritoryBattleId,
        character_id: CharacterId,
    ) -> Result<TerritoryBattle, TerritoryError> {
        let _lock = self.lock.lock().await;

        let mut battle = self
            .territory
            .get_battle(battle_id)
            .await?
            .ok_or(TerritoryError::BattleNotFound(battle_id))?;
        if !battle.is_open() {
            return Err(TerritoryError::BattleClosed(battle_id));
        }

        let character = self
            .combatants
            .get_character(character_id)
            .await?
            .ok_or(TerritoryError::CharacterNotFound(character_id))?;
        let clan_id = character
            .clan_id()
            .ok_or(TerritoryError::NotInClan(character_id))?;
        let side = battle
            .side_of(clan_id)
            .ok_or(TerritoryError::ClanNotInvolved(clan_id))?;

        if battle.enlist(character_id)? {
            self.territory.save_battle(&battle).await?;
            tracing::info!(
                battle_id = %battle_id,
                character_id = %character_id,
                side = ?side,
                "Character enlisted in territory battle"
            );
        }
        Ok(battle)
    }

    /// Advance every open battle by at most one step.
    ///
    /// A failing battle is logged and left for the next sweep; it does not
    /// stop the others.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepReport, RepoError> {
        let _lock = self.lock.lock().await;
        let mut report = SweepReport::default();

        for mut battle in self.territory.list_open_battles().await? {
            let battle_id = battle.id();
            let result = match battle.status() {
                BattleStatus::Preparing => self.activate(&mut battle, now).await.map(|activated| {
                    if activated {
                        report.activated += 1;
                    }
                }),
                BattleStatus::Active => self.resolve(&mut battle, now).await.map(|()| {
                    report.completed += 1;
                }),
                BattleStatus::Completed => Ok(()),
            };
            if let Err(e) = result {
                report.failed += 1;
                tracing::warn!(battle_id = %battle_id, error = %e, "Territory battle step failed");
            }
        }
        Ok(report)
    }

    /// Sweep on a fixed interval until cancelled.
    pub async fn run(self: Arc<Self>, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        tracing::info!(interval_secs = interval.as_secs(), "Territory sweep started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep(self.clock.now()).await {
                        tracing::warn!(error = %e, "Territory sweep failed");
                    }
                }
            }
        }
        tracing::info!("Territory sweep stopped");
    }

    pub async fn get_battle(
        &self,
        battle_id: TerritoryBattleId,
    ) -> Result<TerritoryBattle, TerritoryError> {
        self.territory
            .get_battle(battle_id)
            .await?
            .ok_or(TerritoryError::BattleNotFound(battle_id))
    }

    pub async fn ownership(
        &self,
        location_id: LocationId,
    ) -> Result<Option<TerritoryOwnership>, RepoError> {
        self.territory.get_ownership(location_id).await
    }

    /// Capture a neutral location or schedule a battle against its owner.
    async fn claim(
        &self,
        location_id: LocationId,
        clan_id: ClanId,
        character_id: CharacterId,
        owner: Option<ClanId>,
    ) -> Result<Declaration, TerritoryError> {
        let now = self.clock.now();
        match owner {
            None => {
                let ownership = TerritoryOwnership::new(location_id, clan_id, character_id, now);
                self.territory.update_ownership(&ownership).await?;
                self.broadcast
                    .broadcast(notify::territory_captured(&ownership));
                tracing::info!(
                    location_id = %location_id,
                    clan_id = %clan_id,
                    character_id = %character_id,
                    "Neutral territory captured"
                );
                Ok(Declaration::Captured(ownership))
            }
            Some(defender) => {
                let battle = TerritoryBattle::declare(
                    location_id,
                    clan_id,
                    Some(defender),
                    character_id,
                    now + self.preparation,
                )?;
                self.territory.save_battle(&battle).await?;
                self.broadcast.broadcast(notify::battle_status(&battle));
                tracing::info!(
                    battle_id = %battle.id(),
                    location_id = %location_id,
                    attacker = %clan_id,
                    defender = %defender,
                    starts_at = %battle.battle_start_time(),
                    "Territory battle declared"
                );
                Ok(Declaration::BattleScheduled(battle))
            }
        }
    }

    /// Put back the influence point of a declaration that did not land.
    async fn refund(&self, unspent: &Clan) {
        if let Err(e) = self.clans.save(unspent).await {
            tracing::error!(
                clan_id = %unspent.id(),
                error = %e,
                "Failed to refund influence after a failed declaration"
            );
        }
    }

    async fn activate(
        &self,
        battle: &mut TerritoryBattle,
        now: DateTime<Utc>,
    ) -> Result<bool, TerritoryError> {
        if !battle.activate_if_due(now) {
            return Ok(false);
        }
        self.territory.save_battle(battle).await?;
        self.broadcast.broadcast(notify::battle_status(battle));
        tracing::info!(
            battle_id = %battle.id(),
            participants = battle.participants().len(),
            "Territory battle started"
        );
        Ok(true)
    }

    async fn resolve(
        &self,
        battle: &mut TerritoryBattle,
        now: DateTime<Utc>,
    ) -> Result<(), TerritoryError> {
        let mut attacker_power = 0u64;
        let mut defender_power = 0u64;
        let mut fighters = Vec::new();

        for character_id in battle.participants() {
            let Some(character) = self.combatants.get_character(*character_id).await? else {
                continue;
            };
            match character.clan_id().and_then(|clan| battle.side_of(clan)) {
                Some(BattleSide::Attacker) => attacker_power += character.power(),
                Some(BattleSide::Defender) => defender_power += character.power(),
                // changed clans since enlisting
                None => {}
            }
            fighters.push(character.id());
        }

        let resolution = battle.resolve_by_power(attacker_power, defender_power);
        battle.complete(resolution.winner, now)?;

        // Ownership lands before the battle is stored as completed, so a
        // failed write leaves it active for the next sweep.
        let captured = if resolution.attacker_won(battle.attacking_clan()) {
            let ownership = TerritoryOwnership::new(
                battle.location_id(),
                resolution.winner,
                battle.declared_by(),
                now,
            );
            self.territory.update_ownership(&ownership).await?;
            Some(ownership)
        } else {
            None
        };
        self.territory.save_battle(battle).await?;

        if let Some(ownership) = captured {
            self.broadcast
                .broadcast(notify::territory_captured(&ownership));
        }

        for character_id in fighters {
            if let Err(e) = self
                .combatants
                .add_experience(character_id, self.experience_bonus)
                .await
            {
                tracing::warn!(
                    character_id = %character_id,
                    error = %e,
                    "Failed to grant territory battle experience"
                );
            }
        }

        self.broadcast.broadcast(notify::battle_status(battle));
        tracing::info!(
            battle_id = %battle.id(),
            winner = %resolution.winner,
            attacker_power = resolution.attacker_power,
            defender_power = resolution.defender_power,
            "Territory battle completed"
        );
        Ok(())
    }
}
