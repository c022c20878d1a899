//! Territory flows: capture, contest, sweep.

use warbanner_domain::{Attributes, BattleStatus, LocationId, TerritoryOwnership};
use warbanner_shared::ServerMessage;

use super::E2EContext;
use crate::infrastructure::ports::ClanRepo;
use crate::test_fixtures::{character_at, clan, fixed_time, member_of, TestWorld};
use crate::use_cases::{Declaration, TerritoryError};

#[tokio::test]
async fn a_neutral_keep_is_claimed_then_lost_to_a_larger_host() {
    let world = TestWorld::new();
    let keep = LocationId::new();
    let ravens = world.add_clan(clan("Ravens", 1));
    let wolves = world.add_clan(clan("Wolves", 3));
    let stats = Attributes::new(10, 10, 10, 10);
    let raven = world.add_character(member_of(character_at("Corvin", keep, stats, 50), ravens));
    let wolf_leader = world.add_character(member_of(character_at("Ulf", keep, stats, 50), wolves));
    let wolf_second = world.add_character(member_of(character_at("Sigrun", keep, stats, 50), wolves));
    let mut ctx = E2EContext::new(world);
    let territory = &ctx.app.use_cases.territory;

    // Ravens walk into an empty keep.
    let claimed = territory.declare(keep, raven).await.unwrap();
    assert!(matches!(claimed, Declaration::Captured(_)));

    // Ravens are out of influence; Wolves contest.
    let battle = match territory.declare(keep, wolf_leader).await.unwrap() {
        Declaration::BattleScheduled(battle) => battle,
        other => panic!("expected a battle, got {other:?}"),
    };
    territory.join(battle.id(), wolf_second).await.unwrap();
    territory.join(battle.id(), raven).await.unwrap();

    let start = battle.battle_start_time();
    territory.sweep(start).await.unwrap();
    assert_eq!(
        territory.get_battle(battle.id()).await.unwrap().status(),
        BattleStatus::Active
    );
    // Joining is still open while the battle is active.
    territory.join(battle.id(), wolf_second).await.unwrap();

    territory.sweep(start).await.unwrap();
    let done = territory.get_battle(battle.id()).await.unwrap();
    assert_eq!(done.winner(), Some(wolves));

    let owner = territory.ownership(keep).await.unwrap().unwrap();
    assert_eq!(owner.clan_id, wolves);
    assert_eq!(owner.captured_by, wolf_leader);

    let closed = territory.join(battle.id(), raven).await;
    assert!(matches!(closed, Err(TerritoryError::BattleClosed(_))));

    let retake = territory.declare(keep, raven).await;
    assert!(matches!(retake, Err(TerritoryError::InsufficientInfluence(id)) if id == ravens));

    let kinds: Vec<&'static str> = ctx.take_messages().iter().map(ServerMessage::kind).collect();
    assert_eq!(
        kinds,
        vec![
            "territory_captured",
            "territory_battle_status",
            "territory_battle_status",
            "territory_captured",
            "territory_battle_status",
        ]
    );
}

#[tokio::test]
async fn only_one_battle_per_location_at_a_time() {
    let world = TestWorld::new();
    let ford = LocationId::new();
    let elsewhere = LocationId::new();
    let holders = world.add_clan(clan("Holders", 0));
    let first = world.add_clan(clan("First", 2));
    let second = world.add_clan(clan("Second", 2));
    let stats = Attributes::new(8, 8, 8, 8);
    let holder = world.add_character(member_of(character_at("Holder", ford, stats, 40), holders));
    let a = world.add_character(member_of(character_at("Ari", ford, stats, 40), first));
    let b = world.add_character(member_of(character_at("Bo", ford, stats, 40), second));
    world
        .territory
        .insert_ownership(TerritoryOwnership::new(ford, holders, holder, fixed_time()));
    let ctx = E2EContext::new(world);
    let territory = &ctx.app.use_cases.territory;

    territory.declare(ford, a).await.unwrap();
    let blocked = territory.declare(ford, b).await;
    assert!(matches!(blocked, Err(TerritoryError::BattleAlreadyInProgress(id)) if id == ford));

    // The refusal cost nothing.
    let second_clan = ctx.world.clans.get(second).await.unwrap().unwrap();
    assert_eq!(second_clan.influence_points(), 2);

    // Other locations are unaffected.
    assert!(matches!(
        territory.declare(elsewhere, b).await.unwrap(),
        Declaration::Captured(_)
    ));
}
