//! NPC death and respawn across combat and restarts.

use std::time::Duration;

use warbanner_domain::{Attributes, Health, LocationId};
use warbanner_shared::ServerMessage;

use super::E2EContext;
use crate::test_fixtures::{character_at, fixed_time, npc_at, TestWorld};
use crate::use_cases::RespawnSchedule;

#[tokio::test(start_paused = true)]
async fn slain_npc_returns_after_its_respawn_delay_and_can_be_fought_again() {
    let world = TestWorld::new();
    let den = LocationId::new();
    let hero = world.add_character(character_at("Hero", den, Attributes::new(30, 10, 0, 0), 60));
    let wolf = world.add_npc(
        npc_at("Wolf", den, Attributes::new(5, 0, 0, 0), 25)
            .with_experience_reward(40)
            .with_respawn_secs(30),
    );
    let mut ctx = E2EContext::new(world);
    let lifecycle = &ctx.app.use_cases.combat.lifecycle;

    let first = lifecycle.start(den, &[hero.into(), wolf.into()]).await.unwrap();
    ctx.fight_to_the_end(first.id()).await;

    let respawn = &ctx.app.use_cases.respawn;
    assert!(respawn.is_pending(wolf));
    assert_eq!(
        respawn.pending_due_at(wolf),
        Some(fixed_time() + chrono::Duration::seconds(30))
    );

    // Still down: a new fight is refused.
    let refused = lifecycle.start(den, &[hero.into(), wolf.into()]).await;
    assert!(refused.is_err());

    tokio::time::sleep(Duration::from_secs(31)).await;

    let npc = ctx.app.repositories.combatants.get_npc(wolf).await.unwrap().unwrap();
    assert!(npc.is_alive());
    assert_eq!(npc.health().current(), 25);
    assert!(!respawn.is_pending(wolf));
    assert!(ctx
        .take_messages()
        .iter()
        .any(|m| matches!(m, ServerMessage::NpcRespawned { .. })));

    let rematch = ctx
        .app
        .use_cases
        .combat
        .lifecycle
        .start(den, &[hero.into(), wolf.into()])
        .await;
    assert!(rematch.is_ok());
    ctx.app.shutdown();
}

#[tokio::test(start_paused = true)]
async fn restart_rearms_timers_with_the_remaining_delay() {
    let world = TestWorld::new();
    let den = LocationId::new();
    let mut corpse = npc_at("Bear", den, Attributes::new(5, 5, 5, 5), 80).with_respawn_secs(60);
    corpse.mark_dead(fixed_time());
    let bear = world.add_npc(corpse);
    // Never respawns; restore leaves it alone.
    let skeleton = world.add_npc(
        npc_at("Skeleton", den, Attributes::new(5, 5, 5, 5), 20).with_health(Health::new(0, 20).unwrap()),
    );
    world.clock.advance(chrono::Duration::seconds(45));
    let ctx = E2EContext::new(world);

    let summary = ctx.app.restore().await.unwrap();
    assert_eq!(summary.respawns, 1);
    assert_eq!(summary.sessions, 0);
    assert!(!ctx.app.use_cases.respawn.is_pending(skeleton));

    tokio::time::sleep(Duration::from_secs(14)).await;
    let npc = ctx.app.repositories.combatants.get_npc(bear).await.unwrap().unwrap();
    assert!(!npc.is_alive());

    tokio::time::sleep(Duration::from_secs(2)).await;
    let npc = ctx.app.repositories.combatants.get_npc(bear).await.unwrap().unwrap();
    assert!(npc.is_alive());
    ctx.app.shutdown();
}

#[tokio::test(start_paused = true)]
async fn repeated_death_reports_keep_one_timer() {
    let world = TestWorld::new();
    let den = LocationId::new();
    let wolf = world.add_npc(npc_at("Wolf", den, Attributes::new(5, 5, 5, 5), 30).with_respawn_secs(30));
    let mut ctx = E2EContext::new(world);
    let respawn = &ctx.app.use_cases.respawn;

    let first = respawn.handle_death(wolf).await.unwrap();
    ctx.world.clock.advance(chrono::Duration::seconds(10));
    let second = respawn.handle_death(wolf).await.unwrap();
    assert_eq!(first, second);
    assert!(matches!(first, RespawnSchedule::At(_)));

    tokio::time::sleep(Duration::from_secs(31)).await;
    let respawned = ctx
        .take_messages()
        .into_iter()
        .filter(|m| matches!(m, ServerMessage::NpcRespawned { .. }))
        .count();
    assert_eq!(respawned, 1);
    ctx.app.shutdown();
}
