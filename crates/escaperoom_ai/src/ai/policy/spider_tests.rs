//! Tests for the stationary spider.

use bevy::prelude::*;
use rand::rngs::mock::StepRng;

use crate::ai::controller::EnemyEffect;
use crate::ai::policy::EnemyKind;
use crate::ai::state::AIState;
use crate::ai::test_harness::Harness;
use crate::config::EnemyConfig;

fn spider() -> Harness {
    Harness::new(EnemyKind::Spider, EnemyConfig::default(), vec![])
}

#[test]
fn test_chase_never_sets_destination() {
    let targets = [
        None,
        Some(Vec3::new(0.0, 0.0, -1.0)),
        Some(Vec3::new(0.0, 0.0, -5.0)),
        Some(Vec3::new(0.0, 0.0, 30.0)),
    ];

    for target in targets {
        let config = EnemyConfig {
            // decide_state никогда не вызывается — состояние держим вручную
            detection_cooldown: 1000.0,
            ..Default::default()
        };
        let mut harness = Harness::new(EnemyKind::Spider, config, vec![]);
        if let Some(position) = target {
            harness.target_at(position);
        }
        harness.controller.set_state(AIState::Chase);
        harness.run(2.0);

        assert_eq!(harness.state(), AIState::Chase);
        assert!(harness.nav.destinations.is_empty(), "target {target:?}");
        assert!(harness.nav.agent.is_stopped());
        assert_eq!(harness.animator.playing.as_deref(), Some("Idle"));
    }
}

#[test]
fn test_visible_target_means_idle_and_watch() {
    let mut harness = spider();
    let position = Vec3::new(2.0, 0.0, -5.0);
    harness.target_at(position);
    harness.run(2.0);

    assert_eq!(harness.state(), AIState::Idle);
    assert!(harness.nav.destinations.is_empty());
    let expected = Vec3::new(position.x, 0.0, position.z).normalize();
    assert!(harness.body.forward().abs_diff_eq(expected, 1e-2));
}

#[test]
fn test_idle_promotes_to_attack_without_waiting_for_detection() {
    let mut harness = spider();
    harness.target_at(Vec3::new(0.0, 0.0, -5.0));
    harness.run_until(1.0, |h| h.state() == AIState::Idle);
    let last_check = harness.controller.memory().last_detection_time;

    harness.target_at(Vec3::new(0.0, 0.0, -1.5));
    harness.step();

    assert_eq!(harness.state(), AIState::Attack);
    assert_eq!(harness.controller.memory().last_detection_time, last_check);
}

#[test]
fn test_attack_damages_through_receiver() {
    let mut harness = spider();
    harness.target_at(Vec3::new(0.0, 0.0, -1.0));
    harness.run(3.0);

    assert_eq!(harness.health.received, vec![10, 10, 10]);
    let strikes = harness
        .effects()
        .filter(|effect| matches!(effect, EnemyEffect::Strike { damage: 10, .. }))
        .count();
    assert_eq!(strikes, 3);
}

#[test]
fn test_random_source_picks_attack_animation() {
    // gen::<f32>() == 0.0 < 0.5 → альтернативная
    let mut harness = spider();
    harness.target_at(Vec3::new(0.0, 0.0, -1.0));
    harness.run(0.5);
    assert_eq!(harness.animator.count("Attack2"), 1);
    assert_eq!(harness.animator.count("Attack1"), 0);

    // gen::<f32>() ≈ 1.0 → основная
    let mut harness = spider();
    harness.rng = StepRng::new(u64::MAX, 0);
    harness.target_at(Vec3::new(0.0, 0.0, -1.0));
    harness.run(0.5);
    assert_eq!(harness.animator.count("Attack1"), 1);
    assert_eq!(harness.animator.count("Attack2"), 0);
}

#[test]
fn test_zero_alt_chance_always_primary() {
    let config = EnemyConfig {
        spider: crate::config::SpiderTuning {
            attack_alt_chance: 0.0,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut harness = Harness::new(EnemyKind::Spider, config, vec![]);
    harness.target_at(Vec3::new(0.0, 0.0, -1.0));
    harness.run(3.0);

    assert!(harness.animator.count("Attack1") >= 1);
    assert_eq!(harness.animator.count("Attack2"), 0);
}

#[test]
fn test_attack_exit_to_idle_when_visible() {
    let mut harness = spider();
    harness.target_at(Vec3::new(0.0, 0.0, -1.0));
    harness.run(0.5);
    assert_eq!(harness.state(), AIState::Attack);

    harness.target_at(Vec3::new(0.0, 0.0, -4.0));
    harness.step();
    assert_eq!(harness.state(), AIState::Idle);
}

#[test]
fn test_attack_exit_to_patrol_when_hidden() {
    let mut harness = spider();
    harness.target_at(Vec3::new(0.0, 0.0, -1.0));
    harness.run(0.5);

    harness.target_at(Vec3::new(0.0, 0.0, -6.0));
    harness.add_wall(Vec3::new(0.0, 1.0, -3.0), 0.5);
    harness.run(0.5);

    assert_eq!(harness.state(), AIState::Patrol);
}
