//! Tests for the robot Closing → Rolling → Attack sequence.

use bevy::prelude::*;

use crate::ai::controller::EnemyEffect;
use crate::ai::policy::EnemyKind;
use crate::ai::state::{AIState, RobotPhase, RobotState};
use crate::ai::test_harness::{Harness, DT};
use crate::config::EnemyConfig;

fn phase(harness: &Harness) -> RobotPhase {
    harness
        .controller
        .memory()
        .robot()
        .map(|robot| robot.phase())
        .unwrap_or(RobotPhase::None)
}

fn opens(harness: &Harness) -> usize {
    harness
        .effects()
        .filter(|effect| matches!(effect, EnemyEffect::Open { .. }))
        .count()
}

/// Робот в начале координат, цель в 8 м прямо по курсу
fn robot_facing_target() -> Harness {
    let mut harness = Harness::new(EnemyKind::Robot, EnemyConfig::default(), vec![]);
    harness.move_agent = true;
    harness.target_at(Vec3::new(0.0, 0.0, -8.0));
    harness
}

/// Шагаем, запоминая (время входа, фазу) при каждой смене фазы
fn run_tracking_phases(harness: &mut Harness, seconds: f32) -> Vec<(f32, RobotPhase)> {
    let mut trace = vec![(harness.now, phase(harness))];
    let ticks = (seconds / DT).round() as u32;
    for _ in 0..ticks {
        harness.step();
        let current = phase(harness);
        if trace.last().map(|(_, last)| *last) != Some(current) {
            trace.push((harness.now, current));
        }
    }
    trace
}

#[test]
fn test_engage_sequence_closing_rolling_attack() {
    let mut harness = robot_facing_target();
    let close_duration = harness.controller.config().robot.close_duration;

    let trace = run_tracking_phases(&mut harness, 4.0);
    let phases: Vec<RobotPhase> = trace.iter().map(|(_, phase)| *phase).collect();
    assert_eq!(
        phases,
        vec![RobotPhase::None, RobotPhase::Closing, RobotPhase::Rolling, RobotPhase::None]
    );

    let closing_time = trace[2].0 - trace[1].0;
    assert!(closing_time >= close_duration - 1e-4, "closing {closing_time}");
    assert!(closing_time <= close_duration + 2.0 * DT, "closing {closing_time}");

    assert_eq!(
        harness.state_trace(),
        vec![AIState::Patrol, AIState::Chase, AIState::Attack]
    );
    let distance = harness.body.position.distance(Vec3::new(0.0, 0.0, -8.0));
    assert!(distance <= harness.controller.config().attack_range);

    assert_eq!(opens(&harness), 1);
    assert!(harness.controller.memory().robot().is_some_and(|robot| robot.has_opened));

    let order: Vec<&str> = harness.animator.fades.iter().map(String::as_str).collect();
    assert_eq!(order, ["Idle", "Close", "Roll", "Open"]);
}

#[test]
fn test_closing_holds_position_and_rolling_uses_roll_speed() {
    let mut harness = robot_facing_target();
    harness.run_until(1.0, |h| phase(h) == RobotPhase::Closing);

    let held = harness.body.position;
    harness.run(0.3);
    assert_eq!(phase(&harness), RobotPhase::Closing);
    assert_eq!(harness.body.position, held);
    assert!(harness.nav.agent.is_stopped());

    harness.run_until(1.0, |h| phase(h) == RobotPhase::Rolling);
    assert_eq!(harness.nav.agent.speed, harness.controller.config().robot.roll_speed);
    assert_eq!(harness.nav.destinations.last(), Some(&Vec3::new(0.0, 0.0, -8.0)));
}

#[test]
fn test_reengage_passes_through_closing_and_rolling() {
    let mut harness = robot_facing_target();
    harness.run_until(4.0, |h| opens(h) == 1);
    assert_eq!(harness.state(), AIState::Attack);

    // отходим за attack_range + exit_buffer, оставаясь в поле зрения
    let retreat = Vec3::new(0.0, 0.0, harness.body.position.z - 6.0);
    harness.target_at(retreat);

    let trace = run_tracking_phases(&mut harness, 4.0);
    let phases: Vec<RobotPhase> = trace.iter().map(|(_, phase)| *phase).collect();
    assert_eq!(
        phases,
        vec![RobotPhase::None, RobotPhase::Closing, RobotPhase::Rolling, RobotPhase::None]
    );
    assert_eq!(opens(&harness), 2);
    assert_eq!(harness.state(), AIState::Attack);
}

#[test]
fn test_opens_once_while_attacking() {
    let mut harness = robot_facing_target();
    harness.run_until(4.0, |h| opens(h) == 1);

    harness.run(3.0);
    assert_eq!(opens(&harness), 1);
    assert_eq!(harness.animator.count("Open"), 1);
}

#[test]
fn test_losing_sight_while_closing_returns_to_patrol() {
    let mut harness = robot_facing_target();
    harness.run_until(1.0, |h| phase(h) == RobotPhase::Closing);

    harness.add_wall(Vec3::new(0.0, 1.0, -4.0), 0.6);
    let back = harness.run_until(1.0, |h| h.state() == AIState::Patrol);

    assert!(back);
    assert_eq!(harness.controller.memory().robot(), Some(&RobotState::default()));
    assert_eq!(harness.nav.agent.speed, harness.controller.config().patrol_speed);
}

#[test]
fn test_losing_target_clears_flags() {
    let mut harness = robot_facing_target();
    harness.run_until(2.0, |h| phase(h) == RobotPhase::Rolling);

    harness.clear_target();
    harness.run_until(1.0, |h| h.state() == AIState::Patrol);

    assert_eq!(harness.controller.memory().robot(), Some(&RobotState::default()));
}

#[test]
fn test_deactivation_resets_sub_state() {
    let mut harness = robot_facing_target();
    harness.run_until(2.0, |h| phase(h) == RobotPhase::Rolling);

    harness.controller.deactivate();
    assert_eq!(harness.controller.memory().robot(), Some(&RobotState::default()));

    harness.controller.activate();
    assert_eq!(phase(&harness), RobotPhase::None);
}

#[test]
fn test_target_walking_into_range_opens() {
    let mut harness = Harness::new(EnemyKind::Robot, EnemyConfig::default(), vec![]);
    // сбоку и вплотную: attack по дистанции, без закрытия
    harness.target_at(Vec3::new(1.0, 0.0, 0.0));
    harness.run(1.0);

    assert_eq!(harness.state(), AIState::Attack);
    assert_eq!(opens(&harness), 1);
    assert!(!harness.state_trace().contains(&AIState::Chase));
}

#[test]
fn test_losing_sight_in_attack_reissues_patrol_waypoint() {
    let waypoint = Vec3::new(5.0, 0.0, 5.0);
    let config = EnemyConfig {
        detection_cooldown: 0.0,
        ..Default::default()
    };
    let mut harness = Harness::new(EnemyKind::Robot, config, vec![waypoint]);
    harness.move_agent = true;
    harness.target_at(Vec3::new(0.0, 0.0, -8.0));
    harness.run_until(4.0, |h| opens(h) == 1);
    assert_eq!(harness.state(), AIState::Attack);
    assert_eq!(harness.nav.destinations.last(), Some(&Vec3::new(0.0, 0.0, -8.0)));

    // цель отходит на 6 м за стену
    let z = harness.body.position.z;
    harness.add_wall(Vec3::new(0.0, 1.0, z - 3.0), 0.6);
    harness.target_at(Vec3::new(0.0, 0.0, z - 6.0));
    let back = harness.run_until(1.0, |h| h.state() == AIState::Patrol);

    assert!(back);
    assert_eq!(harness.nav.destinations.last(), Some(&waypoint));
    assert!(!harness.nav.agent.is_stopped());
    assert_eq!(harness.nav.agent.speed, harness.controller.config().patrol_speed);
    assert_eq!(harness.controller.memory().robot(), Some(&RobotState::default()));
}
