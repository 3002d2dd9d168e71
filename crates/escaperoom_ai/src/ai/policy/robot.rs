//! Robot: трёхфазный engage под состоянием Chase
//!
//! Closing (сворачивается на месте, close_duration) → Rolling (катится на
//! roll_speed) → Attack (раскрывается один раз за вход в Attack).

use crate::ai::animation::Clip;
use crate::ai::controller::{AiTick, EnemyEffect};
use crate::ai::policy::{base, BehaviorPolicy, EnemyKind};
use crate::ai::state::{AIState, RobotState};

/// Минимальная длительность сворачивания (секунды)
const MIN_CLOSE_DURATION: f32 = 0.01;

#[derive(Debug, Clone, Copy, Default)]
pub struct RobotPolicy;

impl BehaviorPolicy for RobotPolicy {
    fn kind(&self) -> EnemyKind {
        EnemyKind::Robot
    }

    fn decide_state(&self, ai: &mut AiTick<'_, '_>, seen: bool) -> AIState {
        let Some(distance) = ai.distance_to_target() else {
            disengage(ai);
            return AIState::Patrol;
        };

        if ai.in_attack_band(distance) {
            let entering = ai.memory.state != AIState::Attack;
            let robot = ai.memory.robot_mut();
            robot.closing = false;
            robot.rolling = false;
            if entering {
                robot.has_opened = false;
            }
            return AIState::Attack;
        }

        if seen {
            if !ai.memory.robot_mut().is_engaging() {
                begin_closing(ai);
                ai.memory.robot_mut().has_opened = false;
            }
            return AIState::Chase;
        }

        disengage(ai);
        AIState::Patrol
    }

    fn handle_chase(&self, ai: &mut AiTick<'_, '_>) {
        let Some(target) = ai.target() else {
            reset_flags(ai);
            ai.set_state(AIState::Patrol);
            return;
        };

        let robot = *ai.memory.robot_mut();

        if robot.closing {
            ai.play(Clip::Close);
            ai.face_target();
            if ai.now() >= robot.close_end_time {
                ai.memory.robot_mut().closing = false;
                start_rolling(ai);
            }
            return;
        }

        if robot.rolling {
            ai.resume_movement();
            ai.set_speed(ai.config.robot.roll_speed);
            ai.play(Clip::Roll);
            ai.retarget_throttled();

            let distance = ai.body().position.distance(target.position);
            if distance <= ai.config.attack_range {
                let robot = ai.memory.robot_mut();
                robot.rolling = false;
                robot.has_opened = false;
                ai.stop_movement();
                ai.set_state(AIState::Attack);
                crate::log(&format!("AI: {:?} robot rolled into range", ai.body().entity));
            }
            return;
        }

        base::chase(ai);
    }

    fn handle_attack(&self, ai: &mut AiTick<'_, '_>) {
        let Some(target) = ai.target() else {
            reset_flags(ai);
            ai.set_state(AIState::Patrol);
            return;
        };

        if !ai.memory.robot_mut().has_opened {
            ai.stop_movement();
            ai.play(Clip::Open);
            ai.memory.robot_mut().has_opened = true;
            crate::log(&format!(
                "AI: {:?} robot opens at {:?}",
                ai.body().entity,
                target.entity
            ));
            ai.emit(EnemyEffect::Open {
                target: target.entity,
            });
            return;
        }

        let distance = ai.body().position.distance(target.position);
        if !ai.beyond_attack_exit(distance) {
            return;
        }

        if ai.memory.target_visible {
            begin_closing(ai);
            ai.set_state(AIState::Chase);
        } else {
            ai.set_state(AIState::Patrol);
            return_to_patrol(ai);
        }
    }
}

fn begin_closing(ai: &mut AiTick<'_, '_>) {
    let close_end_time = ai.now() + ai.config.robot.close_duration.max(MIN_CLOSE_DURATION);
    let robot = ai.memory.robot_mut();
    robot.closing = true;
    robot.rolling = false;
    robot.close_end_time = close_end_time;

    ai.stop_movement();
    ai.play(Clip::Close);
    crate::log(&format!("AI: {:?} robot closing", ai.body().entity));
}

fn start_rolling(ai: &mut AiTick<'_, '_>) {
    ai.resume_movement();
    ai.set_speed(ai.config.robot.roll_speed);
    ai.memory.last_path_update_time = ai.now();
    let destination = ai
        .target()
        .map(|target| target.position)
        .unwrap_or(ai.body().position);
    ai.move_to(destination);

    ai.memory.robot_mut().rolling = true;
    ai.play(Clip::Roll);
    crate::log(&format!("AI: {:?} robot rolling", ai.body().entity));
}

/// Потеряли цель посреди engage или в Attack: сброс + обратно к патрулю
fn disengage(ai: &mut AiTick<'_, '_>) {
    if ai.memory.state != AIState::Patrol || ai.memory.robot_mut().is_engaging() {
        return_to_patrol(ai);
    }
}

/// Сброс флагов, скорость патруля и destination обратно на текущий waypoint
fn return_to_patrol(ai: &mut AiTick<'_, '_>) {
    reset_flags(ai);
    ai.resume_movement();
    ai.set_speed(ai.config.patrol_speed);
    if let Some(waypoint) = ai.current_waypoint() {
        ai.move_to(waypoint);
    }
}

fn reset_flags(ai: &mut AiTick<'_, '_>) {
    *ai.memory.robot_mut() = RobotState::default();
}
