//! Humanoid: осмотр на каждой точке патруля + задержка реакции перед погоней
//!
//! Scanning: стоим, yaw качается треугольной волной ±scan_angle/2 со скоростью
//! scan_speed (°/с) до look_duration. Perception во время осмотра — каждый тик.
//! Заметил → Find анимация + ScheduledAction(Chase) через reaction_delay.

use bevy::prelude::*;

use crate::ai::animation::Clip;
use crate::ai::controller::{AiTick, EnemyEffect};
use crate::ai::policy::{base, BehaviorPolicy, EnemyKind};
use crate::ai::state::{AIState, ScheduledAction};

#[derive(Debug, Clone, Copy, Default)]
pub struct HumanoidPolicy;

impl BehaviorPolicy for HumanoidPolicy {
    fn kind(&self) -> EnemyKind {
        EnemyKind::Humanoid
    }

    fn decide_state(&self, ai: &mut AiTick<'_, '_>, seen: bool) -> AIState {
        // Реакция уже запланирована — держим текущее состояние (кроме attack по дистанции)
        if ai.memory.pending.is_some() {
            if let Some(distance) = ai.distance_to_target() {
                if !ai.in_attack_band(distance) {
                    return ai.memory.state;
                }
            }
        }

        let next = base::decide_state(ai, seen);
        if next != AIState::Patrol {
            ai.memory.humanoid_mut().scanning = false;
        }
        if next == AIState::Attack {
            // цель дошла сама: отложенная погоня больше не нужна
            ai.memory.pending = None;
        }
        next
    }

    fn handle_patrol(&self, ai: &mut AiTick<'_, '_>) {
        if ai.memory.humanoid().is_some_and(|h| h.scanning) {
            look_around(ai);
            return;
        }

        // Ждём срабатывания реакции на месте
        if ai.memory.pending.is_some() && ai.target().is_some() {
            ai.stop_movement();
            return;
        }

        if ai.route.is_empty() || !ai.has_navigation() {
            ai.stop_movement();
            ai.play(Clip::Idle);
            return;
        }

        ai.resume_movement();
        ai.set_speed(ai.config.patrol_speed);
        ai.set_stopping_distance(ai.memory.default_stopping_distance);

        if ai.arrived() {
            start_look(ai);
        } else {
            ai.play(Clip::Walk);
        }
    }

    /// Без throttle: destination каждый тик
    fn handle_chase(&self, ai: &mut AiTick<'_, '_>) {
        let Some(target) = ai.target() else {
            return;
        };
        if !ai.has_navigation() {
            return;
        }

        ai.resume_movement();
        ai.set_speed(ai.config.chase_speed);
        ai.set_stopping_distance(ai.config.stopping_distance_attack);
        ai.move_to(target.position);

        ai.play(Clip::Run);
    }
}

fn start_look(ai: &mut AiTick<'_, '_>) {
    let (now, yaw) = (ai.now(), ai.body().yaw());
    let scan = ai.memory.humanoid_mut();
    scan.scanning = true;
    scan.scan_start_time = now;
    scan.base_yaw = yaw;

    ai.stop_movement();
    ai.play(Clip::Look);
}

fn look_around(ai: &mut AiTick<'_, '_>) {
    let config = ai.config;
    let tuning = &config.humanoid;
    let scan = *ai.memory.humanoid_mut();
    let elapsed = ai.now() - scan.scan_start_time;

    let offset = ping_pong(elapsed * tuning.scan_speed, tuning.scan_angle) - tuning.scan_angle * 0.5;
    ai.body_mut().rotation = Quat::from_rotation_y(scan.base_yaw + offset.to_radians());

    // Во время осмотра perception без throttle
    if ai.perceive() {
        ai.memory.humanoid_mut().scanning = false;
        ai.play(Clip::Find);

        let fire_at = ai.now() + tuning.reaction_delay;
        ai.memory.pending = Some(ScheduledAction {
            fire_at,
            state: AIState::Chase,
        });
        if let Some(target) = ai.target() {
            crate::log(&format!(
                "AI: {:?} spotted {:?} while scanning, chase at {:.2}",
                ai.body().entity,
                target.entity,
                fire_at
            ));
            ai.emit(EnemyEffect::Alerted {
                target: target.entity,
            });
        }
        return;
    }

    if elapsed >= tuning.look_duration {
        ai.memory.humanoid_mut().scanning = false;
        ai.advance_waypoint();
        ai.resume_movement();
        ai.play(Clip::Walk);
    }
}

/// Треугольная волна 0 → length → 0 с периодом 2·length
pub fn ping_pong(t: f32, length: f32) -> f32 {
    if length <= 0.0 {
        return 0.0;
    }
    let wrapped = t.rem_euclid(length * 2.0);
    length - (wrapped - length).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_pong() {
        assert_eq!(ping_pong(0.0, 180.0), 0.0);
        assert_eq!(ping_pong(90.0, 180.0), 90.0);
        assert_eq!(ping_pong(180.0, 180.0), 180.0);
        assert_eq!(ping_pong(270.0, 180.0), 90.0);
        assert_eq!(ping_pong(360.0, 180.0), 0.0);
        assert_eq!(ping_pong(5.0, 0.0), 0.0);
    }
}
