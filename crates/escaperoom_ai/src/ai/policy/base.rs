//! Базовое поведение (default методы `BehaviorPolicy`)

use crate::ai::animation::Clip;
use crate::ai::controller::{AiTick, EnemyEffect};
use crate::ai::state::AIState;

/// Нет цели → Patrol; в attack band → Attack (приоритет); видим → Chase; иначе Patrol
pub fn decide_state(ai: &mut AiTick<'_, '_>, seen: bool) -> AIState {
    let Some(distance) = ai.distance_to_target() else {
        return AIState::Patrol;
    };

    if ai.in_attack_band(distance) {
        AIState::Attack
    } else if seen {
        AIState::Chase
    } else {
        AIState::Patrol
    }
}

pub fn patrol(ai: &mut AiTick<'_, '_>) {
    if ai.route.is_empty() || !ai.has_navigation() {
        ai.stop_movement();
        ai.play(Clip::Idle);
        return;
    }

    ai.resume_movement();
    ai.set_speed(ai.config.patrol_speed);
    ai.set_stopping_distance(ai.memory.default_stopping_distance);

    if ai.arrived() {
        ai.advance_waypoint();
    }

    ai.play(Clip::Walk);
}

pub fn chase(ai: &mut AiTick<'_, '_>) {
    if ai.target().is_none() || !ai.has_navigation() {
        return;
    }

    ai.resume_movement();
    ai.set_speed(ai.config.chase_speed);
    ai.set_stopping_distance(ai.config.stopping_distance_attack);
    ai.retarget_throttled();

    ai.play(Clip::Run);
}

pub fn attack(ai: &mut AiTick<'_, '_>) {
    let Some(target) = ai.target() else {
        return;
    };

    ai.stop_movement();
    ai.face_target();
    ai.play(Clip::Attack);

    if attack_ready(ai) {
        ai.memory.last_attack_time = ai.now();
        crate::log(&format!(
            "AI: {:?} attacks {:?}",
            ai.body().entity,
            target.entity
        ));
        ai.emit(EnemyEffect::Strike {
            target: target.entity,
            damage: 0,
        });
    }

    if let Some(distance) = ai.distance_to_target() {
        if ai.beyond_attack_exit(distance) {
            ai.set_state(AIState::Chase);
            ai.resume_movement();
        }
    }
}

pub fn idle(ai: &mut AiTick<'_, '_>) {
    ai.stop_movement();
    ai.play(Clip::Idle);
}

/// attack_cooldown прошёл с последней атаки
pub fn attack_ready(ai: &AiTick<'_, '_>) -> bool {
    ai.now() - ai.memory.last_attack_time >= ai.config.attack_cooldown
}
