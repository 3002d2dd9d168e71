//! Spider: стационарный атакующий, никогда не преследует
//!
//! Видит цель → Idle (стоит и смотрит), в радиусе → Attack с двумя
//! вариантами анимации (random) и уроном через DamageReceiver.

use rand::Rng;

use crate::ai::animation::Clip;
use crate::ai::controller::{AiTick, EnemyEffect};
use crate::ai::policy::{base, BehaviorPolicy, EnemyKind};
use crate::ai::state::AIState;

#[derive(Debug, Clone, Copy, Default)]
pub struct SpiderPolicy;

impl BehaviorPolicy for SpiderPolicy {
    fn kind(&self) -> EnemyKind {
        EnemyKind::Spider
    }

    fn decide_state(&self, ai: &mut AiTick<'_, '_>, seen: bool) -> AIState {
        let Some(distance) = ai.distance_to_target() else {
            return AIState::Patrol;
        };

        if ai.in_attack_band(distance) {
            AIState::Attack
        } else if seen {
            AIState::Idle
        } else {
            AIState::Patrol
        }
    }

    /// Погони нет: стоим
    fn handle_chase(&self, ai: &mut AiTick<'_, '_>) {
        ai.stop_movement();
        ai.play(Clip::Idle);
    }

    fn handle_idle(&self, ai: &mut AiTick<'_, '_>) {
        ai.stop_movement();
        ai.play(Clip::Idle);

        let Some(distance) = ai.distance_to_target() else {
            return;
        };

        if ai.memory.target_visible {
            ai.face_target();
        }

        // дистанция каждый тик, мимо detection throttle
        if distance <= ai.config.attack_range {
            ai.set_state(AIState::Attack);
        }
    }

    fn handle_attack(&self, ai: &mut AiTick<'_, '_>) {
        let Some(target) = ai.target() else {
            ai.set_state(AIState::Patrol);
            return;
        };

        ai.stop_movement();
        ai.face_target();

        if base::attack_ready(ai) {
            ai.memory.last_attack_time = ai.now();

            let alternate = ai.cx.rng.gen::<f32>() < ai.config.spider.attack_alt_chance;
            ai.play(if alternate {
                Clip::AttackAlternate
            } else {
                Clip::AttackPrimary
            });

            let damage = ai.config.spider.attack_damage;
            if let Some(receiver) = ai.cx.damage.as_deref_mut() {
                receiver.take_damage(damage);
            }
            crate::log(&format!(
                "AI: {:?} spider bites {:?} for {}",
                ai.body().entity,
                target.entity,
                damage
            ));
            ai.emit(EnemyEffect::Strike {
                target: target.entity,
                damage,
            });
        }

        let distance = ai.body().position.distance(target.position);
        if ai.beyond_attack_exit(distance) {
            let next = if ai.memory.target_visible {
                AIState::Idle
            } else {
                AIState::Patrol
            };
            ai.set_state(next);
        }
    }
}
