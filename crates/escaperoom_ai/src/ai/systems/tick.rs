//! Главная AI система: один тик каждого EnemyController

use bevy::prelude::*;

use crate::ai::adapters::{AnimationPlayer, DamageReceiver, NavigationAgent, RaycastService};
use crate::ai::body::{AgentBody, TargetInfo};
use crate::ai::controller::{EnemyController, EnemyEffect, TickContext};
use crate::ai::events::{AIStateChanged, EnemyEffectEvent, EnemyStrike};
use crate::animation::Animator;
use crate::components::{Health, TrackedTarget};
use crate::navigation::NavAgent;
use crate::physics::ObstacleField;
use crate::DeterministicRng;

/// Система: tick всех врагов
///
/// 1. Собираем adapters (NavAgent, Animator, ObstacleField, Health цели)
/// 2. EnemyController::tick
/// 3. Поворот обратно в Transform, report → события
///
/// Враги обходятся в порядке Entity: RNG потребляется детерминированно.
#[allow(clippy::type_complexity)]
pub fn tick_enemy_controllers(
    time: Res<Time>,
    mut rng: ResMut<DeterministicRng>,
    obstacles: Option<Res<ObstacleField>>,
    mut enemies: Query<(
        Entity,
        &mut EnemyController,
        &mut Transform,
        &TrackedTarget,
        Option<&mut NavAgent>,
        Option<&mut Animator>,
    )>,
    mut targets: Query<(&Transform, Option<&mut Health>), Without<EnemyController>>,
    mut state_events: EventWriter<AIStateChanged>,
    mut effect_events: EventWriter<EnemyEffectEvent>,
    mut strike_events: EventWriter<EnemyStrike>,
) {
    let now = time.elapsed_secs();
    let delta = time.delta_secs();
    let raycast = obstacles
        .as_deref()
        .map(|field| field as &dyn RaycastService);

    let mut order: Vec<Entity> = enemies.iter().map(|(entity, ..)| entity).collect();
    order.sort();

    for entity in order {
        let Ok((_, mut controller, mut transform, tracked, mut nav, mut animator)) =
            enemies.get_mut(entity)
        else {
            continue;
        };

        let target = tracked.get().and_then(|target| {
            targets.get(target).ok().map(|(target_transform, _)| TargetInfo {
                entity: target,
                position: target_transform.translation,
            })
        });
        let mut health = target
            .and_then(|target| targets.get_mut(target.entity).ok())
            .and_then(|(_, health)| health);

        let mut body = AgentBody::new(entity, transform.translation, transform.rotation);
        let report = controller.tick(TickContext {
            now,
            delta,
            body: &mut body,
            target,
            nav: nav
                .as_deref_mut()
                .map(|nav| nav as &mut dyn NavigationAgent),
            animator: animator
                .as_deref_mut()
                .map(|animator| animator as &mut dyn AnimationPlayer),
            raycast,
            damage: health
                .as_deref_mut()
                .map(|health| health as &mut dyn DamageReceiver),
            rng: &mut rng.rng,
        });

        if transform.rotation != body.rotation {
            transform.rotation = body.rotation;
        }

        if report.changed() {
            state_events.write(AIStateChanged {
                entity,
                kind: controller.kind(),
                from: report.previous,
                to: report.state,
            });
        }

        for effect in report.effects {
            if let EnemyEffect::Strike { target, damage } = effect {
                strike_events.write(EnemyStrike {
                    attacker: entity,
                    target,
                    damage,
                });
            }
            effect_events.write(EnemyEffectEvent {
                source: entity,
                effect,
            });
        }
    }
}
