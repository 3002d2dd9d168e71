//! Жизненный цикл врагов: включение/выключение и захват цели

use bevy::prelude::*;

use crate::ai::adapters::NavigationAgent;
use crate::ai::controller::EnemyController;
use crate::ai::events::SetEnemyActive;
use crate::components::{Player, TrackedTarget};
use crate::navigation::NavAgent;

/// Система: OnEnable / OnDisable по событиям SetEnemyActive
pub fn apply_activation_requests(
    mut requests: EventReader<SetEnemyActive>,
    mut enemies: Query<(&mut EnemyController, Option<&mut NavAgent>)>,
) {
    for request in requests.read() {
        let Ok((mut controller, nav)) = enemies.get_mut(request.entity) else {
            crate::log_warning(&format!(
                "AI: SetEnemyActive for {:?}: no EnemyController",
                request.entity
            ));
            continue;
        };

        if request.active {
            controller.activate();
            crate::log(&format!("AI: {:?} activated", request.entity));
        } else {
            controller.deactivate();
            if let Some(mut nav) = nav {
                nav.stop();
            }
            crate::log(&format!("AI: {:?} deactivated", request.entity));
        }
    }
}

/// Система: пустой TrackedTarget → первый Player; despawned цель → None
pub fn acquire_player_targets(
    mut enemies: Query<(Entity, &mut TrackedTarget), With<EnemyController>>,
    players: Query<Entity, With<Player>>,
    positioned: Query<(), With<Transform>>,
) {
    // min по Entity — не зависим от порядка итерации
    let player = players.iter().min();

    for (entity, mut tracked) in enemies.iter_mut() {
        let current = tracked.0.filter(|target| positioned.contains(*target));
        if tracked.0.is_some() && current.is_none() {
            crate::log(&format!("AI: {:?} lost target {:?} (despawned)", entity, tracked.0));
        }

        let next = current.or(player);
        if tracked.0 != next {
            tracked.0 = next;
        }
    }
}
