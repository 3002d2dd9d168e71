//! Enemy AI: perception-driven FSM (Patrol / Chase / Attack / Idle)
//!
//! Слои:
//! - perception + animation driver + adapters — чистая логика без ECS
//! - controller + policies (Basic, Humanoid, Robot, Spider)
//! - systems — ECS host: тик контроллеров в FixedUpdate

use bevy::prelude::*;

pub mod adapters;
pub mod animation;
pub mod body;
pub mod controller;
pub mod events;
pub mod perception;
pub mod policy;
pub mod state;
pub mod systems;

#[cfg(test)]
pub(crate) mod test_harness;

// Re-export основных типов
pub use adapters::{AnimationPlayer, DamageReceiver, LayerMask, NavigationAgent, RayHit, RaycastService};
pub use animation::{AnimationDriver, Clip};
pub use body::{AgentBody, TargetInfo};
pub use controller::{EnemyController, EnemyEffect, PatrolRoute, TickContext, TickReport};
pub use events::{AIStateChanged, DamageDealt, EnemyEffectEvent, EnemyStrike, SetEnemyActive};
pub use policy::{BehaviorPolicy, EnemyKind};
pub use state::{AIState, AiMemory};

/// Set с AI системами (backends упорядочиваются относительно него)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnemyAiSystems;

/// Enemy AI Plugin
///
/// Регистрирует AI системы в FixedUpdate для детерминизма.
/// Порядок выполнения:
/// 1. apply_activation_requests — OnEnable/OnDisable
/// 2. acquire_player_targets — захват/сброс цели
/// 3. tick_enemy_controllers — perception, decide, handlers
/// 4. apply_enemy_strikes — EnemyStrike → DamageDealt
pub struct EnemyAiPlugin;

impl Plugin for EnemyAiPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AIStateChanged>()
            .add_event::<EnemyEffectEvent>()
            .add_event::<EnemyStrike>()
            .add_event::<DamageDealt>()
            .add_event::<SetEnemyActive>();

        app.add_systems(
            FixedUpdate,
            (
                systems::apply_activation_requests,
                systems::acquire_player_targets,
                systems::tick_enemy_controllers,
                systems::apply_enemy_strikes,
            )
                .chain() // Последовательное выполнение для детерминизма
                .in_set(EnemyAiSystems),
        );
    }
}
