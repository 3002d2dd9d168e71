//! EscapeRoom enemy AI
//!
//! ECS-симуляция на Bevy 0.16: враги (Basic, Humanoid, Robot, Spider)
//! с FSM Patrol / Chase / Attack / Idle, зрением через raycast и
//! переходами анимаций через crossfade.
//!
//! Движок подключается через adapters (`ai::adapters`):
//! - NavigationAgent, AnimationPlayer, RaycastService, DamageReceiver
//! - в этом крейте есть headless backends (navigation, animation, physics)

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod animation;
pub mod components;
pub mod config;
pub mod encounter;
pub mod logger;
pub mod navigation;
pub mod physics;

// Re-export базовых типов для удобства
pub use ai::{
    AIState, AIStateChanged, DamageDealt, EnemyAiPlugin, EnemyAiSystems, EnemyController,
    EnemyEffect, EnemyEffectEvent, EnemyKind, EnemyStrike, PatrolRoute, SetEnemyActive,
};
pub use animation::Animator;
pub use components::*;
pub use config::{ConfigError, EncounterConfig, EnemyConfig};
pub use encounter::{run_fixed_ticks, spawn_encounter, EncounterEntities, EncounterLog, EncounterLogPlugin};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, log_with_level, set_log_level, set_logger,
    set_logger_if_needed, LogLevel, LogPrinter,
};
pub use navigation::{NavAgent, PathFollower};
pub use physics::{ColliderMount, ObstacleField};

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            // Детерминистичный RNG (seed по умолчанию)
            .insert_resource(DeterministicRng::new(42))
            .add_plugins((EnemyAiPlugin, HeadlessBackendPlugin));
    }
}

/// Headless backends: raycast по rapier коллайдерам, прямолинейная навигация, animator
///
/// Порядок в FixedUpdate:
/// 1. sync_obstacle_field — до AI (зрение видит позиции этого тика)
/// 2. EnemyAiSystems
/// 3. follow_paths, advance_nav_agents, advance_animators
pub struct HeadlessBackendPlugin;

impl Plugin for HeadlessBackendPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<physics::ObstacleField>()
            .add_systems(
                FixedUpdate,
                physics::sync_obstacle_field.before(EnemyAiSystems),
            )
            .add_systems(
                FixedUpdate,
                (
                    navigation::follow_paths,
                    navigation::advance_nav_agents,
                    animation::advance_animators,
                )
                    .chain()
                    .after(EnemyAiSystems),
            );
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins((MinimalPlugins, SimulationPlugin))
        // seed перекрывает default из SimulationPlugin
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
