//! Encounter: спавн ростера из EncounterConfig + журнал событий прогона
//!
//! Используется headless бинарём и интеграционными тестами.

use std::time::Duration;

use bevy::prelude::*;
use bevy_rapier3d::prelude::Collider;

use crate::ai::controller::{EnemyController, PatrolRoute};
use crate::ai::events::{AIStateChanged, DamageDealt, EnemyEffectEvent};
use crate::ai::EnemyAiSystems;
use crate::animation::Animator;
use crate::components::{Health, Player, TrackedTarget};
use crate::config::{EncounterConfig, EnemySpawn, ObstacleSpawn, TargetSpawn};
use crate::navigation::{NavAgent, PathFollower};
use crate::physics::{layer_groups, ColliderMount};

/// Тело врага (для чужих лучей зрения)
const ENEMY_BODY_RADIUS: f32 = 0.5;

/// Entity ростера после спавна
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncounterEntities {
    pub target: Entity,
    pub enemies: Vec<Entity>,
    pub obstacles: Vec<Entity>,
}

fn vec3(point: [f32; 3]) -> Vec3 {
    Vec3::from_array(point)
}

pub fn spawn_target(world: &mut World, target: &TargetSpawn) -> Entity {
    let mut entity = world.spawn((
        Player,
        Transform::from_translation(vec3(target.position)),
        Health::new(target.health),
        Collider::ball(target.head_radius),
        layer_groups(0),
        ColliderMount::offset(Vec3::Y * target.head_height),
    ));

    if !target.path.is_empty() {
        entity.insert(PathFollower::new(
            target.path.iter().copied().map(vec3).collect(),
            target.speed,
        ));
    }

    entity.id()
}

pub fn spawn_enemy(world: &mut World, spawn: &EnemySpawn) -> Entity {
    let config = spawn.config.clone();
    let idle = config.animations.idle.clone();
    let patrol_speed = config.patrol_speed;
    let route = PatrolRoute::new(spawn.patrol.iter().copied().map(vec3).collect());

    let transform = Transform::from_translation(vec3(spawn.position))
        .with_rotation(Quat::from_rotation_y(spawn.yaw_degrees.to_radians()));

    world
        .spawn((
            EnemyController::new(spawn.kind, config, route),
            transform,
            TrackedTarget::default(),
            NavAgent::new(patrol_speed, 0.0),
            Animator::new(idle),
            Collider::ball(ENEMY_BODY_RADIUS),
            layer_groups(0),
            ColliderMount::offset(Vec3::Y * ENEMY_BODY_RADIUS),
        ))
        .id()
}

pub fn spawn_obstacle(world: &mut World, obstacle: &ObstacleSpawn) -> Entity {
    world
        .spawn((
            Transform::from_translation(vec3(obstacle.position)),
            Collider::ball(obstacle.radius),
            layer_groups(obstacle.layer),
        ))
        .id()
}

/// Спавнит цель, препятствия и врагов (в порядке файла)
pub fn spawn_encounter(world: &mut World, encounter: &EncounterConfig) -> EncounterEntities {
    let target = spawn_target(world, &encounter.target);
    let obstacles = encounter
        .obstacles
        .iter()
        .map(|obstacle| spawn_obstacle(world, obstacle))
        .collect();
    let enemies = encounter
        .enemies
        .iter()
        .map(|enemy| spawn_enemy(world, enemy))
        .collect();

    crate::log_info(&format!(
        "Encounter: spawned target {:?}, {} enemies, {} obstacles",
        target,
        encounter.enemies.len(),
        encounter.obstacles.len()
    ));

    EncounterEntities {
        target,
        enemies,
        obstacles,
    }
}

/// Прогон FixedUpdate без реального времени: каждый тик = один timestep Time<Fixed>
pub fn run_fixed_ticks(app: &mut App, ticks: u32) {
    let step = app
        .world()
        .get_resource::<Time<Fixed>>()
        .map(|fixed| fixed.timestep())
        .unwrap_or(Duration::from_secs_f64(1.0 / 60.0));

    let world = app.world_mut();
    for _ in 0..ticks {
        world.resource_mut::<Time>().advance_by(step);
        world.run_schedule(FixedUpdate);
    }
}

/// Журнал прогона (для итогового отчёта и тестов)
#[derive(Resource, Debug, Clone, Default)]
pub struct EncounterLog {
    pub transitions: Vec<AIStateChanged>,
    pub effects: Vec<EnemyEffectEvent>,
    pub damage: Vec<DamageDealt>,
}

impl EncounterLog {
    pub fn total_damage(&self) -> u32 {
        self.damage.iter().map(|dealt| dealt.damage).sum()
    }

    pub fn transitions_of(&self, entity: Entity) -> Vec<&AIStateChanged> {
        self.transitions
            .iter()
            .filter(|change| change.entity == entity)
            .collect()
    }
}

pub fn record_encounter_events(
    mut log: ResMut<EncounterLog>,
    mut transitions: EventReader<AIStateChanged>,
    mut effects: EventReader<EnemyEffectEvent>,
    mut damage: EventReader<DamageDealt>,
) {
    log.transitions.extend(transitions.read().cloned());
    log.effects.extend(effects.read().cloned());
    log.damage.extend(damage.read().copied());
}

pub struct EncounterLogPlugin;

impl Plugin for EncounterLogPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EncounterLog>().add_systems(
            FixedUpdate,
            record_encounter_events.after(EnemyAiSystems),
        );
    }
}
