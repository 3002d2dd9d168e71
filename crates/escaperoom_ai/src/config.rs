//! Настройки врагов (per-agent tuning) + encounter roster
//!
//! Все значения по умолчанию — тюнинг префабов врагов.
//! Формат файлов: TOML, любое поле можно опустить (`#[serde(default)]`).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::ai::adapters::LayerMask;
use crate::ai::animation::Clip;
use crate::ai::policy::EnemyKind;

/// Ошибки загрузки/валидации конфига
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn ensure_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("expected a finite value >= 0, got {}", value)))
    }
}

/// Зрение: дальность, угол конуса, высота глаз, маска препятствий
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Дальность зрения (метры)
    pub view_distance: f32,
    /// Полный угол конуса (градусы, симметрично вокруг forward)
    pub view_angle: f32,
    /// Высота луча над pivot'ом (и у агента, и у цели)
    pub eye_height: f32,
    /// Пустая маска = все слои
    pub obstacle_mask: LayerMask,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            view_distance: 10.0,
            view_angle: 60.0,
            eye_height: 1.0,
            obstacle_mask: LayerMask::EMPTY,
        }
    }
}

/// Имена состояний animation engine'а
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct AnimationSet {
    pub idle: String,
    pub walk: String,
    pub run: String,
    pub attack: String,
    // Humanoid
    pub look: String,
    pub find: String,
    // Robot
    pub close: String,
    pub roll: String,
    pub open: String,
    // Spider
    pub attack_primary: String,
    pub attack_alternate: String,
}

impl Default for AnimationSet {
    fn default() -> Self {
        Self {
            idle: "Idle".into(),
            walk: "Walk".into(),
            run: "Run".into(),
            attack: "Attack".into(),
            look: "Look".into(),
            find: "Find".into(),
            close: "Close".into(),
            roll: "Roll".into(),
            open: "Open".into(),
            attack_primary: "Attack1".into(),
            attack_alternate: "Attack2".into(),
        }
    }
}

impl AnimationSet {
    pub fn name(&self, clip: Clip) -> &str {
        match clip {
            Clip::Idle => &self.idle,
            Clip::Walk => &self.walk,
            Clip::Run => &self.run,
            Clip::Attack => &self.attack,
            Clip::Look => &self.look,
            Clip::Find => &self.find,
            Clip::Close => &self.close,
            Clip::Roll => &self.roll,
            Clip::Open => &self.open,
            Clip::AttackPrimary => &self.attack_primary,
            Clip::AttackAlternate => &self.attack_alternate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct HumanoidTuning {
    /// Амплитуда осмотра (градусы, полный размах)
    pub scan_angle: f32,
    /// Скорость поворота головы (градусы/сек)
    pub scan_speed: f32,
    /// Сколько длится осмотр на точке патруля (секунды)
    pub look_duration: f32,
    /// Задержка между "нашёл" и переходом в Chase (секунды)
    pub reaction_delay: f32,
}

impl Default for HumanoidTuning {
    fn default() -> Self {
        Self {
            scan_angle: 180.0,
            scan_speed: 60.0,
            look_duration: 3.0,
            reaction_delay: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct RobotTuning {
    /// Время сворачивания в шар перед разгоном
    pub close_duration: f32,
    /// Скорость качения
    pub roll_speed: f32,
}

impl Default for RobotTuning {
    fn default() -> Self {
        Self {
            close_duration: 0.6,
            roll_speed: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct SpiderTuning {
    /// Вероятность альтернативной анимации атаки [0, 1]
    pub attack_alt_chance: f32,
    /// Урон за укус
    pub attack_damage: u32,
}

impl Default for SpiderTuning {
    fn default() -> Self {
        Self {
            attack_alt_chance: 0.5,
            attack_damage: 10,
        }
    }
}

/// Полный набор параметров одного врага
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct EnemyConfig {
    // Nav & Movement
    pub patrol_speed: f32,
    pub chase_speed: f32,
    pub stopping_distance_attack: f32,
    /// Минимальный интервал между пересчётами пути в погоне (секунды)
    pub path_update_rate: f32,

    // Vision
    pub perception: PerceptionConfig,
    /// Throttle для проверки зрения (секунды)
    pub detection_cooldown: f32,

    // Attack
    pub attack_cooldown: f32,
    pub attack_range: f32,
    /// Гистерезис: выходим из Attack только при distance > attack_range + attack_exit_buffer
    pub attack_exit_buffer: f32,

    pub rotation_speed: f32,
    pub crossfade_duration: f32,
    pub animations: AnimationSet,

    pub humanoid: HumanoidTuning,
    pub robot: RobotTuning,
    pub spider: SpiderTuning,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            patrol_speed: 2.0,
            chase_speed: 4.0,
            stopping_distance_attack: 1.8,
            path_update_rate: 0.25,
            perception: PerceptionConfig::default(),
            detection_cooldown: 0.2,
            attack_cooldown: 1.2,
            attack_range: 1.8,
            attack_exit_buffer: 0.5,
            rotation_speed: 8.0,
            crossfade_duration: 0.15,
            animations: AnimationSet::default(),
            humanoid: HumanoidTuning::default(),
            robot: RobotTuning::default(),
            spider: SpiderTuning::default(),
        }
    }
}

impl EnemyConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read_file(path.as_ref())?)
    }

    /// Порог выхода из Attack
    pub fn attack_exit_range(&self) -> f32 {
        self.attack_range + self.attack_exit_buffer
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_negative("patrol_speed", self.patrol_speed)?;
        ensure_non_negative("chase_speed", self.chase_speed)?;
        ensure_non_negative("stopping_distance_attack", self.stopping_distance_attack)?;
        ensure_non_negative("path_update_rate", self.path_update_rate)?;
        ensure_non_negative("perception.view_distance", self.perception.view_distance)?;
        ensure_non_negative("perception.eye_height", self.perception.eye_height)?;
        ensure_non_negative("detection_cooldown", self.detection_cooldown)?;
        ensure_non_negative("attack_cooldown", self.attack_cooldown)?;
        ensure_non_negative("attack_range", self.attack_range)?;
        ensure_non_negative("attack_exit_buffer", self.attack_exit_buffer)?;
        ensure_non_negative("rotation_speed", self.rotation_speed)?;
        ensure_non_negative("crossfade_duration", self.crossfade_duration)?;
        ensure_non_negative("humanoid.scan_angle", self.humanoid.scan_angle)?;
        ensure_non_negative("humanoid.scan_speed", self.humanoid.scan_speed)?;
        ensure_non_negative("humanoid.look_duration", self.humanoid.look_duration)?;
        ensure_non_negative("humanoid.reaction_delay", self.humanoid.reaction_delay)?;
        ensure_non_negative("robot.close_duration", self.robot.close_duration)?;
        ensure_non_negative("robot.roll_speed", self.robot.roll_speed)?;

        if !(0.0..=360.0).contains(&self.perception.view_angle) {
            return Err(invalid(
                "perception.view_angle",
                format!("expected degrees in [0, 360], got {}", self.perception.view_angle),
            ));
        }

        if !(0.0..=1.0).contains(&self.spider.attack_alt_chance) {
            return Err(invalid(
                "spider.attack_alt_chance",
                format!("expected probability in [0, 1], got {}", self.spider.attack_alt_chance),
            ));
        }

        Ok(())
    }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Один враг в encounter файле
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub position: [f32; 3],
    /// Поворот вокруг Y (градусы, 0 = смотрим в -Z)
    #[serde(default)]
    pub yaw_degrees: f32,
    #[serde(default)]
    pub patrol: Vec<[f32; 3]>,
    #[serde(default)]
    pub config: EnemyConfig,
}

/// Цель (игрок): старт + маршрут, по которому её ведёт сценарий
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSpawn {
    pub position: [f32; 3],
    pub path: Vec<[f32; 3]>,
    pub speed: f32,
    pub health: u32,
    /// Коллайдер головы: высота центра над pivot'ом и радиус
    pub head_height: f32,
    pub head_radius: f32,
}

impl Default for TargetSpawn {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            path: Vec::new(),
            speed: 1.5,
            health: 100,
            head_height: 1.0,
            head_radius: 0.4,
        }
    }
}

/// Препятствие (сфера) для headless raycast backend'а
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSpawn {
    pub position: [f32; 3],
    pub radius: f32,
    #[serde(default)]
    pub layer: u8,
}

/// Encounter: набор врагов + цель, прогоняется headless бинарём
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    pub seed: u64,
    pub ticks: u32,
    pub target: TargetSpawn,
    pub enemies: Vec<EnemySpawn>,
    pub obstacles: Vec<ObstacleSpawn>,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            ticks: 1200,
            target: TargetSpawn::default(),
            enemies: Vec::new(),
            obstacles: Vec::new(),
        }
    }
}

impl EncounterConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let encounter: Self = toml::from_str(source)?;
        for enemy in &encounter.enemies {
            enemy.config.validate()?;
        }
        ensure_non_negative("target.speed", encounter.target.speed)?;
        ensure_non_negative("target.head_radius", encounter.target.head_radius)?;
        for obstacle in &encounter.obstacles {
            ensure_non_negative("obstacles.radius", obstacle.radius)?;
            if obstacle.layer >= 32 {
                return Err(invalid("obstacles.layer", format!("layer {} out of 0..32", obstacle.layer)));
            }
        }
        Ok(encounter)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read_file(path.as_ref())?)
    }
}
