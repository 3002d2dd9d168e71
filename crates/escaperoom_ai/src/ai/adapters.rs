//! Внешние коллабораторы AI: навигация, анимация, raycast, урон по цели
//!
//! Контроллер только читает их состояние и отдаёт команды.
//! Реализации живут у хоста (движок) или в headless backend'ах этого crate'а.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Pathfinding/movement engine (NavMeshAgent-подобный)
pub trait NavigationAgent {
    fn set_destination(&mut self, point: Vec3);
    fn stop(&mut self);
    fn resume(&mut self);
    fn set_speed(&mut self, speed: f32);
    fn set_stopping_distance(&mut self, distance: f32);
    fn stopping_distance(&self) -> f32;
    fn remaining_distance(&self) -> f32;
    fn path_pending(&self) -> bool;
}

/// Animation playback engine
pub trait AnimationPlayer {
    fn cross_fade(&mut self, state: &str, duration: f32);
    /// Состояние, которое сейчас реально играет (None — ничего/неизвестно)
    fn current_state(&self) -> Option<&str>;
}

/// Physics raycast service
pub trait RaycastService {
    /// Все пересечения луча, отсортированные по возрастанию distance
    fn cast_all_sorted(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Vec<RayHit>;
}

/// Интерфейс получения урона у цели
pub trait DamageReceiver {
    fn take_damage(&mut self, amount: u32);
}

/// Одно пересечение луча
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    /// Entity коллайдера, в который попали
    pub collider: Entity,
    /// Корневой владелец коллайдера (сам коллайдер, если он ни к кому не прикреплён)
    pub owner: Entity,
}

impl RayHit {
    /// Коллайдер принадлежит `entity` или прикреплён к нему
    pub fn belongs_to(&self, entity: Entity) -> bool {
        self.collider == entity || self.owner == entity
    }
}

/// Битовая маска physics-слоёв (32 слоя)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Reflect)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const EMPTY: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);

    pub fn from_layers(layers: &[u8]) -> Self {
        Self(layers.iter().fold(0u32, |mask, layer| mask | Self::bit(*layer)))
    }

    /// Пустая маска трактуется как "все слои"
    pub fn or_all(self) -> Self {
        if self.0 == 0 {
            Self::ALL
        } else {
            self
        }
    }

    pub fn contains(self, layer: u8) -> bool {
        self.0 & Self::bit(layer) != 0
    }

    fn bit(layer: u8) -> u32 {
        1u32.checked_shl(u32::from(layer)).unwrap_or(0)
    }
}
