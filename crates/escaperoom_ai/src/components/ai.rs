//! AI компоненты: отслеживаемая цель врага

use bevy::prelude::*;

/// За кем следит враг. `None` — цели нет (нормальное состояние, не ошибка).
///
/// Пустой слот заполняется первым `Player`; ссылка на despawned entity
/// сбрасывается в `None`.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct TrackedTarget(pub Option<Entity>);

impl TrackedTarget {
    pub fn new(target: Entity) -> Self {
        Self(Some(target))
    }

    pub fn get(&self) -> Option<Entity> {
        self.0
    }
}
