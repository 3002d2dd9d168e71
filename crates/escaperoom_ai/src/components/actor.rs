//! Базовые компоненты акторов: Player, Health

use bevy::prelude::*;

use crate::ai::adapters::DamageReceiver;

/// Маркер игрока — цель, которую враги подхватывают автоматически
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Health)]
pub struct Player;

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100) // Default 100 HP
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }
}

/// Компонент-маркер: здоровье дошло до нуля
///
/// Деспавн не автоматический.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Dead;

impl DamageReceiver for Health {
    fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }
}
