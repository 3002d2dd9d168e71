//! AI Events — что враги сообщают остальному миру (и что мир сообщает им)

use bevy::prelude::*;

use crate::ai::controller::EnemyEffect;
use crate::ai::policy::EnemyKind;
use crate::ai::state::AIState;

/// Смена top-level состояния врага
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AIStateChanged {
    pub entity: Entity,
    pub kind: EnemyKind,
    pub from: AIState,
    pub to: AIState,
}

/// Эффект тика (атака, раскрытие robot'а, тревога humanoid'а)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct EnemyEffectEvent {
    pub source: Entity,
    pub effect: EnemyEffect,
}

/// Атака врага сработала (урон уже применён через DamageReceiver цели)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct EnemyStrike {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
}

/// Событие: урон нанесён
///
/// Генерируется после применения damage к Health.
/// Используется для UI, звуков, эффектов.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
    pub target_died: bool,
}

/// Включить/выключить врага (OnEnable / OnDisable)
///
/// Выключение сбрасывает sub-state варианта и отложенные реакции.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct SetEnemyActive {
    pub entity: Entity,
    pub active: bool,
}
