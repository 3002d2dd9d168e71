//! Behavior policies — variant-specific решения и handlers
//!
//! Контроллер держит одну `Box<dyn BehaviorPolicy>` и делегирует ей:
//! decide_state + handler активного состояния. Default методы трейта =
//! базовое поведение (модуль `base`), варианты переопределяют нужное.

use serde::{Deserialize, Serialize};

use crate::ai::controller::AiTick;
use crate::ai::state::{AIState, HumanoidState, RobotState, VariantState};

pub mod base;
pub mod humanoid;
pub mod robot;
pub mod spider;

#[cfg(test)]
mod robot_tests;
#[cfg(test)]
mod spider_tests;

pub use humanoid::{ping_pong, HumanoidPolicy};
pub use robot::RobotPolicy;
pub use spider::SpiderPolicy;

/// Вариант врага (выбирает policy)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    #[default]
    Basic,
    Humanoid,
    Robot,
    Spider,
}

impl EnemyKind {
    pub fn policy(self) -> Box<dyn BehaviorPolicy> {
        match self {
            EnemyKind::Basic => Box::new(BasicPolicy),
            EnemyKind::Humanoid => Box::new(HumanoidPolicy),
            EnemyKind::Robot => Box::new(RobotPolicy),
            EnemyKind::Spider => Box::new(SpiderPolicy),
        }
    }
}

/// Capability set варианта
pub trait BehaviorPolicy: Send + Sync + std::fmt::Debug {
    fn kind(&self) -> EnemyKind;

    /// Пустой sub-state варианта (кладётся в AiMemory при создании)
    fn initial_variant_state(&self) -> VariantState {
        match self.kind() {
            EnemyKind::Humanoid => VariantState::Humanoid(HumanoidState::default()),
            EnemyKind::Robot => VariantState::Robot(RobotState::default()),
            EnemyKind::Basic | EnemyKind::Spider => VariantState::None,
        }
    }

    /// Вызывается после throttled perception; `seen` — свежий результат LOS
    fn decide_state(&self, ai: &mut AiTick<'_, '_>, seen: bool) -> AIState {
        base::decide_state(ai, seen)
    }

    fn handle_patrol(&self, ai: &mut AiTick<'_, '_>) {
        base::patrol(ai);
    }

    fn handle_chase(&self, ai: &mut AiTick<'_, '_>) {
        base::chase(ai);
    }

    fn handle_attack(&self, ai: &mut AiTick<'_, '_>) {
        base::attack(ai);
    }

    fn handle_idle(&self, ai: &mut AiTick<'_, '_>) {
        base::idle(ai);
    }
}

/// Базовый враг без переопределений
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicPolicy;

impl BehaviorPolicy for BasicPolicy {
    fn kind(&self) -> EnemyKind {
        EnemyKind::Basic
    }
}
