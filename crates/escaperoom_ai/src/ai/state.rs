//! AI state: top-level FSM + per-agent memory (таймеры, sub-state вариантов)
//!
//! Весь изменяемый AI-state одного врага живёт в `AiMemory`:
//! контроллер владеет им и передаёт активной policy.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Top-level состояния FSM (ровно одно активно)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum AIState {
    /// Обход маршрута (или стоим, если маршрута нет)
    #[default]
    Patrol,
    /// Преследование цели
    Chase,
    /// Атака в радиусе
    Attack,
    /// Стоим на месте
    Idle,
}

/// Отложенное действие (вместо fire-and-forget таймера)
///
/// Проверяется каждый тик против часов симуляции.
/// Пропускается, если цель пропала к моменту срабатывания.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledAction {
    pub fire_at: f32,
    pub state: AIState,
}

/// Humanoid: осмотр на точке патруля
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HumanoidState {
    pub scanning: bool,
    pub scan_start_time: f32,
    /// Yaw на момент начала осмотра (радианы)
    pub base_yaw: f32,
}

/// Фаза robot'а внутри Chase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotPhase {
    None,
    Closing,
    Rolling,
}

/// Robot: сворачивание → качение → раскрытие
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RobotState {
    pub closing: bool,
    pub rolling: bool,
    pub close_end_time: f32,
    pub has_opened: bool,
}

impl RobotState {
    pub fn phase(&self) -> RobotPhase {
        if self.closing {
            RobotPhase::Closing
        } else if self.rolling {
            RobotPhase::Rolling
        } else {
            RobotPhase::None
        }
    }

    pub fn is_engaging(&self) -> bool {
        self.closing || self.rolling
    }
}

/// Приватный sub-state варианта
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum VariantState {
    #[default]
    None,
    Humanoid(HumanoidState),
    Robot(RobotState),
}

impl VariantState {
    /// Тот же вариант, все флаги сброшены
    pub fn cleared(&self) -> Self {
        match self {
            VariantState::None => VariantState::None,
            VariantState::Humanoid(_) => VariantState::Humanoid(HumanoidState::default()),
            VariantState::Robot(_) => VariantState::Robot(RobotState::default()),
        }
    }
}

/// Per-agent AI record
#[derive(Debug, Clone, PartialEq)]
pub struct AiMemory {
    pub state: AIState,
    pub patrol_index: usize,
    pub last_detection_time: f32,
    pub last_attack_time: f32,
    pub last_path_update_time: f32,
    /// Кэш последнего результата perception (между throttled проверками)
    pub target_visible: bool,
    /// Stopping distance навигации на момент старта (для патруля)
    pub default_stopping_distance: f32,
    pub started: bool,
    pub pending: Option<ScheduledAction>,
    pub variant: VariantState,
}

impl Default for AiMemory {
    fn default() -> Self {
        Self {
            state: AIState::Patrol,
            patrol_index: 0,
            last_detection_time: 0.0,
            // первая атака — сразу
            last_attack_time: f32::NEG_INFINITY,
            last_path_update_time: 0.0,
            target_visible: false,
            default_stopping_distance: 0.0,
            started: false,
            pending: None,
            variant: VariantState::None,
        }
    }
}

impl AiMemory {
    pub fn new(variant: VariantState) -> Self {
        Self {
            variant,
            ..Default::default()
        }
    }

    pub fn humanoid(&self) -> Option<&HumanoidState> {
        match &self.variant {
            VariantState::Humanoid(state) => Some(state),
            _ => None,
        }
    }

    pub fn robot(&self) -> Option<&RobotState> {
        match &self.variant {
            VariantState::Robot(state) => Some(state),
            _ => None,
        }
    }

    /// Humanoid sub-state (создаётся при первом обращении)
    pub fn humanoid_mut(&mut self) -> &mut HumanoidState {
        if !matches!(self.variant, VariantState::Humanoid(_)) {
            self.variant = VariantState::Humanoid(HumanoidState::default());
        }
        match &mut self.variant {
            VariantState::Humanoid(state) => state,
            _ => unreachable!("variant was just set to Humanoid"),
        }
    }

    /// Robot sub-state (создаётся при первом обращении)
    pub fn robot_mut(&mut self) -> &mut RobotState {
        if !matches!(self.variant, VariantState::Robot(_)) {
            self.variant = VariantState::Robot(RobotState::default());
        }
        match &mut self.variant {
            VariantState::Robot(state) => state,
            _ => unreachable!("variant was just set to Robot"),
        }
    }

    /// Сброс при деактивации: ни флагов, ни отложенных действий
    pub fn clear_transient(&mut self) {
        self.variant = self.variant.cleared();
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_state_default() {
        assert_eq!(AIState::default(), AIState::Patrol);
    }

    #[test]
    fn test_memory_defaults() {
        let memory = AiMemory::default();
        assert_eq!(memory.patrol_index, 0);
        assert!(memory.last_attack_time.is_infinite());
        assert!(memory.pending.is_none());
        assert!(!memory.started);
    }

    #[test]
    fn test_robot_phase() {
        let mut robot = RobotState::default();
        assert_eq!(robot.phase(), RobotPhase::None);
        robot.closing = true;
        assert_eq!(robot.phase(), RobotPhase::Closing);
        robot.closing = false;
        robot.rolling = true;
        assert_eq!(robot.phase(), RobotPhase::Rolling);
        assert!(robot.is_engaging());
    }

    #[test]
    fn test_clear_transient_keeps_variant_kind() {
        let mut memory = AiMemory::new(VariantState::Robot(RobotState::default()));
        {
            let robot = memory.robot_mut();
            robot.closing = true;
            robot.has_opened = true;
            robot.close_end_time = 4.0;
        }
        memory.pending = Some(ScheduledAction {
            fire_at: 1.0,
            state: AIState::Chase,
        });

        memory.clear_transient();

        assert_eq!(memory.robot(), Some(&RobotState::default()));
        assert!(memory.pending.is_none());
    }

    #[test]
    fn test_variant_accessors_lazily_create() {
        let mut memory = AiMemory::default();
        assert!(memory.humanoid().is_none());
        memory.humanoid_mut().scanning = true;
        assert!(memory.humanoid().map(|h| h.scanning).unwrap_or(false));
    }
}
