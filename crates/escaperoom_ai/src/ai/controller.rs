//! EnemyController — FSM врага
//!
//! Каждый тик:
//! 1. первый тик — старт (default stopping distance, путь к waypoint 0)
//! 2. отложенное действие, если подошло время
//! 3. throttled perception → policy.decide_state
//! 4. handler активного состояния (policy)
//!
//! Все "ожидания" — сравнение timestamp'ов с часами симуляции, никаких suspend.

use bevy::prelude::*;
use rand::RngCore;

use crate::ai::adapters::{AnimationPlayer, DamageReceiver, NavigationAgent, RaycastService};
use crate::ai::animation::{AnimationDriver, Clip};
use crate::ai::body::{AgentBody, TargetInfo};
use crate::ai::perception;
use crate::ai::policy::{BehaviorPolicy, EnemyKind};
use crate::ai::state::{AIState, AiMemory};
use crate::components::TrackedTarget;
use crate::config::EnemyConfig;

/// Допуск к stopping distance при проверке прибытия на waypoint
pub const ARRIVAL_EPSILON: f32 = 0.1;

/// Цикличный маршрут патруля
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatrolRoute {
    waypoints: Vec<Vec3>,
}

impl PatrolRoute {
    pub fn new(waypoints: Vec<Vec3>) -> Self {
        Self { waypoints }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Waypoint по индексу (по модулю длины)
    pub fn waypoint(&self, index: usize) -> Option<Vec3> {
        if self.waypoints.is_empty() {
            return None;
        }
        Some(self.waypoints[index % self.waypoints.len()])
    }

    pub fn next_index(&self, index: usize) -> usize {
        if self.waypoints.is_empty() {
            0
        } else {
            (index + 1) % self.waypoints.len()
        }
    }

    pub fn waypoints(&self) -> &[Vec3] {
        &self.waypoints
    }
}

/// Эффекты тика, которые хост превращает в события
#[derive(Debug, Clone, PartialEq)]
pub enum EnemyEffect {
    /// Атака сработала (cooldown истёк)
    Strike { target: Entity, damage: u32 },
    /// Robot раскрылся у цели
    Open { target: Entity },
    /// Humanoid заметил цель во время осмотра
    Alerted { target: Entity },
}

/// Всё, что контроллер получает от мира на один тик
pub struct TickContext<'w> {
    /// Часы симуляции (секунды)
    pub now: f32,
    pub delta: f32,
    pub body: &'w mut AgentBody,
    pub target: Option<TargetInfo>,
    pub nav: Option<&'w mut dyn NavigationAgent>,
    pub animator: Option<&'w mut dyn AnimationPlayer>,
    pub raycast: Option<&'w dyn RaycastService>,
    pub damage: Option<&'w mut dyn DamageReceiver>,
    pub rng: &'w mut dyn RngCore,
}

/// Итог тика
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub previous: AIState,
    pub state: AIState,
    pub effects: Vec<EnemyEffect>,
}

impl TickReport {
    pub fn changed(&self) -> bool {
        self.previous != self.state
    }
}

/// Рабочий view одного тика: конфиг + memory контроллера + мир.
///
/// Policies работают только через него.
pub struct AiTick<'c, 'w> {
    pub config: &'c EnemyConfig,
    pub memory: &'c mut AiMemory,
    pub route: &'c PatrolRoute,
    pub animation: &'c mut AnimationDriver,
    pub cx: TickContext<'w>,
    pub effects: Vec<EnemyEffect>,
}

impl<'c, 'w> AiTick<'c, 'w> {
    pub fn now(&self) -> f32 {
        self.cx.now
    }

    pub fn delta(&self) -> f32 {
        self.cx.delta
    }

    pub fn target(&self) -> Option<TargetInfo> {
        self.cx.target
    }

    pub fn body(&self) -> &AgentBody {
        &*self.cx.body
    }

    pub fn body_mut(&mut self) -> &mut AgentBody {
        &mut *self.cx.body
    }

    pub fn distance_to_target(&self) -> Option<f32> {
        self.cx
            .target
            .map(|target| self.cx.body.position.distance(target.position))
    }

    /// Attack band с гистерезисом: вход при ≤ attack_range,
    /// удержание (уже в Attack) до attack_range + exit_buffer включительно
    pub fn in_attack_band(&self, distance: f32) -> bool {
        distance <= self.config.attack_range
            || (self.memory.state == AIState::Attack && distance <= self.config.attack_exit_range())
    }

    pub fn beyond_attack_exit(&self, distance: f32) -> bool {
        distance > self.config.attack_exit_range()
    }

    /// LOS прямо сейчас (без throttle). Обновляет кэш видимости.
    pub fn perceive(&mut self) -> bool {
        let seen = perception::can_see(
            &self.config.perception,
            &*self.cx.body,
            self.cx.target.as_ref(),
            self.cx.raycast,
        );
        self.memory.target_visible = seen;
        seen
    }

    pub fn set_state(&mut self, state: AIState) {
        self.memory.state = state;
    }

    pub fn play(&mut self, clip: Clip) {
        let config = self.config;
        self.animation.play(
            self.cx.animator.as_deref_mut(),
            config.animations.name(clip),
            config.crossfade_duration,
        );
    }

    pub fn emit(&mut self, effect: EnemyEffect) {
        self.effects.push(effect);
    }

    /// Повернуться к цели (slerp на rotation_speed, только горизонталь)
    pub fn face_target(&mut self) {
        let Some(target) = self.cx.target else {
            return;
        };
        let (speed, delta) = (self.config.rotation_speed, self.cx.delta);
        self.cx.body.turn_towards(target.position, speed, delta);
    }

    // --- Навигация (без адаптера — no-op) ---

    pub fn has_navigation(&self) -> bool {
        self.cx.nav.is_some()
    }

    pub fn stop_movement(&mut self) {
        if let Some(nav) = self.cx.nav.as_deref_mut() {
            nav.stop();
        }
    }

    pub fn resume_movement(&mut self) {
        if let Some(nav) = self.cx.nav.as_deref_mut() {
            nav.resume();
        }
    }

    pub fn set_speed(&mut self, speed: f32) {
        if let Some(nav) = self.cx.nav.as_deref_mut() {
            nav.set_speed(speed);
        }
    }

    pub fn set_stopping_distance(&mut self, distance: f32) {
        if let Some(nav) = self.cx.nav.as_deref_mut() {
            nav.set_stopping_distance(distance);
        }
    }

    pub fn move_to(&mut self, point: Vec3) {
        if let Some(nav) = self.cx.nav.as_deref_mut() {
            nav.set_destination(point);
        }
    }

    /// Путь посчитан и осталось ≤ stopping distance + epsilon
    pub fn arrived(&self) -> bool {
        self.cx
            .nav
            .as_deref()
            .map(|nav| {
                !nav.path_pending() && nav.remaining_distance() <= nav.stopping_distance() + ARRIVAL_EPSILON
            })
            .unwrap_or(false)
    }

    /// Пересчитать путь к цели не чаще path_update_rate
    pub fn retarget_throttled(&mut self) {
        let Some(target) = self.cx.target else {
            return;
        };
        if self.now() - self.memory.last_path_update_time > self.config.path_update_rate {
            self.memory.last_path_update_time = self.now();
            self.move_to(target.position);
        }
    }

    // --- Патруль ---

    pub fn current_waypoint(&self) -> Option<Vec3> {
        self.route.waypoint(self.memory.patrol_index)
    }

    /// Следующий waypoint по кругу + новый destination
    pub fn advance_waypoint(&mut self) {
        self.memory.patrol_index = self.route.next_index(self.memory.patrol_index);
        if let Some(waypoint) = self.current_waypoint() {
            self.move_to(waypoint);
        }
    }

    fn start(&mut self) {
        self.memory.started = true;
        if let Some(nav) = self.cx.nav.as_deref_mut() {
            self.memory.default_stopping_distance = nav.stopping_distance();
            nav.set_speed(self.config.patrol_speed);
        }

        match self.current_waypoint() {
            Some(waypoint) if self.has_navigation() => {
                self.move_to(waypoint);
                self.play(Clip::Walk);
            }
            _ => self.play(Clip::Idle),
        }
    }

    fn run_scheduled(&mut self, entity: Entity) {
        let Some(action) = self.memory.pending else {
            return;
        };
        if self.now() < action.fire_at {
            return;
        }

        self.memory.pending = None;
        if self.memory.state == AIState::Attack {
            // уже атакуем: реакция устарела, Attack не перебиваем
            crate::log(&format!(
                "AI: {:?} scheduled reaction dropped (already attacking)",
                entity
            ));
        } else if self.cx.target.is_some() {
            crate::log(&format!(
                "AI: {:?} scheduled reaction fired → {:?}",
                entity, action.state
            ));
            self.memory.state = action.state;
        } else {
            crate::log(&format!(
                "AI: {:?} scheduled reaction dropped (target gone)",
                entity
            ));
        }
    }
}

/// Контроллер врага: конфиг, AI memory, маршрут, драйвер анимаций, policy
#[derive(Component, Debug)]
#[require(Transform, TrackedTarget)]
pub struct EnemyController {
    config: EnemyConfig,
    memory: AiMemory,
    route: PatrolRoute,
    animation: AnimationDriver,
    policy: Box<dyn BehaviorPolicy>,
    active: bool,
}

impl EnemyController {
    pub fn new(kind: EnemyKind, config: EnemyConfig, route: PatrolRoute) -> Self {
        Self::with_policy(kind.policy(), config, route)
    }

    pub fn with_policy(policy: Box<dyn BehaviorPolicy>, config: EnemyConfig, route: PatrolRoute) -> Self {
        let memory = AiMemory::new(policy.initial_variant_state());
        Self {
            config,
            memory,
            route,
            animation: AnimationDriver::new(),
            policy,
            active: true,
        }
    }

    pub fn kind(&self) -> EnemyKind {
        self.policy.kind()
    }

    pub fn state(&self) -> AIState {
        self.memory.state
    }

    /// Принудительная смена состояния (скрипты уровня)
    pub fn set_state(&mut self, state: AIState) {
        self.memory.state = state;
    }

    pub fn config(&self) -> &EnemyConfig {
        &self.config
    }

    pub fn memory(&self) -> &AiMemory {
        &self.memory
    }

    pub fn route(&self) -> &PatrolRoute {
        &self.route
    }

    pub fn animation(&self) -> &AnimationDriver {
        &self.animation
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// OnEnable: стартуем с чистого sub-state
    pub fn activate(&mut self) {
        self.memory.clear_transient();
        self.animation.reset();
        self.active = true;
    }

    /// OnDisable/despawn: сбросить флаги вариантов и отложенные действия
    pub fn deactivate(&mut self) {
        self.memory.clear_transient();
        self.active = false;
    }

    pub fn tick(&mut self, cx: TickContext<'_>) -> TickReport {
        let previous = self.memory.state;
        if !self.active {
            return TickReport {
                previous,
                state: previous,
                effects: Vec::new(),
            };
        }

        let entity = cx.body.entity;
        let policy = &*self.policy;
        let mut ai = AiTick {
            config: &self.config,
            memory: &mut self.memory,
            route: &self.route,
            animation: &mut self.animation,
            cx,
            effects: Vec::new(),
        };

        if !ai.memory.started {
            ai.start();
        }

        ai.run_scheduled(entity);

        // Throttled perception: не чаще detection_cooldown, между проверками — кэш
        if ai.now() - ai.memory.last_detection_time > ai.config.detection_cooldown {
            ai.memory.last_detection_time = ai.now();
            let seen = ai.perceive();
            let next = policy.decide_state(&mut ai, seen);
            ai.set_state(next);
        }

        match ai.memory.state {
            AIState::Patrol => policy.handle_patrol(&mut ai),
            AIState::Chase => policy.handle_chase(&mut ai),
            AIState::Attack => policy.handle_attack(&mut ai),
            AIState::Idle => policy.handle_idle(&mut ai),
        }

        let effects = ai.effects;
        let state = self.memory.state;
        if state != previous {
            crate::log(&format!(
                "AI: {:?} ({:?}) {:?} → {:?}",
                entity,
                self.policy.kind(),
                previous,
                state
            ));
        }

        TickReport {
            previous,
            state,
            effects,
        }
    }
}
