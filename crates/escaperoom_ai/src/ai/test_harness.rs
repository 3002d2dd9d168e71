//! Тестовый стенд: один контроллер + mock адаптеры, шаг 60 Hz

use std::cell::Cell;

use bevy::prelude::*;
use rand::rngs::mock::StepRng;

use crate::ai::adapters::{
    AnimationPlayer, DamageReceiver, LayerMask, NavigationAgent, RayHit, RaycastService,
};
use crate::ai::body::{AgentBody, TargetInfo};
use crate::ai::controller::{EnemyController, EnemyEffect, PatrolRoute, TickContext, TickReport};
use crate::ai::policy::EnemyKind;
use crate::ai::state::AIState;
use crate::config::EnemyConfig;
use crate::navigation::NavAgent;
use crate::physics::ObstacleField;

pub const DT: f32 = 1.0 / 60.0;
pub const HEAD_RADIUS: f32 = 0.4;

pub fn agent_entity() -> Entity {
    Entity::from_raw(1)
}

pub fn target_entity() -> Entity {
    Entity::from_raw(2)
}

/// NavAgent + журнал destination'ов
#[derive(Debug, Default)]
pub struct MockNav {
    pub agent: NavAgent,
    pub destinations: Vec<Vec3>,
    /// Всегда "прибыли" (цикл патруля без движения)
    pub always_arrived: bool,
}

impl NavigationAgent for MockNav {
    fn set_destination(&mut self, point: Vec3) {
        self.destinations.push(point);
        self.agent.set_destination(point);
    }

    fn stop(&mut self) {
        self.agent.stop();
    }

    fn resume(&mut self) {
        self.agent.resume();
    }

    fn set_speed(&mut self, speed: f32) {
        self.agent.set_speed(speed);
    }

    fn set_stopping_distance(&mut self, distance: f32) {
        self.agent.set_stopping_distance(distance);
    }

    fn stopping_distance(&self) -> f32 {
        self.agent.stopping_distance()
    }

    fn remaining_distance(&self) -> f32 {
        if self.always_arrived {
            0.0
        } else {
            self.agent.remaining_distance()
        }
    }

    fn path_pending(&self) -> bool {
        !self.always_arrived && self.agent.path_pending()
    }
}

/// Animation engine, переключающийся мгновенно
#[derive(Debug, Default)]
pub struct RecordingAnimator {
    pub playing: Option<String>,
    pub fades: Vec<String>,
}

impl RecordingAnimator {
    pub fn count(&self, state: &str) -> usize {
        self.fades.iter().filter(|fade| fade.as_str() == state).count()
    }
}

impl AnimationPlayer for RecordingAnimator {
    fn cross_fade(&mut self, state: &str, _duration: f32) {
        self.fades.push(state.to_string());
        self.playing = Some(state.to_string());
    }

    fn current_state(&self) -> Option<&str> {
        self.playing.as_deref()
    }
}

/// ObstacleField со счётчиком raycast'ов
#[derive(Debug, Default)]
pub struct CountingRaycast {
    pub field: ObstacleField,
    casts: Cell<u32>,
}

impl CountingRaycast {
    pub fn casts(&self) -> u32 {
        self.casts.get()
    }

    pub fn reset(&self) {
        self.casts.set(0);
    }
}

impl RaycastService for CountingRaycast {
    fn cast_all_sorted(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Vec<RayHit> {
        self.casts.set(self.casts.get() + 1);
        self.field.cast_all_sorted(origin, direction, max_distance, layers)
    }
}

#[derive(Debug, Default)]
pub struct MockHealth {
    pub received: Vec<u32>,
}

impl DamageReceiver for MockHealth {
    fn take_damage(&mut self, amount: u32) {
        self.received.push(amount);
    }
}

pub struct Harness {
    pub controller: EnemyController,
    pub body: AgentBody,
    pub nav: MockNav,
    pub animator: RecordingAnimator,
    pub raycast: CountingRaycast,
    pub health: MockHealth,
    pub rng: StepRng,
    pub target: Option<TargetInfo>,
    pub now: f32,
    /// Двигать агента NavAgent'ом после каждого тика
    pub move_agent: bool,
    pub nav_enabled: bool,
    pub reports: Vec<TickReport>,
    walls: u32,
}

impl Harness {
    /// Агент в начале координат, смотрит в -Z
    pub fn new(kind: EnemyKind, config: EnemyConfig, waypoints: Vec<Vec3>) -> Self {
        Self {
            controller: EnemyController::new(kind, config, PatrolRoute::new(waypoints)),
            body: AgentBody::new(agent_entity(), Vec3::ZERO, Quat::IDENTITY),
            nav: MockNav {
                agent: NavAgent::new(3.5, 0.0),
                ..Default::default()
            },
            animator: RecordingAnimator::default(),
            raycast: CountingRaycast::default(),
            health: MockHealth::default(),
            // gen::<f32>() == 0.0
            rng: StepRng::new(0, 0),
            target: None,
            now: 0.0,
            move_agent: false,
            nav_enabled: true,
            reports: Vec::new(),
            walls: 0,
        }
    }

    /// Поставить (или передвинуть) цель вместе с её коллайдером головы
    pub fn target_at(&mut self, position: Vec3) {
        let entity = target_entity();
        let eye = Vec3::Y * self.controller.config().perception.eye_height;
        self.raycast.field.remove_owned_by(entity);
        self.raycast
            .field
            .add_sphere(entity, entity, position + eye, HEAD_RADIUS, 0);
        self.target = Some(TargetInfo { entity, position });
    }

    pub fn clear_target(&mut self) {
        let entity = target_entity();
        self.raycast.field.remove_owned_by(entity);
        self.target = None;
    }

    pub fn add_wall(&mut self, center: Vec3, radius: f32) -> Entity {
        self.walls += 1;
        let wall = Entity::from_raw(100 + self.walls);
        self.raycast.field.add_sphere(wall, wall, center, radius, 0);
        wall
    }

    pub fn state(&self) -> AIState {
        self.controller.state()
    }

    pub fn step(&mut self) -> TickReport {
        self.now += DT;

        let nav: Option<&mut dyn NavigationAgent> = if self.nav_enabled {
            Some(&mut self.nav)
        } else {
            None
        };
        let report = self.controller.tick(TickContext {
            now: self.now,
            delta: DT,
            body: &mut self.body,
            target: self.target,
            nav,
            animator: Some(&mut self.animator),
            raycast: Some(&self.raycast),
            damage: Some(&mut self.health),
            rng: &mut self.rng,
        });

        if self.move_agent && self.nav_enabled {
            self.body.position = self.nav.agent.step(self.body.position, DT);
        }

        self.reports.push(report.clone());
        report
    }

    pub fn run(&mut self, seconds: f32) {
        let ticks = (seconds / DT).round() as u32;
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Шагаем, пока predicate не станет true (или не кончится время)
    pub fn run_until(&mut self, max_seconds: f32, predicate: impl Fn(&Harness) -> bool) -> bool {
        let ticks = (max_seconds / DT).round() as u32;
        for _ in 0..ticks {
            self.step();
            if predicate(self) {
                return true;
            }
        }
        false
    }

    pub fn effects(&self) -> impl Iterator<Item = &EnemyEffect> {
        self.reports.iter().flat_map(|report| report.effects.iter())
    }

    /// Последовательность состояний без повторов
    pub fn state_trace(&self) -> Vec<AIState> {
        let mut trace: Vec<AIState> = Vec::new();
        for report in &self.reports {
            if trace.last() != Some(&report.state) {
                trace.push(report.state);
            }
        }
        trace
    }
}
