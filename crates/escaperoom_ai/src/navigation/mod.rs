//! Headless navigation backend
//!
//! Вместо navmesh: прямая до destination в горизонтальной плоскости.
//! `PathFollower` — заскриптованное движение цели.
//! Путь "считается" один шаг: после set_destination path_pending = true
//! до следующего advance.

use bevy::prelude::*;

use crate::ai::adapters::NavigationAgent;
use crate::ai::body::horizontal_look_rotation;

/// Минимальное смещение за шаг, при котором агент разворачивается по движению
const MIN_TURN_STEP_SQR: f32 = 1e-6;

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct NavAgent {
    pub speed: f32,
    pub stopping_distance: f32,
    stopped: bool,
    destination: Option<Vec3>,
    path_pending: bool,
    remaining_distance: f32,
    /// Поворачивать transform по направлению движения
    pub update_rotation: bool,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self {
            speed: 3.5,
            stopping_distance: 0.0,
            stopped: false,
            destination: None,
            path_pending: false,
            remaining_distance: 0.0,
            update_rotation: true,
        }
    }
}

impl NavAgent {
    pub fn new(speed: f32, stopping_distance: f32) -> Self {
        Self {
            speed,
            stopping_distance,
            ..Default::default()
        }
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Один шаг движения. Возвращает новую позицию.
    pub fn step(&mut self, position: Vec3, delta: f32) -> Vec3 {
        let Some(destination) = self.destination else {
            self.remaining_distance = 0.0;
            return position;
        };

        let offset = Vec3::new(destination.x - position.x, 0.0, destination.z - position.z);
        let distance = offset.length();

        if self.path_pending {
            self.path_pending = false;
            self.remaining_distance = distance;
            return position;
        }

        if self.stopped || distance <= self.stopping_distance {
            self.remaining_distance = distance;
            return position;
        }

        let travel = (self.speed * delta).min(distance - self.stopping_distance).max(0.0);
        self.remaining_distance = distance - travel;
        position + offset / distance * travel
    }
}

impl NavigationAgent for NavAgent {
    fn set_destination(&mut self, point: Vec3) {
        self.destination = Some(point);
        self.path_pending = true;
    }

    fn stop(&mut self) {
        self.stopped = true;
    }

    fn resume(&mut self) {
        self.stopped = false;
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    fn set_stopping_distance(&mut self, distance: f32) {
        self.stopping_distance = distance;
    }

    fn stopping_distance(&self) -> f32 {
        self.stopping_distance
    }

    fn remaining_distance(&self) -> f32 {
        self.remaining_distance
    }

    fn path_pending(&self) -> bool {
        self.path_pending
    }
}

/// Система: двигаем агентов к destination (после AI тика)
pub fn advance_nav_agents(time: Res<Time>, mut agents: Query<(&mut Transform, &mut NavAgent)>) {
    let delta = time.delta_secs();

    for (mut transform, mut agent) in agents.iter_mut() {
        let previous = transform.translation;
        let next = agent.step(previous, delta);
        let moved = next - previous;

        if agent.update_rotation && moved.length_squared() > MIN_TURN_STEP_SQR {
            if let Some(rotation) = horizontal_look_rotation(moved) {
                transform.rotation = rotation;
            }
        }
        transform.translation = next;
    }
}

/// Сценарный маршрут цели (игрок в headless прогоне)
///
/// Идёт по точкам с постоянной скоростью, на последней остаётся.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PathFollower {
    pub points: Vec<Vec3>,
    pub speed: f32,
    next: usize,
}

impl PathFollower {
    pub fn new(points: Vec<Vec3>, speed: f32) -> Self {
        Self {
            points,
            speed,
            next: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.points.len()
    }

    /// Один шаг по маршруту. Возвращает новую позицию.
    pub fn step(&mut self, mut position: Vec3, delta: f32) -> Vec3 {
        let mut remaining = self.speed * delta;

        while remaining > 0.0 {
            let Some(point) = self.points.get(self.next).copied() else {
                break;
            };
            let offset = point - position;
            let distance = offset.length();
            if distance <= remaining {
                position = point;
                remaining -= distance;
                self.next += 1;
            } else {
                position += offset / distance * remaining;
                remaining = 0.0;
            }
        }

        position
    }
}

/// Система: ведём цели по их маршрутам
pub fn follow_paths(time: Res<Time>, mut followers: Query<(&mut Transform, &mut PathFollower)>) {
    let delta = time.delta_secs();

    for (mut transform, mut follower) in followers.iter_mut() {
        if follower.is_finished() {
            continue;
        }
        transform.translation = follower.step(transform.translation, delta);
    }
}
