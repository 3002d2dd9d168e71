//! Headless animation backend
//!
//! Animator помнит текущее состояние и незавершённый crossfade.
//! Пока переход идёт, current_state() сообщает исходное состояние.

use bevy::prelude::*;

use crate::ai::adapters::AnimationPlayer;

#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Animator {
    current: Option<String>,
    next: Option<String>,
    fade_remaining: f32,
    /// Сколько crossfade'ов получено
    pub crossfades: u32,
}

impl Animator {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            current: Some(initial.into()),
            ..Default::default()
        }
    }

    /// Состояние, в которое идёт переход
    pub fn transitioning_to(&self) -> Option<&str> {
        self.next.as_deref()
    }

    pub fn advance(&mut self, delta: f32) {
        if self.next.is_none() {
            return;
        }
        self.fade_remaining -= delta;
        if self.fade_remaining <= 0.0 {
            self.current = self.next.take();
            self.fade_remaining = 0.0;
        }
    }
}

impl AnimationPlayer for Animator {
    fn cross_fade(&mut self, state: &str, duration: f32) {
        self.crossfades += 1;
        if duration <= 0.0 {
            self.current = Some(state.to_string());
            self.next = None;
            self.fade_remaining = 0.0;
        } else {
            self.next = Some(state.to_string());
            self.fade_remaining = duration;
        }
    }

    fn current_state(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

pub fn advance_animators(time: Res<Time>, mut animators: Query<&mut Animator>) {
    let delta = time.delta_secs();
    for mut animator in animators.iter_mut() {
        animator.advance(delta);
    }
}
