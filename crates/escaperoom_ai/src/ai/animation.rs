//! AnimationDriver — дедупликация crossfade запросов
//!
//! Новый crossfade отправляется только если запрошенное состояние отличается
//! и от того, что engine сообщает как играющее, и от последнего запрошенного.

use crate::ai::adapters::AnimationPlayer;

/// Логические клипы; реальные имена состояний — в `AnimationSet`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clip {
    Idle,
    Walk,
    Run,
    Attack,
    Look,
    Find,
    Close,
    Roll,
    Open,
    AttackPrimary,
    AttackAlternate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimationDriver {
    last_requested: Option<String>,
    issued: u32,
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Запросить состояние. Возвращает true, если crossfade реально отправлен.
    /// Без animation engine'а — no-op.
    pub fn play(
        &mut self,
        player: Option<&mut (dyn AnimationPlayer + '_)>,
        state: &str,
        duration: f32,
    ) -> bool {
        let Some(player) = player else {
            return false;
        };

        if player.current_state() == Some(state) || self.last_requested.as_deref() == Some(state) {
            return false;
        }

        self.last_requested = Some(state.to_string());
        self.issued += 1;
        player.cross_fade(state, duration);
        true
    }

    pub fn last_requested(&self) -> Option<&str> {
        self.last_requested.as_deref()
    }

    /// Сколько crossfade'ов отправлено за жизнь драйвера
    pub fn issued(&self) -> u32 {
        self.issued
    }

    pub fn reset(&mut self) {
        self.last_requested = None;
    }
}
