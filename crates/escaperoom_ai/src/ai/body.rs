//! Поза агента и цели + горизонтальная геометрия поворотов
//!
//! Конвенция Bevy: forward = -Z, yaw = поворот вокруг +Y.

use bevy::prelude::*;

/// Минимальная горизонтальная длина (квадрат), при которой считаем направление валидным
const MIN_LOOK_SQR: f32 = 0.0001;

/// Агент (враг): entity + transform, который контроллер читает и поворачивает
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentBody {
    pub entity: Entity,
    pub position: Vec3,
    pub rotation: Quat,
}

impl AgentBody {
    pub fn new(entity: Entity, position: Vec3, rotation: Quat) -> Self {
        Self {
            entity,
            position,
            rotation,
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Текущий yaw (радианы)
    pub fn yaw(&self) -> f32 {
        yaw_of(self.forward())
    }

    /// Плавный поворот к точке в горизонтальной плоскости (slerp, t = delta * speed)
    pub fn turn_towards(&mut self, point: Vec3, rotation_speed: f32, delta: f32) {
        let Some(look) = horizontal_look_rotation(point - self.position) else {
            return;
        };
        let t = (delta * rotation_speed).clamp(0.0, 1.0);
        self.rotation = self.rotation.slerp(look, t);
    }
}

/// Отслеживаемая цель (обычно игрок)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetInfo {
    pub entity: Entity,
    pub position: Vec3,
}

/// Yaw направления (радианы): 0 = -Z
pub fn yaw_of(direction: Vec3) -> f32 {
    (-direction.x).atan2(-direction.z)
}

/// Поворот "смотреть вдоль direction" без наклона (y игнорируется)
pub fn horizontal_look_rotation(direction: Vec3) -> Option<Quat> {
    let flat = Vec3::new(direction.x, 0.0, direction.z);
    if flat.length_squared() <= MIN_LOOK_SQR {
        return None;
    }
    Some(Quat::from_rotation_y(yaw_of(flat)))
}
