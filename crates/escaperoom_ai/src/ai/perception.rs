//! Perception — line-of-sight тест агент → цель
//!
//! Порядок проверок (short-circuit на первой неудаче):
//! 1. Дистанция ≤ view_distance
//! 2. Угол к цели ≤ view_angle / 2 (dot нормализованных векторов против cos)
//! 3. RaycastAll от глаз агента к глазам цели, отсортированный по distance
//! 4. Первый не-свой hit решает: цель (или её часть) → видим, иначе препятствие
//!
//! "Ближайшее препятствие побеждает", не any-hit.

use bevy::prelude::*;

use crate::ai::adapters::RaycastService;
use crate::ai::body::{AgentBody, TargetInfo};
use crate::config::PerceptionConfig;

/// Stateless LOS тест. Fail-closed: нет цели или raycast'а → false.
pub fn can_see(
    config: &PerceptionConfig,
    agent: &AgentBody,
    target: Option<&TargetInfo>,
    raycast: Option<&dyn RaycastService>,
) -> bool {
    let Some(target) = target else {
        return false;
    };

    let to_target = target.position - agent.position;
    if to_target.length() > config.view_distance {
        return false;
    }

    if !within_view_cone(config.view_angle, agent.forward(), to_target) {
        return false;
    }

    let Some(raycast) = raycast else {
        return false;
    };

    let eye = Vec3::Y * config.eye_height;
    let origin = agent.position + eye;
    let direction = (target.position + eye - origin).normalize_or_zero();
    if direction == Vec3::ZERO {
        return false;
    }

    let hits = raycast.cast_all_sorted(
        origin,
        direction,
        config.view_distance,
        config.obstacle_mask.or_all(),
    );

    hits.iter()
        .find(|hit| !hit.belongs_to(agent.entity))
        .map(|hit| hit.belongs_to(target.entity))
        .unwrap_or(false)
}

/// Угол между forward и направлением на цель ≤ половины view_angle
pub fn within_view_cone(view_angle_degrees: f32, forward: Vec3, to_target: Vec3) -> bool {
    let cos_angle = forward.normalize_or_zero().dot(to_target.normalize_or_zero());
    let half_angle = (view_angle_degrees * 0.5).to_radians();
    cos_angle >= half_angle.cos()
}
