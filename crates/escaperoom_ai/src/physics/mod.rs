//! Headless raycast backend на коллайдерах Rapier
//!
//! Коллайдеры — обычные `bevy_rapier3d` компоненты (`Collider`, `CollisionGroups`),
//! без `RapierPhysicsPlugin`: шаг физики не нужен, только ray queries.
//! `ObstacleField` пересобирается каждый тик из `Collider` + `Transform`
//! и отдаётся AI как `RaycastService`.

use std::fmt;

use bevy::prelude::*;
use bevy_rapier3d::prelude::{Collider, CollisionGroups, Group};

use crate::ai::adapters::{LayerMask, RayHit, RaycastService};

/// Крепление коллайдера к entity
///
/// `owner` — корневая entity (например, игрок для коллайдера его головы).
/// Без owner'а коллайдер принадлежит своей entity.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct ColliderMount {
    pub owner: Option<Entity>,
    /// Смещение центра относительно Transform (например, на уровень глаз)
    pub offset: Vec3,
}

impl ColliderMount {
    pub fn offset(offset: Vec3) -> Self {
        Self {
            owner: None,
            offset,
        }
    }

    pub fn attached_to(mut self, owner: Entity) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Physics-слой (0..31) → rapier Group
pub fn layer_group(layer: u8) -> Group {
    Group::from_bits_truncate(1u32.checked_shl(u32::from(layer)).unwrap_or(0))
}

pub fn mask_group(layers: LayerMask) -> Group {
    Group::from_bits_truncate(layers.0)
}

/// CollisionGroups коллайдера на одном слое
pub fn layer_groups(layer: u8) -> CollisionGroups {
    CollisionGroups::new(layer_group(layer), Group::ALL)
}

/// Снимок коллайдера в мировых координатах
#[derive(Clone)]
pub struct PlacedCollider {
    pub collider: Entity,
    pub owner: Entity,
    pub shape: Collider,
    pub translation: Vec3,
    pub rotation: Quat,
    pub memberships: Group,
}

impl fmt::Debug for PlacedCollider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlacedCollider")
            .field("collider", &self.collider)
            .field("owner", &self.owner)
            .field("translation", &self.translation)
            .field("memberships", &self.memberships.bits())
            .finish_non_exhaustive()
    }
}

impl PlacedCollider {
    /// Расстояние до входа луча в коллайдер.
    /// Луч, стартующий внутри коллайдера, его не видит.
    fn entry_distance(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
        let toi = self.shape.cast_ray(
            self.translation,
            self.rotation,
            origin,
            direction,
            max_distance,
            true,
        )?;
        (toi > 0.0).then_some(toi)
    }
}

/// Набор коллайдеров сцены (Resource)
#[derive(Resource, Clone, Default)]
pub struct ObstacleField {
    colliders: Vec<PlacedCollider>,
}

impl fmt::Debug for ObstacleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.colliders).finish()
    }
}

impl ObstacleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, placed: PlacedCollider) {
        self.colliders.push(placed);
    }

    pub fn add_sphere(&mut self, collider: Entity, owner: Entity, center: Vec3, radius: f32, layer: u8) {
        self.add(PlacedCollider {
            collider,
            owner,
            shape: Collider::ball(radius),
            translation: center,
            rotation: Quat::IDENTITY,
            memberships: layer_group(layer),
        });
    }

    /// Убрать все коллайдеры entity (и прикреплённые к ней)
    pub fn remove_owned_by(&mut self, owner: Entity) {
        self.colliders
            .retain(|placed| placed.owner != owner && placed.collider != owner);
    }

    pub fn clear(&mut self) {
        self.colliders.clear();
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn colliders(&self) -> &[PlacedCollider] {
        &self.colliders
    }
}

impl RaycastService for ObstacleField {
    fn cast_all_sorted(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Vec<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return Vec::new();
        }

        let filter = mask_group(layers);
        let mut hits: Vec<RayHit> = self
            .colliders
            .iter()
            .filter(|placed| placed.memberships.intersects(filter))
            .filter_map(|placed| {
                let distance = placed.entry_distance(origin, direction, max_distance)?;
                Some(RayHit {
                    distance,
                    collider: placed.collider,
                    owner: placed.owner,
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

/// Система: пересобрать ObstacleField из rapier Collider компонентов
pub fn sync_obstacle_field(
    mut field: ResMut<ObstacleField>,
    colliders: Query<(
        Entity,
        &Transform,
        &Collider,
        Option<&CollisionGroups>,
        Option<&ColliderMount>,
    )>,
) {
    field.clear();
    for (entity, transform, collider, groups, mount) in colliders.iter() {
        let mount = mount.copied().unwrap_or_default();
        field.add(PlacedCollider {
            collider: entity,
            owner: mount.owner.unwrap_or(entity),
            shape: collider.clone(),
            translation: transform.translation + transform.rotation * mount.offset,
            rotation: transform.rotation,
            memberships: groups.map(|groups| groups.memberships).unwrap_or(Group::ALL),
        });
    }
    // порядок Query не гарантирован — сортируем для детерминизма
    field.colliders.sort_by_key(|placed| placed.collider);
}
