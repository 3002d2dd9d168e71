//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: игрок и здоровье (Player, Health)
//! - ai: за кем следит враг (TrackedTarget)

pub mod actor;
pub mod ai;

// Re-exports для удобного импорта
pub use actor::*;
pub use ai::*;
