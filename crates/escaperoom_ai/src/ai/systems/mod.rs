//! AI systems (FixedUpdate, строго по порядку)

pub mod lifecycle;
pub mod strikes;
pub mod tick;

// Re-export all systems
pub use lifecycle::*;
pub use strikes::*;
pub use tick::*;
