//! Core types: math re-exports, Transform, bounding boxes.

pub use glam::{EulerRot, Mat4, Quat, Vec2, Vec3, vec2, vec3};

pub mod bounds;
pub mod transform;

pub use bounds::Aabb;
pub use transform::Transform;
