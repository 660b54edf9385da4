//! Math types
//!
//! Sound positions and the listener live in the host's world space.

pub use nalgebra::Vector3;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Distance between two points
pub fn distance(a: &Vec3, b: &Vec3) -> f32 {
    (a - b).norm()
}
