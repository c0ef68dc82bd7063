//! This module contains the math utils that mainly comes from `cgmath`.

pub use cgmath::*;

pub mod prelude {
    pub use cgmath::prelude::*;
    pub use cgmath::{Deg, Matrix4, Point3, Rad, Vector3};
}

use cgmath::{InnerSpace, Matrix, Matrix4, Vector3};

/// The squared length under which a direction is considered degenerate.
pub const DIRECTION_EPSILON2: f32 = 1e-12;

/// Normalizes `v`, or returns `None` if it has no usable length.
#[inline]
pub fn try_normalize(v: Vector3<f32>) -> Option<Vector3<f32>> {
    let len2 = v.magnitude2();
    if len2.is_finite() && len2 > DIRECTION_EPSILON2 {
        Some(v / len2.sqrt())
    } else {
        None
    }
}

/// Converts a cone half-angle in degrees into the cosine compared against in
/// the fragment stage.
#[inline]
pub fn cutoff_cosine(degrees: f32) -> f32 {
    degrees.to_radians().cos()
}

/// Reflects the incident vector `i` about the normal `n`, same as GLSL `reflect`.
#[inline]
pub fn reflect(i: Vector3<f32>, n: Vector3<f32>) -> Vector3<f32> {
    i - n * (2.0 * n.dot(i))
}

/// Returns the rows of `m`. `cgmath` stores matrices column by column.
#[inline]
pub fn row_major(m: &Matrix4<f32>) -> [[f32; 4]; 4] {
    m.transpose().into()
}
