//! Uniform variables and resolved locations.

use crate::math::prelude::{Matrix4, Vector3};

/// A resolved uniform location inside one linked program.
///
/// Locations that could not be resolved are kept as `UNRESOLVED` instead of
/// aborting, uploads to them are silently dropped.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct UniformLocation(i32);

impl UniformLocation {
    pub const UNRESOLVED: UniformLocation = UniformLocation(-1);

    #[inline]
    pub fn new(v: i32) -> Self {
        if v < 0 {
            UniformLocation::UNRESOLVED
        } else {
            UniformLocation(v)
        }
    }

    #[inline]
    pub fn is_resolved(self) -> bool {
        self.0 >= 0
    }

    #[inline]
    pub fn raw(self) -> i32 {
        self.0
    }
}

impl Default for UniformLocation {
    fn default() -> Self {
        UniformLocation::UNRESOLVED
    }
}

/// Uniform variable for video program object. Each matrix based `UniformVariable`
/// is assumed to be supplied in row major order with a optional transpose.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformVariable {
    I32(i32),
    F32(f32),
    Vector3f([f32; 3]),
    Matrix4f([[f32; 4]; 4], bool),
    Sampler2D(u32),
}

impl From<i32> for UniformVariable {
    fn from(v: i32) -> UniformVariable {
        UniformVariable::I32(v)
    }
}

impl From<f32> for UniformVariable {
    fn from(v: f32) -> UniformVariable {
        UniformVariable::F32(v)
    }
}

impl From<Vector3<f32>> for UniformVariable {
    fn from(v: Vector3<f32>) -> UniformVariable {
        UniformVariable::Vector3f(*v.as_ref())
    }
}

impl From<[f32; 3]> for UniformVariable {
    fn from(v: [f32; 3]) -> UniformVariable {
        UniformVariable::Vector3f(v)
    }
}

impl From<Matrix4<f32>> for UniformVariable {
    fn from(v: Matrix4<f32>) -> UniformVariable {
        UniformVariable::Matrix4f(*v.as_ref(), false)
    }
}
