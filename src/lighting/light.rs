//! The light data model. Lights are plain values that are borrowed for one
//! upload and never retained.

use serde::{Deserialize, Serialize};

use crate::math::prelude::Vector3;
use crate::video::errors::PreconditionError;

use super::layout::LightCategory;

/// The smallest constant term of an `Attenuation`, which keeps the falloff
/// denominator positive when a light sits exactly on the shaded point.
pub const ATTENUATION_EPSILON: f32 = 1e-4;

/// Color and intensities shared by every kind of light.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseLight {
    pub color: Vector3<f32>,
    pub ambient_intensity: f32,
    pub diffuse_intensity: f32,
}

impl Default for BaseLight {
    fn default() -> Self {
        BaseLight {
            color: Vector3::new(0.0, 0.0, 0.0),
            ambient_intensity: 0.0,
            diffuse_intensity: 0.0,
        }
    }
}

impl BaseLight {
    pub fn new(color: Vector3<f32>, ambient_intensity: f32, diffuse_intensity: f32) -> Self {
        BaseLight {
            color,
            ambient_intensity,
            diffuse_intensity,
        }
    }

    fn validate(&self) -> Result<(), PreconditionError> {
        for &v in &[self.ambient_intensity, self.diffuse_intensity] {
            // NaN fails this test as well.
            if !(v >= 0.0) {
                return Err(PreconditionError::NegativeIntensity(v));
            }
        }

        Ok(())
    }
}

/// A light infinitely far away. `direction` is the direction the rays travel
/// in, it doesn't have to be normalized.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalLight {
    pub base: BaseLight,
    pub direction: Vector3<f32>,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        DirectionalLight {
            base: BaseLight::default(),
            direction: Vector3::new(0.0, 0.0, 1.0),
        }
    }
}

/// The falloff `1 / (constant + linear * d + exp * d * d)` over distance `d`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub exp: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Attenuation {
            constant: 1.0,
            linear: 0.0,
            exp: 0.0,
        }
    }
}

impl Attenuation {
    #[inline]
    pub fn factor(&self, distance: f32) -> f32 {
        self.constant + self.linear * distance + self.exp * distance * distance
    }

    fn validate(&self) -> Result<(), PreconditionError> {
        if !(self.constant >= ATTENUATION_EPSILON) {
            return Err(PreconditionError::AttenuationConstant(self.constant));
        }

        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointLight {
    pub base: BaseLight,
    pub position: Vector3<f32>,
    pub attenuation: Attenuation,
}

impl Default for PointLight {
    fn default() -> Self {
        PointLight {
            base: BaseLight::default(),
            position: Vector3::new(0.0, 0.0, 0.0),
            attenuation: Attenuation::default(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotLight {
    pub base: BaseLight,
    pub position: Vector3<f32>,
    pub attenuation: Attenuation,
    pub direction: Vector3<f32>,
    /// Half angle of the cone in degrees.
    pub cutoff: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        SpotLight {
            base: BaseLight::default(),
            position: Vector3::new(0.0, 0.0, 0.0),
            attenuation: Attenuation::default(),
            direction: Vector3::new(0.0, 0.0, 1.0),
            cutoff: 20.0,
        }
    }
}

/// One light of any kind, as pushed by `LightBinder`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Light {
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
}

impl Light {
    pub fn kind(&self) -> LightCategory {
        match *self {
            Light::Directional(_) => LightCategory::Directional,
            Light::Point(_) => LightCategory::Point,
            Light::Spot(_) => LightCategory::Spot,
        }
    }

    pub fn base(&self) -> &BaseLight {
        match *self {
            Light::Directional(ref v) => &v.base,
            Light::Point(ref v) => &v.base,
            Light::Spot(ref v) => &v.base,
        }
    }

    pub fn position(&self) -> Option<Vector3<f32>> {
        match *self {
            Light::Directional(_) => None,
            Light::Point(ref v) => Some(v.position),
            Light::Spot(ref v) => Some(v.position),
        }
    }

    pub fn attenuation(&self) -> Option<&Attenuation> {
        match *self {
            Light::Directional(_) => None,
            Light::Point(ref v) => Some(&v.attenuation),
            Light::Spot(ref v) => Some(&v.attenuation),
        }
    }

    /// The raw direction, before normalization.
    pub fn direction(&self) -> Option<Vector3<f32>> {
        match *self {
            Light::Directional(ref v) => Some(v.direction),
            Light::Point(_) => None,
            Light::Spot(ref v) => Some(v.direction),
        }
    }

    /// The cutoff in degrees.
    pub fn cutoff(&self) -> Option<f32> {
        match *self {
            Light::Spot(ref v) => Some(v.cutoff),
            _ => None,
        }
    }

    /// Checks the intensities and attenuation of this light.
    pub fn validate(&self) -> Result<(), PreconditionError> {
        self.base().validate()?;
        if let Some(attenuation) = self.attenuation() {
            attenuation.validate()?;
        }

        Ok(())
    }
}

impl From<DirectionalLight> for Light {
    fn from(v: DirectionalLight) -> Self {
        Light::Directional(v)
    }
}

impl From<PointLight> for Light {
    fn from(v: PointLight) -> Self {
        Light::Point(v)
    }
}

impl From<SpotLight> for Light {
    fn from(v: SpotLight) -> Self {
        Light::Spot(v)
    }
}

/// The lights of one frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LightScene {
    pub directional: DirectionalLight,
    pub points: Vec<PointLight>,
    pub spots: Vec<SpotLight>,
}
