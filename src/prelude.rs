pub use crate::math;
pub use crate::math::prelude::*;

pub use crate::utils;

pub use crate::video;
pub use crate::video::prelude::*;

pub use crate::lighting;
pub use crate::lighting::{
    Attenuation, BaseLight, DirectionalLight, FrameUniforms, Light, LightCategory, LightScene,
    LightingTechnique, OrbitRig, PointLight, SpecularMaterial, SpotLight, UniformKey, Variant,
};

pub use crate::settings::{Settings, TechniqueParams};
