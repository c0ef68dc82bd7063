//! Forward Phong lighting as a ladder of five techniques.
//!
//! Each `Variant` maps to a static `Features` descriptor. The descriptor
//! decides which fragment chunks are assembled, which uniforms get resolved
//! and which setters of `LightingTechnique` are available:
//!
//! | variant        | adds                                        |
//! |----------------|---------------------------------------------|
//! | `Ambient`      | `Color * AmbientIntensity`                  |
//! | `Diffuse`      | the Lambert term of the directional light   |
//! | `Specular`     | eye position and material specular          |
//! | `PointLights`  | up to 3 attenuated point lights             |
//! | `SpotLights`   | up to 2 spot lights with a smoothed cone    |
//!
//! ```rust
//! use lumen::prelude::*;
//!
//! let ctx = RenderContext::headless();
//! let mut technique = LightingTechnique::new(ctx, Variant::SpotLights);
//! technique.init().unwrap();
//! technique.enable().unwrap();
//!
//! let mut rig = OrbitRig::new();
//! rig.advance();
//!
//! let frame = rig.frame(Matrix4::from_scale(1.0), Matrix4::from_scale(1.0));
//! technique.apply(&frame, &rig.scene()).unwrap();
//! ```

pub mod binder;
pub mod layout;
pub mod light;
pub mod shaders;
pub mod shading;
pub mod showcase;
pub mod table;
pub mod technique;
pub mod variant;

pub use self::binder::{LightBinder, LightRecord, LightSlot};
pub use self::layout::{LightCategory, LightField, LightLayout, LightStruct};
pub use self::light::*;
pub use self::shaders::{ShaderSources, DEFAULT_GLSL_VERSION};
pub use self::showcase::OrbitRig;
pub use self::table::{GlobalUniform, UniformEntry, UniformKey, UniformTable};
pub use self::technique::{FrameUniforms, LightingTechnique, SpecularMaterial};
pub use self::variant::{Features, Variant, MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS};
