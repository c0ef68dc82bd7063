//! JSON configuration of a technique and, optionally, a static light scene.
//!
//! ```json
//! {
//!     "technique": { "variant": "point_lights", "glsl_version": "330 core" },
//!     "scene": {
//!         "directional": {
//!             "base": { "color": { "x": 1.0, "y": 1.0, "z": 1.0 }, "ambient_intensity": 0.1 },
//!             "direction": { "x": 1.0, "y": 0.0, "z": 0.0 }
//!         }
//!     }
//! }
//! ```
//!
//! Every field is optional and falls back to its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::lighting::{LightCategory, LightScene, LightingTechnique, SpecularMaterial, Variant};
use crate::lighting::DEFAULT_GLSL_VERSION;
use crate::video::context::RenderContext;
use crate::video::errors::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechniqueParams {
    pub variant: Variant,
    pub glsl_version: String,
    pub texture_unit: u32,
    pub material: SpecularMaterial,
}

impl Default for TechniqueParams {
    fn default() -> Self {
        TechniqueParams {
            variant: Variant::default(),
            glsl_version: DEFAULT_GLSL_VERSION.to_owned(),
            texture_unit: 0,
            material: SpecularMaterial::default(),
        }
    }
}

impl TechniqueParams {
    /// Creates an uninitialized technique with these parameters.
    pub fn create(&self, ctx: RenderContext) -> LightingTechnique {
        LightingTechnique::with_glsl_version(ctx, self.variant, self.glsl_version.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub technique: TechniqueParams,
    pub scene: Option<LightScene>,
}

impl Settings {
    /// Loads settings from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let settings = Settings::from_json(&text)?;
        info!("Settings are loaded from {}.", path.display());
        Ok(settings)
    }

    /// Parses and checks settings from a JSON document.
    pub fn from_json(text: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(text)?;
        settings.check()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that the scene fits into the configured variant.
    pub fn check(&self) -> Result<()> {
        let scene = match self.scene {
            Some(ref scene) => scene,
            None => return Ok(()),
        };

        let features = self.technique.variant.features();
        for &(category, len) in &[
            (LightCategory::Point, scene.points.len()),
            (LightCategory::Spot, scene.spots.len()),
        ] {
            let cap = features.capacity(category);
            if len > 0 && cap == 0 {
                return Err(Error::Settings(format!(
                    "variant `{}` can't show {} lights.",
                    features.variant, category
                )));
            }

            if len > cap {
                return Err(PreconditionError::TooManyLights { category, len, cap }.into());
            }
        }

        Ok(())
    }
}
