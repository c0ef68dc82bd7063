//! `LightingTechnique` drives one program through its lifecycle, resolves its
//! uniforms once, and then exposes typed per-frame setters.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::math::prelude::{Matrix4, Vector3};
use crate::math;
use crate::utils::hash::FastHashSet;
use crate::video::context::RenderContext;
use crate::video::errors::*;
use crate::video::program::Program;
use crate::video::reflect;
use crate::video::uniform::UniformVariable;

use super::binder::{LightBinder, LightRecord, LightSlot};
use super::layout::LightCategory;
use super::light::{DirectionalLight, Light, LightScene, PointLight, SpotLight};
use super::shaders::{ShaderSources, DEFAULT_GLSL_VERSION};
use super::table::{GlobalUniform, UniformTable};
use super::variant::{Features, Variant, MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS};

/// Matrices are uploaded in row-major order, so GL always transposes them.
const TRANSPOSE_MATRICES: bool = true;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecularMaterial {
    pub specular_intensity: f32,
    pub specular_power: f32,
}

impl Default for SpecularMaterial {
    fn default() -> Self {
        SpecularMaterial {
            specular_intensity: 1.0,
            specular_power: 32.0,
        }
    }
}

/// The non-light uniforms of one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameUniforms {
    pub world: Matrix4<f32>,
    pub world_view_projection: Matrix4<f32>,
    pub eye_world_position: Vector3<f32>,
    pub material: SpecularMaterial,
    pub texture_unit: u32,
}

impl Default for FrameUniforms {
    fn default() -> Self {
        use crate::math::prelude::SquareMatrix;

        FrameUniforms {
            world: Matrix4::identity(),
            world_view_projection: Matrix4::identity(),
            eye_world_position: Vector3::new(0.0, 0.0, 0.0),
            material: SpecularMaterial::default(),
            texture_unit: 0,
        }
    }
}

struct Resolved {
    table: UniformTable,
    directional: LightSlot,
    points: SmallVec<[LightSlot; MAX_POINT_LIGHTS]>,
    spots: SmallVec<[LightSlot; MAX_SPOT_LIGHTS]>,
}

pub struct LightingTechnique {
    features: &'static Features,
    glsl_version: String,
    program: Program,
    resolved: Option<Resolved>,
}

impl LightingTechnique {
    pub fn new(ctx: RenderContext, variant: Variant) -> Self {
        LightingTechnique::with_glsl_version(ctx, variant, DEFAULT_GLSL_VERSION)
    }

    /// Creates a technique whose shaders start with `#version {glsl_version}`.
    pub fn with_glsl_version<T: Into<String>>(ctx: RenderContext, variant: Variant, glsl_version: T) -> Self {
        LightingTechnique {
            features: variant.features(),
            glsl_version: glsl_version.into(),
            program: Program::new(ctx),
            resolved: None,
        }
    }

    /// Builds the program and resolves every uniform the variant declares.
    ///
    /// The first error of the lifecycle is returned, and the technique stays
    /// uninitialized.
    pub fn init(&mut self) -> Result<()> {
        if self.resolved.is_some() {
            return Err(PreconditionError::AlreadyInitialized.into());
        }

        let sources = ShaderSources::new(self.features, &self.glsl_version);

        self.program.init()?;
        self.program.compile_stage(&sources.vertex, ShaderStage::Vertex)?;
        self.program.compile_stage(&sources.fragment, ShaderStage::Fragment)?;
        self.program.link()?;
        self.program.validate()?;

        let mut declared = FastHashSet::default();
        declared.extend(reflect::declared_uniforms(&sources.vertex)?);
        declared.extend(reflect::declared_uniforms(&sources.fragment)?);

        let table = UniformTable::resolve(&self.program, self.features, &declared)?;

        let directional = LightSlot::from_table(&table, LightCategory::Directional, 0);
        let points = (0..self.features.max_point_lights)
            .map(|i| LightSlot::from_table(&table, LightCategory::Point, i))
            .collect();
        let spots = (0..self.features.max_spot_lights)
            .map(|i| LightSlot::from_table(&table, LightCategory::Spot, i))
            .collect();

        let unresolved = table.unresolved().count();
        info!(
            "Lighting technique `{}` is ready with {} uniforms.",
            self.features.variant,
            table.len()
        );

        if unresolved > 0 {
            debug!("{} uniforms are inactive and will be skipped.", unresolved);
        }

        self.resolved = Some(Resolved {
            table,
            directional,
            points,
            spots,
        });

        Ok(())
    }

    /// Makes the program of this technique active.
    pub fn enable(&self) -> Result<()> {
        self.resolved()?;
        self.program.enable()
    }

    pub fn set_world_transform(&self, world: &Matrix4<f32>) -> Result<()> {
        let resolved = self.ready()?;
        self.bind_global(resolved, GlobalUniform::World, matrix(world))
    }

    pub fn set_world_view_projection(&self, wvp: &Matrix4<f32>) -> Result<()> {
        let resolved = self.ready()?;
        self.bind_global(resolved, GlobalUniform::WorldViewProjection, matrix(wvp))
    }

    pub fn set_texture_unit(&self, unit: u32) -> Result<()> {
        let resolved = self.ready()?;
        self.bind_global(resolved, GlobalUniform::Sampler, UniformVariable::Sampler2D(unit))
    }

    pub fn set_directional_light(&self, light: &DirectionalLight) -> Result<()> {
        let resolved = self.ready()?;
        let record = LightBinder::prepare(&resolved.directional, &Light::Directional(*light))?;
        LightBinder::new(&self.program).push(&record)
    }

    /// Uploads the count of point lights and all their fields. No more than
    /// `MAX_POINT_LIGHTS` are accepted.
    pub fn set_point_lights(&self, lights: &[PointLight]) -> Result<()> {
        self.supports(self.features.max_point_lights > 0, "set_point_lights")?;
        let resolved = self.ready()?;

        let records = Self::prepare_lights(
            LightCategory::Point,
            &resolved.points,
            lights.iter().map(|v| Light::Point(*v)),
            lights.len(),
        )?;

        self.bind_global(resolved, GlobalUniform::NumPointLights, lights.len() as i32)?;
        self.push_lights(&records)
    }

    /// Uploads the count of spot lights and all their fields. No more than
    /// `MAX_SPOT_LIGHTS` are accepted.
    pub fn set_spot_lights(&self, lights: &[SpotLight]) -> Result<()> {
        self.supports(self.features.max_spot_lights > 0, "set_spot_lights")?;
        let resolved = self.ready()?;

        let records = Self::prepare_lights(
            LightCategory::Spot,
            &resolved.spots,
            lights.iter().map(|v| Light::Spot(*v)),
            lights.len(),
        )?;

        self.bind_global(resolved, GlobalUniform::NumSpotLights, lights.len() as i32)?;
        self.push_lights(&records)
    }

    pub fn set_eye_world_position(&self, position: Vector3<f32>) -> Result<()> {
        self.supports(self.features.specular, "set_eye_world_position")?;
        let resolved = self.ready()?;
        self.bind_global(resolved, GlobalUniform::EyeWorldPos, position)
    }

    pub fn set_material_specular_intensity(&self, intensity: f32) -> Result<()> {
        self.supports(self.features.specular, "set_material_specular_intensity")?;
        let resolved = self.ready()?;
        self.bind_global(resolved, GlobalUniform::MatSpecularIntensity, intensity)
    }

    pub fn set_material_specular_power(&self, power: f32) -> Result<()> {
        self.supports(self.features.specular, "set_material_specular_power")?;
        let resolved = self.ready()?;
        self.bind_global(resolved, GlobalUniform::MatSpecularPower, power)
    }

    /// Pushes a whole frame, uploading every item the variant supports.
    ///
    /// Lights of a category the variant can't show are rejected instead of
    /// being dropped silently. Every light is checked before the first upload,
    /// so a rejected frame leaves the program untouched.
    pub fn apply(&self, frame: &FrameUniforms, scene: &LightScene) -> Result<()> {
        let resolved = self.ready()?;

        if !scene.points.is_empty() {
            self.supports(self.features.max_point_lights > 0, "point lights")?;
        }

        if !scene.spots.is_empty() {
            self.supports(self.features.max_spot_lights > 0, "spot lights")?;
        }

        let directional = LightBinder::prepare(&resolved.directional, &Light::Directional(scene.directional))?;

        let points = Self::prepare_lights(
            LightCategory::Point,
            &resolved.points,
            scene.points.iter().map(|v| Light::Point(*v)),
            scene.points.len(),
        )?;

        let spots = Self::prepare_lights(
            LightCategory::Spot,
            &resolved.spots,
            scene.spots.iter().map(|v| Light::Spot(*v)),
            scene.spots.len(),
        )?;

        self.bind_global(resolved, GlobalUniform::WorldViewProjection, matrix(&frame.world_view_projection))?;
        self.bind_global(resolved, GlobalUniform::World, matrix(&frame.world))?;
        self.bind_global(resolved, GlobalUniform::Sampler, UniformVariable::Sampler2D(frame.texture_unit))?;
        LightBinder::new(&self.program).push(&directional)?;

        if self.features.specular {
            self.bind_global(resolved, GlobalUniform::EyeWorldPos, frame.eye_world_position)?;
            self.bind_global(resolved, GlobalUniform::MatSpecularIntensity, frame.material.specular_intensity)?;
            self.bind_global(resolved, GlobalUniform::MatSpecularPower, frame.material.specular_power)?;
        }

        if self.features.max_point_lights > 0 {
            self.bind_global(resolved, GlobalUniform::NumPointLights, scene.points.len() as i32)?;
            self.push_lights(&points)?;
        }

        if self.features.max_spot_lights > 0 {
            self.bind_global(resolved, GlobalUniform::NumSpotLights, scene.spots.len() as i32)?;
            self.push_lights(&spots)?;
        }

        Ok(())
    }

    #[inline]
    pub fn variant(&self) -> Variant {
        self.features.variant
    }

    #[inline]
    pub fn features(&self) -> &'static Features {
        self.features
    }

    #[inline]
    pub fn glsl_version(&self) -> &str {
        &self.glsl_version
    }

    /// Gets the uniform table, if the technique is initialized.
    #[inline]
    pub fn uniforms(&self) -> Option<&UniformTable> {
        self.resolved.as_ref().map(|v| &v.table)
    }

    #[inline]
    pub fn program(&self) -> &Program {
        &self.program
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.resolved.is_some()
    }
}

impl LightingTechnique {
    fn resolved(&self) -> Result<&Resolved> {
        self.resolved
            .as_ref()
            .ok_or_else(|| PreconditionError::NotInitialized.into())
    }

    fn ready(&self) -> Result<&Resolved> {
        let resolved = self.resolved()?;
        if !self.program.is_active() {
            return Err(PreconditionError::NotActive.into());
        }

        Ok(resolved)
    }

    fn supports(&self, supported: bool, operation: &'static str) -> Result<()> {
        if supported {
            Ok(())
        } else {
            Err(PreconditionError::Unsupported {
                variant: self.features.variant,
                operation,
            }
            .into())
        }
    }

    fn bind_global<T>(&self, resolved: &Resolved, uniform: GlobalUniform, v: T) -> Result<()>
    where
        T: Into<UniformVariable>,
    {
        match resolved.table.location(uniform) {
            Some(location) => self.program.bind(location, v),
            None => Ok(()),
        }
    }

    fn prepare_lights<I>(
        category: LightCategory,
        slots: &[LightSlot],
        lights: I,
        len: usize,
    ) -> Result<SmallVec<[LightRecord; 4]>>
    where
        I: Iterator<Item = Light>,
    {
        if len > slots.len() {
            return Err(PreconditionError::TooManyLights {
                category,
                len,
                cap: slots.len(),
            }
            .into());
        }

        let mut records = SmallVec::new();
        for (slot, light) in slots.iter().zip(lights) {
            records.push(LightBinder::prepare(slot, &light)?);
        }

        Ok(records)
    }

    fn push_lights(&self, records: &[LightRecord]) -> Result<()> {
        let binder = LightBinder::new(&self.program);
        for record in records {
            binder.push(record)?;
        }

        Ok(())
    }
}

#[inline]
fn matrix(m: &Matrix4<f32>) -> UniformVariable {
    UniformVariable::Matrix4f(math::row_major(m), TRANSPOSE_MATRICES)
}
