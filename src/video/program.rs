//! The lifecycle of a GPU program object.
//!
//! A `Program` walks through `init`, `compile_stage`, `link`, `validate` and
//! `enable` in order. Each step reports failures as `Error`s with the driver
//! diagnostics attached, and nothing is ever retried. The program object is
//! deleted exactly once, when the `Program` is dropped.

use smallvec::SmallVec;

use super::context::RenderContext;
use super::errors::*;
use super::uniform::{UniformLocation, UniformVariable};

impl_handle!(ProgramHandle);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProgramStatus {
    /// No program object has been created yet.
    Uninitialized,
    /// The program object exists and stages can be attached to it.
    Created,
    Linked,
    /// Linked and validated, the program could be enabled.
    Validated,
    /// A link or validation attempt failed. The program is unusable.
    Invalid,
}

pub struct Program {
    ctx: RenderContext,
    handle: Option<ProgramHandle>,
    stages: SmallVec<[ShaderStage; 2]>,
    status: ProgramStatus,
}

impl Program {
    pub fn new(ctx: RenderContext) -> Self {
        Program {
            ctx,
            handle: None,
            stages: SmallVec::new(),
            status: ProgramStatus::Uninitialized,
        }
    }

    /// Creates the underlying program object.
    pub fn init(&mut self) -> Result<()> {
        if self.handle.is_some() {
            return Err(PreconditionError::AlreadyInitialized.into());
        }

        let handle = self.ctx.create_program()?;
        debug!("{} is created.", handle);

        self.handle = Some(handle);
        self.status = ProgramStatus::Created;
        Ok(())
    }

    /// Compiles `source` as `stage` and attaches it. Each stage could be
    /// attached once.
    pub fn compile_stage(&mut self, source: &str, stage: ShaderStage) -> Result<()> {
        let handle = self.handle()?;

        if self.stages.contains(&stage) {
            return Err(PreconditionError::StageAttached(stage).into());
        }

        if self.status != ProgramStatus::Created {
            return Err(PreconditionError::NotUsable.into());
        }

        self.ctx.compile_shader(handle, stage, source)?;
        self.stages.push(stage);
        Ok(())
    }

    /// Links all the attached stages into an executable. Linking without both
    /// stages fails without touching the backend.
    pub fn link(&mut self) -> Result<()> {
        let handle = self.handle()?;

        for &stage in &[ShaderStage::Vertex, ShaderStage::Fragment] {
            if !self.stages.contains(&stage) {
                return Err(Error::Link(format!("{} stage is not attached.", stage)));
            }
        }

        if self.status != ProgramStatus::Created {
            return Err(PreconditionError::NotUsable.into());
        }

        if let Err(err) = self.ctx.link_program(handle) {
            self.status = ProgramStatus::Invalid;
            return Err(err);
        }

        self.status = ProgramStatus::Linked;
        Ok(())
    }

    /// Checks the linked program could execute in the current pipeline state.
    pub fn validate(&mut self) -> Result<()> {
        let handle = self.handle()?;

        match self.status {
            ProgramStatus::Linked | ProgramStatus::Validated => {}
            _ => {
                return Err(Error::Validation(format!(
                    "{} has not been linked successfully.",
                    handle
                )))
            }
        }

        if let Err(err) = self.ctx.validate_program(handle) {
            self.status = ProgramStatus::Invalid;
            return Err(err);
        }

        self.status = ProgramStatus::Validated;
        Ok(())
    }

    /// Makes this program the active one of its context.
    pub fn enable(&self) -> Result<()> {
        let handle = self.handle()?;
        if self.status != ProgramStatus::Validated {
            return Err(PreconditionError::NotUsable.into());
        }

        self.ctx.use_program(handle)
    }

    /// Looks up the location of a uniform by its fully-qualified name.
    ///
    /// Uniforms that are missing or optimized away resolve to
    /// `UniformLocation::UNRESOLVED` with a warning instead of an error.
    pub fn resolve_uniform(&self, name: &str) -> Result<UniformLocation> {
        let handle = self.handle()?;
        match self.status {
            ProgramStatus::Linked | ProgramStatus::Validated => {}
            _ => return Err(PreconditionError::NotUsable.into()),
        }

        let location = self.ctx.uniform_location(handle, name)?;
        if !location.is_resolved() {
            warn!("Unable to get the location of uniform '{}'.", name);
        }

        Ok(location)
    }

    /// Uploads `variable` to `location`. Uploads to an unresolved location are
    /// silently dropped.
    pub fn bind<T>(&self, location: UniformLocation, variable: T) -> Result<()>
    where
        T: Into<UniformVariable>,
    {
        if !location.is_resolved() {
            return Ok(());
        }

        let handle = self.handle()?;
        self.ctx.bind_uniform(handle, location, &variable.into())
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        match self.handle {
            Some(handle) => self.ctx.is_active(handle),
            None => false,
        }
    }

    #[inline]
    pub fn status(&self) -> ProgramStatus {
        self.status
    }

    #[inline]
    pub fn stages(&self) -> &[ShaderStage] {
        &self.stages
    }

    /// Gets the handle of the program object.
    #[inline]
    pub fn handle(&self) -> Result<ProgramHandle> {
        self.handle
            .ok_or_else(|| PreconditionError::NotInitialized.into())
    }

    #[inline]
    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            match self.ctx.delete_program(handle) {
                Ok(_) => debug!("{} is deleted.", handle),
                Err(err) => warn!("Failed to delete {}: {}", handle, err),
            }
        }
    }
}
