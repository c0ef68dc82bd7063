//! The backend of renderer, which should be responsible for only one thing:
//! talking to the low-level video API on behalf of program objects.

pub mod headless;
mod utils;

pub mod gl;

use crate::video::errors::{Result, ShaderStage};
use crate::video::program::ProgramHandle;
use crate::video::uniform::{UniformLocation, UniformVariable};

/// All the GPU calls made by the program lifecycle and the uniform binders.
///
/// Uniform uploads go to the program bound by the last `use_program`, the same
/// way `glUniform*` does.
pub trait Visitor {
    /// Allocates an empty program container.
    unsafe fn create_program(&mut self, handle: ProgramHandle) -> Result<()>;

    /// Compiles one stage from source and attaches it to the program.
    unsafe fn compile_shader(
        &mut self,
        handle: ProgramHandle,
        stage: ShaderStage,
        source: &str,
    ) -> Result<()>;

    unsafe fn link_program(&mut self, handle: ProgramHandle) -> Result<()>;

    unsafe fn validate_program(&mut self, handle: ProgramHandle) -> Result<()>;

    /// Binds the program for subsequent uploads and draws, or unbinds any.
    unsafe fn use_program(&mut self, handle: Option<ProgramHandle>) -> Result<()>;

    /// Looks up a uniform of a linked program. Missing uniforms are reported as
    /// `UniformLocation::UNRESOLVED` instead of an error.
    unsafe fn uniform_location(
        &mut self,
        handle: ProgramHandle,
        name: &str,
    ) -> Result<UniformLocation>;

    unsafe fn bind_uniform(
        &mut self,
        location: UniformLocation,
        variable: &UniformVariable,
    ) -> Result<()>;

    unsafe fn delete_program(&mut self, handle: ProgramHandle) -> Result<()>;
}

/// A visitor which works without any GPU.
pub fn new_headless() -> Box<dyn Visitor> {
    Box::new(self::headless::HeadlessVisitor::new())
}
