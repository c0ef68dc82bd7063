//! A thin layer over the GPU program object.
//!
//! # Program Lifecycle
//!
//! Programs are created inside a `RenderContext`, which owns the backend
//! (`GLVisitor` for a real OpenGL context, `HeadlessVisitor` for everything
//! else) and keeps track of the active program.
//!
//! ```rust
//! use lumen::video::prelude::*;
//!
//! const VS: &str = "uniform mat4 gWVP;\nvoid main() { gl_Position = gWVP * vec4(0.0); }";
//! const FS: &str = "uniform vec3 gColor;\nvoid main() {}";
//!
//! let ctx = RenderContext::headless();
//! let mut program = Program::new(ctx.clone());
//! program.init().unwrap();
//! program.compile_stage(VS, ShaderStage::Vertex).unwrap();
//! program.compile_stage(FS, ShaderStage::Fragment).unwrap();
//! program.link().unwrap();
//! program.validate().unwrap();
//! program.enable().unwrap();
//!
//! let color = program.resolve_uniform("gColor").unwrap();
//! program.bind(color, [1.0f32, 0.5, 0.0]).unwrap();
//! ```
//!
//! Uniforms that can't be found resolve to `UniformLocation::UNRESOLVED`, and
//! any upload to them is dropped silently.

pub mod backends;
pub mod context;
pub mod errors;
pub mod program;
pub mod reflect;
pub mod uniform;

pub mod prelude {
    pub use super::backends::headless::{Fault, HeadlessProbe, HeadlessVisitor};
    pub use super::backends::Visitor;
    pub use super::context::RenderContext;
    pub use super::errors::{Error, PreconditionError, Result, ShaderStage};
    pub use super::program::{Program, ProgramHandle, ProgramStatus};
    pub use super::uniform::{UniformLocation, UniformVariable};
}
