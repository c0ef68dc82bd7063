use std::cell::RefCell;
use std::ffi::CString;

use gl;
use gl::types::*;
use smallvec::SmallVec;

use crate::utils::hash::FastHashMap;
use crate::utils::hash_value::HashValue;
use crate::video::errors::*;
use crate::video::program::ProgramHandle;
use crate::video::uniform::{UniformLocation, UniformVariable};

use super::super::utils::DataVec;
use super::super::Visitor;
use super::capabilities::Capabilities;
use super::types;

#[derive(Debug)]
struct GLProgramData {
    handle: ProgramHandle,
    id: GLuint,
    shaders: SmallVec<[(ShaderStage, GLuint); 2]>,
    uniforms: RefCell<FastHashMap<HashValue<str>, GLint>>,
}

impl GLProgramData {
    unsafe fn uniform_location(&self, name: &str) -> Result<GLint> {
        let hash: HashValue<str> = name.into();
        let mut uniforms = self.uniforms.borrow_mut();
        match uniforms.get(&hash).cloned() {
            Some(location) => Ok(location),
            None => {
                let c_name = CString::new(name.as_bytes())
                    .map_err(|_| Error::Backend(format!("[GL] Uniform name {:?} has nul.", name)))?;

                let location = gl::GetUniformLocation(self.id, c_name.as_ptr());
                check()?;

                uniforms.insert(hash, location);
                Ok(location)
            }
        }
    }

    unsafe fn release_shaders(&mut self) {
        for (_, shader) in self.shaders.drain() {
            gl::DetachShader(self.id, shader);
            gl::DeleteShader(shader);
        }
    }
}

pub struct GLVisitor {
    capabilities: Capabilities,
    programs: DataVec<GLProgramData>,
    binded_program: Option<ProgramHandle>,
}

impl GLVisitor {
    /// Creates a visitor on top of the current context.
    ///
    /// # Unsafe
    ///
    /// The GL functions must have been loaded for a context which is current in this thread.
    pub unsafe fn new() -> Result<Self> {
        let capabilities = Capabilities::parse()?;
        info!("GLVisitor {:#?}", capabilities);
        capabilities.check()?;

        Ok(GLVisitor {
            capabilities,
            programs: DataVec::new(),
            binded_program: None,
        })
    }

    #[inline]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn program(&self, handle: ProgramHandle) -> Result<&GLProgramData> {
        self.programs
            .get(handle)
            .ok_or_else(|| Error::Backend(format!("{} is invalid.", handle)))
    }

    fn program_mut(&mut self, handle: ProgramHandle) -> Result<&mut GLProgramData> {
        self.programs
            .get_mut(handle)
            .ok_or_else(|| Error::Backend(format!("{} is invalid.", handle)))
    }
}

impl Visitor for GLVisitor {
    unsafe fn create_program(&mut self, handle: ProgramHandle) -> Result<()> {
        let id = gl::CreateProgram();
        if id == 0 {
            return Err(Error::ProgramCreation);
        }

        check()?;

        let data = GLProgramData {
            handle,
            id,
            shaders: SmallVec::new(),
            uniforms: RefCell::new(FastHashMap::default()),
        };

        self.programs.create(handle, data);
        Ok(())
    }

    unsafe fn compile_shader(
        &mut self,
        handle: ProgramHandle,
        stage: ShaderStage,
        source: &str,
    ) -> Result<()> {
        let program = self.program(handle)?.id;
        let shader = Self::compile(stage, source)?;

        gl::AttachShader(program, shader);
        check()?;

        self.program_mut(handle)?.shaders.push((stage, shader));
        Ok(())
    }

    unsafe fn link_program(&mut self, handle: ProgramHandle) -> Result<()> {
        let program = self.program_mut(handle)?;
        gl::LinkProgram(program.id);

        let mut status = GLint::from(gl::FALSE);
        gl::GetProgramiv(program.id, gl::LINK_STATUS, &mut status);

        if status != GLint::from(gl::TRUE) {
            return Err(Error::Link(program_info_log(program.id)));
        }

        // Stage objects are no longer needed once the executable is linked.
        program.release_shaders();
        program.uniforms.borrow_mut().clear();
        check()
    }

    unsafe fn validate_program(&mut self, handle: ProgramHandle) -> Result<()> {
        let id = self.program(handle)?.id;
        gl::ValidateProgram(id);

        let mut status = GLint::from(gl::FALSE);
        gl::GetProgramiv(id, gl::VALIDATE_STATUS, &mut status);

        if status != GLint::from(gl::TRUE) {
            return Err(Error::Validation(program_info_log(id)));
        }

        check()
    }

    unsafe fn use_program(&mut self, handle: Option<ProgramHandle>) -> Result<()> {
        if self.binded_program == handle {
            return Ok(());
        }

        let id = match handle {
            Some(handle) => self.program(handle)?.id,
            None => 0,
        };

        gl::UseProgram(id);
        check()?;

        self.binded_program = handle;
        Ok(())
    }

    unsafe fn uniform_location(
        &mut self,
        handle: ProgramHandle,
        name: &str,
    ) -> Result<UniformLocation> {
        let location = self.program(handle)?.uniform_location(name)?;
        Ok(UniformLocation::new(location))
    }

    unsafe fn bind_uniform(
        &mut self,
        location: UniformLocation,
        variable: &UniformVariable,
    ) -> Result<()> {
        if !location.is_resolved() {
            return Ok(());
        }

        let location = location.raw();
        match *variable {
            UniformVariable::I32(v) => gl::Uniform1i(location, v),
            UniformVariable::F32(v) => gl::Uniform1f(location, v),
            UniformVariable::Vector3f(v) => gl::Uniform3f(location, v[0], v[1], v[2]),
            UniformVariable::Matrix4f(v, transpose) => {
                gl::UniformMatrix4fv(location, 1, types::boolean(transpose), v[0].as_ptr())
            }
            UniformVariable::Sampler2D(unit) => gl::Uniform1i(location, unit as GLint),
        }

        check()
    }

    unsafe fn delete_program(&mut self, handle: ProgramHandle) -> Result<()> {
        let mut program = self
            .programs
            .free(handle)
            .ok_or_else(|| Error::Backend(format!("{} is invalid.", handle)))?;

        if self.binded_program == Some(program.handle) {
            gl::UseProgram(0);
            self.binded_program = None;
        }

        program.release_shaders();
        gl::DeleteProgram(program.id);
        check()
    }
}

impl GLVisitor {
    unsafe fn compile(stage: ShaderStage, src: &str) -> Result<GLuint> {
        let c_str = CString::new(src.as_bytes()).map_err(|_| Error::Compile {
            stage,
            log: "source contains an interior nul byte.".to_owned(),
        })?;

        let shader = gl::CreateShader(stage.into());
        gl::ShaderSource(shader, 1, &c_str.as_ptr(), ::std::ptr::null());
        gl::CompileShader(shader);

        let mut status = GLint::from(gl::FALSE);
        gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);

        if status != GLint::from(gl::TRUE) {
            let log = shader_info_log(shader);
            gl::DeleteShader(shader);
            Err(Error::Compile { stage, log })
        } else {
            Ok(shader)
        }
    }
}

unsafe fn shader_info_log(shader: GLuint) -> String {
    let mut len = 0;
    gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
    info_log(len, |buf| {
        gl::GetShaderInfoLog(shader, len, ::std::ptr::null_mut(), buf)
    })
}

unsafe fn program_info_log(program: GLuint) -> String {
    let mut len = 0;
    gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
    info_log(len, |buf| {
        gl::GetProgramInfoLog(program, len, ::std::ptr::null_mut(), buf)
    })
}

/// Reads a nul terminated info log of `len` bytes.
unsafe fn info_log<F>(len: GLint, read: F) -> String
where
    F: FnOnce(*mut GLchar),
{
    if len <= 1 {
        return String::new();
    }

    let mut buf = vec![0u8; len as usize];
    read(buf.as_mut_ptr() as *mut GLchar);

    buf.truncate(len as usize - 1);
    String::from_utf8_lossy(&buf).into_owned()
}

unsafe fn check() -> Result<()> {
    let code = gl::GetError();
    let name = match code {
        gl::NO_ERROR => return Ok(()),
        gl::INVALID_ENUM => "GL_INVALID_ENUM",
        gl::INVALID_VALUE => "GL_INVALID_VALUE",
        gl::INVALID_OPERATION => "GL_INVALID_OPERATION",
        gl::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        gl::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        _ => "unknown error",
    };

    Err(Error::Backend(format!("[GL] {} ({:#x}).", name, code)))
}
