use std::cell::RefCell;
use std::fmt;
use std::os::raw::c_void;
use std::rc::Rc;

use crate::utils::handle_pool::HandlePool;

use super::backends::gl::GLVisitor;
use super::backends::{self, Visitor};
use super::errors::*;
use super::program::ProgramHandle;
use super::uniform::{UniformLocation, UniformVariable};

struct ContextInner {
    visitor: Box<dyn Visitor>,
    programs: HandlePool,
    active: Option<ProgramHandle>,
}

/// The render context that programs are created in. It owns the backend and
/// tracks which program is currently bound, so "the active program" is an
/// explicit value instead of hidden global state.
///
/// Cloning a `RenderContext` is cheap and yields another reference to the same
/// context. It's meant to be used on the thread owning the graphics context.
#[derive(Clone)]
pub struct RenderContext {
    inner: Rc<RefCell<ContextInner>>,
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("RenderContext")
            .field("programs", &inner.programs.len())
            .field("active", &inner.active)
            .finish()
    }
}

impl RenderContext {
    pub fn new(visitor: Box<dyn Visitor>) -> Self {
        let inner = ContextInner {
            visitor,
            programs: HandlePool::new(),
            active: None,
        };

        RenderContext {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    /// Creates a context with the headless backend.
    pub fn headless() -> Self {
        RenderContext::new(backends::new_headless())
    }

    /// Creates a context on top of the OpenGL context which is current in this
    /// thread, resolving GL functions with `loader`.
    ///
    /// # Unsafe
    ///
    /// The OpenGL context must stay current in this thread for as long as this
    /// `RenderContext`, or any program created by it, lives.
    pub unsafe fn gl<F>(loader: F) -> Result<Self>
    where
        F: FnMut(&str) -> *const c_void,
    {
        let visitor = GLVisitor::with_loader(loader)?;
        Ok(RenderContext::new(Box::new(visitor)))
    }

    /// Gets the program which is bound currently.
    #[inline]
    pub fn active_program(&self) -> Option<ProgramHandle> {
        self.inner.borrow().active
    }

    #[inline]
    pub fn is_active(&self, handle: ProgramHandle) -> bool {
        self.inner.borrow().active == Some(handle)
    }

    /// Returns the number of programs that have not been deleted.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.borrow().programs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unbinds the active program, if any.
    pub fn unbind(&self) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.active.is_none() {
            return Ok(());
        }

        unsafe { inner.visitor.use_program(None)? };
        inner.active = None;
        Ok(())
    }

    pub(crate) fn create_program(&self) -> Result<ProgramHandle> {
        let mut inner = self.inner.borrow_mut();
        let handle: ProgramHandle = inner.programs.create().into();

        if let Err(err) = unsafe { inner.visitor.create_program(handle) } {
            inner.programs.free(handle);
            return Err(err);
        }

        Ok(handle)
    }

    pub(crate) fn compile_shader(
        &self,
        handle: ProgramHandle,
        stage: ShaderStage,
        source: &str,
    ) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        unsafe { inner.visitor.compile_shader(handle, stage, source) }
    }

    pub(crate) fn link_program(&self, handle: ProgramHandle) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        unsafe { inner.visitor.link_program(handle) }
    }

    pub(crate) fn validate_program(&self, handle: ProgramHandle) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        unsafe { inner.visitor.validate_program(handle) }
    }

    pub(crate) fn use_program(&self, handle: ProgramHandle) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.active == Some(handle) {
            return Ok(());
        }

        unsafe { inner.visitor.use_program(Some(handle))? };
        inner.active = Some(handle);
        Ok(())
    }

    pub(crate) fn uniform_location(
        &self,
        handle: ProgramHandle,
        name: &str,
    ) -> Result<UniformLocation> {
        let mut inner = self.inner.borrow_mut();
        unsafe { inner.visitor.uniform_location(handle, name) }
    }

    /// Uploads a uniform into `handle`, which must be the active program.
    pub(crate) fn bind_uniform(
        &self,
        handle: ProgramHandle,
        location: UniformLocation,
        variable: &UniformVariable,
    ) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.active != Some(handle) {
            return Err(PreconditionError::NotActive.into());
        }

        unsafe { inner.visitor.bind_uniform(location, variable) }
    }

    pub(crate) fn delete_program(&self, handle: ProgramHandle) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if !inner.programs.free(handle) {
            return Err(Error::Backend(format!("{} has been deleted already.", handle)));
        }

        if inner.active == Some(handle) {
            inner.active = None;
        }

        unsafe { inner.visitor.delete_program(handle) }
    }
}
