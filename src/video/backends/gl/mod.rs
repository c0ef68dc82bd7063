pub mod capabilities;
mod types;
pub mod visitor;

pub use self::visitor::GLVisitor;

use std::os::raw::c_void;

use crate::video::errors::Result;

impl GLVisitor {
    /// Loads the GL function pointers with `loader` and creates a visitor.
    ///
    /// # Unsafe
    ///
    /// The context that `loader` resolves symbols for must be current in this thread.
    pub unsafe fn with_loader<F>(loader: F) -> Result<Self>
    where
        F: FnMut(&str) -> *const c_void,
    {
        gl::load_with(loader);
        Self::new()
    }
}
