use std::borrow::Borrow;

use crate::utils::handle::Handle;

/// Backend objects keyed by handle. A slot only answers to the handle version
/// it was created with, so stale handles of recycled indices get nothing.
#[derive(Debug)]
pub struct DataVec<T> {
    buf: Vec<Option<T>>,
    versions: Vec<u32>,
}

impl<T> Default for DataVec<T> {
    fn default() -> Self {
        DataVec::new()
    }
}

impl<T> DataVec<T> {
    pub fn new() -> Self {
        DataVec {
            buf: Vec::new(),
            versions: Vec::new(),
        }
    }

    #[inline]
    fn slot<H: Borrow<Handle>>(&self, handle: H) -> Option<usize> {
        let handle = handle.borrow();
        let index = handle.index() as usize;
        match self.versions.get(index) {
            Some(&v) if v == handle.version() => Some(index),
            _ => None,
        }
    }

    pub fn get<H: Borrow<Handle>>(&self, handle: H) -> Option<&T> {
        let index = self.slot(handle)?;
        self.buf[index].as_ref()
    }

    pub fn get_mut<H: Borrow<Handle>>(&mut self, handle: H) -> Option<&mut T> {
        let index = self.slot(handle)?;
        self.buf[index].as_mut()
    }

    /// Stores `value` at the index of `handle`, replacing whatever was there.
    pub fn create<H: Borrow<Handle>>(&mut self, handle: H, value: T) {
        let handle = handle.borrow();
        let index = handle.index() as usize;

        if self.buf.len() <= index {
            self.buf.resize_with(index + 1, || None);
            self.versions.resize(index + 1, 0);
        }

        self.buf[index] = Some(value);
        self.versions[index] = handle.version();
    }

    pub fn free<H: Borrow<Handle>>(&mut self, handle: H) -> Option<T> {
        let index = self.slot(handle)?;
        self.buf[index].take()
    }
}
