use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::binary_heap::BinaryHeap;

use super::handle::{Handle, HandleIndex};

#[derive(PartialEq, Eq)]
struct InverseHandleIndex(HandleIndex);

impl PartialOrd for InverseHandleIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InverseHandleIndex {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.cmp(&self.0)
    }
}

/// `HandlePool` manages the manipulations of a `Handle` collection, which are
/// created with a continuous `index` field. It also have the ability to find
/// out the current status of a specified `Handle`.
///
/// Index zero is never handed out, so a `Handle::nil()` can not collide with
/// a live object.
#[derive(Default)]
pub struct HandlePool {
    versions: Vec<HandleIndex>,
    frees: BinaryHeap<InverseHandleIndex>,
}

impl HandlePool {
    /// Constructs a new, empty `HandlePool`.
    pub fn new() -> HandlePool {
        HandlePool {
            versions: vec![0],
            frees: BinaryHeap::new(),
        }
    }

    /// Creates a unused `Handle`.
    pub fn create(&mut self) -> Handle {
        match self.frees.pop() {
            Some(InverseHandleIndex(index)) => {
                // Reuse a free slot, odd versions are alive.
                let index = index as usize;
                self.versions[index] += 1;
                Handle::new(index as HandleIndex, self.versions[index])
            }
            None => {
                if self.versions.is_empty() {
                    self.versions.push(0);
                }

                self.versions.push(1);
                Handle::new(self.versions.len() as HandleIndex - 1, 1)
            }
        }
    }

    /// Returns true if this `Handle` was created by `HandlePool`, and has not been
    /// freed yet.
    pub fn is_alive<T>(&self, handle: T) -> bool
    where
        T: Borrow<Handle>,
    {
        let handle = handle.borrow();
        let index = handle.index() as usize;
        self.is_alive_at(index) && (self.versions[index] == handle.version())
    }

    #[inline]
    fn is_alive_at(&self, index: usize) -> bool {
        index > 0 && (index < self.versions.len()) && ((self.versions[index] & 0x1) == 1)
    }

    /// Recycles the `Handle` index, and mark its version as dead.
    pub fn free<T>(&mut self, handle: T) -> bool
    where
        T: Borrow<Handle>,
    {
        let handle = handle.borrow();
        if !self.is_alive(handle) {
            false
        } else {
            self.versions[handle.index() as usize] += 1;
            self.frees.push(InverseHandleIndex(handle.index()));
            true
        }
    }

    /// Returns the total number of alive handle in this `HandlePool`.
    #[inline]
    pub fn len(&self) -> usize {
        self.versions.len().saturating_sub(1) - self.frees.len()
    }

    /// Returns true if there is no alive handle.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
