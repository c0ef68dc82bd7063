use std::fmt;

pub type HandleIndex = u32;

/// A generational reference to a backend object.
///
/// Indices are recycled once an object is released, the `version` tells a
/// stale handle apart from the live one sharing its index. Alive objects
/// always have an odd version.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle {
    index: HandleIndex,
    version: HandleIndex,
}

impl Handle {
    #[inline]
    pub fn new(index: HandleIndex, version: HandleIndex) -> Self {
        Handle { index, version }
    }

    /// A handle that never refers to anything.
    #[inline]
    pub fn nil() -> Self {
        Handle::default()
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Handle::nil()
    }

    #[inline]
    pub fn index(self) -> HandleIndex {
        self.index
    }

    #[inline]
    pub fn version(self) -> HandleIndex {
        self.version
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Handle ({}, {})", self.index, self.version)
    }
}

/// Declares a typed wrapper around `Handle`.
#[macro_export]
macro_rules! impl_handle {
    ($name:ident) => {
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($crate::utils::handle::Handle);

        impl From<$crate::utils::handle::Handle> for $name {
            fn from(handle: $crate::utils::handle::Handle) -> Self {
                $name(handle)
            }
        }

        impl From<$name> for $crate::utils::handle::Handle {
            fn from(handle: $name) -> Self {
                handle.0
            }
        }

        impl ::std::ops::Deref for $name {
            type Target = $crate::utils::handle::Handle;

            fn deref(&self) -> &$crate::utils::handle::Handle {
                &self.0
            }
        }

        impl ::std::borrow::Borrow<$crate::utils::handle::Handle> for $name {
            fn borrow(&self) -> &$crate::utils::handle::Handle {
                &self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(
                    f,
                    "{} ({}, {})",
                    stringify!($name),
                    self.0.index(),
                    self.0.version()
                )
            }
        }
    };
}

#[cfg(test)]
mod test {
    use super::*;

    impl_handle!(ShaderHandle);

    #[test]
    fn nil() {
        assert!(!Handle::nil().is_valid());
        assert!(Handle::new(0, 1).is_valid());
        assert_eq!(Handle::new(2, 3).index(), 2);
        assert_eq!(Handle::new(2, 3).version(), 3);
    }

    #[test]
    fn typed() {
        let h: ShaderHandle = Handle::new(3, 1).into();
        assert_eq!(*h, Handle::new(3, 1));
        assert_eq!(Handle::from(h).index(), 3);
        assert_eq!(format!("{}", h), "ShaderHandle (3, 1)");
        assert_eq!(ShaderHandle::default(), ShaderHandle::from(Handle::nil()));
    }
}
