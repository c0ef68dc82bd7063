//! Commonly used utilities like handles, pools and hashes.

#[macro_use]
pub mod handle;
pub mod handle_pool;
pub mod hash;
pub mod hash_value;

pub mod prelude {
    pub use super::handle::{Handle, HandleIndex};
    pub use super::handle_pool::HandlePool;
    pub use super::hash::{FastHashMap, FastHashSet};
    pub use super::hash_value::HashValue;
}
