use std::collections::{HashMap, HashSet};
use std::hash::{BuildHasherDefault, Hash, Hasher};
use std::ops::BitXor;

/// A `HashMap` using the fx hasher. Uniform names and keys are short, so a
/// fast non-cryptographic hash is preferred over SipHash.
pub type FastHashMap<K, V> = HashMap<K, V, BuildHasherDefault<FxHasher>>;

/// A `HashSet` using the fx hasher.
pub type FastHashSet<K> = HashSet<K, BuildHasherDefault<FxHasher>>;

const SEED64: u64 = 0x51_7c_c1_b7_27_22_0a_95;

/// The hasher used by the rustc compiler.
#[derive(Debug, Default, Clone, Copy)]
pub struct FxHasher {
    hash: u64,
}

impl FxHasher {
    #[inline]
    fn add_to_hash(&mut self, word: u64) {
        self.hash = self.hash.rotate_left(5).bitxor(word).wrapping_mul(SEED64);
    }
}

impl Hasher for FxHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        let mut chunks = bytes.chunks_exact(8);
        for chunk in &mut chunks {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            self.add_to_hash(u64::from_le_bytes(word));
        }

        for &byte in chunks.remainder() {
            self.add_to_hash(u64::from(byte));
        }
    }

    #[inline]
    fn write_u8(&mut self, i: u8) {
        self.add_to_hash(u64::from(i));
    }

    #[inline]
    fn write_u32(&mut self, i: u32) {
        self.add_to_hash(u64::from(i));
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.add_to_hash(i);
    }

    #[inline]
    fn write_usize(&mut self, i: usize) {
        self.add_to_hash(i as u64);
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }
}

/// Hashes a value into 64 bits with `FxHasher`.
#[inline]
pub fn hash64<T: Hash + ?Sized>(v: &T) -> u64 {
    let mut state = FxHasher::default();
    v.hash(&mut state);
    state.finish()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn stable() {
        assert_eq!(hash64("gWorld"), hash64("gWorld"));
        assert!(hash64("gWorld") != hash64("gWVP"));
        assert!(hash64("gPointLights[0].Base.Color") != hash64("gPointLights[1].Base.Color"));
    }

    #[test]
    fn map() {
        let mut map = FastHashMap::default();
        map.insert("gSampler", 1);
        map.insert("gSampler", 2);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("gSampler"), Some(&2));
    }
}
