//! Deterministic hash-based identity for global names and generic instances.
//!
//! [`TypeHash`] is a 64-bit hash computed deterministically from a name (and,
//! for generic instances, its type arguments). The heap allocator (source
//! spec §3, "Heap Allocator") and generator-detection logic (source spec
//! §4.3, "Generator detection") both need a stable identity for a name or an
//! instantiated generic type without a sequential registration pass, so
//! hashing rather than interning is used throughout.
//!
//! # Hash Computation
//!
//! Uses XXHash64 with domain-specific mixing constants so a plain name and a
//! generic instantiation of the same name never collide.

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Separator constant mixed between generic type arguments.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for plain name hashes.
    pub const NAME: u64 = 0x2fac10b63a6cc57c;

    /// Per-argument-position mixing constants, so argument order matters.
    pub const PARAM_MARKERS: [u64; 8] = [
        0x9e3779b97f4a7c15,
        0xbf58476d1ce4e5b9,
        0x94d049bb133111eb,
        0xd6e8feb86659fd93,
        0xe7037ed1a0b428db,
        0xc6a4a7935bd1e995,
        0x8648dbbc94d49b8d,
        0xa2b48b2c69e0d657,
    ];
}

/// A deterministic 64-bit hash identifying a global name or a generic
/// instantiation of one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Hash a plain name. The same name always produces the same hash.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::NAME ^ xxh64(name.as_bytes(), 0))
    }

    /// Hash a generic instantiation from its base hash and type-argument
    /// hashes, e.g. `Generator<number>` from `Generator` and `number`.
    /// Argument order matters: `Map<string, int>` differs from
    /// `Map<int, string>`.
    #[inline]
    pub fn from_generic_instance(base: TypeHash, args: &[TypeHash]) -> Self {
        let mut hash = base.0;
        for (i, arg) in args.iter().enumerate() {
            let marker = hash_constants::PARAM_MARKERS
                .get(i)
                .copied()
                .unwrap_or_else(|| hash_constants::PARAM_MARKERS[0].wrapping_add(i as u64));
            hash = hash.wrapping_mul(hash_constants::SEP).wrapping_add(marker ^ arg.0);
        }
        TypeHash(hash)
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn determinism() {
        assert_eq!(TypeHash::from_name("x"), TypeHash::from_name("x"));
    }

    #[test]
    fn distinct_names_differ() {
        assert_ne!(TypeHash::from_name("x"), TypeHash::from_name("y"));
    }

    #[test]
    fn generic_instance_differs_from_base() {
        let generator = TypeHash::from_name("Generator");
        let number = TypeHash::from_name("number");
        let instance = TypeHash::from_generic_instance(generator, &[number]);
        assert_ne!(instance, generator);
    }

    #[test]
    fn generic_instance_argument_order_matters() {
        let map = TypeHash::from_name("Map");
        let string = TypeHash::from_name("string");
        let number = TypeHash::from_name("number");
        let a = TypeHash::from_generic_instance(map, &[string, number]);
        let b = TypeHash::from_generic_instance(map, &[number, string]);
        assert_ne!(a, b);
    }

    #[test]
    fn generic_instance_determinism() {
        let array = TypeHash::from_name("Array");
        let number = TypeHash::from_name("number");
        let a = TypeHash::from_generic_instance(array, &[number]);
        let b = TypeHash::from_generic_instance(array, &[number]);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_hash() {
        assert!(TypeHash::EMPTY.is_empty());
        assert!(!TypeHash::from_name("x").is_empty());
    }

    #[test]
    fn display_and_debug() {
        let hash = TypeHash::from_name("x");
        assert!(format!("{hash}").starts_with("0x"));
        assert!(format!("{hash:?}").starts_with("TypeHash(0x"));
    }
}
