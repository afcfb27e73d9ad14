//! Deterministic class identity.
//!
//! [`ClassId`] is a 64-bit XXH64 hash of a class's native type spelling.
//! Descriptors, handlers and narrowing tables all refer to classes by id, so a
//! handler can be built before the registry hands out the descriptor it names.
//!
//! # Examples
//!
//! ```
//! use cppwrap_core::ClassId;
//!
//! let a = ClassId::from_name("ns::Widget");
//! let b = ClassId::from_name("::ns::Widget");
//! assert_eq!(a, b);
//! assert_ne!(a, ClassId::from_name("ns::Gadget"));
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain marker mixed into every class hash.
const CLASS_DOMAIN: u64 = 0x2fac10b63a6cc57c;

/// A deterministic 64-bit hash identifying a wrapped C++ class.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ClassId(pub u64);

impl ClassId {
    /// Create a class id from a native type spelling.
    ///
    /// Leading `::` (absolute scope) and surrounding whitespace are ignored.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        let normalized = name.trim().trim_start_matches("::");
        ClassId(CLASS_DOMAIN ^ xxh64(normalized.as_bytes(), 0))
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({:#018x})", self.0)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
