//! Type-narrowing tables.
//!
//! A function declared to return `Base*` may hand back a pointer to a
//! registered subclass. Wrapping it as `Base` would lose the subclass's
//! methods, so the root of every narrowing-enabled inheritance chain owns a
//! table from dynamic type identity to the most specific registered class.
//!
//! The table is append-only during registration. At generation time it is
//! emitted as a lookup map that generated conversion code consults; a miss
//! falls back to the statically declared type.

use cppwrap_core::ClassId;

/// Narrowing table owned by a narrowing root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrowingTable {
    /// Symbol of the generated lookup map.
    symbol: String,
    /// Root first, then every descendant in registration order.
    members: Vec<ClassId>,
}

impl NarrowingTable {
    /// Create a table containing only its root.
    pub fn new(symbol: impl Into<String>, root: ClassId) -> Self {
        Self {
            symbol: symbol.into(),
            members: vec![root],
        }
    }

    /// Register a descendant.
    pub fn push(&mut self, member: ClassId) {
        if !self.members.contains(&member) {
            self.members.push(member);
        }
    }

    /// Generated symbol of the lookup map.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Root of the table.
    pub fn root(&self) -> ClassId {
        self.members[0]
    }

    /// Registered members, root first.
    pub fn members(&self) -> &[ClassId] {
        &self.members
    }

    /// Whether `class` is registered in this table.
    pub fn contains(&self, class: ClassId) -> bool {
        self.members.contains(&class)
    }

    /// Resolve a dynamic type identity (the native class spelling).
    ///
    /// Returns `None` for unregistered types.
    pub fn lookup(&self, type_identity: &str) -> Option<ClassId> {
        let id = ClassId::from_name(type_identity);
        self.contains(id).then_some(id)
    }
}
