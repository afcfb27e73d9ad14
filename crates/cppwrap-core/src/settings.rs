//! Generator-wide configuration.

use bitflags::bitflags;

bitflags! {
    /// Host type flags written to the `tp_flags` field of a type record.
    ///
    /// ```
    /// use cppwrap_core::TypeFlags;
    ///
    /// let meta = TypeFlags::DEFAULT | TypeFlags::HAVE_GC | TypeFlags::BASETYPE;
    /// assert_eq!(
    ///     meta.to_c_expr(),
    ///     "Py_TPFLAGS_DEFAULT|Py_TPFLAGS_HAVE_GC|Py_TPFLAGS_BASETYPE"
    /// );
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u32 {
        /// The host's default feature set.
        const DEFAULT = 1 << 0;
        /// Type participates in cyclic garbage collection.
        const HAVE_GC = 1 << 1;
        /// Type may be subclassed from the host language.
        const BASETYPE = 1 << 2;
    }
}

impl TypeFlags {
    /// Render the flags as the host's C constant expression.
    pub fn to_c_expr(self) -> String {
        let mut parts = Vec::new();
        if self.contains(TypeFlags::DEFAULT) {
            parts.push("Py_TPFLAGS_DEFAULT");
        }
        if self.contains(TypeFlags::HAVE_GC) {
            parts.push("Py_TPFLAGS_HAVE_GC");
        }
        if self.contains(TypeFlags::BASETYPE) {
            parts.push("Py_TPFLAGS_BASETYPE");
        }
        if parts.is_empty() {
            "0".to_string()
        } else {
            parts.join("|")
        }
    }
}

impl Default for TypeFlags {
    fn default() -> Self {
        TypeFlags::DEFAULT
    }
}

/// Settings shared by every class of a generation run.
///
/// # Example
///
/// ```
/// use cppwrap_core::GeneratorSettings;
///
/// let settings = GeneratorSettings::new()
///     .with_name_prefix("hello")
///     .with_automatic_type_narrowing(true);
/// assert_eq!(settings.symbol_prefix(), "Hello");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorSettings {
    /// Prefix inserted into every generated symbol (capitalized).
    pub name_prefix: String,
    /// Narrowing default for classes without a parent and without an
    /// explicit choice.
    pub automatic_type_narrowing: bool,
    /// Flags used when a class does not override `tp_flags`.
    pub default_type_flags: TypeFlags,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            name_prefix: String::new(),
            automatic_type_narrowing: false,
            default_type_flags: TypeFlags::DEFAULT,
        }
    }
}

impl GeneratorSettings {
    /// Create the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the symbol prefix.
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    /// Set the narrowing default for root classes.
    pub fn with_automatic_type_narrowing(mut self, enabled: bool) -> Self {
        self.automatic_type_narrowing = enabled;
        self
    }

    /// Set the default type flags.
    pub fn with_default_type_flags(mut self, flags: TypeFlags) -> Self {
        self.default_type_flags = flags;
        self
    }

    /// The prefix as it appears inside symbols: first letter upper-cased.
    pub fn symbol_prefix(&self) -> String {
        let mut chars = self.name_prefix.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
