//! Per-class metadata.
//!
//! A [`ClassDescriptor`] is created once by
//! [`ClassRegistry::register_class`](crate::ClassRegistry::register_class) from
//! a [`ClassSpec`], populated through the `add_*` calls, and finalized exactly
//! once when the code generator records its [`GeneratedClass`].
//!
//! Everything a descriptor inherits from its parent (ref-count hooks,
//! narrowing flag, narrowing root) is resolved when it is created and never
//! re-walked afterwards.

use rustc_hash::FxHashMap;

use cppwrap_core::{
    ClassId, ClassSymbols, FunctionWrapper, RegistrationError, ReturnValue, Slot, TypeFlags,
    TypeSlots, TypeStructure, WrapperKind,
};

use crate::NarrowingTable;

/// Ownership policy of the adapter over its native instance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Ownership {
    /// The adapter exclusively owns and deletes the instance.
    #[default]
    Owned,
    /// Lifetime is governed by the instance's own reference count.
    Shared {
        /// Method incrementing the count.
        incref: String,
        /// Method decrementing the count.
        decref: String,
    },
}

impl Ownership {
    /// Whether the class is reference counted.
    pub fn is_shared(&self) -> bool {
        matches!(self, Ownership::Shared { .. })
    }

    /// The increment hook, for shared classes.
    pub fn incref(&self) -> Option<&str> {
        match self {
            Ownership::Shared { incref, .. } => Some(incref),
            Ownership::Owned => None,
        }
    }

    /// The decrement hook, for shared classes.
    pub fn decref(&self) -> Option<&str> {
        match self {
            Ownership::Shared { decref, .. } => Some(decref),
            Ownership::Owned => None,
        }
    }
}

/// Description of a class to register.
///
/// # Example
///
/// ```
/// use cppwrap_registry::ClassSpec;
///
/// let spec = ClassSpec::new("Derived")
///     .with_parent("Base")
///     .with_narrowing(true)
///     .with_doc("A derived class");
/// assert_eq!(spec.name, "Derived");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClassSpec {
    /// Native class spelling.
    pub name: String,
    /// Parent class spellings (at most one is supported).
    pub parents: Vec<String>,
    /// Reference-count increment method.
    pub incref: Option<String>,
    /// Reference-count decrement method.
    pub decref: Option<String>,
    /// Explicit narrowing choice; inherited when `None`.
    pub narrowing: Option<bool>,
    /// Class documentation.
    pub docstring: Option<String>,
    /// User slot overrides.
    pub slots: TypeSlots,
}

impl ClassSpec {
    /// Start describing a class.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a parent class.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    /// Set the increment hook.
    pub fn with_incref(mut self, method: impl Into<String>) -> Self {
        self.incref = Some(method.into());
        self
    }

    /// Set the decrement hook.
    pub fn with_decref(mut self, method: impl Into<String>) -> Self {
        self.decref = Some(method.into());
        self
    }

    /// Set both ref-count hooks.
    pub fn with_ref_counting(self, incref: impl Into<String>, decref: impl Into<String>) -> Self {
        self.with_incref(incref).with_decref(decref)
    }

    /// Enable or disable automatic type narrowing.
    pub fn with_narrowing(mut self, enabled: bool) -> Self {
        self.narrowing = Some(enabled);
        self
    }

    /// Attach class documentation.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.docstring = Some(doc.into());
        self
    }

    /// Override a slot with a user-supplied symbol.
    pub fn with_slot(mut self, slot: Slot, symbol: impl Into<String>) -> Self {
        self.slots.set(slot, symbol);
        self
    }

    /// Override the type flags.
    pub fn with_flags(mut self, flags: TypeFlags) -> Self {
        self.slots.set_flags(flags);
        self
    }
}

/// All wrappers registered under one host-visible method name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverloadSet {
    /// Host-visible name.
    pub name: String,
    /// Candidates in registration order.
    pub wrappers: Vec<FunctionWrapper>,
}

/// Where an attribute lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeScope {
    /// On each instance.
    Instance,
    /// On the type object (served by the metaclass).
    Static,
}

/// One exposed data member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    /// Value conversion.
    pub value_type: ReturnValue,
    /// Owning class.
    pub owner: ClassId,
    /// Member name.
    pub name: String,
    /// Read-only when set.
    pub is_const: bool,
    /// Instance or static.
    pub scope: AttributeScope,
}

impl AttributeDescriptor {
    /// Whether a setter is generated.
    pub fn has_setter(&self) -> bool {
        !self.is_const
    }
}

/// Symbols and decisions recorded when a class is generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedClass {
    /// A native instance can be attached (registered or synthesized constructor).
    pub have_constructor: bool,
    /// Symbol of the zero-argument constructor entry point, if the class has one.
    pub default_constructor: Option<String>,
    /// `tp_init` symbol.
    pub init: String,
    /// Generated `tp_dealloc`, `None` when the user supplied one.
    pub dealloc: Option<String>,
    /// Method table symbol.
    pub method_table: String,
    /// Metaclass type object, when static attributes exist.
    pub metaclass: Option<String>,
    /// The finalized type record.
    pub structure: TypeStructure,
}

/// Metadata for one wrapped class.
#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    id: ClassId,
    name: String,
    parent: Option<ClassId>,
    symbols: ClassSymbols,
    ownership: Ownership,
    narrowing: bool,
    narrowing_root: Option<ClassId>,
    pub(crate) narrowing_table: Option<NarrowingTable>,
    methods: Vec<OverloadSet>,
    method_index: FxHashMap<String, usize>,
    constructors: Vec<FunctionWrapper>,
    instance_attributes: Vec<AttributeDescriptor>,
    static_attributes: Vec<AttributeDescriptor>,
    slots: TypeSlots,
    docstring: Option<String>,
    generated: Option<GeneratedClass>,
}

impl ClassDescriptor {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        parent: Option<ClassId>,
        symbols: ClassSymbols,
        ownership: Ownership,
        narrowing: bool,
        narrowing_root: Option<ClassId>,
        slots: TypeSlots,
        docstring: Option<String>,
    ) -> Self {
        Self {
            id: ClassId::from_name(&name),
            name,
            parent,
            symbols,
            ownership,
            narrowing,
            narrowing_root,
            narrowing_table: None,
            methods: Vec::new(),
            method_index: FxHashMap::default(),
            constructors: Vec::new(),
            instance_attributes: Vec::new(),
            static_attributes: Vec::new(),
            slots,
            docstring,
            generated: None,
        }
    }

    // === Identity ===

    /// Class id.
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Native spelling.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent class, if any.
    pub fn parent(&self) -> Option<ClassId> {
        self.parent
    }

    /// Generated symbol names.
    pub fn symbols(&self) -> &ClassSymbols {
        &self.symbols
    }

    /// Class documentation.
    pub fn docstring(&self) -> Option<&str> {
        self.docstring.as_deref()
    }

    // === Policies ===

    /// Resolved ownership policy.
    pub fn ownership(&self) -> &Ownership {
        &self.ownership
    }

    /// Whether pointer returns of this class are narrowed.
    pub fn narrowing(&self) -> bool {
        self.narrowing
    }

    /// Root of the narrowing chain this class belongs to.
    pub fn narrowing_root(&self) -> Option<ClassId> {
        self.narrowing_root
    }

    /// Whether this class owns a narrowing table.
    pub fn is_narrowing_root(&self) -> bool {
        self.narrowing_table.is_some()
    }

    /// The narrowing table, for narrowing roots.
    pub fn narrowing_table(&self) -> Option<&NarrowingTable> {
        self.narrowing_table.as_ref()
    }

    // === Registration ===

    /// Add a method, grouping same-named wrappers into one overload set.
    ///
    /// `name` overrides the host-visible name; it defaults to the native
    /// method name.
    pub fn add_method(
        &mut self,
        mut wrapper: FunctionWrapper,
        name: Option<&str>,
    ) -> Result<(), RegistrationError> {
        self.expect_kind(&wrapper, WrapperKind::Method)?;
        wrapper.validate()?;

        let name = name.unwrap_or(&wrapper.method_name).to_string();
        wrapper.owner = Some(self.id);

        match self.method_index.get(&name) {
            Some(&index) => self.methods[index].wrappers.push(wrapper),
            None => {
                self.method_index.insert(name.clone(), self.methods.len());
                self.methods.push(OverloadSet {
                    name,
                    wrappers: vec![wrapper],
                });
            }
        }
        Ok(())
    }

    /// Add a constructor.
    pub fn add_constructor(
        &mut self,
        mut wrapper: FunctionWrapper,
    ) -> Result<(), RegistrationError> {
        self.expect_kind(&wrapper, WrapperKind::Constructor)?;
        wrapper.validate()?;
        wrapper.owner = Some(self.id);
        self.constructors.push(wrapper);
        Ok(())
    }

    /// Expose a data member on instances.
    pub fn add_instance_attribute(
        &mut self,
        value_type: ReturnValue,
        name: impl Into<String>,
        is_const: bool,
    ) -> Result<(), RegistrationError> {
        self.add_attribute(value_type, name.into(), is_const, AttributeScope::Instance)
    }

    /// Expose a static data member on the type object.
    pub fn add_static_attribute(
        &mut self,
        value_type: ReturnValue,
        name: impl Into<String>,
        is_const: bool,
    ) -> Result<(), RegistrationError> {
        self.add_attribute(value_type, name.into(), is_const, AttributeScope::Static)
    }

    fn add_attribute(
        &mut self,
        value_type: ReturnValue,
        name: String,
        is_const: bool,
        scope: AttributeScope,
    ) -> Result<(), RegistrationError> {
        if value_type.is_void() {
            return Err(RegistrationError::VoidAttribute {
                class: self.name.clone(),
                attribute: name,
            });
        }
        value_type.validate()?;

        let table = match scope {
            AttributeScope::Instance => &mut self.instance_attributes,
            AttributeScope::Static => &mut self.static_attributes,
        };
        if table.iter().any(|a| a.name == name) {
            return Err(RegistrationError::DuplicateAttribute {
                class: self.name.clone(),
                attribute: name,
            });
        }
        table.push(AttributeDescriptor {
            value_type,
            owner: self.id,
            name,
            is_const,
            scope,
        });
        Ok(())
    }

    fn expect_kind(
        &self,
        wrapper: &FunctionWrapper,
        expected: WrapperKind,
    ) -> Result<(), RegistrationError> {
        if wrapper.kind != expected {
            return Err(RegistrationError::WrongWrapperKind {
                class: self.name.clone(),
                expected: expected.as_str(),
                found: wrapper.kind.as_str(),
            });
        }
        Ok(())
    }

    /// Override a slot. Returns `false` if the slot was already set.
    pub fn set_slot(&mut self, slot: Slot, symbol: impl Into<String>) -> bool {
        self.slots.set(slot, symbol)
    }

    // === Queries ===

    /// Overload sets in registration order.
    pub fn methods(&self) -> &[OverloadSet] {
        &self.methods
    }

    /// Find an overload set by host-visible name.
    pub fn find_method(&self, name: &str) -> Option<&OverloadSet> {
        self.method_index.get(name).map(|&i| &self.methods[i])
    }

    /// Constructors in registration order.
    pub fn constructors(&self) -> &[FunctionWrapper] {
        &self.constructors
    }

    /// The registered zero-argument constructor, if any.
    pub fn registered_default_constructor(&self) -> Option<&FunctionWrapper> {
        self.constructors
            .iter()
            .find(|c| c.is_default_constructor())
    }

    /// Instance attributes in declaration order.
    pub fn instance_attributes(&self) -> &[AttributeDescriptor] {
        &self.instance_attributes
    }

    /// Static attributes in declaration order.
    pub fn static_attributes(&self) -> &[AttributeDescriptor] {
        &self.static_attributes
    }

    /// Slots written so far (user overrides before generation).
    pub fn slots(&self) -> &TypeSlots {
        &self.slots
    }

    // === Generation state ===

    /// Generated state, once the class has been generated.
    pub fn generated(&self) -> Option<&GeneratedClass> {
        self.generated.as_ref()
    }

    /// Whether the class has been generated.
    pub fn is_generated(&self) -> bool {
        self.generated.is_some()
    }

    /// Record the outcome of generation. Only the first call takes effect.
    pub fn record_generated(&mut self, generated: GeneratedClass) -> bool {
        if self.generated.is_some() {
            return false;
        }
        self.generated = Some(generated);
        true
    }
}
