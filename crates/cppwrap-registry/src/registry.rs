//! ClassRegistry - the process-wide home of every class descriptor.
//!
//! [`ClassRegistry`] owns all [`ClassDescriptor`]s; descriptors refer to their
//! parents by [`ClassId`]. It also plays the class half of the type-handler
//! registry: a native spelling such as `"Foo"`, `"Foo&"` or `"Foo*"` resolves
//! to a [`ClassHandler`] for the registered class, and anything else is left
//! to the basic-type converters.
//!
//! # Phases
//!
//! - **Registration**: `register_class` and the `add_*` calls. A class must be
//!   registered after its parent; inherited policies are resolved here, once.
//! - **Generation**: the code generator reads descriptors and records each
//!   class's [`GeneratedClass`](crate::GeneratedClass). Generation of a class
//!   must follow its parent's.
//!
//! The registry is not thread-safe; registration and generation are
//! single-threaded passes.
//!
//! # Example
//!
//! ```
//! use cppwrap_registry::{ClassRegistry, ClassSpec};
//!
//! let mut registry = ClassRegistry::new();
//! let base = registry
//!     .register_class(ClassSpec::new("Base").with_ref_counting("Ref", "Unref"))
//!     .unwrap();
//! let derived = registry
//!     .register_class(ClassSpec::new("Derived").with_parent("Base"))
//!     .unwrap();
//!
//! // Hooks are inherited.
//! assert_eq!(registry.get(derived).unwrap().ownership().decref(), Some("Unref"));
//! assert_eq!(registry.get(derived).unwrap().parent(), Some(base));
//! ```

use rustc_hash::FxHashMap;
use tracing::debug;

use cppwrap_core::{
    ClassHandler, ClassId, ClassSymbols, Convention, FunctionWrapper, GeneratorSettings,
    Parameter, RegistrationError, ReturnValue,
};

use crate::{ClassDescriptor, ClassSpec, NarrowingTable, Ownership};

/// Registry of every wrapped class.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    settings: GeneratorSettings,
    /// Descriptors by id.
    classes: FxHashMap<ClassId, ClassDescriptor>,
    /// Registration order (parents always precede children).
    order: Vec<ClassId>,
}

impl ClassRegistry {
    /// Create a registry with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the given settings.
    pub fn with_settings(settings: GeneratorSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Settings of this generation run.
    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a class.
    ///
    /// Validates the description, resolves inherited ref-count hooks and the
    /// narrowing flag against the (already registered) parent, and joins the
    /// narrowing table of the class's narrowing root.
    pub fn register_class(&mut self, spec: ClassSpec) -> Result<ClassId, RegistrationError> {
        let ClassSpec {
            name,
            parents,
            incref,
            decref,
            narrowing,
            docstring,
            slots,
        } = spec;

        let id = ClassId::from_name(&name);
        if self.classes.contains_key(&id) {
            return Err(RegistrationError::DuplicateType(name));
        }

        let own_hooks = match (incref, decref) {
            (Some(incref), Some(decref)) => Some(Ownership::Shared { incref, decref }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(RegistrationError::UnpairedRefCountHooks {
                    class: name,
                    given: "incref",
                });
            }
            (None, Some(_)) => {
                return Err(RegistrationError::UnpairedRefCountHooks {
                    class: name,
                    given: "decref",
                });
            }
        };

        if parents.len() > 1 {
            return Err(if narrowing == Some(true) {
                RegistrationError::MultiParentNarrowing { class: name }
            } else {
                RegistrationError::MultipleInheritance {
                    class: name,
                    parents,
                }
            });
        }

        let parent = match parents.first() {
            Some(parent_name) => Some(
                self.get_by_name(parent_name)
                    .ok_or_else(|| RegistrationError::TypeNotFound(parent_name.clone()))?,
            ),
            None => None,
        };

        let ownership = own_hooks
            .or_else(|| parent.map(|p| p.ownership().clone()))
            .unwrap_or_default();
        let narrowing = narrowing.unwrap_or_else(|| {
            parent.map_or(self.settings.automatic_type_narrowing, |p| p.narrowing())
        });
        let parent = parent.map(|p| p.id());

        let narrowing_root = narrowing.then(|| self.find_narrowing_root(id, parent));
        let symbols = ClassSymbols::new(&name, &self.settings);

        let mut descriptor = ClassDescriptor::new(
            name,
            parent,
            symbols,
            ownership,
            narrowing,
            narrowing_root,
            slots,
            docstring,
        );

        match narrowing_root {
            Some(root) if root == id => {
                descriptor.narrowing_table =
                    Some(NarrowingTable::new(descriptor.symbols().typeid_map.clone(), id));
            }
            Some(root) => {
                if let Some(table) = self
                    .classes
                    .get_mut(&root)
                    .and_then(|r| r.narrowing_table.as_mut())
                {
                    table.push(id);
                }
            }
            None => {}
        }

        debug!(
            target: "cppwrap::registry",
            class = descriptor.name(),
            shared = descriptor.ownership().is_shared(),
            narrowing = descriptor.narrowing(),
            "registered class"
        );

        self.classes.insert(id, descriptor);
        self.order.push(id);
        Ok(id)
    }

    /// Walk up from `parent` while ancestors narrow; the last one reached is
    /// the root. A class whose parent does not narrow is its own root.
    fn find_narrowing_root(&self, own: ClassId, parent: Option<ClassId>) -> ClassId {
        let mut root = own;
        let mut cursor = parent;
        while let Some(candidate) = cursor.and_then(|id| self.classes.get(&id)) {
            if !candidate.narrowing() {
                break;
            }
            root = candidate.id();
            cursor = candidate.parent();
        }
        root
    }

    /// Add a method to a registered class.
    pub fn add_method(
        &mut self,
        class: ClassId,
        wrapper: FunctionWrapper,
        name: Option<&str>,
    ) -> Result<(), RegistrationError> {
        self.class_mut(class)?.add_method(wrapper, name)
    }

    /// Add a constructor to a registered class.
    pub fn add_constructor(
        &mut self,
        class: ClassId,
        wrapper: FunctionWrapper,
    ) -> Result<(), RegistrationError> {
        self.class_mut(class)?.add_constructor(wrapper)
    }

    /// Add an instance attribute to a registered class.
    pub fn add_instance_attribute(
        &mut self,
        class: ClassId,
        value_type: ReturnValue,
        name: &str,
        is_const: bool,
    ) -> Result<(), RegistrationError> {
        self.class_mut(class)?
            .add_instance_attribute(value_type, name, is_const)
    }

    /// Add a static attribute to a registered class.
    pub fn add_static_attribute(
        &mut self,
        class: ClassId,
        value_type: ReturnValue,
        name: &str,
        is_const: bool,
    ) -> Result<(), RegistrationError> {
        self.class_mut(class)?
            .add_static_attribute(value_type, name, is_const)
    }

    fn class_mut(&mut self, class: ClassId) -> Result<&mut ClassDescriptor, RegistrationError> {
        self.classes
            .get_mut(&class)
            .ok_or_else(|| RegistrationError::TypeNotFound(class.to_string()))
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Get a class by id.
    pub fn get(&self, class: ClassId) -> Option<&ClassDescriptor> {
        self.classes.get(&class)
    }

    /// Get a mutable class by id.
    pub fn get_mut(&mut self, class: ClassId) -> Option<&mut ClassDescriptor> {
        self.classes.get_mut(&class)
    }

    /// Get a class by native spelling.
    pub fn get_by_name(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(&ClassId::from_name(name))
    }

    /// Whether a class is registered.
    pub fn contains(&self, class: ClassId) -> bool {
        self.classes.contains_key(&class)
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether no class is registered.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Class ids in registration order.
    pub fn class_ids(&self) -> &[ClassId] {
        &self.order
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.order.iter().filter_map(|id| self.classes.get(id))
    }

    /// Whether `class` is `ancestor` or derives from it.
    pub fn is_subclass_of(&self, class: ClassId, ancestor: ClassId) -> bool {
        let mut cursor = Some(class);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.classes.get(&id).and_then(|c| c.parent());
        }
        false
    }

    // ==========================================================================
    // Handlers
    // ==========================================================================

    /// Resolve a native spelling to a class handler.
    ///
    /// Returns `None` when the spelling does not name a registered class.
    pub fn class_handler(&self, spelling: &str) -> Option<ClassHandler> {
        let (name, convention) = Convention::split(spelling);
        self.get_by_name(name)
            .map(|class| ClassHandler::new(class.name(), convention))
    }

    /// Build a parameter for `spelling`: a class handler when the spelling
    /// names a registered class, a basic-type handler otherwise.
    pub fn parameter(&self, spelling: &str, name: &str) -> Parameter {
        match self.class_handler(spelling) {
            Some(handler) => Parameter::class(handler, name),
            None => Parameter::basic(spelling.trim(), name),
        }
    }

    /// Build a return value for `spelling`.
    pub fn return_value(&self, spelling: &str) -> ReturnValue {
        match self.class_handler(spelling) {
            Some(handler) => ReturnValue::class(handler),
            None => ReturnValue::basic(spelling.trim()),
        }
    }

    // ==========================================================================
    // Narrowing
    // ==========================================================================

    /// The narrowing table `class` belongs to.
    pub fn narrowing_table_of(&self, class: ClassId) -> Option<&NarrowingTable> {
        let root = self.classes.get(&class)?.narrowing_root()?;
        self.classes.get(&root)?.narrowing_table()
    }

    /// Most specific registered class for an object statically typed as
    /// `static_class` whose dynamic type is `type_identity`.
    ///
    /// Falls back to `static_class` when the static class does not narrow,
    /// when the identity is not registered, or when it is not a subclass of
    /// the static class.
    pub fn narrow(&self, static_class: ClassId, type_identity: &str) -> ClassId {
        self.narrowing_table_of(static_class)
            .and_then(|table| table.lookup(type_identity))
            .filter(|&found| self.is_subclass_of(found, static_class))
            .unwrap_or(static_class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_class() {
        let mut registry = ClassRegistry::new();
        registry.register_class(ClassSpec::new("Foo")).unwrap();
        let err = registry.register_class(ClassSpec::new("Foo")).unwrap_err();
        assert_eq!(err, RegistrationError::DuplicateType("Foo".to_string()));
    }

    #[test]
    fn unknown_parent() {
        let mut registry = ClassRegistry::new();
        let err = registry
            .register_class(ClassSpec::new("Derived").with_parent("Base"))
            .unwrap_err();
        assert_eq!(err, RegistrationError::TypeNotFound("Base".to_string()));
    }

    #[test]
    fn hooks_must_be_paired() {
        let mut registry = ClassRegistry::new();
        let err = registry
            .register_class(ClassSpec::new("Foo").with_incref("Ref"))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::UnpairedRefCountHooks { given, .. } if given == "incref"
        ));
        let err = registry
            .register_class(ClassSpec::new("Foo").with_decref("Unref"))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::UnpairedRefCountHooks { given, .. } if given == "decref"
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn own_hooks_override_parent() {
        let mut registry = ClassRegistry::new();
        registry
            .register_class(ClassSpec::new("Base").with_ref_counting("Ref", "Unref"))
            .unwrap();
        let derived = registry
            .register_class(
                ClassSpec::new("Derived")
                    .with_parent("Base")
                    .with_ref_counting("AddRef", "Release"),
            )
            .unwrap();
        let ownership = registry.get(derived).unwrap().ownership();
        assert_eq!(ownership.incref(), Some("AddRef"));
        assert_eq!(ownership.decref(), Some("Release"));
    }

    #[test]
    fn multiple_parents_rejected() {
        let mut registry = ClassRegistry::new();
        registry.register_class(ClassSpec::new("A")).unwrap();
        registry.register_class(ClassSpec::new("B")).unwrap();

        let err = registry
            .register_class(ClassSpec::new("C").with_parent("A").with_parent("B"))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::MultipleInheritance { .. }));

        let err = registry
            .register_class(
                ClassSpec::new("C")
                    .with_parent("A")
                    .with_parent("B")
                    .with_narrowing(true),
            )
            .unwrap_err();
        assert!(matches!(err, RegistrationError::MultiParentNarrowing { .. }));
    }

    #[test]
    fn narrowing_default_from_settings() {
        let settings = GeneratorSettings::new().with_automatic_type_narrowing(true);
        let mut registry = ClassRegistry::with_settings(settings);
        let base = registry.register_class(ClassSpec::new("Base")).unwrap();
        let derived = registry
            .register_class(ClassSpec::new("Derived").with_parent("Base"))
            .unwrap();

        assert!(registry.get(base).unwrap().is_narrowing_root());
        assert_eq!(registry.get(derived).unwrap().narrowing_root(), Some(base));
        let table = registry.get(base).unwrap().narrowing_table().unwrap();
        assert_eq!(table.members(), &[base, derived]);
    }

    #[test]
    fn narrowing_root_is_highest_narrowing_ancestor() {
        let mut registry = ClassRegistry::new();
        registry.register_class(ClassSpec::new("Object")).unwrap();
        let spec = ClassSpec::new("Shape")
            .with_parent("Object")
            .with_narrowing(true);
        let shape = registry.register_class(spec).unwrap();
        let circle = registry
            .register_class(ClassSpec::new("Circle").with_parent("Shape"))
            .unwrap();
        let ring = registry
            .register_class(ClassSpec::new("Ring").with_parent("Circle"))
            .unwrap();

        assert_eq!(registry.get(ring).unwrap().narrowing_root(), Some(shape));
        let table = registry.narrowing_table_of(ring).unwrap();
        assert_eq!(table.members(), &[shape, circle, ring]);
        assert!(!registry.get(circle).unwrap().is_narrowing_root());
    }

    #[test]
    fn narrowing_opt_out_starts_new_chain() {
        let mut registry = ClassRegistry::new();
        let base = registry
            .register_class(ClassSpec::new("Base").with_narrowing(true))
            .unwrap();
        let spec = ClassSpec::new("Plain")
            .with_parent("Base")
            .with_narrowing(false);
        let plain = registry.register_class(spec).unwrap();
        let spec = ClassSpec::new("Leaf")
            .with_parent("Plain")
            .with_narrowing(true);
        let leaf = registry.register_class(spec).unwrap();

        assert_eq!(registry.get(plain).unwrap().narrowing_root(), None);
        assert_eq!(registry.get(leaf).unwrap().narrowing_root(), Some(leaf));
        let table = registry.get(base).unwrap().narrowing_table().unwrap();
        assert_eq!(table.members(), &[base]);
    }

    #[test]
    fn narrow_falls_back_to_static_type() {
        let mut registry = ClassRegistry::new();
        let base = registry
            .register_class(ClassSpec::new("Base").with_narrowing(true))
            .unwrap();
        let left = registry
            .register_class(ClassSpec::new("Left").with_parent("Base"))
            .unwrap();
        let right = registry
            .register_class(ClassSpec::new("Right").with_parent("Base"))
            .unwrap();

        assert_eq!(registry.narrow(base, "Right"), right);
        assert_eq!(registry.narrow(base, "Left"), left);
        assert_eq!(registry.narrow(base, "Unregistered"), base);
        // A sibling is never a valid narrowing of `Left`.
        assert_eq!(registry.narrow(left, "Right"), left);
    }

    #[test]
    fn spelling_resolution() {
        let mut registry = ClassRegistry::new();
        registry.register_class(ClassSpec::new("Foo")).unwrap();

        let handler = registry.class_handler("Foo *").unwrap();
        assert_eq!(handler.convention, Convention::Pointer);
        assert_eq!(handler.class, ClassId::from_name("Foo"));

        assert!(registry.parameter("Foo&", "f").class_handler().is_some());
        assert!(registry.parameter("int", "x").class_handler().is_none());
        assert!(registry.return_value("Foo").class_handler().is_some());
        assert!(registry.return_value("double").class_handler().is_none());
    }

    #[test]
    fn registration_calls_on_unknown_class() {
        let mut registry = ClassRegistry::new();
        let ctor = FunctionWrapper::constructor(vec![]);
        let err = registry
            .add_constructor(ClassId::from_name("Nope"), ctor)
            .unwrap_err();
        assert!(matches!(err, RegistrationError::TypeNotFound(_)));
    }
}
