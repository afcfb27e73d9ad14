//! Constructor emission.
//!
//! Unlike host classes, native constructors are not inherited. A class
//! without constructors of its own therefore either gets a synthesized
//! zero-argument constructor (when its parent can be default-constructed) or
//! an initializer that refuses construction, so that it never inherits a
//! `tp_init` that would attach an instance of the parent class.

use cppwrap_core::{FunctionWrapper, GenerationError};
use cppwrap_registry::{ClassDescriptor, GeneratedClass};

use crate::{CodeSink, MarshalContext, OverloadEmitter};

/// Outcome of constructor emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorOutcome {
    /// The `tp_init` symbol.
    pub init: String,
    /// A native instance can be attached.
    pub have_constructor: bool,
    /// Zero-argument entry point, if the class can be default-constructed.
    pub default_constructor: Option<String>,
}

/// Emit the class's `tp_init`.
///
/// `parent` is the parent's recorded generation state; its
/// `default_constructor` already accounts for every ancestor level.
pub fn generate_constructors(
    ctx: &MarshalContext<'_>,
    overloads: &dyn OverloadEmitter,
    class: &ClassDescriptor,
    parent: Option<&GeneratedClass>,
    sink: &mut dyn CodeSink,
) -> Result<ConstructorOutcome, GenerationError> {
    if !class.constructors().is_empty() {
        let init = overloads.emit_constructors(ctx, class, class.constructors(), sink)?;
        let has_default = class.registered_default_constructor().is_some();
        return Ok(ConstructorOutcome {
            default_constructor: has_default.then(|| init.clone()),
            init,
            have_constructor: true,
        });
    }

    if parent.is_some_and(|p| p.default_constructor.is_some()) {
        let mut synthesized = FunctionWrapper::constructor(Vec::new());
        synthesized.owner = Some(class.id());
        let init = overloads.emit_constructors(ctx, class, &[synthesized], sink)?;
        return Ok(ConstructorOutcome {
            default_constructor: Some(init.clone()),
            init,
            have_constructor: true,
        });
    }

    Ok(ConstructorOutcome {
        init: write_no_constructor(class, sink),
        have_constructor: false,
        default_constructor: None,
    })
}

/// Emit a `tp_init` that raises `TypeError`.
fn write_no_constructor(class: &ClassDescriptor, sink: &mut dyn CodeSink) -> String {
    let symbols = class.symbols();
    let symbol = symbols.init();

    sink.writeln("");
    sink.writeln("static int");
    sink.writeln(&format!(
        "{symbol}({} * CPPWRAP_UNUSED(self), PyObject * CPPWRAP_UNUSED(args), \
         PyObject * CPPWRAP_UNUSED(kwargs))",
        symbols.adapter
    ));
    sink.writeln("{");
    sink.indent();
    sink.writeln(&format!(
        "PyErr_SetString(PyExc_TypeError, \"class '{}' cannot be constructed\");",
        class.name()
    ));
    sink.writeln("return -1;");
    sink.unindent();
    sink.writeln("}");
    symbol
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BasicTypes, DefaultOverloadEmitter, MemorySink};
    use cppwrap_core::{Parameter, TypeSlots, TypeStructure};
    use cppwrap_registry::{ClassRegistry, ClassSpec};

    fn parent_state(default_constructor: Option<&str>) -> GeneratedClass {
        let size = "sizeof(PyBase)".to_string();
        let slots = TypeSlots::new().finalize(size, None, Default::default());
        GeneratedClass {
            have_constructor: default_constructor.is_some(),
            default_constructor: default_constructor.map(str::to_string),
            init: "_wrap_PyBase__tp_init".to_string(),
            dealloc: None,
            method_table: "Base_methods".to_string(),
            metaclass: None,
            structure: TypeStructure {
                type_object: "PyBase_Type".to_string(),
                name: "Base".to_string(),
                base: "&PyBaseObject_Type".to_string(),
                metaclass: None,
                slots,
            },
        }
    }

    fn emit(
        registry: &ClassRegistry,
        name: &str,
        parent: Option<&GeneratedClass>,
    ) -> (ConstructorOutcome, String) {
        let types = BasicTypes::new();
        let ctx = MarshalContext::new(registry, &types);
        let class = registry.get_by_name(name).unwrap();
        let mut sink = MemorySink::new();
        let overloads = DefaultOverloadEmitter;
        let outcome = generate_constructors(&ctx, &overloads, class, parent, &mut sink);
        (outcome.unwrap(), sink.into_string())
    }

    #[test]
    fn registered_constructors() {
        let mut registry = ClassRegistry::new();
        let foo = registry.register_class(ClassSpec::new("Foo")).unwrap();
        let ctor = FunctionWrapper::constructor(vec![Parameter::basic("int", "x")]);
        registry.add_constructor(foo, ctor).unwrap();

        let (outcome, out) = emit(&registry, "Foo", None);
        assert!(outcome.have_constructor);
        assert_eq!(outcome.default_constructor, None);
        assert!(out.contains("self->obj = new Foo(x);"));
    }

    #[test]
    fn registered_default_constructor_is_recorded() {
        let mut registry = ClassRegistry::new();
        let foo = registry.register_class(ClassSpec::new("Foo")).unwrap();
        let ctor = FunctionWrapper::constructor(vec![]);
        registry.add_constructor(foo, ctor).unwrap();

        let (outcome, _) = emit(&registry, "Foo", None);
        assert_eq!(
            outcome.default_constructor.as_deref(),
            Some("_wrap_PyFoo__tp_init")
        );
    }

    #[test]
    fn synthesized_from_parent_default() {
        let mut registry = ClassRegistry::new();
        registry.register_class(ClassSpec::new("Base")).unwrap();
        registry
            .register_class(ClassSpec::new("Derived").with_parent("Base"))
            .unwrap();
        let parent = parent_state(Some("_wrap_PyBase__tp_init"));

        let (outcome, out) = emit(&registry, "Derived", Some(&parent));
        assert!(outcome.have_constructor);
        assert_eq!(outcome.init, "_wrap_PyDerived__tp_init");
        assert_ne!(outcome.init, parent.init);
        assert_eq!(
            outcome.default_constructor.as_deref(),
            Some("_wrap_PyDerived__tp_init")
        );
        assert!(out.contains("self->obj = new Derived();"));
    }

    #[test]
    fn construction_disabled() {
        let mut registry = ClassRegistry::new();
        registry.register_class(ClassSpec::new("Base")).unwrap();
        registry
            .register_class(ClassSpec::new("Derived").with_parent("Base"))
            .unwrap();
        let parent = parent_state(None);

        let (outcome, out) = emit(&registry, "Derived", Some(&parent));
        assert!(!outcome.have_constructor);
        assert!(outcome.default_constructor.is_none());
        let error = "\"class 'Derived' cannot be constructed\"";
        assert!(out.contains(&format!("PyErr_SetString(PyExc_TypeError, {error});")));
        assert!(!out.contains("new Derived"));
    }
}
