//! End-to-end tests for cppwrap using `generate_module` as the entry point.
//!
//! Each test registers a small class graph, generates the whole module and
//! checks the emitted source.

use cppwrap::{
    BasicTypes, ClassId, ClassRegistry, ClassSpec, CppWrapError, DefaultOverloadEmitter, Direction,
    FunctionWrapper, GenerationError, ModuleBuilder, ModuleInit, Parameter, ReturnValue,
    generate_module, generate_module_with,
};

/// Narrowing lookup emitted for a `Base*` return.
const TYPEID_LOOKUP: &str =
    "wrapper_lookup_iter = PyBase__typeid_map.find(typeid(*retval).name());";

/// Body of the generated function starting at `signature`, up to its
/// closing brace.
fn function_body<'a>(source: &'a str, signature: &str) -> &'a str {
    let start = source
        .find(signature)
        .unwrap_or_else(|| panic!("missing function {signature}"));
    let len = source[start..]
        .find("\n}\n")
        .unwrap_or_else(|| panic!("unterminated function {signature}"));
    &source[start..start + len]
}

fn getter(registry: &mut ClassRegistry, class: ClassId, name: &str, returns: &str) {
    let ret = registry.return_value(returns);
    registry
        .add_method(class, FunctionWrapper::method(name, ret, vec![]), None)
        .unwrap();
}

// =============================================================================
// Module layout
// =============================================================================

#[test]
fn test_hello_module() {
    let mut registry = ClassRegistry::new();
    let foo = registry
        .register_class(ClassSpec::new("Foo").with_doc("A foo"))
        .unwrap();
    registry
        .add_constructor(foo, FunctionWrapper::constructor(vec![]))
        .unwrap();
    registry
        .add_method(
            foo,
            FunctionWrapper::method("size", ReturnValue::basic("int"), vec![]),
            None,
        )
        .unwrap();

    let source = generate_module(&mut registry, "hello").unwrap();

    let include = source.find("#include <Python.h>").unwrap();
    let adapter = source
        .find("typedef struct {\n    PyObject_HEAD\n    Foo *obj;\n} PyFoo;")
        .unwrap();
    let declaration = source.find("extern PyTypeObject PyFoo_Type;").unwrap();
    let record = source.find("PyTypeObject PyFoo_Type = {").unwrap();
    let init = source.find("PyMODINIT_FUNC\ninithello(void)").unwrap();
    assert!(include < adapter && adapter < declaration && declaration < record && record < init);

    assert!(source.contains("    \"A foo\", /* tp_doc */"));
    assert!(source.contains("    (initproc)_wrap_PyFoo__tp_init, /* tp_init */"));
    assert!(source.contains("    (struct PyMethodDef*)Foo_methods, /* tp_methods */"));
    assert!(source.contains("    if (PyType_Ready(&PyFoo_Type)) {\n        return;\n    }"));
    let add = "    PyModule_AddObject(m, (char *) \"Foo\", (PyObject *) &PyFoo_Type);";
    assert!(source.contains(add));
}

#[test]
fn test_custom_module_includes() {
    let mut registry = ClassRegistry::new();
    registry.register_class(ClassSpec::new("Foo")).unwrap();

    let mut module = ModuleInit::new("hello");
    module.add_include("\"foo.h\"");
    let source = generate_module_with(
        &mut registry,
        module,
        &BasicTypes::new(),
        &DefaultOverloadEmitter,
    )
    .unwrap();

    assert!(source.starts_with("#include <Python.h>\n#include \"foo.h\"\n"));
}

#[test]
fn test_module_generates_once() {
    let mut registry = ClassRegistry::new();
    registry.register_class(ClassSpec::new("Foo")).unwrap();
    generate_module(&mut registry, "hello").unwrap();

    let err = generate_module(&mut registry, "hello").unwrap_err();
    assert!(err.is_generation());
    assert_eq!(
        err,
        CppWrapError::Generation(GenerationError::AlreadyGenerated("Foo".to_string()))
    );
}

// =============================================================================
// Inheritance
// =============================================================================

#[test]
fn test_base_links_match_parent_symbols() {
    let mut registry = ClassRegistry::new();
    registry.register_class(ClassSpec::new("Base")).unwrap();
    registry
        .register_class(ClassSpec::new("Derived").with_parent("Base"))
        .unwrap();
    registry
        .register_class(ClassSpec::new("Leaf").with_parent("Derived"))
        .unwrap();

    let source = generate_module(&mut registry, "shapes").unwrap();

    for class in registry.iter() {
        let base = &class.generated().unwrap().structure.base;
        match class.parent() {
            Some(parent) => {
                let parent = registry.get(parent).unwrap();
                assert_eq!(base, &format!("&{}", parent.symbols().type_object));
            }
            None => assert_eq!(base, "&PyBaseObject_Type"),
        }
    }
    assert!(source.contains("PyLeaf_Type.tp_base = &PyDerived_Type;"));
}

#[test]
fn test_synthesized_default_constructor() {
    let mut registry = ClassRegistry::new();
    let base = registry.register_class(ClassSpec::new("Base")).unwrap();
    registry
        .add_constructor(base, FunctionWrapper::constructor(vec![]))
        .unwrap();
    let derived = registry
        .register_class(ClassSpec::new("Derived").with_parent("Base"))
        .unwrap();
    let leaf = registry
        .register_class(ClassSpec::new("Leaf").with_parent("Derived"))
        .unwrap();

    let source = generate_module(&mut registry, "shapes").unwrap();

    let base_init = &registry.get(base).unwrap().generated().unwrap().init;
    let derived_init = &registry.get(derived).unwrap().generated().unwrap().init;
    assert_eq!(derived_init, "_wrap_PyDerived__tp_init");
    assert_ne!(derived_init, base_init);
    assert!(source.contains("self->obj = new Derived();"));

    // Two levels down still resolves through the recorded parent state.
    let leaf_state = registry.get(leaf).unwrap().generated().unwrap();
    assert!(leaf_state.have_constructor);
    assert!(source.contains("self->obj = new Leaf();"));
}

#[test]
fn test_destructor_without_constructor() {
    let mut registry = ClassRegistry::new();
    let base = registry.register_class(ClassSpec::new("Base")).unwrap();
    registry
        .add_constructor(
            base,
            FunctionWrapper::constructor(vec![Parameter::basic("int", "x")]),
        )
        .unwrap();
    let derived = registry
        .register_class(ClassSpec::new("Derived").with_parent("Base"))
        .unwrap();

    let source = generate_module(&mut registry, "shapes").unwrap();

    let state = registry.get(derived).unwrap().generated().unwrap();
    assert!(!state.have_constructor);
    let dealloc = function_body(&source, "_wrap_PyDerived__tp_dealloc(PyDerived *self)");
    assert!(!dealloc.contains("obj"));
    assert!(dealloc.contains("PyObject_DEL(self);"));
    assert!(source.contains("\"class 'Derived' cannot be constructed\""));
}

// =============================================================================
// Ownership
// =============================================================================

#[test]
fn test_shared_pointer_return_increments_once() {
    let mut registry = ClassRegistry::new();
    registry
        .register_class(ClassSpec::new("Node").with_ref_counting("Ref", "Unref"))
        .unwrap();
    let holder = registry.register_class(ClassSpec::new("Holder")).unwrap();
    getter(&mut registry, holder, "node", "Node*");

    let source = generate_module(&mut registry, "graph").unwrap();

    let wrapper = function_body(&source, "_wrap_PyHolder_node(PyHolder *self");
    assert_eq!(wrapper.matches("->Ref();").count(), 1);
    assert!(wrapper.contains("py_Node->obj = retval;"));
    assert!(!source.contains("new Node("));
}

#[test]
fn test_owned_pointer_return_copies_once() {
    let mut registry = ClassRegistry::new();
    registry.register_class(ClassSpec::new("Item")).unwrap();
    let holder = registry.register_class(ClassSpec::new("Holder")).unwrap();
    getter(&mut registry, holder, "item", "Item*");

    let source = generate_module(&mut registry, "store").unwrap();

    let wrapper = function_body(&source, "_wrap_PyHolder_item(PyHolder *self");
    assert_eq!(wrapper.matches("new Item(*retval)").count(), 1);
    assert!(!wrapper.contains("Ref"));
    assert!(wrapper.contains(
        "if (!(retval)) {\n        Py_INCREF(Py_None);\n        py_Item = (PyItem *) Py_None;\
         \n    } else {"
    ));
}

#[test]
fn test_null_pointer_return_keeps_out_parameters() {
    let mut registry = ClassRegistry::new();
    registry.register_class(ClassSpec::new("Item")).unwrap();
    registry.register_class(ClassSpec::new("Stats")).unwrap();
    let store = registry.register_class(ClassSpec::new("Store")).unwrap();
    let ret = registry.return_value("Item*").caller_owns();
    let out = registry
        .parameter("Stats&", "stats")
        .with_direction(Direction::Out);
    registry
        .add_method(store, FunctionWrapper::method("find", ret, vec![out]), None)
        .unwrap();

    let source = generate_module(&mut registry, "store").unwrap();

    let wrapper = function_body(&source, "_wrap_PyStore_find(PyStore *self");
    assert!(wrapper.contains("stats->obj = new Stats;"));
    assert!(!wrapper.contains("return Py_None;"));
    assert!(wrapper.contains("py_Item = (PyItem *) Py_None;"));
    assert!(wrapper.contains("py_retval = Py_BuildValue((char *) \"NN\", py_Item, stats);"));
}

#[test]
fn test_value_returns_are_distinct_copies() {
    let mut registry = ClassRegistry::new();
    registry.register_class(ClassSpec::new("Point")).unwrap();
    let shape = registry.register_class(ClassSpec::new("Shape")).unwrap();
    getter(&mut registry, shape, "origin", "Point");
    getter(&mut registry, shape, "center", "Point");

    let source = generate_module(&mut registry, "geometry").unwrap();

    let copies = source.matches("py_Point->obj = new Point(retval);").count();
    assert_eq!(copies, 2);
    for method in ["origin", "center"] {
        let wrapper = function_body(&source, &format!("_wrap_PyShape_{method}(PyShape *self"));
        assert!(wrapper.contains("py_Point = PyObject_New(PyPoint, &PyPoint_Type);"));
        assert!(wrapper.contains("py_retval = Py_BuildValue((char *) \"N\", py_Point);"));
    }
}

// =============================================================================
// Narrowing
// =============================================================================

#[test]
fn test_narrowing_lookup_any_registration_order() {
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
    let leaf = registry
        .register_class(ClassSpec::new("LeftLeaf").with_parent("Left"))
        .unwrap();

    assert_eq!(registry.narrow(base, "LeftLeaf"), leaf);
    assert_eq!(registry.narrow(base, "Right"), right);
    assert_eq!(registry.narrow(left, "LeftLeaf"), leaf);
    assert_eq!(registry.narrow(base, "Unregistered"), base);
    assert_eq!(registry.narrow(left, "Right"), left);
}

#[test]
fn test_caller_owned_return_narrows_to_derived() {
    let mut registry = ClassRegistry::new();
    registry
        .register_class(ClassSpec::new("Base").with_narrowing(true))
        .unwrap();
    registry
        .register_class(ClassSpec::new("Derived").with_parent("Base"))
        .unwrap();
    let factory = registry.register_class(ClassSpec::new("Factory")).unwrap();
    let ret = registry.return_value("Base*").caller_owns();
    registry
        .add_method(factory, FunctionWrapper::method("make", ret, vec![]), None)
        .unwrap();

    let source = generate_module(&mut registry, "factory").unwrap();

    assert!(source.contains("#include <typeinfo>"));
    assert!(source.contains("std::map<std::string, PyTypeObject *> PyBase__typeid_map;"));
    assert!(source.contains("PyBase__typeid_map[typeid(Derived).name()] = &PyDerived_Type;"));

    let wrapper = function_body(&source, "_wrap_PyFactory_make(PyFactory *self");
    assert!(wrapper.contains(TYPEID_LOOKUP));
    assert!(wrapper.contains("wrapper_type = &PyBase_Type;"));
    assert!(wrapper.contains("wrapper_type = wrapper_lookup_iter->second;"));
    assert!(wrapper.contains("py_Base = PyObject_New(PyBase, wrapper_type);"));
    assert!(wrapper.contains("py_Base->obj = retval;"));
    assert!(!wrapper.contains("new Base("));
}

/// Registry with a reference-counted narrowing `Base`, a `Derived` subclass
/// and a `Factory` whose `make` returns `Base*`.
fn shared_narrowing_registry(caller_owns: bool) -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    registry
        .register_class(
            ClassSpec::new("Base")
                .with_ref_counting("Ref", "Unref")
                .with_narrowing(true),
        )
        .unwrap();
    registry
        .register_class(ClassSpec::new("Derived").with_parent("Base"))
        .unwrap();
    let factory = registry.register_class(ClassSpec::new("Factory")).unwrap();
    let mut ret = registry.return_value("Base*");
    if caller_owns {
        ret = ret.caller_owns();
    }
    registry
        .add_method(factory, FunctionWrapper::method("make", ret, vec![]), None)
        .unwrap();
    registry
}

#[test]
fn test_shared_caller_owned_return_narrows() {
    let mut registry = shared_narrowing_registry(true);

    let source = generate_module(&mut registry, "factory").unwrap();

    assert!(source.contains("PyBase__typeid_map[typeid(Derived).name()] = &PyDerived_Type;"));
    let wrapper = function_body(&source, "_wrap_PyFactory_make(PyFactory *self");
    assert!(wrapper.contains(TYPEID_LOOKUP));
    assert!(wrapper.contains("py_Base = PyObject_New(PyBase, wrapper_type);"));
    assert!(wrapper.contains("py_Base->obj = retval;"));
    assert!(!wrapper.contains("->Ref();"));
}

#[test]
fn test_shared_borrowed_return_narrows_with_one_reference() {
    let mut registry = shared_narrowing_registry(false);

    let source = generate_module(&mut registry, "factory").unwrap();

    let wrapper = function_body(&source, "_wrap_PyFactory_make(PyFactory *self");
    assert_eq!(wrapper.matches("->Ref();").count(), 1);
    assert!(!wrapper.contains("new Base("));
    assert!(wrapper.contains(TYPEID_LOOKUP));
    assert!(wrapper.contains("py_Base = PyObject_New(PyBase, wrapper_type);"));
    assert!(wrapper.contains("py_Base->obj = retval;"));
}
