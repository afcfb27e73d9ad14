//! cppwrap: generates host-runtime glue code for native C++ classes.
//!
//! Classes are registered once, then generated into a single C++ source
//! file that defines, for every class, an adapter struct pairing a host object
//! header with a native pointer, the wrappers of its constructors, methods and
//! attributes, its deallocation hook and its type object.
//!
//! # Quick start
//!
//! ```
//! use cppwrap::{ClassRegistry, ClassSpec, FunctionWrapper, ReturnValue, generate_module};
//!
//! let mut registry = ClassRegistry::new();
//! let foo = registry.register_class(ClassSpec::new("Foo").with_doc("A foo"))?;
//! registry.add_constructor(foo, FunctionWrapper::constructor(vec![]))?;
//! let size = FunctionWrapper::method("size", ReturnValue::basic("int"), vec![]);
//! registry.add_method(foo, size, None)?;
//!
//! let source = generate_module(&mut registry, "hello")?;
//! assert!(source.contains("PyTypeObject PyFoo_Type = {"));
//! assert!(source.contains("inithello(void)"));
//! # Ok::<(), cppwrap::CppWrapError>(())
//! ```
//!
//! # Crates
//!
//! - [`cppwrap_core`]: identities, settings, slots, handlers and errors
//! - [`cppwrap_registry`]: class descriptors and the class registry
//! - [`cppwrap_codegen`]: the emitters

mod module_gen;

pub use module_gen::{generate_module, generate_module_with};

pub use cppwrap_core::{
    ClassHandler, ClassId, ClassSymbols, Convention, CppWrapError, Direction, FunctionWrapper,
    GenerationError, GeneratorSettings, Parameter, RegistrationError, ReturnValue, Slot,
    TypeFlags, TypeRef, TypeSlots, TypeStructure, WrapperKind,
};
pub use cppwrap_registry::{
    AttributeDescriptor, AttributeScope, ClassDescriptor, ClassRegistry, ClassSpec,
    GeneratedClass, NarrowingTable, OverloadSet, Ownership,
};

pub use cppwrap_codegen::{
    BasicConversion, BasicTypeRegistry, BasicTypes, ClassGenerator, CodeBlock, CodeSink,
    DefaultOverloadEmitter, MemorySink, ModuleBuilder, ModuleInit, OverloadEmitter,
};
pub use cppwrap_codegen as codegen;
