//! Glue-code emitters for cppwrap.
//!
//! Turns registered class descriptors into host-runtime C++ source:
//!
//! - [`sink`] / [`block`]: line-oriented output with indentation
//! - [`module`]: module-level includes, header declarations and init body
//! - [`wrapper`]: per-function declaration, parse, call and build sections
//! - [`basic_types`]: conversions for non-class types
//! - [`marshal`]: value, reference and pointer class marshalers
//! - [`overload`]: method and constructor wrappers with overload dispatch
//! - [`attributes`]: getters, setters, getset tables and metaclasses
//! - [`constructors`] / [`lifecycle`]: `tp_init` and `tp_dealloc`
//! - [`type_struct`]: the type object record
//! - [`narrowing`]: typeid lookup maps for narrowing roots
//! - [`class_gen`]: ties the above together per class
//!
//! # Example
//!
//! ```
//! use cppwrap_codegen::{
//!     BasicTypes, ClassGenerator, DefaultOverloadEmitter, MemorySink, ModuleInit,
//! };
//! use cppwrap_registry::{ClassRegistry, ClassSpec};
//!
//! let mut registry = ClassRegistry::new();
//! let foo = registry.register_class(ClassSpec::new("Foo")).unwrap();
//!
//! let types = BasicTypes::new();
//! let generator = ClassGenerator::new(&types, &DefaultOverloadEmitter);
//! let mut sink = MemorySink::new();
//! let mut module = ModuleInit::new("hello");
//! generator.generate(&mut registry, foo, &mut sink, &mut module).unwrap();
//!
//! assert!(sink.as_str().contains("PyTypeObject PyFoo_Type = {"));
//! ```

pub mod attributes;
pub mod basic_types;
pub mod block;
pub mod class_gen;
pub mod constructors;
pub mod lifecycle;
pub mod marshal;
pub mod module;
pub mod narrowing;
pub mod overload;
pub mod sink;
pub mod type_struct;
pub mod wrapper;

pub use basic_types::{BasicConversion, BasicTypeRegistry, BasicTypes};
pub use block::CodeBlock;
pub use class_gen::ClassGenerator;
pub use constructors::ConstructorOutcome;
pub use marshal::MarshalContext;
pub use module::{ModuleBuilder, ModuleInit};
pub use overload::{DefaultOverloadEmitter, OverloadEmitter};
pub use sink::{CodeSink, MemorySink};
pub use wrapper::{BuildParams, Declarations, ForwardWrapper, ParseParams};
