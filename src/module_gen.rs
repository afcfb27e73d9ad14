//! Whole-module generation.

use tracing::info;

use cppwrap_codegen::{
    BasicTypeRegistry, BasicTypes, ClassGenerator, CodeSink, DefaultOverloadEmitter, MemorySink,
    ModuleInit, OverloadEmitter,
};
use cppwrap_core::CppWrapError;
use cppwrap_registry::ClassRegistry;

/// Generate every registered class into one source file for module
/// `module_name`, using the default basic types and overload emitter.
pub fn generate_module(
    registry: &mut ClassRegistry,
    module_name: &str,
) -> Result<String, CppWrapError> {
    generate_module_with(
        registry,
        ModuleInit::new(module_name),
        &BasicTypes::new(),
        &DefaultOverloadEmitter,
    )
}

/// Generate every registered class with explicit collaborators.
///
/// `module` may carry includes and header declarations added beforehand,
/// such as the headers declaring the wrapped classes.
///
/// Output order: includes, header declarations, forward declarations of
/// every class, class bodies in registration order, module init.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn generate_module_with(
    registry: &mut ClassRegistry,
    mut module: ModuleInit,
    basic_types: &dyn BasicTypeRegistry,
    overloads: &dyn OverloadEmitter,
) -> Result<String, CppWrapError> {
    let generator = ClassGenerator::new(basic_types, overloads);

    let mut declarations = MemorySink::new();
    for class in registry.iter() {
        generator.generate_forward_declarations(class, &mut declarations);
    }

    // Registration requires parents to exist, so registration order
    // generates every parent before its children.
    let mut body = MemorySink::new();
    for id in registry.class_ids().to_vec() {
        #[cfg(feature = "profiling")]
        profiling::scope!("generate_class");
        generator.generate(registry, id, &mut body, &mut module)?;
    }

    let mut out = MemorySink::new();
    module.write_includes(&mut out);
    module.write_header(&mut out);
    out.write_block(declarations.as_str());
    out.write_block(body.as_str());
    out.writeln("");
    module.write_init(&mut out);

    info!(
        target: "cppwrap::codegen",
        module = module.name(),
        classes = registry.len(),
        "generated module"
    );
    Ok(out.into_string())
}
