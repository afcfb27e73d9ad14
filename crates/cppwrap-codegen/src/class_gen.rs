//! Per-class generation.
//!
//! [`ClassGenerator::generate`] is the single finalization step of a class
//! descriptor. It runs the emitters in a fixed order:
//!
//! ```text
//! 1. getset tables (instance, static)
//! 2. metaclass, if any static attribute exists
//! 3. base-type and metaclass links
//! 4. type registration in the module init sequence
//! 5. constructors
//! 6. method table
//! 7. destructor
//! 8. type structure
//! 9. narrowing table, for narrowing roots
//! ```
//!
//! and records the resulting [`GeneratedClass`] on the descriptor. A class
//! must be generated after its parent and only once.

use tracing::{debug, info, instrument};

use cppwrap_core::{ClassId, GenerationError, Slot, TypeStructure};
use cppwrap_registry::{AttributeScope, ClassDescriptor, ClassRegistry, GeneratedClass};

use crate::{
    BasicTypeRegistry, CodeSink, MarshalContext, ModuleBuilder, ModuleInit, OverloadEmitter,
    attributes, constructors, lifecycle, narrowing, type_struct,
};

/// Runtime base type of classes without a parent.
const BASE_OBJECT_TYPE: &str = "PyBaseObject_Type";

/// Generates the glue code of registered classes.
pub struct ClassGenerator<'a> {
    basic_types: &'a dyn BasicTypeRegistry,
    overloads: &'a dyn OverloadEmitter,
}

impl<'a> ClassGenerator<'a> {
    /// Create a generator using the given collaborators.
    pub fn new(basic_types: &'a dyn BasicTypeRegistry, overloads: &'a dyn OverloadEmitter) -> Self {
        Self {
            basic_types,
            overloads,
        }
    }

    /// Emit the adapter struct and the `extern` type object declaration.
    pub fn generate_forward_declarations(&self, class: &ClassDescriptor, sink: &mut dyn CodeSink) {
        let symbols = class.symbols();
        sink.writeln("");
        sink.writeln("typedef struct {");
        sink.indent();
        sink.writeln("PyObject_HEAD");
        sink.writeln(&format!("{} *obj;", class.name()));
        sink.unindent();
        sink.writeln(&format!("}} {};", symbols.adapter));
        sink.writeln("");
        sink.writeln(&format!("extern PyTypeObject {};", symbols.type_object));
    }

    /// Generate a class and record its [`GeneratedClass`].
    #[instrument(
        level = "debug",
        target = "cppwrap::codegen",
        skip(self, registry, sink, module),
        fields(class = %class)
    )]
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn generate(
        &self,
        registry: &mut ClassRegistry,
        class: ClassId,
        sink: &mut dyn CodeSink,
        module: &mut dyn ModuleBuilder,
    ) -> Result<(), GenerationError> {
        let generated = self.build(registry, class, sink, module)?;
        let descriptor = registry
            .get_mut(class)
            .ok_or_else(|| GenerationError::UnknownClass(class.to_string()))?;
        info!(
            target: "cppwrap::codegen",
            class = descriptor.name(),
            have_constructor = generated.have_constructor,
            "generated class"
        );
        if !descriptor.record_generated(generated) {
            return Err(GenerationError::AlreadyGenerated(descriptor.name().to_string()));
        }
        Ok(())
    }

    fn build(
        &self,
        registry: &ClassRegistry,
        id: ClassId,
        sink: &mut dyn CodeSink,
        module: &mut dyn ModuleBuilder,
    ) -> Result<GeneratedClass, GenerationError> {
        let class = registry
            .get(id)
            .ok_or_else(|| GenerationError::UnknownClass(id.to_string()))?;
        if class.is_generated() {
            return Err(GenerationError::AlreadyGenerated(class.name().to_string()));
        }

        let parent = match class.parent() {
            Some(parent_id) => {
                let parent = registry
                    .get(parent_id)
                    .ok_or_else(|| GenerationError::UnknownClass(parent_id.to_string()))?;
                let Some(state) = parent.generated() else {
                    return Err(GenerationError::ParentNotGenerated {
                        class: class.name().to_string(),
                        parent: parent.name().to_string(),
                    });
                };
                Some((parent, state))
            }
            None => None,
        };

        let ctx = MarshalContext::new(registry, self.basic_types);
        let symbols = class.symbols();
        let mut slots = class.slots().clone();

        // 1. getsets
        debug!(target: "cppwrap::codegen", class = class.name(), "emitting attributes");
        let scope = AttributeScope::Instance;
        if let Some(table) = attributes::generate_getsets(&ctx, class, scope, sink)? {
            slots.set(Slot::Getset, table);
        }
        let static_getsets =
            attributes::generate_getsets(&ctx, class, AttributeScope::Static, sink)?;

        // 2. metaclass
        module
            .after_init()
            .write_code(format!("/* Register the '{}' class */", class.name()));
        let parent_type = parent.map_or_else(
            || BASE_OBJECT_TYPE.to_string(),
            |(p, _)| p.symbols().type_object.clone(),
        );
        let metaclass = static_getsets.map(|getsets| {
            attributes::generate_metaclass(
                class,
                &getsets,
                &format!("{parent_type}.ob_type"),
                sink,
                module,
            )
        });

        // 3. links
        let init = module.after_init();
        if parent.is_some() {
            init.write_code(format!("{}.tp_base = &{parent_type};", symbols.type_object));
        }
        if let Some(meta) = &metaclass {
            init.write_code(format!("{}.ob_type = &{meta};", symbols.type_object));
        }

        // 4. registration
        init.write_error_check(
            format!("PyType_Ready(&{})", symbols.type_object),
            ModuleInit::INIT_FAILURE,
        );
        init.write_code(format!(
            "PyModule_AddObject(m, (char *) \"{}\", (PyObject *) &{});",
            host_name(class.name()),
            symbols.type_object
        ));

        // 5. constructors
        debug!(target: "cppwrap::codegen", class = class.name(), "emitting constructors");
        let constructor = constructors::generate_constructors(
            &ctx,
            self.overloads,
            class,
            parent.map(|(_, state)| state),
            sink,
        )?;
        slots.set(Slot::Init, constructor.init.clone());

        // 6. methods
        debug!(target: "cppwrap::codegen", class = class.name(), "emitting methods");
        self.generate_methods(&ctx, class, sink)?;
        slots.set(Slot::Methods, symbols.method_table.clone());

        // 7. destructor
        let dealloc =
            lifecycle::generate_destructor(class, constructor.have_constructor, &mut slots, sink);

        // 8. type structure
        let structure = TypeStructure {
            type_object: symbols.type_object.clone(),
            name: host_name(class.name()).to_string(),
            base: format!("&{parent_type}"),
            metaclass: metaclass.as_ref().map(|meta| format!("&{meta}")),
            slots: slots.finalize(
                format!("sizeof({})", symbols.adapter),
                class.docstring(),
                registry.settings().default_type_flags,
            ),
        };
        sink.writeln("");
        type_struct::write_type_structure(&structure, sink);

        // 9. narrowing table
        if let Some(table) = class.narrowing_table() {
            debug!(target: "cppwrap::codegen", class = class.name(), "emitting narrowing table");
            narrowing::generate_typeid_map(registry, table, module)?;
        }

        Ok(GeneratedClass {
            have_constructor: constructor.have_constructor,
            default_constructor: constructor.default_constructor,
            init: constructor.init,
            dealloc,
            method_table: symbols.method_table.clone(),
            metaclass,
            structure,
        })
    }

    fn generate_methods(
        &self,
        ctx: &MarshalContext<'_>,
        class: &ClassDescriptor,
        sink: &mut dyn CodeSink,
    ) -> Result<(), GenerationError> {
        let mut method_defs = Vec::with_capacity(class.methods().len());
        for set in class.methods() {
            let symbol = self.overloads.emit_methods(ctx, class, set, sink)?;
            method_defs.push(self.overloads.method_def(set, &symbol));
        }

        sink.writeln("");
        sink.writeln(&format!(
            "static PyMethodDef {}[] = {{",
            class.symbols().method_table
        ));
        sink.indent();
        for def in &method_defs {
            sink.writeln(def);
        }
        sink.writeln("{NULL, NULL, 0, NULL}");
        sink.unindent();
        sink.writeln("};");
        Ok(())
    }
}

/// Name the host sees: the last component of a scoped spelling.
fn host_name(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}
