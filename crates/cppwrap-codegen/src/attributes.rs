//! Attribute accessors, getset tables and metaclasses.
//!
//! Every declared attribute gets a getter and, unless it is const, a setter.
//! Instance attributes read through `self->obj`; static attributes read the
//! class member directly and live on a per-class metaclass, since the host
//! looks up type-level descriptors on the type's type.

use cppwrap_core::{GenerationError, Slot, TypeFlags, TypeSlots, TypeStructure};
use cppwrap_registry::{AttributeDescriptor, AttributeScope, ClassDescriptor};

use crate::{CodeSink, ForwardWrapper, MarshalContext, ModuleBuilder, ModuleInit, type_struct};

/// Emit accessors and the getset table for one attribute scope.
///
/// Returns the table symbol, or `None` when the class has no attribute in
/// that scope (nothing is emitted).
pub fn generate_getsets(
    ctx: &MarshalContext<'_>,
    class: &ClassDescriptor,
    scope: AttributeScope,
    sink: &mut dyn CodeSink,
) -> Result<Option<String>, GenerationError> {
    let symbols = class.symbols();
    let (attributes, table) = match scope {
        AttributeScope::Instance => (class.instance_attributes(), &symbols.instance_getsets),
        AttributeScope::Static => (class.static_attributes(), &symbols.static_getsets),
    };
    if attributes.is_empty() {
        return Ok(None);
    }

    let mut entries = Vec::with_capacity(attributes.len());
    for attribute in attributes {
        let getter = write_getter(ctx, class, attribute, sink)?;
        let setter = if attribute.has_setter() {
            Some(write_setter(ctx, class, attribute, sink)?)
        } else {
            None
        };
        entries.push((attribute.name.as_str(), getter, setter));
    }

    sink.writeln("");
    sink.writeln(&format!("static PyGetSetDef {table}[] = {{"));
    sink.indent();
    for (name, getter, setter) in entries {
        sink.writeln("{");
        sink.indent();
        sink.writeln(&format!("(char *) \"{name}\", /* attribute name */"));
        sink.writeln(&format!("(getter) {getter}, /* C function to get the attribute */"));
        sink.writeln(&format!(
            "(setter) {}, /* C function to set the attribute */",
            setter.as_deref().unwrap_or("NULL")
        ));
        sink.writeln("NULL, /* optional doc string */");
        sink.writeln("NULL /* optional additional data for getter and setter */");
        sink.unindent();
        sink.writeln("},");
    }
    sink.writeln("{ NULL, NULL, NULL, NULL, NULL }");
    sink.unindent();
    sink.writeln("};");
    Ok(Some(table.clone()))
}

/// The native expression an attribute reads and writes.
fn member_expr(class: &ClassDescriptor, attribute: &AttributeDescriptor) -> String {
    match attribute.scope {
        AttributeScope::Instance => format!("self->obj->{}", attribute.name),
        AttributeScope::Static => format!("{}::{}", class.name(), attribute.name),
    }
}

/// Leading accessor parameter: the instance, or the unused type object.
fn receiver(class: &ClassDescriptor, scope: AttributeScope) -> String {
    match scope {
        AttributeScope::Instance => format!("{} *self", class.symbols().adapter),
        AttributeScope::Static => "PyObject * CPPWRAP_UNUSED(obj)".to_string(),
    }
}

fn write_getter(
    ctx: &MarshalContext<'_>,
    class: &ClassDescriptor,
    attribute: &AttributeDescriptor,
    sink: &mut dyn CodeSink,
) -> Result<String, GenerationError> {
    let symbol = class.symbols().getter(&attribute.name);
    let mut wrapper = ForwardWrapper::new();
    let py_retval = wrapper
        .declarations
        .declare_variable("PyObject *", "py_retval");
    let member = member_expr(class, attribute);
    ctx.return_to_host(&attribute.value_type, &member, &mut wrapper)?;

    sink.writeln("");
    sink.writeln("static PyObject *");
    sink.writeln(&format!(
        "{symbol}({}, void * CPPWRAP_UNUSED(closure))",
        receiver(class, attribute.scope)
    ));
    sink.writeln("{");
    sink.indent();
    wrapper.declarations.write(sink);
    sink.writeln("");
    wrapper.after_call.flush_to(sink);
    wrapper.write_build_result(sink, &py_retval);
    sink.writeln(&format!("return {py_retval};"));
    sink.unindent();
    sink.writeln("}");
    Ok(symbol)
}

fn write_setter(
    ctx: &MarshalContext<'_>,
    class: &ClassDescriptor,
    attribute: &AttributeDescriptor,
    sink: &mut dyn CodeSink,
) -> Result<String, GenerationError> {
    let symbol = class.symbols().setter(&attribute.name);
    let mut wrapper = ForwardWrapper::new();
    let py_retval = wrapper
        .declarations
        .declare_variable("PyObject *", "py_retval");
    let member = member_expr(class, attribute);
    ctx.return_from_host(&attribute.value_type, &member, &mut wrapper)?;

    sink.writeln("");
    sink.writeln("static int");
    sink.writeln(&format!(
        "{symbol}({}, PyObject *value, void * CPPWRAP_UNUSED(closure))",
        receiver(class, attribute.scope)
    ));
    sink.writeln("{");
    sink.indent();
    wrapper.declarations.write(sink);
    sink.writeln("");
    sink.writeln(&format!("{py_retval} = Py_BuildValue((char *) \"(O)\", value);"));
    sink.writeln(&format!(
        "if (!{}) {{",
        wrapper.parse_params.parse_call(&py_retval)
    ));
    sink.indent();
    sink.writeln(&format!("Py_DECREF({py_retval});"));
    sink.writeln("return -1;");
    sink.unindent();
    sink.writeln("}");
    wrapper.after_call.flush_to(sink);
    sink.writeln(&format!("Py_DECREF({py_retval});"));
    sink.writeln("return 0;");
    sink.unindent();
    sink.writeln("}");
    Ok(symbol)
}

/// Synthesize the metaclass serving a class's static attributes.
///
/// `base` is the metaclass's base type expression: the parent type's type, or
/// the runtime base object's type. Returns the metaclass type object symbol.
pub fn generate_metaclass(
    class: &ClassDescriptor,
    static_getsets: &str,
    base: &str,
    sink: &mut dyn CodeSink,
    module: &mut dyn ModuleBuilder,
) -> String {
    let symbols = class.symbols();

    let mut slots = TypeSlots::new();
    slots.set(Slot::Getset, static_getsets);
    slots.set(Slot::Alloc, "NULL");
    slots.set(Slot::New, "NULL");
    slots.set(Slot::Free, "NULL");
    slots.set_flags(TypeFlags::DEFAULT | TypeFlags::HAVE_GC | TypeFlags::BASETYPE);

    let structure = TypeStructure {
        type_object: symbols.metaclass_type.clone(),
        name: symbols.metaclass.clone(),
        base: base.to_string(),
        metaclass: None,
        slots: slots.finalize("0".to_string(), None, TypeFlags::DEFAULT),
    };
    sink.writeln("");
    type_struct::write_type_structure(&structure, sink);

    let init = module.after_init();
    init.write_code(format!("{}.tp_base = {base};", symbols.metaclass_type));
    init.write_error_check(
        format!("PyType_Ready(&{})", symbols.metaclass_type),
        ModuleInit::INIT_FAILURE,
    );

    symbols.metaclass_type.clone()
}
