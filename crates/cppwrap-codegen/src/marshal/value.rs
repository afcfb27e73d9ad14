//! By-value class handlers.
//!
//! A by-value parameter passes a copy of the adapter's instance; a by-value
//! return always gets a fresh heap copy, so two returns never alias.

use cppwrap_core::{Direction, GenerationError, Parameter, c_identifier};
use cppwrap_registry::ClassDescriptor;

use super::parse_adapter;
use crate::ForwardWrapper;

/// `Foo` parameter (in only).
pub fn parameter(
    class: &ClassDescriptor,
    param: &Parameter,
    wrapper: &mut ForwardWrapper,
) -> Result<(), GenerationError> {
    if param.direction != Direction::In {
        return Err(GenerationError::UnsupportedConversion {
            ctype: param.ctype.clone(),
            reason: "by-value parameters are input-only".to_string(),
        });
    }
    let name = parse_adapter(class, &param.name, Some(&param.name), wrapper);
    wrapper
        .call_params
        .push(format!("*(({} *) {name})->obj", class.symbols().adapter));
    Ok(())
}

/// `Foo` return: a new adapter owning `new Foo(value)`.
pub fn return_to_host(class: &ClassDescriptor, value: &str, wrapper: &mut ForwardWrapper) {
    let symbols = class.symbols();
    let py_name = wrapper.declarations.declare_variable(
        &format!("{} *", symbols.adapter),
        &format!("py_{}", c_identifier(class.name())),
    );
    wrapper.after_call.write_code(format!(
        "{py_name} = PyObject_New({}, {});",
        symbols.adapter,
        symbols.type_ref()
    ));
    wrapper
        .after_call
        .write_code(format!("{py_name}->obj = new {}({value});", class.name()));
    wrapper.build_params.add_parameter("N", [py_name], true);
}

/// Host value into a native `Foo` destination: copy-assign from the adapter.
pub fn return_from_host(class: &ClassDescriptor, destination: &str, wrapper: &mut ForwardWrapper) {
    let tmp = parse_adapter(
        class,
        &format!("tmp_{}", c_identifier(class.name())),
        None,
        wrapper,
    );
    wrapper
        .after_call
        .write_code(format!("{destination} = *{tmp}->obj;"));
}
