//! By-reference class parameters.
//!
//! `in` borrows the caller's instance; `out` allocates a fresh adapter and
//! instance before the call and returns it; `inout` uses the caller's adapter
//! for both.

use cppwrap_core::{Direction, GenerationError, Parameter};
use cppwrap_registry::ClassDescriptor;

use super::parse_adapter;
use crate::ForwardWrapper;

/// `Foo&` parameter.
pub fn parameter(
    class: &ClassDescriptor,
    param: &Parameter,
    wrapper: &mut ForwardWrapper,
) -> Result<(), GenerationError> {
    let symbols = class.symbols();
    match param.direction {
        Direction::In => {
            let name = parse_adapter(class, &param.name, Some(&param.name), wrapper);
            wrapper.call_params.push(format!("*{name}->obj"));
        }
        Direction::Out => {
            let name = wrapper
                .declarations
                .declare_variable(&format!("{} *", symbols.adapter), &param.name);
            wrapper.before_call.write_code(format!(
                "{name} = PyObject_New({}, {});",
                symbols.adapter,
                symbols.type_ref()
            ));
            wrapper
                .before_call
                .write_code(format!("{name}->obj = new {};", class.name()));
            wrapper.call_params.push(format!("*{name}->obj"));
            wrapper.build_params.add_parameter("N", [name], false);
        }
        Direction::InOut => {
            let name = parse_adapter(class, &param.name, Some(&param.name), wrapper);
            wrapper.call_params.push(format!("*{name}->obj"));
            wrapper.build_params.add_parameter("O", [name], false);
        }
    }
    Ok(())
}
