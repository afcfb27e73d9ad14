//! By-pointer class handlers.
//!
//! These are the only handlers that move ownership across the boundary:
//!
//! - a parameter may transfer its pointee to the callee (owned mode clears the
//!   adapter's pointer after the call, shared mode takes an extra reference
//!   before it);
//! - a return may be owned by the caller (the new adapter adopts it), shared
//!   (one extra reference), or neither, in which case owned classes fall back
//!   to a heap copy.
//!
//! Returns are also where type narrowing happens.

use tracing::warn;

use cppwrap_core::{Direction, GenerationError, Parameter, ReturnValue, c_identifier};
use cppwrap_registry::ClassDescriptor;

use super::{MarshalContext, parse_adapter};
use crate::ForwardWrapper;

/// `Foo*` parameter.
pub fn parameter(
    class: &ClassDescriptor,
    param: &Parameter,
    wrapper: &mut ForwardWrapper,
) -> Result<(), GenerationError> {
    if param.direction != Direction::In {
        return Err(GenerationError::UnsupportedConversion {
            ctype: param.ctype.clone(),
            reason: "pointer parameters are input-only".to_string(),
        });
    }
    let name = parse_adapter(class, &param.name, Some(&param.name), wrapper);
    wrapper.call_params.push(format!("{name}->obj"));

    if param.transfer_ownership {
        match class.ownership().incref() {
            None => {
                let release = format!("{name}->obj = NULL;");
                wrapper.after_call.write_code(release);
            }
            Some(incref) => {
                let retain = format!("{name}->obj->{incref}();");
                wrapper.before_call.write_code(retain);
            }
        }
    }
    Ok(())
}

/// `Foo*` return.
///
/// A null pointer becomes the host's `None` in the result slot, so any
/// out-parameters built alongside it are still returned.
pub fn return_to_host(
    ctx: &MarshalContext<'_>,
    class: &ClassDescriptor,
    ret: &ReturnValue,
    value: &str,
    wrapper: &mut ForwardWrapper,
) -> Result<(), GenerationError> {
    let symbols = class.symbols();
    let ownership = class.ownership();

    let narrow = class.narrowing() && (ret.caller_owns || ownership.is_shared());
    let typeid_map = match class.narrowing_root() {
        Some(root) if narrow => {
            let root = ctx
                .registry()
                .get(root)
                .ok_or_else(|| GenerationError::UnknownClass(root.to_string()))?;
            Some(root.symbols().typeid_map.clone())
        }
        _ => None,
    };

    let py_name = wrapper.declarations.declare_variable(
        &format!("{} *", symbols.adapter),
        &format!("py_{}", c_identifier(class.name())),
    );
    let lookup = match typeid_map {
        Some(map) => {
            let wrapper_type = wrapper.declarations.declare_variable_with_init(
                "PyTypeObject *",
                "wrapper_type",
                "0",
            );
            let iter = wrapper.declarations.declare_variable(
                "std::map<std::string, PyTypeObject *>::iterator",
                "wrapper_lookup_iter",
            );
            Some((map, wrapper_type, iter))
        }
        None => None,
    };

    let after = &mut wrapper.after_call;
    after.write_code(format!("if (!({value})) {{"));
    after.indent();
    after.write_code("Py_INCREF(Py_None);");
    after.write_code(format!("{py_name} = ({} *) Py_None;", symbols.adapter));
    after.unindent();
    after.write_code("} else {");
    after.indent();

    let wrapper_type = match lookup {
        Some((map, wrapper_type, iter)) => {
            after.write_code(format!("{iter} = {map}.find(typeid(*{value}).name());"));
            after.write_code(format!("if ({iter} == {map}.end()) {{"));
            after.indent();
            after.write_code(format!("{wrapper_type} = {};", symbols.type_ref()));
            after.unindent();
            after.write_code("} else {");
            after.indent();
            after.write_code(format!("{wrapper_type} = {iter}->second;"));
            after.unindent();
            after.write_code("}");
            wrapper_type
        }
        None => symbols.type_ref(),
    };

    after.write_code(format!(
        "{py_name} = PyObject_New({}, {wrapper_type});",
        symbols.adapter
    ));
    if ret.caller_owns {
        after.write_code(format!("{py_name}->obj = {value};"));
    } else if let Some(incref) = ownership.incref() {
        after.write_code(format!("{value}->{incref}();"));
        after.write_code(format!("{py_name}->obj = {value};"));
    } else {
        warn!(
            target: "cppwrap::marshal",
            class = class.name(),
            "pointer return is neither caller-owned nor reference counted; the wrapper keeps a copy"
        );
        after.write_code(format!("{py_name}->obj = new {}(*{value});", class.name()));
    }
    after.unindent();
    after.write_code("}");

    wrapper.build_params.add_parameter("N", [py_name], true);
    Ok(())
}

/// Host value into a native `Foo*` destination.
pub fn return_from_host(
    class: &ClassDescriptor,
    ret: &ReturnValue,
    destination: &str,
    wrapper: &mut ForwardWrapper,
) {
    let tmp_name = format!("tmp_{}", c_identifier(class.name()));
    let tmp = parse_adapter(class, &tmp_name, None, wrapper);
    let after = &mut wrapper.after_call;

    match (ret.caller_owns, class.ownership().incref()) {
        (true, None) => {
            after.write_code(format!("{destination} = new {}(*{tmp}->obj);", class.name()));
        }
        (true, Some(incref)) => {
            after.write_code(format!("{tmp}->obj->{incref}();"));
            after.write_code(format!("{destination} = {tmp}->obj;"));
        }
        (false, _) => {
            warn!(
                target: "cppwrap::marshal",
                class = class.name(),
                "handing out a pointer still owned by its wrapper"
            );
            after.write_code("// shared with the wrapper");
            after.write_code(format!("{destination} = {tmp}->obj;"));
        }
    }
}
