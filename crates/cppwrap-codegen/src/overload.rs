//! Method and constructor entry points.
//!
//! The [`OverloadEmitter`] trait turns a group of same-named wrappers into a
//! single host entry point. [`DefaultOverloadEmitter`] writes one function
//! for a single candidate and, for several, one function per candidate plus
//! a dispatcher that tries them in registration order.

use cppwrap_core::{FunctionWrapper, GenerationError, WrapperKind, c_string_literal};
use cppwrap_registry::{ClassDescriptor, OverloadSet};

use crate::{CodeSink, ForwardWrapper, MarshalContext};

/// Emits host entry points for methods and constructors.
pub trait OverloadEmitter {
    /// Emit the entry point of a method overload set; returns its symbol.
    fn emit_methods(
        &self,
        ctx: &MarshalContext<'_>,
        class: &ClassDescriptor,
        set: &OverloadSet,
        sink: &mut dyn CodeSink,
    ) -> Result<String, GenerationError>;

    /// Emit the `tp_init` entry point for a list of constructors; returns its
    /// symbol.
    fn emit_constructors(
        &self,
        ctx: &MarshalContext<'_>,
        class: &ClassDescriptor,
        constructors: &[FunctionWrapper],
        sink: &mut dyn CodeSink,
    ) -> Result<String, GenerationError>;

    /// The method-table entry for an emitted overload set.
    fn method_def(&self, set: &OverloadSet, symbol: &str) -> String;
}

/// Default overload emitter.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultOverloadEmitter;

impl OverloadEmitter for DefaultOverloadEmitter {
    fn emit_methods(
        &self,
        ctx: &MarshalContext<'_>,
        class: &ClassDescriptor,
        set: &OverloadSet,
        sink: &mut dyn CodeSink,
    ) -> Result<String, GenerationError> {
        let symbol = class.symbols().method(&set.name);
        emit_overloads(ctx, class, &set.wrappers, &symbol, sink)?;
        Ok(symbol)
    }

    fn emit_constructors(
        &self,
        ctx: &MarshalContext<'_>,
        class: &ClassDescriptor,
        constructors: &[FunctionWrapper],
        sink: &mut dyn CodeSink,
    ) -> Result<String, GenerationError> {
        let symbol = class.symbols().init();
        emit_overloads(ctx, class, constructors, &symbol, sink)?;
        Ok(symbol)
    }

    fn method_def(&self, set: &OverloadSet, symbol: &str) -> String {
        let doc = set
            .wrappers
            .iter()
            .find_map(|w| w.docstring.as_deref())
            .map_or_else(|| "NULL".to_string(), c_string_literal);
        format!(
            "{{(char *) \"{}\", (PyCFunction) {symbol}, METH_KEYWORDS|METH_VARARGS, {doc}}},",
            set.name
        )
    }
}

/// Shape of a method or constructor wrapper function.
struct Signature {
    return_type: &'static str,
    retval: &'static str,
    error_return: &'static str,
}

impl Signature {
    fn of(kind: WrapperKind) -> Self {
        match kind {
            WrapperKind::Method => Signature {
                return_type: "PyObject *",
                retval: "PyObject *retval;",
                error_return: "return NULL;",
            },
            WrapperKind::Constructor => Signature {
                return_type: "int",
                retval: "int retval;",
                error_return: "return -1;",
            },
        }
    }
}

fn emit_overloads(
    ctx: &MarshalContext<'_>,
    class: &ClassDescriptor,
    wrappers: &[FunctionWrapper],
    symbol: &str,
    sink: &mut dyn CodeSink,
) -> Result<(), GenerationError> {
    match wrappers {
        [] => Err(GenerationError::UnsupportedConversion {
            ctype: class.name().to_string(),
            reason: format!("no candidates for '{symbol}'"),
        }),
        [single] => write_function_wrapper(ctx, class, single, symbol, false, sink),
        candidates => {
            let mut symbols = Vec::with_capacity(candidates.len());
            for (index, candidate) in candidates.iter().enumerate() {
                let candidate_symbol = format!("{symbol}__{index}");
                write_function_wrapper(ctx, class, candidate, &candidate_symbol, true, sink)?;
                sink.writeln("");
                symbols.push(candidate_symbol);
            }
            write_dispatcher(class, candidates[0].kind, symbol, &symbols, sink);
            Ok(())
        }
    }
}

/// Write one wrapper function.
///
/// Overload candidates take an extra `return_exception` out-parameter that
/// receives the parse error instead of raising it.
pub fn write_function_wrapper(
    ctx: &MarshalContext<'_>,
    class: &ClassDescriptor,
    function: &FunctionWrapper,
    symbol: &str,
    overload_candidate: bool,
    sink: &mut dyn CodeSink,
) -> Result<(), GenerationError> {
    let signature = Signature::of(function.kind);
    let adapter = &class.symbols().adapter;
    let mut wrapper = ForwardWrapper::new();

    let py_retval = match function.kind {
        WrapperKind::Method => Some(
            wrapper
                .declarations
                .declare_variable("PyObject *", "py_retval"),
        ),
        WrapperKind::Constructor => None,
    };

    for param in &function.parameters {
        ctx.parameter(param, &mut wrapper)?;
    }

    let arguments = wrapper.call_arguments();
    let call = match function.kind {
        WrapperKind::Constructor => {
            format!("self->obj = new {}({arguments});", class.name())
        }
        WrapperKind::Method if function.return_value.is_void() => {
            format!("self->obj->{}({arguments});", function.method_name)
        }
        WrapperKind::Method => {
            let retval = wrapper
                .declarations
                .declare_variable(&function.return_value.ctype, "retval");
            ctx.return_to_host(&function.return_value, &retval, &mut wrapper)?;
            let method = &function.method_name;
            format!("{retval} = self->obj->{method}({arguments});")
        }
    };

    sink.writeln("");
    sink.writeln(&format!("static {}", signature.return_type));
    if overload_candidate {
        sink.writeln(&format!(
            "{symbol}({adapter} *self, PyObject *args, PyObject *kwargs, \
             PyObject **return_exception)"
        ));
    } else {
        sink.writeln(&format!("{symbol}({adapter} *self, PyObject *args, PyObject *kwargs)"));
    }
    sink.writeln("{");
    sink.indent();

    wrapper.declarations.write(sink);
    sink.writeln(&format!(
        "const char *keywords[] = {};",
        wrapper.parse_params.keyword_list()
    ));
    sink.writeln("");

    let parse = wrapper
        .parse_params
        .parse_call_with_keywords("args", "kwargs");
    sink.writeln(&format!("if (!{parse}) {{"));
    sink.indent();
    if overload_candidate {
        sink.writeln("{");
        sink.indent();
        sink.writeln("PyObject *exc_type, *traceback;");
        sink.writeln("PyErr_Fetch(&exc_type, return_exception, &traceback);");
        sink.writeln("Py_XDECREF(exc_type);");
        sink.writeln("Py_XDECREF(traceback);");
        sink.unindent();
        sink.writeln("}");
    }
    sink.writeln(signature.error_return);
    sink.unindent();
    sink.writeln("}");

    wrapper.before_call.flush_to(sink);
    sink.writeln(&call);
    wrapper.after_call.flush_to(sink);

    match py_retval {
        Some(py_retval) => {
            wrapper.write_build_result(sink, &py_retval);
            sink.writeln(&format!("return {py_retval};"));
        }
        None => sink.writeln("return 0;"),
    }

    sink.unindent();
    sink.writeln("}");
    Ok(())
}

/// Write the dispatcher trying each candidate in order.
fn write_dispatcher(
    class: &ClassDescriptor,
    kind: WrapperKind,
    symbol: &str,
    candidates: &[String],
    sink: &mut dyn CodeSink,
) {
    let signature = Signature::of(kind);
    let count = candidates.len();

    sink.writeln(&format!("static {}", signature.return_type));
    sink.writeln(&format!(
        "{symbol}({} *self, PyObject *args, PyObject *kwargs)",
        class.symbols().adapter
    ));
    sink.writeln("{");
    sink.indent();
    sink.writeln(signature.retval);
    sink.writeln("PyObject *error_list;");
    sink.writeln(&format!("PyObject *exceptions[{count}] = {{0,}};"));

    for (index, candidate) in candidates.iter().enumerate() {
        sink.writeln(&format!(
            "retval = {candidate}(self, args, kwargs, &exceptions[{index}]);"
        ));
        sink.writeln(&format!("if (!exceptions[{index}]) {{"));
        sink.indent();
        for earlier in 0..index {
            sink.writeln(&format!("Py_DECREF(exceptions[{earlier}]);"));
        }
        sink.writeln("return retval;");
        sink.unindent();
        sink.writeln("}");
    }

    sink.writeln(&format!("error_list = PyList_New({count});"));
    for index in 0..count {
        sink.writeln(&format!(
            "PyList_SET_ITEM(error_list, {index}, PyObject_Str(exceptions[{index}]));"
        ));
        sink.writeln(&format!("Py_DECREF(exceptions[{index}]);"));
    }
    sink.writeln("PyErr_SetObject(PyExc_TypeError, error_list);");
    sink.writeln("Py_DECREF(error_list);");
    sink.writeln(signature.error_return);
    sink.unindent();
    sink.writeln("}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BasicTypes, MemorySink};
    use cppwrap_core::{Parameter, ReturnValue};
    use cppwrap_registry::{ClassRegistry, ClassSpec};

    fn registry() -> ClassRegistry {
        let mut registry = ClassRegistry::new();
        let foo = registry.register_class(ClassSpec::new("Foo")).unwrap();
        let int = ReturnValue::basic("int");
        let get = FunctionWrapper::method("get", int, vec![]).with_doc("Get it");
        registry.add_method(foo, get, None).unwrap();
        for ctype in ["int", "double"] {
            let params = vec![Parameter::basic(ctype, "x")];
            let set = FunctionWrapper::method("set", ReturnValue::void(), params);
            registry.add_method(foo, set, None).unwrap();
        }
        registry
    }

    #[test]
    fn single_candidate_method() {
        let registry = registry();
        let types = BasicTypes::new();
        let ctx = MarshalContext::new(&registry, &types);
        let foo = registry.get_by_name("Foo").unwrap();
        let set = foo.find_method("get").unwrap();

        let mut sink = MemorySink::new();
        let symbol = DefaultOverloadEmitter
            .emit_methods(&ctx, foo, set, &mut sink)
            .unwrap();
        let out = sink.into_string();

        assert_eq!(symbol, "_wrap_PyFoo_get");
        let signature = "_wrap_PyFoo_get(PyFoo *self, PyObject *args, PyObject *kwargs)\n{";
        assert!(out.contains(&format!("static PyObject *\n{signature}")));
        assert!(out.contains("    const char *keywords[] = {NULL};"));
        assert!(out.contains("    retval = self->obj->get();"));
        assert!(out.contains("    py_retval = Py_BuildValue((char *) \"i\", retval);"));
        assert!(!out.contains("return_exception"));
    }

    #[test]
    fn overloaded_method_dispatches_in_order() {
        let registry = registry();
        let types = BasicTypes::new();
        let ctx = MarshalContext::new(&registry, &types);
        let foo = registry.get_by_name("Foo").unwrap();
        let set = foo.find_method("set").unwrap();

        let mut sink = MemorySink::new();
        let symbol = DefaultOverloadEmitter
            .emit_methods(&ctx, foo, set, &mut sink)
            .unwrap();
        let out = sink.into_string();

        assert_eq!(symbol, "_wrap_PyFoo_set");
        let first_call = "_wrap_PyFoo_set__0(self, args, kwargs, &exceptions[0]);";
        let second_call = "_wrap_PyFoo_set__1(self, args, kwargs, &exceptions[1]);";
        let first = out.find(first_call).unwrap();
        let second = out.find(second_call).unwrap();
        assert!(first < second);
        assert!(out.contains("PyObject **return_exception"));
        assert!(out.contains("PyErr_SetObject(PyExc_TypeError, error_list);"));
        assert!(out.contains("    PyObject *exceptions[2] = {0,};"));
    }

    #[test]
    fn constructor_returns_int() {
        let mut registry = ClassRegistry::new();
        let foo = registry.register_class(ClassSpec::new("Foo")).unwrap();
        let ctor = FunctionWrapper::constructor(vec![Parameter::basic("int", "size")]);
        registry.add_constructor(foo, ctor).unwrap();
        let types = BasicTypes::new();
        let ctx = MarshalContext::new(&registry, &types);
        let class = registry.get(foo).unwrap();

        let mut sink = MemorySink::new();
        let symbol = DefaultOverloadEmitter
            .emit_constructors(&ctx, class, class.constructors(), &mut sink)
            .unwrap();
        let out = sink.into_string();

        assert_eq!(symbol, "_wrap_PyFoo__tp_init");
        let signature = "_wrap_PyFoo__tp_init(PyFoo *self, PyObject *args, PyObject *kwargs)";
        assert!(out.contains(&format!("static int\n{signature}")));
        assert!(out.contains("    self->obj = new Foo(size);\n    return 0;\n}"));
        assert!(out.contains("        return -1;"));
    }

    #[test]
    fn method_def_uses_first_docstring() {
        let registry = registry();
        let foo = registry.get_by_name("Foo").unwrap();

        let get = foo.find_method("get").unwrap();
        let def = DefaultOverloadEmitter.method_def(get, "_wrap_PyFoo_get");
        assert!(def.starts_with("{(char *) \"get\", (PyCFunction) _wrap_PyFoo_get, "));
        assert!(def.ends_with("METH_KEYWORDS|METH_VARARGS, \"Get it\"},"));
        let set = foo.find_method("set").unwrap();
        let def = DefaultOverloadEmitter.method_def(set, "s");
        assert!(def.ends_with("NULL},"));
    }
}
