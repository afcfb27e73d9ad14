//! Deallocation code.
//!
//! The ownership mode of a class is fixed at registration; this module turns
//! it into a `tp_dealloc`:
//!
//! - owned: detach the pointer, clear it, delete the instance;
//! - shared: detach the pointer, clear it, drop one reference if non-null;
//! - no constructor: only free the host allocation. The adapter never
//!   received a native instance, so the pointer is never read.
//!
//! A user-supplied `tp_dealloc` suppresses generation.

use cppwrap_core::{Slot, TypeSlots};
use cppwrap_registry::{ClassDescriptor, Ownership};

use crate::CodeSink;

/// Emit `tp_dealloc` and record it in `slots`.
///
/// Returns the generated symbol, or `None` when the user supplied one.
pub fn generate_destructor(
    class: &ClassDescriptor,
    have_constructor: bool,
    slots: &mut TypeSlots,
    sink: &mut dyn CodeSink,
) -> Option<String> {
    if slots.is_set(Slot::Dealloc) {
        return None;
    }

    let symbols = class.symbols();
    let symbol = symbols.dealloc();

    sink.writeln("");
    sink.writeln("static void");
    sink.writeln(&format!("{symbol}({} *self)", symbols.adapter));
    sink.writeln("{");
    sink.indent();
    if have_constructor {
        sink.writeln(&format!("{} *tmp = self->obj;", class.name()));
        sink.writeln("self->obj = NULL;");
        match class.ownership() {
            Ownership::Owned => sink.writeln("delete tmp;"),
            Ownership::Shared { decref, .. } => {
                sink.writeln("if (tmp) {");
                sink.indent();
                sink.writeln(&format!("tmp->{decref}();"));
                sink.unindent();
                sink.writeln("}");
            }
        }
    }
    sink.writeln("PyObject_DEL(self);");
    sink.unindent();
    sink.writeln("}");

    slots.set(Slot::Dealloc, symbol.clone());
    Some(symbol)
}
