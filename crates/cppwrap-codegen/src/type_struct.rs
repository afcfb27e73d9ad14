//! Type record emission.
//!
//! Renders a finalized [`TypeStructure`] as the host's fixed-shape type
//! object initializer. Every field is written in record order; slots come
//! from the finalized table, identity and links from the structure itself.

use cppwrap_core::{Slot, TypeStructure};

use crate::CodeSink;

/// One field of the record.
enum Field {
    /// A slot value with an optional function-pointer cast.
    Slot(&'static str, Slot),
    /// A constant value: cast, value, field name.
    Fixed(&'static str, &'static str, &'static str),
    Name,
    Flags,
    Base,
}

impl Field {
    fn name(&self) -> &'static str {
        match self {
            Field::Slot(_, slot) => slot.field_name(),
            Field::Fixed(_, _, name) => *name,
            Field::Name => "tp_name",
            Field::Flags => "tp_flags",
            Field::Base => "tp_base",
        }
    }
}

/// Record layout after the object header.
const LAYOUT: &[Field] = &[
    Field::Fixed("", "0", "ob_size"),
    Field::Name,
    Field::Slot("", Slot::BasicSize),
    Field::Fixed("", "0", "tp_itemsize"),
    Field::Slot("(destructor)", Slot::Dealloc),
    Field::Fixed("(printfunc)", "0", "tp_print"),
    Field::Slot("(getattrfunc)", Slot::Getattr),
    Field::Slot("(setattrfunc)", Slot::Setattr),
    Field::Slot("(cmpfunc)", Slot::Compare),
    Field::Slot("(reprfunc)", Slot::Repr),
    Field::Slot("(PyNumberMethods*)", Slot::AsNumber),
    Field::Slot("(PySequenceMethods*)", Slot::AsSequence),
    Field::Slot("(PyMappingMethods*)", Slot::AsMapping),
    Field::Slot("(hashfunc)", Slot::Hash),
    Field::Slot("(ternaryfunc)", Slot::Call),
    Field::Slot("(reprfunc)", Slot::Str),
    Field::Slot("(getattrofunc)", Slot::Getattro),
    Field::Slot("(setattrofunc)", Slot::Setattro),
    Field::Slot("(PyBufferProcs*)", Slot::AsBuffer),
    Field::Flags,
    Field::Slot("", Slot::Doc),
    Field::Slot("(traverseproc)", Slot::Traverse),
    Field::Slot("(inquiry)", Slot::Clear),
    Field::Slot("(richcmpfunc)", Slot::RichCompare),
    Field::Slot("", Slot::WeakListOffset),
    Field::Slot("(getiterfunc)", Slot::Iter),
    Field::Slot("(iternextfunc)", Slot::IterNext),
    Field::Slot("(struct PyMethodDef*)", Slot::Methods),
    Field::Fixed("(struct PyMemberDef*)", "0", "tp_members"),
    Field::Slot("(struct PyGetSetDef*)", Slot::Getset),
    Field::Base,
    Field::Fixed("", "NULL", "tp_dict"),
    Field::Slot("(descrgetfunc)", Slot::DescrGet),
    Field::Slot("(descrsetfunc)", Slot::DescrSet),
    Field::Slot("", Slot::DictOffset),
    Field::Slot("(initproc)", Slot::Init),
    Field::Slot("(allocfunc)", Slot::Alloc),
    Field::Slot("(newfunc)", Slot::New),
    Field::Slot("(freefunc)", Slot::Free),
    Field::Slot("(inquiry)", Slot::IsGc),
    Field::Fixed("", "NULL", "tp_bases"),
    Field::Fixed("", "NULL", "tp_mro"),
    Field::Fixed("", "NULL", "tp_cache"),
    Field::Fixed("", "NULL", "tp_subclasses"),
    Field::Fixed("", "NULL", "tp_weaklist"),
    Field::Fixed("(destructor)", "NULL", "tp_del"),
];

/// Write the type object definition.
pub fn write_type_structure(structure: &TypeStructure, sink: &mut dyn CodeSink) {
    sink.writeln(&format!("PyTypeObject {} = {{", structure.type_object));
    sink.indent();
    sink.writeln(&format!(
        "PyObject_HEAD_INIT({})",
        structure.metaclass.as_deref().unwrap_or("NULL")
    ));

    let last = LAYOUT.len() - 1;
    for (index, field) in LAYOUT.iter().enumerate() {
        let value = match field {
            Field::Slot(cast, slot) => format!("{cast}{}", structure.slots.get(*slot)),
            Field::Fixed(cast, value, _) => format!("{cast}{value}"),
            Field::Name => format!("(char *) \"{}\"", structure.name),
            Field::Flags => structure.slots.flags().to_c_expr(),
            Field::Base => format!("(PyTypeObject *) {}", structure.base),
        };
        let separator = if index == last { "" } else { "," };
        sink.writeln(&format!("{value}{separator} /* {} */", field.name()));
    }

    sink.unindent();
    sink.writeln("};");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySink;
    use cppwrap_core::{TypeFlags, TypeSlots};

    fn structure(slots: TypeSlots, metaclass: Option<&str>) -> TypeStructure {
        let size = "sizeof(PyFoo)".to_string();
        TypeStructure {
            type_object: "PyFoo_Type".to_string(),
            name: "Foo".to_string(),
            base: "&PyBaseObject_Type".to_string(),
            metaclass: metaclass.map(str::to_string),
            slots: slots.finalize(size, Some("A foo"), TypeFlags::DEFAULT),
        }
    }

    #[test]
    fn defaults_are_rendered() {
        let mut sink = MemorySink::new();
        write_type_structure(&structure(TypeSlots::new(), None), &mut sink);
        let out = sink.into_string();

        assert!(out.starts_with("PyTypeObject PyFoo_Type = {\n    PyObject_HEAD_INIT(NULL)\n"));
        assert!(out.contains("    (char *) \"Foo\", /* tp_name */\n"));
        assert!(out.contains("    sizeof(PyFoo), /* tp_basicsize */\n"));
        assert!(out.contains("    Py_TPFLAGS_DEFAULT, /* tp_flags */\n"));
        assert!(out.contains("    \"A foo\", /* tp_doc */\n"));
        assert!(out.contains("    (allocfunc)PyType_GenericAlloc, /* tp_alloc */\n"));
        assert!(out.contains("    (newfunc)PyType_GenericNew, /* tp_new */\n"));
        assert!(out.contains("    (freefunc)_PyObject_Del, /* tp_free */\n"));
        assert!(out.contains("    (PyTypeObject *) &PyBaseObject_Type, /* tp_base */\n"));
        assert!(out.ends_with("    (destructor)NULL /* tp_del */\n};\n"));
    }

    #[test]
    fn populated_slots_and_metaclass() {
        let mut slots = TypeSlots::new();
        slots.set(Slot::Init, "_wrap_PyFoo__tp_init");
        slots.set(Slot::Methods, "Foo_methods");
        slots.set_flags(TypeFlags::DEFAULT | TypeFlags::BASETYPE);

        let mut sink = MemorySink::new();
        write_type_structure(&structure(slots, Some("&PyFooMeta_Type")), &mut sink);
        let out = sink.into_string();

        assert!(out.contains("PyObject_HEAD_INIT(&PyFooMeta_Type)"));
        assert!(out.contains("(initproc)_wrap_PyFoo__tp_init, /* tp_init */"));
        assert!(out.contains("(struct PyMethodDef*)Foo_methods, /* tp_methods */"));
        assert!(out.contains("Py_TPFLAGS_DEFAULT|Py_TPFLAGS_BASETYPE, /* tp_flags */"));
    }

    #[test]
    fn field_count_matches_record() {
        // ob_size through tp_del.
        assert_eq!(LAYOUT.len(), 46);
    }

    #[test]
    fn every_slot_is_rendered_once() {
        let mut sink = MemorySink::new();
        write_type_structure(&structure(TypeSlots::new(), None), &mut sink);
        let out = sink.into_string();

        for slot in Slot::ALL {
            let comment = format!("/* {} */", slot.field_name());
            assert_eq!(out.matches(&comment).count(), 1, "{comment}");
        }
    }
}
