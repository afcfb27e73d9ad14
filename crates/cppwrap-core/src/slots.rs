//! The type record slot table.
//!
//! [`TypeSlots`] is the structured replacement for an open, string-keyed slot
//! map: one optional field per slot of the host's fixed-shape type record.
//! Generation phases and user overrides fill it incrementally with
//! first-writer-wins semantics; [`TypeSlots::finalize`] then applies every
//! default exactly once and yields a [`TypeStructure`] ready for rendering.

use crate::TypeFlags;

/// One named slot of the host type record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    BasicSize,
    Dealloc,
    Getattr,
    Setattr,
    Compare,
    Repr,
    AsNumber,
    AsSequence,
    AsMapping,
    Hash,
    Call,
    Str,
    Getattro,
    Setattro,
    AsBuffer,
    Doc,
    Traverse,
    Clear,
    RichCompare,
    WeakListOffset,
    Iter,
    IterNext,
    Methods,
    Getset,
    DescrGet,
    DescrSet,
    DictOffset,
    Init,
    Alloc,
    New,
    Free,
    IsGc,
}

impl Slot {
    /// Every slot, in record order.
    pub const ALL: [Slot; 32] = [
        Slot::BasicSize,
        Slot::Dealloc,
        Slot::Getattr,
        Slot::Setattr,
        Slot::Compare,
        Slot::Repr,
        Slot::AsNumber,
        Slot::AsSequence,
        Slot::AsMapping,
        Slot::Hash,
        Slot::Call,
        Slot::Str,
        Slot::Getattro,
        Slot::Setattro,
        Slot::AsBuffer,
        Slot::Doc,
        Slot::Traverse,
        Slot::Clear,
        Slot::RichCompare,
        Slot::WeakListOffset,
        Slot::Iter,
        Slot::IterNext,
        Slot::Methods,
        Slot::Getset,
        Slot::DescrGet,
        Slot::DescrSet,
        Slot::DictOffset,
        Slot::Init,
        Slot::Alloc,
        Slot::New,
        Slot::Free,
        Slot::IsGc,
    ];

    /// The host's field name for this slot.
    pub fn field_name(self) -> &'static str {
        match self {
            Slot::BasicSize => "tp_basicsize",
            Slot::Dealloc => "tp_dealloc",
            Slot::Getattr => "tp_getattr",
            Slot::Setattr => "tp_setattr",
            Slot::Compare => "tp_compare",
            Slot::Repr => "tp_repr",
            Slot::AsNumber => "tp_as_number",
            Slot::AsSequence => "tp_as_sequence",
            Slot::AsMapping => "tp_as_mapping",
            Slot::Hash => "tp_hash",
            Slot::Call => "tp_call",
            Slot::Str => "tp_str",
            Slot::Getattro => "tp_getattro",
            Slot::Setattro => "tp_setattro",
            Slot::AsBuffer => "tp_as_buffer",
            Slot::Doc => "tp_doc",
            Slot::Traverse => "tp_traverse",
            Slot::Clear => "tp_clear",
            Slot::RichCompare => "tp_richcompare",
            Slot::WeakListOffset => "tp_weaklistoffset",
            Slot::Iter => "tp_iter",
            Slot::IterNext => "tp_iternext",
            Slot::Methods => "tp_methods",
            Slot::Getset => "tp_getset",
            Slot::DescrGet => "tp_descr_get",
            Slot::DescrSet => "tp_descr_set",
            Slot::DictOffset => "tp_dictoffset",
            Slot::Init => "tp_init",
            Slot::Alloc => "tp_alloc",
            Slot::New => "tp_new",
            Slot::Free => "tp_free",
            Slot::IsGc => "tp_is_gc",
        }
    }

    /// Value an unset slot takes at finalization.
    ///
    /// `BasicSize` and `Doc` depend on the class and are handled by
    /// [`TypeSlots::finalize`].
    pub fn default_value(self) -> &'static str {
        match self {
            Slot::WeakListOffset | Slot::DictOffset => "0",
            Slot::Alloc => "PyType_GenericAlloc",
            Slot::New => "PyType_GenericNew",
            Slot::Free => "_PyObject_Del",
            _ => "NULL",
        }
    }
}

/// Slot values collected during generation.
///
/// Unset fields are `None`; [`TypeSlots::set`] never overwrites an earlier
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeSlots {
    pub basic_size: Option<String>,
    pub dealloc: Option<String>,
    pub getattr: Option<String>,
    pub setattr: Option<String>,
    pub compare: Option<String>,
    pub repr: Option<String>,
    pub as_number: Option<String>,
    pub as_sequence: Option<String>,
    pub as_mapping: Option<String>,
    pub hash: Option<String>,
    pub call: Option<String>,
    pub str: Option<String>,
    pub getattro: Option<String>,
    pub setattro: Option<String>,
    pub as_buffer: Option<String>,
    pub doc: Option<String>,
    pub traverse: Option<String>,
    pub clear: Option<String>,
    pub rich_compare: Option<String>,
    pub weak_list_offset: Option<String>,
    pub iter: Option<String>,
    pub iter_next: Option<String>,
    pub methods: Option<String>,
    pub getset: Option<String>,
    pub descr_get: Option<String>,
    pub descr_set: Option<String>,
    pub dict_offset: Option<String>,
    pub init: Option<String>,
    pub alloc: Option<String>,
    pub new: Option<String>,
    pub free: Option<String>,
    pub is_gc: Option<String>,
    /// `tp_flags`, kept typed rather than as a C expression.
    pub flags: Option<TypeFlags>,
}

impl TypeSlots {
    /// Create an empty slot table.
    pub fn new() -> Self {
        Self::default()
    }

    fn field(&self, slot: Slot) -> &Option<String> {
        match slot {
            Slot::BasicSize => &self.basic_size,
            Slot::Dealloc => &self.dealloc,
            Slot::Getattr => &self.getattr,
            Slot::Setattr => &self.setattr,
            Slot::Compare => &self.compare,
            Slot::Repr => &self.repr,
            Slot::AsNumber => &self.as_number,
            Slot::AsSequence => &self.as_sequence,
            Slot::AsMapping => &self.as_mapping,
            Slot::Hash => &self.hash,
            Slot::Call => &self.call,
            Slot::Str => &self.str,
            Slot::Getattro => &self.getattro,
            Slot::Setattro => &self.setattro,
            Slot::AsBuffer => &self.as_buffer,
            Slot::Doc => &self.doc,
            Slot::Traverse => &self.traverse,
            Slot::Clear => &self.clear,
            Slot::RichCompare => &self.rich_compare,
            Slot::WeakListOffset => &self.weak_list_offset,
            Slot::Iter => &self.iter,
            Slot::IterNext => &self.iter_next,
            Slot::Methods => &self.methods,
            Slot::Getset => &self.getset,
            Slot::DescrGet => &self.descr_get,
            Slot::DescrSet => &self.descr_set,
            Slot::DictOffset => &self.dict_offset,
            Slot::Init => &self.init,
            Slot::Alloc => &self.alloc,
            Slot::New => &self.new,
            Slot::Free => &self.free,
            Slot::IsGc => &self.is_gc,
        }
    }

    fn field_mut(&mut self, slot: Slot) -> &mut Option<String> {
        match slot {
            Slot::BasicSize => &mut self.basic_size,
            Slot::Dealloc => &mut self.dealloc,
            Slot::Getattr => &mut self.getattr,
            Slot::Setattr => &mut self.setattr,
            Slot::Compare => &mut self.compare,
            Slot::Repr => &mut self.repr,
            Slot::AsNumber => &mut self.as_number,
            Slot::AsSequence => &mut self.as_sequence,
            Slot::AsMapping => &mut self.as_mapping,
            Slot::Hash => &mut self.hash,
            Slot::Call => &mut self.call,
            Slot::Str => &mut self.str,
            Slot::Getattro => &mut self.getattro,
            Slot::Setattro => &mut self.setattro,
            Slot::AsBuffer => &mut self.as_buffer,
            Slot::Doc => &mut self.doc,
            Slot::Traverse => &mut self.traverse,
            Slot::Clear => &mut self.clear,
            Slot::RichCompare => &mut self.rich_compare,
            Slot::WeakListOffset => &mut self.weak_list_offset,
            Slot::Iter => &mut self.iter,
            Slot::IterNext => &mut self.iter_next,
            Slot::Methods => &mut self.methods,
            Slot::Getset => &mut self.getset,
            Slot::DescrGet => &mut self.descr_get,
            Slot::DescrSet => &mut self.descr_set,
            Slot::DictOffset => &mut self.dict_offset,
            Slot::Init => &mut self.init,
            Slot::Alloc => &mut self.alloc,
            Slot::New => &mut self.new,
            Slot::Free => &mut self.free,
            Slot::IsGc => &mut self.is_gc,
        }
    }

    /// Current value of a slot.
    pub fn get(&self, slot: Slot) -> Option<&str> {
        self.field(slot).as_deref()
    }

    /// Whether a slot has been written.
    pub fn is_set(&self, slot: Slot) -> bool {
        self.field(slot).is_some()
    }

    /// Write a slot unless an earlier writer got there first.
    ///
    /// Returns `true` if the value was stored.
    pub fn set(&mut self, slot: Slot, value: impl Into<String>) -> bool {
        let field = self.field_mut(slot);
        if field.is_some() {
            return false;
        }
        *field = Some(value.into());
        true
    }

    /// Set `tp_flags` unless already set.
    pub fn set_flags(&mut self, flags: TypeFlags) -> bool {
        if self.flags.is_some() {
            return false;
        }
        self.flags = Some(flags);
        true
    }

    /// Apply every default and freeze the table.
    ///
    /// `basic_size` and `docstring` fill `tp_basicsize` and `tp_doc` when no
    /// earlier phase did.
    pub fn finalize(
        mut self,
        basic_size: String,
        docstring: Option<&str>,
        default_flags: TypeFlags,
    ) -> FinalSlots {
        self.set(Slot::BasicSize, basic_size);
        self.set(
            Slot::Doc,
            docstring.map_or_else(|| "NULL".to_string(), c_string_literal),
        );
        self.set_flags(default_flags);
        for slot in Slot::ALL {
            self.set(slot, slot.default_value());
        }
        FinalSlots { slots: self }
    }
}

/// A slot table with every field filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalSlots {
    slots: TypeSlots,
}

impl FinalSlots {
    /// Value of a slot.
    pub fn get(&self, slot: Slot) -> &str {
        self.slots.get(slot).unwrap_or(slot.default_value())
    }

    /// The resolved `tp_flags`.
    pub fn flags(&self) -> TypeFlags {
        self.slots.flags.unwrap_or_default()
    }
}

/// A finalized type record: identity, links and every slot value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeStructure {
    /// Symbol of the type object being defined.
    pub type_object: String,
    /// Name exposed to the host (`tp_name`).
    pub name: String,
    /// Base type address expression, always filled.
    pub base: String,
    /// Metaclass address expression, if the class has one.
    pub metaclass: Option<String>,
    /// Slot values.
    pub slots: FinalSlots,
}

/// Quote a string as a C string literal.
pub fn c_string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
