//! Generated C symbol names for a wrapped class.

use crate::GeneratorSettings;

/// Turn a native spelling into a C identifier fragment.
///
/// Every character that cannot appear in a C identifier becomes `_`, so
/// `ns::Widget<int>` maps to `ns__Widget_int_`.
pub fn c_identifier(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// All symbol names derived from one class name.
///
/// # Example
///
/// ```
/// use cppwrap_core::{ClassSymbols, GeneratorSettings};
///
/// let symbols = ClassSymbols::new("Foo", &GeneratorSettings::default());
/// assert_eq!(symbols.adapter, "PyFoo");
/// assert_eq!(symbols.type_object, "PyFoo_Type");
/// assert_eq!(symbols.metaclass_type, "PyFooMeta_Type");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSymbols {
    /// Adapter struct (host header + native pointer).
    pub adapter: String,
    /// Type object.
    pub type_object: String,
    /// Metaclass base name.
    pub metaclass: String,
    /// Metaclass type object.
    pub metaclass_type: String,
    /// Getset table for instance attributes.
    pub instance_getsets: String,
    /// Getset table for static attributes (lives on the metaclass).
    pub static_getsets: String,
    /// Narrowing lookup table (only emitted by narrowing roots).
    pub typeid_map: String,
    /// Method table.
    pub method_table: String,
}

impl ClassSymbols {
    /// Derive the symbols for `name` under the configured prefix.
    pub fn new(name: &str, settings: &GeneratorSettings) -> Self {
        let ident = c_identifier(name);
        let adapter = format!("Py{}{}", settings.symbol_prefix(), ident);
        let metaclass = format!("{adapter}Meta");
        Self {
            type_object: format!("{adapter}_Type"),
            metaclass_type: format!("{metaclass}_Type"),
            instance_getsets: format!("{adapter}__getsets"),
            static_getsets: format!("{metaclass}__getsets"),
            typeid_map: format!("{adapter}__typeid_map"),
            method_table: format!("{ident}_methods"),
            adapter,
            metaclass,
        }
    }

    /// Address-of expression for the type object.
    pub fn type_ref(&self) -> String {
        format!("&{}", self.type_object)
    }

    /// Deallocation hook symbol.
    pub fn dealloc(&self) -> String {
        format!("_wrap_{}__tp_dealloc", self.adapter)
    }

    /// Initializer (constructor dispatch) symbol.
    pub fn init(&self) -> String {
        format!("_wrap_{}__tp_init", self.adapter)
    }

    /// Method wrapper symbol.
    pub fn method(&self, name: &str) -> String {
        format!("_wrap_{}_{}", self.adapter, c_identifier(name))
    }

    /// Attribute getter symbol.
    pub fn getter(&self, attribute: &str) -> String {
        format!("_wrap_{}__get_{}", self.adapter, c_identifier(attribute))
    }

    /// Attribute setter symbol.
    pub fn setter(&self, attribute: &str) -> String {
        format!("_wrap_{}__set_{}", self.adapter, c_identifier(attribute))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_capitalized() {
        let settings = GeneratorSettings::new().with_name_prefix("hello");
        let symbols = ClassSymbols::new("Foo", &settings);
        assert_eq!(symbols.adapter, "PyHelloFoo");
        assert_eq!(symbols.typeid_map, "PyHelloFoo__typeid_map");
        assert_eq!(symbols.method_table, "Foo_methods");
    }

    #[test]
    fn scoped_names_are_mangled() {
        let symbols = ClassSymbols::new("ns::Widget", &GeneratorSettings::default());
        assert_eq!(symbols.adapter, "Pyns__Widget");
        assert_eq!(symbols.method("get"), "_wrap_Pyns__Widget_get");
        assert_eq!(symbols.getter("x"), "_wrap_Pyns__Widget__get_x");
    }
}
