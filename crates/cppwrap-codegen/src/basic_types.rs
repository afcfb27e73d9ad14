//! Basic-type conversions.
//!
//! Numbers, strings and booleans cross the boundary through the host's
//! argument-parse and result-build format codes. A [`BasicConversion`]
//! describes one native spelling; [`BasicTypes`] is the default registry.

use rustc_hash::FxHashMap;

use cppwrap_core::{GenerationError, Parameter, ReturnValue};

use crate::ForwardWrapper;

/// How one basic type is parsed from and built into host values.
///
/// `to_native` and `to_host` are expression templates in which `{}` stands
/// for the variable or value being converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicConversion {
    /// Type of the variable the parser writes into.
    pub storage: &'static str,
    /// Argument-parse format code.
    pub parse_format: &'static str,
    /// Native expression built from the parsed variable.
    pub to_native: &'static str,
    /// Result-build format code.
    pub build_format: &'static str,
    /// Host-buildable expression built from a native value.
    pub to_host: &'static str,
}

impl BasicConversion {
    /// A type the host parses and builds directly with one format code.
    pub const fn direct(storage: &'static str, format: &'static str) -> Self {
        Self {
            storage,
            parse_format: format,
            to_native: "{}",
            build_format: format,
            to_host: "{}",
        }
    }

    /// Apply the `to_native` template.
    pub fn native_expr(&self, variable: &str) -> String {
        self.to_native.replace("{}", variable)
    }

    /// Apply the `to_host` template.
    pub fn host_expr(&self, value: &str) -> String {
        self.to_host.replace("{}", value)
    }
}

/// Source of basic-type conversions.
pub trait BasicTypeRegistry {
    /// Conversion for a native spelling, if one exists.
    fn conversion(&self, ctype: &str) -> Option<&BasicConversion>;

    /// Conversion for a native spelling, or `UnknownBasicType`.
    fn require(&self, ctype: &str) -> Result<&BasicConversion, GenerationError> {
        self.conversion(ctype)
            .ok_or_else(|| GenerationError::UnknownBasicType(ctype.to_string()))
    }
}

/// Default basic-type registry.
///
/// # Example
///
/// ```
/// use cppwrap_codegen::{BasicTypeRegistry, BasicTypes};
///
/// let types = BasicTypes::new();
/// assert_eq!(types.conversion("int").unwrap().parse_format, "i");
/// assert!(types.conversion("Foo").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct BasicTypes {
    conversions: FxHashMap<String, BasicConversion>,
}

impl Default for BasicTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl BasicTypes {
    /// Create the registry with the built-in conversions.
    pub fn new() -> Self {
        let mut types = Self {
            conversions: FxHashMap::default(),
        };
        types.register("int", BasicConversion::direct("int", "i"));
        types.register("unsigned int", BasicConversion::direct("unsigned int", "I"));
        types.register("long", BasicConversion::direct("long", "l"));
        types.register("double", BasicConversion::direct("double", "d"));
        types.register("float", BasicConversion::direct("float", "f"));
        types.register(
            "bool",
            BasicConversion {
                storage: "PyObject *",
                parse_format: "O",
                to_native: "PyObject_IsTrue({})",
                build_format: "N",
                to_host: "PyBool_FromLong({})",
            },
        );
        types.register(
            "std::string",
            BasicConversion {
                storage: "const char *",
                parse_format: "s",
                to_native: "std::string({})",
                build_format: "s",
                to_host: "({}).c_str()",
            },
        );
        types.register("const char*", BasicConversion::direct("const char *", "s"));
        types
    }

    /// Register (or replace) a conversion.
    pub fn register(&mut self, ctype: &str, conversion: BasicConversion) {
        self.conversions.insert(normalize(ctype), conversion);
    }
}

impl BasicTypeRegistry for BasicTypes {
    fn conversion(&self, ctype: &str) -> Option<&BasicConversion> {
        self.conversions.get(&normalize(ctype))
    }
}

/// Collapse whitespace so `const char *` and `const char*` match.
fn normalize(ctype: &str) -> String {
    let mut out = String::with_capacity(ctype.len());
    for word in ctype.split_whitespace() {
        if !out.is_empty() && !word.starts_with('*') && !word.starts_with('&') {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

// ============================================================================
// Marshaling
// ============================================================================

/// Parse a basic `in` parameter and pass it to the call.
pub(crate) fn parameter(
    conversion: &BasicConversion,
    param: &Parameter,
    wrapper: &mut ForwardWrapper,
) {
    let name = wrapper
        .declarations
        .declare_variable(conversion.storage, &param.name);
    wrapper.parse_params.add_parameter(
        conversion.parse_format,
        [format!("&{name}")],
        Some(&param.name),
    );
    wrapper.call_params.push(conversion.native_expr(&name));
}

/// Build a basic return value into the result.
pub(crate) fn return_to_host(
    conversion: &BasicConversion,
    value: &str,
    wrapper: &mut ForwardWrapper,
) {
    wrapper.build_params.add_parameter(
        conversion.build_format,
        [conversion.host_expr(value)],
        true,
    );
}

/// Parse a host value and store it into `destination`.
pub(crate) fn return_from_host(
    conversion: &BasicConversion,
    ret: &ReturnValue,
    destination: &str,
    wrapper: &mut ForwardWrapper,
) {
    let name = wrapper
        .declarations
        .declare_variable(conversion.storage, "tmp_value");
    wrapper
        .parse_params
        .add_parameter(conversion.parse_format, [format!("&{name}")], None);
    let value = conversion.native_expr(&name);
    wrapper.after_call.write_code(if ret.ctype.trim() == "bool" {
        format!("{destination} = {value} ? true : false;")
    } else {
        format!("{destination} = {value};")
    });
}
