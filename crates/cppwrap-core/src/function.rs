//! Method and constructor descriptions.

use crate::{ClassId, Parameter, RegistrationError, ReturnValue};

/// Whether a wrapper describes a method or a constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapperKind {
    Method,
    Constructor,
}

impl WrapperKind {
    /// Human-readable name used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            WrapperKind::Method => "method",
            WrapperKind::Constructor => "constructor",
        }
    }
}

/// One native callable to be wrapped: a method or a constructor signature.
///
/// # Example
///
/// ```
/// use cppwrap_core::{FunctionWrapper, Parameter, ReturnValue};
///
/// let get = FunctionWrapper::method("get_data", ReturnValue::basic("std::string"), vec![]);
/// let ctor = FunctionWrapper::constructor(vec![Parameter::basic("int", "size")]);
/// assert!(!ctor.is_default_constructor());
/// assert_eq!(get.method_name, "get_data");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionWrapper {
    /// Method or constructor.
    pub kind: WrapperKind,
    /// Native member name (empty for constructors).
    pub method_name: String,
    /// Parameters in declaration order.
    pub parameters: Vec<Parameter>,
    /// Return value (`void` for constructors).
    pub return_value: ReturnValue,
    /// Documentation exposed in the method table.
    pub docstring: Option<String>,
    /// Owning class, set when the wrapper is added to a class.
    pub owner: Option<ClassId>,
}

impl FunctionWrapper {
    /// Describe a method.
    pub fn method(
        name: impl Into<String>,
        return_value: ReturnValue,
        parameters: Vec<Parameter>,
    ) -> Self {
        Self {
            kind: WrapperKind::Method,
            method_name: name.into(),
            parameters,
            return_value,
            docstring: None,
            owner: None,
        }
    }

    /// Describe a constructor.
    pub fn constructor(parameters: Vec<Parameter>) -> Self {
        Self {
            kind: WrapperKind::Constructor,
            method_name: String::new(),
            parameters,
            return_value: ReturnValue::void(),
            docstring: None,
            owner: None,
        }
    }

    /// Attach documentation.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.docstring = Some(doc.into());
        self
    }

    /// A constructor taking no arguments.
    pub fn is_default_constructor(&self) -> bool {
        self.kind == WrapperKind::Constructor && self.parameters.is_empty()
    }

    /// Validate every handler of this wrapper.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        for param in &self.parameters {
            param.validate()?;
        }
        self.return_value.validate()
    }
}
