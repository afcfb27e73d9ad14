//! Parameter and return-value handlers.
//!
//! A handler describes how one value crosses the native/host boundary. Basic
//! types (numbers, strings, booleans) are identified by their spelling and
//! converted by the basic-type registry; wrapped classes use a single generic
//! [`ClassHandler`] that names its class by [`ClassId`] and carries the
//! passing [`Convention`].
//!
//! Class handlers are normally obtained from the class registry by native
//! spelling (`"Foo"`, `"Foo&"`, `"Foo*"`), which fills in the convention.

use crate::{ClassId, RegistrationError};

/// How a class value is passed or returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Convention {
    /// `T`
    Value,
    /// `T&`
    Reference,
    /// `T*`
    Pointer,
}

impl Convention {
    /// Suffix appended to the class spelling for this convention.
    pub fn suffix(self) -> &'static str {
        match self {
            Convention::Value => "",
            Convention::Reference => "&",
            Convention::Pointer => "*",
        }
    }

    /// Split a spelling like `Foo*` into its class name and convention.
    pub fn split(spelling: &str) -> (&str, Convention) {
        let trimmed = spelling.trim();
        if let Some(name) = trimmed.strip_suffix('*') {
            (name.trim_end(), Convention::Pointer)
        } else if let Some(name) = trimmed.strip_suffix('&') {
            (name.trim_end(), Convention::Reference)
        } else {
            (trimmed, Convention::Value)
        }
    }
}

/// Data flow direction of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// The callee reads the value.
    #[default]
    In,
    /// The callee writes the value, which is returned to the host.
    Out,
    /// Both.
    InOut,
}

/// Generic handler for a wrapped class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassHandler {
    /// The class being passed.
    pub class: ClassId,
    /// The class's native spelling (without `&` / `*`).
    pub class_name: String,
    /// Passing convention.
    pub convention: Convention,
}

impl ClassHandler {
    /// Create a handler for `class_name` with the given convention.
    pub fn new(class_name: impl Into<String>, convention: Convention) -> Self {
        let class_name = class_name.into();
        Self {
            class: ClassId::from_name(&class_name),
            class_name,
            convention,
        }
    }
}

/// What kind of value a handler converts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// A basic type, converted by the basic-type registry.
    Basic(String),
    /// A wrapped class.
    Class(ClassHandler),
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Native type spelling.
    pub ctype: String,
    /// Parameter name (also the keyword name on the host side).
    pub name: String,
    /// Data flow direction.
    pub direction: Direction,
    /// The caller relinquishes ownership of the pointee to the callee.
    pub transfer_ownership: bool,
    /// Conversion kind.
    pub kind: TypeRef,
}

impl Parameter {
    /// A basic-type parameter.
    pub fn basic(ctype: impl Into<String>, name: impl Into<String>) -> Self {
        let ctype = ctype.into();
        Self {
            kind: TypeRef::Basic(ctype.clone()),
            ctype,
            name: name.into(),
            direction: Direction::In,
            transfer_ownership: false,
        }
    }

    /// A class parameter.
    pub fn class(handler: ClassHandler, name: impl Into<String>) -> Self {
        Self {
            ctype: format!("{}{}", handler.class_name, handler.convention.suffix()),
            name: name.into(),
            direction: Direction::In,
            transfer_ownership: false,
            kind: TypeRef::Class(handler),
        }
    }

    /// Set the direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Mark the parameter as transferring ownership to the callee.
    pub fn transfer_ownership(mut self) -> Self {
        self.transfer_ownership = true;
        self
    }

    /// Class handler, if this is a class parameter.
    pub fn class_handler(&self) -> Option<&ClassHandler> {
        match &self.kind {
            TypeRef::Class(handler) => Some(handler),
            TypeRef::Basic(_) => None,
        }
    }

    /// Check that the direction and ownership flag fit the convention.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        let convention = self.class_handler().map(|h| h.convention);

        if self.direction != Direction::In && convention != Some(Convention::Reference) {
            return Err(self.invalid(format!(
                "direction {:?} is only supported for class references",
                self.direction
            )));
        }
        if self.transfer_ownership && convention != Some(Convention::Pointer) {
            return Err(self.invalid("ownership transfer needs a class pointer".to_string()));
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> RegistrationError {
        RegistrationError::InvalidHandler {
            ctype: self.ctype.clone(),
            reason,
        }
    }
}

/// A function return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnValue {
    /// Native type spelling.
    pub ctype: String,
    /// The callee relinquishes ownership of the returned pointer.
    pub caller_owns: bool,
    /// Conversion kind.
    pub kind: TypeRef,
}

impl ReturnValue {
    /// The `void` return.
    pub fn void() -> Self {
        Self::basic("void")
    }

    /// A basic-type return.
    pub fn basic(ctype: impl Into<String>) -> Self {
        let ctype = ctype.into();
        Self {
            kind: TypeRef::Basic(ctype.clone()),
            ctype,
            caller_owns: false,
        }
    }

    /// A class return.
    pub fn class(handler: ClassHandler) -> Self {
        Self {
            ctype: format!("{}{}", handler.class_name, handler.convention.suffix()),
            caller_owns: false,
            kind: TypeRef::Class(handler),
        }
    }

    /// Mark the returned pointer as owned by the caller.
    pub fn caller_owns(mut self) -> Self {
        self.caller_owns = true;
        self
    }

    /// Whether this is the `void` return.
    pub fn is_void(&self) -> bool {
        matches!(&self.kind, TypeRef::Basic(name) if name == "void")
    }

    /// Class handler, if this returns a class.
    pub fn class_handler(&self) -> Option<&ClassHandler> {
        match &self.kind {
            TypeRef::Class(handler) => Some(handler),
            TypeRef::Basic(_) => None,
        }
    }

    /// Check that the convention and ownership flag are valid for a return.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        let convention = self.class_handler().map(|h| h.convention);

        if convention == Some(Convention::Reference) {
            return Err(RegistrationError::InvalidHandler {
                ctype: self.ctype.clone(),
                reason: "class references cannot be returned".to_string(),
            });
        }
        if self.caller_owns && convention != Some(Convention::Pointer) {
            return Err(RegistrationError::InvalidHandler {
                ctype: self.ctype.clone(),
                reason: "caller-owns needs a class pointer return".to_string(),
            });
        }
        Ok(())
    }
}
