//! Unified error types for cppwrap.
//!
//! Errors are split by the phase that raises them:
//!
//! ```text
//! CppWrapError (top-level wrapper)
//! ├── RegistrationError - class description / generator API misuse
//! └── GenerationError   - ordering or lookup failures while emitting code
//! ```
//!
//! Both kinds are fatal for the generation run: callers are expected to
//! propagate them with `?` and abort. Conditions that only deserve attention
//! (e.g. an unsafe ownership pattern) are reported through `tracing` instead.

use thiserror::Error;

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while a class description is being registered.
///
/// These indicate misuse of the generator API, never a property of the
/// wrapped C++ code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A referenced class was not registered.
    #[error("class not found: {0}")]
    TypeNotFound(String),

    /// A class with this native spelling already exists.
    #[error("duplicate class: {0}")]
    DuplicateType(String),

    /// Only one of the ref-count hooks was given.
    #[error("class '{class}': incref and decref hooks must be given together (got {given} only)")]
    UnpairedRefCountHooks {
        /// The class name.
        class: String,
        /// Which hook was given.
        given: &'static str,
    },

    /// More than one parent class was given.
    #[error("class '{class}': multiple inheritance is not supported ({} parents)", parents.len())]
    MultipleInheritance {
        /// The class name.
        class: String,
        /// The requested parents.
        parents: Vec<String>,
    },

    /// Type narrowing was requested on a class with several parents.
    #[error("class '{class}': type narrowing across multiple parents is not supported")]
    MultiParentNarrowing {
        /// The class name.
        class: String,
    },

    /// A wrapper of the wrong kind was handed to a registration call.
    #[error("class '{class}': expected a {expected} wrapper, got a {found} wrapper")]
    WrongWrapperKind {
        /// The class name.
        class: String,
        /// The kind the call accepts.
        expected: &'static str,
        /// The kind that was passed.
        found: &'static str,
    },

    /// A parameter or return handler is used with an unsupported combination
    /// of convention, direction or ownership flag.
    #[error("invalid handler for '{ctype}': {reason}")]
    InvalidHandler {
        /// Native type spelling of the handler.
        ctype: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An attribute was declared with a `void` value type.
    #[error("class '{class}': attribute '{attribute}' cannot have type void")]
    VoidAttribute {
        /// The class name.
        class: String,
        /// The attribute name.
        attribute: String,
    },

    /// An attribute with this name was already declared.
    #[error("class '{class}': attribute '{attribute}' declared twice")]
    DuplicateAttribute {
        /// The class name.
        class: String,
        /// The attribute name.
        attribute: String,
    },
}

// ============================================================================
// Generation Errors
// ============================================================================

/// Errors raised while emitting code for a registered class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// A class was generated before its parent.
    #[error("class '{class}' generated before its parent '{parent}'")]
    ParentNotGenerated {
        /// The class being generated.
        class: String,
        /// Its parent.
        parent: String,
    },

    /// `generate` was called twice for the same class.
    #[error("class '{0}' was already generated")]
    AlreadyGenerated(String),

    /// A class id does not resolve in the registry.
    #[error("unknown class id {0}")]
    UnknownClass(String),

    /// No converter exists for a basic type spelling.
    #[error("no conversion registered for type '{0}'")]
    UnknownBasicType(String),

    /// A handler cannot be converted in the requested direction.
    #[error("unsupported conversion for '{ctype}': {reason}")]
    UnsupportedConversion {
        /// Native type spelling.
        ctype: String,
        /// Why the conversion is unsupported.
        reason: String,
    },
}

// ============================================================================
// Unified Error
// ============================================================================

/// Top-level error for a whole generation run.
///
/// # Example
///
/// ```
/// use cppwrap_core::{CppWrapError, RegistrationError};
///
/// let err: CppWrapError = RegistrationError::TypeNotFound("Base".into()).into();
/// assert!(err.is_registration());
/// assert_eq!(err.to_string(), "class not found: Base");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CppWrapError {
    /// A registration error.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// A generation error.
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl CppWrapError {
    /// Check if this is a registration error.
    pub fn is_registration(&self) -> bool {
        matches!(self, CppWrapError::Registration(_))
    }

    /// Check if this is a generation error.
    pub fn is_generation(&self) -> bool {
        matches!(self, CppWrapError::Generation(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
