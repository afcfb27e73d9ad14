//! cppwrap core data model.
//!
//! Shared by the registry and the code generators:
//!
//! - [`error`]: registration and generation errors
//! - [`class_id`]: deterministic class identity
//! - [`settings`]: generator-wide configuration and host type flags
//! - [`symbols`]: generated C symbol names
//! - [`slots`]: the typed slot table and finalized type record
//! - [`handlers`]: parameter / return-value handlers
//! - [`function`]: method and constructor descriptions

pub mod class_id;
pub mod error;
pub mod function;
pub mod handlers;
pub mod settings;
pub mod slots;
pub mod symbols;

pub use class_id::ClassId;
pub use error::{CppWrapError, GenerationError, RegistrationError};
pub use function::{FunctionWrapper, WrapperKind};
pub use handlers::{ClassHandler, Convention, Direction, Parameter, ReturnValue, TypeRef};
pub use settings::{GeneratorSettings, TypeFlags};
pub use slots::{FinalSlots, Slot, TypeSlots, TypeStructure, c_string_literal};
pub use symbols::{ClassSymbols, c_identifier};
