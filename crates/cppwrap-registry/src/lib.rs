//! Class registry for cppwrap.
//!
//! This crate holds the registration-time view of every wrapped class:
//!
//! - [`ClassSpec`]: builder describing a class to register
//! - [`ClassDescriptor`]: resolved per-class metadata, owned by the registry
//! - [`ClassRegistry`]: id- and spelling-keyed storage, handler resolution and
//!   the Rust-side narrowing lookup
//! - [`NarrowingTable`]: the member list owned by each narrowing root

mod descriptor;
mod narrowing;
mod registry;

pub use descriptor::{
    AttributeDescriptor, AttributeScope, ClassDescriptor, ClassSpec, GeneratedClass, OverloadSet,
    Ownership,
};
pub use narrowing::NarrowingTable;
pub use registry::ClassRegistry;
