//! Value marshalers.
//!
//! Every class value crosses the boundary through its adapter struct, which
//! pairs a native pointer (`obj`) with the host object header. Five handler
//! variants cover the conventions:
//!
//! | convention | parameter | return |
//! |---|---|---|
//! | value | [`value::parameter`] | [`value::return_to_host`] |
//! | reference | [`reference::parameter`] | (rejected at registration) |
//! | pointer | [`pointer::parameter`] | [`pointer::return_to_host`] |
//!
//! Basic types are delegated to the [`BasicTypeRegistry`].
//! [`MarshalContext`] routes each handler to its marshaler.

pub mod pointer;
pub mod reference;
pub mod value;

use cppwrap_core::{ClassHandler, Convention, GenerationError, Parameter, ReturnValue, TypeRef};
use cppwrap_registry::{ClassDescriptor, ClassRegistry};

use crate::ForwardWrapper;
use crate::basic_types::{self, BasicTypeRegistry};

/// Everything a marshaler needs to look up: the class registry and the
/// basic-type conversions.
#[derive(Clone, Copy)]
pub struct MarshalContext<'a> {
    registry: &'a ClassRegistry,
    basic_types: &'a dyn BasicTypeRegistry,
}

impl<'a> MarshalContext<'a> {
    /// Create a context.
    pub fn new(registry: &'a ClassRegistry, basic_types: &'a dyn BasicTypeRegistry) -> Self {
        Self {
            registry,
            basic_types,
        }
    }

    /// The class registry.
    pub fn registry(&self) -> &'a ClassRegistry {
        self.registry
    }

    /// Resolve the class a handler names.
    pub fn class(&self, handler: &ClassHandler) -> Result<&'a ClassDescriptor, GenerationError> {
        self.registry
            .get(handler.class)
            .ok_or_else(|| GenerationError::UnknownClass(handler.class_name.clone()))
    }

    /// Convert a host argument into a native call argument.
    pub fn parameter(
        &self,
        param: &Parameter,
        wrapper: &mut ForwardWrapper,
    ) -> Result<(), GenerationError> {
        match &param.kind {
            TypeRef::Basic(ctype) => {
                basic_types::parameter(self.basic_types.require(ctype)?, param, wrapper);
                Ok(())
            }
            TypeRef::Class(handler) => {
                let class = self.class(handler)?;
                match handler.convention {
                    Convention::Value => value::parameter(class, param, wrapper),
                    Convention::Reference => reference::parameter(class, param, wrapper),
                    Convention::Pointer => pointer::parameter(class, param, wrapper),
                }
            }
        }
    }

    /// Convert the native value `value` into a host result.
    ///
    /// `void` contributes nothing.
    pub fn return_to_host(
        &self,
        ret: &ReturnValue,
        value: &str,
        wrapper: &mut ForwardWrapper,
    ) -> Result<(), GenerationError> {
        if ret.is_void() {
            return Ok(());
        }
        match &ret.kind {
            TypeRef::Basic(ctype) => {
                basic_types::return_to_host(self.basic_types.require(ctype)?, value, wrapper);
                Ok(())
            }
            TypeRef::Class(handler) => {
                let class = self.class(handler)?;
                match handler.convention {
                    Convention::Value => {
                        value::return_to_host(class, value, wrapper);
                        Ok(())
                    }
                    Convention::Pointer => {
                        pointer::return_to_host(self, class, ret, value, wrapper)
                    }
                    Convention::Reference => Err(reference_return(ret)),
                }
            }
        }
    }

    /// Convert a host value into the native `destination` (reverse direction).
    pub fn return_from_host(
        &self,
        ret: &ReturnValue,
        destination: &str,
        wrapper: &mut ForwardWrapper,
    ) -> Result<(), GenerationError> {
        if ret.is_void() {
            return Err(GenerationError::UnsupportedConversion {
                ctype: ret.ctype.clone(),
                reason: "void has no host value".to_string(),
            });
        }
        match &ret.kind {
            TypeRef::Basic(ctype) => {
                let conversion = self.basic_types.require(ctype)?;
                basic_types::return_from_host(conversion, ret, destination, wrapper);
                Ok(())
            }
            TypeRef::Class(handler) => {
                let class = self.class(handler)?;
                match handler.convention {
                    Convention::Value => {
                        value::return_from_host(class, destination, wrapper);
                        Ok(())
                    }
                    Convention::Pointer => {
                        pointer::return_from_host(class, ret, destination, wrapper);
                        Ok(())
                    }
                    Convention::Reference => Err(reference_return(ret)),
                }
            }
        }
    }
}

fn reference_return(ret: &ReturnValue) -> GenerationError {
    GenerationError::UnsupportedConversion {
        ctype: ret.ctype.clone(),
        reason: "class references are parameter-only".to_string(),
    }
}

/// Declare the `PyFoo *` variable a class parameter parses into and register
/// the type-checked parse.
pub(crate) fn parse_adapter(
    class: &ClassDescriptor,
    name: &str,
    keyword: Option<&str>,
    wrapper: &mut ForwardWrapper,
) -> String {
    let symbols = class.symbols();
    let variable = wrapper
        .declarations
        .declare_variable(&format!("{} *", symbols.adapter), name);
    let targets = [symbols.type_ref(), format!("&{variable}")];
    wrapper.parse_params.add_parameter("O!", targets, keyword);
    variable
}
