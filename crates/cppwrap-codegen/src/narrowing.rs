//! Narrowing table emission.
//!
//! The root of a narrowing chain declares a map from native type identity to
//! type object in the module header and fills it during module init. Pointer
//! return conversions look the pointee's dynamic identity up in it.

use cppwrap_core::GenerationError;
use cppwrap_registry::{ClassRegistry, NarrowingTable};

use crate::ModuleBuilder;

/// Declare and populate the lookup map of a narrowing root.
pub fn generate_typeid_map(
    registry: &ClassRegistry,
    table: &NarrowingTable,
    module: &mut dyn ModuleBuilder,
) -> Result<(), GenerationError> {
    for include in ["<map>", "<string>", "<typeinfo>"] {
        module.add_include(include);
    }
    module.header().write_code(format!(
        "std::map<std::string, PyTypeObject *> {};",
        table.symbol()
    ));

    for &member in table.members() {
        let class = registry
            .get(member)
            .ok_or_else(|| GenerationError::UnknownClass(member.to_string()))?;
        module.after_init().write_code(format!(
            "{}[typeid({}).name()] = {};",
            table.symbol(),
            class.name(),
            class.symbols().type_ref()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemorySink, ModuleInit};
    use cppwrap_registry::ClassSpec;

    #[test]
    fn every_member_is_mapped() {
        let mut registry = ClassRegistry::new();
        let base = registry
            .register_class(ClassSpec::new("Base").with_narrowing(true))
            .unwrap();
        registry
            .register_class(ClassSpec::new("Derived").with_parent("Base"))
            .unwrap();
        let table = registry.get(base).unwrap().narrowing_table().unwrap();

        let mut module = ModuleInit::new("m");
        generate_typeid_map(&registry, table, &mut module).unwrap();

        assert!(module.includes().iter().any(|i| i == "<typeinfo>"));

        let mut header = MemorySink::new();
        module.write_header(&mut header);
        assert!(header
            .as_str()
            .contains("std::map<std::string, PyTypeObject *> PyBase__typeid_map;"));

        let mut init = MemorySink::new();
        module.write_init(&mut init);
        let init = init.into_string();
        assert!(init.contains("PyBase__typeid_map[typeid(Base).name()] = &PyBase_Type;"));
        assert!(init.contains("PyBase__typeid_map[typeid(Derived).name()] = &PyDerived_Type;"));
    }
}
