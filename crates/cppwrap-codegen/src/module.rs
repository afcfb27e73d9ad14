//! Module assembly.
//!
//! Class generation contributes three kinds of module-level output besides
//! the class bodies themselves: `#include` lines, header declarations (such
//! as narrowing tables) and statements of the module init function. The
//! [`ModuleBuilder`] trait is the seam through which they are collected;
//! [`ModuleInit`] is the default implementation.

use cppwrap_core::c_identifier;

use crate::{CodeBlock, CodeSink};

/// Collects module-level output from class generators.
pub trait ModuleBuilder {
    /// Add an include (with its delimiters, e.g. `<map>` or `"foo.h"`).
    /// Duplicates are ignored.
    fn add_include(&mut self, include: &str);

    /// Declarations emitted after the includes, before any class.
    fn header(&mut self) -> &mut CodeBlock;

    /// Statements run by the module init function, after the module object
    /// `m` exists.
    fn after_init(&mut self) -> &mut CodeBlock;
}

/// Default module builder producing a `init<name>` function.
#[derive(Debug, Clone)]
pub struct ModuleInit {
    name: String,
    includes: Vec<String>,
    header: CodeBlock,
    after_init: CodeBlock,
}

impl ModuleInit {
    /// Failure statement of checked init statements.
    pub const INIT_FAILURE: &'static str = "return;";

    /// Create a builder for module `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let mut header = CodeBlock::new();
        header.write_code("#ifndef CPPWRAP_UNUSED");
        header.write_code("# define CPPWRAP_UNUSED(param) param");
        header.write_code("#endif");
        Self {
            name: name.into(),
            includes: vec!["<Python.h>".to_string()],
            header,
            after_init: CodeBlock::new(),
        }
    }

    /// Module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Includes in insertion order.
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Append `if (expr) { return; }` to the init sequence.
    pub fn write_error_check(&mut self, expr: impl AsRef<str>) {
        self.after_init.write_error_check(expr, Self::INIT_FAILURE);
    }

    /// Write the `#include` lines.
    pub fn write_includes(&self, sink: &mut dyn CodeSink) {
        for include in &self.includes {
            sink.writeln(&format!("#include {include}"));
        }
        sink.writeln("");
    }

    /// Write the header declarations.
    pub fn write_header(&self, sink: &mut dyn CodeSink) {
        self.header.flush_to(sink);
        sink.writeln("");
    }

    /// Write the module function table and the init function.
    pub fn write_init(&self, sink: &mut dyn CodeSink) {
        let functions = format!("{}_functions", c_identifier(&self.name));

        sink.writeln(&format!("static PyMethodDef {functions}[] = {{"));
        sink.indent();
        sink.writeln("{NULL, NULL, 0, NULL}");
        sink.unindent();
        sink.writeln("};");
        sink.writeln("");

        sink.writeln("PyMODINIT_FUNC");
        sink.writeln(&format!("init{}(void)", self.name));
        sink.writeln("{");
        sink.indent();
        sink.writeln("PyObject *m;");
        sink.writeln(&format!(
            "m = Py_InitModule3((char *) \"{}\", {functions}, NULL);",
            self.name
        ));
        let mut check = CodeBlock::new();
        check.write_error_check("m == NULL", Self::INIT_FAILURE);
        check.flush_to(sink);
        self.after_init.flush_to(sink);
        sink.unindent();
        sink.writeln("}");
    }
}

impl ModuleBuilder for ModuleInit {
    fn add_include(&mut self, include: &str) {
        if !self.includes.iter().any(|i| i == include) {
            self.includes.push(include.to_string());
        }
    }

    fn header(&mut self) -> &mut CodeBlock {
        &mut self.header
    }

    fn after_init(&mut self) -> &mut CodeBlock {
        &mut self.after_init
    }
}
