//! The forward wrapper: a host-callable function under construction.
//!
//! Marshalers never write a wrapper function directly. They contribute pieces
//! to a [`ForwardWrapper`]:
//!
//! ```text
//! declarations     local variables (unique names)
//! parse_params     argument-parse format, targets and keyword names
//! before_call      statements run before the native call
//! call_params      native call arguments
//! after_call       statements run after the native call
//! build_params     result-build format and values
//! ```
//!
//! The emitters (overloads, attribute getters and setters) then lay the
//! pieces out according to the shape of the function they write.

use rustc_hash::FxHashSet;

use crate::{CodeBlock, CodeSink};

// ============================================================================
// Declarations
// ============================================================================

/// Local variable declarations with collision-free names.
#[derive(Debug, Default, Clone)]
pub struct Declarations {
    entries: Vec<String>,
    names: FxHashSet<String>,
}

impl Declarations {
    /// Declare a variable, returning the name actually used.
    ///
    /// A requested name already in use gets a numeric suffix (`foo2`, `foo3`, ...).
    pub fn declare_variable(&mut self, ctype: &str, name: &str) -> String {
        self.declare(ctype, name, None)
    }

    /// Declare an initialized variable.
    pub fn declare_variable_with_init(&mut self, ctype: &str, name: &str, init: &str) -> String {
        self.declare(ctype, name, Some(init))
    }

    fn declare(&mut self, ctype: &str, name: &str, init: Option<&str>) -> String {
        let mut unique = name.to_string();
        let mut counter = 2;
        while self.names.contains(&unique) {
            unique = format!("{name}{counter}");
            counter += 1;
        }
        self.names.insert(unique.clone());

        let declaration = declaration(ctype, &unique);
        self.entries.push(match init {
            Some(init) => format!("{declaration} = {init};"),
            None => format!("{declaration};"),
        });
        unique
    }

    /// Whether nothing was declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write every declaration.
    pub fn write(&self, sink: &mut dyn CodeSink) {
        for entry in &self.entries {
            sink.writeln(entry);
        }
    }
}

/// `Foo *` + `x` becomes `Foo *x`; `int` + `x` becomes `int x`.
fn declaration(ctype: &str, name: &str) -> String {
    let ctype = ctype.trim();
    let base = ctype.trim_end_matches(['*', ' ']);
    let stars = ctype[base.len()..].chars().filter(|&c| c == '*').count();
    format!("{base} {}{name}", "*".repeat(stars))
}

// ============================================================================
// Parse / build parameters
// ============================================================================

/// Argument-parse format and targets.
#[derive(Debug, Default, Clone)]
pub struct ParseParams {
    format: String,
    targets: Vec<String>,
    keywords: Vec<String>,
}

impl ParseParams {
    /// Add one parsed argument. `keyword` names it for keyword passing.
    pub fn add_parameter<I, S>(&mut self, format: &str, targets: I, keyword: Option<&str>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.format.push_str(format);
        self.targets.extend(targets.into_iter().map(Into::into));
        if let Some(keyword) = keyword {
            self.keywords.push(keyword.to_string());
        }
    }

    /// Whether no argument is parsed.
    pub fn is_empty(&self) -> bool {
        self.format.is_empty()
    }

    /// Concatenated format string.
    pub fn format(&self) -> &str {
        &self.format
    }

    #[cfg(test)]
    pub(crate) fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// The `keywords[]` array initializer.
    pub fn keyword_list(&self) -> String {
        let mut items: Vec<String> = self.keywords.iter().map(|k| format!("\"{k}\"")).collect();
        items.push("NULL".to_string());
        format!("{{{}}}", items.join(", "))
    }

    /// `PyArg_ParseTupleAndKeywords(...)` over `args` / `kwargs`.
    pub fn parse_call_with_keywords(&self, args: &str, kwargs: &str) -> String {
        let mut call = format!(
            "PyArg_ParseTupleAndKeywords({args}, {kwargs}, (char *) \"{}\", (char **) keywords",
            self.format
        );
        for target in &self.targets {
            call.push_str(", ");
            call.push_str(target);
        }
        call.push(')');
        call
    }

    /// `PyArg_ParseTuple(...)` over `args`.
    pub fn parse_call(&self, args: &str) -> String {
        let mut call = format!("PyArg_ParseTuple({args}, (char *) \"{}\"", self.format);
        for target in &self.targets {
            call.push_str(", ");
            call.push_str(target);
        }
        call.push(')');
        call
    }
}

/// Result-build format and values.
#[derive(Debug, Default, Clone)]
pub struct BuildParams {
    items: Vec<(String, Vec<String>)>,
}

impl BuildParams {
    /// Add one built value; `prepend` puts it before everything added so far.
    pub fn add_parameter<I, S>(&mut self, format: &str, values: I, prepend: bool)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        let item = (format.to_string(), values);
        if prepend {
            self.items.insert(0, item);
        } else {
            self.items.push(item);
        }
    }

    /// Whether nothing is returned to the host.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Concatenated format string.
    pub fn format(&self) -> String {
        self.items.iter().map(|(f, _)| f.as_str()).collect()
    }

    /// `Py_BuildValue(...)`, or `None` when nothing is built.
    pub fn build_call(&self) -> Option<String> {
        if self.items.is_empty() {
            return None;
        }
        let mut call = format!("Py_BuildValue((char *) \"{}\"", self.format());
        for value in self.items.iter().flat_map(|(_, values)| values) {
            call.push_str(", ");
            call.push_str(value);
        }
        call.push(')');
        Some(call)
    }
}

// ============================================================================
// ForwardWrapper
// ============================================================================

/// Pieces of one host-callable wrapper function.
#[derive(Debug, Default, Clone)]
pub struct ForwardWrapper {
    pub declarations: Declarations,
    pub parse_params: ParseParams,
    pub call_params: Vec<String>,
    pub before_call: CodeBlock,
    pub after_call: CodeBlock,
    pub build_params: BuildParams,
}

impl ForwardWrapper {
    /// Create an empty wrapper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Native call arguments joined with commas.
    pub fn call_arguments(&self) -> String {
        self.call_params.join(", ")
    }

    /// Write the result-build statements into `py_retval`.
    ///
    /// With nothing to build, the host's `None` is returned.
    pub fn write_build_result(&self, sink: &mut dyn CodeSink, py_retval: &str) {
        match self.build_params.build_call() {
            Some(call) => sink.writeln(&format!("{py_retval} = {call};")),
            None => {
                sink.writeln("Py_INCREF(Py_None);");
                sink.writeln(&format!("{py_retval} = Py_None;"));
            }
        }
    }
}
