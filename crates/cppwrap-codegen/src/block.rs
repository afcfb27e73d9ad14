//! Deferred code blocks.
//!
//! A [`CodeBlock`] buffers statements (with relative indentation) so that
//! marshalers can contribute to a wrapper's before-call and after-call
//! sections, or to the module init sequence, before the enclosing function is
//! written.

use crate::CodeSink;

/// Buffered statements with relative indentation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    lines: Vec<(usize, String)>,
    level: usize,
}

impl CodeBlock {
    /// Create an empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append code; multi-line text is split into lines at the current level.
    pub fn write_code(&mut self, code: impl AsRef<str>) {
        for line in code.as_ref().lines() {
            self.lines.push((self.level, line.to_string()));
        }
    }

    /// Append `if (condition) { <failure> }`.
    pub fn write_error_check(&mut self, condition: impl AsRef<str>, failure: &str) {
        self.write_code(format!("if ({}) {{", condition.as_ref()));
        self.indent();
        self.write_code(failure);
        self.unindent();
        self.write_code("}");
    }

    /// Increase indentation of subsequent code.
    pub fn indent(&mut self) {
        self.level += 1;
    }

    /// Decrease indentation of subsequent code.
    pub fn unindent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of buffered lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Replay the block into a sink, relative to the sink's indentation.
    pub fn flush_to(&self, sink: &mut dyn CodeSink) {
        for (level, line) in &self.lines {
            for _ in 0..*level {
                sink.indent();
            }
            sink.writeln(line);
            for _ in 0..*level {
                sink.unindent();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySink;

    #[test]
    fn error_check_layout() {
        let mut block = CodeBlock::new();
        block.write_error_check("PyType_Ready(&PyFoo_Type)", "return;");

        let mut sink = MemorySink::new();
        sink.indent();
        block.flush_to(&mut sink);
        assert_eq!(
            sink.as_str(),
            "    if (PyType_Ready(&PyFoo_Type)) {\n        return;\n    }\n"
        );
    }

    #[test]
    fn multi_line_code() {
        let mut block = CodeBlock::new();
        block.write_code("a;\nb;");
        assert_eq!(block.len(), 2);
        assert!(!block.is_empty());
    }
}
