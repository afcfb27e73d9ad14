//! Line-oriented output sinks.
//!
//! Every emitter writes through [`CodeSink`], which owns indentation. Emitters
//! never embed leading whitespace for nesting; they call
//! [`indent`](CodeSink::indent) / [`unindent`](CodeSink::unindent) instead.

/// Destination for generated code.
pub trait CodeSink {
    /// Write one line at the current indentation. An empty line is written
    /// without trailing whitespace.
    fn writeln(&mut self, line: &str);

    /// Increase indentation by one level.
    fn indent(&mut self);

    /// Decrease indentation by one level.
    fn unindent(&mut self);

    /// Write a multi-line block, each line at the current indentation.
    fn write_block(&mut self, text: &str) {
        for line in text.lines() {
            self.writeln(line);
        }
    }
}

/// A [`CodeSink`] collecting output in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    output: String,
    level: usize,
}

impl MemorySink {
    /// Indentation unit.
    const INDENT: &'static str = "    ";

    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The collected output.
    pub fn as_str(&self) -> &str {
        &self.output
    }

    /// Consume the sink, returning the collected output.
    pub fn into_string(self) -> String {
        self.output
    }
}

impl CodeSink for MemorySink {
    fn writeln(&mut self, line: &str) {
        if !line.is_empty() {
            for _ in 0..self.level {
                self.output.push_str(Self::INDENT);
            }
            self.output.push_str(line);
        }
        self.output.push('\n');
    }

    fn indent(&mut self) {
        self.level += 1;
    }

    fn unindent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }
}
