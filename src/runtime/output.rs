use std::io::Write;

/// Destination for program output or diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSink {
    /// Process standard output
    Stdout,
    /// Process standard error
    Stderr,
    /// In-memory buffer, drained with [`OutputSink::take`]
    Buffer(String),
}

impl OutputSink {
    /// Creates an empty in-memory sink
    pub fn buffer() -> Self {
        OutputSink::Buffer(String::new())
    }

    /// Writes `line` followed by a newline
    pub fn write_line(&mut self, line: &str) {
        match self {
            // a closed pipe must not abort the program being run
            OutputSink::Stdout => {
                let _ = writeln!(std::io::stdout().lock(), "{}", line);
            }
            OutputSink::Stderr => {
                let _ = writeln!(std::io::stderr().lock(), "{}", line);
            }
            OutputSink::Buffer(buf) => {
                buf.push_str(line);
                buf.push('\n');
            }
        }
    }

    /// Drains buffered text; process streams return an empty string
    pub fn take(&mut self) -> String {
        match self {
            OutputSink::Buffer(buf) => std::mem::take(buf),
            _ => String::new(),
        }
    }
}
