//! Interpreter configuration

/// Environment variable enabling the statement trace
pub const TRACE_ENV: &str = "CRUMB_TRACE";

/// Environment variable setting the call-depth guard
pub const MAX_CALL_DEPTH_ENV: &str = "CRUMB_MAX_CALL_DEPTH";

/// Interpreter settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Write a `trace: <statement kind>` line to the diagnostic stream before each statement
    pub trace: bool,
    /// Nested user-function calls allowed before `CallDepthExceeded`; `None` means unbounded
    pub max_call_depth: Option<usize>,
}

impl InterpreterConfig {
    /// Reads `CRUMB_TRACE` (`1` or `true`) and `CRUMB_MAX_CALL_DEPTH` (positive integer)
    pub fn from_env() -> Self {
        let trace = std::env::var(TRACE_ENV)
            .map(|v| matches!(v.trim(), "1" | "true"))
            .unwrap_or(false);
        let max_call_depth = std::env::var(MAX_CALL_DEPTH_ENV)
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&n| n > 0);

        InterpreterConfig {
            trace,
            max_call_depth,
        }
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_max_call_depth(mut self, limit: usize) -> Self {
        self.max_call_depth = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = InterpreterConfig::default()
            .with_trace(true)
            .with_max_call_depth(64);
        assert!(config.trace);
        assert_eq!(config.max_call_depth, Some(64));
        assert_eq!(InterpreterConfig::default().max_call_depth, None);
    }
}
