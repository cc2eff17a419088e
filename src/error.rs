//! Error types for the Crumb parser and interpreter

use thiserror::Error;

/// Crumb parse and evaluation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Parse errors
    /// Syntax error encountered during parsing
    ///
    /// **Triggered by:** Unexpected characters, missing delimiters, malformed statements
    /// **Example:** `let x = (1 + 2` (missing closing parenthesis)
    #[error("Syntax error at line {line}, column {column}: {message}")]
    SyntaxError {
        /// Line number where error occurred
        line: usize,
        /// Column number where error occurred
        column: usize,
        /// Error description
        message: String,
    },

    /// Input ended while a construct was still open
    #[error("Unexpected end of input: expected {expected}")]
    UnexpectedEof {
        /// What the parser was looking for
        expected: String,
    },

    /// Numeric literal that does not fit its type
    #[error("Invalid number literal: {literal}")]
    InvalidNumber {
        /// Literal text
        literal: String,
    },

    /// Type annotation naming an unknown type
    ///
    /// **Example:** `let x: Integer = 1`
    #[error("Unknown type: {name}")]
    UnknownType {
        /// Annotation text
        name: String,
    },

    // Evaluation errors
    /// Reference to undefined variable
    ///
    /// **Triggered by:** Reading or assigning a name that was never declared in a visible scope
    /// **Prevention:** Declare with `let`, `var` or `const` before use
    #[error("Undefined variable: {name}")]
    UndefinedVariable {
        /// Variable name
        name: String,
    },

    /// Call to a name that is neither a user function nor a builtin
    #[error("Undefined function: {name}")]
    UndefinedFunction {
        /// Function name
        name: String,
    },

    /// Operand or argument of the wrong type
    ///
    /// **Example:** `if 1 && true { }` (`&&` needs two booleans)
    #[error("Type error: expected {expected}, got {got}")]
    TypeError {
        /// Expected type
        expected: String,
        /// Actual type
        got: String,
    },

    /// Value cannot be coerced to a declared type
    ///
    /// **Triggered by:** Declarations, assignments, argument binding and returns
    /// **Example:** `let x: Int = "five"`
    #[error("Type mismatch: cannot convert {got} to {target}")]
    TypeMismatch {
        /// Declared type
        target: String,
        /// Runtime type of the value
        got: String,
    },

    /// Operator applied to unsupported operand types
    #[error("Invalid operation: {op} on types {left_type} and {right_type}")]
    InvalidOperation {
        /// Operator text
        op: String,
        /// Left operand type
        left_type: String,
        /// Right operand type
        right_type: String,
    },

    /// Ordering comparison between incompatible types
    #[error("Cannot compare different types: {left_type} and {right_type}")]
    InvalidComparison {
        /// Left operand type
        left_type: String,
        /// Right operand type
        right_type: String,
    },

    /// Attempt to reassign a constant binding
    #[error("Cannot reassign constant: {name}")]
    ConstantReassignment {
        /// Constant name
        name: String,
    },

    /// Declaration of a name already bound in the same scope
    #[error("Variable '{name}' is already declared in this scope")]
    Redeclaration {
        /// Variable name
        name: String,
    },

    /// Second declaration of a function name
    #[error("Function '{name}' is already defined")]
    FunctionRedefinition {
        /// Function name
        name: String,
    },

    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Modulo by zero
    #[error("Modulo by zero")]
    ModuloByZero,

    /// Integer arithmetic left the `i64` range
    #[error("Integer overflow in {op}")]
    IntegerOverflow {
        /// Operator text
        op: String,
    },

    /// Index outside a string, or an array store outside the array
    ///
    /// **Example:** `"abc"[5]`
    #[error("Index out of bounds: {index} for length {length}")]
    IndexOutOfBounds {
        /// Requested index
        index: i64,
        /// Collection length
        length: usize,
    },

    /// Indexing a value that does not support it
    #[error("Value of type {type_name} cannot be indexed")]
    NotIndexable {
        /// Target type
        type_name: String,
    },

    /// Member or method that the target type does not provide
    #[error("Unsupported member '{member}' on type {type_name}")]
    UnsupportedMember {
        /// Member name
        member: String,
        /// Target type
        type_name: String,
    },

    /// Wrong number of arguments in a call
    #[error("Function '{name}' expects {expected} arguments, got {got}")]
    ArityMismatch {
        /// Function name
        name: String,
        /// Human-readable accepted count (`2` or `1 to 3`)
        expected: String,
        /// Number of arguments supplied
        got: usize,
    },

    /// Function body finished without executing `return`
    #[error("Function '{name}' ended without return")]
    MissingReturn {
        /// Function name
        name: String,
    },

    /// Invalid arguments provided to a builtin
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments {
        /// Builtin name
        tool: String,
        /// Reason for invalidity
        reason: String,
    },

    // Control flow
    /// `break` or `continue` reached the top level
    #[error("'{keyword}' used outside of a loop")]
    ControlFlowOutsideLoop {
        /// `break` or `continue`
        keyword: String,
    },

    /// `return` reached the top level
    #[error("'return' used outside of a function")]
    ReturnOutsideFunction,

    /// Configured call-depth guard tripped
    #[error("Maximum call depth exceeded (limit: {limit})")]
    CallDepthExceeded {
        /// Configured limit
        limit: usize,
    },

    // External collaborators
    /// Module export used as the wrong kind of symbol
    #[error("Module error for '{name}': {message}")]
    ModuleError {
        /// Name being resolved
        name: String,
        /// Resolver message
        message: String,
    },

    // Resource errors
    /// Allocation for a container failed
    #[error("Out of memory while {operation}")]
    OutOfMemory {
        /// Operation that needed memory
        operation: String,
    },
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Aborts the whole compilation unit; nothing is executed
    Fatal,
    /// Aborts the current statement; execution continues with the next one
    Recoverable,
}

impl Error {
    /// Create a syntax error at a source position
    pub fn syntax(line: usize, column: usize, message: impl Into<String>) -> Self {
        Error::SyntaxError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a type error from an expected description and a runtime type name
    pub fn type_error(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Error::TypeError {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Create a builtin argument error
    pub fn invalid_args(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidArguments {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// True for errors produced by the parser
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::SyntaxError { .. }
                | Error::UnexpectedEof { .. }
                | Error::InvalidNumber { .. }
                | Error::UnknownType { .. }
        )
    }

    /// Classify error severity
    pub fn classify(&self) -> ErrorSeverity {
        if self.is_parse_error() {
            ErrorSeverity::Fatal
        } else {
            ErrorSeverity::Recoverable
        }
    }
}

/// Result type for Crumb operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_errors_are_fatal() {
        let err = Error::syntax(3, 7, "expected ')'");
        assert_eq!(err.classify(), ErrorSeverity::Fatal);
        assert_eq!(
            err.to_string(),
            "Syntax error at line 3, column 7: expected ')'"
        );
    }

    #[test]
    fn test_evaluation_errors_are_recoverable() {
        assert_eq!(Error::DivisionByZero.classify(), ErrorSeverity::Recoverable);
        let err = Error::MissingReturn {
            name: "f".to_string(),
        };
        assert_eq!(err.classify(), ErrorSeverity::Recoverable);
        assert_eq!(err.to_string(), "Function 'f' ended without return");
    }
}
