//! # Crumb - A Small Scripting Language
//!
//! Crumb is a dynamically typed scripting language with optional type
//! annotations, reference-counted collections and a tree-walking interpreter.
//!
//! ## Quick Start
//!
//! ```rust
//! use crumb::Interpreter;
//!
//! let mut interp = Interpreter::buffered();
//! let errors = interp
//!     .run_source("let a: Int = 2\nlet b: Int = 3\nprint(a + b * 2)")
//!     .expect("program parses");
//!
//! assert!(errors.is_empty());
//! assert_eq!(interp.take_output(), "8\n");
//! ```
//!
//! ## Language Overview
//!
//! ### Data Types
//!
//! - **Primitives**: `Int`, `Float`, `Double`, `Bool`, `nil`
//! - **Strings**: `"hello\n"`, indexed by character, negative indices count from the end
//! - **Arrays**: `[1, 2, 3]`, typed as `[Int]`
//! - **Dictionaries**: `["name": "crumb", "age": 1]`, typed as `[String: Int]`; `[:]` is empty
//! - **Optionals**: any type followed by `?`, e.g. `Int?`
//!
//! ### Statements
//!
//! - `let x: Int = 1`, `var y = 2`, `const z = 3` - declarations
//! - `x = 4`, `xs[0] = 5`, `d.key = 6` - assignments
//! - `if cond { } else if other { } else { }`
//! - `while cond { }`, `for x in 0..<n { }`, `for k in dict { }`
//! - `func add(a: Int, b: Int = 1) -> Int { return a + b }`
//! - `print(expr)`
//!
//! ### Errors
//!
//! Parse errors stop the whole program before anything runs. Evaluation errors
//! abort only the statement that raised them:
//!
//! ```rust
//! use crumb::{Error, Interpreter};
//!
//! let mut interp = Interpreter::buffered();
//! let errors = interp.run_source("print(10 / 0)\nprint(\"still running\")").unwrap();
//!
//! assert_eq!(errors, vec![Error::DivisionByZero]);
//! assert_eq!(interp.take_output(), "still running\n");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Source Code → Parser (Cursor) → AST → Interpreter → Output
//! ```
//!
//! - [`Parser`] - One-pass recursive descent producing a [`Program`]
//! - [`Interpreter`] - Executes the AST against a scope stack
//! - [`Value`] - Runtime value representation
//! - [`Environment`] - Variable storage with scoping
//! - [`ToolRegistry`] - Built-in functions

/// Version of the Crumb interpreter
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod tools;
pub mod types;

// Re-export main types
pub use error::{Error, ErrorSeverity, Result};
pub use parser::{
    parse_expression, parse_program, BinaryOp, Expression, FunctionDecl, Param, Parser, Program,
    Statement, UnaryOp,
};
pub use runtime::{
    Dict, Environment, Interpreter, InterpreterConfig, ModuleResolver, ModuleTable, OutputSink,
    Signal, Symbol, Value,
};
pub use tools::{Tool, ToolRegistry};
pub use types::Type;

/// Type alias for the tree-walking interpreter.
pub type Evaluator = Interpreter;
