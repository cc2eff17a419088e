//! Runtime execution for Crumb programs: values, scopes and the tree-walking interpreter

pub mod coerce;
pub mod config;
mod environment;
mod function;
mod interpreter;
pub mod module;
pub mod operators;
pub mod output;
mod value;

pub use coerce::coerce;
pub use config::InterpreterConfig;
pub use environment::{Environment, ScopeKind, Variable};
pub use function::FunctionTable;
pub use interpreter::{Interpreter, Signal};
pub use module::{ModuleResolver, ModuleTable, Symbol};
pub use output::OutputSink;
pub use value::{ArrayRef, Dict, DictRef, Value};
