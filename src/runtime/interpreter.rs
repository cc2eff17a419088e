use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::parser::{parse_program, BinaryOp, Expression, FunctionDecl, Program, Statement};
use crate::runtime::coerce::coerce;
use crate::runtime::module::{ModuleResolver, Symbol};
use crate::runtime::operators::{binary_op, unary_op};
use crate::runtime::{Dict, Environment, FunctionTable, InterpreterConfig, OutputSink, Value};
use crate::tools::stdlib::collections::range_bounds;
use crate::tools::ToolRegistry;

/// Control-flow outcome of executing a statement or statement list
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Continue with the next statement
    None,
    /// Leave the innermost loop
    Break,
    /// Start the next iteration of the innermost loop
    Continue,
    /// Leave the current function with a value
    Return(Value),
}

/// Tree-walking interpreter
///
/// Owns every piece of mutable state a program touches: the scope stack, the
/// function table, the builtin registry and the output sinks. Independent
/// interpreters share nothing.
///
/// Evaluation errors abort the statement that raised them. The error is
/// written to the diagnostic sink, kept for [`Interpreter::execute`] to return,
/// and execution resumes with the next statement.
pub struct Interpreter {
    env: Environment,
    functions: FunctionTable,
    tools: ToolRegistry,
    resolver: Option<Box<dyn ModuleResolver>>,
    config: InterpreterConfig,
    out: OutputSink,
    diag: OutputSink,
    call_depth: usize,
    errors: Vec<Error>,
}

impl Interpreter {
    /// Creates an interpreter writing to stdout and stderr
    pub fn new() -> Self {
        Self::with_config(InterpreterConfig::default())
    }

    /// Creates an interpreter with custom settings
    pub fn with_config(config: InterpreterConfig) -> Self {
        Interpreter {
            env: Environment::new(),
            functions: FunctionTable::new(),
            tools: ToolRegistry::new(),
            resolver: None,
            config,
            out: OutputSink::Stdout,
            diag: OutputSink::Stderr,
            call_depth: 0,
            errors: Vec::new(),
        }
    }

    /// Creates an interpreter that collects output and diagnostics in memory
    pub fn buffered() -> Self {
        Self::new().with_output(OutputSink::buffer(), OutputSink::buffer())
    }

    /// Replaces the print and diagnostic sinks
    pub fn with_output(mut self, out: OutputSink, diag: OutputSink) -> Self {
        self.out = out;
        self.diag = diag;
        self
    }

    /// Installs a resolver for names not bound by the program itself
    pub fn with_resolver(mut self, resolver: Box<dyn ModuleResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// Builtin registry, for embedders adding their own tools
    pub fn tools_mut(&mut self) -> &mut ToolRegistry {
        &mut self.tools
    }

    /// Drains buffered print output
    pub fn take_output(&mut self) -> String {
        self.out.take()
    }

    /// Drains buffered diagnostics
    pub fn take_diagnostics(&mut self) -> String {
        self.diag.take()
    }

    /// Parses and executes `source`
    ///
    /// A parse error is reported and returned without executing anything.
    /// Otherwise the evaluation errors reported during the run are returned.
    pub fn run_source(&mut self, source: &str) -> Result<Vec<Error>> {
        match parse_program(source) {
            Ok(program) => Ok(self.execute(&program)),
            Err(e) => {
                self.diag.write_line(&format!("Error: {}", e));
                Err(e)
            }
        }
    }

    /// Executes a program in the global scope
    pub fn execute(&mut self, program: &Program) -> Vec<Error> {
        match self.execute_block(&program.statements) {
            Signal::None => {}
            Signal::Break => self.report(Error::ControlFlowOutsideLoop {
                keyword: "break".to_string(),
            }),
            Signal::Continue => self.report(Error::ControlFlowOutsideLoop {
                keyword: "continue".to_string(),
            }),
            Signal::Return(_) => self.report(Error::ReturnOutsideFunction),
        }
        std::mem::take(&mut self.errors)
    }

    /// Executes statements in the current scope until one produces a signal
    pub fn execute_block(&mut self, statements: &[Statement]) -> Signal {
        for stmt in statements {
            match self.execute_statement(stmt) {
                Ok(Signal::None) => {}
                Ok(signal) => return signal,
                Err(e) => self.report(e),
            }
        }
        Signal::None
    }

    fn report(&mut self, error: Error) {
        warn!(error = %error, "statement aborted");
        self.diag.write_line(&format!("Error: {}", error));
        self.errors.push(error);
    }

    /// Runs `statements` in a fresh block scope
    fn scoped_block(&mut self, statements: &[Statement]) -> Signal {
        self.env.push_scope();
        let signal = self.execute_block(statements);
        self.env.pop_scope();
        signal
    }

    fn execute_statement(&mut self, stmt: &Statement) -> Result<Signal> {
        trace!(kind = stmt.kind_name(), "executing statement");
        if self.config.trace {
            self.diag.write_line(&format!("trace: {}", stmt.kind_name()));
        }

        match stmt {
            Statement::VarDecl {
                name,
                ty,
                init,
                is_const,
            } => {
                let value = self.evaluate(init)?;
                let ty = match ty {
                    Some(ty) => ty.clone(),
                    None => value.inferred_type(),
                };
                self.env.declare(name, ty, value, *is_const)?;
            }

            Statement::Assignment { name, value } => {
                let value = self.evaluate(value)?;
                self.env.assign(name, value)?;
            }

            Statement::IndexAssign {
                target,
                index,
                value,
            } => {
                let target = self.evaluate(target)?;
                let index = self.evaluate(index)?;
                let value = self.evaluate(value)?;
                store_index(&target, &index, value)?;
            }

            Statement::MemberAssign {
                target,
                name,
                value,
            } => {
                let target = self.evaluate(target)?;
                let value = self.evaluate(value)?;
                store_member(&target, name, value)?;
            }

            Statement::Print(expr) => {
                let value = self.evaluate(expr)?;
                self.out.write_line(&value.to_string());
            }

            Statement::Expression(expr) => {
                self.evaluate(expr)?;
            }

            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_true() {
                    return Ok(self.scoped_block(then_branch));
                }
                if let Some(else_branch) = else_branch {
                    return Ok(self.scoped_block(else_branch));
                }
            }

            Statement::While { condition, body } => {
                while self.evaluate(condition)?.is_true() {
                    match self.scoped_block(body) {
                        Signal::Break => break,
                        Signal::Return(value) => return Ok(Signal::Return(value)),
                        Signal::None | Signal::Continue => {}
                    }
                }
            }

            Statement::ForIn {
                variable,
                iterable,
                body,
            } => return self.execute_for(variable, iterable, body),

            Statement::Break => return Ok(Signal::Break),
            Statement::Continue => return Ok(Signal::Continue),

            Statement::FunctionDecl(decl) => {
                self.functions.define(decl)?;
                debug!(function = %decl.name, params = decl.params.len(), "registered function");
            }

            Statement::Return(expr) => return Ok(Signal::Return(self.evaluate(expr)?)),
        }

        Ok(Signal::None)
    }

    /// `for variable in iterable { body }`
    ///
    /// A visible `variable` is reassigned each iteration; otherwise it is bound
    /// in a loop frame that ends with the loop.
    fn execute_for(
        &mut self,
        variable: &str,
        iterable: &Expression,
        body: &[Statement],
    ) -> Result<Signal> {
        let items = self.iterate(iterable)?;
        let reuse = self.env.exists(variable);

        if !reuse {
            self.env.push_scope();
        }
        let result = self.run_loop(variable, reuse, items, body);
        if !reuse {
            self.env.pop_scope();
        }
        result
    }

    fn run_loop(
        &mut self,
        variable: &str,
        reuse: bool,
        items: Box<dyn Iterator<Item = Value>>,
        body: &[Statement],
    ) -> Result<Signal> {
        for item in items {
            if reuse {
                self.env.assign(variable, item)?;
            } else {
                self.env.rebind(variable, item);
            }
            match self.scoped_block(body) {
                Signal::Break => break,
                Signal::Return(value) => return Ok(Signal::Return(value)),
                Signal::None | Signal::Continue => {}
            }
        }
        Ok(Signal::None)
    }

    /// Values a for-in loop visits. Ranges and `range(...)` are produced lazily;
    /// arrays are iterated over a snapshot taken before the first iteration.
    fn iterate(&mut self, iterable: &Expression) -> Result<Box<dyn Iterator<Item = Value>>> {
        match iterable {
            Expression::Range {
                start,
                end,
                inclusive,
            } => {
                let (start, end) = self.range_operands(start, end)?;
                let items: Box<dyn Iterator<Item = Value>> = if *inclusive {
                    Box::new((start..=end).map(Value::Int))
                } else {
                    Box::new((start..end).map(Value::Int))
                };
                return Ok(items);
            }
            Expression::Call { name, args }
                if name == "range" && !self.functions.contains(name) =>
            {
                let args = self.evaluate_args(args)?;
                let (start, end) = range_bounds(&args)?;
                return Ok(Box::new((start..end).map(Value::Int)));
            }
            _ => {}
        }

        match self.evaluate(iterable)? {
            Value::Array(items) => {
                let snapshot = items.borrow().clone();
                Ok(Box::new(snapshot.into_iter()))
            }
            Value::Dict(dict) => {
                let keys = dict.borrow().keys();
                Ok(Box::new(keys.into_iter().map(Value::String)))
            }
            other => Err(Error::type_error("array, dict or range", other.type_name())),
        }
    }

    fn range_operands(&mut self, start: &Expression, end: &Expression) -> Result<(i64, i64)> {
        let start = self.evaluate(start)?;
        let end = self.evaluate(end)?;
        Ok((start.as_int()?, end.as_int()?))
    }

    /// Evaluates an expression to a value
    pub fn evaluate(&mut self, expr: &Expression) -> Result<Value> {
        match expr {
            Expression::NilLiteral => Ok(Value::Nil),
            Expression::BoolLiteral(b) => Ok(Value::Bool(*b)),
            Expression::IntLiteral(n) => Ok(Value::Int(*n)),
            Expression::DoubleLiteral(d) => Ok(Value::Double(*d)),
            Expression::StringLiteral(s) => Ok(Value::string(s)),

            Expression::Variable(name) => self.lookup_variable(name),

            Expression::Binary { op, left, right } => {
                let left = self.evaluate(left)?;
                let decided = matches!(
                    (op, &left),
                    (BinaryOp::And, Value::Bool(false)) | (BinaryOp::Or, Value::Bool(true))
                );
                if decided {
                    return Ok(left);
                }
                let right = self.evaluate(right)?;
                binary_op(*op, &left, &right)
            }

            Expression::Unary { op, operand } => {
                let operand = self.evaluate(operand)?;
                unary_op(*op, &operand)
            }

            Expression::Call { name, args } => self.call(name, args),

            Expression::ArrayLiteral(elements) => {
                let mut items = Vec::new();
                items
                    .try_reserve(elements.len())
                    .map_err(|_| Error::OutOfMemory {
                        operation: "building an array literal".to_string(),
                    })?;
                for element in elements {
                    items.push(self.evaluate(element)?);
                }
                Ok(Value::array(items))
            }

            Expression::DictLiteral(pairs) => {
                let mut dict = Dict::new();
                for (key, value) in pairs {
                    let key = match self.evaluate(key)? {
                        Value::String(s) => s,
                        other => return Err(Error::type_error("string key", other.type_name())),
                    };
                    let value = self.evaluate(value)?;
                    dict.set(key, value)?;
                }
                Ok(Value::dict(dict))
            }

            Expression::Range {
                start,
                end,
                inclusive,
            } => {
                let (start, end) = self.range_operands(start, end)?;
                materialize_range(start, end, *inclusive)
            }

            Expression::Index { .. } | Expression::Member { .. } | Expression::MethodCall { .. } => {
                Ok(self.eval_chain(expr)?.unwrap_or(Value::Nil))
            }
        }
    }

    /// Evaluates a postfix chain; `None` means a `?.` link short-circuited
    fn eval_chain(&mut self, expr: &Expression) -> Result<Option<Value>> {
        match expr {
            Expression::Index { target, index } => {
                let Some(target) = self.eval_chain(target)? else {
                    return Ok(None);
                };
                let index = self.evaluate(index)?;
                index_value(&target, &index).map(Some)
            }
            Expression::Member {
                target,
                name,
                optional,
            } => {
                let Some(target) = self.chain_target(target, *optional)? else {
                    return Ok(None);
                };
                member_value(&target, name).map(Some)
            }
            Expression::MethodCall {
                target,
                name,
                args,
                optional,
            } => {
                let Some(target) = self.chain_target(target, *optional)? else {
                    return Ok(None);
                };
                let args = self.evaluate_args(args)?;
                call_method(&target, name, &args).map(Some)
            }
            other => self.evaluate(other).map(Some),
        }
    }

    /// Target of a member link. Through `?.` an absent target stops the chain
    /// and a present optional is unwrapped.
    fn chain_target(&mut self, target: &Expression, optional: bool) -> Result<Option<Value>> {
        let Some(value) = self.eval_chain(target)? else {
            return Ok(None);
        };
        if !optional {
            return Ok(Some(value));
        }
        if value.is_absent() {
            return Ok(None);
        }
        Ok(Some(value.unwrap_optional()))
    }

    fn evaluate_args(&mut self, args: &[Expression]) -> Result<Vec<Value>> {
        args.iter().map(|arg| self.evaluate(arg)).collect()
    }

    fn lookup_variable(&self, name: &str) -> Result<Value> {
        if let Some(var) = self.env.get(name) {
            return Ok(var.value.clone());
        }
        match self.resolve_symbol(name)? {
            Some(Symbol::Value(value)) => Ok(value),
            Some(Symbol::Function(_)) => Err(Error::ModuleError {
                name: name.to_string(),
                message: "exported function used as a value".to_string(),
            }),
            None => Err(Error::UndefinedVariable {
                name: name.to_string(),
            }),
        }
    }

    fn resolve_symbol(&self, name: &str) -> Result<Option<Symbol>> {
        match &self.resolver {
            Some(resolver) => resolver.resolve(name),
            None => Ok(None),
        }
    }

    /// User functions shadow builtins; module exports come last
    fn call(&mut self, name: &str, args: &[Expression]) -> Result<Value> {
        if let Some(decl) = self.functions.get(name) {
            return self.call_function(&decl, args);
        }
        if self.tools.has(name) {
            let args = self.evaluate_args(args)?;
            return self.tools.call(name, &args);
        }
        match self.resolve_symbol(name)? {
            Some(Symbol::Function(decl)) => self.call_function(&decl, args),
            Some(Symbol::Value(_)) => Err(Error::ModuleError {
                name: name.to_string(),
                message: "exported value is not callable".to_string(),
            }),
            None => Err(Error::UndefinedFunction {
                name: name.to_string(),
            }),
        }
    }

    fn call_function(&mut self, decl: &Rc<FunctionDecl>, args: &[Expression]) -> Result<Value> {
        if args.len() < decl.required_params() || args.len() > decl.params.len() {
            return Err(Error::ArityMismatch {
                name: decl.name.clone(),
                expected: decl.expected_arity(),
                got: args.len(),
            });
        }
        if let Some(limit) = self.config.max_call_depth {
            if self.call_depth >= limit {
                return Err(Error::CallDepthExceeded { limit });
            }
        }

        let args = self.evaluate_args(args)?;
        debug!(function = %decl.name, args = args.len(), depth = self.call_depth, "calling function");

        self.env.push_function_scope();
        self.call_depth += 1;
        let result = self.run_function(decl, args);
        self.call_depth -= 1;
        self.env.pop_scope();
        result
    }

    fn run_function(&mut self, decl: &FunctionDecl, args: Vec<Value>) -> Result<Value> {
        let supplied = args.len();
        let mut args = args.into_iter();
        for param in &decl.params {
            let value = match (args.next(), &param.default) {
                (Some(value), _) => value,
                (None, Some(default)) => self.evaluate(default)?,
                (None, None) => {
                    return Err(Error::ArityMismatch {
                        name: decl.name.clone(),
                        expected: decl.expected_arity(),
                        got: supplied,
                    })
                }
            };
            self.env.declare(&param.name, param.ty.clone(), value, true)?;
        }

        match self.execute_block(&decl.body) {
            Signal::Return(value) => coerce(&decl.return_type, value),
            Signal::None => Err(Error::MissingReturn {
                name: decl.name.clone(),
            }),
            Signal::Break => Err(Error::ControlFlowOutsideLoop {
                keyword: "break".to_string(),
            }),
            Signal::Continue => Err(Error::ControlFlowOutsideLoop {
                keyword: "continue".to_string(),
            }),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a possibly negative index onto `0..len`
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let idx = if index < 0 { index + len } else { index };
    if (0..len).contains(&idx) {
        usize::try_from(idx).ok()
    } else {
        None
    }
}

fn materialize_range(start: i64, end: i64, inclusive: bool) -> Result<Value> {
    let span = i128::from(end) - i128::from(start) + i128::from(inclusive);
    let len = usize::try_from(span.max(0)).unwrap_or(usize::MAX);

    let mut items = Vec::new();
    items.try_reserve(len).map_err(|_| Error::OutOfMemory {
        operation: format!("materializing range {}..{}", start, end),
    })?;
    if inclusive {
        items.extend((start..=end).map(Value::Int));
    } else {
        items.extend((start..end).map(Value::Int));
    }
    Ok(Value::array(items))
}

/// Arrays yield `Nil` out of range; strings raise `IndexOutOfBounds`
fn index_value(target: &Value, index: &Value) -> Result<Value> {
    match (target, index) {
        (Value::Array(items), Value::Int(i)) => {
            let items = items.borrow();
            Ok(resolve_index(*i, items.len())
                .and_then(|idx| items.get(idx).cloned())
                .unwrap_or(Value::Nil))
        }
        (Value::String(s), Value::Int(i)) => {
            let length = s.chars().count();
            resolve_index(*i, length)
                .and_then(|idx| s.chars().nth(idx))
                .map(|c| Value::string(c.encode_utf8(&mut [0; 4])))
                .ok_or(Error::IndexOutOfBounds { index: *i, length })
        }
        (Value::Dict(dict), Value::String(key)) => {
            Ok(dict.borrow().get(key).cloned().unwrap_or(Value::Nil))
        }
        (Value::Optional(inner), _) => match inner.as_ref() {
            Some(value) => index_value(value, index),
            None => Ok(Value::Nil),
        },
        (Value::Array(_) | Value::String(_), other) => {
            Err(Error::type_error("int index", other.type_name()))
        }
        (Value::Dict(_), other) => Err(Error::type_error("string key", other.type_name())),
        _ => Err(Error::NotIndexable {
            type_name: target.type_name().to_string(),
        }),
    }
}

fn store_index(target: &Value, index: &Value, value: Value) -> Result<()> {
    match (target, index) {
        (Value::Array(items), Value::Int(i)) => {
            let mut items = items.borrow_mut();
            let length = items.len();
            let idx = resolve_index(*i, length)
                .ok_or(Error::IndexOutOfBounds { index: *i, length })?;
            items[idx] = value;
            Ok(())
        }
        (Value::Dict(dict), Value::String(key)) => dict.borrow_mut().set(key.clone(), value),
        (Value::Optional(inner), _) => match inner.as_ref() {
            Some(inner) => store_index(inner, index, value),
            None => Err(Error::NotIndexable {
                type_name: "nil".to_string(),
            }),
        },
        (Value::Array(_), other) => Err(Error::type_error("int index", other.type_name())),
        (Value::Dict(_), other) => Err(Error::type_error("string key", other.type_name())),
        _ => Err(Error::NotIndexable {
            type_name: target.type_name().to_string(),
        }),
    }
}

/// `length` first, then dictionary key lookup
fn member_value(target: &Value, name: &str) -> Result<Value> {
    if name == "length" {
        if let Some(len) = target.len() {
            return Ok(Value::Int(len as i64));
        }
    }
    match target {
        Value::Dict(dict) => Ok(dict.borrow().get(name).cloned().unwrap_or(Value::Nil)),
        _ => Err(Error::UnsupportedMember {
            member: name.to_string(),
            type_name: target.type_name().to_string(),
        }),
    }
}

fn store_member(target: &Value, name: &str, value: Value) -> Result<()> {
    match target {
        Value::Dict(dict) => dict.borrow_mut().set(Rc::from(name), value),
        _ => Err(Error::UnsupportedMember {
            member: name.to_string(),
            type_name: target.type_name().to_string(),
        }),
    }
}

fn call_method(target: &Value, name: &str, args: &[Value]) -> Result<Value> {
    let expect_args = |expected: usize| -> Result<()> {
        if args.len() == expected {
            Ok(())
        } else {
            Err(Error::ArityMismatch {
                name: name.to_string(),
                expected: expected.to_string(),
                got: args.len(),
            })
        }
    };

    match name {
        "append" => {
            expect_args(1)?;
            target.append(args[0].clone())?;
            Ok(Value::Nil)
        }
        "toString" => {
            expect_args(0)?;
            Ok(Value::string(&target.to_string()))
        }
        _ => Err(Error::UnsupportedMember {
            member: name.to_string(),
            type_name: target.type_name().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ModuleTable;
    use crate::types::Type;

    fn run(source: &str) -> (String, Vec<Error>) {
        let mut interp = Interpreter::buffered();
        let errors = interp.run_source(source).unwrap();
        (interp.take_output(), errors)
    }

    #[test]
    fn test_print_and_arithmetic() {
        let (out, errors) = run("let a: Int = 2\nlet b: Int = 3\nprint(a + b * 2)");
        assert_eq!(out, "8\n");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_error_aborts_only_the_statement() {
        let mut interp = Interpreter::buffered();
        let errors = interp
            .run_source("print(1)\nprint(1 / 0)\nprint(2)")
            .unwrap();
        assert_eq!(interp.take_output(), "1\n2\n");
        assert_eq!(errors, vec![Error::DivisionByZero]);
        assert_eq!(interp.take_diagnostics(), "Error: Division by zero\n");
    }

    #[test]
    fn test_parse_error_executes_nothing() {
        let mut interp = Interpreter::buffered();
        let err = interp.run_source("print(1)\nlet = 3").unwrap_err();
        assert!(err.is_parse_error());
        assert_eq!(interp.take_output(), "");
        assert!(interp.take_diagnostics().starts_with("Error: "));
    }

    #[test]
    fn test_top_level_control_flow_is_reported() {
        let (out, errors) = run("print(1)\nbreak\nprint(2)");
        assert_eq!(out, "1\n");
        assert!(matches!(errors[..], [Error::ControlFlowOutsideLoop { .. }]));

        let (_, errors) = run("return 3");
        assert_eq!(errors, vec![Error::ReturnOutsideFunction]);
    }

    #[test]
    fn test_while_with_break_and_continue() {
        let source = r#"
            var i = 0
            var total = 0
            while true {
                i = i + 1
                if i > 10 { break }
                if i % 2 == 0 { continue }
                total = total + i
            }
            print(total)
        "#;
        assert_eq!(run(source).0, "25\n");
    }

    #[test]
    fn test_for_over_ranges_arrays_and_dicts() {
        let (out, errors) = run(
            "for i in 1..3 { print(i) }\nfor i in 0..<2 { print(i) }\nfor k in [\"x\": 1, \"y\": 2] { print(k) }",
        );
        assert!(errors.is_empty());
        assert_eq!(out, "1\n2\n3\n0\n1\nx\ny\n");
    }

    #[test]
    fn test_for_iterates_a_snapshot() {
        let source = "let xs = [1, 2]\nfor x in xs { xs.append(x) }\nprint(xs)";
        assert_eq!(run(source).0, "[1, 2, 1, 2]\n");
    }

    #[test]
    fn test_loop_variable_reuses_visible_binding() {
        let (out, _) = run("var i = 100\nfor i in range(3) { }\nprint(i)");
        assert_eq!(out, "2\n");

        let (_, errors) = run("for i in range(2) { }\nprint(i)");
        assert!(matches!(errors[..], [Error::UndefinedVariable { .. }]));
    }

    #[test]
    fn test_user_range_shadows_builtin_in_for() {
        let source = "func range(n: Int) -> [Int] { return [n] }\nfor i in range(7) { print(i) }";
        assert_eq!(run(source).0, "7\n");
    }

    #[test]
    fn test_function_frames_hide_caller_locals() {
        let source = r#"
            let g = 1
            func peek() -> Int { return g + local }
            func caller() -> Int {
                let local = 5
                return peek()
            }
            print(caller())
        "#;
        let (out, errors) = run(source);
        assert_eq!(out, "");
        assert!(errors
            .iter()
            .any(|e| matches!(e, Error::UndefinedVariable { name } if name == "local")));
    }

    #[test]
    fn test_recursion_and_return_coercion() {
        let source = r#"
            func fact(n: Int) -> Int {
                if n <= 1 { return 1 }
                return n * fact(n - 1)
            }
            func half(n: Int) -> Double { return n / 2 }
            print(fact(10))
            print(half(7))
        "#;
        assert_eq!(run(source).0, "3628800\n3.000000\n");
    }

    #[test]
    fn test_call_depth_guard() {
        let config = InterpreterConfig::default().with_max_call_depth(16);
        let mut interp = Interpreter::with_config(config)
            .with_output(OutputSink::buffer(), OutputSink::buffer());
        let errors = interp
            .run_source("func f(n: Int) -> Int { return f(n + 1) }\nprint(f(0))")
            .unwrap();
        assert!(errors
            .iter()
            .any(|e| matches!(e, Error::CallDepthExceeded { limit: 16 })));
    }

    #[test]
    fn test_statement_trace() {
        let mut interp = Interpreter::with_config(InterpreterConfig::default().with_trace(true))
            .with_output(OutputSink::buffer(), OutputSink::buffer());
        interp.run_source("let x = 1\nprint(x)").unwrap();
        assert_eq!(
            interp.take_diagnostics(),
            "trace: var_decl\ntrace: print\n"
        );
    }

    #[test]
    fn test_module_resolver_supplies_names() {
        let mut module = ModuleTable::new();
        module.export_value("answer", Value::Int(42));
        module.export_function(FunctionDecl {
            name: "twice".to_string(),
            params: vec![crate::parser::Param {
                name: "n".to_string(),
                ty: Type::Int,
                default: None,
            }],
            return_type: Type::Int,
            body: vec![Statement::Return(Expression::binary(
                BinaryOp::Mul,
                Expression::Variable("n".to_string()),
                Expression::IntLiteral(2),
            ))],
        });

        let mut interp = Interpreter::buffered().with_resolver(Box::new(module));
        let errors = interp.run_source("print(twice(answer))").unwrap();
        assert!(errors.is_empty());
        assert_eq!(interp.take_output(), "84\n");
    }

    #[test]
    fn test_module_symbol_kind_mismatch() {
        let mut module = ModuleTable::new();
        module.export_value("answer", Value::Int(42));
        module.export_function(FunctionDecl {
            name: "zero".to_string(),
            params: vec![],
            return_type: Type::Int,
            body: vec![Statement::Return(Expression::IntLiteral(0))],
        });

        let mut interp = Interpreter::buffered().with_resolver(Box::new(module));
        let errors = interp.run_source("print(answer())\nprint(zero)\nprint(nope())").unwrap();
        assert_eq!(errors.len(), 3);
        assert!(matches!(&errors[0], Error::ModuleError { name, .. } if name == "answer"));
        assert!(matches!(&errors[1], Error::ModuleError { name, .. } if name == "zero"));
        assert!(matches!(&errors[2], Error::UndefinedFunction { .. }));
        assert_eq!(interp.take_output(), "");
    }

    #[test]
    fn test_index_and_member_assignment() {
        let source = r#"
            let xs = [1, 2, 3]
            xs[-1] = 30
            let d = ["a": 1]
            d["b"] = 2
            d.a = 10
            print(xs)
            print(d)
            xs[3] = 4
        "#;
        let (out, errors) = run(source);
        assert_eq!(out, "[1, 2, 30]\n[\"a\": 10, \"b\": 2]\n");
        assert!(matches!(
            errors[..],
            [Error::IndexOutOfBounds { index: 3, length: 3 }]
        ));
    }

    #[test]
    fn test_members_and_methods() {
        let mut interp = Interpreter::buffered();
        let value = |interp: &mut Interpreter, src: &str| {
            interp.evaluate(&crate::parser::parse_expression(src).unwrap())
        };
        assert_eq!(value(&mut interp, "\"héllo\".length").unwrap(), Value::Int(5));
        assert_eq!(value(&mut interp, "[:].length").unwrap(), Value::Int(0));
        assert_eq!(
            value(&mut interp, "[1, \"a\"].toString()").unwrap(),
            Value::string("[1, \"a\"]")
        );
        assert!(matches!(
            value(&mut interp, "5.length"),
            Err(Error::UnsupportedMember { .. })
        ));
        assert!(matches!(
            value(&mut interp, "\"s\".append(1)"),
            Err(Error::UnsupportedMember { .. })
        ));
        assert!(matches!(
            value(&mut interp, "[1].append()"),
            Err(Error::ArityMismatch { .. })
        ));
    }

    #[test]
    fn test_logical_operators_short_circuit() {
        let source = r#"
            func boom() -> Bool {
                print("evaluated")
                return true
            }
            print(false && boom())
            print(true || boom())
        "#;
        assert_eq!(run(source).0, "false\ntrue\n");
    }

    #[test]
    fn test_non_string_dict_key_is_a_type_error() {
        let (_, errors) = run("let d = [1: 2]");
        assert!(matches!(errors[..], [Error::TypeError { .. }]));
    }
}
