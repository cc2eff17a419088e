use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Type;

/// Complete Crumb program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Top-level statements in the program
    pub statements: Vec<Statement>,
}

/// Statements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// Declaration: `let x: T = expr`, `var x = expr`, `const X = expr`
    VarDecl {
        /// Name of the variable
        name: String,
        /// Annotated type; inferred from the value when absent
        ty: Option<Type>,
        /// Initializer expression
        init: Expression,
        /// Declared with `const`
        is_const: bool,
    },

    /// Variable assignment: `x = expr`
    Assignment {
        /// Name of the variable to assign to
        name: String,
        /// Expression value to assign
        value: Expression,
    },

    /// Element store: `target[index] = expr`
    IndexAssign {
        /// Container expression
        target: Expression,
        /// Index or key expression
        index: Expression,
        /// Value to store
        value: Expression,
    },

    /// Dictionary key store: `target.name = expr`
    MemberAssign {
        /// Container expression
        target: Expression,
        /// Key name
        name: String,
        /// Value to store
        value: Expression,
    },

    /// `print(expr)`
    Print(Expression),

    /// Expression statement
    Expression(Expression),

    /// If statement; `else if` is parsed into a nested `If` in `else_branch`
    If {
        /// Condition expression to evaluate
        condition: Expression,
        /// Statements to execute if condition is true
        then_branch: Vec<Statement>,
        /// Optional statements to execute otherwise
        else_branch: Option<Vec<Statement>>,
    },

    /// While loop
    While {
        /// Loop condition expression
        condition: Expression,
        /// Statements to execute in loop body
        body: Vec<Statement>,
    },

    /// For loop: `for x in iterable { ... }`
    ForIn {
        /// Loop variable name
        variable: String,
        /// Range, `range(...)` call, array or dictionary
        iterable: Expression,
        /// Statements to execute in loop body
        body: Vec<Statement>,
    },

    /// Break statement
    Break,

    /// Continue statement
    Continue,

    /// Function declaration: `func name(a: T, b: U = default) -> R { ... }`
    FunctionDecl(FunctionDecl),

    /// Return statement; a bare `return` returns `nil`
    Return(Expression),
}

/// Function declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    /// Function name
    pub name: String,
    /// Parameters in declaration order; defaulted parameters come last
    pub params: Vec<Param>,
    /// Declared return type
    pub return_type: Type,
    /// Function body
    pub body: Vec<Statement>,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Declared type
    pub ty: Type,
    /// Default value used when the argument is omitted
    pub default: Option<Expression>,
}

impl FunctionDecl {
    /// Number of parameters without a default value
    pub fn required_params(&self) -> usize {
        self.params.iter().filter(|p| p.default.is_none()).count()
    }

    /// Accepted argument count, as shown in arity errors
    pub fn expected_arity(&self) -> String {
        let required = self.required_params();
        if required == self.params.len() {
            required.to_string()
        } else {
            format!("{} to {}", required, self.params.len())
        }
    }
}

/// Expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    // Literals
    /// `nil`
    NilLiteral,
    /// `true` / `false`
    BoolLiteral(bool),
    /// Integer literal
    IntLiteral(i64),
    /// Floating literal (always double precision)
    DoubleLiteral(f64),
    /// String literal with escapes resolved
    StringLiteral(String),

    /// Variable reference
    Variable(String),

    /// Binary operation
    Binary {
        /// The binary operator
        op: BinaryOp,
        /// Left operand expression
        left: Box<Expression>,
        /// Right operand expression
        right: Box<Expression>,
    },

    /// Unary operation
    Unary {
        /// The unary operator
        op: UnaryOp,
        /// Operand expression
        operand: Box<Expression>,
    },

    /// Call by name: user function, builtin or resolved module function
    Call {
        /// Function name
        name: String,
        /// Positional arguments
        args: Vec<Expression>,
    },

    /// Array literal: `[a, b, c]`
    ArrayLiteral(Vec<Expression>),

    /// Dictionary literal: `["k": v]`; keys must evaluate to strings
    DictLiteral(Vec<(Expression, Expression)>),

    /// Range: `a..b` (inclusive) or `a..<b` (exclusive)
    Range {
        /// First index
        start: Box<Expression>,
        /// Last index (inclusive) or bound (exclusive)
        end: Box<Expression>,
        /// True for `..`
        inclusive: bool,
    },

    /// Indexing: `target[index]`
    Index {
        /// Indexed expression
        target: Box<Expression>,
        /// Index or key
        index: Box<Expression>,
    },

    /// Member access: `target.name` or `target?.name`
    Member {
        /// Object expression
        target: Box<Expression>,
        /// Member name
        name: String,
        /// True for `?.`
        optional: bool,
    },

    /// Method call: `target.name(args)` or `target?.name(args)`
    MethodCall {
        /// Receiver expression
        target: Box<Expression>,
        /// Method name
        name: String,
        /// Positional arguments
        args: Vec<Expression>,
        /// True for `?.`
        optional: bool,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic
    /// Addition operator (+), also string concatenation
    Add,
    /// Subtraction operator (-)
    Sub,
    /// Multiplication operator (*)
    Mul,
    /// Division operator (/)
    Div,
    /// Modulo operator (%)
    Mod,

    // Comparison
    /// Equality operator (==)
    Eq,
    /// Inequality operator (!=)
    NotEq,
    /// Less than operator (<)
    Lt,
    /// Greater than operator (>)
    Gt,
    /// Less than or equal operator (<=)
    LtEq,
    /// Greater than or equal operator (>=)
    GtEq,

    // Logical
    /// Logical AND operator (&&)
    And,
    /// Logical OR operator (||)
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Negation operator (-x)
    Neg,
    /// Logical NOT operator (!x)
    Not,
}

impl Expression {
    /// Shorthand for building a binary node
    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

impl Statement {
    /// Short name of the statement kind, used in traces
    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::VarDecl { .. } => "var_decl",
            Statement::Assignment { .. } => "assignment",
            Statement::IndexAssign { .. } => "index_assign",
            Statement::MemberAssign { .. } => "member_assign",
            Statement::Print(_) => "print",
            Statement::Expression(_) => "expression",
            Statement::If { .. } => "if",
            Statement::While { .. } => "while",
            Statement::ForIn { .. } => "for_in",
            Statement::Break => "break",
            Statement::Continue => "continue",
            Statement::FunctionDecl(_) => "function_decl",
            Statement::Return(_) => "return",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Mod => write!(f, "%"),
            BinaryOp::Eq => write!(f, "=="),
            BinaryOp::NotEq => write!(f, "!="),
            BinaryOp::Lt => write!(f, "<"),
            BinaryOp::Gt => write!(f, ">"),
            BinaryOp::LtEq => write!(f, "<="),
            BinaryOp::GtEq => write!(f, ">="),
            BinaryOp::And => write!(f, "&&"),
            BinaryOp::Or => write!(f, "||"),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
        }
    }
}
