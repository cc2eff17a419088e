//! Crumb Parser Module
//!
//! One-pass recursive descent over a character [`Cursor`], producing the AST in
//! `ast.rs`. Statements live in `statement.rs`, expressions (precedence climbing)
//! in `expression.rs`, and type annotations in `annotation.rs`.

mod annotation;
mod ast;
mod expression;
mod statement;

pub use ast::{BinaryOp, Expression, FunctionDecl, Param, Program, Statement, UnaryOp};

use crate::error::{Error, Result};
use crate::lexer::Cursor;

/// Deepest nesting of brackets, blocks and unary operators the parser accepts
pub const MAX_NESTING_DEPTH: usize = 48;

/// Recursive-descent parser for Crumb source text
pub struct Parser {
    cursor: Cursor,
    /// Depth of open `(` / `[`; newlines are insignificant while it is non-zero
    nesting: usize,
    /// Recursion depth across brackets, blocks and unary operators
    depth: usize,
}

impl Parser {
    /// Creates a parser over `source`
    pub fn new(source: &str) -> Self {
        Parser {
            cursor: Cursor::new(source),
            nesting: 0,
            depth: 0,
        }
    }

    /// Parses the whole source as a program
    pub fn parse(&mut self) -> Result<Program> {
        let statements = self.parse_statements(false)?;
        Ok(Program { statements })
    }

    /// Parses the whole source as a single expression
    pub fn parse_standalone_expression(&mut self) -> Result<Expression> {
        self.cursor.skip_whitespace();
        let expr = self.parse_expression()?;
        self.cursor.skip_whitespace();
        if !self.cursor.is_at_end() {
            return Err(self.unexpected("end of input"));
        }
        Ok(expr)
    }

    /// Skips insignificant whitespace: inline only at statement level, newlines too inside brackets
    fn skip_ws(&mut self) {
        if self.nesting > 0 {
            self.cursor.skip_whitespace();
        } else {
            self.cursor.skip_inline_whitespace();
        }
    }

    /// Runs `f` inside a bracketed region
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.nesting += 1;
        let result = self.descend(f);
        self.nesting -= 1;
        result
    }

    /// Runs `f` one recursion level deeper, failing past [`MAX_NESTING_DEPTH`]
    fn descend<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.cursor.error("nesting too deep"));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn expect_char(&mut self, expected: char) -> Result<()> {
        self.skip_ws();
        if self.cursor.match_char(expected) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", expected)))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Result<String> {
        self.skip_ws();
        match self.cursor.scan_identifier() {
            Some(name) => Ok(name),
            None => Err(self.unexpected(what)),
        }
    }

    /// Error describing what was expected at the cursor
    fn unexpected(&self, expected: &str) -> Error {
        if self.cursor.is_at_end() {
            return Error::UnexpectedEof {
                expected: expected.to_string(),
            };
        }
        let found = match self.cursor.peek() {
            '\n' => "newline".to_string(),
            c => format!("'{}'", c),
        };
        self.cursor
            .error(format!("expected {}, found {}", expected, found))
    }
}

/// Parses a complete program
pub fn parse_program(source: &str) -> Result<Program> {
    Parser::new(source).parse()
}

/// Parses a single expression spanning the whole input
pub fn parse_expression(source: &str) -> Result<Expression> {
    Parser::new(source).parse_standalone_expression()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;

    fn expr(src: &str) -> Expression {
        parse_expression(src).unwrap()
    }

    fn stmts(src: &str) -> Vec<Statement> {
        parse_program(src).unwrap().statements
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            expr("1 + 2 * 3"),
            Expression::binary(
                BinaryOp::Add,
                Expression::IntLiteral(1),
                Expression::binary(
                    BinaryOp::Mul,
                    Expression::IntLiteral(2),
                    Expression::IntLiteral(3)
                )
            )
        );

        assert_eq!(
            expr("true || false && false"),
            Expression::binary(
                BinaryOp::Or,
                Expression::BoolLiteral(true),
                Expression::binary(
                    BinaryOp::And,
                    Expression::BoolLiteral(false),
                    Expression::BoolLiteral(false)
                )
            )
        );
    }

    #[test]
    fn test_additive_is_left_associative() {
        assert_eq!(
            expr("10 - 4 - 3"),
            Expression::binary(
                BinaryOp::Sub,
                Expression::binary(
                    BinaryOp::Sub,
                    Expression::IntLiteral(10),
                    Expression::IntLiteral(4)
                ),
                Expression::IntLiteral(3)
            )
        );
    }

    #[test]
    fn test_comparison_does_not_chain() {
        assert!(parse_expression("1 < 2 < 3").is_err());
    }

    #[test]
    fn test_literals() {
        assert_eq!(expr("42"), Expression::IntLiteral(42));
        assert_eq!(expr("3.14"), Expression::DoubleLiteral(3.14));
        assert_eq!(expr("\"hi\""), Expression::StringLiteral("hi".to_string()));
        assert_eq!(expr("nil"), Expression::NilLiteral);
        assert_eq!(expr("[]"), Expression::ArrayLiteral(vec![]));
        assert_eq!(expr("[:]"), Expression::DictLiteral(vec![]));
        assert_eq!(
            expr("[\"a\": 1]"),
            Expression::DictLiteral(vec![(
                Expression::StringLiteral("a".to_string()),
                Expression::IntLiteral(1)
            )])
        );
        assert_eq!(
            expr("[[\"x\": 1], 2]"),
            Expression::ArrayLiteral(vec![
                Expression::DictLiteral(vec![(
                    Expression::StringLiteral("x".to_string()),
                    Expression::IntLiteral(1)
                )]),
                Expression::IntLiteral(2)
            ])
        );
    }

    #[test]
    fn test_ranges() {
        assert_eq!(
            expr("0..<n"),
            Expression::Range {
                start: Box::new(Expression::IntLiteral(0)),
                end: Box::new(Expression::Variable("n".to_string())),
                inclusive: false,
            }
        );
        assert!(matches!(
            expr("1 + 1..5"),
            Expression::Range {
                inclusive: true,
                ..
            }
        ));
    }

    #[test]
    fn test_postfix_chain() {
        assert_eq!(
            expr("x?.foo?.bar(1)"),
            Expression::MethodCall {
                target: Box::new(Expression::Member {
                    target: Box::new(Expression::Variable("x".to_string())),
                    name: "foo".to_string(),
                    optional: true,
                }),
                name: "bar".to_string(),
                args: vec![Expression::IntLiteral(1)],
                optional: true,
            }
        );
        assert!(matches!(expr("m[\"k\"][0]"), Expression::Index { .. }));
    }

    #[test]
    fn test_multiline_inside_brackets() {
        let program = stmts("let a = [\n  1,\n  2,\n]\nprint(a)");
        assert_eq!(program.len(), 2);
    }

    #[test]
    fn test_declarations_and_types() {
        let program = stmts("let a: [String: Int?] = [:]\nconst B = 1; var c = 2");
        assert_eq!(
            program[0],
            Statement::VarDecl {
                name: "a".to_string(),
                ty: Some(Type::dict_of(Type::String, Type::Int.optional())),
                init: Expression::DictLiteral(vec![]),
                is_const: false,
            }
        );
        assert!(matches!(program[1], Statement::VarDecl { is_const: true, .. }));
        assert!(matches!(program[2], Statement::VarDecl { is_const: false, .. }));
    }

    #[test]
    fn test_unknown_type_annotation() {
        assert!(matches!(
            parse_program("let x: Integer = 1"),
            Err(Error::UnknownType { .. })
        ));
    }

    #[test]
    fn test_assignments() {
        let program = stmts("x = 1\na[0] = 2\nd.k = 3\nx == 1");
        assert!(matches!(program[0], Statement::Assignment { .. }));
        assert!(matches!(program[1], Statement::IndexAssign { .. }));
        assert!(matches!(program[2], Statement::MemberAssign { .. }));
        assert!(matches!(program[3], Statement::Expression(_)));
        assert!(parse_program("f() = 1").is_err());
    }

    #[test]
    fn test_function_declaration() {
        let program = stmts("func add(a: Int, b: Int = 1) -> Int {\n  return a + b\n}");
        let Statement::FunctionDecl(decl) = &program[0] else {
            panic!("expected function declaration");
        };
        assert_eq!(decl.name, "add");
        assert_eq!(decl.params.len(), 2);
        assert_eq!(decl.required_params(), 1);
        assert_eq!(decl.return_type, Type::Int);
        assert_eq!(decl.body.len(), 1);
    }

    #[test]
    fn test_function_requires_return_type() {
        assert!(parse_program("fn f(a: Int) { return a }").is_err());
        assert!(parse_program("fn f(a: Int = 1, b: Int) -> Int { return a }").is_err());
    }

    #[test]
    fn test_else_if_desugars() {
        let program = stmts("if a { print(1) } else if b { print(2) } else { print(3) }");
        let Statement::If {
            else_branch: Some(else_branch),
            ..
        } = &program[0]
        else {
            panic!("expected if with else");
        };
        assert!(matches!(
            else_branch.as_slice(),
            [Statement::If {
                else_branch: Some(_),
                ..
            }]
        ));
    }

    #[test]
    fn test_comments_and_separators() {
        let program = stmts("# header\nlet a = 1 // trailing\n\n;; print(a)");
        assert_eq!(program.len(), 2);
    }

    #[test]
    fn test_statement_needs_terminator() {
        let err = parse_program("let a = 1 let b = 2").unwrap_err();
        assert!(matches!(err, Error::SyntaxError { line: 1, .. }));
    }

    #[test]
    fn test_errors_report_position() {
        let err = parse_program("let a = 1\nlet b = (2 +").unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { .. }));

        let err = parse_program("print(1)\nlet = 3").unwrap_err();
        assert!(matches!(err, Error::SyntaxError { line: 2, .. }));
    }

    #[test]
    fn test_unclosed_block() {
        assert!(matches!(
            parse_program("while true {\n print(1)\n"),
            Err(Error::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let shallow = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert!(parse_expression(&shallow).is_ok());

        let deep = format!("{}1{}", "(".repeat(500), ")".repeat(500));
        assert!(matches!(
            parse_expression(&deep),
            Err(Error::SyntaxError { .. })
        ));
        assert!(parse_expression(&"!".repeat(500)).is_err());
    }
}
