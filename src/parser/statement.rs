use super::ast::{Expression, FunctionDecl, Param, Statement};
use super::Parser;
use crate::error::{Error, Result};

impl Parser {
    /// Parses statements until end of input, or until the closing `}` of a block
    pub(super) fn parse_statements(&mut self, in_block: bool) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            self.skip_separators();
            if self.cursor.is_at_end() {
                if in_block {
                    return Err(self.unexpected("'}'"));
                }
                return Ok(statements);
            }
            if in_block && self.cursor.peek() == '}' {
                return Ok(statements);
            }

            statements.push(self.parse_statement()?);
            self.expect_terminator()?;
        }
    }

    fn skip_separators(&mut self) {
        loop {
            self.cursor.skip_whitespace();
            if !self.cursor.match_char(';') {
                break;
            }
        }
    }

    /// A statement ends at a newline, `;`, `}` or end of input
    fn expect_terminator(&mut self) -> Result<()> {
        self.cursor.skip_inline_whitespace();
        match self.cursor.peek() {
            '\n' | ';' | '}' => Ok(()),
            _ if self.cursor.is_at_end() => Ok(()),
            _ => Err(self.unexpected("end of statement")),
        }
    }

    /// `{ statements }`, allowing the brace on the next line
    fn parse_block(&mut self) -> Result<Vec<Statement>> {
        self.cursor.skip_whitespace();
        if !self.cursor.match_char('{') {
            return Err(self.unexpected("'{'"));
        }

        let saved = std::mem::replace(&mut self.nesting, 0);
        let body = self.descend(|p| p.parse_statements(true));
        self.nesting = saved;
        let body = body?;

        self.cursor.match_char('}');
        Ok(body)
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        self.cursor.skip_inline_whitespace();

        if self.cursor.match_keyword("func") || self.cursor.match_keyword("fn") {
            return self.parse_function();
        }
        if self.cursor.match_keyword("return") {
            return self.parse_return();
        }
        if self.cursor.match_keyword("let") || self.cursor.match_keyword("var") {
            return self.parse_declaration(false);
        }
        if self.cursor.match_keyword("const") {
            return self.parse_declaration(true);
        }
        if self.cursor.match_keyword("if") {
            return self.parse_if();
        }
        if self.cursor.match_keyword("while") {
            let condition = self.parse_expression()?;
            let body = self.parse_block()?;
            return Ok(Statement::While { condition, body });
        }
        if self.cursor.match_keyword("for") {
            return self.parse_for();
        }
        if self.cursor.match_keyword("break") {
            return Ok(Statement::Break);
        }
        if self.cursor.match_keyword("continue") {
            return Ok(Statement::Continue);
        }
        if let Some(stmt) = self.try_parse_print()? {
            return Ok(stmt);
        }

        self.parse_assignment_or_expression()
    }

    /// `print(expr)`; a `print` not followed by `(` is an ordinary identifier
    fn try_parse_print(&mut self) -> Result<Option<Statement>> {
        let start = self.cursor.position();
        if !self.cursor.match_keyword("print") {
            return Ok(None);
        }
        self.cursor.skip_inline_whitespace();
        if !self.cursor.match_char('(') {
            self.cursor.reset(start);
            return Ok(None);
        }

        let value = self.nested(|p| {
            let value = p.parse_expression()?;
            p.expect_char(')')?;
            Ok(value)
        })?;
        Ok(Some(Statement::Print(value)))
    }

    fn parse_assignment_or_expression(&mut self) -> Result<Statement> {
        let target = self.parse_expression()?;
        self.cursor.skip_inline_whitespace();
        if !(self.cursor.peek() == '=' && self.cursor.peek_next() != '=') {
            return Ok(Statement::Expression(target));
        }

        let (line, column) = (self.cursor.line(), self.cursor.column());
        self.cursor.advance();
        let value = self.parse_expression()?;

        match target {
            Expression::Variable(name) => Ok(Statement::Assignment { name, value }),
            Expression::Index { target, index } => Ok(Statement::IndexAssign {
                target: *target,
                index: *index,
                value,
            }),
            Expression::Member {
                target,
                name,
                optional: false,
            } => Ok(Statement::MemberAssign {
                target: *target,
                name,
                value,
            }),
            _ => Err(Error::syntax(line, column, "invalid assignment target")),
        }
    }

    fn parse_declaration(&mut self, is_const: bool) -> Result<Statement> {
        let name = self.expect_identifier("a variable name")?;
        self.skip_ws();
        let ty = if self.cursor.match_char(':') {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.expect_char('=')?;
        let init = self.parse_expression()?;
        Ok(Statement::VarDecl {
            name,
            ty,
            init,
            is_const,
        })
    }

    fn parse_return(&mut self) -> Result<Statement> {
        self.cursor.skip_inline_whitespace();
        let bare = self.cursor.is_at_end() || matches!(self.cursor.peek(), '\n' | ';' | '}');
        if bare {
            return Ok(Statement::Return(Expression::NilLiteral));
        }
        Ok(Statement::Return(self.parse_expression()?))
    }

    fn parse_if(&mut self) -> Result<Statement> {
        let condition = self.parse_expression()?;
        let then_branch = self.parse_block()?;

        let before_else = self.cursor.position();
        self.cursor.skip_whitespace();
        let else_branch = if self.cursor.match_keyword("else") {
            self.cursor.skip_inline_whitespace();
            if self.cursor.match_keyword("if") {
                Some(vec![self.parse_if()?])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            self.cursor.reset(before_else);
            None
        };

        Ok(Statement::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_for(&mut self) -> Result<Statement> {
        let variable = self.expect_identifier("a loop variable")?;
        self.skip_ws();
        if !self.cursor.match_keyword("in") {
            return Err(self.unexpected("'in'"));
        }
        let iterable = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(Statement::ForIn {
            variable,
            iterable,
            body,
        })
    }

    fn parse_function(&mut self) -> Result<Statement> {
        let name = self.expect_identifier("a function name")?;
        self.expect_char('(')?;
        let params = self.nested(|p| p.parse_params())?;

        self.skip_ws();
        if !self.cursor.match_str("->") {
            return Err(self.unexpected("'->' and a return type"));
        }
        let return_type = self.parse_type()?;
        let body = self.parse_block()?;

        Ok(Statement::FunctionDecl(FunctionDecl {
            name,
            params,
            return_type,
            body,
        }))
    }

    /// Parameter list after `(`, through the closing `)`
    fn parse_params(&mut self) -> Result<Vec<Param>> {
        let mut params: Vec<Param> = Vec::new();
        self.skip_ws();
        if self.cursor.match_char(')') {
            return Ok(params);
        }

        loop {
            let name = self.expect_identifier("a parameter name")?;
            self.expect_char(':')?;
            let ty = self.parse_type()?;
            self.skip_ws();
            let default = if self.cursor.match_char('=') {
                Some(self.parse_expression()?)
            } else {
                None
            };

            if default.is_none() && params.iter().any(|p| p.default.is_some()) {
                return Err(self.cursor.error(format!(
                    "parameter '{}' without a default follows a defaulted parameter",
                    name
                )));
            }
            params.push(Param { name, ty, default });

            self.skip_ws();
            if self.cursor.match_char(')') {
                return Ok(params);
            }
            self.expect_char(',')?;
        }
    }
}
