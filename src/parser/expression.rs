use super::ast::{BinaryOp, Expression, UnaryOp};
use super::Parser;
use crate::error::Result;
use crate::lexer::NumberLiteral;

impl Parser {
    /// Parses an expression at the lowest precedence level
    pub(super) fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expression> {
        let mut left = self.parse_and()?;
        loop {
            self.skip_ws();
            if !self.cursor.match_str("||") {
                return Ok(left);
            }
            let right = self.parse_and()?;
            left = Expression::binary(BinaryOp::Or, left, right);
        }
    }

    fn parse_and(&mut self) -> Result<Expression> {
        let mut left = self.parse_comparison()?;
        loop {
            self.skip_ws();
            if !self.cursor.match_str("&&") {
                return Ok(left);
            }
            let right = self.parse_comparison()?;
            left = Expression::binary(BinaryOp::And, left, right);
        }
    }

    /// Comparison operators do not chain: at most one per level
    fn parse_comparison(&mut self) -> Result<Expression> {
        let left = self.parse_range()?;
        self.skip_ws();

        let op = if self.cursor.match_str("==") {
            BinaryOp::Eq
        } else if self.cursor.match_str("!=") {
            BinaryOp::NotEq
        } else if self.cursor.match_str("<=") {
            BinaryOp::LtEq
        } else if self.cursor.match_str(">=") {
            BinaryOp::GtEq
        } else if self.cursor.match_char('<') {
            BinaryOp::Lt
        } else if self.cursor.match_char('>') {
            BinaryOp::Gt
        } else {
            return Ok(left);
        };

        let right = self.parse_range()?;
        Ok(Expression::binary(op, left, right))
    }

    fn parse_range(&mut self) -> Result<Expression> {
        let start = self.parse_additive()?;
        self.skip_ws();
        if !self.cursor.match_str("..") {
            return Ok(start);
        }
        let inclusive = !self.cursor.match_char('<');
        let end = self.parse_additive()?;
        Ok(Expression::Range {
            start: Box::new(start),
            end: Box::new(end),
            inclusive,
        })
    }

    fn parse_additive(&mut self) -> Result<Expression> {
        let mut left = self.parse_multiplicative()?;
        loop {
            self.skip_ws();
            let op = match self.cursor.peek() {
                '+' => BinaryOp::Add,
                '-' if self.cursor.peek_next() != '>' => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.parse_multiplicative()?;
            left = Expression::binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expression> {
        let mut left = self.parse_unary()?;
        loop {
            self.skip_ws();
            let op = match self.cursor.peek() {
                '*' => BinaryOp::Mul,
                '/' => BinaryOp::Div,
                '%' => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.parse_unary()?;
            left = Expression::binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> Result<Expression> {
        self.skip_ws();
        let op = if self.cursor.peek() == '!' && self.cursor.peek_next() != '=' {
            UnaryOp::Not
        } else if self.cursor.peek() == '-' {
            UnaryOp::Neg
        } else {
            return self.parse_postfix();
        };
        self.cursor.advance();
        let operand = self.descend(|p| p.parse_unary())?;
        Ok(Expression::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    /// Indexing, member access, optional chaining and method calls bind tighter than any operator
    fn parse_postfix(&mut self) -> Result<Expression> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.cursor.match_char('[') {
                let index = self.nested(|p| {
                    let index = p.parse_expression()?;
                    p.expect_char(']')?;
                    Ok(index)
                })?;
                expr = Expression::Index {
                    target: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.cursor.check_str("?.") {
                self.cursor.match_str("?.");
                expr = self.parse_member(expr, true)?;
            } else if self.cursor.peek() == '.' && self.cursor.peek_next() != '.' {
                self.cursor.advance();
                expr = self.parse_member(expr, false)?;
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_member(&mut self, target: Expression, optional: bool) -> Result<Expression> {
        let name = match self.cursor.scan_identifier() {
            Some(name) => name,
            None => return Err(self.unexpected("a member name")),
        };

        if self.cursor.match_char('(') {
            let args = self.parse_arguments()?;
            Ok(Expression::MethodCall {
                target: Box::new(target),
                name,
                args,
                optional,
            })
        } else {
            Ok(Expression::Member {
                target: Box::new(target),
                name,
                optional,
            })
        }
    }

    fn parse_primary(&mut self) -> Result<Expression> {
        self.skip_ws();
        let c = self.cursor.peek();

        if self.cursor.is_at_end() {
            return Err(self.unexpected("an expression"));
        }

        if c == '(' {
            self.cursor.advance();
            return self.nested(|p| {
                let inner = p.parse_expression()?;
                p.expect_char(')')?;
                Ok(inner)
            });
        }

        if c == '"' {
            return Ok(Expression::StringLiteral(self.cursor.scan_string()?));
        }

        if c.is_ascii_digit() {
            return Ok(match self.cursor.scan_number()? {
                NumberLiteral::Int(n) => Expression::IntLiteral(n),
                NumberLiteral::Double(d) => Expression::DoubleLiteral(d),
            });
        }

        if c == '[' {
            self.cursor.advance();
            return self.nested(|p| p.parse_collection_literal());
        }

        let Some(name) = self.cursor.scan_identifier() else {
            return Err(self.unexpected("an expression"));
        };
        match name.as_str() {
            "nil" => return Ok(Expression::NilLiteral),
            "true" => return Ok(Expression::BoolLiteral(true)),
            "false" => return Ok(Expression::BoolLiteral(false)),
            _ => {}
        }

        if self.cursor.match_char('(') {
            let args = self.parse_arguments()?;
            Ok(Expression::Call { name, args })
        } else {
            Ok(Expression::Variable(name))
        }
    }

    /// Parses call arguments after the opening `(`
    fn parse_arguments(&mut self) -> Result<Vec<Expression>> {
        self.nested(|p| {
            let mut args = Vec::new();
            p.skip_ws();
            if p.cursor.match_char(')') {
                return Ok(args);
            }
            loop {
                args.push(p.parse_expression()?);
                p.skip_ws();
                if p.cursor.match_char(')') {
                    return Ok(args);
                }
                p.expect_char(',')?;
            }
        })
    }

    /// Parses `[...]` contents after the opening bracket
    fn parse_collection_literal(&mut self) -> Result<Expression> {
        self.skip_ws();
        if self.cursor.match_char(']') {
            return Ok(Expression::ArrayLiteral(Vec::new()));
        }
        if self.cursor.match_char(':') {
            self.expect_char(']')?;
            return Ok(Expression::DictLiteral(Vec::new()));
        }

        let is_dict = self.is_dict_literal();
        let mut items = Vec::new();
        let mut pairs = Vec::new();
        loop {
            let first = self.parse_expression()?;
            if is_dict {
                self.expect_char(':')?;
                let value = self.parse_expression()?;
                pairs.push((first, value));
            } else {
                items.push(first);
            }

            self.skip_ws();
            if self.cursor.match_char(']') {
                break;
            }
            self.expect_char(',')?;
            self.skip_ws();
            if self.cursor.match_char(']') {
                break;
            }
        }

        if is_dict {
            Ok(Expression::DictLiteral(pairs))
        } else {
            Ok(Expression::ArrayLiteral(items))
        }
    }

    /// Looks ahead for a top-level `:` before the first top-level `,` or `]`
    fn is_dict_literal(&self) -> bool {
        let mut depth = 0usize;
        let mut in_string = false;
        let mut i = 0;
        loop {
            let c = self.cursor.peek_at(i);
            match c {
                '\0' => return false,
                '\\' if in_string => i += 1,
                '"' => in_string = !in_string,
                _ if in_string => {}
                '(' | '[' | '{' => depth += 1,
                ')' | '}' => depth = depth.saturating_sub(1),
                ']' if depth == 0 => return false,
                ']' => depth -= 1,
                ',' if depth == 0 => return false,
                ':' if depth == 0 => return true,
                _ => {}
            }
            i += 1;
        }
    }
}
