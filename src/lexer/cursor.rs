use crate::error::{Error, Result};

/// Saved cursor location, used for lookahead and backtracking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    offset: usize,
    line: usize,
    column: usize,
}

/// Numeric literal as scanned
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberLiteral {
    /// Digits only
    Int(i64),
    /// Digits with one `.`
    Double(f64),
}

/// Character-level cursor over source text
///
/// The parser drives it directly; no token stream is produced.
#[derive(Debug, Clone)]
pub struct Cursor {
    /// Source code as character vector
    source: Vec<char>,
    /// Current position in source
    current: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed)
    column: usize,
}

/// Characters that may start an identifier
pub fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Characters that may continue an identifier
pub fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl Cursor {
    /// Creates a cursor at the start of `source`
    pub fn new(source: &str) -> Self {
        Cursor {
            source: source.chars().collect(),
            current: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn position(&self) -> Position {
        Position {
            offset: self.current,
            line: self.line,
            column: self.column,
        }
    }

    pub fn reset(&mut self, pos: Position) {
        self.current = pos.offset;
        self.line = pos.line;
        self.column = pos.column;
    }

    /// Consumes one character; returns `'\0'` at end of input
    pub fn advance(&mut self) -> char {
        let Some(&c) = self.source.get(self.current) else {
            return '\0';
        };
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    pub fn peek(&self) -> char {
        self.peek_at(0)
    }

    pub fn peek_next(&self) -> char {
        self.peek_at(1)
    }

    /// Looks `n` characters ahead without consuming
    pub fn peek_at(&self, n: usize) -> char {
        self.source.get(self.current + n).copied().unwrap_or('\0')
    }

    pub fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    /// True if the input continues with `s`
    pub fn check_str(&self, s: &str) -> bool {
        s.chars().enumerate().all(|(i, c)| self.peek_at(i) == c)
    }

    /// Consumes `s` if the input continues with it
    pub fn match_str(&mut self, s: &str) -> bool {
        if !self.check_str(s) {
            return false;
        }
        for _ in s.chars() {
            self.advance();
        }
        true
    }

    /// True if the input continues with keyword `kw` followed by a non-identifier character
    pub fn check_keyword(&self, kw: &str) -> bool {
        self.check_str(kw) && !is_ident_char(self.peek_at(kw.chars().count()))
    }

    pub fn match_keyword(&mut self, kw: &str) -> bool {
        if self.check_keyword(kw) {
            self.match_str(kw)
        } else {
            false
        }
    }

    /// Skips spaces, tabs, carriage returns and comments, stopping at a newline
    pub fn skip_inline_whitespace(&mut self) {
        loop {
            match self.peek() {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '#' => self.skip_line_comment(),
                '/' if self.peek_next() == '/' => self.skip_line_comment(),
                _ => break,
            }
        }
    }

    /// Skips whitespace including newlines, and comments
    pub fn skip_whitespace(&mut self) {
        loop {
            self.skip_inline_whitespace();
            if self.peek() == '\n' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while !self.is_at_end() && self.peek() != '\n' {
            self.advance();
        }
    }

    /// Scans an identifier at the cursor, if one starts here
    pub fn scan_identifier(&mut self) -> Option<String> {
        if !is_ident_start(self.peek()) {
            return None;
        }
        let mut text = String::new();
        while is_ident_char(self.peek()) {
            text.push(self.advance());
        }
        Some(text)
    }

    /// Scans digits with at most one `.` that is followed by a digit
    pub fn scan_number(&mut self) -> Result<NumberLiteral> {
        let mut text = String::new();
        while self.peek().is_ascii_digit() {
            text.push(self.advance());
        }

        let mut is_double = false;
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            is_double = true;
            text.push(self.advance());
            while self.peek().is_ascii_digit() {
                text.push(self.advance());
            }
        }

        if is_double {
            text.parse()
                .map(NumberLiteral::Double)
                .map_err(|_| Error::InvalidNumber { literal: text })
        } else {
            text.parse()
                .map(NumberLiteral::Int)
                .map_err(|_| Error::InvalidNumber { literal: text })
        }
    }

    /// Scans a double-quoted string literal, opening quote included
    pub fn scan_string(&mut self) -> Result<String> {
        let (line, column) = (self.line, self.column);
        if !self.match_char('"') {
            return Err(self.error("expected string literal"));
        }

        let mut value = String::new();
        while !self.is_at_end() && self.peek() != '"' {
            let c = self.advance();
            if c != '\\' {
                value.push(c);
                continue;
            }
            match self.peek() {
                'n' => value.push('\n'),
                't' => value.push('\t'),
                'r' => value.push('\r'),
                '"' => value.push('"'),
                '\\' => value.push('\\'),
                '\0' if self.is_at_end() => break,
                other => {
                    value.push('\\');
                    value.push(other);
                }
            }
            self.advance();
        }

        if !self.match_char('"') {
            return Err(Error::syntax(line, column, "unterminated string literal"));
        }
        Ok(value)
    }

    /// Syntax error at the cursor
    pub fn error(&self, message: impl Into<String>) -> Error {
        Error::syntax(self.line, self.column, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers() {
        assert_eq!(Cursor::new("42").scan_number().unwrap(), NumberLiteral::Int(42));
        assert_eq!(
            Cursor::new("3.14").scan_number().unwrap(),
            NumberLiteral::Double(3.14)
        );

        // `1..5` is a range, not a malformed double
        let mut cursor = Cursor::new("1..5");
        assert_eq!(cursor.scan_number().unwrap(), NumberLiteral::Int(1));
        assert!(cursor.check_str(".."));

        assert!(matches!(
            Cursor::new("99999999999999999999").scan_number(),
            Err(Error::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_string_escapes() {
        let mut cursor = Cursor::new(r#""a\tb\n\"q\" \\ \x""#);
        assert_eq!(cursor.scan_string().unwrap(), "a\tb\n\"q\" \\ \\x");
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_unterminated_string() {
        let err = Cursor::new("\"open").scan_string().unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn test_comments_and_newlines() {
        let mut cursor = Cursor::new("  # note\n  // more\n  x");
        cursor.skip_inline_whitespace();
        assert_eq!(cursor.peek(), '\n');
        cursor.skip_whitespace();
        assert_eq!(cursor.peek(), 'x');
        assert_eq!(cursor.line(), 3);
        assert_eq!(cursor.column(), 3);
    }

    #[test]
    fn test_keywords_need_boundary() {
        let mut cursor = Cursor::new("letter");
        assert!(!cursor.match_keyword("let"));
        assert_eq!(cursor.scan_identifier().as_deref(), Some("letter"));
    }

    #[test]
    fn test_backtracking() {
        let mut cursor = Cursor::new("ab\ncd");
        let pos = cursor.position();
        cursor.skip_whitespace();
        cursor.advance();
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.line(), 2);
        cursor.reset(pos);
        assert_eq!(cursor.peek(), 'a');
        assert_eq!(cursor.line(), 1);
    }
}
