//! Lexical analysis for Crumb
//!
//! A character cursor the parser drives on demand; there is no separate token stream.

mod cursor;

pub use cursor::{is_ident_char, is_ident_start, Cursor, NumberLiteral, Position};
