use super::Parser;
use crate::error::{Error, Result};
use crate::types::Type;

impl Parser {
    /// Parses a type annotation: `Int`, `[T]`, `[K: V]`, each optionally followed by `?`
    pub(super) fn parse_type(&mut self) -> Result<Type> {
        self.skip_ws();

        let mut ty = if self.cursor.match_char('[') {
            self.nested(|p| {
                let first = p.parse_type()?;
                p.skip_ws();
                if p.cursor.match_char(':') {
                    let value = p.parse_type()?;
                    p.expect_char(']')?;
                    Ok(Type::dict_of(first, value))
                } else {
                    p.expect_char(']')?;
                    Ok(Type::array_of(first))
                }
            })?
        } else {
            let name = self.expect_identifier("a type name")?;
            Type::from_name(&name).ok_or(Error::UnknownType { name })?
        };

        while self.cursor.match_char('?') {
            ty = ty.optional();
        }
        Ok(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(src: &str) -> Result<Type> {
        Parser::new(src).parse_type()
    }

    #[test]
    fn test_annotations() {
        assert_eq!(ty("Int").unwrap(), Type::Int);
        assert_eq!(ty("[Double]").unwrap(), Type::array_of(Type::Double));
        assert_eq!(
            ty("[String : [Bool]]?").unwrap(),
            Type::dict_of(Type::String, Type::array_of(Type::Bool)).optional()
        );
        assert_eq!(ty("Int??").unwrap(), Type::Int.optional().optional());
    }

    #[test]
    fn test_bad_annotations() {
        assert!(matches!(ty("Number"), Err(Error::UnknownType { .. })));
        assert!(matches!(ty("[Any]"), Err(Error::UnknownType { .. })));
        assert!(ty("[Int").is_err());
        assert!(ty("?").is_err());
    }
}
