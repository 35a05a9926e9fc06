//! Recursive-descent parser for annotation expressions.
//!
//! ```text
//! expr      := postfix ('|' postfix)*
//! postfix   := atom ('[' items ']' | '(' call_args ')')*
//! atom      := name ('.' name)* | STRING | '-'? (INT | FLOAT) | '...'
//!            | '[' items? ']' | '{' entries? '}' | '(' expr ')'
//! ```

use super::lexer::{Lexer, Token, TokenKind as TK};
use super::{Expr, SyntaxError};

/// Parses annotation source text into [`Expr`].
pub struct AnnotationParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl AnnotationParser {
    /// Parse a complete annotation expression.
    pub fn parse(source: &str) -> Result<Expr, SyntaxError> {
        let tokens = Lexer::new(source).tokenize()?;
        let mut parser = AnnotationParser { tokens, pos: 0 };
        let expr = parser.parse_expr()?;
        if parser.curr().kind != TK::Eof {
            return Err(parser.unexpected("end of annotation"));
        }
        Ok(expr)
    }

    fn curr(&self) -> &Token {
        // tokenize() always ends with Eof and we never advance past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn peek_kind(&self) -> Option<&TK> {
        self.tokens.get(self.pos + 1).map(|t| &t.kind)
    }

    fn expect(&mut self, kind: TK, what: &str) -> Result<(), SyntaxError> {
        if self.curr().kind == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let found = match &self.curr().kind {
            TK::Eof => "end of input".to_string(),
            TK::Ident(name) => format!("'{}'", name),
            TK::Str(s) => format!("string '{}'", s),
            TK::Int(n) => format!("integer {}", n),
            TK::Float(x) => format!("number {:?}", x),
            other => format!("{:?}", other),
        };
        SyntaxError::new(
            format!("expected {}, found {}", expected, found),
            self.curr().offset,
        )
    }

    fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut lhs = self.parse_postfix()?;
        while self.curr().kind == TK::Pipe {
            self.advance();
            let rhs = self.parse_postfix()?;
            lhs = Expr::BitOr(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_postfix(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_atom()?;
        loop {
            match self.curr().kind {
                TK::LBracket => {
                    self.advance();
                    let args = self.parse_items(TK::RBracket)?;
                    if args.is_empty() {
                        return Err(self.unexpected("subscript argument"));
                    }
                    self.expect(TK::RBracket, "']'")?;
                    expr = Expr::Subscript {
                        target: Box::new(expr),
                        args,
                    };
                }
                TK::LParen => {
                    self.advance();
                    let (args, kwargs) = self.parse_call_args()?;
                    self.expect(TK::RParen, "')'")?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        kwargs,
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_atom(&mut self) -> Result<Expr, SyntaxError> {
        let token = self.curr().clone();
        match token.kind {
            TK::Ident(name) => {
                self.advance();
                match name.as_str() {
                    "None" => Ok(Expr::None),
                    "True" => Ok(Expr::Bool(true)),
                    "False" => Ok(Expr::Bool(false)),
                    _ => self.parse_dotted(name),
                }
            }
            TK::Str(s) => {
                self.advance();
                Ok(Expr::Str(s))
            }
            TK::Int(n) => {
                self.advance();
                Ok(Expr::Int(n))
            }
            TK::Float(x) => {
                self.advance();
                Ok(Expr::Float(x))
            }
            TK::Minus => {
                self.advance();
                match self.curr().kind {
                    TK::Int(n) => {
                        self.advance();
                        Ok(Expr::Int(-n))
                    }
                    TK::Float(x) => {
                        self.advance();
                        Ok(Expr::Float(-x))
                    }
                    _ => Err(self.unexpected("number after '-'")),
                }
            }
            TK::Ellipsis => {
                self.advance();
                Ok(Expr::Ellipsis)
            }
            TK::LBracket => {
                self.advance();
                let items = self.parse_items(TK::RBracket)?;
                self.expect(TK::RBracket, "']'")?;
                Ok(Expr::List(items))
            }
            TK::LBrace => {
                self.advance();
                let entries = self.parse_entries()?;
                self.expect(TK::RBrace, "'}'")?;
                Ok(Expr::Dict(entries))
            }
            TK::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TK::RParen, "')'")?;
                Ok(inner)
            }
            _ => Err(self.unexpected("an annotation")),
        }
    }

    fn parse_dotted(&mut self, first: String) -> Result<Expr, SyntaxError> {
        let mut name = first;
        while self.curr().kind == TK::Dot {
            self.advance();
            match &self.curr().kind {
                TK::Ident(segment) => {
                    name.push('.');
                    name.push_str(segment);
                    self.advance();
                }
                _ => return Err(self.unexpected("name after '.'")),
            }
        }
        Ok(Expr::Name(name))
    }

    /// Comma separated expressions up to `close`, trailing comma allowed.
    fn parse_items(&mut self, close: TK) -> Result<Vec<Expr>, SyntaxError> {
        let mut items = Vec::new();
        while self.curr().kind != close {
            items.push(self.parse_expr()?);
            if self.curr().kind != TK::Comma {
                break;
            }
            self.advance();
        }
        Ok(items)
    }

    fn parse_entries(&mut self) -> Result<Vec<(Expr, Expr)>, SyntaxError> {
        let mut entries = Vec::new();
        while self.curr().kind != TK::RBrace {
            let key = self.parse_expr()?;
            self.expect(TK::Colon, "':'")?;
            let value = self.parse_expr()?;
            entries.push((key, value));
            if self.curr().kind != TK::Comma {
                break;
            }
            self.advance();
        }
        Ok(entries)
    }

    fn parse_call_args(&mut self) -> Result<(Vec<Expr>, Vec<(String, Expr)>), SyntaxError> {
        let mut args = Vec::new();
        let mut kwargs = Vec::new();
        while self.curr().kind != TK::RParen {
            let keyword = match (&self.curr().kind, self.peek_kind()) {
                (TK::Ident(name), Some(TK::Eq)) => Some(name.clone()),
                _ => None,
            };
            match keyword {
                Some(name) => {
                    self.advance();
                    self.advance();
                    kwargs.push((name, self.parse_expr()?));
                }
                None if !kwargs.is_empty() => {
                    return Err(self.unexpected("keyword argument"));
                }
                None => args.push(self.parse_expr()?),
            }
            if self.curr().kind != TK::Comma {
                break;
            }
            self.advance();
        }
        Ok((args, kwargs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(n: &str) -> Expr {
        Expr::Name(n.to_string())
    }

    fn subscript(target: Expr, args: Vec<Expr>) -> Expr {
        Expr::Subscript {
            target: Box::new(target),
            args,
        }
    }

    // =========================================================================
    // Names and Subscripts
    // =========================================================================

    #[test]
    fn test_parse_bare_name() {
        assert_eq!(AnnotationParser::parse("DepartmentName").unwrap(), name("DepartmentName"));
    }

    #[test]
    fn test_parse_dotted_name() {
        assert_eq!(
            AnnotationParser::parse("typing.Optional[datetime.date]").unwrap(),
            subscript(name("typing.Optional"), vec![name("datetime.date")])
        );
    }

    #[test]
    fn test_parse_nested_subscripts() {
        assert_eq!(
            AnnotationParser::parse("Dict[str, List[int]]").unwrap(),
            subscript(
                name("Dict"),
                vec![name("str"), subscript(name("List"), vec![name("int")])]
            )
        );
    }

    #[test]
    fn test_parse_literal_arguments() {
        assert_eq!(
            AnnotationParser::parse("Literal['XS', 2, -3, True, None]").unwrap(),
            subscript(
                name("Literal"),
                vec![
                    Expr::Str("XS".into()),
                    Expr::Int(2),
                    Expr::Int(-3),
                    Expr::Bool(true),
                    Expr::None,
                ]
            )
        );
    }

    #[test]
    fn test_parse_trailing_comma() {
        assert_eq!(
            AnnotationParser::parse("Union[str, int,]").unwrap(),
            subscript(name("Union"), vec![name("str"), name("int")])
        );
    }

    #[test]
    fn test_parse_string_forward_ref_argument() {
        assert_eq!(
            AnnotationParser::parse("Optional['Product']").unwrap(),
            subscript(name("Optional"), vec![Expr::Str("Product".into())])
        );
    }

    // =========================================================================
    // Calls and Operators
    // =========================================================================

    #[test]
    fn test_parse_field_call() {
        let expr = AnnotationParser::parse(
            "Annotated[Union[A, B], Field(discriminator='kind', json_schema_extra={'x': 1})]",
        )
        .unwrap();

        let Expr::Subscript { args, .. } = expr else {
            panic!("expected subscript");
        };
        assert_eq!(args.len(), 2);
        let Expr::Call {
            callee,
            args: positional,
            kwargs,
        } = &args[1]
        else {
            panic!("expected call, got {:?}", args[1]);
        };
        assert_eq!(**callee, name("Field"));
        assert!(positional.is_empty());
        assert_eq!(kwargs[0], ("discriminator".to_string(), Expr::Str("kind".into())));
        assert_eq!(
            kwargs[1].1,
            Expr::Dict(vec![(Expr::Str("x".into()), Expr::Int(1))])
        );
    }

    #[test]
    fn test_parse_positional_call() {
        assert_eq!(
            AnnotationParser::parse("MaxLen(32)").unwrap(),
            Expr::Call {
                callee: Box::new(name("MaxLen")),
                args: vec![Expr::Int(32)],
                kwargs: vec![],
            }
        );
    }

    #[test]
    fn test_parse_float_arguments() {
        assert_eq!(
            AnnotationParser::parse("Field(ge=0.0, le=-99.9)").unwrap(),
            Expr::Call {
                callee: Box::new(name("Field")),
                args: vec![],
                kwargs: vec![
                    ("ge".to_string(), Expr::Float(0.0)),
                    ("le".to_string(), Expr::Float(-99.9)),
                ],
            }
        );
    }

    #[test]
    fn test_parse_pipe_is_left_associative() {
        assert_eq!(
            AnnotationParser::parse("int | str | None").unwrap(),
            Expr::BitOr(
                Box::new(Expr::BitOr(Box::new(name("int")), Box::new(name("str")))),
                Box::new(Expr::None)
            )
        );
    }

    #[test]
    fn test_parse_parentheses_group() {
        assert_eq!(
            AnnotationParser::parse("(int | None)").unwrap(),
            Expr::BitOr(Box::new(name("int")), Box::new(Expr::None))
        );
    }

    #[test]
    fn test_parse_ellipsis() {
        assert_eq!(
            AnnotationParser::parse("tuple[int, ...]").unwrap(),
            subscript(name("tuple"), vec![name("int"), Expr::Ellipsis])
        );
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn test_error_on_trailing_input() {
        let err = AnnotationParser::parse("int str").unwrap_err();
        assert_eq!(err.offset, 4);
        assert!(err.message.contains("end of annotation"));
    }

    #[test]
    fn test_error_on_unclosed_subscript() {
        let err = AnnotationParser::parse("Optional[int").unwrap_err();
        assert!(err.message.contains("']'"));
    }

    #[test]
    fn test_error_on_empty_subscript() {
        assert!(AnnotationParser::parse("List[]").is_err());
    }

    #[test]
    fn test_error_on_positional_after_keyword() {
        assert!(AnnotationParser::parse("Field(alias='a', 1)").is_err());
    }

    #[test]
    fn test_error_on_empty_input() {
        let err = AnnotationParser::parse("   ").unwrap_err();
        assert!(err.message.contains("end of input"));
    }
}
