//! Tokenizer for annotation expressions.

use std::iter::Peekable;
use std::str::CharIndices;

use super::SyntaxError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,
    Pipe,
    Eq,
    Minus,
    Ellipsis,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character
    pub offset: usize,
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    /// Tokenize the whole input. The last token is always `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(_, ch)) = self.chars.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.chars.next();
        }
    }

    fn next_token(&mut self) -> Result<Token, SyntaxError> {
        self.skip_whitespace();

        let Some(&(offset, ch)) = self.chars.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                offset: self.source.len(),
            });
        };

        let kind = match ch {
            c if c.is_alphabetic() || c == '_' => self.lex_ident(),
            c if c.is_ascii_digit() => self.lex_number(offset)?,
            '\'' | '"' => self.lex_string(offset, ch)?,
            '.' if self.source[offset + 1..].starts_with(|c: char| c.is_ascii_digit()) => {
                self.lex_number(offset)?
            }
            '.' => self.lex_dots(offset)?,
            _ => {
                self.chars.next();
                match ch {
                    '[' => TokenKind::LBracket,
                    ']' => TokenKind::RBracket,
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    '{' => TokenKind::LBrace,
                    '}' => TokenKind::RBrace,
                    ',' => TokenKind::Comma,
                    ':' => TokenKind::Colon,
                    '|' => TokenKind::Pipe,
                    '=' => TokenKind::Eq,
                    '-' => TokenKind::Minus,
                    other => {
                        return Err(SyntaxError::new(
                            format!("unexpected character '{}'", other),
                            offset,
                        ))
                    }
                }
            }
        };

        Ok(Token { kind, offset })
    }

    fn lex_ident(&mut self) -> TokenKind {
        let mut ident = String::new();
        while let Some(&(_, ch)) = self.chars.peek() {
            if !(ch.is_alphanumeric() || ch == '_') {
                break;
            }
            ident.push(ch);
            self.chars.next();
        }
        TokenKind::Ident(ident)
    }

    /// Integer or float literal. `_` separators are dropped.
    fn lex_number(&mut self, offset: usize) -> Result<TokenKind, SyntaxError> {
        let mut text = String::new();
        let mut is_float = false;

        self.take_digits(&mut text);
        if self.next_if_char('.') {
            is_float = true;
            text.push('.');
            self.take_digits(&mut text);
        }
        if self.next_if_char('e') || self.next_if_char('E') {
            is_float = true;
            text.push('e');
            if self.next_if_char('-') {
                text.push('-');
            } else {
                self.next_if_char('+');
            }
            if !self.take_digits(&mut text) {
                return Err(SyntaxError::new("expected exponent digits", offset));
            }
        }

        if is_float {
            return match text.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(TokenKind::Float(value)),
                _ => Err(SyntaxError::new(
                    format!("float literal {} out of range", text),
                    offset,
                )),
            };
        }
        text.parse::<i64>()
            .map(TokenKind::Int)
            .map_err(|_| SyntaxError::new(format!("integer literal {} out of range", text), offset))
    }

    /// Append ASCII digits to `text`. Returns whether any were read.
    fn take_digits(&mut self, text: &mut String) -> bool {
        let start = text.len();
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch == '_' {
                self.chars.next();
                continue;
            }
            if !ch.is_ascii_digit() {
                break;
            }
            text.push(ch);
            self.chars.next();
        }
        text.len() > start
    }

    fn next_if_char(&mut self, expected: char) -> bool {
        self.chars.next_if(|&(_, c)| c == expected).is_some()
    }

    fn lex_string(&mut self, offset: usize, quote: char) -> Result<TokenKind, SyntaxError> {
        self.chars.next();
        let mut value = String::new();
        loop {
            match self.chars.next() {
                None => return Err(SyntaxError::new("unterminated string literal", offset)),
                Some((_, c)) if c == quote => return Ok(TokenKind::Str(value)),
                Some((_, '\\')) => match self.chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, c)) => value.push(c),
                    None => return Err(SyntaxError::new("unterminated string literal", offset)),
                },
                Some((_, c)) => value.push(c),
            }
        }
    }

    fn lex_dots(&mut self, offset: usize) -> Result<TokenKind, SyntaxError> {
        self.chars.next();
        if self.chars.peek().map(|&(_, c)| c) != Some('.') {
            return Ok(TokenKind::Dot);
        }
        self.chars.next();
        match self.chars.next() {
            Some((_, '.')) => Ok(TokenKind::Ellipsis),
            _ => Err(SyntaxError::new("expected '...'", offset)),
        }
    }
}
