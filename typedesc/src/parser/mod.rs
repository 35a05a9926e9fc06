//! Parsing of string annotations.
//!
//! Annotations written as strings (forward references) are parsed into an
//! [`Expr`] tree here and evaluated against a namespace by the resolver.
//! The grammar covers the expression subset used in annotations:
//! - Dotted names (`int`, `typing.Optional`)
//! - Subscripts (`Union[int, None]`) and calls (`Field(discriminator="kind")`)
//! - String, integer, float, boolean and `None` literals, `...`
//! - List and dict displays, parentheses and the `|` operator

pub mod annotation_parser;
pub mod lexer;

pub use annotation_parser::AnnotationParser;

use std::fmt;

/// Error type for annotation syntax failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} at offset {offset}")]
pub struct SyntaxError {
    pub message: String,
    pub offset: usize,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

/// Parsed annotation expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Dotted name, segments joined by `.`
    Name(String),
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
    Ellipsis,
    List(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Subscript {
        target: Box<Expr>,
        args: Vec<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
    },
    /// `lhs | rhs`
    BitOr(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Convert a literal display to JSON. Returns `None` for anything that
    /// is not built from literals.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        use serde_json::Value;

        match self {
            Expr::Str(s) => Some(Value::String(s.clone())),
            Expr::Int(n) => Some(Value::from(*n)),
            Expr::Float(x) => serde_json::Number::from_f64(*x).map(Value::Number),
            Expr::Bool(b) => Some(Value::Bool(*b)),
            Expr::None => Some(Value::Null),
            Expr::List(items) => items
                .iter()
                .map(Expr::to_json)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            Expr::Dict(entries) => {
                let mut map = serde_json::Map::new();
                for (key, value) in entries {
                    let Expr::Str(key) = key else {
                        return None;
                    };
                    map.insert(key.clone(), value.to_json()?);
                }
                Some(Value::Object(map))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Name(name) => write!(f, "{}", name),
            Expr::Str(s) => write!(f, "'{}'", s.replace('\'', "\\'")),
            Expr::Int(n) => write!(f, "{}", n),
            Expr::Float(x) => write!(f, "{:?}", x),
            Expr::Bool(true) => write!(f, "True"),
            Expr::Bool(false) => write!(f, "False"),
            Expr::None => write!(f, "None"),
            Expr::Ellipsis => write!(f, "..."),
            Expr::List(items) => {
                write!(f, "[")?;
                write_joined(f, items)?;
                write!(f, "]")
            }
            Expr::Dict(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Expr::Subscript { target, args } => {
                write!(f, "{}[", target)?;
                write_joined(f, args)?;
                write!(f, "]")
            }
            Expr::Call {
                callee,
                args,
                kwargs,
            } => {
                write!(f, "{}(", callee)?;
                write_joined(f, args)?;
                for (i, (name, value)) in kwargs.iter().enumerate() {
                    if i > 0 || !args.is_empty() {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", name, value)?;
                }
                write!(f, ")")
            }
            Expr::BitOr(lhs, rhs) => write!(f, "{} | {}", lhs, rhs),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_json_literal_displays() {
        let expr = AnnotationParser::parse(
            r#"{"examples": ["a", 1, 2.5], "nullable": True, "x": None}"#,
        )
        .unwrap();
        assert_eq!(
            expr.to_json(),
            Some(json!({ "examples": ["a", 1, 2.5], "nullable": true, "x": null }))
        );
    }

    #[test]
    fn test_to_json_rejects_names() {
        let expr = AnnotationParser::parse("[int]").unwrap();
        assert_eq!(expr.to_json(), None);

        let expr = AnnotationParser::parse("{1: 'a'}").unwrap();
        assert_eq!(expr.to_json(), None);
    }

    #[test]
    fn test_display_round_trips_through_parser() {
        for source in [
            "Optional[int]",
            "Annotated[str, Field(alias='sku', max_length=32)]",
            "dict[str, list[int]] | None",
            "Literal['a', -1, True]",
            "Annotated[float, Gt(0.5), Field(le=1e20)]",
        ] {
            let expr = AnnotationParser::parse(source).unwrap();
            let reparsed = AnnotationParser::parse(&expr.to_string()).unwrap();
            assert_eq!(expr, reparsed, "source: {}", source);
        }
    }
}
