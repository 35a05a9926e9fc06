//! Forward-reference resolution.
//!
//! Field annotations are declared in two phases: the raw annotation as
//! written, and the resolved annotation computed here. String annotations
//! are parsed and evaluated against the namespace with typing semantics:
//! - `Optional[X]` and `X | Y` are unions
//! - Unions flatten nested unions and drop duplicate members
//! - `Literal[...]` flattens nested literals and drops duplicate values
//! - `Annotated[Annotated[T, a], b]` is `Annotated[T, a, b]`
//! - `Field(...)` builds a field descriptor; other calls build constraints
//!
//! Named aliases are expanded in place. An alias that refers to itself
//! while being expanded is left as a forward reference.

use tracing::trace;

use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::namespace::{
    Annotation, Binding, Constraint, FieldInfo, LiteralValue, MetadataObject, Namespace,
    RawAnnotation,
};
use crate::parser::{AnnotationParser, Expr};

/// Typing generic aliases and the origin they render with.
const GENERIC_ALIASES: [(&str, &str); 9] = [
    ("List", "typing.List"),
    ("Dict", "typing.Dict"),
    ("Set", "typing.Set"),
    ("FrozenSet", "typing.FrozenSet"),
    ("Tuple", "typing.Tuple"),
    ("Type", "typing.Type"),
    ("Sequence", "typing.Sequence"),
    ("Mapping", "typing.Mapping"),
    ("Iterable", "typing.Iterable"),
];

/// Result of evaluating one expression.
#[derive(Debug, Clone, PartialEq)]
enum Value {
    Annotation(Annotation),
    Form(SpecialForm),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SpecialForm {
    Optional,
    Union,
    Literal,
    Annotated,
    Generic(&'static str),
}

impl SpecialForm {
    fn name(self) -> &'static str {
        match self {
            SpecialForm::Optional => "Optional",
            SpecialForm::Union => "Union",
            SpecialForm::Literal => "Literal",
            SpecialForm::Annotated => "Annotated",
            SpecialForm::Generic(origin) => origin,
        }
    }
}

/// Binds raw annotations to [`Annotation`] values.
pub struct AnnotationResolver<'a> {
    namespace: &'a Namespace,
    config: &'a ResolverConfig,
}

impl<'a> AnnotationResolver<'a> {
    /// Create a resolver over a namespace.
    pub fn new(namespace: &'a Namespace, config: &'a ResolverConfig) -> Self {
        Self { namespace, config }
    }

    /// Resolve a raw field annotation.
    pub fn resolve(&self, raw: &RawAnnotation) -> Result<Annotation, ResolveError> {
        let mut expanding = Vec::new();
        match raw {
            RawAnnotation::Deferred(source) => self.resolve_source(source, &mut expanding),
            RawAnnotation::Evaluated(annotation) => {
                self.bind_forward_refs(annotation, &mut expanding)
            }
        }
    }

    /// Resolve annotation source text.
    pub fn resolve_str(&self, source: &str) -> Result<Annotation, ResolveError> {
        self.resolve_source(source, &mut Vec::new())
    }

    fn resolve_source(
        &self,
        source: &str,
        expanding: &mut Vec<String>,
    ) -> Result<Annotation, ResolveError> {
        let expr = AnnotationParser::parse(source).map_err(|e| ResolveError::Syntax {
            annotation: source.to_string(),
            source: e,
        })?;
        self.eval_annotation(&expr, expanding)
    }

    /// Replace every forward reference inside an evaluated annotation.
    fn bind_forward_refs(
        &self,
        annotation: &Annotation,
        expanding: &mut Vec<String>,
    ) -> Result<Annotation, ResolveError> {
        Ok(match annotation {
            Annotation::ForwardRef(source) => self.resolve_source(source, expanding)?,
            Annotation::Union(members) => Annotation::Union(
                members
                    .iter()
                    .map(|m| self.bind_forward_refs(m, expanding))
                    .collect::<Result<_, _>>()?,
            ),
            // Metadata items are values, not annotations.
            Annotation::Annotated { base, metadata } => Annotation::Annotated {
                base: Box::new(self.bind_forward_refs(base, expanding)?),
                metadata: metadata.clone(),
            },
            Annotation::Generic { origin, args } => Annotation::Generic {
                origin: origin.clone(),
                args: args
                    .iter()
                    .map(|a| self.bind_forward_refs(a, expanding))
                    .collect::<Result<_, _>>()?,
            },
            other => other.clone(),
        })
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    fn eval_annotation(
        &self,
        expr: &Expr,
        expanding: &mut Vec<String>,
    ) -> Result<Annotation, ResolveError> {
        Ok(match self.eval(expr, expanding)? {
            Value::Annotation(annotation) => annotation,
            Value::Form(SpecialForm::Generic(origin)) => Annotation::generic(origin, Vec::new()),
            Value::Form(form) => Annotation::Opaque(format!("typing.{}", form.name())),
        })
    }

    fn eval(&self, expr: &Expr, expanding: &mut Vec<String>) -> Result<Value, ResolveError> {
        match expr {
            Expr::Name(name) => self.lookup(name, expanding),
            Expr::None => Ok(Value::Annotation(Annotation::NoneType)),
            Expr::Str(source) => self
                .resolve_source(source, expanding)
                .map(Value::Annotation),
            Expr::Subscript { target, args } => {
                let target = self.eval(target, expanding)?;
                self.subscript(target, args, expanding).map(Value::Annotation)
            }
            Expr::Call {
                callee,
                args,
                kwargs,
            } => Ok(Value::Annotation(Annotation::Metadata(Self::call(
                callee, args, kwargs,
            )))),
            Expr::BitOr(lhs, rhs) => {
                let lhs = self.eval_annotation(lhs, expanding)?;
                let rhs = self.eval_annotation(rhs, expanding)?;
                Ok(Value::Annotation(normalize_union(vec![lhs, rhs])))
            }
            Expr::Int(_)
            | Expr::Float(_)
            | Expr::Bool(_)
            | Expr::Ellipsis
            | Expr::List(_)
            | Expr::Dict(_) => Ok(Value::Annotation(Annotation::Opaque(expr.to_string()))),
        }
    }

    fn lookup(&self, name: &str, expanding: &mut Vec<String>) -> Result<Value, ResolveError> {
        if let Some(binding) = self.namespace.get(name) {
            let annotation = match binding {
                Binding::Model(model) => Annotation::Model(model.name.clone()),
                Binding::ModelBase(base) => Annotation::Model(base.clone()),
                Binding::Value(value) => Annotation::Opaque(value.to_string()),
                Binding::Annotation(_) if expanding.iter().any(|n| n == name) => {
                    trace!(alias = %name, "Alias refers to itself; keeping forward reference");
                    Annotation::ForwardRef(name.to_string())
                }
                Binding::Annotation(annotation) => {
                    expanding.push(name.to_string());
                    let bound = self.bind_forward_refs(annotation, expanding);
                    expanding.pop();
                    bound?
                }
            };
            return Ok(Value::Annotation(annotation));
        }

        let local = strip_typing_module(name);
        let form = match local {
            "Optional" => Some(SpecialForm::Optional),
            "Union" => Some(SpecialForm::Union),
            "Literal" => Some(SpecialForm::Literal),
            "Annotated" => Some(SpecialForm::Annotated),
            _ => GENERIC_ALIASES
                .iter()
                .find(|(alias, _)| *alias == local)
                .map(|(_, origin)| SpecialForm::Generic(*origin)),
        };
        if let Some(form) = form {
            return Ok(Value::Form(form));
        }

        let annotation = match local {
            "Any" => Annotation::Type("Any".to_string()),
            "NoneType" => Annotation::NoneType,
            _ if self.config.is_builtin(name) => Annotation::Type(name.to_string()),
            _ => {
                return Err(ResolveError::UndefinedName {
                    name: name.to_string(),
                })
            }
        };
        Ok(Value::Annotation(annotation))
    }

    fn subscript(
        &self,
        target: Value,
        args: &[Expr],
        expanding: &mut Vec<String>,
    ) -> Result<Annotation, ResolveError> {
        match target {
            Value::Form(SpecialForm::Optional) => {
                if args.len() != 1 {
                    return Err(ResolveError::InvalidForm {
                        form: "Optional",
                        message: format!("requires a single type, got {}", args.len()),
                    });
                }
                let inner = self.eval_annotation(&args[0], expanding)?;
                Ok(normalize_union(vec![inner, Annotation::NoneType]))
            }
            Value::Form(SpecialForm::Union) => {
                let members = self.eval_all(args, expanding)?;
                Ok(normalize_union(members))
            }
            Value::Form(SpecialForm::Literal) => self.literal(args, expanding),
            Value::Form(SpecialForm::Annotated) => {
                if args.len() < 2 {
                    return Err(ResolveError::InvalidForm {
                        form: "Annotated",
                        message: "requires a type and at least one metadata item".to_string(),
                    });
                }
                let base = self.eval_annotation(&args[0], expanding)?;
                let metadata = args[1..]
                    .iter()
                    .map(|arg| self.eval_metadata(arg, expanding))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(match base {
                    Annotation::Annotated {
                        base,
                        metadata: mut inner,
                    } => {
                        inner.extend(metadata);
                        Annotation::Annotated {
                            base,
                            metadata: inner,
                        }
                    }
                    base => Annotation::annotated(base, metadata),
                })
            }
            Value::Form(SpecialForm::Generic(origin)) => {
                Ok(Annotation::generic(origin, self.eval_all(args, expanding)?))
            }
            Value::Annotation(Annotation::Type(origin))
            | Value::Annotation(Annotation::Model(origin)) => {
                Ok(Annotation::generic(origin, self.eval_all(args, expanding)?))
            }
            Value::Annotation(other) => Err(ResolveError::NotSubscriptable {
                target: other.to_string(),
            }),
        }
    }

    fn eval_all(
        &self,
        args: &[Expr],
        expanding: &mut Vec<String>,
    ) -> Result<Vec<Annotation>, ResolveError> {
        args.iter()
            .map(|arg| self.eval_annotation(arg, expanding))
            .collect()
    }

    /// Evaluate one `Annotated` metadata item.
    ///
    /// Strings and other literal displays are kept as written; only names,
    /// subscripts and calls are evaluated.
    fn eval_metadata(
        &self,
        expr: &Expr,
        expanding: &mut Vec<String>,
    ) -> Result<Annotation, ResolveError> {
        match expr {
            Expr::Name(_) | Expr::Subscript { .. } | Expr::Call { .. } | Expr::BitOr(..) => {
                self.eval_annotation(expr, expanding)
            }
            _ => Ok(Annotation::Opaque(expr.to_string())),
        }
    }

    fn literal(&self, args: &[Expr], expanding: &mut Vec<String>) -> Result<Annotation, ResolveError> {
        let mut values: Vec<LiteralValue> = Vec::new();
        for arg in args {
            let found = match arg {
                Expr::Str(s) => vec![LiteralValue::Str(s.clone())],
                Expr::Int(n) => vec![LiteralValue::Int(*n)],
                Expr::Bool(b) => vec![LiteralValue::Bool(*b)],
                Expr::None => vec![LiteralValue::None],
                Expr::Name(_) | Expr::Subscript { .. } => {
                    match self.eval_annotation(arg, expanding)? {
                        Annotation::Literal(nested) => nested,
                        _ => {
                            return Err(ResolveError::InvalidLiteral {
                                found: arg.to_string(),
                            })
                        }
                    }
                }
                _ => {
                    return Err(ResolveError::InvalidLiteral {
                        found: arg.to_string(),
                    })
                }
            };
            for value in found {
                if !values.contains(&value) {
                    values.push(value);
                }
            }
        }
        Ok(Annotation::Literal(values))
    }

    /// Evaluate a call appearing as annotated-wrapper metadata.
    fn call(callee: &Expr, args: &[Expr], kwargs: &[(String, Expr)]) -> MetadataObject {
        let is_field = matches!(callee, Expr::Name(name) if strip_module(name) == "Field");
        if is_field {
            return MetadataObject::FieldInfo(field_info(kwargs));
        }

        let rendered = args
            .iter()
            .map(|a| a.to_string())
            .chain(kwargs.iter().map(|(k, v)| format!("{}={}", k, v)));
        MetadataObject::Constraint(Constraint::new(callee.to_string(), rendered))
    }
}

/// Build a field descriptor from `Field(...)` keyword arguments.
///
/// Values of the wrong shape are ignored rather than rejected.
fn field_info(kwargs: &[(String, Expr)]) -> FieldInfo {
    let mut info = FieldInfo::new();
    for (key, value) in kwargs {
        let text = match value {
            Expr::Str(s) => Some(s.clone()),
            _ => None,
        };
        match key.as_str() {
            "discriminator" => info.discriminator = text,
            "alias" => info.alias = text,
            "description" => info.description = text,
            "json_schema_extra" => info.json_schema_extra = value.to_json(),
            other => trace!(keyword = %other, "Ignoring Field() keyword"),
        }
    }
    info
}

/// Flatten nested unions and drop duplicate members, keeping the first
/// occurrence of each.
pub fn normalize_union(members: Vec<Annotation>) -> Annotation {
    let mut flat: Vec<Annotation> = Vec::new();
    for member in members {
        let nested = match member {
            Annotation::Union(inner) => inner,
            single => vec![single],
        };
        for item in nested {
            if !flat.contains(&item) {
                flat.push(item);
            }
        }
    }
    Annotation::Union(flat)
}

fn strip_typing_module(name: &str) -> &str {
    name.strip_prefix("typing.")
        .or_else(|| name.strip_prefix("typing_extensions."))
        .unwrap_or(name)
}

fn strip_module(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
