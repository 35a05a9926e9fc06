//! Annotation value definitions.
//!
//! This module defines the closed set of annotation shapes the describer
//! understands. An [`Annotation`] is the resolved form of a field or alias
//! annotation: forward references have been bound (or deliberately left as
//! [`Annotation::ForwardRef`]) and typing forms have been normalized.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A resolved type annotation.
///
/// Every shape that is not one of the recognized typing constructs still
/// has a variant here, so that describing an annotation can never fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Annotation {
    /// `Literal[v1, v2, ...]`, values in declaration order.
    Literal(Vec<LiteralValue>),

    /// `Union[A, B, ...]`, members in declaration order.
    Union(Vec<Annotation>),

    /// `Annotated[base, m1, m2, ...]`.
    Annotated {
        base: Box<Annotation>,
        metadata: Vec<Annotation>,
    },

    /// A data-model class, by its declared class name.
    Model(String),

    /// Any other concrete type object (`int`, `str`, `date`, ...).
    Type(String),

    /// The absence pseudo-type.
    NoneType,

    /// A parameterised container such as `list[int]` or `Dict[str, int]`.
    Generic {
        origin: String,
        #[serde(default)]
        args: Vec<Annotation>,
    },

    /// A string reference that has not been bound to a type.
    ForwardRef(String),

    /// A metadata object carried inside an annotated wrapper.
    Metadata(MetadataObject),

    /// Any other value, kept as its textual rendering.
    Opaque(String),
}

impl Annotation {
    /// Create a literal annotation.
    pub fn literal(values: impl IntoIterator<Item = impl Into<LiteralValue>>) -> Self {
        Annotation::Literal(values.into_iter().map(Into::into).collect())
    }

    /// Create a union annotation without any normalization.
    pub fn union(members: impl IntoIterator<Item = Annotation>) -> Self {
        Annotation::Union(members.into_iter().collect())
    }

    /// Create `Union[inner, None]`.
    pub fn optional(inner: Annotation) -> Self {
        Annotation::Union(vec![inner, Annotation::NoneType])
    }

    /// Create an annotated wrapper around `base`.
    pub fn annotated(base: Annotation, metadata: impl IntoIterator<Item = Annotation>) -> Self {
        Annotation::Annotated {
            base: Box::new(base),
            metadata: metadata.into_iter().collect(),
        }
    }

    /// Reference a data-model class by name.
    pub fn model(name: impl Into<String>) -> Self {
        Annotation::Model(name.into())
    }

    /// Reference a concrete type object by name.
    pub fn ty(name: impl Into<String>) -> Self {
        Annotation::Type(name.into())
    }

    /// Create a parameterised container annotation.
    pub fn generic(origin: impl Into<String>, args: impl IntoIterator<Item = Annotation>) -> Self {
        Annotation::Generic {
            origin: origin.into(),
            args: args.into_iter().collect(),
        }
    }

    /// Create an unresolved string reference.
    pub fn forward_ref(name: impl Into<String>) -> Self {
        Annotation::ForwardRef(name.into())
    }

    /// Wrap a metadata object.
    pub fn metadata(object: impl Into<MetadataObject>) -> Self {
        Annotation::Metadata(object.into())
    }

    /// Whether this is one of the typing constructs a named alias can be
    /// bound to: a literal, union or annotated wrapper.
    pub fn is_type_construct(&self) -> bool {
        matches!(
            self,
            Annotation::Literal(_) | Annotation::Union(_) | Annotation::Annotated { .. }
        )
    }

    /// Whether this is the absence pseudo-type.
    pub fn is_none_type(&self) -> bool {
        matches!(self, Annotation::NoneType)
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::Literal(values) => {
                write!(f, "typing.Literal[")?;
                write_joined(f, values)?;
                write!(f, "]")
            }
            Annotation::Union(members) => {
                write!(f, "typing.Union[")?;
                write_joined(f, members)?;
                write!(f, "]")
            }
            Annotation::Annotated { base, metadata } => {
                write!(f, "typing.Annotated[{}", base)?;
                for item in metadata {
                    write!(f, ", {}", item)?;
                }
                write!(f, "]")
            }
            Annotation::Model(name) | Annotation::Type(name) => write!(f, "{}", name),
            Annotation::NoneType => write!(f, "NoneType"),
            Annotation::Generic { origin, args } => {
                write!(f, "{}", origin)?;
                if !args.is_empty() {
                    write!(f, "[")?;
                    write_joined(f, args)?;
                    write!(f, "]")?;
                }
                Ok(())
            }
            Annotation::ForwardRef(name) => write!(f, "ForwardRef('{}')", name),
            Annotation::Metadata(object) => write!(f, "{}", object),
            Annotation::Opaque(text) => write!(f, "{}", text),
        }
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// A value permitted by a literal type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    None,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        LiteralValue::Str(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        LiteralValue::Str(value)
    }
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        LiteralValue::Int(value)
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        LiteralValue::Bool(value)
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::None => write!(f, "None"),
            LiteralValue::Bool(true) => write!(f, "True"),
            LiteralValue::Bool(false) => write!(f, "False"),
            LiteralValue::Int(n) => write!(f, "{}", n),
            LiteralValue::Str(s) => write!(f, "'{}'", s.replace('\'', "\\'")),
        }
    }
}

/// Read access to the attributes of a field-descriptor object.
///
/// Metadata items are scanned for this capability rather than for one
/// concrete type. Every attribute is optional: a descriptor that lacks
/// one simply reports `None`.
pub trait FieldDescriptorLike {
    /// Name of the sub-field that selects a union variant.
    fn discriminator(&self) -> Option<&str>;

    /// External serialization name.
    fn alias(&self) -> Option<&str>;

    /// Human readable description.
    fn description(&self) -> Option<&str>;

    /// Open-ended extra schema data.
    fn json_schema_extra(&self) -> Option<&serde_json::Value>;
}

/// An object carried as annotated-wrapper metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataObject {
    /// A field descriptor, as produced by `Field(...)`.
    FieldInfo(FieldInfo),

    /// A validation constraint (`MaxLen(32)`, `Gt(0)`, ...).
    Constraint(Constraint),
}

impl MetadataObject {
    /// Returns the object as a field descriptor if it has that capability.
    pub fn as_field_descriptor(&self) -> Option<&dyn FieldDescriptorLike> {
        match self {
            MetadataObject::FieldInfo(info) => Some(info),
            MetadataObject::Constraint(_) => None,
        }
    }
}

impl From<FieldInfo> for MetadataObject {
    fn from(info: FieldInfo) -> Self {
        MetadataObject::FieldInfo(info)
    }
}

impl From<Constraint> for MetadataObject {
    fn from(constraint: Constraint) -> Self {
        MetadataObject::Constraint(constraint)
    }
}

impl fmt::Display for MetadataObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataObject::FieldInfo(info) => write!(f, "{}", info),
            MetadataObject::Constraint(constraint) => write!(f, "{}", constraint),
        }
    }
}

/// Field descriptor metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_schema_extra: Option<serde_json::Value>,
}

impl FieldInfo {
    /// Create an empty field descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the discriminator field name.
    pub fn with_discriminator(mut self, discriminator: impl Into<String>) -> Self {
        self.discriminator = Some(discriminator.into());
        self
    }

    /// Set the external alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the extra schema value.
    pub fn with_json_schema_extra(mut self, extra: serde_json::Value) -> Self {
        self.json_schema_extra = Some(extra);
        self
    }
}

impl FieldDescriptorLike for FieldInfo {
    fn discriminator(&self) -> Option<&str> {
        self.discriminator.as_deref()
    }

    fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn json_schema_extra(&self) -> Option<&serde_json::Value> {
        self.json_schema_extra.as_ref()
    }
}

impl fmt::Display for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(discriminator) = &self.discriminator {
            parts.push(format!("discriminator='{}'", discriminator));
        }
        if let Some(alias) = &self.alias {
            parts.push(format!("alias='{}'", alias));
        }
        if let Some(description) = &self.description {
            parts.push(format!("description='{}'", description));
        }
        if let Some(extra) = &self.json_schema_extra {
            parts.push(format!("json_schema_extra={}", extra));
        }
        write!(f, "FieldInfo({})", parts.join(", "))
    }
}

/// A constraint object, kept by name and rendered arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Constraint {
    /// Create a constraint with the given name and rendered arguments.
    pub fn new(name: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.args.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_construct_detection() {
        assert!(Annotation::literal(["a"]).is_type_construct());
        assert!(Annotation::optional(Annotation::ty("int")).is_type_construct());
        assert!(Annotation::annotated(Annotation::ty("int"), Vec::new()).is_type_construct());
        assert!(!Annotation::ty("int").is_type_construct());
        assert!(!Annotation::model("Product").is_type_construct());
        assert!(!Annotation::generic("list", [Annotation::ty("int")]).is_type_construct());
    }

    #[test]
    fn test_display_renders_typing_forms() {
        let ann = Annotation::union([
            Annotation::literal(["low", "high"]),
            Annotation::ty("int"),
            Annotation::NoneType,
        ]);
        assert_eq!(
            ann.to_string(),
            "typing.Union[typing.Literal['low', 'high'], int, NoneType]"
        );

        let list = Annotation::generic("list", [Annotation::forward_ref("Tree")]);
        assert_eq!(list.to_string(), "list[ForwardRef('Tree')]");
    }

    #[test]
    fn test_display_metadata_objects() {
        let info = FieldInfo::new().with_discriminator("kind").with_alias("k");
        assert_eq!(
            Annotation::metadata(info).to_string(),
            "FieldInfo(discriminator='kind', alias='k')"
        );

        let constraint = Constraint::new("MaxLen", ["32"]);
        assert_eq!(Annotation::metadata(constraint).to_string(), "MaxLen(32)");
    }

    #[test]
    fn test_literal_value_display() {
        assert_eq!(LiteralValue::None.to_string(), "None");
        assert_eq!(LiteralValue::Bool(true).to_string(), "True");
        assert_eq!(LiteralValue::Int(-3).to_string(), "-3");
        assert_eq!(LiteralValue::from("it's").to_string(), "'it\\'s'");
    }

    #[test]
    fn test_literal_value_serializes_as_scalar() {
        let values = vec![
            LiteralValue::from("XS"),
            LiteralValue::Int(1),
            LiteralValue::Bool(false),
            LiteralValue::None,
        ];
        let json = serde_json::to_value(&values).unwrap();
        assert_eq!(json, serde_json::json!(["XS", 1, false, null]));
    }

    #[test]
    fn test_field_descriptor_capability() {
        let info = MetadataObject::from(FieldInfo::new().with_description("Primary key"));
        let descriptor = info.as_field_descriptor().unwrap();
        assert_eq!(descriptor.description(), Some("Primary key"));
        assert_eq!(descriptor.discriminator(), None);

        let constraint = MetadataObject::from(Constraint::new("Gt", ["0"]));
        assert!(constraint.as_field_descriptor().is_none());
    }
}
