//! Data-model class definitions.
//!
//! A [`ModelClass`] exposes its declared fields in declaration order. Each
//! [`FieldDecl`] keeps its annotation exactly as written ([`RawAnnotation`]);
//! resolution to an [`Annotation`] happens later, against a namespace.

use serde::{Deserialize, Serialize};

use super::annotation::Annotation;

/// A structured record type with introspectable fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelClass {
    /// Declared class name
    pub name: String,

    /// Fields in declaration order
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

impl ModelClass {
    /// Create a model class with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field declaration.
    pub fn with_field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    /// Add multiple field declarations.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDecl>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One declared field of a data-model class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Field name
    pub name: String,

    /// The annotation as written
    pub annotation: RawAnnotation,

    /// Default state
    #[serde(default)]
    pub default: FieldDefault,

    /// External serialization name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl FieldDecl {
    /// Declare a field whose annotation is written as a string.
    pub fn deferred(name: impl Into<String>, annotation: impl Into<String>) -> Self {
        Self::new(name, RawAnnotation::Deferred(annotation.into()))
    }

    /// Declare a field whose annotation is already a type value.
    pub fn evaluated(name: impl Into<String>, annotation: Annotation) -> Self {
        Self::new(name, RawAnnotation::Evaluated(annotation))
    }

    fn new(name: impl Into<String>, annotation: RawAnnotation) -> Self {
        Self {
            name: name.into(),
            annotation,
            default: FieldDefault::Required,
            alias: None,
        }
    }

    /// Set a literal default value.
    pub fn with_default(mut self, value: serde_json::Value) -> Self {
        self.default = FieldDefault::Value(value);
        self
    }

    /// Set a default-producing factory.
    pub fn with_default_factory(mut self, factory: impl Into<String>) -> Self {
        self.default = FieldDefault::Factory(factory.into());
        self
    }

    /// Set the external alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// A field is required when it declares no default of any kind.
    pub fn is_required(&self) -> bool {
        matches!(self.default, FieldDefault::Required)
    }
}

/// A field annotation as declared, before resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAnnotation {
    /// String annotation, bound lazily against the namespace.
    Deferred(String),

    /// Annotation given directly as a type value.
    Evaluated(Annotation),
}

impl RawAnnotation {
    /// The bare name spelled by a string annotation, if it is one.
    ///
    /// Only a plain identifier qualifies; `"Optional[Foo]"` or `" Foo"` do
    /// not.
    pub fn bare_name(&self) -> Option<&str> {
        match self {
            RawAnnotation::Deferred(text) if is_identifier(text) => Some(text),
            _ => None,
        }
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Default state of a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldDefault {
    /// No default; the field is required.
    #[default]
    Required,

    /// A literal default value (`null` included).
    Value(serde_json::Value),

    /// A default-producing factory, by name.
    Factory(String),
}

impl FieldDefault {
    /// Whether any default is declared.
    pub fn is_declared(&self) -> bool {
        !matches!(self, FieldDefault::Required)
    }

    /// The literal default value, if one is declared.
    pub fn value(&self) -> Option<&serde_json::Value> {
        match self {
            FieldDefault::Value(value) => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_name_only_for_identifiers() {
        assert_eq!(
            RawAnnotation::Deferred("DepartmentName".into()).bare_name(),
            Some("DepartmentName")
        );
        assert_eq!(RawAnnotation::Deferred("_Private1".into()).bare_name(), Some("_Private1"));
        assert_eq!(RawAnnotation::Deferred("Optional[int]".into()).bare_name(), None);
        assert_eq!(RawAnnotation::Deferred("typing.Any".into()).bare_name(), None);
        assert_eq!(RawAnnotation::Deferred("".into()).bare_name(), None);
        assert_eq!(RawAnnotation::Deferred("1abc".into()).bare_name(), None);
        assert_eq!(
            RawAnnotation::Evaluated(Annotation::ty("int")).bare_name(),
            None
        );
    }

    #[test]
    fn test_field_default_states() {
        let required = FieldDecl::deferred("sku", "str");
        assert!(required.is_required());
        assert!(!required.default.is_declared());
        assert!(required.default.value().is_none());

        let null_default = FieldDecl::deferred("aisle", "Optional[str]").with_default(json!(null));
        assert!(!null_default.is_required());
        assert!(null_default.default.is_declared());
        assert_eq!(null_default.default.value(), Some(&json!(null)));

        let factory = FieldDecl::deferred("tags", "list[str]").with_default_factory("list");
        assert!(!factory.is_required());
        assert!(factory.default.is_declared());
        assert!(factory.default.value().is_none());
    }

    #[test]
    fn test_model_field_lookup() {
        let model = ModelClass::new("DepartmentInfo")
            .with_field(FieldDecl::deferred("department", "DepartmentName"))
            .with_field(FieldDecl::deferred("aisle", "Optional[int]"));

        assert_eq!(model.fields.len(), 2);
        assert!(model.field("aisle").is_some());
        assert!(model.field("shelf").is_none());
    }

    #[test]
    fn test_raw_annotation_deserializes_strings_as_deferred() {
        let raw: RawAnnotation = serde_json::from_value(json!("Optional[int]")).unwrap();
        assert_eq!(raw, RawAnnotation::Deferred("Optional[int]".into()));

        let raw: RawAnnotation = serde_json::from_value(json!({ "type": "int" })).unwrap();
        assert_eq!(raw, RawAnnotation::Evaluated(Annotation::ty("int")));
    }
}
