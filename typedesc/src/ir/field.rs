//! Field descriptor definitions.

use indexmap::IndexMap;
use serde::Serialize;

use super::descriptor::TypeDescriptor;

/// Field name to field descriptor, in declaration order.
pub type ModelFields = IndexMap<String, FieldDescriptor>;

/// Normalized description of one declared field of a data-model class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    /// Enriched description of the field's annotation
    pub annotation: TypeDescriptor,

    /// Whether the field must be provided
    pub required: bool,

    /// Whether a literal default or a default factory is declared
    pub has_default: bool,

    /// The literal default, if any
    pub default: Option<serde_json::Value>,

    /// External serialization name
    pub alias: Option<String>,
}

impl FieldDescriptor {
    /// Create a required field with no default and no alias.
    pub fn new(annotation: TypeDescriptor) -> Self {
        Self {
            annotation,
            required: true,
            has_default: false,
            default: None,
            alias: None,
        }
    }

    /// Set the required flag.
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Set the has-default flag.
    pub fn with_has_default(mut self, has_default: bool) -> Self {
        self.has_default = has_default;
        self
    }

    /// Set the literal default.
    pub fn with_default(mut self, default: Option<serde_json::Value>) -> Self {
        self.default = default;
        self
    }

    /// Set the external alias.
    pub fn with_alias(mut self, alias: Option<String>) -> Self {
        self.alias = alias;
        self
    }
}
