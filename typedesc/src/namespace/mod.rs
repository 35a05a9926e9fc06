//! Namespace input model.
//!
//! A [`Namespace`] is the read-only set of top-level bindings the collector
//! scans: data-model classes, named type annotations, imported type objects
//! and plain values. Bindings keep their insertion order.

pub mod annotation;
pub mod model;

pub use annotation::{
    Annotation, Constraint, FieldDescriptorLike, FieldInfo, LiteralValue, MetadataObject,
};
pub use model::{FieldDecl, FieldDefault, ModelClass, RawAnnotation};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A value bound to a top-level name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Binding {
    /// A data-model class.
    Model(ModelClass),

    /// The abstract base every data-model class derives from.
    ModelBase(String),

    /// A type annotation or type object.
    Annotation(Annotation),

    /// A plain value.
    Value(LiteralValue),
}

/// Enumerable bindings of names to values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    /// Namespace name, for diagnostics
    #[serde(default)]
    pub name: String,

    /// Bindings in insertion order
    #[serde(default)]
    pub bindings: IndexMap<String, Binding>,
}

impl Namespace {
    /// Create an empty namespace.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: IndexMap::new(),
        }
    }

    /// Bind `name`, replacing any earlier binding of the same name.
    pub fn bind(&mut self, name: impl Into<String>, binding: Binding) -> Option<Binding> {
        self.bindings.insert(name.into(), binding)
    }

    /// Look up a binding.
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Iterate bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Binding)> {
        self.bindings.iter()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the namespace has no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    // Builder-style binding helpers

    /// Bind a data-model class under its declared name.
    pub fn with_model(mut self, model: ModelClass) -> Self {
        self.bind(model.name.clone(), Binding::Model(model));
        self
    }

    /// Bind a named type annotation.
    pub fn with_alias(mut self, name: impl Into<String>, annotation: Annotation) -> Self {
        self.bind(name, Binding::Annotation(annotation));
        self
    }

    /// Bind an imported type object under its own name.
    pub fn with_type(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.bind(name.clone(), Binding::Annotation(Annotation::Type(name)));
        self
    }

    /// Bind the abstract model base under its own name.
    pub fn with_model_base(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.bind(name.clone(), Binding::ModelBase(name));
        self
    }

    /// Bind a plain value.
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<LiteralValue>) -> Self {
        self.bind(name, Binding::Value(value.into()));
        self
    }
}
