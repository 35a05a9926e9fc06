//! Type descriptor definitions.
//!
//! A [`TypeDescriptor`] is the uniform, tagged description of one
//! annotation. Every descriptor serializes with a `kind` discriminant and an
//! `optional` flag; consumers switch on `kind` and nothing else.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::namespace::LiteralValue;

/// Tagged description of one type annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDescriptor {
    /// The kind of type and its payload
    #[serde(flatten)]
    pub kind: DescriptorKind,

    /// Whether the absence type is admitted at this level
    pub optional: bool,

    /// Field metadata, present only on enriched descriptors
    #[serde(flatten)]
    pub enrichment: Option<Enrichment>,
}

impl TypeDescriptor {
    /// Create a descriptor with `optional` unset and no enrichment.
    pub fn new(kind: DescriptorKind) -> Self {
        Self {
            kind,
            optional: false,
            enrichment: None,
        }
    }

    /// `literal` descriptor.
    pub fn literal(values: Vec<LiteralValue>) -> Self {
        Self::new(DescriptorKind::Literal { values })
    }

    /// `union` descriptor.
    pub fn union(options: Vec<TypeDescriptor>, optional: bool) -> Self {
        Self::new(DescriptorKind::Union { options }).with_optional(optional)
    }

    /// `annotated` descriptor.
    pub fn annotated(base: TypeDescriptor, metadata: Vec<TypeDescriptor>) -> Self {
        Self::new(DescriptorKind::Annotated {
            base: Box::new(base),
            metadata,
        })
    }

    /// `model_ref` descriptor.
    pub fn model_ref(name: impl Into<String>) -> Self {
        Self::new(DescriptorKind::ModelRef { name: name.into() })
    }

    /// `type_ref` descriptor.
    pub fn type_ref(name: impl Into<String>) -> Self {
        Self::new(DescriptorKind::TypeRef { name: name.into() })
    }

    /// `type` descriptor.
    pub fn primitive(name: impl Into<String>) -> Self {
        Self::new(DescriptorKind::Type { name: name.into() })
    }

    /// `unknown` descriptor.
    pub fn unknown(repr: impl Into<String>) -> Self {
        Self::new(DescriptorKind::Unknown { repr: repr.into() })
    }

    /// Set the optional flag.
    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Attach field metadata.
    pub fn with_enrichment(mut self, enrichment: Enrichment) -> Self {
        self.enrichment = Some(enrichment);
        self
    }

    /// The `kind` tag as it appears in serialized output.
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    /// The discriminator carried by the enrichment, if any.
    pub fn discriminator(&self) -> Option<&str> {
        self.enrichment
            .as_ref()
            .and_then(|e| e.discriminator.as_deref())
    }

    /// Names of all models and aliases referenced anywhere in this tree.
    ///
    /// Each name is reported once, in first-visit order.
    pub fn references(&self) -> Vec<Reference> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references(&self, out: &mut Vec<Reference>) {
        match &self.kind {
            DescriptorKind::ModelRef { name } => push_unique(out, Reference::Model(name.clone())),
            DescriptorKind::TypeRef { name } => push_unique(out, Reference::Alias(name.clone())),
            DescriptorKind::Union { options } => {
                for option in options {
                    option.collect_references(out);
                }
            }
            DescriptorKind::Annotated { base, metadata } => {
                base.collect_references(out);
                for item in metadata {
                    item.collect_references(out);
                }
            }
            DescriptorKind::Literal { .. }
            | DescriptorKind::Type { .. }
            | DescriptorKind::Unknown { .. } => {}
        }
    }
}

fn push_unique(out: &mut Vec<Reference>, reference: Reference) {
    if !out.contains(&reference) {
        out.push(reference);
    }
}

/// Descriptor kind and payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DescriptorKind {
    /// Permitted literal values, in declaration order
    Literal { values: Vec<LiteralValue> },

    /// One descriptor per union member, in declaration order
    Union { options: Vec<TypeDescriptor> },

    /// Base type plus described metadata items
    Annotated {
        base: Box<TypeDescriptor>,
        metadata: Vec<TypeDescriptor>,
    },

    /// Reference to a data-model class
    ModelRef { name: String },

    /// Reference to a named type alias
    TypeRef { name: String },

    /// Primitive or basic type
    Type { name: String },

    /// Unrecognized annotation, kept as text
    Unknown { repr: String },
}

impl DescriptorKind {
    /// Every `kind` tag, in declaration order.
    pub const NAMES: [&'static str; 7] = [
        "literal",
        "union",
        "annotated",
        "model_ref",
        "type_ref",
        "type",
        "unknown",
    ];

    /// The serialized `kind` tag.
    pub fn name(&self) -> &'static str {
        match self {
            DescriptorKind::Literal { .. } => "literal",
            DescriptorKind::Union { .. } => "union",
            DescriptorKind::Annotated { .. } => "annotated",
            DescriptorKind::ModelRef { .. } => "model_ref",
            DescriptorKind::TypeRef { .. } => "type_ref",
            DescriptorKind::Type { .. } => "type",
            DescriptorKind::Unknown { .. } => "unknown",
        }
    }
}

/// Metadata attached by the field-metadata enricher.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Enrichment {
    /// Sub-field that selects a union variant
    pub discriminator: Option<String>,

    /// Alias, description and extra schema taken from a field descriptor.
    ///
    /// Serializes as `{}` when no descriptor was found, otherwise with all
    /// three keys.
    #[serde(serialize_with = "serialize_field_meta")]
    pub field_meta: Option<FieldMeta>,
}

impl Enrichment {
    /// Enrichment with no discriminator and no field metadata.
    pub fn empty() -> Self {
        Self::default()
    }
}

fn serialize_field_meta<S: Serializer>(
    meta: &Option<FieldMeta>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match meta {
        Some(meta) => meta.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

/// Field metadata values, each possibly absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldMeta {
    pub alias: Option<String>,
    pub description: Option<String>,
    pub json_schema_extra: Option<serde_json::Value>,
}

impl FieldMeta {
    /// Whether no value is present.
    pub fn is_empty(&self) -> bool {
        self.alias.is_none() && self.description.is_none() && self.json_schema_extra.is_none()
    }
}

/// A cross reference found in a descriptor tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reference {
    /// `model_ref` target
    Model(String),
    /// `type_ref` target
    Alias(String),
}

impl Reference {
    /// The referenced name.
    pub fn name(&self) -> &str {
        match self {
            Reference::Model(name) | Reference::Alias(name) => name,
        }
    }
}

/// Compact one-line rendering, e.g. `Union[int, float, NoneType]?`.
impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DescriptorKind::Literal { values } => {
                write!(f, "Literal[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")?;
            }
            DescriptorKind::Union { options } => {
                write!(f, "Union[")?;
                for (i, option) in options.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", option)?;
                }
                write!(f, "]")?;
            }
            DescriptorKind::Annotated { base, metadata } => {
                write!(f, "Annotated[{}", base)?;
                for item in metadata {
                    write!(f, ", {}", item)?;
                }
                write!(f, "]")?;
            }
            DescriptorKind::ModelRef { name } => write!(f, "model:{}", name)?,
            DescriptorKind::TypeRef { name } => write!(f, "alias:{}", name)?,
            DescriptorKind::Type { name } => write!(f, "{}", name)?,
            DescriptorKind::Unknown { repr } => write!(f, "?<{}>", repr)?,
        }
        if self.optional {
            write!(f, "?")?;
        }
        Ok(())
    }
}
