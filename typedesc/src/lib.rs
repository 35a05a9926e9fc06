//! # typedesc
//!
//! Normalized descriptions of the data-model classes and named type aliases
//! bound in a namespace.
//!
//! Every annotation is described as a tagged [`TypeDescriptor`] with a
//! `kind` (`literal`, `union`, `annotated`, `model_ref`, `type_ref`, `type`
//! or `unknown`) and an `optional` flag. The collected [`Registry`] maps each
//! alias name to its descriptor and each model name to its field
//! descriptors, ready for downstream schema tooling.
//!
//! ## Usage
//!
//! ```rust
//! use typedesc::{Annotation, FieldDecl, ModelClass, Namespace};
//!
//! let ns = Namespace::new("catalog")
//!     .with_alias(
//!         "DepartmentName",
//!         Annotation::literal(["Clothing", "Electronics"]),
//!     )
//!     .with_model(ModelClass::new("DepartmentInfo").with_fields([
//!         FieldDecl::deferred("name", "DepartmentName"),
//!         FieldDecl::deferred("floor", "Optional[int]"),
//!     ]));
//!
//! let registry = typedesc::collect(&ns)?;
//! let fields = registry.model("DepartmentInfo").unwrap();
//!
//! assert_eq!(fields["name"].annotation.kind_name(), "type_ref");
//! assert!(fields["floor"].annotation.optional);
//! # Ok::<(), typedesc::Error>(())
//! ```
//!
//! ## Pipeline
//!
//! - [`NamespaceCollector`] finds aliases and models and builds the registry
//! - [`ModelFieldExtractor`] resolves and describes each model field
//! - [`FieldMetadataEnricher`] attaches discriminator and field metadata
//! - [`AnnotationDescriber`] produces the descriptor tree
//!
//! String annotations are parsed and bound against the namespace by
//! [`AnnotationResolver`].

pub mod collector;
pub mod config;
pub mod describer;
pub mod enricher;
pub mod error;
pub mod extractor;
pub mod ir;
pub mod namespace;
pub mod parser;
pub mod resolver;

pub use collector::NamespaceCollector;
pub use config::{Config, ConfigManager};
pub use describer::AnnotationDescriber;
pub use enricher::FieldMetadataEnricher;
pub use error::{ConfigError, Error, ExtractError, ResolveError, Result};
pub use extractor::ModelFieldExtractor;
pub use ir::{
    DescriptorKind, Enrichment, FieldDescriptor, FieldMeta, ModelFields, Registry, RegistryEntry,
    TypeDescriptor,
};
pub use namespace::{
    Annotation, Binding, FieldDecl, FieldDefault, FieldInfo, LiteralValue, ModelClass, Namespace,
    RawAnnotation,
};
pub use resolver::AnnotationResolver;

/// Collect a namespace with the default configuration.
pub fn collect(namespace: &Namespace) -> Result<Registry> {
    Ok(NamespaceCollector::new(namespace).collect()?)
}

/// Collect a namespace with an explicit configuration.
pub fn collect_with_config(namespace: &Namespace, config: Config) -> Result<Registry> {
    Ok(NamespaceCollector::new(namespace)
        .with_config(config)
        .collect()?)
}
