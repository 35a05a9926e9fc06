//! Namespace collection.
//!
//! Discovers the data-model classes and named type aliases bound in a
//! namespace and assembles them into a [`Registry`]. Aliases are inserted
//! first so their names are known when model fields are extracted.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::config::{Config, ModelOrder};
use crate::enricher::FieldMetadataEnricher;
use crate::error::ExtractError;
use crate::extractor::ModelFieldExtractor;
use crate::ir::{Registry, RegistryEntry, TypeDescriptor};
use crate::namespace::{Binding, ModelClass, Namespace};

/// Collects models and aliases from one namespace.
pub struct NamespaceCollector<'a> {
    namespace: &'a Namespace,
    config: Config,
}

impl<'a> NamespaceCollector<'a> {
    /// Create a collector with the default configuration.
    pub fn new(namespace: &'a Namespace) -> Self {
        Self {
            namespace,
            config: Config::default(),
        }
    }

    /// Use the given configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Data-model classes with a public binding, keyed by declared class
    /// name.
    ///
    /// The model base is never included. A class bound under several names
    /// appears once. When two different classes share a declared name the
    /// later binding wins. Order follows `collector.model_order`.
    pub fn collect_models(&self) -> IndexMap<&'a str, &'a ModelClass> {
        let mut models: IndexMap<&'a str, &'a ModelClass> = IndexMap::new();
        for (binding, value) in self.namespace.iter() {
            let Binding::Model(model) = value else {
                continue;
            };
            if self.config.collector.is_private(binding) {
                continue;
            }
            if let Some(previous) = models.insert(model.name.as_str(), model) {
                if previous != model {
                    warn!(
                        model = %model.name,
                        binding = %binding,
                        "Model replaces a different model declared with the same name"
                    );
                }
            }
        }

        if self.config.collector.model_order == ModelOrder::Alphabetical {
            models.sort_keys();
        }
        models
    }

    /// Public bindings whose value is a literal, union or annotated
    /// construct, described with field metadata attached.
    pub fn find_type_aliases(&self) -> IndexMap<String, TypeDescriptor> {
        self.namespace
            .iter()
            .filter(|(name, _)| !self.config.collector.is_private(name))
            .filter_map(|(name, binding)| match binding {
                Binding::Annotation(annotation) if annotation.is_type_construct() => {
                    let descriptor = FieldMetadataEnricher::enrich(annotation);
                    debug!(alias = %name, kind = descriptor.kind_name(), "Collected type alias");
                    Some((name.clone(), descriptor))
                }
                _ => None,
            })
            .collect()
    }

    /// Build the registry: aliases first, then the fields of every model.
    ///
    /// A model bound under an alias's name replaces that alias.
    pub fn collect(&self) -> Result<Registry, ExtractError> {
        let mut registry = Registry::new();

        let aliases = self.find_type_aliases();
        let alias_names: HashSet<String> = aliases.keys().cloned().collect();
        for (name, descriptor) in aliases {
            registry.insert(name, RegistryEntry::Alias(descriptor));
        }

        let extractor = ModelFieldExtractor::new(self.namespace, &self.config.resolver);
        for (name, model) in self.collect_models() {
            let fields = extractor.extract(model, &alias_names)?;
            debug!(model = name, fields = fields.len(), "Extracted model fields");

            if let Some(RegistryEntry::Alias(_)) =
                registry.insert(name, RegistryEntry::Model(fields))
            {
                warn!(name, "Model replaces type alias of the same name");
            }
        }

        debug!(
            namespace = %self.namespace.name,
            entries = registry.len(),
            "Collected namespace"
        );
        Ok(registry)
    }
}
