//! Registry of named descriptions.
//!
//! The registry maps every collected name to either the descriptor of a
//! named type alias or the field descriptors of a data-model class. It
//! keeps insertion order and provides the lookups a downstream generator
//! needs to follow `model_ref` and `type_ref` nodes.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Serialize;

use super::descriptor::{Reference, TypeDescriptor};
use super::field::ModelFields;

/// One registry value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RegistryEntry {
    /// Description of a named type alias
    Alias(TypeDescriptor),

    /// Field descriptors of a data-model class
    Model(ModelFields),
}

impl RegistryEntry {
    /// Cross references made by this entry, deduplicated.
    pub fn references(&self) -> Vec<Reference> {
        match self {
            RegistryEntry::Alias(desc) => desc.references(),
            RegistryEntry::Model(fields) => {
                let mut out: Vec<Reference> = Vec::new();
                for field in fields.values() {
                    for reference in field.annotation.references() {
                        if !out.contains(&reference) {
                            out.push(reference);
                        }
                    }
                }
                out
            }
        }
    }
}

/// Flat, insertion-ordered mapping from name to [`RegistryEntry`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Registry {
    entries: IndexMap<String, RegistryEntry>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Insert an entry, returning the entry it displaced.
    ///
    /// A displaced entry keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, entry: RegistryEntry) -> Option<RegistryEntry> {
        self.entries.insert(name.into(), entry)
    }

    /// Get an entry by name.
    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    /// Check if a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Get the descriptor of a named alias.
    pub fn alias(&self, name: &str) -> Option<&TypeDescriptor> {
        match self.entries.get(name)? {
            RegistryEntry::Alias(desc) => Some(desc),
            RegistryEntry::Model(_) => None,
        }
    }

    /// Get the field descriptors of a model.
    pub fn model(&self, name: &str) -> Option<&ModelFields> {
        match self.entries.get(name)? {
            RegistryEntry::Model(fields) => Some(fields),
            RegistryEntry::Alias(_) => None,
        }
    }

    /// Registered names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &RegistryEntry)> {
        self.entries.iter()
    }

    /// Alias entries in insertion order.
    pub fn aliases(&self) -> impl Iterator<Item = (&String, &TypeDescriptor)> {
        self.entries.iter().filter_map(|(name, entry)| match entry {
            RegistryEntry::Alias(desc) => Some((name, desc)),
            RegistryEntry::Model(_) => None,
        })
    }

    /// Model entries in insertion order.
    pub fn models(&self) -> impl Iterator<Item = (&String, &ModelFields)> {
        self.entries.iter().filter_map(|(name, entry)| match entry {
            RegistryEntry::Model(fields) => Some((name, fields)),
            RegistryEntry::Alias(_) => None,
        })
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names directly referenced by an entry through `model_ref` or
    /// `type_ref` nodes.
    ///
    /// Returns `None` if `name` is not registered. References are reported
    /// as written; targets missing from the registry are still listed.
    pub fn dependencies(&self, name: &str) -> Option<BTreeSet<String>> {
        let entry = self.entries.get(name)?;
        Some(
            entry
                .references()
                .into_iter()
                .map(|r| r.name().to_string())
                .collect(),
        )
    }

    /// Referenced names that are not registered.
    pub fn dangling_references(&self) -> BTreeSet<String> {
        self.entries
            .values()
            .flat_map(RegistryEntry::references)
            .map(|r| r.name().to_string())
            .filter(|name| !self.entries.contains_key(name))
            .collect()
    }

    /// Convert to a JSON value.
    pub fn to_json_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
