//! Intermediate Representation (IR) module.
//!
//! This module defines the descriptors produced by the describer, the
//! enricher and the field extractor, and the registry that collects them.
//! The IR is consumed by downstream schema tooling such as DDL generators.

pub mod descriptor;
pub mod field;
pub mod registry;

pub use descriptor::{DescriptorKind, Enrichment, FieldMeta, Reference, TypeDescriptor};
pub use field::{FieldDescriptor, ModelFields};
pub use registry::{Registry, RegistryEntry};
