//! Model field extraction.
//!
//! Builds the [`ModelFields`] of one data-model class. Every annotation is
//! resolved first, so a class with one unresolvable field fails as a whole.
//! A field whose raw annotation is the bare name of a collected alias is
//! emitted as a `type_ref` to that alias instead of its expansion.

use std::collections::HashSet;

use tracing::trace;

use crate::config::ResolverConfig;
use crate::enricher::FieldMetadataEnricher;
use crate::error::ExtractError;
use crate::ir::{Enrichment, FieldDescriptor, ModelFields, TypeDescriptor};
use crate::namespace::{Annotation, FieldDecl, ModelClass, Namespace};
use crate::resolver::AnnotationResolver;

/// Extracts field descriptors from data-model classes of one namespace.
pub struct ModelFieldExtractor<'a> {
    resolver: AnnotationResolver<'a>,
}

impl<'a> ModelFieldExtractor<'a> {
    /// Create an extractor resolving names against `namespace`.
    pub fn new(namespace: &'a Namespace, config: &'a ResolverConfig) -> Self {
        Self {
            resolver: AnnotationResolver::new(namespace, config),
        }
    }

    /// Extract the field descriptors of `model`, in declaration order.
    pub fn extract(
        &self,
        model: &ModelClass,
        aliases: &HashSet<String>,
    ) -> Result<ModelFields, ExtractError> {
        let resolved = model
            .fields
            .iter()
            .map(|field| {
                self.resolver
                    .resolve(&field.annotation)
                    .map_err(|source| ExtractError::Resolution {
                        model: model.name.clone(),
                        field: field.name.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut fields = ModelFields::new();
        for (field, annotation) in model.fields.iter().zip(&resolved) {
            let descriptor = Self::describe_field(&model.name, field, annotation, aliases);
            fields.insert(field.name.clone(), descriptor);
        }
        Ok(fields)
    }

    fn describe_field(
        model: &str,
        field: &FieldDecl,
        annotation: &Annotation,
        aliases: &HashSet<String>,
    ) -> FieldDescriptor {
        let described = match field.annotation.bare_name() {
            Some(name) if aliases.contains(name) => {
                trace!(model, field = %field.name, alias = name, "Field refers to a named alias");
                TypeDescriptor::type_ref(name).with_enrichment(Enrichment::empty())
            }
            _ => FieldMetadataEnricher::enrich(annotation),
        };
        trace!(model, field = %field.name, annotation = %described, "Described field");

        let alias = field.alias.clone().or_else(|| {
            FieldMetadataEnricher::field_descriptor(annotation)
                .and_then(|descriptor| descriptor.alias())
                .map(str::to_string)
        });

        FieldDescriptor::new(described)
            .with_required(field.is_required())
            .with_has_default(field.default.is_declared())
            .with_default(field.default.value().cloned())
            .with_alias(alias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use crate::namespace::FieldInfo;
    use serde_json::json;

    fn catalog() -> Namespace {
        Namespace::new("catalog")
            .with_alias(
                "DepartmentName",
                Annotation::literal(["Clothing", "Electronics", "Grocery", "Furniture"]),
            )
            .with_model(ModelClass::new("DepartmentInfo"))
    }

    fn alias_names(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn extract(model: &ModelClass, aliases: &[&str]) -> Result<ModelFields, ExtractError> {
        let ns = catalog();
        let config = ResolverConfig::default();
        ModelFieldExtractor::new(&ns, &config).extract(model, &alias_names(aliases))
    }

    // =========================================================================
    // Alias Short-Circuit
    // =========================================================================

    #[test]
    fn test_bare_alias_name_becomes_type_ref() {
        let model = ModelClass::new("DepartmentInfo")
            .with_field(FieldDecl::deferred("name", "DepartmentName"));

        let fields = extract(&model, &["DepartmentName"]).unwrap();
        assert_eq!(
            serde_json::to_value(&fields["name"]).unwrap(),
            json!({
                "annotation": {
                    "kind": "type_ref",
                    "name": "DepartmentName",
                    "optional": false,
                    "discriminator": null,
                    "field_meta": {}
                },
                "required": true,
                "has_default": false,
                "default": null,
                "alias": null
            })
        );
    }

    #[test]
    fn test_alias_inside_expression_is_expanded() {
        let model = ModelClass::new("DepartmentInfo")
            .with_field(FieldDecl::deferred("name", "Optional[DepartmentName]"));

        let fields = extract(&model, &["DepartmentName"]).unwrap();
        let annotation = &fields["name"].annotation;
        assert_eq!(annotation.kind_name(), "union");
        assert!(annotation.optional);
    }

    #[test]
    fn test_alias_outside_the_alias_set_is_expanded() {
        let model = ModelClass::new("DepartmentInfo")
            .with_field(FieldDecl::deferred("name", "DepartmentName"));

        let fields = extract(&model, &[]).unwrap();
        assert_eq!(fields["name"].annotation.kind_name(), "literal");
    }

    #[test]
    fn test_evaluated_annotation_never_short_circuits() {
        let model = ModelClass::new("DepartmentInfo").with_field(FieldDecl::evaluated(
            "name",
            Annotation::literal(["Clothing"]),
        ));

        let fields = extract(&model, &["DepartmentName"]).unwrap();
        assert_eq!(fields["name"].annotation.kind_name(), "literal");
    }

    // =========================================================================
    // Defaults and Aliases
    // =========================================================================

    #[test]
    fn test_default_states() {
        let model = ModelClass::new("Product").with_fields([
            FieldDecl::deferred("id", "int"),
            FieldDecl::deferred("note", "Optional[str]").with_default(json!(null)),
            FieldDecl::deferred("stock", "int").with_default(json!(0)),
            FieldDecl::deferred("tags", "list[str]").with_default_factory("list"),
        ]);

        let fields = extract(&model, &[]).unwrap();

        let id = &fields["id"];
        assert!(id.required && !id.has_default && id.default.is_none());

        let note = &fields["note"];
        assert!(!note.required && note.has_default);
        assert_eq!(note.default, Some(json!(null)));

        assert_eq!(fields["stock"].default, Some(json!(0)));

        let tags = &fields["tags"];
        assert!(!tags.required && tags.has_default && tags.default.is_none());
    }

    #[test]
    fn test_declared_alias_wins_over_field_info_alias() {
        let model = ModelClass::new("Product").with_fields([
            FieldDecl::deferred("sku", "Annotated[str, Field(alias='SKU')]"),
            FieldDecl::deferred("ean", "Annotated[str, Field(alias='EAN')]").with_alias("barcode"),
            FieldDecl::deferred("name", "str"),
        ]);

        let fields = extract(&model, &[]).unwrap();
        assert_eq!(fields["sku"].alias.as_deref(), Some("SKU"));
        assert_eq!(fields["ean"].alias.as_deref(), Some("barcode"));
        assert_eq!(fields["name"].alias, None);
    }

    #[test]
    fn test_field_order_is_declaration_order() {
        let model = ModelClass::new("Product").with_fields([
            FieldDecl::deferred("zeta", "int"),
            FieldDecl::deferred("alpha", "int"),
            FieldDecl::deferred("mid", "int"),
        ]);

        let fields = extract(&model, &[]).unwrap();
        let names: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_metadata_enrichment_on_field() {
        let model = ModelClass::new("Product").with_field(FieldDecl::evaluated(
            "price",
            Annotation::annotated(
                Annotation::ty("float"),
                [Annotation::metadata(
                    FieldInfo::new().with_description("Unit price"),
                )],
            ),
        ));

        let fields = extract(&model, &[]).unwrap();
        let value = serde_json::to_value(&fields["price"].annotation).unwrap();
        assert_eq!(value["field_meta"], json!({ "alias": null, "description": "Unit price", "json_schema_extra": null }));
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn test_unresolvable_field_names_model_and_field() {
        let model = ModelClass::new("Product").with_fields([
            FieldDecl::deferred("id", "int"),
            FieldDecl::deferred("details", "ProductDetail"),
        ]);

        let err = extract(&model, &[]).unwrap_err();
        assert_eq!(
            err,
            ExtractError::Resolution {
                model: "Product".into(),
                field: "details".into(),
                source: ResolveError::UndefinedName {
                    name: "ProductDetail".into()
                },
            }
        );
    }

    #[test]
    fn test_unresolvable_short_circuit_candidate_still_fails() {
        let model =
            ModelClass::new("Product").with_field(FieldDecl::deferred("details", "Missing"));

        let err = extract(&model, &["Missing"]).unwrap_err();
        assert_eq!(err.field(), "details");
    }
}
