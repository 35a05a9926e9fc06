//! Field-metadata enrichment.
//!
//! An `Annotated[T, ...]` wrapper may carry a field descriptor among its
//! metadata items. The enricher finds the first one and copies its
//! discriminator, alias, description and extra schema onto the descriptor
//! produced by [`AnnotationDescriber`].

use crate::describer::AnnotationDescriber;
use crate::ir::{Enrichment, FieldMeta, TypeDescriptor};
use crate::namespace::{Annotation, FieldDescriptorLike};

/// Describes annotations and attaches field metadata.
pub struct FieldMetadataEnricher;

impl FieldMetadataEnricher {
    /// Describe an annotation with `discriminator` and `field_meta` attached.
    ///
    /// Both keys are always present on the result, null or empty when the
    /// annotation carries no field descriptor. A matched descriptor fills
    /// every `field_meta` key, null where it has no value.
    pub fn enrich(annotation: &Annotation) -> TypeDescriptor {
        let enrichment = match Self::field_descriptor(annotation) {
            Some(descriptor) => Enrichment {
                discriminator: descriptor.discriminator().map(str::to_string),
                field_meta: Some(FieldMeta {
                    alias: descriptor.alias().map(str::to_string),
                    description: descriptor.description().map(str::to_string),
                    json_schema_extra: descriptor.json_schema_extra().cloned(),
                }),
            },
            None => Enrichment::empty(),
        };

        AnnotationDescriber::describe(annotation).with_enrichment(enrichment)
    }

    /// The first field descriptor among an annotated wrapper's metadata.
    ///
    /// Only the top-level wrapper is inspected; metadata nested deeper in
    /// the annotation is ignored.
    pub fn field_descriptor(annotation: &Annotation) -> Option<&dyn FieldDescriptorLike> {
        let Annotation::Annotated { metadata, .. } = annotation else {
            return None;
        };
        metadata.iter().find_map(|item| match item {
            Annotation::Metadata(object) => object.as_field_descriptor(),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::{Constraint, FieldInfo};
    use serde_json::json;

    fn product_details() -> Annotation {
        Annotation::annotated(
            Annotation::union([
                Annotation::model("ClothingDetails"),
                Annotation::model("ElectronicsDetails"),
            ]),
            [Annotation::metadata(FieldInfo::new().with_discriminator("kind"))],
        )
    }

    #[test]
    fn test_discriminator_is_propagated() {
        let descriptor = FieldMetadataEnricher::enrich(&product_details());

        assert_eq!(descriptor.kind_name(), "annotated");
        assert_eq!(descriptor.discriminator(), Some("kind"));
        assert_eq!(
            serde_json::to_value(&descriptor).unwrap()["field_meta"],
            json!({ "alias": null, "description": null, "json_schema_extra": null })
        );
    }

    #[test]
    fn test_tree_shape_matches_describer() {
        let annotation = product_details();
        let enriched = FieldMetadataEnricher::enrich(&annotation);
        let described = AnnotationDescriber::describe(&annotation);

        assert_eq!(enriched.kind, described.kind);
        assert_eq!(enriched.optional, described.optional);
    }

    #[test]
    fn test_first_field_descriptor_wins() {
        let annotation = Annotation::annotated(
            Annotation::ty("str"),
            [
                Annotation::metadata(Constraint::new("MaxLen", ["32"])),
                Annotation::metadata(
                    FieldInfo::new()
                        .with_alias("sku")
                        .with_description("Stock keeping unit")
                        .with_json_schema_extra(json!({ "examples": ["AB-1"] })),
                ),
                Annotation::metadata(FieldInfo::new().with_alias("ignored")),
            ],
        );

        let value = serde_json::to_value(FieldMetadataEnricher::enrich(&annotation)).unwrap();
        assert_eq!(value["discriminator"], json!(null));
        assert_eq!(
            value["field_meta"],
            json!({
                "alias": "sku",
                "description": "Stock keeping unit",
                "json_schema_extra": { "examples": ["AB-1"] }
            })
        );
    }

    #[test]
    fn test_keys_present_without_wrapper() {
        let value = serde_json::to_value(FieldMetadataEnricher::enrich(&Annotation::optional(
            Annotation::ty("int"),
        )))
        .unwrap();

        assert_eq!(
            value,
            json!({
                "kind": "union",
                "options": [
                    { "kind": "type", "name": "int", "optional": false },
                    { "kind": "type", "name": "NoneType", "optional": false }
                ],
                "optional": true,
                "discriminator": null,
                "field_meta": {}
            })
        );
    }

    #[test]
    fn test_nested_wrappers_are_not_inspected() {
        let annotation = Annotation::optional(product_details());
        assert!(FieldMetadataEnricher::field_descriptor(&annotation).is_none());
        assert_eq!(FieldMetadataEnricher::enrich(&annotation).discriminator(), None);
    }
}
