//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use typedesc::{Annotation, FieldDecl, FieldInfo, ModelClass, Namespace};

/// Get the path to test fixtures.
pub fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// The product catalogue namespace: department models, a discriminated
/// details union and a handful of union aliases.
pub fn product_catalog() -> Namespace {
    let content = std::fs::read_to_string(fixtures_path().join("product_catalog.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

/// The four concrete details models, in union order.
pub const DETAIL_MODELS: [&str; 4] = [
    "ClothingDetails",
    "ElectronicsDetails",
    "GroceryDetails",
    "FurnitureDetails",
];

/// The discriminated details union, written out as a field would spell it.
pub fn inline_details_annotation() -> String {
    format!(
        "Annotated[Union[{}], Field(discriminator='kind')]",
        DETAIL_MODELS.join(", ")
    )
}

/// A catalogue variant whose `Order.details` field spells the union inline.
pub fn catalog_with_order() -> Namespace {
    product_catalog().with_model(ModelClass::new("Order").with_fields([
        FieldDecl::deferred("order_id", "int"),
        FieldDecl::deferred("details", inline_details_annotation()),
        FieldDecl::deferred("note", "Optional[str]").with_default(serde_json::Value::Null),
        FieldDecl::evaluated(
            "reference",
            Annotation::annotated(
                Annotation::forward_ref("FlexibleId"),
                [Annotation::metadata(
                    FieldInfo::new()
                        .with_alias("ref")
                        .with_description("External order reference"),
                )],
            ),
        ),
    ]))
}
