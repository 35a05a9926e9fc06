//! Annotation description.
//!
//! Turns a resolved [`Annotation`] into a [`TypeDescriptor`]. Every input
//! produces a descriptor; shapes without a dedicated kind fall back to
//! `unknown` carrying the annotation's text.

use crate::ir::TypeDescriptor;
use crate::namespace::Annotation;

/// Describes annotations as tagged descriptors.
pub struct AnnotationDescriber;

impl AnnotationDescriber {
    /// Describe one annotation, recursing into nested annotations.
    ///
    /// Checks run in order and the first match wins:
    /// 1. `Literal[...]` becomes `literal` with the values as declared
    /// 2. `Union[...]` becomes `union`, optional iff `NoneType` is a member
    /// 3. `Annotated[...]` becomes `annotated`, base and metadata described
    /// 4. A data-model class becomes `model_ref`
    /// 5. Any other type object becomes `type`
    /// 6. Everything else becomes `unknown`
    pub fn describe(annotation: &Annotation) -> TypeDescriptor {
        match annotation {
            Annotation::Literal(values) => TypeDescriptor::literal(values.clone()),
            Annotation::Union(members) => {
                let optional = members.iter().any(Annotation::is_none_type);
                let options = members.iter().map(Self::describe).collect();
                TypeDescriptor::union(options, optional)
            }
            Annotation::Annotated { base, metadata } => TypeDescriptor::annotated(
                Self::describe(base),
                metadata.iter().map(Self::describe).collect(),
            ),
            Annotation::Model(name) => TypeDescriptor::model_ref(name),
            Annotation::Type(name) => TypeDescriptor::primitive(name),
            Annotation::NoneType => TypeDescriptor::primitive("NoneType"),
            Annotation::Generic { .. }
            | Annotation::ForwardRef(_)
            | Annotation::Metadata(_)
            | Annotation::Opaque(_) => TypeDescriptor::unknown(annotation.to_string()),
        }
    }
}
