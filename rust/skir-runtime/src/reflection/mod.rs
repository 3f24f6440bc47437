//! Static and dynamic reflection over skir types.

pub mod descriptor;
pub mod dynamic;
pub mod statics;
pub mod visit;

pub use descriptor::{
    get_type_descriptor, DescriptorError, PrimitiveType, RecordDescriptor, TypeDescriptor,
    TypeSignature,
};
pub use statics::{
    for_each_field, for_each_variant, EnumDescriptor, EnumType, StructDescriptor, StructField,
    StructType, Variant, WrapperVariant,
};
pub use visit::{Visitor, VisitorMut};
