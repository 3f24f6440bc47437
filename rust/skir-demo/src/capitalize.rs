//! Upper-cases the ASCII letters of every string inside a record, using
//! static reflection.

use skir_runtime::reflection::{
    for_each_field, for_each_variant, EnumType, StructType, Variant, VisitorMut,
};

struct Upper;

impl VisitorMut for Upper {
    fn visit_string(&mut self, value: &mut String) {
        value.make_ascii_uppercase();
    }
}

/// Walks the fields of `record` one by one.
pub fn capitalize_struct<S: StructType>(record: &mut S) {
    for_each_field::<S>(|field| field.accept_mut(record, &mut Upper));
}

/// Only the active wrapper variant carries strings; constants are skipped.
pub fn capitalize_enum<E: EnumType>(value: &mut E) {
    for_each_variant::<E>(|variant| match variant {
        Variant::Constant(_) => {}
        Variant::Wrapper(wrapper) => {
            if wrapper.is_active(value) {
                wrapper.accept_mut(value, &mut Upper);
            }
        }
    });
}
