//! Reflection-driven algorithms shared by every generated record.
//!
//! Generated code does not hand-write equality, hashing or codecs. It builds
//! a descriptor table ([`StructType`] / [`EnumType`]) and then invokes
//! [`impl_struct!`](crate::impl_struct) or [`impl_enum!`](crate::impl_enum),
//! which route every [`SkirType`](crate::SkirType) method to the functions below.
//!
//! Struct layout rules, shared by dense JSON and binary:
//! - slots are walked in ascending number order;
//! - only the contiguous trailing run of default fields is dropped;
//! - any slot that is not a live field (a removed number or a gap) is
//!   written as zero and ignored on input;
//! - slots beyond the known fields are ignored on input.

use crate::binary::{BinaryReader, BinaryWriter, EnumHeader};
use crate::error::DecodeError;
use crate::reflection::descriptor::{RecordCollector, TypeSignature};
use crate::reflection::statics::{EnumType, StructType, Variant, UNKNOWN_VARIANT_NAME};
use crate::reflection::visit::{Visitor, VisitorMut};
use crate::value::{json_int, JsonFlavor};
use serde_json::{Map, Value};
use std::hash::Hasher;

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

pub fn struct_signature<S: StructType>() -> TypeSignature {
    TypeSignature::Record(S::descriptor().id())
}

pub fn struct_collect_records<S: StructType>(records: &mut RecordCollector) {
    let descriptor = S::descriptor();
    if !records.begin(&descriptor.id()) {
        return;
    }
    records.push(descriptor.record_descriptor());
    for field in descriptor.fields() {
        field.collect_records(records);
    }
}

pub fn struct_is_default<S: StructType>(value: &S) -> bool {
    S::descriptor().fields().all(|f| f.is_default(value))
}

pub fn struct_eq<S: StructType>(a: &S, b: &S) -> bool {
    S::descriptor().fields().all(|f| f.values_eq(a, b))
}

pub fn struct_hash<S: StructType>(value: &S, state: &mut dyn Hasher) {
    for field in S::descriptor().fields() {
        field.hash_value(value, state);
    }
}

/// Number of slots to write: one past the last non-default field.
fn written_slots<S: StructType>(value: &S) -> usize {
    S::descriptor()
        .fields()
        .filter(|f| !f.is_default(value))
        .map(|f| f.number() as usize + 1)
        .max()
        .unwrap_or(0)
}

pub fn struct_to_json<S: StructType>(value: &S, flavor: JsonFlavor) -> Value {
    let descriptor = S::descriptor();
    match flavor {
        JsonFlavor::Dense => {
            let len = written_slots(value);
            let slots = (0..len)
                .map(|number| match descriptor.field_by_number(number as u32) {
                    Some(field) => field.to_json(value, flavor),
                    None => Value::from(0),
                })
                .collect();
            Value::Array(slots)
        }
        JsonFlavor::Readable => {
            let mut object = Map::new();
            for field in descriptor.fields().filter(|f| !f.is_default(value)) {
                object.insert(field.name().to_string(), field.to_json(value, flavor));
            }
            Value::Object(object)
        }
    }
}

pub fn struct_from_json<S: StructType>(json: &Value) -> Result<S, DecodeError> {
    let descriptor = S::descriptor();
    let mut out = S::default();
    match json {
        Value::Array(slots) => {
            for (number, slot) in slots.iter().enumerate() {
                if let Some(field) = descriptor.field_by_number(number as u32) {
                    field.read_json(&mut out, slot)?;
                }
            }
        }
        Value::Object(object) => {
            for (name, slot) in object {
                if let Some(field) = descriptor.field_by_name(name) {
                    field.read_json(&mut out, slot)?;
                }
            }
        }
        Value::Null => {}
        Value::Number(n) if n.as_u64() == Some(0) => {}
        other => return Err(DecodeError::mismatch("struct", other)),
    }
    Ok(out)
}

pub fn struct_write_binary<S: StructType>(value: &S, out: &mut BinaryWriter) {
    let descriptor = S::descriptor();
    let len = written_slots(value);
    out.write_array_len(len);
    for number in 0..len {
        match descriptor.field_by_number(number as u32) {
            Some(field) => field.write_binary(value, out),
            None => out.write_uint(0),
        }
    }
}

pub fn struct_read_binary<S: StructType>(input: &mut BinaryReader<'_>) -> Result<S, DecodeError> {
    let descriptor = S::descriptor();
    let len = input.read_array_len()?;
    input.enter()?;
    let mut out = S::default();
    for number in 0..len {
        match u32::try_from(number).ok().and_then(|n| descriptor.field_by_number(n)) {
            Some(field) => field.read_binary(&mut out, input)?,
            None => input.skip_value()?,
        }
    }
    input.exit();
    Ok(out)
}

pub fn struct_accept<S: StructType>(value: &S, visitor: &mut dyn Visitor) {
    for field in S::descriptor().fields() {
        field.accept(value, visitor);
    }
}

pub fn struct_accept_mut<S: StructType>(value: &mut S, visitor: &mut dyn VisitorMut) {
    for field in S::descriptor().fields() {
        field.accept_mut(value, visitor);
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

pub fn enum_signature<E: EnumType>() -> TypeSignature {
    TypeSignature::Record(E::descriptor().id())
}

pub fn enum_collect_records<E: EnumType>(records: &mut RecordCollector) {
    let descriptor = E::descriptor();
    if !records.begin(&descriptor.id()) {
        return;
    }
    records.push(descriptor.record_descriptor());
    for variant in descriptor.variants() {
        if let Variant::Wrapper(w) = variant {
            w.collect_records(records);
        }
    }
}

fn active_variant<E: EnumType>(value: &E) -> Option<&'static Variant<E>> {
    match value.variant_number() {
        0 => None,
        n => E::descriptor().variant_by_number(n),
    }
}

pub fn enum_is_default<E: EnumType>(value: &E) -> bool {
    value.variant_number() == 0
}

pub fn enum_eq<E: EnumType>(a: &E, b: &E) -> bool {
    if a.variant_number() != b.variant_number() {
        return false;
    }
    match active_variant(a) {
        Some(Variant::Wrapper(w)) => w.payload_eq(a, b),
        _ => true,
    }
}

pub fn enum_hash<E: EnumType>(value: &E, state: &mut dyn Hasher) {
    state.write_u32(value.variant_number());
    if let Some(Variant::Wrapper(w)) = active_variant(value) {
        w.payload_hash(value, state);
    }
}

pub fn enum_to_json<E: EnumType>(value: &E, flavor: JsonFlavor) -> Value {
    match (active_variant(value), flavor) {
        (None, JsonFlavor::Dense) => Value::from(0),
        (None, JsonFlavor::Readable) => Value::String(UNKNOWN_VARIANT_NAME.to_string()),
        (Some(Variant::Constant(c)), JsonFlavor::Dense) => Value::from(c.number()),
        (Some(Variant::Constant(c)), JsonFlavor::Readable) => Value::String(c.name().to_string()),
        (Some(Variant::Wrapper(w)), JsonFlavor::Dense) => Value::Array(vec![
            Value::from(w.number()),
            w.payload_to_json(value, flavor),
        ]),
        (Some(Variant::Wrapper(w)), JsonFlavor::Readable) => {
            let mut object = Map::new();
            object.insert("kind".into(), Value::String(w.name().to_string()));
            object.insert("value".into(), w.payload_to_json(value, flavor));
            Value::Object(object)
        }
    }
}

/// The value a bare number or name decodes to. A wrapper named without a
/// payload gets the payload's zero value.
fn enum_from_variant<E: EnumType>(variant: Option<&Variant<E>>) -> E {
    match variant {
        Some(Variant::Constant(c)) => c.value(),
        Some(Variant::Wrapper(w)) => w.wrap_default(),
        None => E::default(),
    }
}

fn variant_by_json_number<E: EnumType>(json: &Value) -> Result<Option<&'static Variant<E>>, DecodeError> {
    let number = json_int(json, "enum")?;
    Ok(u32::try_from(number)
        .ok()
        .and_then(|n| E::descriptor().variant_by_number(n)))
}

pub fn enum_from_json<E: EnumType>(json: &Value) -> Result<E, DecodeError> {
    let descriptor = E::descriptor();
    match json {
        Value::Null => Ok(E::default()),
        Value::Number(_) => Ok(enum_from_variant(variant_by_json_number::<E>(json)?)),
        Value::String(s) if s.trim().parse::<i128>().is_ok() => {
            Ok(enum_from_variant(variant_by_json_number::<E>(json)?))
        }
        Value::String(name) => Ok(enum_from_variant(descriptor.variant_by_name(name))),
        Value::Array(pair) => {
            let [number, payload] = pair.as_slice() else {
                return Err(DecodeError::invalid(
                    "enum",
                    format!("wrapper array must have 2 elements, found {}", pair.len()),
                ));
            };
            match variant_by_json_number::<E>(number)? {
                Some(Variant::Wrapper(w)) => w.wrap_json(payload),
                other => Ok(enum_from_variant(other)),
            }
        }
        Value::Object(object) => {
            let kind = match object.get("kind") {
                Some(Value::String(kind)) => kind,
                _ => {
                    return Err(DecodeError::invalid(
                        "enum",
                        "wrapper object without a 'kind' string",
                    ))
                }
            };
            match descriptor.variant_by_name(kind) {
                Some(Variant::Wrapper(w)) => w.wrap_json(object.get("value").unwrap_or(&Value::Null)),
                other => Ok(enum_from_variant(other)),
            }
        }
        other => Err(DecodeError::mismatch("enum", other)),
    }
}

pub fn enum_write_binary<E: EnumType>(value: &E, out: &mut BinaryWriter) {
    match active_variant(value) {
        None => out.write_uint(0),
        Some(Variant::Constant(c)) => out.write_uint(u64::from(c.number())),
        Some(Variant::Wrapper(w)) => {
            out.write_wrapper_header(w.number());
            w.write_payload(value, out);
        }
    }
}

pub fn enum_read_binary<E: EnumType>(input: &mut BinaryReader<'_>) -> Result<E, DecodeError> {
    let descriptor = E::descriptor();
    match input.read_enum_header()? {
        EnumHeader::Constant(number) => Ok(enum_from_variant(descriptor.variant_by_number(number))),
        EnumHeader::Wrapper(number) => {
            input.enter()?;
            let value = match descriptor.variant_by_number(number) {
                Some(Variant::Wrapper(w)) => w.wrap_binary(input)?,
                other => {
                    // Unknown or no longer a wrapper: drop the payload.
                    input.skip_value()?;
                    match other {
                        Some(Variant::Constant(c)) => c.value(),
                        _ => E::default(),
                    }
                }
            };
            input.exit();
            Ok(value)
        }
    }
}

pub fn enum_accept<E: EnumType>(value: &E, visitor: &mut dyn Visitor) {
    if let Some(Variant::Wrapper(w)) = active_variant(value) {
        w.accept(value, visitor);
    }
}

pub fn enum_accept_mut<E: EnumType>(value: &mut E, visitor: &mut dyn VisitorMut) {
    if let Some(Variant::Wrapper(w)) = active_variant(value) {
        w.accept_mut(value, visitor);
    }
}

// ---------------------------------------------------------------------------
// Macros
// ---------------------------------------------------------------------------

/// Implements [`SkirType`](crate::SkirType), `PartialEq`, `Eq` and `Hash`
/// for a struct that implements
/// [`StructType`](crate::reflection::StructType).
#[macro_export]
macro_rules! impl_struct {
    ($ty:ty) => {
        impl $crate::SkirType for $ty {
            fn type_signature() -> $crate::reflection::TypeSignature {
                $crate::record::struct_signature::<Self>()
            }
            fn collect_records(records: &mut $crate::reflection::descriptor::RecordCollector) {
                $crate::record::struct_collect_records::<Self>(records)
            }
            fn is_default(&self) -> bool {
                $crate::record::struct_is_default(self)
            }
            fn value_eq(&self, other: &Self) -> bool {
                $crate::record::struct_eq(self, other)
            }
            fn value_hash(&self, state: &mut dyn ::std::hash::Hasher) {
                $crate::record::struct_hash(self, state)
            }
            fn to_json(&self, flavor: $crate::JsonFlavor) -> $crate::__private::Value {
                $crate::record::struct_to_json(self, flavor)
            }
            fn from_json(json: &$crate::__private::Value) -> ::std::result::Result<Self, $crate::DecodeError> {
                $crate::record::struct_from_json(json)
            }
            fn write_binary(&self, out: &mut $crate::binary::BinaryWriter) {
                $crate::record::struct_write_binary(self, out)
            }
            fn read_binary(
                input: &mut $crate::binary::BinaryReader<'_>,
            ) -> ::std::result::Result<Self, $crate::DecodeError> {
                $crate::record::struct_read_binary(input)
            }
            fn accept(&self, visitor: &mut dyn $crate::reflection::Visitor) {
                $crate::record::struct_accept(self, visitor)
            }
            fn accept_mut(&mut self, visitor: &mut dyn $crate::reflection::VisitorMut) {
                $crate::record::struct_accept_mut(self, visitor)
            }
        }

        impl ::std::cmp::PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                $crate::record::struct_eq(self, other)
            }
        }

        impl ::std::cmp::Eq for $ty {}

        impl ::std::hash::Hash for $ty {
            fn hash<H: ::std::hash::Hasher>(&self, state: &mut H) {
                $crate::record::struct_hash(self, state)
            }
        }
    };
}

/// Implements [`SkirType`](crate::SkirType), `PartialEq`, `Eq` and `Hash`
/// for an enum that implements [`EnumType`](crate::reflection::EnumType).
#[macro_export]
macro_rules! impl_enum {
    ($ty:ty) => {
        impl $crate::SkirType for $ty {
            fn type_signature() -> $crate::reflection::TypeSignature {
                $crate::record::enum_signature::<Self>()
            }
            fn collect_records(records: &mut $crate::reflection::descriptor::RecordCollector) {
                $crate::record::enum_collect_records::<Self>(records)
            }
            fn is_default(&self) -> bool {
                $crate::record::enum_is_default(self)
            }
            fn value_eq(&self, other: &Self) -> bool {
                $crate::record::enum_eq(self, other)
            }
            fn value_hash(&self, state: &mut dyn ::std::hash::Hasher) {
                $crate::record::enum_hash(self, state)
            }
            fn to_json(&self, flavor: $crate::JsonFlavor) -> $crate::__private::Value {
                $crate::record::enum_to_json(self, flavor)
            }
            fn from_json(json: &$crate::__private::Value) -> ::std::result::Result<Self, $crate::DecodeError> {
                $crate::record::enum_from_json(json)
            }
            fn write_binary(&self, out: &mut $crate::binary::BinaryWriter) {
                $crate::record::enum_write_binary(self, out)
            }
            fn read_binary(
                input: &mut $crate::binary::BinaryReader<'_>,
            ) -> ::std::result::Result<Self, $crate::DecodeError> {
                $crate::record::enum_read_binary(input)
            }
            fn accept(&self, visitor: &mut dyn $crate::reflection::Visitor) {
                $crate::record::enum_accept(self, visitor)
            }
            fn accept_mut(&mut self, visitor: &mut dyn $crate::reflection::VisitorMut) {
                $crate::record::enum_accept_mut(self, visitor)
            }
        }

        impl ::std::cmp::PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                $crate::record::enum_eq(self, other)
            }
        }

        impl ::std::cmp::Eq for $ty {}

        impl ::std::hash::Hash for $ty {
            fn hash<H: ::std::hash::Hasher>(&self, state: &mut H) {
                $crate::record::enum_hash(self, state)
            }
        }
    };
}
