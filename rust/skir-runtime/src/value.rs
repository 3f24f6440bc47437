//! The value model: the [`SkirType`] trait and its implementations for
//! primitives, optionals and arrays.
//!
//! Records (generated structs and enums) implement the same trait through
//! [`crate::impl_struct!`] and [`crate::impl_enum!`], so every algorithm in
//! the runtime recurses through one interface without special-casing
//! individual generated types.

use crate::binary::{BinaryReader, BinaryWriter};
use crate::error::DecodeError;
use crate::reflection::descriptor::{PrimitiveType, RecordCollector, TypeSignature};
use crate::reflection::visit::{Visitor, VisitorMut};
use serde_json::Value;
use std::fmt;
use std::hash::Hasher;

/// Largest integer magnitude written as a JSON number; larger 64-bit values
/// are written as decimal strings so JavaScript readers keep full precision.
pub const MAX_SAFE_JSON_INT: i128 = (1i128 << 53) - 1;

/// Which JSON flavor to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonFlavor {
    /// Index-positional, durable across renames. Use for anything that will
    /// be decoded later.
    Dense,
    /// Name-keyed, for humans.
    Readable,
}

/// A type the runtime can encode, decode, compare, hash, describe and
/// visit.
pub trait SkirType: Clone + Default + fmt::Debug + Send + Sync + 'static {
    /// Reference to this type for the dynamic type descriptor.
    fn type_signature() -> TypeSignature;

    /// Adds the record definitions reachable from this type.
    fn collect_records(_records: &mut RecordCollector) {}

    /// Whether this is the zero value of the type.
    fn is_default(&self) -> bool;

    fn value_eq(&self, other: &Self) -> bool;

    fn value_hash(&self, state: &mut dyn Hasher);

    fn to_json(&self, flavor: JsonFlavor) -> Value;

    /// Decodes either JSON flavor.
    fn from_json(json: &Value) -> Result<Self, DecodeError>;

    fn write_binary(&self, out: &mut BinaryWriter);

    fn read_binary(input: &mut BinaryReader<'_>) -> Result<Self, DecodeError>;

    /// Walks every primitive reachable from this value.
    fn accept(&self, _visitor: &mut dyn Visitor) {}

    /// Walks every primitive reachable from this value, mutably.
    fn accept_mut(&mut self, _visitor: &mut dyn VisitorMut) {}
}

// ---------------------------------------------------------------------------
// JSON scalar helpers
// ---------------------------------------------------------------------------

/// Reads an integer from a JSON number, numeric string or bool. Fractional
/// values are rejected rather than truncated.
pub(crate) fn json_int(json: &Value, expected: &'static str) -> Result<i128, DecodeError> {
    match json {
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                Ok(i128::from(v))
            } else if let Some(v) = n.as_u64() {
                Ok(i128::from(v))
            } else {
                integral_float(n.as_f64().unwrap_or(f64::NAN), expected)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i128>() {
                Ok(v) => Ok(v),
                Err(_) => s
                    .parse::<f64>()
                    .map_err(|_| DecodeError::invalid(expected, format!("not a number: {s:?}")))
                    .and_then(|v| integral_float(v, expected)),
            }
        }
        Value::Bool(b) => Ok(i128::from(*b)),
        Value::Null => Ok(0),
        other => Err(DecodeError::mismatch(expected, other)),
    }
}

pub(crate) fn integral_float(value: f64, expected: &'static str) -> Result<i128, DecodeError> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 2f64.powi(127) {
        Ok(value as i128)
    } else {
        Err(DecodeError::invalid(expected, format!("{value} is not an integer")))
    }
}

/// Converts to the declared width, failing instead of wrapping.
pub(crate) fn narrow_int<T: TryFrom<i128>>(value: i128, expected: &'static str) -> Result<T, DecodeError> {
    T::try_from(value).map_err(|_| DecodeError::invalid(expected, format!("{value} is out of range")))
}

pub(crate) fn int_to_json(value: i128) -> Value {
    if (-MAX_SAFE_JSON_INT..=MAX_SAFE_JSON_INT).contains(&value) {
        Value::from(value as i64)
    } else {
        Value::String(value.to_string())
    }
}

pub(crate) fn json_float(json: &Value, expected: &'static str) -> Result<f64, DecodeError> {
    match json {
        Value::Number(n) => Ok(n.as_f64().unwrap_or(0.0)),
        Value::String(s) => match s.trim() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            other => other
                .parse::<f64>()
                .map_err(|_| DecodeError::invalid(expected, format!("not a number: {other:?}"))),
        },
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Null => Ok(0.0),
        other => Err(DecodeError::mismatch(expected, other)),
    }
}

pub(crate) fn float_to_json(value: f64) -> Value {
    if value.is_nan() {
        Value::String("NaN".into())
    } else if value.is_infinite() {
        Value::String(if value > 0.0 { "Infinity" } else { "-Infinity" }.into())
    } else if value.fract() == 0.0 && value.abs() <= MAX_SAFE_JSON_INT as f64 {
        // Integral values print without a fractional part, as in JavaScript.
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// Float equality used by records: `NaN` equals `NaN`, `-0.0` equals `0.0`.
pub fn f64_eq(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/// Hash consistent with [`f64_eq`].
pub fn f64_hash(value: f64, state: &mut dyn Hasher) {
    let bits = if value == 0.0 {
        0
    } else if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    };
    state.write_u64(bits);
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

impl SkirType for bool {
    fn type_signature() -> TypeSignature {
        TypeSignature::Primitive(PrimitiveType::Bool)
    }
    fn is_default(&self) -> bool {
        !*self
    }
    fn value_eq(&self, other: &Self) -> bool {
        self == other
    }
    fn value_hash(&self, state: &mut dyn Hasher) {
        state.write_u8(*self as u8);
    }
    fn to_json(&self, flavor: JsonFlavor) -> Value {
        match flavor {
            JsonFlavor::Dense => Value::from(*self as u8),
            JsonFlavor::Readable => Value::Bool(*self),
        }
    }
    fn from_json(json: &Value) -> Result<Self, DecodeError> {
        match json {
            Value::Bool(b) => Ok(*b),
            Value::String(s) if s == "true" || s == "false" => Ok(s == "true"),
            other => Ok(json_float(other, "bool")? != 0.0),
        }
    }
    fn write_binary(&self, out: &mut BinaryWriter) {
        out.write_bool(*self);
    }
    fn read_binary(input: &mut BinaryReader<'_>) -> Result<Self, DecodeError> {
        input.read_bool()
    }
    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_bool(*self);
    }
    fn accept_mut(&mut self, visitor: &mut dyn VisitorMut) {
        visitor.visit_bool(self);
    }
}

impl SkirType for i32 {
    fn type_signature() -> TypeSignature {
        TypeSignature::Primitive(PrimitiveType::Int32)
    }
    fn is_default(&self) -> bool {
        *self == 0
    }
    fn value_eq(&self, other: &Self) -> bool {
        self == other
    }
    fn value_hash(&self, state: &mut dyn Hasher) {
        state.write_i32(*self);
    }
    fn to_json(&self, _flavor: JsonFlavor) -> Value {
        Value::from(*self)
    }
    fn from_json(json: &Value) -> Result<Self, DecodeError> {
        narrow_int(json_int(json, "int32")?, "int32")
    }
    fn write_binary(&self, out: &mut BinaryWriter) {
        out.write_i32(*self);
    }
    fn read_binary(input: &mut BinaryReader<'_>) -> Result<Self, DecodeError> {
        narrow_int(input.read_number("int32")?.to_integer("int32")?, "int32")
    }
    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_i32(*self);
    }
    fn accept_mut(&mut self, visitor: &mut dyn VisitorMut) {
        visitor.visit_i32(self);
    }
}

impl SkirType for i64 {
    fn type_signature() -> TypeSignature {
        TypeSignature::Primitive(PrimitiveType::Int64)
    }
    fn is_default(&self) -> bool {
        *self == 0
    }
    fn value_eq(&self, other: &Self) -> bool {
        self == other
    }
    fn value_hash(&self, state: &mut dyn Hasher) {
        state.write_i64(*self);
    }
    fn to_json(&self, _flavor: JsonFlavor) -> Value {
        int_to_json(*self as i128)
    }
    fn from_json(json: &Value) -> Result<Self, DecodeError> {
        narrow_int(json_int(json, "int64")?, "int64")
    }
    fn write_binary(&self, out: &mut BinaryWriter) {
        out.write_i64(*self);
    }
    fn read_binary(input: &mut BinaryReader<'_>) -> Result<Self, DecodeError> {
        narrow_int(input.read_number("int64")?.to_integer("int64")?, "int64")
    }
    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_i64(*self);
    }
    fn accept_mut(&mut self, visitor: &mut dyn VisitorMut) {
        visitor.visit_i64(self);
    }
}

impl SkirType for u64 {
    fn type_signature() -> TypeSignature {
        TypeSignature::Primitive(PrimitiveType::Hash64)
    }
    fn is_default(&self) -> bool {
        *self == 0
    }
    fn value_eq(&self, other: &Self) -> bool {
        self == other
    }
    fn value_hash(&self, state: &mut dyn Hasher) {
        state.write_u64(*self);
    }
    fn to_json(&self, _flavor: JsonFlavor) -> Value {
        int_to_json(*self as i128)
    }
    fn from_json(json: &Value) -> Result<Self, DecodeError> {
        narrow_int(json_int(json, "hash64")?, "hash64")
    }
    fn write_binary(&self, out: &mut BinaryWriter) {
        out.write_uint(*self);
    }
    fn read_binary(input: &mut BinaryReader<'_>) -> Result<Self, DecodeError> {
        narrow_int(input.read_number("hash64")?.to_integer("hash64")?, "hash64")
    }
    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_u64(*self);
    }
    fn accept_mut(&mut self, visitor: &mut dyn VisitorMut) {
        visitor.visit_u64(self);
    }
}

impl SkirType for f32 {
    fn type_signature() -> TypeSignature {
        TypeSignature::Primitive(PrimitiveType::Float32)
    }
    fn is_default(&self) -> bool {
        *self == 0.0
    }
    fn value_eq(&self, other: &Self) -> bool {
        f64_eq(*self as f64, *other as f64)
    }
    fn value_hash(&self, state: &mut dyn Hasher) {
        f64_hash(*self as f64, state);
    }
    fn to_json(&self, _flavor: JsonFlavor) -> Value {
        // Go through the shortest decimal form so 1.67f32 prints as 1.67.
        let widened = if self.is_finite() {
            self.to_string().parse::<f64>().unwrap_or(*self as f64)
        } else {
            *self as f64
        };
        float_to_json(widened)
    }
    fn from_json(json: &Value) -> Result<Self, DecodeError> {
        Ok(json_float(json, "float32")? as f32)
    }
    fn write_binary(&self, out: &mut BinaryWriter) {
        out.write_f32(*self);
    }
    fn read_binary(input: &mut BinaryReader<'_>) -> Result<Self, DecodeError> {
        Ok(input.read_number("float32")?.as_f64() as f32)
    }
    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_f32(*self);
    }
    fn accept_mut(&mut self, visitor: &mut dyn VisitorMut) {
        visitor.visit_f32(self);
    }
}

impl SkirType for f64 {
    fn type_signature() -> TypeSignature {
        TypeSignature::Primitive(PrimitiveType::Float64)
    }
    fn is_default(&self) -> bool {
        *self == 0.0
    }
    fn value_eq(&self, other: &Self) -> bool {
        f64_eq(*self, *other)
    }
    fn value_hash(&self, state: &mut dyn Hasher) {
        f64_hash(*self, state);
    }
    fn to_json(&self, _flavor: JsonFlavor) -> Value {
        float_to_json(*self)
    }
    fn from_json(json: &Value) -> Result<Self, DecodeError> {
        json_float(json, "float64")
    }
    fn write_binary(&self, out: &mut BinaryWriter) {
        out.write_f64(*self);
    }
    fn read_binary(input: &mut BinaryReader<'_>) -> Result<Self, DecodeError> {
        Ok(input.read_number("float64")?.as_f64())
    }
    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_f64(*self);
    }
    fn accept_mut(&mut self, visitor: &mut dyn VisitorMut) {
        visitor.visit_f64(self);
    }
}

impl SkirType for String {
    fn type_signature() -> TypeSignature {
        TypeSignature::Primitive(PrimitiveType::String)
    }
    fn is_default(&self) -> bool {
        self.is_empty()
    }
    fn value_eq(&self, other: &Self) -> bool {
        self == other
    }
    fn value_hash(&self, state: &mut dyn Hasher) {
        state.write(self.as_bytes());
        state.write_u8(0xff);
    }
    fn to_json(&self, _flavor: JsonFlavor) -> Value {
        Value::String(self.clone())
    }
    fn from_json(json: &Value) -> Result<Self, DecodeError> {
        match json {
            Value::String(s) => Ok(s.clone()),
            Value::Null => Ok(String::new()),
            // Removed or zeroed slots are written as 0 in dense JSON.
            Value::Number(n) if n.as_u64() == Some(0) => Ok(String::new()),
            other => Err(DecodeError::mismatch("string", other)),
        }
    }
    fn write_binary(&self, out: &mut BinaryWriter) {
        out.write_string(self);
    }
    fn read_binary(input: &mut BinaryReader<'_>) -> Result<Self, DecodeError> {
        input.read_string()
    }
    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_string(self);
    }
    fn accept_mut(&mut self, visitor: &mut dyn VisitorMut) {
        visitor.visit_string(self);
    }
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

impl<T: SkirType> SkirType for Option<T> {
    fn type_signature() -> TypeSignature {
        TypeSignature::Optional(Box::new(T::type_signature()))
    }
    fn collect_records(records: &mut RecordCollector) {
        T::collect_records(records);
    }
    fn is_default(&self) -> bool {
        self.is_none()
    }
    fn value_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (None, None) => true,
            (Some(a), Some(b)) => a.value_eq(b),
            _ => false,
        }
    }
    fn value_hash(&self, state: &mut dyn Hasher) {
        match self {
            None => state.write_u8(0),
            Some(v) => {
                state.write_u8(1);
                v.value_hash(state);
            }
        }
    }
    fn to_json(&self, flavor: JsonFlavor) -> Value {
        match self {
            None => Value::Null,
            Some(v) => v.to_json(flavor),
        }
    }
    fn from_json(json: &Value) -> Result<Self, DecodeError> {
        match json {
            Value::Null => Ok(None),
            other => T::from_json(other).map(Some),
        }
    }
    fn write_binary(&self, out: &mut BinaryWriter) {
        match self {
            None => out.write_null(),
            Some(v) => v.write_binary(out),
        }
    }
    fn read_binary(input: &mut BinaryReader<'_>) -> Result<Self, DecodeError> {
        if input.read_null()? {
            Ok(None)
        } else {
            T::read_binary(input).map(Some)
        }
    }
    fn accept(&self, visitor: &mut dyn Visitor) {
        if let Some(v) = self {
            v.accept(visitor);
        }
    }
    fn accept_mut(&mut self, visitor: &mut dyn VisitorMut) {
        if let Some(v) = self {
            v.accept_mut(visitor);
        }
    }
}

impl<T: SkirType> SkirType for Vec<T> {
    fn type_signature() -> TypeSignature {
        TypeSignature::array(T::type_signature(), None)
    }
    fn collect_records(records: &mut RecordCollector) {
        T::collect_records(records);
    }
    fn is_default(&self) -> bool {
        self.is_empty()
    }
    fn value_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.value_eq(b))
    }
    fn value_hash(&self, state: &mut dyn Hasher) {
        state.write_usize(self.len());
        for item in self {
            item.value_hash(state);
        }
    }
    fn to_json(&self, flavor: JsonFlavor) -> Value {
        Value::Array(self.iter().map(|item| item.to_json(flavor)).collect())
    }
    fn from_json(json: &Value) -> Result<Self, DecodeError> {
        match json {
            Value::Array(items) => items.iter().map(T::from_json).collect(),
            Value::Null => Ok(Vec::new()),
            Value::Number(n) if n.as_u64() == Some(0) => Ok(Vec::new()),
            other => Err(DecodeError::mismatch("array", other)),
        }
    }
    fn write_binary(&self, out: &mut BinaryWriter) {
        out.write_array_len(self.len());
        for item in self {
            item.write_binary(out);
        }
    }
    fn read_binary(input: &mut BinaryReader<'_>) -> Result<Self, DecodeError> {
        let len = input.read_array_len()?;
        input.enter()?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(T::read_binary(input)?);
        }
        input.exit();
        Ok(items)
    }
    fn accept(&self, visitor: &mut dyn Visitor) {
        for item in self {
            item.accept(visitor);
        }
    }
    fn accept_mut(&mut self, visitor: &mut dyn VisitorMut) {
        for item in self {
            item.accept_mut(visitor);
        }
    }
}

/// Boxes let generated records refer to themselves through an optional.
impl<T: SkirType> SkirType for Box<T> {
    fn type_signature() -> TypeSignature {
        T::type_signature()
    }
    fn collect_records(records: &mut RecordCollector) {
        T::collect_records(records);
    }
    fn is_default(&self) -> bool {
        (**self).is_default()
    }
    fn value_eq(&self, other: &Self) -> bool {
        (**self).value_eq(other)
    }
    fn value_hash(&self, state: &mut dyn Hasher) {
        (**self).value_hash(state);
    }
    fn to_json(&self, flavor: JsonFlavor) -> Value {
        (**self).to_json(flavor)
    }
    fn from_json(json: &Value) -> Result<Self, DecodeError> {
        T::from_json(json).map(Box::new)
    }
    fn write_binary(&self, out: &mut BinaryWriter) {
        (**self).write_binary(out);
    }
    fn read_binary(input: &mut BinaryReader<'_>) -> Result<Self, DecodeError> {
        T::read_binary(input).map(Box::new)
    }
    fn accept(&self, visitor: &mut dyn Visitor) {
        (**self).accept(visitor);
    }
    fn accept_mut(&mut self, visitor: &mut dyn VisitorMut) {
        (**self).accept_mut(visitor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_large_int64_is_a_string_in_json() {
        assert_eq!(42i64.to_json(JsonFlavor::Dense), json!(42));
        assert_eq!(
            i64::MAX.to_json(JsonFlavor::Dense),
            json!("9223372036854775807")
        );
        assert_eq!(i64::from_json(&json!("9223372036854775807")).unwrap(), i64::MAX);
        assert_eq!(u64::from_json(&json!("18446744073709551615")).unwrap(), u64::MAX);
    }

    #[test]
    fn test_non_finite_floats_are_strings() {
        assert_eq!(f64::NAN.to_json(JsonFlavor::Dense), json!("NaN"));
        assert_eq!(f32::NEG_INFINITY.to_json(JsonFlavor::Readable), json!("-Infinity"));
        assert!(f64::from_json(&json!("NaN")).unwrap().is_nan());
        assert_eq!(1.67f32.to_json(JsonFlavor::Dense), json!(1.67));
        assert_eq!(3.0f64.to_json(JsonFlavor::Dense).to_string(), "3");
    }

    #[test]
    fn test_float_equality_and_hash_agree() {
        use std::collections::hash_map::DefaultHasher;
        let hash = |v: f64| {
            let mut h = DefaultHasher::new();
            v.value_hash(&mut h);
            h.finish()
        };
        assert!(f64::NAN.value_eq(&f64::NAN));
        assert!((-0.0f64).value_eq(&0.0));
        assert_eq!(hash(-0.0), hash(0.0));
        assert_eq!(hash(f64::NAN), hash(-f64::NAN));
    }

    #[test]
    fn test_bool_flavors() {
        assert_eq!(true.to_json(JsonFlavor::Dense), json!(1));
        assert_eq!(true.to_json(JsonFlavor::Readable), json!(true));
        assert!(bool::from_json(&json!(1)).unwrap());
        assert!(!bool::from_json(&json!(false)).unwrap());
    }

    #[test]
    fn test_string_rejects_object() {
        assert!(matches!(
            String::from_json(&json!({"a": 1})),
            Err(DecodeError::TypeMismatch { expected: "string", .. })
        ));
    }

    #[test]
    fn test_optional_binary_null() {
        let mut w = BinaryWriter::new();
        None::<i32>.write_binary(&mut w);
        Some(7i32).write_binary(&mut w);
        let bytes = w.into_bytes();
        let mut r = BinaryReader::new(&bytes);
        assert_eq!(Option::<i32>::read_binary(&mut r).unwrap(), None);
        assert_eq!(Option::<i32>::read_binary(&mut r).unwrap(), Some(7));
    }
}
