//! Descriptor-driven JSON conversion.
//!
//! Tools that only hold a [`TypeDescriptor`] (for example one fetched from a
//! service's method listing) can still turn a dense JSON payload into the
//! readable flavor. Primitives are round-tripped through their compiled
//! [`SkirType`] implementation so both paths format identically.

use super::descriptor::{
    EnumRecord, PrimitiveType, RecordDescriptor, StructRecord, TypeDescriptor, TypeSignature,
};
use crate::binary::MAX_DEPTH;
use crate::bytes::ByteString;
use crate::error::DecodeError;
use crate::reflection::statics::UNKNOWN_VARIANT_NAME;
use crate::timestamp::Timestamp;
use crate::value::{json_int, JsonFlavor, SkirType};
use serde_json::{Map, Value};
use std::collections::HashMap;

impl TypeDescriptor {
    /// Converts a dense JSON value of this descriptor's type to readable
    /// JSON. Unknown enum numbers become `"UNKNOWN"` at the top level and
    /// are left out inside structs; slots beyond the known fields are
    /// dropped.
    pub fn dense_to_readable(&self, dense: &Value) -> Result<Value, DecodeError> {
        let records = self
            .records
            .iter()
            .map(|r| (r.id(), r))
            .collect::<HashMap<_, _>>();
        Converter { records }.convert(&self.root, dense, 0)
    }
}

struct Converter<'a> {
    records: HashMap<&'a str, &'a RecordDescriptor>,
}

impl Converter<'_> {
    fn convert(&self, ty: &TypeSignature, json: &Value, depth: usize) -> Result<Value, DecodeError> {
        if depth > MAX_DEPTH {
            return Err(DecodeError::TooDeep(MAX_DEPTH));
        }
        match ty {
            TypeSignature::Primitive(p) => primitive(*p, json),
            TypeSignature::Optional(inner) => match json {
                Value::Null => Ok(Value::Null),
                other => self.convert(inner, other, depth + 1),
            },
            TypeSignature::Array(array) => match json {
                Value::Array(items) => items
                    .iter()
                    .map(|item| self.convert(&array.item, item, depth + 1))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array),
                Value::Null => Ok(Value::Array(Vec::new())),
                Value::Number(n) if n.as_u64() == Some(0) => Ok(Value::Array(Vec::new())),
                other => Err(DecodeError::mismatch("array", other)),
            },
            TypeSignature::Record(id) => match self.records.get(id.as_str()) {
                Some(RecordDescriptor::Struct(s)) => self.convert_struct(s, json, depth),
                Some(RecordDescriptor::Enum(e)) => self.convert_enum(e, json, depth),
                None => Err(DecodeError::invalid("record", format!("unknown id {id:?}"))),
            },
        }
    }

    fn convert_struct(
        &self,
        record: &StructRecord,
        json: &Value,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        let slots = match json {
            Value::Array(slots) => slots.as_slice(),
            Value::Null => &[],
            Value::Number(n) if n.as_u64() == Some(0) => &[],
            // Already readable.
            Value::Object(_) => return Ok(json.clone()),
            other => return Err(DecodeError::mismatch("struct", other)),
        };
        let mut fields = record.fields.iter().collect::<Vec<_>>();
        fields.sort_by_key(|f| f.number);
        let mut out = Map::new();
        for field in fields {
            let Some(slot) = slots.get(field.number as usize) else {
                continue;
            };
            if is_dense_default(&field.ty, slot) {
                continue;
            }
            let value = self.convert(&field.ty, slot, depth + 1)?;
            // An unrecognized enum decodes to its default, which readable
            // JSON leaves out.
            if matches!(field.ty, TypeSignature::Record(_))
                && value.as_str() == Some(UNKNOWN_VARIANT_NAME)
            {
                continue;
            }
            out.insert(field.name.clone(), value);
        }
        Ok(Value::Object(out))
    }

    fn convert_enum(
        &self,
        record: &EnumRecord,
        json: &Value,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        let unknown = || Value::String(UNKNOWN_VARIANT_NAME.to_string());
        match json {
            Value::Array(pair) => {
                let [number, payload] = pair.as_slice() else {
                    return Err(DecodeError::invalid(
                        "enum",
                        format!("wrapper array of length {}", pair.len()),
                    ));
                };
                let number = json_int(number, "enum")?;
                let variant = record
                    .variants
                    .iter()
                    .find(|v| i128::from(v.number) == number);
                match variant.and_then(|v| v.ty.as_ref().map(|ty| (v, ty))) {
                    Some((v, ty)) => {
                        let mut out = Map::new();
                        out.insert("kind".into(), Value::String(v.name.clone()));
                        out.insert("value".into(), self.convert(ty, payload, depth + 1)?);
                        Ok(Value::Object(out))
                    }
                    None => Ok(unknown()),
                }
            }
            Value::String(s) if s.parse::<i128>().is_err() => Ok(json.clone()),
            Value::Object(_) => Ok(json.clone()),
            other => {
                let number = json_int(other, "enum")?;
                Ok(record
                    .variants
                    .iter()
                    .find(|v| i128::from(v.number) == number && v.ty.is_none())
                    .map(|v| Value::String(v.name.clone()))
                    .unwrap_or_else(unknown))
            }
        }
    }
}

fn primitive(p: PrimitiveType, json: &Value) -> Result<Value, DecodeError> {
    fn reencode<T: SkirType>(json: &Value) -> Result<Value, DecodeError> {
        Ok(T::from_json(json)?.to_json(JsonFlavor::Readable))
    }
    match p {
        PrimitiveType::Bool => reencode::<bool>(json),
        PrimitiveType::Int32 => reencode::<i32>(json),
        PrimitiveType::Int64 => reencode::<i64>(json),
        PrimitiveType::Hash64 => reencode::<u64>(json),
        PrimitiveType::Float32 => reencode::<f32>(json),
        PrimitiveType::Float64 => reencode::<f64>(json),
        PrimitiveType::Timestamp => reencode::<Timestamp>(json),
        PrimitiveType::String => reencode::<String>(json),
        PrimitiveType::Bytes => reencode::<ByteString>(json),
    }
}

/// Whether a dense slot holds the zero value of `ty`.
fn is_dense_default(ty: &TypeSignature, json: &Value) -> bool {
    if let TypeSignature::Optional(_) = ty {
        return json.is_null();
    }
    match json {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::from_json_value(json!({
            "type": {"kind": "record", "value": "t.skir:Point"},
            "records": [
                {
                    "kind": "struct",
                    "id": "t.skir:Point",
                    "fields": [
                        {"name": "x", "number": 0, "type": {"kind": "primitive", "value": "int32"}},
                        {"name": "visible", "number": 1, "type": {"kind": "primitive", "value": "bool"}},
                        {"name": "color", "number": 3, "type": {"kind": "record", "value": "t.skir:Color"}}
                    ],
                    "removed_numbers": [2]
                },
                {
                    "kind": "enum",
                    "id": "t.skir:Color",
                    "variants": [
                        {"name": "RED", "number": 1},
                        {"name": "custom", "number": 2, "type": {"kind": "primitive", "value": "string"}}
                    ]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_struct_and_constant() {
        let readable = descriptor().dense_to_readable(&json!([0, 1, 0, 1])).unwrap();
        assert_eq!(readable, json!({"visible": true, "color": "RED"}));
    }

    #[test]
    fn test_wrapper_and_unknown_variant() {
        let d = descriptor();
        assert_eq!(
            d.dense_to_readable(&json!([5, 0, 0, [2, "teal"]])).unwrap(),
            json!({"x": 5, "color": {"kind": "custom", "value": "teal"}})
        );
        assert_eq!(d.dense_to_readable(&json!([0, 0, 0, 9])).unwrap(), json!({}));
        assert_eq!(
            d.dense_to_readable(&json!([1, 0, 0, [9, "x"]])).unwrap(),
            json!({"x": 1})
        );
        let color = TypeDescriptor {
            root: TypeSignature::Record("t.skir:Color".to_string()),
            records: d.records.clone(),
        };
        assert_eq!(color.dense_to_readable(&json!(9)).unwrap(), json!("UNKNOWN"));
    }

    #[test]
    fn test_rejects_bad_wrapper_shape() {
        assert!(descriptor()
            .dense_to_readable(&json!([0, 0, 0, [2, "a", "b"]]))
            .is_err());
    }
}
