//! Dynamic reflection: serializable type descriptors.
//!
//! A [`TypeDescriptor`] describes one type plus the definition of every
//! struct and enum it transitively references. Records refer to each other
//! by id (`"<module path>:<qualified name>"`) rather than by inline copy, so
//! recursive and shared types are represented exactly once and the graph
//! survives a JSON round trip.
//!
//! ```text
//! {
//!   "type": {"kind": "record", "value": "user.skir:User"},
//!   "records": [
//!     {
//!       "kind": "struct",
//!       "id": "user.skir:User",
//!       "fields": [
//!         {"name": "user_id", "number": 0, "type": {"kind": "primitive", "value": "int64"}},
//!         ...
//!       ]
//!     }
//!   ]
//! }
//! ```

use crate::value::SkirType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// TypeSignature
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    Bool,
    Int32,
    Int64,
    Hash64,
    Float32,
    Float64,
    Timestamp,
    String,
    Bytes,
}

impl PrimitiveType {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Int32 => "int32",
            PrimitiveType::Int64 => "int64",
            PrimitiveType::Hash64 => "hash64",
            PrimitiveType::Float32 => "float32",
            PrimitiveType::Float64 => "float64",
            PrimitiveType::Timestamp => "timestamp",
            PrimitiveType::String => "string",
            PrimitiveType::Bytes => "bytes",
        }
    }
}

/// A reference to a type, as it appears on a field, variant or method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TypeSignature {
    Primitive(PrimitiveType),
    Optional(Box<TypeSignature>),
    Array(ArraySignature),
    /// Reference to a record by id.
    Record(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArraySignature {
    pub item: Box<TypeSignature>,
    /// Dotted path of the field keying a keyed array, e.g. `"user_id"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_extractor: Option<String>,
}

impl TypeSignature {
    pub fn array(item: TypeSignature, key_extractor: Option<&str>) -> Self {
        TypeSignature::Array(ArraySignature {
            item: Box::new(item),
            key_extractor: key_extractor.map(str::to_string),
        })
    }

    fn for_each_record_ref<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            TypeSignature::Primitive(_) => {}
            TypeSignature::Optional(inner) => inner.for_each_record_ref(f),
            TypeSignature::Array(array) => array.item.for_each_record_ref(f),
            TypeSignature::Record(id) => f(id),
        }
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSignature::Primitive(p) => f.write_str(p.as_str()),
            TypeSignature::Optional(inner) => write!(f, "{inner}?"),
            TypeSignature::Array(ArraySignature {
                item,
                key_extractor: Some(key),
            }) => write!(f, "[{item}|{key}]"),
            TypeSignature::Array(ArraySignature { item, .. }) => write!(f, "[{item}]"),
            TypeSignature::Record(id) => f.write_str(record_name(id)),
        }
    }
}

/// `"user.skir:User.Pet"` → `"User.Pet"`.
pub fn record_name(id: &str) -> &str {
    id.rsplit_once(':').map(|(_, name)| name).unwrap_or(id)
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordDescriptor {
    Struct(StructRecord),
    Enum(EnumRecord),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructRecord {
    pub id: String,
    pub fields: Vec<FieldDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_numbers: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub number: u32,
    #[serde(rename = "type")]
    pub ty: TypeSignature,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumRecord {
    pub id: String,
    pub variants: Vec<VariantDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_numbers: Vec<u32>,
}

/// A constant variant has no `type`; a wrapper variant has one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDescriptor {
    pub name: String,
    pub number: u32,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeSignature>,
}

impl RecordDescriptor {
    pub fn id(&self) -> &str {
        match self {
            RecordDescriptor::Struct(s) => &s.id,
            RecordDescriptor::Enum(e) => &e.id,
        }
    }

    pub fn name(&self) -> &str {
        record_name(self.id())
    }

    fn removed_numbers(&self) -> &[u32] {
        match self {
            RecordDescriptor::Struct(s) => &s.removed_numbers,
            RecordDescriptor::Enum(e) => &e.removed_numbers,
        }
    }

    /// `(name, number, type)` of every field or variant.
    fn members(&self) -> Vec<(&str, u32, Option<&TypeSignature>)> {
        match self {
            RecordDescriptor::Struct(s) => s
                .fields
                .iter()
                .map(|f| (f.name.as_str(), f.number, Some(&f.ty)))
                .collect(),
            RecordDescriptor::Enum(e) => e
                .variants
                .iter()
                .map(|v| (v.name.as_str(), v.number, v.ty.as_ref()))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordCollector
// ---------------------------------------------------------------------------

/// Accumulates record definitions while walking a type graph. Each record is
/// added once, which is what terminates recursion on cyclic types.
#[derive(Debug, Default)]
pub struct RecordCollector {
    seen: HashSet<String>,
    records: Vec<RecordDescriptor>,
}

impl RecordCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time `id` is offered.
    pub fn begin(&mut self, id: &str) -> bool {
        self.seen.insert(id.to_string())
    }

    pub fn push(&mut self, record: RecordDescriptor) {
        self.records.push(record);
    }

    pub fn into_records(self) -> Vec<RecordDescriptor> {
        self.records
    }
}

// ---------------------------------------------------------------------------
// TypeDescriptor
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("invalid type descriptor JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("record '{0}' is defined more than once")]
    DuplicateRecord(String),
    #[error("record '{record}' uses number {number} more than once")]
    DuplicateNumber { record: String, number: u32 },
    #[error("record '{record}' uses name '{name}' more than once")]
    DuplicateName { record: String, name: String },
    #[error("enum '{0}' declares a variant with the reserved number 0")]
    ReservedNumber(String),
    #[error("reference to undefined record '{0}'")]
    UnresolvedRecord(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    #[serde(rename = "type")]
    pub root: TypeSignature,
    #[serde(default)]
    pub records: Vec<RecordDescriptor>,
}

/// Descriptor for `T` and everything it references.
pub fn get_type_descriptor<T: SkirType>() -> TypeDescriptor {
    TypeDescriptor::of::<T>()
}

impl TypeDescriptor {
    pub fn of<T: SkirType>() -> Self {
        let mut collector = RecordCollector::new();
        T::collect_records(&mut collector);
        Self {
            root: T::type_signature(),
            records: collector.into_records(),
        }
    }

    pub fn record(&self, id: &str) -> Option<&RecordDescriptor> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn as_json_value(&self) -> serde_json::Value {
        // Every field is a string, number, enum or vector thereof.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Pretty-printed JSON form.
    pub fn as_json(&self) -> String {
        serde_json::to_string_pretty(&self.as_json_value()).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Result<Self, DescriptorError> {
        let descriptor: TypeDescriptor = serde_json::from_str(json)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    pub fn from_json_value(json: serde_json::Value) -> Result<Self, DescriptorError> {
        let descriptor: TypeDescriptor = serde_json::from_value(json)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Checks that ids, numbers and names are unique and that every record
    /// reference resolves.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        let mut ids = HashSet::new();
        for record in &self.records {
            if !ids.insert(record.id()) {
                return Err(DescriptorError::DuplicateRecord(record.id().to_string()));
            }
        }

        let mut unresolved = None;
        let mut check = |id: &str| {
            if unresolved.is_none() && !ids.contains(id) {
                unresolved = Some(id.to_string());
            }
        };
        self.root.for_each_record_ref(&mut check);

        for record in &self.records {
            let mut numbers = HashSet::new();
            let mut names = HashSet::new();
            for number in record.removed_numbers() {
                if !numbers.insert(*number) {
                    return Err(DescriptorError::DuplicateNumber {
                        record: record.id().to_string(),
                        number: *number,
                    });
                }
            }
            for (name, number, ty) in record.members() {
                if matches!(record, RecordDescriptor::Enum(_)) && number == 0 {
                    return Err(DescriptorError::ReservedNumber(record.id().to_string()));
                }
                if !numbers.insert(number) {
                    return Err(DescriptorError::DuplicateNumber {
                        record: record.id().to_string(),
                        number,
                    });
                }
                if !names.insert(name) {
                    return Err(DescriptorError::DuplicateName {
                        record: record.id().to_string(),
                        name: name.to_string(),
                    });
                }
                if let Some(ty) = ty {
                    ty.for_each_record_ref(&mut check);
                }
            }
        }

        match unresolved {
            Some(id) => Err(DescriptorError::UnresolvedRecord(id)),
            None => Ok(()),
        }
    }
}
