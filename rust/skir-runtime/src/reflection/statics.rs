//! Static reflection: per-type field and variant tables.
//!
//! Generated code builds one [`StructDescriptor`] or [`EnumDescriptor`] per
//! record, once, from `(name, number, accessor)` tuples, and hands it out
//! through [`StructType::descriptor`] / [`EnumType::descriptor`]. Fields and
//! variants are type-erased behind [`StructField`] and [`WrapperVariant`],
//! which is what lets [`crate::record`] implement equality, hashing, the
//! codecs and visitation once for every record.
//!
//! ```rust,ignore
//! impl StructType for User {
//!     fn descriptor() -> &'static StructDescriptor<Self> {
//!         static DESCRIPTOR: Lazy<StructDescriptor<User>> = Lazy::new(|| {
//!             StructDescriptor::new("user.skir", "User")
//!                 .field("user_id", 0, |u| &u.user_id, |u| &mut u.user_id)
//!                 .field("name", 1, |u| &u.name, |u| &mut u.name)
//!         });
//!         &DESCRIPTOR
//!     }
//! }
//! ```

use super::descriptor::{
    EnumRecord, FieldDescriptor, RecordCollector, RecordDescriptor, StructRecord, TypeSignature,
    VariantDescriptor,
};
use super::visit::{Visitor, VisitorMut};
use crate::binary::{BinaryReader, BinaryWriter};
use crate::error::DecodeError;
use crate::value::{JsonFlavor, SkirType};
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hasher;

/// Name of the implicit default member of every enum.
pub const UNKNOWN_VARIANT_NAME: &str = "UNKNOWN";

pub trait StructType: SkirType {
    fn descriptor() -> &'static StructDescriptor<Self>;
}

pub trait EnumType: SkirType {
    fn descriptor() -> &'static EnumDescriptor<Self>;

    /// Number of the active member; 0 for `UNKNOWN`.
    fn variant_number(&self) -> u32;
}

fn record_id(module_path: &str, qualified_name: &str) -> String {
    format!("{module_path}:{qualified_name}")
}

// ---------------------------------------------------------------------------
// Struct fields
// ---------------------------------------------------------------------------

/// One field of struct `S`, with its value type erased.
pub trait StructField<S>: Send + Sync {
    fn name(&self) -> &'static str;
    fn number(&self) -> u32;
    fn type_signature(&self) -> TypeSignature;
    fn collect_records(&self, records: &mut RecordCollector);

    /// Projection to the field value, for callers that downcast.
    fn get<'a>(&self, record: &'a S) -> &'a dyn Any;
    fn get_mut<'a>(&self, record: &'a mut S) -> &'a mut dyn Any;
    fn debug<'a>(&self, record: &'a S) -> &'a dyn fmt::Debug;

    fn is_default(&self, record: &S) -> bool;
    fn values_eq(&self, a: &S, b: &S) -> bool;
    fn hash_value(&self, record: &S, state: &mut dyn Hasher);
    fn to_json(&self, record: &S, flavor: JsonFlavor) -> Value;
    fn read_json(&self, record: &mut S, json: &Value) -> Result<(), DecodeError>;
    fn write_binary(&self, record: &S, out: &mut BinaryWriter);
    fn read_binary(&self, record: &mut S, input: &mut BinaryReader<'_>) -> Result<(), DecodeError>;
    fn accept(&self, record: &S, visitor: &mut dyn Visitor);
    fn accept_mut(&self, record: &mut S, visitor: &mut dyn VisitorMut);
}

struct FieldAccess<S, V> {
    name: &'static str,
    number: u32,
    get: fn(&S) -> &V,
    get_mut: fn(&mut S) -> &mut V,
}

impl<S: 'static, V: SkirType> StructField<S> for FieldAccess<S, V> {
    fn name(&self) -> &'static str {
        self.name
    }
    fn number(&self) -> u32 {
        self.number
    }
    fn type_signature(&self) -> TypeSignature {
        V::type_signature()
    }
    fn collect_records(&self, records: &mut RecordCollector) {
        V::collect_records(records);
    }
    fn get<'a>(&self, record: &'a S) -> &'a dyn Any {
        (self.get)(record)
    }
    fn get_mut<'a>(&self, record: &'a mut S) -> &'a mut dyn Any {
        (self.get_mut)(record)
    }
    fn debug<'a>(&self, record: &'a S) -> &'a dyn fmt::Debug {
        (self.get)(record)
    }
    fn is_default(&self, record: &S) -> bool {
        (self.get)(record).is_default()
    }
    fn values_eq(&self, a: &S, b: &S) -> bool {
        (self.get)(a).value_eq((self.get)(b))
    }
    fn hash_value(&self, record: &S, state: &mut dyn Hasher) {
        (self.get)(record).value_hash(state);
    }
    fn to_json(&self, record: &S, flavor: JsonFlavor) -> Value {
        (self.get)(record).to_json(flavor)
    }
    fn read_json(&self, record: &mut S, json: &Value) -> Result<(), DecodeError> {
        *(self.get_mut)(record) = V::from_json(json)?;
        Ok(())
    }
    fn write_binary(&self, record: &S, out: &mut BinaryWriter) {
        (self.get)(record).write_binary(out);
    }
    fn read_binary(&self, record: &mut S, input: &mut BinaryReader<'_>) -> Result<(), DecodeError> {
        *(self.get_mut)(record) = V::read_binary(input)?;
        Ok(())
    }
    fn accept(&self, record: &S, visitor: &mut dyn Visitor) {
        (self.get)(record).accept(visitor);
    }
    fn accept_mut(&self, record: &mut S, visitor: &mut dyn VisitorMut) {
        (self.get_mut)(record).accept_mut(visitor);
    }
}

// ---------------------------------------------------------------------------
// StructDescriptor
// ---------------------------------------------------------------------------

pub struct StructDescriptor<S> {
    module_path: &'static str,
    qualified_name: &'static str,
    /// Sorted by number.
    fields: Vec<Box<dyn StructField<S>>>,
    removed_numbers: Vec<u32>,
    /// Indexed by wire number; `None` for removed numbers and gaps.
    slots: Vec<Option<usize>>,
    by_name: HashMap<&'static str, usize>,
}

impl<S: 'static> StructDescriptor<S> {
    pub fn new(module_path: &'static str, qualified_name: &'static str) -> Self {
        Self {
            module_path,
            qualified_name,
            fields: Vec::new(),
            removed_numbers: Vec::new(),
            slots: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn field<V: SkirType>(
        mut self,
        name: &'static str,
        number: u32,
        get: fn(&S) -> &V,
        get_mut: fn(&mut S) -> &mut V,
    ) -> Self {
        debug_assert!(
            self.field_by_number(number).is_none() && !self.removed_numbers.contains(&number),
            "{}: number {number} used twice",
            self.qualified_name
        );
        self.fields.push(Box::new(FieldAccess {
            name,
            number,
            get,
            get_mut,
        }));
        self.reindex();
        self
    }

    /// Declares the number of a deleted field. Its slot is written as zero
    /// and ignored on input.
    pub fn removed(mut self, number: u32) -> Self {
        self.removed_numbers.push(number);
        self.removed_numbers.sort_unstable();
        self.reindex();
        self
    }

    fn reindex(&mut self) {
        self.fields.sort_by_key(|f| f.number());
        let max_field = self.fields.last().map(|f| f.number() as usize + 1);
        let max_removed = self.removed_numbers.last().map(|n| *n as usize + 1);
        let len = max_field.unwrap_or(0).max(max_removed.unwrap_or(0));
        self.slots = vec![None; len];
        self.by_name.clear();
        for (i, field) in self.fields.iter().enumerate() {
            self.slots[field.number() as usize] = Some(i);
            self.by_name.insert(field.name(), i);
        }
    }

    pub fn module_path(&self) -> &'static str {
        self.module_path
    }

    /// Name including enclosing records, e.g. `User.Pet`.
    pub fn qualified_name(&self) -> &'static str {
        self.qualified_name
    }

    pub fn name(&self) -> &'static str {
        self.qualified_name
            .rsplit_once('.')
            .map(|(_, n)| n)
            .unwrap_or(self.qualified_name)
    }

    pub fn id(&self) -> String {
        record_id(self.module_path, self.qualified_name)
    }

    /// Fields in ascending number order.
    pub fn fields(&self) -> impl Iterator<Item = &dyn StructField<S>> {
        self.fields.iter().map(|f| f.as_ref())
    }

    pub fn field_by_number(&self, number: u32) -> Option<&dyn StructField<S>> {
        let index = (*self.slots.get(number as usize)?)?;
        Some(self.fields[index].as_ref())
    }

    pub fn field_by_name(&self, name: &str) -> Option<&dyn StructField<S>> {
        self.by_name.get(name).map(|i| self.fields[*i].as_ref())
    }

    pub fn removed_numbers(&self) -> &[u32] {
        &self.removed_numbers
    }

    /// One past the highest field or removed number.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn record_descriptor(&self) -> RecordDescriptor {
        RecordDescriptor::Struct(StructRecord {
            id: self.id(),
            fields: self
                .fields()
                .map(|f| FieldDescriptor {
                    name: f.name().to_string(),
                    number: f.number(),
                    ty: f.type_signature(),
                })
                .collect(),
            removed_numbers: self.removed_numbers.clone(),
        })
    }
}

impl<S> fmt::Debug for StructDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructDescriptor")
            .field("module_path", &self.module_path)
            .field("qualified_name", &self.qualified_name)
            .field(
                "fields",
                &self.fields.iter().map(|f| (f.name(), f.number())).collect::<Vec<_>>(),
            )
            .field("removed_numbers", &self.removed_numbers)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Enum variants
// ---------------------------------------------------------------------------

pub struct ConstantVariant<E> {
    name: &'static str,
    number: u32,
    value: fn() -> E,
}

impl<E> ConstantVariant<E> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn value(&self) -> E {
        (self.value)()
    }
}

/// One payload-carrying variant of enum `E`, with the payload type erased.
pub trait WrapperVariant<E>: Send + Sync {
    fn name(&self) -> &'static str;
    fn number(&self) -> u32;
    fn type_signature(&self) -> TypeSignature;
    fn collect_records(&self, records: &mut RecordCollector);

    /// Whether `value` holds this variant.
    fn is_active(&self, value: &E) -> bool;
    /// The payload, when this variant is active.
    fn payload<'a>(&self, value: &'a E) -> Option<&'a dyn Any>;
    /// This variant wrapping the payload's zero value.
    fn wrap_default(&self) -> E;

    fn payload_eq(&self, a: &E, b: &E) -> bool;
    fn payload_hash(&self, value: &E, state: &mut dyn Hasher);
    fn payload_to_json(&self, value: &E, flavor: JsonFlavor) -> Value;
    fn wrap_json(&self, payload: &Value) -> Result<E, DecodeError>;
    fn write_payload(&self, value: &E, out: &mut BinaryWriter);
    fn wrap_binary(&self, input: &mut BinaryReader<'_>) -> Result<E, DecodeError>;
    fn accept(&self, value: &E, visitor: &mut dyn Visitor);
    fn accept_mut(&self, value: &mut E, visitor: &mut dyn VisitorMut);
}

struct WrapperAccess<E, V> {
    name: &'static str,
    number: u32,
    wrap: fn(V) -> E,
    get: fn(&E) -> Option<&V>,
    get_mut: fn(&mut E) -> Option<&mut V>,
}

impl<E: 'static, V: SkirType> WrapperVariant<E> for WrapperAccess<E, V> {
    fn name(&self) -> &'static str {
        self.name
    }
    fn number(&self) -> u32 {
        self.number
    }
    fn type_signature(&self) -> TypeSignature {
        V::type_signature()
    }
    fn collect_records(&self, records: &mut RecordCollector) {
        V::collect_records(records);
    }
    fn is_active(&self, value: &E) -> bool {
        (self.get)(value).is_some()
    }
    fn payload<'a>(&self, value: &'a E) -> Option<&'a dyn Any> {
        (self.get)(value).map(|v| v as &dyn Any)
    }
    fn wrap_default(&self) -> E {
        (self.wrap)(V::default())
    }
    fn payload_eq(&self, a: &E, b: &E) -> bool {
        match ((self.get)(a), (self.get)(b)) {
            (Some(a), Some(b)) => a.value_eq(b),
            _ => false,
        }
    }
    fn payload_hash(&self, value: &E, state: &mut dyn Hasher) {
        if let Some(v) = (self.get)(value) {
            v.value_hash(state);
        }
    }
    fn payload_to_json(&self, value: &E, flavor: JsonFlavor) -> Value {
        (self.get)(value)
            .map(|v| v.to_json(flavor))
            .unwrap_or(Value::Null)
    }
    fn wrap_json(&self, payload: &Value) -> Result<E, DecodeError> {
        V::from_json(payload).map(self.wrap)
    }
    fn write_payload(&self, value: &E, out: &mut BinaryWriter) {
        match (self.get)(value) {
            Some(v) => v.write_binary(out),
            None => V::default().write_binary(out),
        }
    }
    fn wrap_binary(&self, input: &mut BinaryReader<'_>) -> Result<E, DecodeError> {
        V::read_binary(input).map(self.wrap)
    }
    fn accept(&self, value: &E, visitor: &mut dyn Visitor) {
        if let Some(v) = (self.get)(value) {
            v.accept(visitor);
        }
    }
    fn accept_mut(&self, value: &mut E, visitor: &mut dyn VisitorMut) {
        if let Some(v) = (self.get_mut)(value) {
            v.accept_mut(visitor);
        }
    }
}

/// The closed set of explicit enum members. `UNKNOWN` is implicit and has
/// no entry.
pub enum Variant<E> {
    Constant(ConstantVariant<E>),
    Wrapper(Box<dyn WrapperVariant<E>>),
}

impl<E> Variant<E> {
    pub fn name(&self) -> &'static str {
        match self {
            Variant::Constant(c) => c.name,
            Variant::Wrapper(w) => w.name(),
        }
    }

    pub fn number(&self) -> u32 {
        match self {
            Variant::Constant(c) => c.number,
            Variant::Wrapper(w) => w.number(),
        }
    }
}

// ---------------------------------------------------------------------------
// EnumDescriptor
// ---------------------------------------------------------------------------

pub struct EnumDescriptor<E> {
    module_path: &'static str,
    qualified_name: &'static str,
    /// Sorted by number.
    variants: Vec<Variant<E>>,
    removed_numbers: Vec<u32>,
    by_number: HashMap<u32, usize>,
    by_name: HashMap<&'static str, usize>,
}

impl<E: 'static> EnumDescriptor<E> {
    pub fn new(module_path: &'static str, qualified_name: &'static str) -> Self {
        Self {
            module_path,
            qualified_name,
            variants: Vec::new(),
            removed_numbers: Vec::new(),
            by_number: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn constant(mut self, name: &'static str, number: u32, value: fn() -> E) -> Self {
        self.push(Variant::Constant(ConstantVariant {
            name,
            number,
            value,
        }));
        self
    }

    pub fn wrapper<V: SkirType>(
        mut self,
        name: &'static str,
        number: u32,
        wrap: fn(V) -> E,
        get: fn(&E) -> Option<&V>,
        get_mut: fn(&mut E) -> Option<&mut V>,
    ) -> Self {
        self.push(Variant::Wrapper(Box::new(WrapperAccess {
            name,
            number,
            wrap,
            get,
            get_mut,
        })));
        self
    }

    pub fn removed(mut self, number: u32) -> Self {
        self.removed_numbers.push(number);
        self.removed_numbers.sort_unstable();
        self
    }

    fn push(&mut self, variant: Variant<E>) {
        debug_assert!(variant.number() != 0, "variant number 0 is reserved for UNKNOWN");
        debug_assert!(
            !self.by_number.contains_key(&variant.number()),
            "{}: number {} used twice",
            self.qualified_name,
            variant.number()
        );
        self.variants.push(variant);
        self.variants.sort_by_key(|v| v.number());
        self.by_number.clear();
        self.by_name.clear();
        for (i, v) in self.variants.iter().enumerate() {
            self.by_number.insert(v.number(), i);
            self.by_name.insert(v.name(), i);
        }
    }

    pub fn module_path(&self) -> &'static str {
        self.module_path
    }

    pub fn qualified_name(&self) -> &'static str {
        self.qualified_name
    }

    pub fn name(&self) -> &'static str {
        self.qualified_name
            .rsplit_once('.')
            .map(|(_, n)| n)
            .unwrap_or(self.qualified_name)
    }

    pub fn id(&self) -> String {
        record_id(self.module_path, self.qualified_name)
    }

    /// Explicit variants in ascending number order.
    pub fn variants(&self) -> &[Variant<E>] {
        &self.variants
    }

    pub fn variant_by_number(&self, number: u32) -> Option<&Variant<E>> {
        self.by_number.get(&number).map(|i| &self.variants[*i])
    }

    pub fn variant_by_name(&self, name: &str) -> Option<&Variant<E>> {
        self.by_name.get(name).map(|i| &self.variants[*i])
    }

    pub fn removed_numbers(&self) -> &[u32] {
        &self.removed_numbers
    }

    pub fn record_descriptor(&self) -> RecordDescriptor {
        RecordDescriptor::Enum(EnumRecord {
            id: self.id(),
            variants: self
                .variants
                .iter()
                .map(|v| VariantDescriptor {
                    name: v.name().to_string(),
                    number: v.number(),
                    ty: match v {
                        Variant::Constant(_) => None,
                        Variant::Wrapper(w) => Some(w.type_signature()),
                    },
                })
                .collect(),
            removed_numbers: self.removed_numbers.clone(),
        })
    }
}

impl<E> fmt::Debug for EnumDescriptor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumDescriptor")
            .field("module_path", &self.module_path)
            .field("qualified_name", &self.qualified_name)
            .field(
                "variants",
                &self
                    .variants
                    .iter()
                    .map(|v| (v.name(), v.number()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Iteration
// ---------------------------------------------------------------------------

/// Calls `f` with every field of `S` in number order.
pub fn for_each_field<S: StructType>(mut f: impl FnMut(&dyn StructField<S>)) {
    for field in S::descriptor().fields() {
        f(field);
    }
}

/// Calls `f` with every explicit variant of `E` in number order.
pub fn for_each_variant<E: EnumType>(mut f: impl FnMut(&Variant<E>)) {
    for variant in E::descriptor().variants() {
        f(variant);
    }
}
