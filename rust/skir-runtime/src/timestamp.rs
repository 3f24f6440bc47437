//! Millisecond-precision instants.

use crate::binary::{BinaryReader, BinaryWriter};
use crate::error::DecodeError;
use crate::reflection::descriptor::{PrimitiveType, TypeSignature};
use crate::reflection::visit::{Visitor, VisitorMut};
use crate::value::{json_int, JsonFlavor, SkirType};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use std::fmt;
use std::hash::Hasher;

/// Earliest/latest representable instant, matching the JavaScript `Date`
/// range.
pub const MAX_UNIX_MILLIS: i64 = 8_640_000_000_000_000;

/// An instant as milliseconds since the Unix epoch. The default value is the
/// epoch itself.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp {
    unix_millis: i64,
}

fn clamp_millis(millis: i128) -> i64 {
    millis.clamp(-i128::from(MAX_UNIX_MILLIS), i128::from(MAX_UNIX_MILLIS)) as i64
}

impl Timestamp {
    pub const EPOCH: Timestamp = Timestamp { unix_millis: 0 };

    /// Out-of-range values are clamped.
    pub fn from_unix_millis(unix_millis: i64) -> Self {
        Self {
            unix_millis: unix_millis.clamp(-MAX_UNIX_MILLIS, MAX_UNIX_MILLIS),
        }
    }

    pub fn now() -> Self {
        Self::from_unix_millis(Utc::now().timestamp_millis())
    }

    pub fn unix_millis(&self) -> i64 {
        self.unix_millis
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.unix_millis)
    }

    /// RFC 3339 in UTC with millisecond precision, e.g.
    /// `2025-04-03T12:19:47.000Z`.
    pub fn formatted(&self) -> String {
        self.to_datetime()
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_else(|| format!("{}ms", self.unix_millis))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_unix_millis(dt.timestamp_millis())
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({} /* {} */)", self.unix_millis, self.formatted())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl SkirType for Timestamp {
    fn type_signature() -> TypeSignature {
        TypeSignature::Primitive(PrimitiveType::Timestamp)
    }
    fn is_default(&self) -> bool {
        self.unix_millis == 0
    }
    fn value_eq(&self, other: &Self) -> bool {
        self == other
    }
    fn value_hash(&self, state: &mut dyn Hasher) {
        state.write_i64(self.unix_millis);
    }
    fn to_json(&self, flavor: JsonFlavor) -> Value {
        match flavor {
            JsonFlavor::Dense => Value::from(self.unix_millis),
            JsonFlavor::Readable => json!({
                "unix_millis": self.unix_millis,
                "formatted": self.formatted(),
            }),
        }
    }
    fn from_json(json: &Value) -> Result<Self, DecodeError> {
        let millis = match json {
            Value::Object(map) => match map.get("unix_millis") {
                Some(inner) => json_int(inner, "timestamp")?,
                None => {
                    return Err(DecodeError::invalid(
                        "timestamp",
                        "object without 'unix_millis'",
                    ))
                }
            },
            other => json_int(other, "timestamp")?,
        };
        Ok(Self::from_unix_millis(clamp_millis(millis)))
    }
    fn write_binary(&self, out: &mut BinaryWriter) {
        out.write_timestamp(self.unix_millis);
    }
    fn read_binary(input: &mut BinaryReader<'_>) -> Result<Self, DecodeError> {
        let millis = input.read_number("timestamp")?.to_integer("timestamp")?;
        Ok(Self::from_unix_millis(clamp_millis(millis)))
    }
    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_timestamp(*self);
    }
    fn accept_mut(&mut self, visitor: &mut dyn VisitorMut) {
        visitor.visit_timestamp(self);
    }
}
