//! Immutable-by-convention byte strings.

use crate::binary::{BinaryReader, BinaryWriter};
use crate::error::DecodeError;
use crate::reflection::descriptor::{PrimitiveType, TypeSignature};
use crate::reflection::visit::{Visitor, VisitorMut};
use crate::value::{JsonFlavor, SkirType};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::Value;
use std::fmt;
use std::hash::Hasher;
use std::ops::Deref;

const HEX_PREFIX: &str = "hex:";

/// The `bytes` primitive. A newtype so it does not collide with `Vec<u8>`,
/// which is an array of integers.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ByteString(Vec<u8>);

impl ByteString {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.0)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl Deref for ByteString {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for ByteString {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Debug for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hex:{}", self.to_hex())
    }
}

impl SkirType for ByteString {
    fn type_signature() -> TypeSignature {
        TypeSignature::Primitive(PrimitiveType::Bytes)
    }
    fn is_default(&self) -> bool {
        self.0.is_empty()
    }
    fn value_eq(&self, other: &Self) -> bool {
        self == other
    }
    fn value_hash(&self, state: &mut dyn Hasher) {
        state.write_usize(self.0.len());
        state.write(&self.0);
    }
    fn to_json(&self, flavor: JsonFlavor) -> Value {
        match flavor {
            JsonFlavor::Dense => Value::String(self.to_base64()),
            JsonFlavor::Readable => Value::String(format!("{HEX_PREFIX}{}", self.to_hex())),
        }
    }
    fn from_json(json: &Value) -> Result<Self, DecodeError> {
        match json {
            Value::String(s) => {
                let decoded = match s.strip_prefix(HEX_PREFIX) {
                    Some(hex_digits) => hex::decode(hex_digits)
                        .map_err(|e| DecodeError::invalid("bytes", e.to_string()))?,
                    None => BASE64
                        .decode(s)
                        .map_err(|e| DecodeError::invalid("bytes", e.to_string()))?,
                };
                Ok(Self(decoded))
            }
            Value::Null => Ok(Self::default()),
            Value::Number(n) if n.as_u64() == Some(0) => Ok(Self::default()),
            other => Err(DecodeError::mismatch("bytes", other)),
        }
    }
    fn write_binary(&self, out: &mut BinaryWriter) {
        out.write_bytes(&self.0);
    }
    fn read_binary(input: &mut BinaryReader<'_>) -> Result<Self, DecodeError> {
        input.read_bytes().map(Self)
    }
    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_bytes(self);
    }
    fn accept_mut(&mut self, visitor: &mut dyn VisitorMut) {
        visitor.visit_bytes(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_flavors() {
        let b = ByteString::new(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(b.to_json(JsonFlavor::Dense), json!("3q2+7w=="));
        assert_eq!(b.to_json(JsonFlavor::Readable), json!("hex:deadbeef"));
        assert_eq!(ByteString::from_json(&json!("3q2+7w==")).unwrap(), b);
        assert_eq!(ByteString::from_json(&json!("hex:deadbeef")).unwrap(), b);
    }

    #[test]
    fn test_invalid_base64() {
        assert!(matches!(
            ByteString::from_json(&json!("not base64!")),
            Err(DecodeError::InvalidValue { what: "bytes", .. })
        ));
    }
}
