//! Decode errors shared by every codec.
//!
//! Only genuinely malformed input produces a [`DecodeError`]. Schema drift
//! (unknown enum numbers, extra or missing trailing struct slots) is
//! tolerated by the decoders and never reaches this type.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },
    #[error("invalid {what}: {detail}")]
    InvalidValue { what: &'static str, detail: String },
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEof(usize),
    #[error("unexpected wire tag {tag} at byte {offset} while reading {expected}")]
    UnexpectedTag {
        tag: u8,
        offset: usize,
        expected: &'static str,
    },
    #[error("invalid UTF-8 in string at byte {0}")]
    InvalidUtf8(usize),
    #[error("binary input does not start with the 'skir' prefix")]
    MissingMagic,
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
    #[error("value nested deeper than {0} levels")]
    TooDeep(usize),
}

impl DecodeError {
    pub(crate) fn mismatch(expected: &'static str, found: &serde_json::Value) -> Self {
        DecodeError::TypeMismatch {
            expected,
            found: json_kind(found).to_string(),
        }
    }

    pub(crate) fn invalid(what: &'static str, detail: impl Into<String>) -> Self {
        DecodeError::InvalidValue {
            what,
            detail: detail.into(),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
