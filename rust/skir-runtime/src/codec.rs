//! Entry points for the three wire formats.
//!
//! ```rust,ignore
//! let json = skir_runtime::to_dense_json(&user);        // [42,"John Doe",...]
//! let back: User = skir_runtime::from_json(&json)?;
//! let bytes = skir_runtime::to_bytes(&user);            // b"skir..."
//! let same: User = skir_runtime::parse(&bytes)?;
//! ```

use crate::binary::{BinaryReader, BinaryWriter, MAGIC, MAX_DEPTH};
use crate::error::DecodeError;
use crate::value::{JsonFlavor, SkirType};
use serde::Deserialize;

/// Compact, index-positional JSON. Survives field renames.
pub fn to_dense_json<T: SkirType>(value: &T) -> String {
    value.to_json(JsonFlavor::Dense).to_string()
}

/// Name-keyed JSON, pretty-printed with two-space indentation.
pub fn to_readable_json<T: SkirType>(value: &T) -> String {
    let json = value.to_json(JsonFlavor::Readable);
    serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
}

/// Binary encoding, prefixed with the `skir` magic.
pub fn to_bytes<T: SkirType>(value: &T) -> Vec<u8> {
    let mut out = BinaryWriter::with_magic();
    value.write_binary(&mut out);
    out.into_bytes()
}

/// Decodes either JSON flavor. Nesting is capped at [`MAX_DEPTH`], the same
/// limit the binary reader enforces.
pub fn from_json<T: SkirType>(json: &str) -> Result<T, DecodeError> {
    check_json_depth(json)?;
    let invalid = |e: serde_json::Error| DecodeError::InvalidJson(e.to_string());
    let mut deserializer = serde_json::Deserializer::from_str(json);
    deserializer.disable_recursion_limit();
    let value = serde_json::Value::deserialize(&mut deserializer).map_err(invalid)?;
    deserializer.end().map_err(invalid)?;
    T::from_json(&value)
}

fn check_json_depth(json: &str) -> Result<(), DecodeError> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for byte in json.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                if depth > MAX_DEPTH {
                    return Err(DecodeError::TooDeep(MAX_DEPTH));
                }
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

/// Decodes the output of [`to_bytes`]. The whole input must be consumed.
pub fn from_bytes<T: SkirType>(bytes: &[u8]) -> Result<T, DecodeError> {
    let body = bytes.strip_prefix(MAGIC.as_slice()).ok_or(DecodeError::MissingMagic)?;
    let mut input = BinaryReader::new(body);
    let value = T::read_binary(&mut input)?;
    if !input.is_at_end() {
        return Err(DecodeError::TrailingBytes(input.remaining()));
    }
    Ok(value)
}

/// Decodes binary when `bytes` starts with the magic, JSON otherwise.
pub fn parse<T: SkirType>(bytes: &[u8]) -> Result<T, DecodeError> {
    if bytes.starts_with(MAGIC) {
        return from_bytes(bytes);
    }
    let text = std::str::from_utf8(bytes).map_err(|e| DecodeError::InvalidUtf8(e.valid_up_to()))?;
    from_json(text)
}
