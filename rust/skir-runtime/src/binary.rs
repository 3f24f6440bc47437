//! Compact binary wire format.
//!
//! Every value starts with one tag byte:
//!
//! ```text
//! 0..=231   unsigned integer literal
//! 232       u16 little-endian follows
//! 233       u32 little-endian follows
//! 234       u64 little-endian follows
//! 235       u8 follows, value is byte - 256
//! 236       u16 follows, value is u16 - 65536
//! 237       i32 little-endian follows
//! 238       i64 little-endian follows
//! 239       timestamp: i64 unix millis follows
//! 240       f32 little-endian follows
//! 241       f64 little-endian follows
//! 242       empty string
//! 243       string: length (uint) + UTF-8 bytes
//! 244       empty byte string
//! 245       byte string: length (uint) + bytes
//! 246       empty array / empty struct
//! 247..=249 array of 1..=3 elements
//! 250       array: length (uint) + elements
//! 251..=254 enum wrapper variant 1..=4, payload follows
//! 255       absent optional
//! ```
//!
//! Wrapper variants numbered above 4 are written as a two-element array:
//! tag 248, the variant number, then the payload. Booleans are the integers
//! 0 and 1, constant enum variants are their number, and zero floats and
//! timestamps collapse to the single byte 0.
//!
//! Top-level values produced by [`crate::codec::to_bytes`] are prefixed with
//! [`MAGIC`].

use crate::error::DecodeError;

/// Prefix of every top-level binary payload.
pub const MAGIC: &[u8; 4] = b"skir";

/// Maximum nesting of arrays, structs and enum payloads accepted on input.
pub const MAX_DEPTH: usize = 256;

pub mod tag {
    pub const MAX_SMALL: u8 = 231;
    pub const U16: u8 = 232;
    pub const U32: u8 = 233;
    pub const U64: u8 = 234;
    pub const NEG_U8: u8 = 235;
    pub const NEG_U16: u8 = 236;
    pub const I32: u8 = 237;
    pub const I64: u8 = 238;
    pub const TIMESTAMP: u8 = 239;
    pub const F32: u8 = 240;
    pub const F64: u8 = 241;
    pub const EMPTY_STRING: u8 = 242;
    pub const STRING: u8 = 243;
    pub const EMPTY_BYTES: u8 = 244;
    pub const BYTES: u8 = 245;
    pub const EMPTY_ARRAY: u8 = 246;
    pub const ARRAY_2: u8 = 248;
    pub const ARRAY_N: u8 = 250;
    pub const WRAPPER_BASE: u8 = 250;
    pub const NULL: u8 = 255;
}

// ---------------------------------------------------------------------------
// BinaryWriter
// ---------------------------------------------------------------------------

/// Append-only output buffer for the binary format.
#[derive(Debug, Default, Clone)]
pub struct BinaryWriter {
    buf: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer whose buffer already holds [`MAGIC`].
    pub fn with_magic() -> Self {
        Self {
            buf: MAGIC.to_vec(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_tag(&mut self, tag: u8) {
        self.buf.push(tag);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(value as u8);
    }

    pub fn write_uint(&mut self, value: u64) {
        if value <= tag::MAX_SMALL as u64 {
            self.buf.push(value as u8);
        } else if value <= u16::MAX as u64 {
            self.buf.push(tag::U16);
            self.buf.extend_from_slice(&(value as u16).to_le_bytes());
        } else if value <= u32::MAX as u64 {
            self.buf.push(tag::U32);
            self.buf.extend_from_slice(&(value as u32).to_le_bytes());
        } else {
            self.buf.push(tag::U64);
            self.buf.extend_from_slice(&value.to_le_bytes());
        }
    }

    pub fn write_i32(&mut self, value: i32) {
        if value >= 0 {
            self.write_uint(value as u64);
        } else if value >= -256 {
            self.buf.push(tag::NEG_U8);
            self.buf.push((value + 256) as u8);
        } else if value >= -65536 {
            self.buf.push(tag::NEG_U16);
            self.buf
                .extend_from_slice(&((value + 65536) as u16).to_le_bytes());
        } else {
            self.buf.push(tag::I32);
            self.buf.extend_from_slice(&value.to_le_bytes());
        }
    }

    pub fn write_i64(&mut self, value: i64) {
        if let Ok(small) = i32::try_from(value) {
            self.write_i32(small);
        } else if value > 0 && value <= u32::MAX as i64 {
            self.write_uint(value as u64);
        } else {
            self.buf.push(tag::I64);
            self.buf.extend_from_slice(&value.to_le_bytes());
        }
    }

    pub fn write_f32(&mut self, value: f32) {
        if value == 0.0 && value.is_sign_positive() {
            self.buf.push(0);
        } else {
            self.buf.push(tag::F32);
            self.buf.extend_from_slice(&value.to_le_bytes());
        }
    }

    pub fn write_f64(&mut self, value: f64) {
        if value == 0.0 && value.is_sign_positive() {
            self.buf.push(0);
        } else {
            self.buf.push(tag::F64);
            self.buf.extend_from_slice(&value.to_le_bytes());
        }
    }

    pub fn write_timestamp(&mut self, unix_millis: i64) {
        if unix_millis == 0 {
            self.buf.push(0);
        } else {
            self.buf.push(tag::TIMESTAMP);
            self.buf.extend_from_slice(&unix_millis.to_le_bytes());
        }
    }

    pub fn write_string(&mut self, value: &str) {
        if value.is_empty() {
            self.buf.push(tag::EMPTY_STRING);
        } else {
            self.buf.push(tag::STRING);
            self.write_uint(value.len() as u64);
            self.buf.extend_from_slice(value.as_bytes());
        }
    }

    pub fn write_bytes(&mut self, value: &[u8]) {
        if value.is_empty() {
            self.buf.push(tag::EMPTY_BYTES);
        } else {
            self.buf.push(tag::BYTES);
            self.write_uint(value.len() as u64);
            self.buf.extend_from_slice(value);
        }
    }

    /// Header for an array or struct with `len` elements or slots.
    pub fn write_array_len(&mut self, len: usize) {
        if len <= 3 {
            self.buf.push(tag::EMPTY_ARRAY + len as u8);
        } else {
            self.buf.push(tag::ARRAY_N);
            self.write_uint(len as u64);
        }
    }

    /// Header for an enum wrapper variant; the payload must follow.
    pub fn write_wrapper_header(&mut self, number: u32) {
        if (1..=4).contains(&number) {
            self.buf.push(tag::WRAPPER_BASE + number as u8);
        } else {
            self.buf.push(tag::ARRAY_2);
            self.write_uint(number as u64);
        }
    }

    pub fn write_null(&mut self) {
        self.buf.push(tag::NULL);
    }
}

// ---------------------------------------------------------------------------
// BinaryReader
// ---------------------------------------------------------------------------

/// A numeric value as found on the wire, before conversion to the
/// declared field type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl Number {
    /// The exact integer value. Floats must be integral.
    pub fn to_integer(self, expected: &'static str) -> Result<i128, DecodeError> {
        match self {
            Number::Int(v) => Ok(i128::from(v)),
            Number::UInt(v) => Ok(i128::from(v)),
            Number::Float(v) => crate::value::integral_float(v, expected),
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::UInt(v) => v as f64,
            Number::Float(v) => v,
        }
    }
}

/// What an enum tag announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumHeader {
    Constant(u32),
    Wrapper(u32),
}

/// Cursor over a binary payload.
#[derive(Debug)]
pub struct BinaryReader<'a> {
    input: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub fn peek_tag(&self) -> Result<u8, DecodeError> {
        self.input
            .get(self.pos)
            .copied()
            .ok_or(DecodeError::UnexpectedEof(self.pos))
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let byte = self.peek_tag()?;
        self.pos += 1;
        Ok(byte)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::UnexpectedEof(self.input.len()));
        }
        let slice = &self.input[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Must be paired with [`BinaryReader::exit`] around nested reads.
    pub fn enter(&mut self) -> Result<(), DecodeError> {
        if self.depth >= MAX_DEPTH {
            return Err(DecodeError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn unexpected(&self, tag: u8, expected: &'static str) -> DecodeError {
        DecodeError::UnexpectedTag {
            tag,
            offset: self.pos.saturating_sub(1),
            expected,
        }
    }

    fn number_after_tag(&mut self, tag: u8, expected: &'static str) -> Result<Number, DecodeError> {
        Ok(match tag {
            0..=tag::MAX_SMALL => Number::UInt(tag as u64),
            tag::U16 => Number::UInt(u16::from_le_bytes(self.take_array()?) as u64),
            tag::U32 => Number::UInt(u32::from_le_bytes(self.take_array()?) as u64),
            tag::U64 => Number::UInt(u64::from_le_bytes(self.take_array()?)),
            tag::NEG_U8 => Number::Int(self.read_u8()? as i64 - 256),
            tag::NEG_U16 => Number::Int(u16::from_le_bytes(self.take_array()?) as i64 - 65536),
            tag::I32 => Number::Int(i32::from_le_bytes(self.take_array()?) as i64),
            tag::I64 | tag::TIMESTAMP => Number::Int(i64::from_le_bytes(self.take_array()?)),
            tag::F32 => Number::Float(f32::from_le_bytes(self.take_array()?) as f64),
            tag::F64 => Number::Float(f64::from_le_bytes(self.take_array()?)),
            other => return Err(self.unexpected(other, expected)),
        })
    }

    pub fn read_number(&mut self, expected: &'static str) -> Result<Number, DecodeError> {
        let tag = self.read_u8()?;
        self.number_after_tag(tag, expected)
    }

    /// Reads an unsigned integer used as a length or a number on the wire.
    pub fn read_uint(&mut self) -> Result<u64, DecodeError> {
        let tag = self.read_u8()?;
        match self.number_after_tag(tag, "length")? {
            Number::UInt(v) => Ok(v),
            _ => Err(self.unexpected(tag, "length")),
        }
    }

    fn read_len(&mut self) -> Result<usize, DecodeError> {
        let len = self.read_uint()?;
        let len = usize::try_from(len).map_err(|_| DecodeError::UnexpectedEof(self.input.len()))?;
        // Every element takes at least one byte, so this also bounds array
        // allocations by the input size.
        if len > self.remaining() {
            return Err(DecodeError::UnexpectedEof(self.input.len()));
        }
        Ok(len)
    }

    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        Ok(self.read_number("bool")?.as_f64() != 0.0)
    }

    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        let tag = self.read_u8()?;
        match tag {
            tag::EMPTY_STRING => Ok(String::new()),
            tag::STRING => {
                let len = self.read_len()?;
                let start = self.pos;
                let raw = self.take(len)?;
                String::from_utf8(raw.to_vec()).map_err(|_| DecodeError::InvalidUtf8(start))
            }
            // Zero collapses to the single byte 0.
            0 => Ok(String::new()),
            other => Err(self.unexpected(other, "string")),
        }
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let tag = self.read_u8()?;
        match tag {
            tag::EMPTY_BYTES | 0 => Ok(Vec::new()),
            tag::BYTES => {
                let len = self.read_len()?;
                Ok(self.take(len)?.to_vec())
            }
            other => Err(self.unexpected(other, "bytes")),
        }
    }

    /// Reads an array or struct header and returns the element count.
    pub fn read_array_len(&mut self) -> Result<usize, DecodeError> {
        let tag = self.read_u8()?;
        match tag {
            0 => Ok(0),
            tag::EMPTY_ARRAY..=249 => Ok((tag - tag::EMPTY_ARRAY) as usize),
            tag::ARRAY_N => self.read_len(),
            other => Err(self.unexpected(other, "array")),
        }
    }

    /// Returns `true` and consumes the tag when the next value is an absent
    /// optional.
    pub fn read_null(&mut self) -> Result<bool, DecodeError> {
        if self.peek_tag()? == tag::NULL {
            self.pos += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn read_enum_header(&mut self) -> Result<EnumHeader, DecodeError> {
        let tag = self.read_u8()?;
        match tag {
            0..=tag::F64 => {
                let number = self.number_after_tag(tag, "enum")?.to_integer("enum")?;
                Ok(EnumHeader::Constant(u32::try_from(number).unwrap_or(u32::MAX)))
            }
            tag::ARRAY_2 => {
                let number = self.read_uint()?;
                Ok(EnumHeader::Wrapper(u32::try_from(number).unwrap_or(u32::MAX)))
            }
            251..=254 => Ok(EnumHeader::Wrapper((tag - tag::WRAPPER_BASE) as u32)),
            other => Err(self.unexpected(other, "enum")),
        }
    }

    /// Skips one complete value of any shape.
    pub fn skip_value(&mut self) -> Result<(), DecodeError> {
        let tag = self.read_u8()?;
        match tag {
            0..=tag::F64 => {
                self.number_after_tag(tag, "value")?;
            }
            tag::EMPTY_STRING | tag::EMPTY_BYTES | tag::EMPTY_ARRAY | tag::NULL => {}
            tag::STRING | tag::BYTES => {
                let len = self.read_len()?;
                self.take(len)?;
            }
            247..=249 => self.skip_many((tag - tag::EMPTY_ARRAY) as usize)?,
            tag::ARRAY_N => {
                let len = self.read_len()?;
                self.skip_many(len)?;
            }
            251..=254 => self.skip_many(1)?,
        }
        Ok(())
    }

    fn skip_many(&mut self, count: usize) -> Result<(), DecodeError> {
        self.enter()?;
        for _ in 0..count {
            self.skip_value()?;
        }
        self.exit();
        Ok(())
    }
}
