//! Skir Runtime
//!
//! The record runtime that skir-generated types build on: the value model,
//! the binary / dense JSON / readable JSON codecs, static and dynamic
//! reflection, keyed arrays, and the RPC method registry and dispatcher.
//!
//! Generated code implements [`SkirType`] for its records with the
//! [`impl_struct!`] and [`impl_enum!`] macros, which delegate to the
//! reflection-driven algorithms in [`record`].

pub mod binary;
pub mod bytes;
pub mod codec;
pub mod error;
pub mod keyed;
pub mod record;
pub mod reflection;
pub mod service;
pub mod timestamp;
pub mod value;

pub use bytes::ByteString;
pub use codec::{from_bytes, from_json, parse, to_bytes, to_dense_json, to_readable_json};
pub use error::DecodeError;
pub use keyed::{KeyExtractor, KeyedItems};
pub use timestamp::Timestamp;
pub use value::{JsonFlavor, SkirType};

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
    pub use serde_json::Value;
}
