//! Visitors for generic deep traversal.
//!
//! [`SkirType::accept`](crate::SkirType::accept) and
//! [`SkirType::accept_mut`](crate::SkirType::accept_mut) walk every
//! primitive reachable from a value: struct fields in number order, the
//! active wrapper payload of an enum, array items and present optionals.
//! Every hook has an empty default, so a visitor overrides only what it
//! cares about.
//!
//! ```rust
//! use skir_runtime::reflection::visit::VisitorMut;
//! use skir_runtime::SkirType;
//!
//! struct Upper;
//! impl VisitorMut for Upper {
//!     fn visit_string(&mut self, value: &mut String) {
//!         *value = value.to_uppercase();
//!     }
//! }
//!
//! let mut names = vec![Some("rex".to_string()), None];
//! names.accept_mut(&mut Upper);
//! assert_eq!(names, vec![Some("REX".to_string()), None]);
//! ```

use crate::bytes::ByteString;
use crate::timestamp::Timestamp;

pub trait Visitor {
    fn visit_bool(&mut self, _value: bool) {}
    fn visit_i32(&mut self, _value: i32) {}
    fn visit_i64(&mut self, _value: i64) {}
    fn visit_u64(&mut self, _value: u64) {}
    fn visit_f32(&mut self, _value: f32) {}
    fn visit_f64(&mut self, _value: f64) {}
    fn visit_timestamp(&mut self, _value: Timestamp) {}
    fn visit_string(&mut self, _value: &str) {}
    fn visit_bytes(&mut self, _value: &ByteString) {}
}

pub trait VisitorMut {
    fn visit_bool(&mut self, _value: &mut bool) {}
    fn visit_i32(&mut self, _value: &mut i32) {}
    fn visit_i64(&mut self, _value: &mut i64) {}
    fn visit_u64(&mut self, _value: &mut u64) {}
    fn visit_f32(&mut self, _value: &mut f32) {}
    fn visit_f64(&mut self, _value: &mut f64) {}
    fn visit_timestamp(&mut self, _value: &mut Timestamp) {}
    fn visit_string(&mut self, _value: &mut String) {}
    fn visit_bytes(&mut self, _value: &mut ByteString) {}
}

/// Collects every string reachable from a value, in traversal order.
#[derive(Debug, Default)]
pub struct StringCollector {
    pub strings: Vec<String>,
}

impl Visitor for StringCollector {
    fn visit_string(&mut self, value: &str) {
        self.strings.push(value.to_string());
    }
}
