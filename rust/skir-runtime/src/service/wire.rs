//! Request framing.
//!
//! A request body is `<name>:<number>:<format>:<payload>`. The number may be
//! empty, in which case the method is resolved by name. The format is empty
//! for dense JSON, `readable` or `binary`; the payload runs to the end of the
//! body and is raw bytes for `binary`.
//!
//! ```text
//! GetUser:2903424817::[42]
//! GetUser::readable:{"user_id": 42}
//! ```

use super::headers::HttpHeaders;
use super::method::Method;
use super::status::{Status, StatusKind};
use crate::codec;
use crate::error::DecodeError;
use crate::value::SkirType;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const BINARY_CONTENT_TYPE: &str = "application/octet-stream";
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
/// Response header naming the [`StatusKind`] of a failed call, since HTTP
/// codes alone do not tell `Unknown` from `Internal`.
pub const STATUS_KIND_HEADER: &str = "x-skir-status";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WireFormat {
    #[default]
    Dense,
    Readable,
    Binary,
}

impl WireFormat {
    pub fn parse(s: &str) -> Result<Self, Status> {
        match s {
            "" | "dense" => Ok(WireFormat::Dense),
            "readable" => Ok(WireFormat::Readable),
            "binary" => Ok(WireFormat::Binary),
            other => Err(Status::invalid_argument(format!(
                "unknown request format {other:?}"
            ))),
        }
    }

    /// Token used in the request frame.
    pub fn as_str(self) -> &'static str {
        match self {
            WireFormat::Dense => "",
            WireFormat::Readable => "readable",
            WireFormat::Binary => "binary",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            WireFormat::Dense | WireFormat::Readable => JSON_CONTENT_TYPE,
            WireFormat::Binary => BINARY_CONTENT_TYPE,
        }
    }

    pub fn decode<T: SkirType>(self, payload: &[u8]) -> Result<T, DecodeError> {
        match self {
            WireFormat::Dense | WireFormat::Readable => {
                let text = std::str::from_utf8(payload)
                    .map_err(|e| DecodeError::InvalidUtf8(e.valid_up_to()))?;
                codec::from_json(text)
            }
            WireFormat::Binary => codec::from_bytes(payload),
        }
    }

    pub fn encode<T: SkirType>(self, value: &T) -> Vec<u8> {
        match self {
            WireFormat::Dense => codec::to_dense_json(value).into_bytes(),
            WireFormat::Readable => codec::to_readable_json(value).into_bytes(),
            WireFormat::Binary => codec::to_bytes(value),
        }
    }
}

/// A parsed request frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub method: String,
    pub number: Option<u32>,
    pub format: WireFormat,
    pub payload: Vec<u8>,
}

impl MethodCall {
    pub fn new<Req: SkirType, Resp>(
        method: &Method<Req, Resp>,
        request: &Req,
        format: WireFormat,
    ) -> Self {
        Self {
            method: method.name().to_string(),
            number: Some(method.number()),
            format,
            payload: format.encode(request),
        }
    }

    pub fn parse(body: &[u8]) -> Result<Self, Status> {
        let mut parts = body.splitn(4, |b| *b == b':');
        let (Some(name), Some(number), Some(format), Some(payload)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(Status::invalid_argument(
                "malformed request: expected <method>:<number>:<format>:<payload>",
            ));
        };
        let method = text(name, "method name")?.to_string();
        let number = match text(number, "method number")? {
            "" => None,
            digits => Some(digits.parse::<u32>().map_err(|_| {
                Status::invalid_argument(format!("malformed request: bad method number {digits:?}"))
            })?),
        };
        if method.is_empty() && number.is_none() {
            return Err(Status::invalid_argument(
                "malformed request: missing method name and number",
            ));
        }
        let format = WireFormat::parse(text(format, "format")?)?;
        Ok(Self {
            method,
            number,
            format,
            payload: payload.to_vec(),
        })
    }

    /// The frame bytes, inverse of [`MethodCall::parse`].
    pub fn encode(&self) -> Vec<u8> {
        let number = self.number.map(|n| n.to_string()).unwrap_or_default();
        let mut body = format!("{}:{}:{}:", self.method, number, self.format.as_str()).into_bytes();
        body.extend_from_slice(&self.payload);
        body
    }
}

fn text<'a>(part: &'a [u8], what: &str) -> Result<&'a str, Status> {
    std::str::from_utf8(part)
        .map(str::trim)
        .map_err(|_| Status::invalid_argument(format!("malformed request: {what} is not UTF-8")))
}

/// What the transport sends back for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status_code: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub headers: HttpHeaders,
}

impl RawResponse {
    pub fn ok(content_type: &'static str, body: Vec<u8>, headers: HttpHeaders) -> Self {
        Self {
            status_code: 200,
            content_type,
            body,
            headers,
        }
    }

    pub fn error(status: &Status) -> Self {
        let mut headers = HttpHeaders::new();
        headers.set(STATUS_KIND_HEADER, status.kind.as_str());
        Self {
            status_code: status.http_code(),
            content_type: TEXT_CONTENT_TYPE,
            body: status.message.clone().into_bytes(),
            headers,
        }
    }

    /// The failure this response reports, if any. The kind comes from
    /// [`STATUS_KIND_HEADER`] when present, from the HTTP code otherwise.
    pub fn status(&self) -> Option<Status> {
        if self.is_success() {
            return None;
        }
        let kind = self
            .headers
            .get(STATUS_KIND_HEADER)
            .and_then(StatusKind::from_name)
            .unwrap_or_else(|| StatusKind::from_http_code(self.status_code));
        Some(Status::new(kind, String::from_utf8_lossy(&self.body).into_owned()))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}
