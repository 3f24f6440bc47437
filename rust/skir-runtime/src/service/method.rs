//! Typed method identities and handlers.

use super::headers::HttpHeaders;
use super::status::Status;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A remote method: request type, response type, name and stable number.
///
/// Generated code declares one `const` per method:
///
/// ```rust,ignore
/// pub const GET_USER: Method<GetUserRequest, GetUserResponse> =
///     Method::new("GetUser", 2_903_424_817);
/// ```
pub struct Method<Req, Resp> {
    name: &'static str,
    number: u32,
    _types: PhantomData<fn(Req) -> Resp>,
}

impl<Req, Resp> Method<Req, Resp> {
    pub const fn new(name: &'static str, number: u32) -> Self {
        Self {
            name,
            number,
            _types: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn number(&self) -> u32 {
        self.number
    }
}

impl<Req, Resp> Clone for Method<Req, Resp> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Req, Resp> Copy for Method<Req, Resp> {}

impl<Req, Resp> fmt::Debug for Method<Req, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("number", &self.number)
            .finish()
    }
}

/// Per-call context: the request headers, and a slot for response headers.
///
/// Clones share the response header slot.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    request_headers: Arc<HttpHeaders>,
    response_headers: Arc<Mutex<HttpHeaders>>,
}

impl RequestContext {
    pub fn new(request_headers: HttpHeaders) -> Self {
        Self {
            request_headers: Arc::new(request_headers),
            response_headers: Arc::default(),
        }
    }

    pub fn request_headers(&self) -> &HttpHeaders {
        &self.request_headers
    }

    /// Adds a header to the response.
    pub fn insert_response_header(&self, name: impl Into<String>, value: impl Into<String>) {
        self.response_headers.lock().insert(name, value);
    }

    pub fn set_response_header(&self, name: impl Into<String>, value: impl Into<String>) {
        self.response_headers.lock().set(name, value);
    }

    pub fn response_headers(&self) -> HttpHeaders {
        self.response_headers.lock().clone()
    }
}

/// Server-side implementation of one method.
///
/// Implemented for every `Fn(Req, RequestContext) -> impl Future<Output =
/// Result<Resp, Status>>`, so an async closure is a handler.
pub trait MethodHandler<Req, Resp>: Send + Sync + 'static {
    fn call(&self, request: Req, context: RequestContext) -> BoxFuture<'static, Result<Resp, Status>>;
}

impl<F, Fut, Req, Resp> MethodHandler<Req, Resp> for F
where
    F: Fn(Req, RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Resp, Status>> + Send + 'static,
{
    fn call(&self, request: Req, context: RequestContext) -> BoxFuture<'static, Result<Resp, Status>> {
        Box::pin(self(request, context))
    }
}
