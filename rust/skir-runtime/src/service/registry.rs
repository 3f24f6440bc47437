//! The method table and the dispatcher.

use super::headers::HttpHeaders;
use super::method::{BoxFuture, Method, MethodHandler, RequestContext};
use super::status::Status;
use super::wire::{MethodCall, RawResponse, WireFormat, JSON_CONTENT_TYPE};
use crate::reflection::descriptor::TypeDescriptor;
use crate::value::SkirType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("method name '{0}' is registered twice")]
    DuplicateName(String),
    #[error("method number {number} is used by both '{first}' and '{second}'")]
    DuplicateNumber {
        number: u32,
        first: String,
        second: String,
    },
}

// ---------------------------------------------------------------------------
// Type-erased methods
// ---------------------------------------------------------------------------

trait ErasedMethod: Send + Sync {
    fn name(&self) -> &'static str;
    fn number(&self) -> u32;
    fn info(&self) -> MethodInfo;
    fn invoke(
        &self,
        payload: &[u8],
        format: WireFormat,
        context: RequestContext,
    ) -> BoxFuture<'static, Result<Vec<u8>, Status>>;
}

struct Registered<Req, Resp, H> {
    method: Method<Req, Resp>,
    handler: H,
}

impl<Req, Resp, H> ErasedMethod for Registered<Req, Resp, H>
where
    Req: SkirType,
    Resp: SkirType,
    H: MethodHandler<Req, Resp>,
{
    fn name(&self) -> &'static str {
        self.method.name()
    }

    fn number(&self) -> u32 {
        self.method.number()
    }

    fn info(&self) -> MethodInfo {
        MethodInfo {
            method: self.method.name().to_string(),
            number: self.method.number(),
            request: TypeDescriptor::of::<Req>(),
            response: TypeDescriptor::of::<Resp>(),
        }
    }

    fn invoke(
        &self,
        payload: &[u8],
        format: WireFormat,
        context: RequestContext,
    ) -> BoxFuture<'static, Result<Vec<u8>, Status>> {
        let request = match format.decode::<Req>(payload) {
            Ok(request) => request,
            Err(err) => return Box::pin(async move { Err(Status::from(err)) }),
        };
        let response = self.handler.call(request, context);
        Box::pin(async move { Ok(format.encode(&response.await?)) })
    }
}

// ---------------------------------------------------------------------------
// Method listing
// ---------------------------------------------------------------------------

/// One entry of the discovery listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub method: String,
    pub number: u32,
    pub request: TypeDescriptor,
    pub response: TypeDescriptor,
}

impl MethodInfo {
    /// E.g. `GetUserRequest`.
    pub fn request_type_name(&self) -> String {
        self.request.root.to_string()
    }

    pub fn response_type_name(&self) -> String {
        self.response.root.to_string()
    }
}

/// Body served for `?list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodListing {
    pub methods: Vec<MethodInfo>,
}

impl MethodListing {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct ServiceBuilder {
    methods: Vec<Box<dyn ErasedMethod>>,
}

impl ServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` as the implementation of `method`.
    pub fn method<Req, Resp, H>(mut self, method: &Method<Req, Resp>, handler: H) -> Self
    where
        Req: SkirType,
        Resp: SkirType,
        H: MethodHandler<Req, Resp>,
    {
        self.methods.push(Box::new(Registered {
            method: *method,
            handler,
        }));
        self
    }

    pub fn build(self) -> Result<Service, RegistryError> {
        let mut by_number: HashMap<u32, usize> = HashMap::new();
        let mut by_name: HashMap<&'static str, usize> = HashMap::new();
        for (i, method) in self.methods.iter().enumerate() {
            if by_name.insert(method.name(), i).is_some() {
                return Err(RegistryError::DuplicateName(method.name().to_string()));
            }
            if let Some(first) = by_number.insert(method.number(), i) {
                return Err(RegistryError::DuplicateNumber {
                    number: method.number(),
                    first: self.methods[first].name().to_string(),
                    second: method.name().to_string(),
                });
            }
        }
        Ok(Service {
            methods: self.methods,
            by_number,
            by_name,
        })
    }
}

/// The server side of an RPC interface: an immutable method table plus the
/// dispatcher. Share it as `Arc<Service>`.
pub struct Service {
    methods: Vec<Box<dyn ErasedMethod>>,
    by_number: HashMap<u32, usize>,
    by_name: HashMap<&'static str, usize>,
}

/// A successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodResponse {
    pub payload: Vec<u8>,
    pub format: WireFormat,
    pub headers: HttpHeaders,
}

impl Service {
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Registered methods in registration order.
    pub fn list_methods(&self) -> MethodListing {
        MethodListing {
            methods: self.methods.iter().map(|m| m.info()).collect(),
        }
    }

    fn resolve(&self, call: &MethodCall) -> Option<&dyn ErasedMethod> {
        let index = match call.number {
            Some(number) => self.by_number.get(&number),
            None => self.by_name.get(call.method.as_str()),
        };
        index.map(|i| self.methods[*i].as_ref())
    }

    /// Runs one call. Handler errors are returned unchanged.
    pub async fn dispatch(
        &self,
        call: MethodCall,
        headers: HttpHeaders,
    ) -> Result<MethodResponse, Status> {
        let Some(method) = self.resolve(&call) else {
            warn!(method = %call.method, number = ?call.number, "method not found");
            return Err(Status::not_found(match call.number {
                Some(number) => format!("method not found: {}:{number}", call.method),
                None => format!("method not found: {}", call.method),
            }));
        };
        debug!(
            method = method.name(),
            number = method.number(),
            format = call.format.as_str(),
            "dispatching"
        );
        let context = RequestContext::new(headers);
        let result = method
            .invoke(&call.payload, call.format, context.clone())
            .await;
        match result {
            Ok(payload) => Ok(MethodResponse {
                payload,
                format: call.format,
                headers: context.response_headers(),
            }),
            Err(status) => {
                warn!(method = method.name(), %status, "call failed");
                Err(status)
            }
        }
    }

    /// Parses a request frame, dispatches it and renders the result as an
    /// HTTP-shaped response. The body `list` returns the method listing.
    pub async fn handle_request(&self, body: &[u8], headers: HttpHeaders) -> RawResponse {
        if std::str::from_utf8(body).map(str::trim) == Ok("list") {
            return RawResponse::ok(
                JSON_CONTENT_TYPE,
                self.list_methods().to_json().into_bytes(),
                HttpHeaders::new(),
            );
        }
        let call = match MethodCall::parse(body) {
            Ok(call) => call,
            Err(status) => return RawResponse::error(&status),
        };
        match self.dispatch(call, headers).await {
            Ok(response) => RawResponse::ok(
                response.format.content_type(),
                response.payload,
                response.headers,
            ),
            Err(status) => RawResponse::error(&status),
        }
    }
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field(
                "methods",
                &self
                    .methods
                    .iter()
                    .map(|m| (m.name(), m.number()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
