//! Client side of a service.

use super::headers::HttpHeaders;
use super::method::{BoxFuture, Method};
use super::registry::Service;
use super::status::Status;
use super::wire::{MethodCall, RawResponse, WireFormat};
use crate::codec;
use crate::value::SkirType;

/// Carries a request frame to a service and brings back its response.
pub trait Transport: Send + Sync {
    fn send(&self, body: Vec<u8>, headers: HttpHeaders) -> BoxFuture<'_, Result<RawResponse, Status>>;
}

/// In-process calls, without any network hop.
impl Transport for Service {
    fn send(&self, body: Vec<u8>, headers: HttpHeaders) -> BoxFuture<'_, Result<RawResponse, Status>> {
        Box::pin(async move { Ok(self.handle_request(&body, headers).await) })
    }
}

/// Calls `method` through `transport` using dense JSON.
pub async fn invoke_remote<T, Req, Resp>(
    transport: &T,
    method: &Method<Req, Resp>,
    request: &Req,
    headers: HttpHeaders,
) -> Result<Resp, Status>
where
    T: Transport + ?Sized,
    Req: SkirType,
    Resp: SkirType,
{
    invoke_remote_as(transport, method, request, headers, WireFormat::Dense).await
}

/// Like [`invoke_remote`], with an explicit wire format.
pub async fn invoke_remote_as<T, Req, Resp>(
    transport: &T,
    method: &Method<Req, Resp>,
    request: &Req,
    headers: HttpHeaders,
    format: WireFormat,
) -> Result<Resp, Status>
where
    T: Transport + ?Sized,
    Req: SkirType,
    Resp: SkirType,
{
    let call = MethodCall::new(method, request, format);
    let response = transport.send(call.encode(), headers).await?;
    if let Some(status) = response.status() {
        return Err(status);
    }
    codec::parse(&response.body)
        .map_err(|err| Status::internal(format!("undecodable response from {}: {err}", method.name())))
}
