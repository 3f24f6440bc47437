//! RPC: typed methods, the service dispatcher and the request framing.
//!
//! ```rust,ignore
//! let service = Service::builder()
//!     .method(&GET_USER, |req: GetUserRequest, _ctx| async move {
//!         Ok(GetUserResponse { user: lookup(req.user_id) })
//!     })
//!     .build()?;
//! let response = service.handle_request(b"GetUser:::[42]", HttpHeaders::new()).await;
//! ```

pub mod client;
pub mod headers;
pub mod method;
pub mod registry;
pub mod status;
pub mod wire;

pub use client::{invoke_remote, invoke_remote_as, Transport};
pub use headers::{HttpHeader, HttpHeaders};
pub use method::{BoxFuture, Method, MethodHandler, RequestContext};
pub use registry::{MethodInfo, MethodListing, MethodResponse, RegistryError, Service, ServiceBuilder};
pub use status::{Status, StatusKind};
pub use wire::{MethodCall, RawResponse, WireFormat, STATUS_KIND_HEADER};
