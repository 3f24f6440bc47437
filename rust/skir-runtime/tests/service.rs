//! Tests for the method registry, the dispatcher, request framing and the
//! in-process transport.

mod common;

use common::*;
use parking_lot::Mutex;
use skir_runtime::__private::Lazy;
use skir_runtime::reflection::{StructDescriptor, StructType};
use skir_runtime::service::{
    invoke_remote, invoke_remote_as, HttpHeaders, Method, MethodCall, RegistryError,
    RawResponse, RequestContext, Service, Status, StatusKind, WireFormat, STATUS_KIND_HEADER,
};
use skir_runtime::{impl_struct, to_bytes};
use std::collections::HashMap;
use std::sync::Arc;

// ===========================================================================
// service.skir
// ===========================================================================

#[derive(Clone, Debug, Default)]
struct GetUserRequest {
    user_id: i64,
}

impl StructType for GetUserRequest {
    fn descriptor() -> &'static StructDescriptor<Self> {
        static DESCRIPTOR: Lazy<StructDescriptor<GetUserRequest>> = Lazy::new(|| {
            StructDescriptor::<GetUserRequest>::new("service.skir", "GetUserRequest")
                .field("user_id", 0, |r| &r.user_id, |r| &mut r.user_id)
        });
        &DESCRIPTOR
    }
}

impl_struct!(GetUserRequest);

#[derive(Clone, Debug, Default)]
struct GetUserResponse {
    user: Option<User>,
}

impl StructType for GetUserResponse {
    fn descriptor() -> &'static StructDescriptor<Self> {
        static DESCRIPTOR: Lazy<StructDescriptor<GetUserResponse>> = Lazy::new(|| {
            StructDescriptor::<GetUserResponse>::new("service.skir", "GetUserResponse")
                .field("user", 0, |r| &r.user, |r| &mut r.user)
        });
        &DESCRIPTOR
    }
}

impl_struct!(GetUserResponse);

#[derive(Clone, Debug, Default)]
struct AddUserRequest {
    user: User,
}

impl StructType for AddUserRequest {
    fn descriptor() -> &'static StructDescriptor<Self> {
        static DESCRIPTOR: Lazy<StructDescriptor<AddUserRequest>> = Lazy::new(|| {
            StructDescriptor::<AddUserRequest>::new("service.skir", "AddUserRequest")
                .field("user", 0, |r| &r.user, |r| &mut r.user)
        });
        &DESCRIPTOR
    }
}

impl_struct!(AddUserRequest);

#[derive(Clone, Debug, Default)]
struct AddUserResponse {}

impl StructType for AddUserResponse {
    fn descriptor() -> &'static StructDescriptor<Self> {
        static DESCRIPTOR: Lazy<StructDescriptor<AddUserResponse>> =
            Lazy::new(|| StructDescriptor::<AddUserResponse>::new("service.skir", "AddUserResponse"));
        &DESCRIPTOR
    }
}

impl_struct!(AddUserResponse);

const GET_USER: Method<GetUserRequest, GetUserResponse> = Method::new("GetUser", 2_903_424_817);
const ADD_USER: Method<AddUserRequest, AddUserResponse> = Method::new("AddUser", 4_124_120_412);

// ===========================================================================
// Helpers
// ===========================================================================

type Store = Arc<Mutex<HashMap<i64, User>>>;

fn build_service(store: Store) -> Service {
    let get_store = store.clone();
    Service::builder()
        .method(&GET_USER, move |req: GetUserRequest, ctx: RequestContext| {
            let store = get_store.clone();
            async move {
                if req.user_id == 0 {
                    return Err(Status::unknown("invalid user id: 0"));
                }
                if let Some(trace) = ctx.request_headers().get("x-trace-id") {
                    ctx.set_response_header("X-Trace-Id", trace);
                }
                Ok(GetUserResponse {
                    user: store.lock().get(&req.user_id).cloned(),
                })
            }
        })
        .method(&ADD_USER, move |req: AddUserRequest, _ctx: RequestContext| {
            let store = store.clone();
            async move {
                if req.user.name.is_empty() {
                    return Err(Status::invalid_argument("user name is required"));
                }
                store.lock().insert(req.user.user_id, req.user);
                Ok(AddUserResponse {})
            }
        })
        .build()
        .unwrap()
}

fn service() -> Service {
    build_service(Arc::default())
}

// ===========================================================================
// Registry
// ===========================================================================

#[test]
fn service_rejects_duplicate_names() {
    let clash: Method<GetUserRequest, GetUserResponse> = Method::new("GetUser", 1);
    let err = Service::builder()
        .method(&GET_USER, |_req: GetUserRequest, _ctx: RequestContext| async {
            Ok::<_, Status>(GetUserResponse::default())
        })
        .method(&clash, |_req: GetUserRequest, _ctx: RequestContext| async {
            Ok::<_, Status>(GetUserResponse::default())
        })
        .build()
        .unwrap_err();
    assert_eq!(err, RegistryError::DuplicateName("GetUser".into()));
}

#[test]
fn service_rejects_duplicate_numbers() {
    let clash: Method<AddUserRequest, AddUserResponse> = Method::new("Other", GET_USER.number());
    let err = Service::builder()
        .method(&GET_USER, |_req: GetUserRequest, _ctx: RequestContext| async {
            Ok::<_, Status>(GetUserResponse::default())
        })
        .method(&clash, |_req: AddUserRequest, _ctx: RequestContext| async {
            Ok::<_, Status>(AddUserResponse {})
        })
        .build()
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateNumber { number: 2_903_424_817, .. }));
}

#[test]
fn service_lists_methods() {
    let listing = service().list_methods();
    assert_eq!(listing.methods.len(), 2);
    let get_user = &listing.methods[0];
    assert_eq!(get_user.method, "GetUser");
    assert_eq!(get_user.number, 2_903_424_817);
    assert_eq!(get_user.request_type_name(), "GetUserRequest");
    assert_eq!(get_user.response_type_name(), "GetUserResponse");
    assert!(get_user.response.record("user.skir:User").is_some());

    let json: serde_json::Value = serde_json::from_str(&listing.to_json()).unwrap();
    assert_eq!(json["methods"][1]["method"], "AddUser");
}

// ===========================================================================
// Dispatch
// ===========================================================================

#[tokio::test]
async fn service_add_then_get() {
    let service = service();
    let add = MethodCall::new(&ADD_USER, &AddUserRequest { user: lyla() }, WireFormat::Dense);
    service.dispatch(add, HttpHeaders::new()).await.unwrap();

    let get = MethodCall::new(&GET_USER, &GetUserRequest { user_id: 44 }, WireFormat::Readable);
    let response = service.dispatch(get, HttpHeaders::new()).await.unwrap();
    assert_eq!(response.format, WireFormat::Readable);
    let decoded: GetUserResponse =
        skir_runtime::from_json(std::str::from_utf8(&response.payload).unwrap()).unwrap();
    assert_eq!(decoded.user, Some(lyla()));
}

#[tokio::test]
async fn service_unknown_method_is_not_found() {
    let service = service();
    let call = MethodCall::parse(b"DeleteUser:7::[]").unwrap();
    let err = service.dispatch(call, HttpHeaders::new()).await.unwrap_err();
    assert_eq!(err.kind, StatusKind::NotFound);
}

#[tokio::test]
async fn service_resolves_by_name_without_number() {
    let service = service();
    let call = MethodCall::parse(b"GetUser:::[43]").unwrap();
    let response = service.dispatch(call, HttpHeaders::new()).await.unwrap();
    assert_eq!(response.payload, b"[]");
}

#[tokio::test]
async fn service_number_wins_over_name() {
    let service = service();
    let body = format!("RenamedGetUser:{}::[43]", GET_USER.number());
    let call = MethodCall::parse(body.as_bytes()).unwrap();
    assert!(service.dispatch(call, HttpHeaders::new()).await.is_ok());
}

#[tokio::test]
async fn service_bad_payload_is_invalid_argument() {
    let service = service();
    let call = MethodCall::parse(b"GetUser:::{\"user_id\": [1]}").unwrap();
    let err = service.dispatch(call, HttpHeaders::new()).await.unwrap_err();
    assert_eq!(err.kind, StatusKind::InvalidArgument);
}

#[tokio::test]
async fn service_handler_error_is_passed_through() {
    let service = service();
    let call = MethodCall::new(&GET_USER, &GetUserRequest { user_id: 0 }, WireFormat::Dense);
    let err = service.dispatch(call, HttpHeaders::new()).await.unwrap_err();
    assert_eq!(err, Status::unknown("invalid user id: 0"));
}

#[tokio::test]
async fn service_headers_flow_both_ways() {
    let service = service();
    let headers: HttpHeaders = [("X-Trace-Id", "abc123")].into_iter().collect();
    let call = MethodCall::new(&GET_USER, &GetUserRequest { user_id: 1 }, WireFormat::Dense);
    let response = service.dispatch(call, headers).await.unwrap();
    assert_eq!(response.headers.get("x-trace-id"), Some("abc123"));
}

// ===========================================================================
// Framing
// ===========================================================================

#[tokio::test]
async fn service_handle_request_maps_status_codes() {
    let service = service();

    let ok = service.handle_request(b"GetUser:::[42]", HttpHeaders::new()).await;
    assert_eq!(ok.status_code, 200);
    assert_eq!(ok.content_type, "application/json");

    let not_found = service.handle_request(b"Nope:::[]", HttpHeaders::new()).await;
    assert_eq!(not_found.status_code, 404);
    assert!(not_found.content_type.starts_with("text/plain"));

    let malformed = service.handle_request(b"garbage", HttpHeaders::new()).await;
    assert_eq!(malformed.status_code, 400);

    let failed = service.handle_request(b"GetUser:::[0]", HttpHeaders::new()).await;
    assert_eq!(failed.status_code, 500);
    assert_eq!(failed.body, b"invalid user id: 0");
    assert_eq!(failed.headers.get(STATUS_KIND_HEADER), Some("UNKNOWN"));
    assert_eq!(not_found.headers.get(STATUS_KIND_HEADER), Some("NOT_FOUND"));
    assert_eq!(ok.headers.get(STATUS_KIND_HEADER), None);
}

#[tokio::test]
async fn service_handle_request_binary() {
    let service = service();
    let mut body = format!("GetUser:{}:binary:", GET_USER.number()).into_bytes();
    body.extend_from_slice(&to_bytes(&GetUserRequest { user_id: 1 }));
    let response = service.handle_request(&body, HttpHeaders::new()).await;
    assert_eq!(response.status_code, 200);
    assert_eq!(response.content_type, "application/octet-stream");
    assert_eq!(response.body, to_bytes(&GetUserResponse::default()));
}

#[tokio::test]
async fn service_handle_request_list() {
    let response = service().handle_request(b"list", HttpHeaders::new()).await;
    assert_eq!(response.status_code, 200);
    let json: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(json["methods"][0]["method"], "GetUser");
}

// ===========================================================================
// In-process transport
// ===========================================================================

#[tokio::test]
async fn service_invoke_remote_in_process() {
    let service = service();
    for user in [john(), jane(), lyla()] {
        invoke_remote(&service, &ADD_USER, &AddUserRequest { user }, HttpHeaders::new())
            .await
            .unwrap();
    }
    let response = invoke_remote_as(
        &service,
        &GET_USER,
        &GetUserRequest { user_id: 43 },
        HttpHeaders::new(),
        WireFormat::Binary,
    )
    .await
    .unwrap();
    assert_eq!(response.user, Some(jane()));

    let err = invoke_remote(
        &service,
        &ADD_USER,
        &AddUserRequest::default(),
        HttpHeaders::new(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind, StatusKind::InvalidArgument);
    assert_eq!(err.message, "user name is required");
}

#[tokio::test]
async fn service_invoke_remote_keeps_unknown_and_internal_apart() {
    let service = service();
    let err = invoke_remote(
        &service,
        &GET_USER,
        &GetUserRequest { user_id: 0 },
        HttpHeaders::new(),
    )
    .await
    .unwrap_err();
    assert_eq!(err, Status::unknown("invalid user id: 0"));

    let mut internal = RawResponse::error(&Status::internal("boom"));
    assert_eq!(internal.status(), Some(Status::internal("boom")));

    // Without the kind header only the HTTP code is left to go on.
    internal.headers = HttpHeaders::new();
    assert_eq!(internal.status().map(|s| s.kind), Some(StatusKind::Internal));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn service_concurrent_dispatch() {
    let store: Store = Arc::default();
    let service = Arc::new(build_service(store.clone()));
    let mut tasks = Vec::new();
    for id in 1..=64i64 {
        let service = service.clone();
        tasks.push(tokio::spawn(async move {
            let user = User {
                user_id: id,
                name: format!("user-{id}"),
                ..User::default()
            };
            invoke_remote(&*service, &ADD_USER, &AddUserRequest { user }, HttpHeaders::new())
                .await
                .unwrap();
            invoke_remote(&*service, &GET_USER, &GetUserRequest { user_id: id }, HttpHeaders::new())
                .await
                .unwrap()
        }));
    }
    for (i, task) in tasks.into_iter().enumerate() {
        let response = task.await.unwrap();
        assert_eq!(response.user.map(|u| u.name), Some(format!("user-{}", i + 1)));
    }
    assert_eq!(store.lock().len(), 64);
}
