//! axum binding for a [`Service`].

use crate::config::ServerConfig;
use axum::{
    body::{Body, Bytes},
    extract::{RawQuery, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use skir_runtime::service::{HttpHeaders, RawResponse, Service, Status};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("cannot bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server failed: {0}")]
    Serve(#[source] std::io::Error),
}

/// Builds a router serving `service` at `path`.
pub fn router(service: Arc<Service>, path: &str) -> Router {
    Router::new()
        .route(path, get(handle_get).post(handle_post))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Binds the configured address and serves until the process stops.
pub async fn serve(service: Arc<Service>, config: &ServerConfig) -> Result<(), ServerError> {
    debug!(methods = service.len(), "mounting skir service");
    serve_router(
        router(service, &config.service_path),
        config,
        std::future::pending(),
    )
    .await
}

/// Binds the configured address and serves `app` until `shutdown` resolves.
/// In-flight requests are allowed to finish.
pub async fn serve_router<F>(
    app: Router,
    config: &ServerConfig,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let address = config.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
    info!(address = %address, path = %config.service_path, "serving skir service");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)?;
    info!("server stopped");
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

async fn handle_post(
    State(service): State<Arc<Service>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let response = service.handle_request(&body, to_skir_headers(&headers)).await;
    to_http_response(response)
}

async fn handle_get(
    State(service): State<Arc<Service>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let Some(query) = query.filter(|q| !q.is_empty()) else {
        return to_http_response(RawResponse::error(&Status::invalid_argument(
            "missing request in query string",
        )));
    };
    let frame = urlencoding::decode_binary(query.as_bytes()).into_owned();
    debug!(bytes = frame.len(), "request from query string");
    let response = service.handle_request(&frame, to_skir_headers(&headers)).await;
    to_http_response(response)
}

// =============================================================================
// Header and response conversion
// =============================================================================

fn to_skir_headers(headers: &HeaderMap) -> HttpHeaders {
    headers
        .iter()
        .filter_map(|(name, value)| match value.to_str() {
            Ok(value) => Some((name.as_str().to_string(), value.to_string())),
            Err(_) => {
                debug!(header = %name, "dropping non-text request header");
                None
            }
        })
        .collect()
}

fn to_http_response(raw: RawResponse) -> Response {
    let status = StatusCode::from_u16(raw.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = Response::new(Body::from(raw.body));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(raw.content_type));
    for entry in raw.headers.iter() {
        match (
            HeaderName::from_bytes(entry.name.as_bytes()),
            HeaderValue::from_str(&entry.value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => warn!(header = %entry.name, "dropping invalid response header"),
        }
    }
    response
}
