//! Skir Demo
//!
//! Records and methods written the way the skir code generator emits them
//! (`user`, `service`), a user service built on them (`store`), and a
//! reflection-driven string capitalizer (`capitalize`).

use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::sync::Notify;

pub mod capitalize;
pub mod service;
pub mod store;
pub mod user;

/// Adds `GET /stop` to `app`. Each call wakes one waiter on `stop`, or the
/// next one if nobody is waiting yet.
pub fn with_stop_route(app: Router, stop: Arc<Notify>) -> Router {
    app.route(
        "/stop",
        get(move || async move {
            tracing::info!("stop requested");
            stop.notify_one();
            "Stopping server"
        }),
    )
}

/// Installs the `tracing` subscriber shared by the binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skir=debug,tower_http=debug".into()),
        )
        .init();
}
