//! Starts the user service on http://localhost:8787/myapi.
//!
//! ```text
//! cargo run -p skir-demo --bin service_start
//! ```
//!
//! Then send it requests with the `service_client` binary, or open
//! http://localhost:8787/myapi?list to see its methods. Visit
//! http://localhost:8787/stop to shut the server down.

use skir_demo::store::{user_service, UserStore};
use skir_demo::with_stop_route;
use skir_http::ServerConfig;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    skir_demo::init_tracing();

    let config = ServerConfig::from_env();
    let service = Arc::new(user_service(Arc::new(UserStore::new()))?);

    let stop = Arc::new(Notify::new());
    let app = with_stop_route(skir_http::router(service, &config.service_path), stop.clone());

    info!("Go to {}?list to see all methods", config.url());
    skir_http::serve_router(app, &config, async move { stop.notified().await }).await?;

    Ok(())
}
