//! Skir HTTP
//!
//! Serves a [`skir_runtime::service::Service`] over HTTP with axum and
//! calls remote services with reqwest.
//!
//! - `POST <path>` with a request frame as the body invokes a method
//! - `GET <path>?list` returns the method listing
//! - `GET <path>?<percent-encoded request frame>` invokes a method

pub mod client;
pub mod config;
pub mod server;

pub use client::HttpTransport;
pub use config::{ClientConfig, ServerConfig};
pub use server::{router, serve, serve_router, ServerError};
