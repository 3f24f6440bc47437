//! reqwest-backed [`Transport`].

use crate::config::ClientConfig;
use reqwest::header::CONTENT_TYPE;
use skir_runtime::service::wire::{BINARY_CONTENT_TYPE, JSON_CONTENT_TYPE, TEXT_CONTENT_TYPE};
use skir_runtime::service::{
    BoxFuture, HttpHeaders, MethodListing, RawResponse, Status, StatusKind, Transport,
};
use tracing::debug;

/// Sends request frames as `POST` bodies to a remote service.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.server_url.clone())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches the remote method listing with `GET ?list`.
    pub async fn list_methods(&self) -> Result<MethodListing, Status> {
        let response = self
            .client
            .get(format!("{}?list", self.url))
            .send()
            .await
            .map_err(unavailable)?;
        let code = response.status().as_u16();
        let body = response.bytes().await.map_err(unavailable)?;
        if !(200..300).contains(&code) {
            return Err(Status::new(
                StatusKind::from_http_code(code),
                String::from_utf8_lossy(&body).into_owned(),
            ));
        }
        serde_json::from_slice(&body)
            .map_err(|err| Status::internal(format!("undecodable method listing: {err}")))
    }

    async fn post(&self, body: Vec<u8>, headers: HttpHeaders) -> Result<RawResponse, Status> {
        let mut request = self.client.post(&self.url).body(body);
        for header in headers.iter() {
            request = request.header(header.name.as_str(), header.value.as_str());
        }
        let response = request.send().await.map_err(unavailable)?;
        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(known_content_type)
            .unwrap_or(JSON_CONTENT_TYPE);
        let response_headers: HttpHeaders = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(unavailable)?.to_vec();
        debug!(url = %self.url, status_code, bytes = body.len(), "response received");
        Ok(RawResponse {
            status_code,
            content_type,
            body,
            headers: response_headers,
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, body: Vec<u8>, headers: HttpHeaders) -> BoxFuture<'_, Result<RawResponse, Status>> {
        Box::pin(self.post(body, headers))
    }
}

fn known_content_type(value: &str) -> &'static str {
    if value.starts_with(BINARY_CONTENT_TYPE) {
        BINARY_CONTENT_TYPE
    } else if value.starts_with("text/plain") {
        TEXT_CONTENT_TYPE
    } else {
        JSON_CONTENT_TYPE
    }
}

fn unavailable(err: reqwest::Error) -> Status {
    Status::unavailable(err.to_string())
}
