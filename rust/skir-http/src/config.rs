//! Environment-driven configuration, read once at startup.

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8787;
pub const DEFAULT_SERVICE_PATH: &str = "/myapi";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path the service is mounted on. Always starts with `/`.
    pub service_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            service_path: DEFAULT_SERVICE_PATH.to_string(),
        }
    }
}

impl ServerConfig {
    /// Reads `SKIR_HOST`, `PORT` and `SKIR_SERVICE_PATH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("SKIR_HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            service_path: lookup("SKIR_SERVICE_PATH")
                .map(|path| normalize_path(&path))
                .unwrap_or(defaults.service_path),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// URL a client on the same machine would use.
    pub fn url(&self) -> String {
        format!("http://{}{}", self.address(), self.service_path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub server_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: ServerConfig::default().url(),
        }
    }
}

impl ClientConfig {
    /// Reads `SKIR_SERVER_URL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            server_url: lookup("SKIR_SERVER_URL").unwrap_or_else(|| Self::default().server_url),
        }
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
