//! # Server Configuration
//!
//! Settings for `dadaplace serve`, taken from CLI flags with the API key
//! optionally read from the environment.

use std::net::SocketAddr;

/// Default host address.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port number.
pub const DEFAULT_PORT: u16 = 8080;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "DADAPLACE_API_KEY";

/// Shortest accepted API key.
pub const MIN_API_KEY_LEN: usize = 8;

/// Default request budget per second across all clients.
pub const DEFAULT_RATE_LIMIT: u32 = 50;

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// When set, every route except `/health` requires this key.
    pub api_key: Option<String>,
    /// Allow cross-origin requests from any origin.
    pub cors_any: bool,
    /// Requests per second before answering 429. Zero disables the limit.
    pub rate_limit: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_key: None,
            cors_any: false,
            rate_limit: DEFAULT_RATE_LIMIT,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.is_empty());
        self
    }

    #[must_use]
    pub fn with_cors_any(mut self, cors_any: bool) -> Self {
        self.cors_any = cors_any;
        self
    }

    #[must_use]
    pub fn with_rate_limit(mut self, per_second: u32) -> Self {
        self.rate_limit = per_second;
        self
    }

    /// Fill in the API key from [`API_KEY_ENV`] when none was given.
    #[must_use]
    pub fn with_env_api_key(self) -> Self {
        if self.api_key.is_some() {
            return self;
        }
        let key = std::env::var(API_KEY_ENV).ok();
        self.with_api_key(key)
    }

    /// Check the configuration before binding.
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("Host cannot be empty".to_string());
        }
        if self.port == 0 {
            return Err("Port cannot be zero".to_string());
        }
        if let Some(key) = &self.api_key
            && key.len() < MIN_API_KEY_LEN
        {
            return Err(format!(
                "API key must be at least {MIN_API_KEY_LEN} characters"
            ));
        }
        self.socket_addr().map(|_| ())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("Invalid address: {}", e))
    }

    #[must_use]
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
