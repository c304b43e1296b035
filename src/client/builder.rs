use super::OverlayClient;
use crate::display::DisplayBinder;
use crate::types::{
    DEFAULT_HOST, DEFAULT_PATH, DEFAULT_PORT, OverlayError, RETRY_INTERVAL, Result,
};
use serde::Deserialize;
use std::net::Ipv6Addr;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OverlayClientOptions {
    pub host: String,
    pub port: u16,
    pub path: String,
    /// Use `wss://` instead of `ws://`
    pub secure: bool,
    /// Keep reconnecting after the connection is lost. When off, the client
    /// connects once at start and never retries.
    pub auto_reconnect: bool,
    /// Reconnect period in milliseconds
    pub retry_interval: u64,
    /// Handshake timeout in milliseconds; no limit when unset
    pub connect_timeout: Option<u64>,
}

impl Default for OverlayClientOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.to_string(),
            secure: false,
            auto_reconnect: true,
            retry_interval: RETRY_INTERVAL,
            connect_timeout: None,
        }
    }
}

impl OverlayClientOptions {
    /// Build the WebSocket endpoint URL from host, port and path.
    ///
    /// A bare IPv6 address such as `::1` is bracketed for the authority.
    pub fn endpoint_url(&self) -> Result<Url> {
        let scheme = if self.secure { "wss" } else { "ws" };
        let host = match self.host.parse::<Ipv6Addr>() {
            Ok(addr) => format!("[{addr}]"),
            Err(_) => self.host.clone(),
        };
        let mut url = Url::parse(&format!("{}://{}:{}", scheme, host, self.port))?;
        url.set_path(&self.path);
        Ok(url)
    }

    pub fn retry_period(&self) -> Duration {
        Duration::from_millis(self.retry_interval)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout.map(Duration::from_millis)
    }

    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(OverlayError::Config("host is required".to_string()));
        }
        if self.port == 0 {
            return Err(OverlayError::Config("port must be non-zero".to_string()));
        }
        if !self.path.starts_with('/') {
            return Err(OverlayError::Config(format!(
                "path '{}' must start with '/'",
                self.path
            )));
        }
        if self.path.contains(['?', '#']) {
            return Err(OverlayError::Config(format!(
                "path '{}' must not carry a query or fragment",
                self.path
            )));
        }
        if self.retry_interval == 0 {
            return Err(OverlayError::Config(
                "retry interval must be non-zero".to_string(),
            ));
        }
        if self.connect_timeout == Some(0) {
            return Err(OverlayError::Config(
                "connect timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for OverlayClient that validates the configuration
pub struct OverlayClientBuilder {
    options: OverlayClientOptions,
    endpoint: Url,
    binder: DisplayBinder,
}

impl OverlayClientBuilder {
    /// Create a new builder
    pub fn new(options: OverlayClientOptions, binder: DisplayBinder) -> Result<Self> {
        options.validate()?;
        let endpoint = options.endpoint_url()?;

        Ok(Self {
            options,
            endpoint,
            binder,
        })
    }

    pub fn build(self) -> OverlayClient {
        OverlayClient {
            endpoint: self.endpoint.to_string(),
            options: self.options,
            binder: self.binder,
        }
    }
}
