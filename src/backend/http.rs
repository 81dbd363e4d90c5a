// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP backend for `D'Mouv` devices.
//!
//! Devices expose a small REST surface: `GET /api/status` returns the
//! full [`StatusSnapshot`], `POST /api/state` accepts a JSON
//! [`StatePatch`]. HTTP is stateless; each read and write is an
//! independent request.

use std::net::Ipv4Addr;
use std::time::Duration;

use reqwest::Client;

use crate::backend::{CommandSink, StatusSnapshot, StatusSource};
use crate::command::StatePatch;
use crate::error::{Error, TransportError};

/// Path of the status endpoint.
const STATUS_PATH: &str = "/api/status";
/// Path of the state-patch endpoint.
const STATE_PATH: &str = "/api/state";

/// Configuration for a device reachable over HTTP.
///
/// # Examples
///
/// ```
/// use dmouv_lib::backend::HttpConfig;
/// use std::time::Duration;
///
/// // Simple configuration
/// let config = HttpConfig::new("192.168.1.42");
///
/// // With all options
/// let config = HttpConfig::new("192.168.1.42")
///     .with_port(8080)
///     .with_https()
///     .with_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    host: String,
    port: u16,
    use_https: bool,
    timeout: Duration,
}

impl HttpConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default HTTPS port.
    pub const DEFAULT_HTTPS_PORT: u16 = 443;
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a new HTTP configuration for the specified host.
    ///
    /// # Arguments
    ///
    /// * `host` - The hostname or IP address of the device
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            use_https: false,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Creates a configuration for a device addressed by a dotted-quad
    /// IPv4 address, validating the address first.
    ///
    /// Device addresses are usually typed in by the user, so this
    /// rejects malformed input before any request goes out.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidAddress`] if `ip` is not a
    /// valid IPv4 address.
    pub fn for_device_ip(ip: &str) -> Result<Self, TransportError> {
        let trimmed = ip.trim();
        trimmed
            .parse::<Ipv4Addr>()
            .map_err(|_| TransportError::InvalidAddress(ip.to_string()))?;
        Ok(Self::new(trimmed))
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enables HTTPS.
    ///
    /// If port hasn't been explicitly set, it will be changed to 443.
    #[must_use]
    pub fn with_https(mut self) -> Self {
        self.use_https = true;
        if self.port == Self::DEFAULT_PORT {
            self.port = Self::DEFAULT_HTTPS_PORT;
        }
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns whether HTTPS is enabled.
    #[must_use]
    pub fn use_https(&self) -> bool {
        self.use_https
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the base URL from this configuration.
    #[must_use]
    pub fn base_url(&self) -> String {
        let scheme = if self.use_https { "https" } else { "http" };
        let port_suffix =
            if (self.use_https && self.port == 443) || (!self.use_https && self.port == 80) {
                String::new()
            } else {
                format!(":{}", self.port)
            };
        format!("{scheme}://{}{port_suffix}", self.host)
    }

    /// Creates an [`HttpBackend`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn into_backend(self) -> Result<HttpBackend, TransportError> {
        let base_url = self.base_url();

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(TransportError::Http)?;

        Ok(HttpBackend { base_url, client })
    }
}

/// HTTP client for a single `D'Mouv` device.
///
/// Implements both [`StatusSource`] and [`CommandSink`]. The client is
/// cheap to clone; a reconciler typically takes one clone for reads and
/// one for writes.
///
/// # Examples
///
/// ```no_run
/// use dmouv_lib::backend::{HttpBackend, StatusSource};
///
/// # async fn example() -> dmouv_lib::Result<()> {
/// let backend = HttpBackend::new("192.168.1.42")?;
/// let snapshot = backend.fetch_status().await?;
/// println!("power is {}", snapshot.fan_status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    /// Creates a new HTTP backend for the specified host.
    ///
    /// Hosts without a scheme prefix are assumed to be plain HTTP.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(host: impl Into<String>) -> Result<Self, TransportError> {
        let host = host.into();
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host
        } else {
            format!("http://{host}")
        };

        let client = Client::builder()
            .timeout(HttpConfig::DEFAULT_TIMEOUT)
            .build()
            .map_err(TransportError::Http)?;

        Ok(Self { base_url, client })
    }

    /// Returns the base URL of the device.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn status_url(&self) -> String {
        format!("{}{STATUS_PATH}", self.base_url)
    }

    fn state_url(&self) -> String {
        format!("{}{STATE_PATH}", self.base_url)
    }
}

/// Maps a non-success HTTP status into a transport error.
fn status_error(status: reqwest::StatusCode) -> TransportError {
    TransportError::ConnectionFailed(format!(
        "HTTP {} - {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    ))
}

impl StatusSource for HttpBackend {
    async fn fetch_status(&self) -> Result<StatusSnapshot, Error> {
        let url = self.status_url();

        tracing::debug!(url = %url, "Fetching device status");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(TransportError::Http)?;

        if !response.status().is_success() {
            return Err(status_error(response.status()).into());
        }

        let snapshot = response
            .json::<StatusSnapshot>()
            .await
            .map_err(TransportError::Http)?;

        tracing::debug!(?snapshot, "Received device status");

        Ok(snapshot)
    }
}

impl CommandSink for HttpBackend {
    async fn apply_patch(&self, patch: StatePatch) -> Result<(), Error> {
        patch.validate()?;

        let url = self.state_url();
        let body = serde_json::to_string(&patch)
            .unwrap_or_else(|_| "<unserializable patch>".to_string());

        tracing::debug!(url = %url, body = %body, "Sending state patch");

        let response = self
            .client
            .post(&url)
            .json(&patch)
            .send()
            .await
            .map_err(TransportError::Http)?;

        if !response.status().is_success() {
            return Err(status_error(response.status()).into());
        }

        Ok(())
    }
}
