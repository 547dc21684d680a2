//! Telemetry feed endpoint construction.
//!
//! The feed lives on the same server as the display page:
//! `ws://<page host>:<page port>/message.json?ip=<device>`, where `<device>`
//! is the `ip` query parameter of the page itself, e.g.
//! `http://192.168.1.10:8000/nav.html?ip=192.168.2.62` →
//! `ws://192.168.1.10:8000/message.json?ip=192.168.2.62`.

use navglass_core::EndpointConfig;
use std::fmt;
use thiserror::Error;
use url::Url;

/// Path of the telemetry WebSocket on the server
pub const FEED_PATH: &str = "/message.json";

const DEVICE_PARAM: &str = "ip";

/// Endpoint construction errors
#[derive(Debug, Error)]
pub enum EndpointError {
    /// Page address or built address did not parse
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Page address has no host
    #[error("Page address {0} has no host")]
    MissingHost(String),

    /// Page address has no usable port
    #[error("Page address {0} has no port")]
    MissingPort(String),

    /// No target device address was supplied
    #[error("No target device address (missing `ip` query parameter)")]
    MissingDeviceAddress,
}

/// Address of the telemetry feed for one target device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryEndpoint {
    url: Url,
    device_ip: String,
}

impl TelemetryEndpoint {
    /// Build from the display page address.
    pub fn from_page(page_url: &str) -> Result<Self, EndpointError> {
        let page = Url::parse(page_url)?;
        let host = page
            .host_str()
            .ok_or_else(|| EndpointError::MissingHost(page_url.to_string()))?;
        let port = page
            .port_or_known_default()
            .ok_or_else(|| EndpointError::MissingPort(page_url.to_string()))?;
        let device_ip = page
            .query_pairs()
            .find(|(key, _)| key == DEVICE_PARAM)
            .map(|(_, value)| value.into_owned())
            .ok_or(EndpointError::MissingDeviceAddress)?;

        Self::from_parts(host, port, &device_ip)
    }

    /// Build from an explicit server address and device.
    pub fn from_parts(host: &str, port: u16, device_ip: &str) -> Result<Self, EndpointError> {
        let device_ip = device_ip.trim();
        if device_ip.is_empty() {
            return Err(EndpointError::MissingDeviceAddress);
        }

        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{}]", host)
        } else {
            host.to_string()
        };

        let mut url = Url::parse(&format!("ws://{}:{}{}", host, port, FEED_PATH))?;
        url.query_pairs_mut().append_pair(DEVICE_PARAM, device_ip);

        Ok(Self {
            url,
            device_ip: device_ip.to_string(),
        })
    }

    /// Build from the `[endpoint]` config section; `page_url` wins when set.
    pub fn from_config(config: &EndpointConfig) -> Result<Self, EndpointError> {
        match &config.page_url {
            Some(page_url) => Self::from_page(page_url),
            None => Self::from_parts(
                &config.host,
                config.port,
                config.device_ip.as_deref().unwrap_or_default(),
            ),
        }
    }

    /// Full WebSocket address
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Parsed WebSocket address
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Target device address
    pub fn device_ip(&self) -> &str {
        &self.device_ip
    }
}

impl fmt::Display for TelemetryEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
