// # HTTP IP Source
//
// This crate provides the HTTP-based public IPv4 resolver for the DDNS
// sync tool.
//
// ## Architecture
//
// One GET against a plain-text "what is my IP" service (ipify by default).
// The body is trimmed and must be an IPv4 literal. Redirects are not
// followed and every request carries a deadline.

use async_trait::async_trait;
use ddns_core::traits::{IpSource, PublicAddress};
use ddns_core::{Error, Result, TransportKind};
use std::time::Duration;

/// Default deadline for the lookup (5 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP-based public IPv4 source
///
/// The response body is trimmed of surrounding whitespace (ipify and most
/// similar services end it with a newline) before it is validated as an
/// IPv4 literal. The trimmed text is what gets compared with record content.
#[derive(Debug)]
pub struct HttpIpSource {
    /// URL to fetch the address from
    url: reqwest::Url,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a source for `url` with the default deadline
    ///
    /// # Parameters
    ///
    /// - `url`: URL returning the caller's IPv4 address as plain text
    ///   (e.g., "https://api.ipify.org")
    pub fn new(url: &str) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Create a source for `url` with a custom deadline
    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self> {
        let url = reqwest::Url::parse(url)
            .map_err(|e| Error::config(format!("Invalid IP service URL {}: {}", url, e)))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { url, client })
    }
}

#[async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<PublicAddress> {
        tracing::debug!("Fetching public IP from {}", self.url);

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| map_request_error(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::remote(
                status.as_u16(),
                format!("IP service {} returned {}", self.url, status),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| map_request_error(&self.url, e))?;

        let address = PublicAddress::parse(&body)?;
        tracing::debug!("Public IP is {}", address);

        Ok(address)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

fn map_request_error(url: &reqwest::Url, err: reqwest::Error) -> Error {
    if err.is_builder() {
        return Error::config(format!("Request to {} could not be built: {}", url, err));
    }

    let kind = if err.is_timeout() {
        TransportKind::Timeout
    } else if err.is_connect() {
        TransportKind::Connect
    } else {
        TransportKind::Other
    };

    Error::transport(kind, format!("Failed to fetch IP from {}: {}", url, err))
}
