// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare API v4 implementation of
// `ddns_core::DnsProvider`.
//
// ## Behaviour
//
// - One HTTP request per call (record listing: one per result page)
// - Every request carries a bounded deadline (5 seconds by default)
// - Responses are decoded into typed envelopes; a mismatching payload is a
//   decode error, never a panic
// - No retries, no caching, no decisions: the reconciler owns all of that
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Provider construction fails if the token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=A&page=..&per_page=..`
// - Edit DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::traits::{DnsProvider, DnsRecord, EditedRecord, Zone};
use ddns_core::{Error, Result, TransportKind};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (5 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Records requested per page when listing a zone
const RECORDS_PER_PAGE: u32 = 100;

/// Upper bound on pages followed for one listing
const MAX_RECORD_PAGES: u32 = 500;

/// Standard Cloudflare response envelope
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    total_pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ZoneItem {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RecordItem {
    id: String,
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    content: String,
}

/// Cloudflare DNS provider
///
/// Stateless and single-shot: each trait call maps onto Cloudflare API
/// requests and nothing is kept between calls.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL (overridable for tests)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider against the public API
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:Read and DNS:Edit permissions
    /// - `timeout`: Deadline applied to every request
    pub fn new(api_token: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::with_base_url(api_token, CLOUDFLARE_API_BASE, timeout)
    }

    /// Create a provider talking to `base_url` instead of the public API
    pub fn with_base_url(
        api_token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let base_url = base_url.into().trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|e| Error::config(format!("Invalid Cloudflare API URL {}: {}", base_url, e)))?;

        // Build HTTP client with timeout
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            base_url,
            client,
        })
    }

    /// Send a request and decode the Cloudflare envelope
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<ApiEnvelope<T>> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| transport_error(what, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(what, e))?;

        if !status.is_success() {
            return Err(status_error(status, what, &body));
        }

        let envelope: ApiEnvelope<T> = serde_json::from_str(&body)?;

        if !envelope.success {
            return Err(Error::remote(
                status.as_u16(),
                format!("{} rejected: {}", what, describe(&envelope.errors)),
            ));
        }

        Ok(envelope)
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// ```http
    /// GET /zones?name=example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn list_zones(&self, name_filter: &str) -> Result<Vec<Zone>> {
        tracing::debug!("Listing Cloudflare zones matching: {}", name_filter);

        let url = format!("{}/zones", self.base_url);
        let request = self.client.get(&url).query(&[("name", name_filter)]);

        let envelope: ApiEnvelope<Vec<ZoneItem>> = self.send(request, "Zone lookup").await?;
        let zones = envelope
            .result
            .ok_or_else(|| Error::decode("Zone lookup response has no result"))?;

        Ok(zones
            .into_iter()
            .map(|zone| Zone::new(zone.id, zone.name))
            .collect())
    }

    /// ```http
    /// GET /zones/:zone_id/dns_records?type=A&page=1&per_page=100
    /// Authorization: Bearer <token>
    /// ```
    async fn list_dns_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>> {
        let url = format!("{}/zones/{}/dns_records", self.base_url, zone_id);
        let mut records = Vec::new();
        let mut page = 1u32;

        loop {
            tracing::debug!("Listing A records in zone {} (page {})", zone_id, page);

            let request = self.client.get(&url).query(&[
                ("type", "A".to_string()),
                ("page", page.to_string()),
                ("per_page", RECORDS_PER_PAGE.to_string()),
            ]);

            let envelope: ApiEnvelope<Vec<RecordItem>> =
                self.send(request, "Record lookup").await?;
            let items = envelope
                .result
                .ok_or_else(|| Error::decode("Record lookup response has no result"))?;

            records.extend(items.into_iter().map(|item| DnsRecord {
                id: item.id,
                name: item.name,
                record_type: item.record_type,
                content: item.content,
            }));

            let total_pages = envelope
                .result_info
                .and_then(|info| info.total_pages)
                .unwrap_or(1);

            if page >= total_pages {
                break;
            }
            if page >= MAX_RECORD_PAGES {
                tracing::warn!(
                    "Zone {} reports {} pages of records; stopping at {}",
                    zone_id,
                    total_pages,
                    MAX_RECORD_PAGES
                );
                break;
            }
            page += 1;
        }

        tracing::debug!("Found {} record(s) in zone {}", records.len(), zone_id);
        Ok(records)
    }

    /// ```http
    /// PATCH /zones/:zone_id/dns_records/:record_id
    /// {
    ///   "content": "203.0.113.42"
    /// }
    /// ```
    async fn edit_dns_record(
        &self,
        zone_id: &str,
        record_id: &str,
        content: &str,
    ) -> Result<EditedRecord> {
        tracing::debug!("Editing record {} in zone {}", record_id, zone_id);

        let url = format!("{}/zones/{}/dns_records/{}", self.base_url, zone_id, record_id);
        let request = self
            .client
            .patch(&url)
            .json(&serde_json::json!({ "content": content }));

        let envelope: ApiEnvelope<RecordItem> = self.send(request, "Record update").await?;
        let record = envelope
            .result
            .ok_or_else(|| Error::decode("Record update response has no result"))?;

        Ok(EditedRecord {
            id: record.id,
            content: record.content,
        })
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}

/// Classify a reqwest failure
fn transport_error(what: &str, err: reqwest::Error) -> Error {
    if err.is_builder() {
        return Error::config(format!("{} request could not be built: {}", what, err));
    }

    let kind = if err.is_timeout() {
        TransportKind::Timeout
    } else if err.is_connect() {
        TransportKind::Connect
    } else {
        TransportKind::Other
    };

    Error::transport(kind, format!("{} request failed: {}", what, err))
}

/// Map a non-success HTTP status to a remote error
fn status_error(status: StatusCode, what: &str, body: &str) -> Error {
    let detail = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(body)
        .map(|envelope| describe(&envelope.errors))
        .unwrap_or_else(|_| body.chars().take(200).collect());

    let message = match status.as_u16() {
        401 | 403 => format!(
            "Authentication failed: Invalid API token or insufficient permissions ({})",
            detail
        ),
        404 => format!("{} target not found ({})", what, detail),
        409 => format!("Conflict: record is being updated by another process ({})", detail),
        429 => "Rate limit exceeded. Please retry later".to_string(),
        500..=599 => format!("Cloudflare server error (transient): {}", detail),
        _ => format!("{} failed: {}", what, detail),
    };

    Error::remote(status.as_u16(), message)
}

fn describe(errors: &[ApiMessage]) -> String {
    if errors.is_empty() {
        return "no error details".to_string();
    }

    errors
        .iter()
        .map(|e| format!("[{}] {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}
