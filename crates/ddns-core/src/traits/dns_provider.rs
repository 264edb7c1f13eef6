// # DNS Provider Trait
//
// Defines the raw capability the reconciler consumes from a DNS host:
// list zones, list records in a zone, edit one record's content.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::DnsProvider;
//
// let zones = provider.list_zones("example.com").await?;
// let records = provider.list_dns_records(&zones[0].id).await?;
// let edited = provider.edit_dns_record(&zones[0].id, &records[0].id, "203.0.113.42").await?;
// ```

use async_trait::async_trait;

/// A zone visible to the configured credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Provider-side zone identifier
    pub id: String,
    /// Domain name the zone governs
    pub name: String,
}

impl Zone {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A DNS record as listed by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Provider-side record identifier
    pub id: String,
    /// Fully-qualified record name
    pub name: String,
    /// Record type ("A", "AAAA", "MX", ...)
    pub record_type: String,
    /// Current content (the published IP for A records)
    pub content: String,
}

impl DnsRecord {
    /// Create an A record
    pub fn a(id: impl Into<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            record_type: "A".to_string(),
            content: content.into(),
        }
    }

    /// True for IPv4 address records, the only type this tool manages
    pub fn is_a_record(&self) -> bool {
        self.record_type.eq_ignore_ascii_case("A")
    }
}

/// The provider's answer to an edit call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedRecord {
    /// Record identifier echoed back by the provider
    pub id: String,
    /// Content the provider now reports for the record
    pub content: String,
}

/// Trait for DNS provider implementations
///
/// Providers are thin, stateless API adapters. They do not retry, do not
/// cache, and do not decide whether a write is needed; all of that belongs
/// to the reconciler in this crate.
///
/// Every call must carry a bounded deadline and surface an overrun as a
/// timeout-flavoured [`Error::Transport`](crate::Error::Transport).
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List zones visible to the credential
    ///
    /// `name_filter` is passed to the provider as a hint. Implementations may
    /// return zones with other names; callers must match names exactly.
    async fn list_zones(&self, name_filter: &str) -> Result<Vec<Zone>, crate::Error>;

    /// List every DNS record in a zone, across all result pages
    async fn list_dns_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Change the content field of one record
    ///
    /// A successful return only means the provider accepted the request; the
    /// caller checks [`EditedRecord::content`] to confirm the change.
    async fn edit_dns_record(
        &self,
        zone_id: &str,
        record_id: &str,
        content: &str,
    ) -> Result<EditedRecord, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
