//! Zone resolution
//!
//! Finds the provider-side zone that owns the configured domain.

use crate::error::{Error, Result};
use crate::traits::DnsProvider;
use tracing::debug;

/// The zone governing the configured domain, resolved once per run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneHandle {
    /// Provider-side zone identifier
    pub id: String,
    /// Domain name the zone governs
    pub domain: String,
}

/// Resolve the zone whose name is exactly `domain`
///
/// A credential may see several zones, and the provider's name filter is only
/// a hint, so the listing is always filtered by exact name. Read-only and safe
/// to repeat.
pub async fn resolve_zone(provider: &dyn DnsProvider, domain: &str) -> Result<ZoneHandle> {
    debug!("Looking up zone ID for domain: {}", domain);

    let zones = provider.list_zones(domain).await?;
    debug!("{} listed {} zone(s)", provider.provider_name(), zones.len());

    let zone = zones
        .into_iter()
        .find(|zone| zone.name == domain)
        .ok_or_else(|| Error::not_found(format!("no zone matches domain {}", domain)))?;

    debug!("Found zone ID: {}", zone.id);
    Ok(ZoneHandle {
        id: zone.id,
        domain: zone.name,
    })
}
