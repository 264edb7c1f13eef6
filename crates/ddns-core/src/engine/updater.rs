//! Record updates
//!
//! Writes the target address into each record, one at a time, root first.
//! A write counts only once the provider echoes the new content back.

use crate::error::{Error, Result};
use crate::traits::{DnsProvider, DnsRecord, PublicAddress};
use tracing::{debug, info};

/// A record whose content was changed and confirmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedRecord {
    /// Record identifier
    pub id: String,
    /// Record name
    pub name: String,
    /// Content before the write
    pub previous_content: String,
    /// Content confirmed by the provider
    pub content: String,
}

/// Write `address` into every record of `targets`, in order
///
/// Each write waits for the previous one to be confirmed. On the first
/// failure the remaining records are left alone and an [`Error::Update`]
/// names the record that failed together with the ones already written.
/// Earlier writes are not rolled back.
///
/// `on_updated` is called for each confirmed record as soon as it converges.
pub async fn apply_updates<F>(
    provider: &dyn DnsProvider,
    zone_id: &str,
    targets: &[DnsRecord],
    address: &PublicAddress,
    mut on_updated: F,
) -> Result<Vec<UpdatedRecord>>
where
    F: FnMut(&UpdatedRecord),
{
    let mut updated: Vec<UpdatedRecord> = Vec::with_capacity(targets.len());

    for record in targets {
        debug!("Updating record {} ({}) -> {}", record.name, record.id, address);

        let converged = || updated.iter().map(|u| u.name.clone()).collect::<Vec<_>>();

        let edited = provider
            .edit_dns_record(zone_id, &record.id, address.as_str())
            .await
            .map_err(|e| Error::update(&record.name, converged(), e))?;

        if edited.content != address.as_str() {
            return Err(Error::update(
                &record.name,
                converged(),
                Error::Unconfirmed {
                    expected: address.to_string(),
                    actual: edited.content,
                },
            ));
        }

        info!(
            "DNS record updated successfully: {} -> {} (was: {})",
            record.name, address, record.content
        );

        let confirmed = UpdatedRecord {
            id: record.id.clone(),
            name: record.name.clone(),
            previous_content: record.content.clone(),
            content: edited.content,
        };
        on_updated(&confirmed);
        updated.push(confirmed);
    }

    Ok(updated)
}
