//! Compare the public address against the published root record.

use crate::engine::records::RecordSet;
use crate::traits::{DnsRecord, PublicAddress};

/// Outcome of comparing one snapshot of address and records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationDecision {
    /// Root record content already equals the public address
    pub up_to_date: bool,
    /// Address the records should hold
    pub target: PublicAddress,
    /// Records to write, in write order (empty when up to date)
    pub affected: Vec<DnsRecord>,
}

impl ReconciliationDecision {
    /// Decide from a single snapshot
    ///
    /// Plain string equality against the root record's content; no
    /// normalisation is applied to either side.
    pub fn decide(address: &PublicAddress, records: &RecordSet) -> Self {
        let up_to_date = records.root.content == address.as_str();

        let affected = if up_to_date {
            Vec::new()
        } else {
            records
                .targets()
                .into_iter()
                .cloned()
                .collect()
        };

        Self {
            up_to_date,
            target: address.clone(),
            affected,
        }
    }
}
