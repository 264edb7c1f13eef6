//! Record fetching
//!
//! Lists a zone's records and picks out the root A record and, when asked,
//! the `www.` A record. Matching is by exact name; records of other types are
//! ignored, so apex MX/TXT entries never stand in for the root record.

use crate::config::DuplicateRecordPolicy;
use crate::engine::zone::ZoneHandle;
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, DnsRecord};
use tracing::{debug, warn};

/// The records one run works on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    /// A record named exactly after the domain
    pub root: DnsRecord,
    /// A record named `www.<domain>`, present only when www handling is on
    pub www: Option<DnsRecord>,
}

impl RecordSet {
    /// Records in write order: root first, then www
    pub fn targets(&self) -> Vec<&DnsRecord> {
        std::iter::once(&self.root).chain(self.www.as_ref()).collect()
    }
}

/// List the zone's records and select the ones this run manages
pub async fn fetch_records(
    provider: &dyn DnsProvider,
    zone: &ZoneHandle,
    domain: &str,
    handle_www: bool,
    policy: DuplicateRecordPolicy,
) -> Result<RecordSet> {
    let records = provider.list_dns_records(&zone.id).await?;
    debug!("Zone {} holds {} record(s)", zone.id, records.len());

    select_records(records, domain, handle_www, policy)
}

/// Single pass over `records`
///
/// The scan never stops early and assumes no ordering. When a name matches
/// several A records, `policy` decides between the last one scanned and an
/// [`Error::AmbiguousRecord`].
pub fn select_records(
    records: Vec<DnsRecord>,
    domain: &str,
    handle_www: bool,
    policy: DuplicateRecordPolicy,
) -> Result<RecordSet> {
    let www_name = format!("www.{}", domain);

    let mut root = Slot::default();
    let mut www = Slot::default();

    for record in records {
        if !record.is_a_record() {
            continue;
        }

        if record.name == domain {
            root.fill(record);
        } else if handle_www && record.name == www_name {
            www.fill(record);
        }
    }

    let root = root
        .resolve(domain, policy)?
        .ok_or_else(|| Error::not_found(format!("no A record named {}", domain)))?;

    let www = if handle_www {
        let record = www.resolve(&www_name, policy)?.ok_or_else(|| {
            Error::not_found(format!(
                "no A record named {} (www handling is enabled, does it exist?)",
                www_name
            ))
        })?;
        Some(record)
    } else {
        None
    };

    Ok(RecordSet { root, www })
}

#[derive(Default)]
struct Slot {
    record: Option<DnsRecord>,
    matches: usize,
}

impl Slot {
    fn fill(&mut self, record: DnsRecord) {
        self.matches += 1;
        self.record = Some(record);
    }

    fn resolve(self, name: &str, policy: DuplicateRecordPolicy) -> Result<Option<DnsRecord>> {
        if self.matches > 1 {
            match policy {
                DuplicateRecordPolicy::Reject => {
                    return Err(Error::AmbiguousRecord {
                        name: name.to_string(),
                        count: self.matches,
                    });
                }
                DuplicateRecordPolicy::LastWins => {
                    warn!(
                        "{} A records are named {}; using the last one listed",
                        self.matches, name
                    );
                }
            }
        }

        Ok(self.record)
    }
}
