//! Test doubles and common utilities for reconciliation contract tests
//!
//! The doubles record every call they receive so tests can assert on the
//! exact sequence of provider traffic.

#![allow(dead_code)]

use ddns_core::error::{Error, Result, TransportKind};
use ddns_core::traits::{DnsProvider, DnsRecord, EditedRecord, IpSource, PublicAddress, Zone};
use ddns_core::{Reconciler, SyncConfig, SyncEvent};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Barrier, mpsc};

/// A provider call, as observed by [`MockDnsProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    ListZones(String),
    ListRecords(String),
    Edit {
        zone_id: String,
        record_id: String,
        content: String,
    },
}

/// How the mock answers an edit of one record
#[derive(Debug, Clone)]
pub enum EditBehavior {
    /// Apply the change and echo it back
    Echo,
    /// Answer with a remote error carrying this status
    Fail(u16),
    /// Accept the call but report this content instead
    Report(String),
}

/// A mock DnsProvider backed by an in-memory zone listing
#[derive(Clone)]
pub struct MockDnsProvider {
    zones: Arc<Vec<Zone>>,
    records: Arc<Mutex<Vec<DnsRecord>>>,
    calls: Arc<Mutex<Vec<ProviderCall>>>,
    edit_behavior: Arc<Mutex<HashMap<String, EditBehavior>>>,
    zone_failure: Option<u16>,
    zone_delay: Duration,
    zone_barrier: Option<Arc<Barrier>>,
    zone_lookups_finished: Arc<AtomicUsize>,
}

impl MockDnsProvider {
    pub fn new(zones: Vec<Zone>, records: Vec<DnsRecord>) -> Self {
        Self {
            zones: Arc::new(zones),
            records: Arc::new(Mutex::new(records)),
            calls: Arc::new(Mutex::new(Vec::new())),
            edit_behavior: Arc::new(Mutex::new(HashMap::new())),
            zone_failure: None,
            zone_delay: Duration::ZERO,
            zone_barrier: None,
            zone_lookups_finished: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make zone listing fail with a remote error
    pub fn failing_zones(mut self, status: u16) -> Self {
        self.zone_failure = Some(status);
        self
    }

    /// Delay zone listing
    pub fn with_zone_delay(mut self, delay: Duration) -> Self {
        self.zone_delay = delay;
        self
    }

    /// Make zone listing wait on a barrier before answering
    pub fn with_zone_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.zone_barrier = Some(barrier);
        self
    }

    /// Set how edits of `record_id` are answered
    pub fn on_edit(self, record_id: &str, behavior: EditBehavior) -> Self {
        self.edit_behavior
            .lock()
            .unwrap()
            .insert(record_id.to_string(), behavior);
        self
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Record ids of every edit call, in call order
    pub fn edited_record_ids(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ProviderCall::Edit { record_id, .. } => Some(record_id),
                _ => None,
            })
            .collect()
    }

    pub fn edit_call_count(&self) -> usize {
        self.edited_record_ids().len()
    }

    pub fn zone_lookups_finished(&self) -> usize {
        self.zone_lookups_finished.load(Ordering::SeqCst)
    }

    /// Current content of a record in the mock zone
    pub fn content_of(&self, record_id: &str) -> Option<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == record_id)
            .map(|r| r.content.clone())
    }

    fn record_call(&self, call: ProviderCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_zones(&self, name_filter: &str) -> Result<Vec<Zone>> {
        self.record_call(ProviderCall::ListZones(name_filter.to_string()));

        if let Some(barrier) = &self.zone_barrier {
            barrier.wait().await;
        }
        if !self.zone_delay.is_zero() {
            tokio::time::sleep(self.zone_delay).await;
        }
        self.zone_lookups_finished.fetch_add(1, Ordering::SeqCst);

        match self.zone_failure {
            Some(status) => Err(Error::remote(status, "zone listing failed")),
            None => Ok(self.zones.as_ref().clone()),
        }
    }

    async fn list_dns_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>> {
        self.record_call(ProviderCall::ListRecords(zone_id.to_string()));
        Ok(self.records.lock().unwrap().clone())
    }

    async fn edit_dns_record(
        &self,
        zone_id: &str,
        record_id: &str,
        content: &str,
    ) -> Result<EditedRecord> {
        self.record_call(ProviderCall::Edit {
            zone_id: zone_id.to_string(),
            record_id: record_id.to_string(),
            content: content.to_string(),
        });

        let behavior = self
            .edit_behavior
            .lock()
            .unwrap()
            .get(record_id)
            .cloned()
            .unwrap_or(EditBehavior::Echo);

        match behavior {
            EditBehavior::Echo => {
                let mut records = self.records.lock().unwrap();
                let record = records
                    .iter_mut()
                    .find(|r| r.id == record_id)
                    .ok_or_else(|| Error::remote(404, "record not found"))?;
                record.content = content.to_string();
                Ok(EditedRecord {
                    id: record_id.to_string(),
                    content: content.to_string(),
                })
            }
            EditBehavior::Fail(status) => Err(Error::remote(status, "edit rejected")),
            EditBehavior::Report(reported) => Ok(EditedRecord {
                id: record_id.to_string(),
                content: reported,
            }),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// How the mock IP source answers
#[derive(Debug, Clone)]
pub enum IpAnswer {
    Address(String),
    Transport(TransportKind),
    Remote(u16),
}

/// A mock IpSource with a fixed answer
#[derive(Clone)]
pub struct StaticIpSource {
    answer: IpAnswer,
    barrier: Option<Arc<Barrier>>,
    delay: Duration,
    call_count: Arc<AtomicUsize>,
    finished: Arc<AtomicBool>,
}

impl StaticIpSource {
    pub fn new(address: &str) -> Self {
        Self::answering(IpAnswer::Address(address.to_string()))
    }

    pub fn answering(answer: IpAnswer) -> Self {
        Self {
            answer,
            barrier: None,
            delay: Duration::ZERO,
            call_count: Arc::new(AtomicUsize::new(0)),
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self) -> Result<PublicAddress> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.finished.store(true, Ordering::SeqCst);

        match &self.answer {
            IpAnswer::Address(address) => PublicAddress::parse(address),
            IpAnswer::Transport(kind) => Err(Error::transport(*kind, "ip lookup failed")),
            IpAnswer::Remote(status) => Err(Error::remote(*status, "ip service error")),
        }
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}

/// The zone listing used by most tests: the target zone plus a lookalike
pub fn example_zones() -> Vec<Zone> {
    vec![
        Zone::new("z2", "notexample.com"),
        Zone::new("z1", "example.com"),
    ]
}

/// Helper to create a minimal SyncConfig for testing
pub fn minimal_config(domain: &str) -> SyncConfig {
    SyncConfig::new("test-token", domain)
}

/// Build a reconciler from clones of the doubles
pub fn build_reconciler(
    provider: &MockDnsProvider,
    ip_source: &StaticIpSource,
    config: SyncConfig,
) -> (Reconciler, mpsc::Receiver<SyncEvent>) {
    Reconciler::new(
        Box::new(provider.clone()),
        Box::new(ip_source.clone()),
        config,
    )
    .expect("reconciler construction succeeds")
}

/// Drain every event emitted so far
pub fn drain_events(rx: &mut mpsc::Receiver<SyncEvent>) -> Vec<SyncEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
