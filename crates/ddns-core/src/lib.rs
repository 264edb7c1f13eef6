// # ddns-core
//
// Core library for the single-shot DDNS sync tool.
//
// ## Architecture Overview
//
// One invocation performs one reconciliation between the machine's public
// IPv4 address and the A record(s) published at a DNS provider:
// - **IpSource**: Trait for discovering the current public address
// - **DnsProvider**: Trait for listing zones/records and editing record content
// - **Reconciler**: Orchestrates resolve → fetch → decide → update
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Reconciliation logic is separate from provider APIs
// 2. **Single-Shot**: No daemon, no persisted state; an external scheduler re-runs it
// 3. **Exact Matching**: Zones and records are selected by exact name only
// 4. **Library-First**: All core functionality can be used as a library
// 5. **Idempotency**: A record already holding the address is never written

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{DnsProvider, DnsRecord, EditedRecord, IpSource, PublicAddress, Zone};
pub use engine::{
    Reconciler, ReconciliationDecision, RecordSet, RunOutcome, RunState, SyncEvent,
    UpdatedRecord, ZoneHandle,
};
pub use config::{DuplicateRecordPolicy, LogLevel, SyncConfig};
pub use error::{Error, ErrorKind, Result, TransportKind};
