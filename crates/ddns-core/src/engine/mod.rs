//! Reconciliation engine
//!
//! The Reconciler is responsible for one read-compare-write cycle:
//! - Resolving the zone and the public address (concurrently)
//! - Fetching the managed A records
//! - Deciding whether the records are current
//! - Updating them, root first, when they are not
//!
//! ## Architecture
//!
//! ```text
//!  ┌──────────────┐        ┌──────────────┐
//!  │ resolve_zone │        │  IpSource    │
//!  └──────────────┘        └──────────────┘
//!          │   (joined: both must finish)   │
//!          └──────────────┬─────────────────┘
//!                         ▼
//!                 ┌───────────────┐
//!                 │ fetch_records │
//!                 └───────────────┘
//!                         ▼
//!                 ┌───────────────┐     up to date
//!                 │    decide     │ ───────────────▶ DONE_NOOP
//!                 └───────────────┘
//!                         ▼
//!                 ┌───────────────┐
//!                 │ apply_updates │ ───────────────▶ DONE_UPDATED
//!                 └───────────────┘
//! ```
//!
//! Any error moves the run to `FAILED`; nothing is written after a failure.

pub mod decision;
pub mod records;
pub mod updater;
pub mod zone;

pub use decision::ReconciliationDecision;
pub use records::RecordSet;
pub use updater::UpdatedRecord;
pub use zone::ZoneHandle;

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, IpSource, PublicAddress};
use std::fmt;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

/// Stages of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    Resolving,
    FetchingRecords,
    Deciding,
    Updating,
    DoneNoop,
    DoneUpdated,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Init => "INIT",
            RunState::Resolving => "RESOLVING",
            RunState::FetchingRecords => "FETCHING_RECORDS",
            RunState::Deciding => "DECIDING",
            RunState::Updating => "UPDATING",
            RunState::DoneNoop => "DONE_NOOP",
            RunState::DoneUpdated => "DONE_UPDATED",
            RunState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Events emitted by the Reconciler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The run entered a new state
    StateChanged(RunState),

    /// A record was written and confirmed
    RecordUpdated {
        record_name: String,
        previous_content: String,
        new_content: String,
    },

    /// The run failed in `stage`
    Failed { stage: RunState, error: String },
}

/// How a successful run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The root record already held the public address
    Unchanged { address: PublicAddress },

    /// Every managed record now holds the public address
    Updated {
        address: PublicAddress,
        records: Vec<UpdatedRecord>,
    },

    /// Dry-run: these records would have been written
    DryRun {
        address: PublicAddress,
        records: Vec<String>,
    },
}

/// Single-shot reconciler
///
/// ## Lifecycle
///
/// 1. Create with [`Reconciler::new()`] (validates the configuration, no I/O)
/// 2. Call [`Reconciler::run()`] once
/// 3. Drop
///
/// Nothing survives between runs; every run starts from a fresh snapshot.
pub struct Reconciler {
    /// DNS provider for reading and editing records
    provider: Box<dyn DnsProvider>,

    /// Source of the public address
    ip_source: Box<dyn IpSource>,

    /// Run configuration
    config: SyncConfig,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<SyncEvent>,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// Returns [`Error::Config`] for an invalid configuration before any
    /// network call can happen.
    ///
    /// # Returns
    ///
    /// A tuple of (reconciler, event_receiver) where event_receiver yields run events
    pub fn new(
        provider: Box<dyn DnsProvider>,
        ip_source: Box<dyn IpSource>,
        config: SyncConfig,
    ) -> Result<(Self, mpsc::Receiver<SyncEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let reconciler = Self {
            provider,
            ip_source,
            config,
            event_tx: tx,
        };

        Ok((reconciler, rx))
    }

    /// Run one reconciliation
    ///
    /// # Returns
    ///
    /// - `Ok(RunOutcome)`: no-op, update, or dry-run
    /// - `Err(Error)`: the originating error of the failed stage
    pub async fn run(&self) -> Result<RunOutcome> {
        let mut stage = RunState::Init;
        self.emit_event(SyncEvent::StateChanged(stage));

        match self.run_internal(&mut stage).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!("Reconciliation failed during {}: {}", stage, e);
                if let Error::Update { converged, .. } = &e
                    && !converged.is_empty()
                {
                    error!(
                        "Already updated (left in place): {}",
                        converged.join(", ")
                    );
                }
                self.emit_event(SyncEvent::Failed {
                    stage,
                    error: e.to_string(),
                });
                self.emit_event(SyncEvent::StateChanged(RunState::Failed));
                Err(e)
            }
        }
    }

    async fn run_internal(&self, stage: &mut RunState) -> Result<RunOutcome> {
        let domain = self.config.domain.as_str();

        self.transition(stage, RunState::Resolving);
        let (zone, address) = tokio::join!(
            zone::resolve_zone(self.provider.as_ref(), domain),
            self.ip_source.current(),
        );
        let (zone, address) = match (zone, address) {
            (Ok(zone), Ok(address)) => (zone, address),
            (Err(e), Ok(_)) | (Ok(_), Err(e)) => return Err(e),
            (Err(zone_err), Err(ip_err)) => {
                warn!("Public IP resolution failed as well: {}", ip_err);
                return Err(zone_err);
            }
        };
        info!(
            "Zone {} resolved; public address from {} is {}",
            zone.id,
            self.ip_source.source_name(),
            address
        );

        self.transition(stage, RunState::FetchingRecords);
        let records = records::fetch_records(
            self.provider.as_ref(),
            &zone,
            domain,
            self.config.handle_www,
            self.config.duplicate_records,
        )
        .await?;

        self.transition(stage, RunState::Deciding);
        let decision = ReconciliationDecision::decide(&address, &records);

        if decision.up_to_date {
            if let Some(www) = &records.www
                && www.content != address.as_str()
            {
                warn!(
                    "{} holds {} while {} is current; leaving it unchanged",
                    www.name, www.content, records.root.name
                );
            }

            info!(
                "A record IP address matches current external IP address ({}), nothing to do",
                address
            );
            self.transition(stage, RunState::DoneNoop);
            return Ok(RunOutcome::Unchanged { address });
        }

        // Everything below acts on the decision only
        let ReconciliationDecision {
            target, affected, ..
        } = decision;

        if self.config.dry_run {
            for record in &affected {
                info!(
                    "[DRY-RUN] Would update {} ({}): {} -> {}",
                    record.name, record.id, record.content, target
                );
            }
            self.transition(stage, RunState::DoneNoop);
            return Ok(RunOutcome::DryRun {
                records: affected.iter().map(|r| r.name.clone()).collect(),
                address: target,
            });
        }

        self.transition(stage, RunState::Updating);
        let updated = updater::apply_updates(
            self.provider.as_ref(),
            &zone.id,
            &affected,
            &target,
            |record| {
                self.emit_event(SyncEvent::RecordUpdated {
                    record_name: record.name.clone(),
                    previous_content: record.previous_content.clone(),
                    new_content: record.content.clone(),
                })
            },
        )
        .await?;

        self.transition(stage, RunState::DoneUpdated);
        Ok(RunOutcome::Updated {
            address: target,
            records: updated,
        })
    }

    fn transition(&self, stage: &mut RunState, next: RunState) {
        debug!("{} -> {}", stage, next);
        *stage = next;
        self.emit_event(SyncEvent::StateChanged(next));
    }

    /// Emit a run event
    ///
    /// A full channel drops the event with a warning; a closed one is ignored.
    fn emit_event(&self, event: SyncEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(
                    "Event channel full, dropping event. \
                     Consider increasing event_channel_capacity."
                );
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }
}
