//! Configuration types for the DDNS sync tool
//!
//! This module defines the run configuration and the log level set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default public-IP service
pub const DEFAULT_IP_ENDPOINT: &str = "https://api.ipify.org";

/// Default deadline for every outbound call
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Main sync configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Provider API token
    /// ⚠️ NEVER log this value
    pub api_token: String,

    /// Domain whose root A record is kept in sync
    pub domain: String,

    /// Also keep `www.<domain>` in sync
    #[serde(default)]
    pub handle_www: bool,

    /// Public-IP service URL
    #[serde(default = "default_ip_endpoint")]
    pub ip_endpoint: String,

    /// Deadline for each outbound call (in seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// What to do when a name matches more than one A record
    #[serde(default)]
    pub duplicate_records: DuplicateRecordPolicy,

    /// Perform all reads but skip the writes
    #[serde(default)]
    pub dry_run: bool,

    /// Capacity of the run event channel
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl SyncConfig {
    /// Create a configuration with defaults for everything but the inputs
    pub fn new(api_token: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            domain: domain.into(),
            handle_www: false,
            ip_endpoint: default_ip_endpoint(),
            timeout_secs: default_timeout_secs(),
            duplicate_records: DuplicateRecordPolicy::default(),
            dry_run: false,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Enable or disable www handling
    pub fn with_handle_www(mut self, handle_www: bool) -> Self {
        self.handle_www = handle_www;
        self
    }

    /// Set the duplicate-record policy
    pub fn with_duplicate_records(mut self, policy: DuplicateRecordPolicy) -> Self {
        self.duplicate_records = policy;
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Per-call deadline
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    ///
    /// Nothing here touches the network.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_token.is_empty() {
            return Err(crate::Error::config("API token cannot be empty"));
        }

        if self.domain.is_empty() {
            return Err(crate::Error::config("Domain name cannot be empty"));
        }

        validate_domain_name(&self.domain)?;

        if self.ip_endpoint.is_empty() {
            return Err(crate::Error::config("Public IP endpoint cannot be empty"));
        }

        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Timeout must be > 0"));
        }

        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }

        Ok(())
    }
}

// Custom Debug implementation that hides the API token
impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("api_token", &"<REDACTED>")
            .field("domain", &self.domain)
            .field("handle_www", &self.handle_www)
            .field("ip_endpoint", &self.ip_endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field("duplicate_records", &self.duplicate_records)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

/// Validate that a string is a DNS domain name (RFC 1035 label rules)
pub fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "Domain name too long: {} chars (max 253)",
            domain.len()
        )));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Domain name has empty label: '{}'",
                domain
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(crate::Error::config(format!(
                "Domain label contains invalid characters: '{}'",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Domain label cannot start or end with hyphen: '{}'",
                label
            )));
        }
    }

    Ok(())
}

/// Policy for a record name that matches more than one A record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateRecordPolicy {
    /// The last record in listing order is used, with a warning
    #[default]
    LastWins,
    /// Fail with [`Error::AmbiguousRecord`](crate::Error::AmbiguousRecord)
    Reject,
}

/// Log verbosity accepted on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    #[default]
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    /// Parse a level name, case-insensitively
    ///
    /// Unknown names fall back to [`LogLevel::Warn`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "info" => LogLevel::Info,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            "fatal" => LogLevel::Fatal,
            _ => LogLevel::Warn,
        }
    }

    /// Matching tracing level; tracing has no fatal level, so Fatal maps to ERROR
    pub fn tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error | LogLevel::Fatal => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Info => "Info",
            LogLevel::Warn => "Warn",
            LogLevel::Error => "Error",
            LogLevel::Fatal => "Fatal",
        };
        f.write_str(name)
    }
}

fn default_ip_endpoint() -> String {
    DEFAULT_IP_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_event_channel_capacity() -> usize {
    32
}
