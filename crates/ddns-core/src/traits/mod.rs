//! Core traits for the DDNS sync tool
//!
//! This module defines the abstract interfaces that implementations must follow.
//!
//! - [`IpSource`]: Discover the current public IPv4 address
//! - [`DnsProvider`]: List zones and records, edit record content

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::{IpSource, PublicAddress};
pub use dns_provider::{DnsProvider, DnsRecord, EditedRecord, Zone};
