// # IP Source Trait
//
// Defines the interface for discovering the machine's public IPv4 address.
//
// ## Implementations
//
// - HTTP plain-text services: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// let address = source.current().await?;
// println!("public address: {}", address);
// ```

use async_trait::async_trait;
use std::fmt;
use std::net::Ipv4Addr;

/// The caller's public IPv4 address as observed by an external service
///
/// Holds the literal text the service answered with, validated to be a
/// dotted-decimal IPv4 address. Comparisons against record content are plain
/// string equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicAddress {
    literal: String,
}

impl PublicAddress {
    /// Validate an IPv4 literal
    ///
    /// Surrounding whitespace is removed; anything that is not an IPv4
    /// literal is rejected with [`Error::Decode`](crate::Error::Decode).
    pub fn parse(text: &str) -> crate::Result<Self> {
        let literal = text.trim();
        literal.parse::<Ipv4Addr>().map_err(|_| {
            crate::Error::decode(format!("expected an IPv4 literal, got {:?}", literal))
        })?;

        Ok(Self {
            literal: literal.to_string(),
        })
    }

    /// The address as text
    pub fn as_str(&self) -> &str {
        &self.literal
    }
}

impl fmt::Display for PublicAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

/// Trait for IP source implementations
///
/// A source answers one question per call and keeps no state between calls.
/// It must not retry; an overrun of its deadline is reported as a timeout.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current public IPv4 address
    async fn current(&self) -> Result<PublicAddress, crate::Error>;

    /// Short name for logs
    fn source_name(&self) -> &'static str {
        "ip-source"
    }
}
