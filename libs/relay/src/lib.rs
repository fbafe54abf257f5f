//! # Tapecast Relay - Routing and Recovery
//!
//! The layer above the codecs: dispatches parsed messages to the consumer
//! set of their declared domain, enforces that TLV type ranges stay within
//! that domain, and keeps every consumer's sequence position so gaps are
//! detected and repaired (retransmit for small gaps, snapshot for large
//! ones) without one slow reader ever blocking the others.
//!
//! Transport is an external collaborator: anything that delivers opaque
//! byte buffers in arrival order per connection can carry these messages.
//! This crate owns only the routing policy and the per-consumer sequence
//! table behind it.
//!
//! ## Concurrency
//!
//! The codec layer is pure; all mutable state lives here. Each domain's
//! consumer table sits behind its own `parking_lot::RwLock` (one slow
//! domain never contends with another), and the relay-wide global
//! sequence is an atomic so new-consumer bootstrap reads are lock-free.

pub mod config;
pub mod domain;
pub mod recovery;
pub mod router;

use std::fmt;
use tapecast_codec::ProtocolError;
use thiserror::Error;

pub use config::{RecoveryConfig, RelayConfig, RelaySettings, ValidationPolicy};
pub use domain::{
    DomainPolicy, ExecutionPolicy, MarketDataPolicy, SignalPolicy, SystemPolicy,
};
pub use recovery::{
    ConsumerStatus, RecoveryCoordinator, RecoveryEvent, RecoveryPlan, RecoveryRequest,
    RegistryStats, SyncState,
};
pub use router::{Delivery, DomainRelay, Router};

/// Identifies one registered consumer of a relay.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConsumerId(String);

impl ConsumerId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConsumerId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Relay-layer errors.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("consumer {0} is not registered")]
    UnknownConsumer(ConsumerId),

    #[error("no relay for domain {0:?}")]
    UnknownDomainRelay(tapecast_types::RelayDomain),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Result type for relay operations.
pub type RelayResult<T> = std::result::Result<T, RelayError>;
