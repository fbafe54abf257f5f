//! TLV type registry and fixed-layout payload structs.
//!
//! Payloads decode in two stages: the generic codec yields `(type, bytes)`
//! records with unknown types preserved opaquely, and only a caller that
//! recognizes a type converts the bytes into one of the structs defined
//! here. New types therefore degrade gracefully instead of failing closed.

pub mod execution;
pub mod market_data;
pub mod signal;
pub mod system;
pub mod types;

use thiserror::Error;

/// A typed payload's wire length did not match its fixed layout.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("wire size mismatch: expected {expected} bytes, got {got}")]
pub struct WireSizeError {
    pub expected: usize,
    pub got: usize,
}

/// A fixed-layout TLV payload that knows its own type number and wire form.
///
/// Implementations write fields at explicit byte offsets; none rely on the
/// compiler's struct layout.
pub trait TlvPayload: Sized {
    /// The registry type number this payload is carried under.
    const TLV_TYPE: types::TlvType;

    /// Encode to the exact wire representation.
    fn to_bytes(&self) -> Vec<u8>;

    /// Decode from the exact wire representation.
    ///
    /// Callers are expected to have checked the record's length against the
    /// registry before interpreting the bytes; this returns
    /// [`WireSizeError`] as a second line of defense.
    fn from_bytes(data: &[u8]) -> Result<Self, WireSizeError>;
}

pub use execution::{FillTlv, OrderRequestTlv};
pub use market_data::{PoolSwapTlv, QuoteTlv, TradeTlv};
pub use signal::{EconomicsTlv, SignalIdentityTlv};
pub use system::{HeartbeatTlv, RecoveryKind, RecoveryRequestTlv, SnapshotTlv};
