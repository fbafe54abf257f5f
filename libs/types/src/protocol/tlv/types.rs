//! TLV type registry.
//!
//! Central source of truth for all protocol message types, organized by
//! domain-based numeric ranges:
//!
//! - **Market Data (1-19)**: high-frequency price/volume data
//! - **Signal (20-39)**: trading signal coordination
//! - **Execution (40-79)**: order lifecycle management
//! - **Risk (80-99)**: exposure and threshold monitoring (rides the Signal relay)
//! - **System (100-119)**: heartbeat, snapshot and recovery traffic
//! - **Vendor (200-254)**: private/experimental types with no variants
//!   here; the codec carries them opaquely
//! - **Extended (255)**: escape marker for payloads larger than 255 bytes
//!
//! Fixed-size constraints exist for hot-path types so consumers can reject
//! a malformed payload with a single length comparison before touching any
//! field.

use crate::protocol::relay_domain::RelayDomain;
use num_enum::TryFromPrimitive;

/// Size validation rule for a TLV type's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlvSizeConstraint {
    /// Payload must be exactly this many bytes.
    Fixed(usize),
    /// Payload must fall within this inclusive range.
    Bounded { min: usize, max: usize },
    /// Any size accepted.
    Variable,
}

/// Registered TLV message types.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum TlvType {
    // Market Data domain (1-19)
    /// Trade execution event: price, volume, side, venue sequence.
    Trade = 1,
    /// Best bid/offer update with sizes.
    Quote = 2,
    /// Order book levels; depth varies per venue.
    OrderBook = 3,
    /// Pool liquidity add/remove; length depends on token count.
    PoolLiquidity = 10,
    /// DEX swap event with post-swap reserves.
    PoolSwap = 11,

    // Signal domain (20-39)
    /// Identifies which strategy produced a signal and its nonce.
    SignalIdentity = 20,
    /// Cross-asset correlation observation.
    AssetCorrelation = 21,
    /// Expected profit and capital requirements of a signal.
    Economics = 22,

    // Execution domain (40-79)
    /// Order submission request.
    OrderRequest = 40,
    /// Order state transition report.
    OrderStatus = 41,
    /// Execution fill report.
    Fill = 42,

    // Risk domain (80-99)
    /// Net exposure by asset and venue.
    ExposureReport = 80,
    /// Stop-loss and position limit update.
    RiskThreshold = 81,

    // System domain (100-119)
    /// Liveness beacon with the producer's publish interval.
    Heartbeat = 100,
    /// Full-state checkpoint used to fast-forward a recovering consumer.
    Snapshot = 101,
    /// Fault notice from a producer or relay.
    ErrorNotice = 102,
    /// Consumer request for retransmission or a snapshot.
    RecoveryRequest = 110,

    /// Extended TLV escape marker; never a payload type of its own.
    ExtendedTlv = 255,
}

impl TlvType {
    /// Human-readable name for logs and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            TlvType::Trade => "Trade",
            TlvType::Quote => "Quote",
            TlvType::OrderBook => "OrderBook",
            TlvType::PoolLiquidity => "PoolLiquidity",
            TlvType::PoolSwap => "PoolSwap",
            TlvType::SignalIdentity => "SignalIdentity",
            TlvType::AssetCorrelation => "AssetCorrelation",
            TlvType::Economics => "Economics",
            TlvType::OrderRequest => "OrderRequest",
            TlvType::OrderStatus => "OrderStatus",
            TlvType::Fill => "Fill",
            TlvType::ExposureReport => "ExposureReport",
            TlvType::RiskThreshold => "RiskThreshold",
            TlvType::Heartbeat => "Heartbeat",
            TlvType::Snapshot => "Snapshot",
            TlvType::ErrorNotice => "ErrorNotice",
            TlvType::RecoveryRequest => "RecoveryRequest",
            TlvType::ExtendedTlv => "ExtendedTlv",
        }
    }

    /// The relay domain this type routes through.
    pub fn relay_domain(&self) -> Option<RelayDomain> {
        RelayDomain::from_tlv_type(*self as u8)
    }

    /// Size validation rule for this type's payload.
    pub fn size_constraint(&self) -> TlvSizeConstraint {
        use TlvSizeConstraint::*;
        match self {
            TlvType::Trade => Fixed(49),
            TlvType::Quote => Fixed(52),
            TlvType::OrderBook => Variable,
            TlvType::PoolLiquidity => Bounded { min: 24, max: 168 },
            TlvType::PoolSwap => Fixed(102),
            TlvType::SignalIdentity => Fixed(24),
            TlvType::AssetCorrelation => Variable,
            TlvType::Economics => Fixed(32),
            TlvType::OrderRequest => Fixed(40),
            TlvType::OrderStatus => Variable,
            TlvType::Fill => Fixed(56),
            TlvType::ExposureReport => Variable,
            TlvType::RiskThreshold => Fixed(24),
            TlvType::Heartbeat => Fixed(12),
            TlvType::Snapshot => Bounded { min: 16, max: 65_535 },
            TlvType::ErrorNotice => Variable,
            TlvType::RecoveryRequest => Fixed(24),
            TlvType::ExtendedTlv => Variable,
        }
    }

    /// Exact payload size for fixed-size types, `None` otherwise.
    pub fn expected_payload_size(&self) -> Option<usize> {
        match self.size_constraint() {
            TlvSizeConstraint::Fixed(size) => Some(size),
            _ => None,
        }
    }

    /// All registered types routed through the given domain.
    pub fn types_in_domain(domain: RelayDomain) -> Vec<TlvType> {
        Self::all()
            .iter()
            .copied()
            .filter(|t| t.relay_domain() == Some(domain))
            .collect()
    }

    fn all() -> &'static [TlvType] {
        &[
            TlvType::Trade,
            TlvType::Quote,
            TlvType::OrderBook,
            TlvType::PoolLiquidity,
            TlvType::PoolSwap,
            TlvType::SignalIdentity,
            TlvType::AssetCorrelation,
            TlvType::Economics,
            TlvType::OrderRequest,
            TlvType::OrderStatus,
            TlvType::Fill,
            TlvType::ExposureReport,
            TlvType::RiskThreshold,
            TlvType::Heartbeat,
            TlvType::Snapshot,
            TlvType::ErrorNotice,
            TlvType::RecoveryRequest,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_sizes_match_wire_structs() {
        assert_eq!(TlvType::Trade.expected_payload_size(), Some(49));
        assert_eq!(TlvType::PoolSwap.expected_payload_size(), Some(102));
        assert_eq!(TlvType::OrderBook.expected_payload_size(), None);
    }

    #[test]
    fn names_match_variants() {
        assert_eq!(TlvType::Trade.name(), "Trade");
        assert_eq!(TlvType::PoolSwap.name(), "PoolSwap");
        assert_eq!(TlvType::RecoveryRequest.name(), "RecoveryRequest");
    }

    #[test]
    fn registry_domains() {
        assert_eq!(TlvType::Trade.relay_domain(), Some(RelayDomain::MarketData));
        assert_eq!(TlvType::Economics.relay_domain(), Some(RelayDomain::Signal));
        assert_eq!(TlvType::Fill.relay_domain(), Some(RelayDomain::Execution));
        assert_eq!(
            TlvType::RiskThreshold.relay_domain(),
            Some(RelayDomain::Signal)
        );
        assert_eq!(TlvType::Snapshot.relay_domain(), Some(RelayDomain::System));

        let market = TlvType::types_in_domain(RelayDomain::MarketData);
        assert!(market.contains(&TlvType::Trade));
        assert!(!market.contains(&TlvType::Fill));
    }

    #[test]
    fn try_from_primitive() {
        assert_eq!(TlvType::try_from(1u8).unwrap(), TlvType::Trade);
        assert_eq!(TlvType::try_from(110u8).unwrap(), TlvType::RecoveryRequest);
        assert!(TlvType::try_from(200u8).is_err()); // vendor types stay opaque
    }
}
