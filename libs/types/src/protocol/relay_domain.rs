//! Relay domains for message routing.

use num_enum::TryFromPrimitive;

/// Relay domains for message routing.
///
/// Messages are routed to domain-specific relays based on the header's
/// `relay_domain` field, and every TLV type carried in a message must fall
/// in a range the declared domain admits. Each domain has its own
/// validation policy and performance characteristics.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum RelayDomain {
    /// Market data domain (TLV types 1-19).
    /// High-frequency price updates, trades and pool events.
    MarketData = 1,

    /// Signal domain (TLV types 20-39, plus risk analytics 80-99).
    /// Trading signals and analytics messages.
    Signal = 2,

    /// Execution domain (TLV types 40-79).
    /// Order requests, fills and trade confirmations.
    Execution = 3,

    /// System domain (TLV types 100-119).
    /// Infrastructure, snapshot and recovery messages.
    System = 100,
}

impl RelayDomain {
    /// Determine the relay domain a TLV type routes through.
    ///
    /// Vendor types (200-254) have no home domain of their own and return
    /// `None`; they ride whichever relay the producer addressed.
    pub fn from_tlv_type(tlv_type: u8) -> Option<Self> {
        match tlv_type {
            1..=19 => Some(RelayDomain::MarketData),
            20..=39 | 80..=99 => Some(RelayDomain::Signal),
            40..=79 => Some(RelayDomain::Execution),
            100..=119 => Some(RelayDomain::System),
            _ => None,
        }
    }

    /// Whether a TLV type may appear in a message declared for this domain.
    ///
    /// System types (100-119) are admitted everywhere: heartbeat, snapshot
    /// and recovery control traffic flows over every relay. Vendor types
    /// (200-254) are private extensions and pass everywhere. Anything else
    /// outside the domain's own range is a protocol violation.
    pub fn admits_tlv_type(&self, tlv_type: u8) -> bool {
        if matches!(tlv_type, 100..=119 | 200..=254) {
            return true;
        }
        match self {
            RelayDomain::MarketData => matches!(tlv_type, 1..=19),
            RelayDomain::Signal => matches!(tlv_type, 20..=39 | 80..=99),
            RelayDomain::Execution => matches!(tlv_type, 40..=79),
            RelayDomain::System => false, // 100-119 already admitted above
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tlv_ranges_map_to_domains() {
        assert_eq!(RelayDomain::from_tlv_type(1), Some(RelayDomain::MarketData));
        assert_eq!(RelayDomain::from_tlv_type(19), Some(RelayDomain::MarketData));
        assert_eq!(RelayDomain::from_tlv_type(20), Some(RelayDomain::Signal));
        assert_eq!(RelayDomain::from_tlv_type(85), Some(RelayDomain::Signal));
        assert_eq!(RelayDomain::from_tlv_type(40), Some(RelayDomain::Execution));
        assert_eq!(RelayDomain::from_tlv_type(110), Some(RelayDomain::System));
        assert_eq!(RelayDomain::from_tlv_type(200), None);
        assert_eq!(RelayDomain::from_tlv_type(0), None);
    }

    #[test]
    fn domain_fencing() {
        assert!(RelayDomain::MarketData.admits_tlv_type(1));
        assert!(!RelayDomain::MarketData.admits_tlv_type(25));
        assert!(!RelayDomain::Signal.admits_tlv_type(1));
        assert!(RelayDomain::Signal.admits_tlv_type(25));
        assert!(RelayDomain::Signal.admits_tlv_type(80));
        assert!(RelayDomain::Execution.admits_tlv_type(42));
        assert!(!RelayDomain::Execution.admits_tlv_type(19));
    }

    #[test]
    fn control_and_vendor_traffic_passes_everywhere() {
        for domain in [
            RelayDomain::MarketData,
            RelayDomain::Signal,
            RelayDomain::Execution,
            RelayDomain::System,
        ] {
            assert!(domain.admits_tlv_type(100)); // heartbeat
            assert!(domain.admits_tlv_type(101)); // snapshot
            assert!(domain.admits_tlv_type(110)); // recovery request
            assert!(domain.admits_tlv_type(200)); // vendor
            assert!(domain.admits_tlv_type(254));
        }
    }
}
