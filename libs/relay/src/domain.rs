//! Domain-specific relay policy.
//!
//! The minimal seam a domain implements to customize relay behavior:
//! which domain it serves, its default validation/recovery configuration,
//! and an optional per-message forwarding filter. The router supplies all
//! shared infrastructure.

use crate::config::RelayConfig;
use tapecast_types::{MessageHeader, RelayDomain};

/// Domain-specific relay logic.
///
/// The default `should_forward`, a single byte comparison against the
/// header, covers the common case; override it only for policies that
/// must inspect more of the header, and keep it cheap: it runs for every
/// message on the hot path.
pub trait DomainPolicy: Send + Sync + 'static {
    /// The relay domain this policy handles.
    fn domain(&self) -> RelayDomain;

    /// Default configuration for this domain.
    fn default_config(&self) -> RelayConfig {
        RelayConfig::default_for_domain(self.domain())
    }

    /// Whether a message should be forwarded to this domain's consumers.
    fn should_forward(&self, header: &MessageHeader) -> bool {
        header.relay_domain == self.domain() as u8
    }
}

/// Market data relay policy: TLV types 1-19, checksum verification off by
/// default so the hot path stays hot.
pub struct MarketDataPolicy;

impl DomainPolicy for MarketDataPolicy {
    fn domain(&self) -> RelayDomain {
        RelayDomain::MarketData
    }
}

/// Signal relay policy: TLV types 20-39 plus risk analytics 80-99,
/// checksums always verified.
pub struct SignalPolicy;

impl DomainPolicy for SignalPolicy {
    fn domain(&self) -> RelayDomain {
        RelayDomain::Signal
    }
}

/// Execution relay policy: TLV types 40-79, full validation and audit.
pub struct ExecutionPolicy;

impl DomainPolicy for ExecutionPolicy {
    fn domain(&self) -> RelayDomain {
        RelayDomain::Execution
    }
}

/// System relay policy: TLV types 100-119.
pub struct SystemPolicy;

impl DomainPolicy for SystemPolicy {
    fn domain(&self) -> RelayDomain {
        RelayDomain::System
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapecast_types::SourceType;

    #[test]
    fn default_forwarding_checks_the_domain_byte() {
        let policy = MarketDataPolicy;
        let mut header = MessageHeader::new(RelayDomain::MarketData, SourceType::KrakenCollector);
        assert!(policy.should_forward(&header));

        header.relay_domain = RelayDomain::Signal as u8;
        assert!(!policy.should_forward(&header));
    }

    #[test]
    fn default_configs_follow_the_domain() {
        assert!(!MarketDataPolicy.default_config().validation.checksum);
        assert!(SignalPolicy.default_config().validation.checksum);
        assert!(ExecutionPolicy.default_config().validation.audit);
    }
}
