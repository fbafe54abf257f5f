//! Relay configuration.
//!
//! Each relay domain loads one TOML file with three sections: core
//! settings, the validation policy, and the recovery knobs. Domain
//! defaults encode the protocol's precision/latency trade-off (market
//! data skips checksum verification for hot-path throughput; signal and
//! execution always verify) as a configuration default, never a
//! hardcoded constant.
//!
//! ```toml
//! [relay]
//! domain = 2
//! name = "signal"
//!
//! [validation]
//! checksum = true
//! audit = false
//! strict = true
//! max_message_size = 32768
//!
//! [recovery]
//! retransmit_threshold = 100
//! request_timeout_ms = 5000
//! max_escalations = 2
//! inactive_timeout_secs = 300
//! ```

use crate::RelayError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tapecast_types::RelayDomain;

/// Main relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
    pub relay: RelaySettings,
    pub validation: ValidationPolicy,
    pub recovery: RecoveryConfig,
}

/// Core relay settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelaySettings {
    /// Relay domain discriminant (1=market_data, 2=signal, 3=execution, 100=system).
    pub domain: u8,
    /// Human-readable name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Validation policy for one domain.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidationPolicy {
    /// Verify CRC32 checksums on ingest.
    pub checksum: bool,
    /// Emit an audit log line per message.
    pub audit: bool,
    /// Reject rather than log-and-drop on any validation error.
    pub strict: bool,
    /// Maximum accepted message size in bytes.
    pub max_message_size: Option<usize>,
}

/// Recovery tuning for one domain.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecoveryConfig {
    /// Gap size at or above which a snapshot replaces retransmission.
    /// A tunable default, not a protocol constant.
    pub retransmit_threshold: u64,
    /// How long to wait for a recovery response before escalating.
    pub request_timeout_ms: u64,
    /// Escalations (retransmit→snapshot, snapshot retry) before the
    /// consumer is declared failed and must reconnect.
    pub max_escalations: u32,
    /// Consumers silent for longer than this are swept from the registry.
    pub inactive_timeout_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            retransmit_threshold: 100,
            request_timeout_ms: 5_000,
            max_escalations: 2,
            inactive_timeout_secs: 300,
        }
    }
}

impl RecoveryConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn inactive_timeout(&self) -> Duration {
        Duration::from_secs(self.inactive_timeout_secs)
    }
}

impl RelayConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RelayError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RelayError::Config(format!("failed to read config file: {e}")))?;
        toml::from_str(&contents)
            .map_err(|e| RelayError::Config(format!("failed to parse config: {e}")))
    }

    /// Default configuration for a domain.
    pub fn default_for_domain(domain: RelayDomain) -> Self {
        match domain {
            RelayDomain::MarketData => Self::market_data_defaults(),
            RelayDomain::Signal => Self::signal_defaults(),
            RelayDomain::Execution => Self::execution_defaults(),
            RelayDomain::System => Self::system_defaults(),
        }
    }

    /// High-throughput market data relay: checksum verification skipped.
    pub fn market_data_defaults() -> Self {
        Self {
            relay: RelaySettings {
                domain: RelayDomain::MarketData as u8,
                name: "market_data".to_string(),
                description: Some("High-throughput market data relay".to_string()),
            },
            validation: ValidationPolicy {
                checksum: false, // hot-path latency beats integrity here
                audit: false,
                strict: false,
                max_message_size: Some(4_096),
            },
            recovery: RecoveryConfig {
                retransmit_threshold: 100,
                request_timeout_ms: 2_000,
                max_escalations: 2,
                inactive_timeout_secs: 60,
            },
        }
    }

    /// Signal relay: checksums always verified.
    pub fn signal_defaults() -> Self {
        Self {
            relay: RelaySettings {
                domain: RelayDomain::Signal as u8,
                name: "signal".to_string(),
                description: Some("Reliable signal relay with validation".to_string()),
            },
            validation: ValidationPolicy {
                checksum: true,
                audit: false,
                strict: true,
                max_message_size: Some(32_768),
            },
            recovery: RecoveryConfig::default(),
        }
    }

    /// Execution relay: full validation plus audit trail.
    pub fn execution_defaults() -> Self {
        Self {
            relay: RelaySettings {
                domain: RelayDomain::Execution as u8,
                name: "execution".to_string(),
                description: Some("Secure execution relay with full audit".to_string()),
            },
            validation: ValidationPolicy {
                checksum: true,
                audit: true,
                strict: true,
                max_message_size: Some(16_384),
            },
            recovery: RecoveryConfig {
                retransmit_threshold: 10,
                request_timeout_ms: 5_000,
                max_escalations: 2,
                inactive_timeout_secs: 300,
            },
        }
    }

    /// System relay: verified, moderate limits.
    pub fn system_defaults() -> Self {
        Self {
            relay: RelaySettings {
                domain: RelayDomain::System as u8,
                name: "system".to_string(),
                description: Some("Infrastructure and recovery traffic".to_string()),
            },
            validation: ValidationPolicy {
                checksum: true,
                audit: false,
                strict: false,
                max_message_size: Some(65_536),
            },
            recovery: RecoveryConfig::default(),
        }
    }

    /// Validate cross-field consistency.
    pub fn validate(&self) -> Result<(), RelayError> {
        if RelayDomain::try_from(self.relay.domain).is_err() {
            return Err(RelayError::Config(format!(
                "unknown relay domain {}",
                self.relay.domain
            )));
        }
        if self.recovery.retransmit_threshold == 0 {
            return Err(RelayError::Config(
                "retransmit_threshold must be > 0".to_string(),
            ));
        }
        if self.recovery.request_timeout_ms == 0 {
            return Err(RelayError::Config(
                "request_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_defaults_encode_the_checksum_tradeoff() {
        let market = RelayConfig::market_data_defaults();
        assert!(!market.validation.checksum);

        let signal = RelayConfig::signal_defaults();
        assert!(signal.validation.checksum);

        let execution = RelayConfig::execution_defaults();
        assert!(execution.validation.checksum);
        assert!(execution.validation.audit);

        for config in [market, signal, execution] {
            config.validate().unwrap();
        }
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = RelayConfig::signal_defaults();
        let text = toml::to_string(&config).unwrap();
        let parsed: RelayConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.relay.domain, RelayDomain::Signal as u8);
        assert_eq!(parsed.recovery.retransmit_threshold, 100);
    }

    #[test]
    fn bad_domain_is_rejected() {
        let mut config = RelayConfig::signal_defaults();
        config.relay.domain = 42;
        assert!(config.validate().is_err());
    }
}
