//! Domain routing and fan-out.
//!
//! A [`Router`] owns one [`DomainRelay`] per domain and dispatches each
//! parsed message to the consumer set of its declared `relay_domain`.
//! Routing is a fan-out, not point-to-point: a single message is read by
//! every subscriber of the domain, and a dashboard may subscribe to all
//! domains at once.
//!
//! The router is stateless per message; the only persistent state it
//! touches is each relay's per-consumer sequence table, updated
//! synchronously with delivery, plus the relay-wide global sequence kept
//! in an atomic for lock-free bootstrap reads.

use crate::config::{RelayConfig, ValidationPolicy};
use crate::domain::{
    DomainPolicy, ExecutionPolicy, MarketDataPolicy, SignalPolicy, SystemPolicy,
};
use crate::recovery::{RecoveryCoordinator, RecoveryEvent, RecoveryPlan, RecoveryRequest};
use crate::{ConsumerId, RelayError, RelayResult};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tapecast_codec::{decode_tlvs, parse_header, parse_header_unchecked, ProtocolError};
use tapecast_types::{MessageHeader, RelayDomain};
use tracing::{debug, warn};

/// Result of routing one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub domain: RelayDomain,
    pub sequence: u64,
    /// Every consumer subscribed to the domain; fan-out delivery.
    pub consumers: Vec<ConsumerId>,
    /// Recovery requests opened by this delivery (one per consumer that
    /// just detected a gap).
    pub recovery_requests: Vec<RecoveryRequest>,
}

/// One domain's relay state: policy seam, subscriber set, validation
/// configuration and recovery coordinator.
pub struct DomainRelay {
    policy: Box<dyn DomainPolicy>,
    domain: RelayDomain,
    validation: ValidationPolicy,
    subscribers: BTreeSet<ConsumerId>,
    recovery: RecoveryCoordinator,
}

impl DomainRelay {
    pub fn new(policy: Box<dyn DomainPolicy>, config: RelayConfig) -> Self {
        let domain = policy.domain();
        Self {
            policy,
            domain,
            validation: config.validation.clone(),
            subscribers: BTreeSet::new(),
            recovery: RecoveryCoordinator::new(domain, config.recovery),
        }
    }

    pub fn domain(&self) -> RelayDomain {
        self.domain
    }

    /// Validate and deliver one message. `data` is the complete message;
    /// `header` has already passed the structure checks.
    fn deliver(
        &mut self,
        data: &[u8],
        header: &MessageHeader,
        global_sequence: u64,
        now: Instant,
    ) -> RelayResult<Delivery> {
        // Per-message filter hook; the default is the domain byte check
        // the router has already performed, so this only fires for custom
        // policies.
        if !self.policy.should_forward(header) {
            debug!(domain = ?self.domain, sequence = header.sequence, "filtered by domain policy");
            return Ok(Delivery {
                domain: self.domain,
                sequence: header.sequence,
                consumers: Vec::new(),
                recovery_requests: Vec::new(),
            });
        }

        if let Some(max) = self.validation.max_message_size {
            if data.len() > max {
                return Err(RelayError::Validation(format!(
                    "message too large: {} > {}",
                    data.len(),
                    max
                )));
            }
        }

        // Checksum policy is per-domain configuration, not a global.
        if self.validation.checksum {
            parse_header(data)?;
        }

        // Domain fencing: every contained TLV must be admitted by the
        // declared domain. A violation drops the message, never just the
        // offending record.
        let payload = &data[MessageHeader::SIZE..MessageHeader::SIZE + header.payload_size as usize];
        let records = decode_tlvs(payload)?;
        for record in &records {
            if !self.domain.admits_tlv_type(record.tlv_type) {
                warn!(
                    domain = ?self.domain, tlv_type = record.tlv_type,
                    sequence = header.sequence, "TLV type outside declared domain"
                );
                return Err(RelayError::Protocol(ProtocolError::DomainMismatch {
                    tlv_type: record.tlv_type,
                    declared_domain: self.domain,
                }));
            }
        }

        if self.validation.audit {
            tracing::info!(
                target: "audit",
                domain = ?self.domain,
                source = header.source,
                sequence = header.sequence,
                size = data.len(),
                tlv_count = records.len(),
                "message accepted"
            );
        }

        let mut recovery_requests = Vec::new();
        let consumers: Vec<ConsumerId> = self.subscribers.iter().cloned().collect();
        for consumer in &consumers {
            if let Some(request) =
                self.recovery
                    .observe(consumer, header.sequence, global_sequence, now)
            {
                recovery_requests.push(request);
            }
        }

        debug!(
            domain = ?self.domain, sequence = header.sequence,
            consumers = consumers.len(), "delivered"
        );
        Ok(Delivery {
            domain: self.domain,
            sequence: header.sequence,
            consumers,
            recovery_requests,
        })
    }
}

/// Dispatches parsed messages to the consumer set of their declared
/// domain and drives each domain's recovery coordinator.
pub struct Router {
    relays: HashMap<RelayDomain, RwLock<DomainRelay>>,
    global_sequence: AtomicU64,
}

impl Router {
    /// Router with each domain policy's default configuration.
    pub fn new() -> Self {
        Self::with_configs(|domain| default_policy(domain).default_config())
    }

    /// Router with caller-supplied per-domain configuration.
    pub fn with_configs(mut config_for: impl FnMut(RelayDomain) -> RelayConfig) -> Self {
        let mut relays = HashMap::new();
        for domain in [
            RelayDomain::MarketData,
            RelayDomain::Signal,
            RelayDomain::Execution,
            RelayDomain::System,
        ] {
            let relay = DomainRelay::new(default_policy(domain), config_for(domain));
            relays.insert(domain, RwLock::new(relay));
        }
        Self {
            relays,
            global_sequence: AtomicU64::new(0),
        }
    }

    /// Current relay-wide global sequence. Lock-free; used for
    /// new-consumer bootstrap.
    pub fn global_sequence(&self) -> u64 {
        self.global_sequence.load(Ordering::Acquire)
    }

    /// Subscribe a consumer to a domain. Returns the bootstrap sequence
    /// the consumer starts from.
    pub fn subscribe(&self, domain: RelayDomain, consumer: ConsumerId) -> RelayResult<u64> {
        let relay = self.relay(domain)?;
        let mut relay = relay.write();
        let bootstrap = self.global_sequence();
        relay.subscribers.insert(consumer.clone());
        Ok(relay.recovery.register(consumer, bootstrap, Instant::now()))
    }

    /// Remove a consumer from a domain. Its sequence state goes with it;
    /// no partially-applied snapshot is left pending.
    pub fn unsubscribe(&self, domain: RelayDomain, consumer: &ConsumerId) -> RelayResult<()> {
        let relay = self.relay(domain)?;
        let mut relay = relay.write();
        relay.subscribers.remove(consumer);
        relay.recovery.remove(consumer);
        Ok(())
    }

    /// Route one message to its domain's consumer set.
    ///
    /// Per-message errors (structural, validation, fencing) are local to
    /// the message: the caller logs, drops and continues with the next
    /// message.
    pub fn route(&self, data: &[u8]) -> RelayResult<Delivery> {
        let header = parse_header_unchecked(data)?;
        let domain = RelayDomain::try_from(header.relay_domain)
            .map_err(|_| RelayError::Protocol(ProtocolError::UnknownDomain(header.relay_domain)))?;

        let relay = self.relay(domain)?;
        let mut relay = relay.write();
        let global = self.global_sequence().max(header.sequence);
        let delivery = relay.deliver(data, &header, global, Instant::now())?;

        // Advance the watermark only for messages that passed validation,
        // so a corrupt message never moves the bootstrap point.
        self.global_sequence
            .fetch_max(header.sequence, Ordering::AcqRel);
        Ok(delivery)
    }

    /// Complete a retransmission for a consumer.
    pub fn complete_retransmit(
        &self,
        domain: RelayDomain,
        consumer: &ConsumerId,
        up_to_sequence: u64,
    ) -> RelayResult<()> {
        self.relay(domain)?
            .write()
            .recovery
            .complete_retransmit(consumer, up_to_sequence)
    }

    /// Apply a snapshot for a consumer.
    pub fn apply_snapshot(
        &self,
        domain: RelayDomain,
        consumer: &ConsumerId,
        snapshot_sequence: u64,
    ) -> RelayResult<()> {
        self.relay(domain)?
            .write()
            .recovery
            .apply_snapshot(consumer, snapshot_sequence)
    }

    /// Sweep one domain for timed-out recovery requests.
    pub fn poll_timeouts(&self, domain: RelayDomain) -> RelayResult<Vec<RecoveryEvent>> {
        let relay = self.relay(domain)?;
        let mut relay = relay.write();
        let events = relay.recovery.poll_timeouts(Instant::now());
        // A failed consumer loses its subscription too: it must reconnect.
        for event in &events {
            if let RecoveryEvent::Failed(consumer) = event {
                relay.subscribers.remove(consumer);
            }
        }
        Ok(events)
    }

    /// Sweep one domain for consumers silent past its inactive timeout.
    /// Returns the consumers that were dropped.
    pub fn cleanup_inactive(&self, domain: RelayDomain) -> RelayResult<Vec<ConsumerId>> {
        let relay = self.relay(domain)?;
        let mut relay = relay.write();
        let removed = relay.recovery.cleanup_inactive(Instant::now());
        for consumer in &removed {
            relay.subscribers.remove(consumer);
        }
        Ok(removed)
    }

    /// Plan recovery for a reconnecting consumer.
    pub fn request_recovery(
        &self,
        domain: RelayDomain,
        consumer: ConsumerId,
        last_sequence: u64,
    ) -> RelayResult<RecoveryPlan> {
        let relay = self.relay(domain)?;
        let mut relay = relay.write();
        let global = self.global_sequence();
        relay.subscribers.insert(consumer.clone());
        Ok(relay
            .recovery
            .request_recovery(consumer, last_sequence, global, Instant::now()))
    }

    /// Sync state of one consumer in one domain.
    pub fn consumer_state(
        &self,
        domain: RelayDomain,
        consumer: &ConsumerId,
    ) -> RelayResult<Option<crate::recovery::SyncState>> {
        Ok(self.relay(domain)?.read().recovery.state(consumer))
    }

    /// Registry statistics for one domain.
    pub fn stats(&self, domain: RelayDomain) -> RelayResult<crate::recovery::RegistryStats> {
        Ok(self.relay(domain)?.read().recovery.stats())
    }

    fn relay(&self, domain: RelayDomain) -> RelayResult<&RwLock<DomainRelay>> {
        self.relays
            .get(&domain)
            .ok_or(RelayError::UnknownDomainRelay(domain))
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

fn default_policy(domain: RelayDomain) -> Box<dyn DomainPolicy> {
    match domain {
        RelayDomain::MarketData => Box::new(MarketDataPolicy),
        RelayDomain::Signal => Box::new(SignalPolicy),
        RelayDomain::Execution => Box::new(ExecutionPolicy),
        RelayDomain::System => Box::new(SystemPolicy),
    }
}
