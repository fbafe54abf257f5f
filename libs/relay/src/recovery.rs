//! Per-consumer sequence tracking and gap recovery.
//!
//! One [`RecoveryCoordinator`] per relay tracks every registered
//! consumer's position in the sequence stream. A received sequence ahead
//! of `last_delivered + 1` flags a gap; small gaps ask for retransmission
//! of the missing range, large gaps ask for a snapshot and fast-forward to
//! the relay's current global sequence once it is applied. Consumers are
//! fully independent: one reader stuck in `Resyncing` never affects
//! delivery to the others.
//!
//! Waits are bounded: a retransmit request that times out escalates
//! directly to a snapshot (capping worst-case recovery at one round trip
//! plus snapshot transfer), and a consumer that exhausts its escalation
//! budget is declared failed so the caller forces a clean reconnect.

use crate::config::RecoveryConfig;
use crate::{ConsumerId, RelayError, RelayResult};
use std::collections::HashMap;
use std::time::Instant;
use tapecast_types::RelayDomain;
use tracing::{debug, info, warn};

/// Where a consumer stands relative to the live stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Receiving sequences in order.
    InSync,
    /// A gap was just observed; a recovery decision is pending.
    GapDetected,
    /// A retransmit or snapshot request is in flight.
    Resyncing,
}

/// A recovery request the relay should issue on a consumer's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryRequest {
    /// Replay an inclusive range of missed sequences.
    Retransmit {
        consumer: ConsumerId,
        from_sequence: u64,
        to_sequence: u64,
    },
    /// Ship a full-state snapshot; the consumer fast-forwards on apply.
    Snapshot {
        consumer: ConsumerId,
        /// Last sequence the consumer saw before the gap.
        resume_from: u64,
    },
}

impl RecoveryRequest {
    pub fn consumer(&self) -> &ConsumerId {
        match self {
            RecoveryRequest::Retransmit { consumer, .. } => consumer,
            RecoveryRequest::Snapshot { consumer, .. } => consumer,
        }
    }
}

/// Outcome of a timeout sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryEvent {
    /// A request timed out and was escalated; issue the new request.
    Escalated(RecoveryRequest),
    /// The consumer exhausted its escalation budget; its state has been
    /// removed and it must reconnect from scratch.
    Failed(ConsumerId),
}

/// Recovery plan for a reconnecting consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryPlan {
    /// The consumer is already current.
    InSync { current_sequence: u64 },
    /// Replay this inclusive range.
    Retransmit { from_sequence: u64, to_sequence: u64 },
    /// Too far behind: take a snapshot at the current global sequence.
    Snapshot { current_sequence: u64 },
}

#[derive(Debug, Clone)]
struct PendingRecovery {
    request: RecoveryRequest,
    requested_at: Instant,
    escalations: u32,
}

/// State for one registered consumer. Created on registration, destroyed
/// on disconnect, mutated only by the coordinator.
#[derive(Debug, Clone)]
struct ConsumerSync {
    last_delivered: u64,
    last_known_global: u64,
    state: SyncState,
    pending: Option<PendingRecovery>,
    gap_count: u64,
    messages_delivered: u64,
    recovery_requests: u64,
    last_seen: Instant,
}

/// Monitoring view of one consumer.
#[derive(Debug, Clone)]
pub struct ConsumerStatus {
    pub consumer: ConsumerId,
    pub last_delivered: u64,
    pub last_known_global: u64,
    pub state: SyncState,
    pub gap_count: u64,
    pub messages_delivered: u64,
    pub recovery_requests: u64,
}

/// Registry-wide statistics.
#[derive(Debug, Clone)]
pub struct RegistryStats {
    pub domain: RelayDomain,
    pub total_consumers: usize,
    pub consumers_resyncing: usize,
    pub total_gaps: u64,
    pub total_recovery_requests: u64,
}

/// Per-consumer sequence tracking and recovery management for one relay.
#[derive(Debug)]
pub struct RecoveryCoordinator {
    domain: RelayDomain,
    config: RecoveryConfig,
    consumers: HashMap<ConsumerId, ConsumerSync>,
}

impl RecoveryCoordinator {
    pub fn new(domain: RelayDomain, config: RecoveryConfig) -> Self {
        Self {
            domain,
            config,
            consumers: HashMap::new(),
        }
    }

    /// Register a consumer, bootstrapping it at the relay's current global
    /// sequence. Returns that sequence.
    pub fn register(&mut self, consumer: ConsumerId, global_sequence: u64, now: Instant) -> u64 {
        if self.consumers.contains_key(&consumer) {
            warn!(domain = ?self.domain, %consumer, "consumer already registered, resetting state");
        }
        self.consumers.insert(
            consumer.clone(),
            ConsumerSync {
                last_delivered: global_sequence,
                last_known_global: global_sequence,
                state: SyncState::InSync,
                pending: None,
                gap_count: 0,
                messages_delivered: 0,
                recovery_requests: 0,
                last_seen: now,
            },
        );
        info!(domain = ?self.domain, %consumer, global_sequence, "registered consumer");
        global_sequence
    }

    /// Remove a consumer immediately. Any pending recovery is discarded;
    /// snapshot application is all-or-nothing, so nothing partial remains.
    pub fn remove(&mut self, consumer: &ConsumerId) {
        if self.consumers.remove(consumer).is_some() {
            info!(domain = ?self.domain, %consumer, "removed consumer");
        }
    }

    pub fn contains(&self, consumer: &ConsumerId) -> bool {
        self.consumers.contains_key(consumer)
    }

    /// Record delivery of `sequence` to a consumer and detect gaps.
    ///
    /// Returns the recovery request to issue when a gap opens. Duplicate
    /// and stale sequences are ignored idempotently. Unregistered
    /// consumers are auto-registered at the current global sequence.
    pub fn observe(
        &mut self,
        consumer: &ConsumerId,
        sequence: u64,
        global_sequence: u64,
        now: Instant,
    ) -> Option<RecoveryRequest> {
        if !self.consumers.contains_key(consumer) {
            warn!(domain = ?self.domain, %consumer, sequence, "unregistered consumer, auto-registering");
            self.register(consumer.clone(), global_sequence.saturating_sub(1), now);
        }
        let sync = self.consumers.get_mut(consumer)?;
        sync.last_seen = now;
        sync.last_known_global = sync.last_known_global.max(global_sequence).max(sequence);

        match sync.state {
            SyncState::InSync => {
                if sequence <= sync.last_delivered {
                    debug!(domain = ?self.domain, %consumer, sequence, "duplicate or stale sequence ignored");
                    return None;
                }
                if sequence == sync.last_delivered + 1 {
                    sync.last_delivered = sequence;
                    sync.messages_delivered += 1;
                    return None;
                }

                // Gap: messages [last_delivered + 1, sequence - 1] missing.
                let gap = sequence - sync.last_delivered - 1;
                sync.state = SyncState::GapDetected;
                sync.gap_count += 1;
                warn!(
                    domain = ?self.domain, %consumer,
                    expected = sync.last_delivered + 1, got = sequence, gap,
                    "sequence gap detected"
                );

                let request = if gap < self.config.retransmit_threshold {
                    RecoveryRequest::Retransmit {
                        consumer: consumer.clone(),
                        from_sequence: sync.last_delivered + 1,
                        to_sequence: sequence - 1,
                    }
                } else {
                    RecoveryRequest::Snapshot {
                        consumer: consumer.clone(),
                        resume_from: sync.last_delivered,
                    }
                };

                sync.state = SyncState::Resyncing;
                sync.recovery_requests += 1;
                sync.pending = Some(PendingRecovery {
                    request: request.clone(),
                    requested_at: now,
                    escalations: 0,
                });
                info!(domain = ?self.domain, %consumer, ?request, "resyncing");
                Some(request)
            }
            // Already recovering: live traffic keeps updating the global
            // watermark but never advances last_delivered or re-requests.
            SyncState::GapDetected | SyncState::Resyncing => None,
        }
    }

    /// Complete a retransmission: the relay replayed everything up to
    /// `up_to_sequence`. Idempotent.
    pub fn complete_retransmit(
        &mut self,
        consumer: &ConsumerId,
        up_to_sequence: u64,
    ) -> RelayResult<()> {
        let sync = self
            .consumers
            .get_mut(consumer)
            .ok_or_else(|| RelayError::UnknownConsumer(consumer.clone()))?;
        sync.last_delivered = sync.last_delivered.max(up_to_sequence);
        sync.state = SyncState::InSync;
        sync.pending = None;
        info!(domain = ?self.domain, %consumer, up_to_sequence, "retransmit complete");
        Ok(())
    }

    /// Apply a snapshot taken at `snapshot_sequence`. All-or-nothing and
    /// idempotent: applying the same snapshot twice leaves the consumer
    /// exactly where one application left it.
    pub fn apply_snapshot(
        &mut self,
        consumer: &ConsumerId,
        snapshot_sequence: u64,
    ) -> RelayResult<()> {
        let sync = self
            .consumers
            .get_mut(consumer)
            .ok_or_else(|| RelayError::UnknownConsumer(consumer.clone()))?;
        sync.last_delivered = sync.last_delivered.max(snapshot_sequence);
        sync.last_known_global = sync.last_known_global.max(snapshot_sequence);
        sync.state = SyncState::InSync;
        sync.pending = None;
        info!(domain = ?self.domain, %consumer, snapshot_sequence, "snapshot applied");
        Ok(())
    }

    /// Sweep for timed-out recovery requests.
    ///
    /// A timed-out retransmit escalates straight to a snapshot; a
    /// timed-out snapshot is retried until the escalation budget is spent,
    /// after which the consumer is removed and reported failed.
    pub fn poll_timeouts(&mut self, now: Instant) -> Vec<RecoveryEvent> {
        let timeout = self.config.request_timeout();
        let max_escalations = self.config.max_escalations;
        let mut events = Vec::new();
        let mut failed = Vec::new();

        for (consumer, sync) in self.consumers.iter_mut() {
            let Some(pending) = sync.pending.as_mut() else {
                continue;
            };
            if now.duration_since(pending.requested_at) < timeout {
                continue;
            }

            if pending.escalations >= max_escalations {
                warn!(domain = ?self.domain, %consumer, "recovery escalation budget exhausted");
                failed.push(consumer.clone());
                continue;
            }

            let snapshot = RecoveryRequest::Snapshot {
                consumer: consumer.clone(),
                resume_from: sync.last_delivered,
            };
            warn!(
                domain = ?self.domain, %consumer,
                timed_out = ?pending.request, escalations = pending.escalations + 1,
                "recovery request timed out, escalating to snapshot"
            );
            pending.request = snapshot.clone();
            pending.requested_at = now;
            pending.escalations += 1;
            sync.recovery_requests += 1;
            events.push(RecoveryEvent::Escalated(snapshot));
        }

        for consumer in failed {
            self.consumers.remove(&consumer);
            events.push(RecoveryEvent::Failed(consumer));
        }
        events
    }

    /// Plan recovery for a reconnecting consumer that reports its last
    /// processed sequence. Registers (or re-registers) the consumer and
    /// returns what to ship it.
    pub fn request_recovery(
        &mut self,
        consumer: ConsumerId,
        last_sequence: u64,
        global_sequence: u64,
        now: Instant,
    ) -> RecoveryPlan {
        let gap = global_sequence.saturating_sub(last_sequence);
        let plan = if gap == 0 {
            RecoveryPlan::InSync {
                current_sequence: global_sequence,
            }
        } else if gap < self.config.retransmit_threshold {
            RecoveryPlan::Retransmit {
                from_sequence: last_sequence + 1,
                to_sequence: global_sequence,
            }
        } else {
            RecoveryPlan::Snapshot {
                current_sequence: global_sequence,
            }
        };

        let (state, pending, requests) = match &plan {
            RecoveryPlan::InSync { .. } => (SyncState::InSync, None, 0),
            RecoveryPlan::Retransmit {
                from_sequence,
                to_sequence,
            } => (
                SyncState::Resyncing,
                Some(PendingRecovery {
                    request: RecoveryRequest::Retransmit {
                        consumer: consumer.clone(),
                        from_sequence: *from_sequence,
                        to_sequence: *to_sequence,
                    },
                    requested_at: now,
                    escalations: 0,
                }),
                1,
            ),
            RecoveryPlan::Snapshot { .. } => (
                SyncState::Resyncing,
                Some(PendingRecovery {
                    request: RecoveryRequest::Snapshot {
                        consumer: consumer.clone(),
                        resume_from: last_sequence,
                    },
                    requested_at: now,
                    escalations: 0,
                }),
                1,
            ),
        };

        self.consumers.insert(
            consumer.clone(),
            ConsumerSync {
                last_delivered: last_sequence,
                last_known_global: global_sequence,
                state,
                pending,
                gap_count: 0,
                messages_delivered: 0,
                recovery_requests: requests,
                last_seen: now,
            },
        );
        info!(domain = ?self.domain, %consumer, last_sequence, global_sequence, ?plan, "reconnect recovery planned");
        plan
    }

    /// Current sync state of a consumer.
    pub fn state(&self, consumer: &ConsumerId) -> Option<SyncState> {
        self.consumers.get(consumer).map(|s| s.state)
    }

    /// Monitoring view of a consumer.
    pub fn status(&self, consumer: &ConsumerId) -> Option<ConsumerStatus> {
        self.consumers.get(consumer).map(|sync| ConsumerStatus {
            consumer: consumer.clone(),
            last_delivered: sync.last_delivered,
            last_known_global: sync.last_known_global,
            state: sync.state,
            gap_count: sync.gap_count,
            messages_delivered: sync.messages_delivered,
            recovery_requests: sync.recovery_requests,
        })
    }

    /// Sweep consumers that have been silent past the configured timeout.
    /// Returns the removed consumers so the caller can drop their
    /// subscriptions as well.
    pub fn cleanup_inactive(&mut self, now: Instant) -> Vec<ConsumerId> {
        let timeout = self.config.inactive_timeout();
        let domain = self.domain;
        let mut removed = Vec::new();
        self.consumers.retain(|consumer, sync| {
            let keep = now.duration_since(sync.last_seen) <= timeout;
            if !keep {
                info!(?domain, %consumer, "removing inactive consumer");
                removed.push(consumer.clone());
            }
            keep
        });
        removed
    }

    /// Registry-wide statistics.
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            domain: self.domain,
            total_consumers: self.consumers.len(),
            consumers_resyncing: self
                .consumers
                .values()
                .filter(|s| s.state != SyncState::InSync)
                .count(),
            total_gaps: self.consumers.values().map(|s| s.gap_count).sum(),
            total_recovery_requests: self
                .consumers
                .values()
                .map(|s| s.recovery_requests)
                .sum(),
        }
    }
}
