//! System domain TLV payloads (types 100-119).
//!
//! Control traffic for liveness and recovery. These types are admitted on
//! every relay domain: a consumer recovering from a market-data gap sends
//! its RecoveryRequest over the market-data relay, not a separate channel.

use super::types::TlvType;
use super::{TlvPayload, WireSizeError};
use byteorder::{ByteOrder, LittleEndian};

/// Liveness beacon (type 100, 12 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatTlv {
    pub timestamp_ns: u64,
    /// Producer's publish interval; consumers flag the source stale after
    /// missing a few of these.
    pub interval_ms: u32,
}

impl HeartbeatTlv {
    pub const WIRE_SIZE: usize = 12;
}

impl TlvPayload for HeartbeatTlv {
    const TLV_TYPE: TlvType = TlvType::Heartbeat;

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; Self::WIRE_SIZE];
        LittleEndian::write_u64(&mut buf[0..8], self.timestamp_ns);
        LittleEndian::write_u32(&mut buf[8..12], self.interval_ms);
        buf
    }

    fn from_bytes(data: &[u8]) -> Result<Self, WireSizeError> {
        if data.len() != Self::WIRE_SIZE {
            return Err(WireSizeError {
                expected: Self::WIRE_SIZE,
                got: data.len(),
            });
        }
        Ok(Self {
            timestamp_ns: LittleEndian::read_u64(&data[0..8]),
            interval_ms: LittleEndian::read_u32(&data[8..12]),
        })
    }
}

/// Full-state checkpoint used to fast-forward a recovering consumer
/// (type 101, 16-byte prefix + state bytes).
///
/// Large snapshots ride the extended TLV format and may be chunked; the
/// chunk fields let a consumer reassemble before applying. Application is
/// all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotTlv {
    /// Global sequence this snapshot represents; consumers fast-forward to
    /// this point once applied.
    pub snapshot_sequence: u64,
    pub total_chunks: u32,
    pub chunk: u32,
    /// Opaque compressed state; the protocol core never interprets it.
    pub state: Vec<u8>,
}

impl SnapshotTlv {
    pub const PREFIX_SIZE: usize = 16;
}

impl TlvPayload for SnapshotTlv {
    const TLV_TYPE: TlvType = TlvType::Snapshot;

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; Self::PREFIX_SIZE + self.state.len()];
        LittleEndian::write_u64(&mut buf[0..8], self.snapshot_sequence);
        LittleEndian::write_u32(&mut buf[8..12], self.total_chunks);
        LittleEndian::write_u32(&mut buf[12..16], self.chunk);
        buf[Self::PREFIX_SIZE..].copy_from_slice(&self.state);
        buf
    }

    fn from_bytes(data: &[u8]) -> Result<Self, WireSizeError> {
        if data.len() < Self::PREFIX_SIZE {
            return Err(WireSizeError {
                expected: Self::PREFIX_SIZE,
                got: data.len(),
            });
        }
        Ok(Self {
            snapshot_sequence: LittleEndian::read_u64(&data[0..8]),
            total_chunks: LittleEndian::read_u32(&data[8..12]),
            chunk: LittleEndian::read_u32(&data[12..16]),
            state: data[Self::PREFIX_SIZE..].to_vec(),
        })
    }
}

/// What a recovering consumer is asking the relay for.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryKind {
    Retransmit = 0,
    Snapshot = 1,
}

/// Consumer request for retransmission or a snapshot (type 110, 24 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryRequestTlv {
    /// First missing sequence (inclusive).
    pub from_sequence: u64,
    /// Last missing sequence (inclusive); ignored for snapshot requests.
    pub to_sequence: u64,
    pub kind: RecoveryKind,
    /// Opaque consumer tag echoed back in the response.
    pub consumer_tag: u32,
    pub reserved: [u8; 3],
}

impl RecoveryRequestTlv {
    pub const WIRE_SIZE: usize = 24;
}

impl TlvPayload for RecoveryRequestTlv {
    const TLV_TYPE: TlvType = TlvType::RecoveryRequest;

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; Self::WIRE_SIZE];
        LittleEndian::write_u64(&mut buf[0..8], self.from_sequence);
        LittleEndian::write_u64(&mut buf[8..16], self.to_sequence);
        buf[16] = self.kind as u8;
        LittleEndian::write_u32(&mut buf[17..21], self.consumer_tag);
        buf[21..24].copy_from_slice(&self.reserved);
        buf
    }

    fn from_bytes(data: &[u8]) -> Result<Self, WireSizeError> {
        if data.len() != Self::WIRE_SIZE {
            return Err(WireSizeError {
                expected: Self::WIRE_SIZE,
                got: data.len(),
            });
        }
        let kind = if data[16] == RecoveryKind::Snapshot as u8 {
            RecoveryKind::Snapshot
        } else {
            RecoveryKind::Retransmit
        };
        Ok(Self {
            from_sequence: LittleEndian::read_u64(&data[0..8]),
            to_sequence: LittleEndian::read_u64(&data[8..16]),
            kind,
            consumer_tag: LittleEndian::read_u32(&data[17..21]),
            reserved: [data[21], data[22], data[23]],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_prefix_is_enforced() {
        let err = SnapshotTlv::from_bytes(&[0u8; 10]).unwrap_err();
        assert_eq!(err.expected, SnapshotTlv::PREFIX_SIZE);

        let snap = SnapshotTlv {
            snapshot_sequence: 5000,
            total_chunks: 1,
            chunk: 0,
            state: vec![0xAB; 128],
        };
        let decoded = SnapshotTlv::from_bytes(&snap.to_bytes()).unwrap();
        assert_eq!(decoded, snap);
    }

    #[test]
    fn recovery_request_round_trips() {
        let req = RecoveryRequestTlv {
            from_sequence: 101,
            to_sequence: 249,
            kind: RecoveryKind::Snapshot,
            consumer_tag: 0xC0FFEE,
            reserved: [0; 3],
        };
        let decoded = RecoveryRequestTlv::from_bytes(&req.to_bytes()).unwrap();
        assert_eq!(decoded, req);
        assert_eq!(decoded.kind, RecoveryKind::Snapshot);
    }
}
