//! Message header layout (32 bytes)
//!
//! The header is identical for all messages and carries routing and
//! validation information:
//!
//! ```text
//! ┌─────────────────┬─────────────────────────────────────┐
//! │ MessageHeader   │ TLV Payload                         │
//! │ (32 bytes)      │ (variable length)                   │
//! └─────────────────┴─────────────────────────────────────┘
//! ```
//!
//! This module only knows the byte layout. Validation (magic, version,
//! checksum) is the codec's job, which keeps these functions total: any
//! 32 bytes decode to *some* header, and any header encodes to exactly
//! 32 bytes.

use crate::identifiers::IdentityError;
use crate::protocol::constants::{FLAG_UNCHECKSUMMED, MESSAGE_MAGIC, PROTOCOL_VERSION};
use crate::protocol::relay_domain::RelayDomain;
use crate::protocol::source_type::SourceType;
use byteorder::{ByteOrder, LittleEndian};
use std::time::{SystemTime, UNIX_EPOCH};

/// Field offsets within the encoded header. Frozen.
pub const MAGIC_OFFSET: usize = 0;
pub const RELAY_DOMAIN_OFFSET: usize = 4;
pub const VERSION_OFFSET: usize = 5;
pub const SOURCE_OFFSET: usize = 6;
pub const FLAGS_OFFSET: usize = 7;
pub const PAYLOAD_SIZE_OFFSET: usize = 8;
pub const SEQUENCE_OFFSET: usize = 12;
pub const TIMESTAMP_OFFSET: usize = 20;
pub const CHECKSUM_OFFSET: usize = 28;

/// Message header (32 bytes, every multi-byte field little-endian).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Constant [`MESSAGE_MAGIC`]; anything else is rejected by the codec.
    pub magic: u32,
    /// Which relay domain handles this message (1=market, 2=signal, 3=execution, 100+=system).
    pub relay_domain: u8,
    /// Protocol version; mismatches are rejected by the codec.
    pub version: u8,
    /// Producer identity ([`SourceType`] discriminant).
    pub source: u8,
    /// Compression/priority bits; [`FLAG_UNCHECKSUMMED`] is the only bit
    /// the core protocol interprets.
    pub flags: u8,
    /// Byte length of the TLV payload that follows the header.
    pub payload_size: u32,
    /// Monotonic per-source counter, starts at 1.
    pub sequence: u64,
    /// Nanoseconds since epoch, producer-assigned.
    pub timestamp: u64,
    /// CRC32 over the entire message except this field.
    pub checksum: u32,
}

impl MessageHeader {
    /// Header size in bytes. Frozen for backward compatibility.
    pub const SIZE: usize = 32;

    /// Create a header for a new message. Sequence, payload size and
    /// checksum are filled in when the message is built.
    pub fn new(domain: RelayDomain, source: SourceType) -> Self {
        Self {
            magic: MESSAGE_MAGIC,
            relay_domain: domain as u8,
            version: PROTOCOL_VERSION,
            source: source as u8,
            flags: 0,
            payload_size: 0,
            sequence: 0,
            timestamp: 0,
            checksum: 0,
        }
    }

    /// Encode to the fixed wire layout with explicit per-field offsets.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        LittleEndian::write_u32(&mut buf[MAGIC_OFFSET..MAGIC_OFFSET + 4], self.magic);
        buf[RELAY_DOMAIN_OFFSET] = self.relay_domain;
        buf[VERSION_OFFSET] = self.version;
        buf[SOURCE_OFFSET] = self.source;
        buf[FLAGS_OFFSET] = self.flags;
        LittleEndian::write_u32(
            &mut buf[PAYLOAD_SIZE_OFFSET..PAYLOAD_SIZE_OFFSET + 4],
            self.payload_size,
        );
        LittleEndian::write_u64(&mut buf[SEQUENCE_OFFSET..SEQUENCE_OFFSET + 8], self.sequence);
        LittleEndian::write_u64(
            &mut buf[TIMESTAMP_OFFSET..TIMESTAMP_OFFSET + 8],
            self.timestamp,
        );
        LittleEndian::write_u32(&mut buf[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4], self.checksum);
        buf
    }

    /// Decode from the fixed wire layout. Total: performs no validation.
    pub fn from_bytes(buf: &[u8; Self::SIZE]) -> Self {
        Self {
            magic: LittleEndian::read_u32(&buf[MAGIC_OFFSET..MAGIC_OFFSET + 4]),
            relay_domain: buf[RELAY_DOMAIN_OFFSET],
            version: buf[VERSION_OFFSET],
            source: buf[SOURCE_OFFSET],
            flags: buf[FLAGS_OFFSET],
            payload_size: LittleEndian::read_u32(
                &buf[PAYLOAD_SIZE_OFFSET..PAYLOAD_SIZE_OFFSET + 4],
            ),
            sequence: LittleEndian::read_u64(&buf[SEQUENCE_OFFSET..SEQUENCE_OFFSET + 8]),
            timestamp: LittleEndian::read_u64(&buf[TIMESTAMP_OFFSET..TIMESTAMP_OFFSET + 8]),
            checksum: LittleEndian::read_u32(&buf[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4]),
        }
    }

    /// Get the relay domain for this message.
    pub fn domain(&self) -> Result<RelayDomain, IdentityError> {
        RelayDomain::try_from(self.relay_domain)
            .map_err(|_| IdentityError::UnknownDomain(self.relay_domain))
    }

    /// Get the source type for this message.
    pub fn source_type(&self) -> Result<SourceType, IdentityError> {
        SourceType::try_from(self.source).map_err(|_| IdentityError::UnknownSource(self.source))
    }

    /// Whether the producer declared this message unchecksummed.
    pub fn is_unchecksummed(&self) -> bool {
        self.flags & FLAG_UNCHECKSUMMED != 0
    }

    /// Age of this message in nanoseconds relative to the local clock.
    pub fn age_ns(&self) -> u64 {
        current_timestamp_ns().saturating_sub(self.timestamp)
    }

    /// Check if this message is older than the given duration.
    pub fn is_older_than(&self, max_age_ns: u64) -> bool {
        self.age_ns() > max_age_ns
    }
}

/// Current timestamp in nanoseconds since the Unix epoch.
///
/// Producer-side clock collaborator; the protocol core never validates
/// clock monotonicity across sources.
pub fn current_timestamp_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_size_is_frozen() {
        assert_eq!(MessageHeader::SIZE, 32);
        assert_eq!(CHECKSUM_OFFSET + 4, MessageHeader::SIZE);
    }

    #[test]
    fn field_offsets_are_exact() {
        let mut header = MessageHeader::new(RelayDomain::MarketData, SourceType::KrakenCollector);
        header.payload_size = 0x11223344;
        header.sequence = 0x0102030405060708;
        header.timestamp = 42;
        header.checksum = 0xAABBCCDD;
        header.flags = FLAG_UNCHECKSUMMED;

        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..4], &MESSAGE_MAGIC.to_le_bytes());
        assert_eq!(bytes[4], RelayDomain::MarketData as u8);
        assert_eq!(bytes[5], PROTOCOL_VERSION);
        assert_eq!(bytes[6], SourceType::KrakenCollector as u8);
        assert_eq!(bytes[7], FLAG_UNCHECKSUMMED);
        assert_eq!(&bytes[8..12], &0x11223344u32.to_le_bytes());
        assert_eq!(&bytes[12..20], &0x0102030405060708u64.to_le_bytes());
        assert_eq!(&bytes[20..28], &42u64.to_le_bytes());
        assert_eq!(&bytes[28..32], &0xAABBCCDDu32.to_le_bytes());
    }

    #[test]
    fn round_trips_through_wire_layout() {
        let mut header = MessageHeader::new(RelayDomain::Execution, SourceType::ExecutionEngine);
        header.sequence = 77;
        header.timestamp = current_timestamp_ns();
        header.payload_size = 51;
        header.checksum = 0xFEEDFACE;

        let decoded = MessageHeader::from_bytes(&header.to_bytes());
        assert_eq!(decoded, header);
        assert!(decoded.is_older_than(0) || decoded.age_ns() == 0);
    }
}
