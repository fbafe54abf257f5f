//! Message construction.
//!
//! A [`MessageBuilder`] accumulates TLV records in call order (order is
//! preserved in the output, which matters for message profiles that expect
//! e.g. SignalIdentity before Economics), then writes header, records and
//! checksum in one pass. Construction errors surface synchronously to the
//! caller; nothing is ever silently truncated.
//!
//! Sequence numbers come from a [`Sequencer`] the caller owns and passes
//! in. Keeping the counter out of global state means two producer
//! instances in one process can never collide, and tests get
//! deterministic sequences for free.

use crate::checksum::finalize_checksum;
use crate::error::{ProtocolError, ProtocolResult};
use crate::header::encode_header;
use crate::tlv::{encode_tlv, encoded_tlv_size, expect_payload_size};
use tapecast_types::{
    current_timestamp_ns, MessageHeader, RelayDomain, SourceType, TlvPayload, FLAG_UNCHECKSUMMED,
};

/// Owned monotonic sequence counter for one producer.
///
/// Sequences start at 1 and increment per built message, per source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequencer {
    source: SourceType,
    next: u64,
}

impl Sequencer {
    pub fn new(source: SourceType) -> Self {
        Self { source, next: 1 }
    }

    /// Resume a counter from persisted state.
    pub fn resume(source: SourceType, next: u64) -> Self {
        Self { source, next }
    }

    pub fn source(&self) -> SourceType {
        self.source
    }

    /// The sequence number the next built message will carry.
    pub fn peek(&self) -> u64 {
        self.next
    }

    fn advance(&mut self) -> u64 {
        let current = self.next;
        self.next += 1;
        current
    }
}

/// Builder composing a header plus an ordered list of TLV records into a
/// single byte buffer.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    domain: RelayDomain,
    source: SourceType,
    flags: u8,
    timestamp: Option<u64>,
    checksummed: bool,
    records: Vec<(u8, Vec<u8>)>,
}

impl MessageBuilder {
    pub fn new(domain: RelayDomain, source: SourceType) -> Self {
        Self {
            domain,
            source,
            flags: 0,
            timestamp: None,
            checksummed: true,
            records: Vec::new(),
        }
    }

    /// Add a typed payload. Its registry size constraint is enforced at
    /// construction time, so a producer bug cannot reach the wire.
    pub fn add_tlv<T: TlvPayload>(self, payload: &T) -> ProtocolResult<Self> {
        self.add_tlv_bytes(T::TLV_TYPE as u8, payload.to_bytes())
    }

    /// Add a raw record: the path for vendor/private types (200-254) and
    /// for forwarding opaque records unchanged. Registered fixed-size types
    /// are still checked against the registry; unknown types accept any
    /// size up to the extended limit.
    pub fn add_tlv_bytes(
        mut self,
        tlv_type: u8,
        value: impl Into<Vec<u8>>,
    ) -> ProtocolResult<Self> {
        let value = value.into();
        if tlv_type == tapecast_types::protocol::constants::EXTENDED_TLV_MARKER {
            return Err(ProtocolError::ReservedTlvType(tlv_type));
        }
        if value.len() > tapecast_types::MAX_EXTENDED_TLV_PAYLOAD {
            return Err(ProtocolError::ValueTooLarge {
                size: value.len(),
                limit: tapecast_types::MAX_EXTENDED_TLV_PAYLOAD,
            });
        }
        expect_payload_size(tlv_type, &value)?;
        self.records.push((tlv_type, value));
        Ok(self)
    }

    /// Set domain-defined flag bits.
    pub fn with_flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    /// Override the producer timestamp; defaults to the current clock.
    pub fn with_timestamp(mut self, timestamp_ns: u64) -> Self {
        self.timestamp = Some(timestamp_ns);
        self
    }

    /// Build without a checksum and mark the message accordingly.
    ///
    /// Only meaningful for domains whose relays are configured to skip
    /// verification (the market-data hot path); verifying domains will
    /// reject the zero checksum.
    pub fn without_checksum(mut self) -> Self {
        self.checksummed = false;
        self
    }

    /// Total payload size the built message will declare.
    pub fn payload_size(&self) -> usize {
        self.records
            .iter()
            .map(|(_, value)| encoded_tlv_size(value.len()))
            .sum()
    }

    /// Number of records added so far.
    pub fn tlv_count(&self) -> usize {
        self.records.len()
    }

    /// Assemble the final message: header, records in insertion order,
    /// checksum last. The result round-trips through the decoders with
    /// zero loss for any legal sequence of additions.
    pub fn build(self, sequencer: &mut Sequencer) -> ProtocolResult<Vec<u8>> {
        debug_assert_eq!(
            sequencer.source(),
            self.source,
            "sequencer belongs to a different source"
        );

        let payload_size = self.payload_size();
        let mut header = MessageHeader::new(self.domain, self.source);
        header.payload_size = payload_size as u32;
        header.sequence = sequencer.advance();
        header.timestamp = self.timestamp.unwrap_or_else(current_timestamp_ns);
        header.flags = self.flags;
        if !self.checksummed {
            header.flags |= FLAG_UNCHECKSUMMED;
        }

        let mut message = Vec::with_capacity(MessageHeader::SIZE + payload_size);
        message.extend_from_slice(&encode_header(&header));
        for (tlv_type, value) in &self.records {
            message.extend_from_slice(&encode_tlv(*tlv_type, value)?);
        }

        if self.checksummed {
            finalize_checksum(&mut message);
        }
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{decode_message, parse_header};
    use tapecast_types::protocol::tlv::TradeTlv;
    use tapecast_types::{InstrumentId, TlvType, VenueId};

    fn sample_trade() -> TradeTlv {
        TradeTlv {
            instrument: InstrumentId::from_symbol(VenueId::Kraken, "ETHUSD").unwrap(),
            price: 3_200_00000000,
            volume: 25_0000000,
            side: 0,
            timestamp_ns: 1_700_000_000_000_000_000,
            trade_id: 1,
            venue_seq: 9,
        }
    }

    #[test]
    fn single_trade_message_is_83_bytes() {
        let mut seq = Sequencer::new(SourceType::KrakenCollector);
        let message = MessageBuilder::new(RelayDomain::MarketData, SourceType::KrakenCollector)
            .add_tlv(&sample_trade())
            .unwrap()
            .build(&mut seq)
            .unwrap();

        // Header (32) + TLV header (2) + Trade payload (49)
        assert_eq!(message.len(), 83);

        let (header, records) = decode_message(&message).unwrap();
        assert_eq!(header.sequence, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tlv_type, TlvType::Trade as u8);
    }

    #[test]
    fn sequencer_is_monotonic_per_source() {
        let mut seq = Sequencer::new(SourceType::KrakenCollector);
        for expected in 1..=3u64 {
            let message = MessageBuilder::new(RelayDomain::MarketData, SourceType::KrakenCollector)
                .add_tlv(&sample_trade())
                .unwrap()
                .build(&mut seq)
                .unwrap();
            let header = parse_header(&message).unwrap();
            assert_eq!(header.sequence, expected);
        }
        assert_eq!(seq.peek(), 4);
    }

    #[test]
    fn record_order_is_preserved() {
        let mut seq = Sequencer::new(SourceType::ArbitrageStrategy);
        let message = MessageBuilder::new(RelayDomain::Signal, SourceType::ArbitrageStrategy)
            .add_tlv_bytes(20, vec![0u8; 24])
            .unwrap()
            .add_tlv_bytes(22, vec![0u8; 32])
            .unwrap()
            .build(&mut seq)
            .unwrap();

        let (_, records) = decode_message(&message).unwrap();
        assert_eq!(records[0].tlv_type, 20);
        assert_eq!(records[1].tlv_type, 22);
    }

    #[test]
    fn oversized_payload_fails_at_add_time() {
        let builder = MessageBuilder::new(RelayDomain::System, SourceType::SystemRelay);
        let err = builder
            .add_tlv_bytes(101, vec![0u8; 70_000])
            .unwrap_err();
        assert!(matches!(err, ProtocolError::ValueTooLarge { .. }));
    }

    #[test]
    fn wrong_fixed_size_fails_at_add_time() {
        let err = MessageBuilder::new(RelayDomain::MarketData, SourceType::KrakenCollector)
            .add_tlv_bytes(TlvType::Trade as u8, vec![0u8; 48])
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::SizeMismatch {
                tlv_type: 1,
                expected: 49,
                got: 48
            }
        ));
    }

    #[test]
    fn large_records_take_the_extended_path() {
        let mut seq = Sequencer::new(SourceType::SystemRelay);
        let state = vec![0xEE; 1024];
        let message = MessageBuilder::new(RelayDomain::System, SourceType::SystemRelay)
            .add_tlv_bytes(101, [&[0u8; 16][..], &state[..]].concat())
            .unwrap()
            .build(&mut seq)
            .unwrap();

        let (header, records) = decode_message(&message).unwrap();
        assert_eq!(header.payload_size as usize, 5 + 16 + 1024);
        assert!(records[0].extended);
        assert_eq!(records[0].tlv_type, 101);
    }

    #[test]
    fn unchecksummed_build_sets_the_flag() {
        let mut seq = Sequencer::new(SourceType::BinanceCollector);
        let message = MessageBuilder::new(RelayDomain::MarketData, SourceType::BinanceCollector)
            .add_tlv(&sample_trade())
            .unwrap()
            .without_checksum()
            .build(&mut seq)
            .unwrap();

        let header = crate::header::parse_header_unchecked(&message).unwrap();
        assert!(header.is_unchecksummed());
        assert_eq!(header.checksum, 0);
        // The checked path rejects it.
        assert!(parse_header(&message).is_err());
    }
}
