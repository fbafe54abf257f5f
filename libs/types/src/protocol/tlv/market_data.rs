//! Market data TLV payloads (types 1-19).
//!
//! Hot-path structs: every layout is fixed so a consumer can validate with
//! a single length comparison, and every field sits at an explicit byte
//! offset. Prices and volumes are fixed-point integers scaled by the
//! venue's native precision; the protocol core does not interpret them.

use super::types::TlvType;
use super::{TlvPayload, WireSizeError};
use crate::identifiers::InstrumentId;
use byteorder::{ByteOrder, LittleEndian};

/// Trade execution event (type 1, 49 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeTlv {
    pub instrument: InstrumentId,
    /// Fixed-point price in the venue's native scale.
    pub price: i64,
    /// Fixed-point volume in the venue's native scale.
    pub volume: i64,
    /// 0 = buy, 1 = sell (aggressor side).
    pub side: u8,
    /// Venue-reported execution time, nanoseconds since epoch.
    pub timestamp_ns: u64,
    /// Venue-assigned trade identifier.
    pub trade_id: u64,
    /// Venue-local sequence number of this event.
    pub venue_seq: u32,
}

impl TradeTlv {
    pub const WIRE_SIZE: usize = 49;
}

impl TlvPayload for TradeTlv {
    const TLV_TYPE: TlvType = TlvType::Trade;

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; Self::WIRE_SIZE];
        self.instrument.write_to(&mut buf[0..12]);
        LittleEndian::write_i64(&mut buf[12..20], self.price);
        LittleEndian::write_i64(&mut buf[20..28], self.volume);
        buf[28] = self.side;
        LittleEndian::write_u64(&mut buf[29..37], self.timestamp_ns);
        LittleEndian::write_u64(&mut buf[37..45], self.trade_id);
        LittleEndian::write_u32(&mut buf[45..49], self.venue_seq);
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
            instrument: InstrumentId::read_from(&data[0..12]),
            price: LittleEndian::read_i64(&data[12..20]),
            volume: LittleEndian::read_i64(&data[20..28]),
            side: data[28],
            timestamp_ns: LittleEndian::read_u64(&data[29..37]),
            trade_id: LittleEndian::read_u64(&data[37..45]),
            venue_seq: LittleEndian::read_u32(&data[45..49]),
        })
    }
}

/// Best bid/offer update (type 2, 52 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteTlv {
    pub instrument: InstrumentId,
    pub bid_price: i64,
    pub bid_size: i64,
    pub ask_price: i64,
    pub ask_size: i64,
    pub timestamp_ns: u64,
}

impl QuoteTlv {
    pub const WIRE_SIZE: usize = 52;
}

impl TlvPayload for QuoteTlv {
    const TLV_TYPE: TlvType = TlvType::Quote;

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; Self::WIRE_SIZE];
        self.instrument.write_to(&mut buf[0..12]);
        LittleEndian::write_i64(&mut buf[12..20], self.bid_price);
        LittleEndian::write_i64(&mut buf[20..28], self.bid_size);
        LittleEndian::write_i64(&mut buf[28..36], self.ask_price);
        LittleEndian::write_i64(&mut buf[36..44], self.ask_size);
        LittleEndian::write_u64(&mut buf[44..52], self.timestamp_ns);
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
            instrument: InstrumentId::read_from(&data[0..12]),
            bid_price: LittleEndian::read_i64(&data[12..20]),
            bid_size: LittleEndian::read_i64(&data[20..28]),
            ask_price: LittleEndian::read_i64(&data[28..36]),
            ask_size: LittleEndian::read_i64(&data[36..44]),
            timestamp_ns: LittleEndian::read_u64(&data[44..52]),
        })
    }
}

/// DEX swap event with post-swap pool state (type 11, 102 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSwapTlv {
    pub pool: InstrumentId,
    pub token_in: InstrumentId,
    pub token_out: InstrumentId,
    pub amount_in: u128,
    pub amount_out: u128,
    pub reserve0_after: u128,
    pub reserve1_after: u128,
    /// DEX protocol discriminant (venue-defined).
    pub dex_protocol: u8,
    /// 0 = token0 → token1, 1 = token1 → token0.
    pub direction: u8,
}

impl PoolSwapTlv {
    pub const WIRE_SIZE: usize = 102;
}

impl TlvPayload for PoolSwapTlv {
    const TLV_TYPE: TlvType = TlvType::PoolSwap;

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; Self::WIRE_SIZE];
        self.pool.write_to(&mut buf[0..12]);
        self.token_in.write_to(&mut buf[12..24]);
        self.token_out.write_to(&mut buf[24..36]);
        LittleEndian::write_u128(&mut buf[36..52], self.amount_in);
        LittleEndian::write_u128(&mut buf[52..68], self.amount_out);
        LittleEndian::write_u128(&mut buf[68..84], self.reserve0_after);
        LittleEndian::write_u128(&mut buf[84..100], self.reserve1_after);
        buf[100] = self.dex_protocol;
        buf[101] = self.direction;
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
            pool: InstrumentId::read_from(&data[0..12]),
            token_in: InstrumentId::read_from(&data[12..24]),
            token_out: InstrumentId::read_from(&data[24..36]),
            amount_in: LittleEndian::read_u128(&data[36..52]),
            amount_out: LittleEndian::read_u128(&data[52..68]),
            reserve0_after: LittleEndian::read_u128(&data[68..84]),
            reserve1_after: LittleEndian::read_u128(&data[84..100]),
            dex_protocol: data[100],
            direction: data[101],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::VenueId;

    fn instrument() -> InstrumentId {
        InstrumentId::from_symbol(VenueId::Kraken, "BTCUSD").unwrap()
    }

    #[test]
    fn trade_layout_is_byte_exact() {
        let trade = TradeTlv {
            instrument: instrument(),
            price: 45_000_00000000,
            volume: 1_50000000,
            side: 1,
            timestamp_ns: 1_700_000_000_000_000_000,
            trade_id: 987_654,
            venue_seq: 42,
        };
        let bytes = trade.to_bytes();
        assert_eq!(bytes.len(), TradeTlv::WIRE_SIZE);
        assert_eq!(&bytes[12..20], &45_000_00000000i64.to_le_bytes());
        assert_eq!(bytes[28], 1);
        assert_eq!(&bytes[45..49], &42u32.to_le_bytes());

        assert_eq!(TradeTlv::from_bytes(&bytes).unwrap(), trade);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = TradeTlv::from_bytes(&[0u8; 48]).unwrap_err();
        assert_eq!(err.expected, 49);
        assert_eq!(err.got, 48);

        assert!(QuoteTlv::from_bytes(&[0u8; 53]).is_err());
        assert!(PoolSwapTlv::from_bytes(&[0u8; 101]).is_err());
    }

    #[test]
    fn pool_swap_size_matches_registry() {
        assert_eq!(
            Some(PoolSwapTlv::WIRE_SIZE),
            TlvType::PoolSwap.expected_payload_size()
        );
        assert_eq!(
            Some(TradeTlv::WIRE_SIZE),
            TlvType::Trade.expected_payload_size()
        );
        assert_eq!(
            Some(QuoteTlv::WIRE_SIZE),
            TlvType::Quote.expected_payload_size()
        );
    }
}
