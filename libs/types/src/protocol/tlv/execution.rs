//! Execution domain TLV payloads (types 40-79).

use super::types::TlvType;
use super::{TlvPayload, WireSizeError};
use crate::identifiers::InstrumentId;
use byteorder::{ByteOrder, LittleEndian};

/// Order submission request (type 40, 40 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderRequestTlv {
    pub instrument: InstrumentId,
    /// Client-assigned order identifier, unique per source.
    pub order_id: u64,
    /// Limit price; ignored for market orders.
    pub price: i64,
    pub quantity: i64,
    /// 0 = buy, 1 = sell.
    pub side: u8,
    /// 0 = limit, 1 = market.
    pub order_type: u8,
    /// 0 = good-till-cancel, 1 = immediate-or-cancel, 2 = fill-or-kill.
    pub time_in_force: u8,
    pub reserved: u8,
}

impl OrderRequestTlv {
    pub const WIRE_SIZE: usize = 40;
}

impl TlvPayload for OrderRequestTlv {
    const TLV_TYPE: TlvType = TlvType::OrderRequest;

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; Self::WIRE_SIZE];
        self.instrument.write_to(&mut buf[0..12]);
        LittleEndian::write_u64(&mut buf[12..20], self.order_id);
        LittleEndian::write_i64(&mut buf[20..28], self.price);
        LittleEndian::write_i64(&mut buf[28..36], self.quantity);
        buf[36] = self.side;
        buf[37] = self.order_type;
        buf[38] = self.time_in_force;
        buf[39] = self.reserved;
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
            order_id: LittleEndian::read_u64(&data[12..20]),
            price: LittleEndian::read_i64(&data[20..28]),
            quantity: LittleEndian::read_i64(&data[28..36]),
            side: data[36],
            order_type: data[37],
            time_in_force: data[38],
            reserved: data[39],
        })
    }
}

/// Execution fill report (type 42, 56 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillTlv {
    pub instrument: InstrumentId,
    pub order_id: u64,
    /// Venue-assigned fill identifier.
    pub fill_id: u64,
    pub price: i64,
    pub quantity: i64,
    pub timestamp_ns: u64,
    /// 0 = buy, 1 = sell.
    pub side: u8,
    /// 0 = maker, 1 = taker.
    pub liquidity: u8,
    pub reserved: [u8; 2],
}

impl FillTlv {
    pub const WIRE_SIZE: usize = 56;
}

impl TlvPayload for FillTlv {
    const TLV_TYPE: TlvType = TlvType::Fill;

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; Self::WIRE_SIZE];
        self.instrument.write_to(&mut buf[0..12]);
        LittleEndian::write_u64(&mut buf[12..20], self.order_id);
        LittleEndian::write_u64(&mut buf[20..28], self.fill_id);
        LittleEndian::write_i64(&mut buf[28..36], self.price);
        LittleEndian::write_i64(&mut buf[36..44], self.quantity);
        LittleEndian::write_u64(&mut buf[44..52], self.timestamp_ns);
        buf[52] = self.side;
        buf[53] = self.liquidity;
        buf[54..56].copy_from_slice(&self.reserved);
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
            order_id: LittleEndian::read_u64(&data[12..20]),
            fill_id: LittleEndian::read_u64(&data[20..28]),
            price: LittleEndian::read_i64(&data[28..36]),
            quantity: LittleEndian::read_i64(&data[36..44]),
            timestamp_ns: LittleEndian::read_u64(&data[44..52]),
            side: data[52],
            liquidity: data[53],
            reserved: [data[54], data[55]],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::VenueId;

    #[test]
    fn order_request_round_trips() {
        let order = OrderRequestTlv {
            instrument: InstrumentId::from_symbol(VenueId::NASDAQ, "AAPL").unwrap(),
            order_id: 1001,
            price: 1_895_000,
            quantity: 100,
            side: 0,
            order_type: 0,
            time_in_force: 1,
            reserved: 0,
        };
        assert_eq!(
            OrderRequestTlv::from_bytes(&order.to_bytes()).unwrap(),
            order
        );
        assert_eq!(
            Some(OrderRequestTlv::WIRE_SIZE),
            TlvType::OrderRequest.expected_payload_size()
        );
    }

    #[test]
    fn fill_size_matches_registry() {
        assert_eq!(
            Some(FillTlv::WIRE_SIZE),
            TlvType::Fill.expected_payload_size()
        );
    }
}
