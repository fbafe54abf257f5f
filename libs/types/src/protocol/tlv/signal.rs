//! Signal domain TLV payloads (types 20-39).
//!
//! Message profiles in this domain expect SignalIdentity before Economics;
//! the builder preserves insertion order, so producers control profile
//! layout directly.

use super::types::TlvType;
use super::{TlvPayload, WireSizeError};
use byteorder::{ByteOrder, LittleEndian};

/// Identifies the strategy instance that produced a signal (type 20, 24 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalIdentityTlv {
    pub strategy_id: u16,
    pub signal_id: u64,
    /// Monotonic per-strategy nonce; disambiguates re-emissions.
    pub nonce: u64,
    /// Confidence in percent, 0-100.
    pub confidence: u8,
    /// Chain the signal targets, zero for off-chain venues.
    pub chain_id: u32,
    pub reserved: u8,
}

impl SignalIdentityTlv {
    pub const WIRE_SIZE: usize = 24;
}

impl TlvPayload for SignalIdentityTlv {
    const TLV_TYPE: TlvType = TlvType::SignalIdentity;

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; Self::WIRE_SIZE];
        LittleEndian::write_u16(&mut buf[0..2], self.strategy_id);
        LittleEndian::write_u64(&mut buf[2..10], self.signal_id);
        LittleEndian::write_u64(&mut buf[10..18], self.nonce);
        buf[18] = self.confidence;
        LittleEndian::write_u32(&mut buf[19..23], self.chain_id);
        buf[23] = self.reserved;
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
            strategy_id: LittleEndian::read_u16(&data[0..2]),
            signal_id: LittleEndian::read_u64(&data[2..10]),
            nonce: LittleEndian::read_u64(&data[10..18]),
            confidence: data[18],
            chain_id: LittleEndian::read_u32(&data[19..23]),
            reserved: data[23],
        })
    }
}

/// Economics of a signal: what it should earn and what it needs (type 22, 32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EconomicsTlv {
    /// Expected profit in quote-asset native units; negative when the
    /// signal revises a prior estimate downward.
    pub expected_profit: i128,
    /// Capital required to act on the signal.
    pub required_capital: u128,
}

impl EconomicsTlv {
    pub const WIRE_SIZE: usize = 32;
}

impl TlvPayload for EconomicsTlv {
    const TLV_TYPE: TlvType = TlvType::Economics;

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; Self::WIRE_SIZE];
        LittleEndian::write_i128(&mut buf[0..16], self.expected_profit);
        LittleEndian::write_u128(&mut buf[16..32], self.required_capital);
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
            expected_profit: LittleEndian::read_i128(&data[0..16]),
            required_capital: LittleEndian::read_u128(&data[16..32]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_identity_round_trips() {
        let identity = SignalIdentityTlv {
            strategy_id: 21,
            signal_id: 0xDEAD_0001,
            nonce: 7,
            confidence: 85,
            chain_id: 137,
            reserved: 0,
        };
        let bytes = identity.to_bytes();
        assert_eq!(bytes.len(), 24);
        assert_eq!(SignalIdentityTlv::from_bytes(&bytes).unwrap(), identity);
    }

    #[test]
    fn economics_carries_negative_revisions() {
        let econ = EconomicsTlv {
            expected_profit: -1_250_000,
            required_capital: 5_000_000_000_000_000_000,
        };
        let decoded = EconomicsTlv::from_bytes(&econ.to_bytes()).unwrap();
        assert_eq!(decoded.expected_profit, -1_250_000);
    }
}
