//! Bijective instrument identifier.
//!
//! An [`InstrumentId`] is constructed once at data-ingestion time from a
//! venue-native identifier (contract address, ticker symbol, or a token
//! pair for pools) and is immutable afterwards. Construction is purely
//! functional, so identifiers can be built on any number of threads with
//! no synchronization.

use super::pairing::{cantor_pair, POOL_OPERAND_MASK};
use byteorder::{ByteOrder, LittleEndian};
use num_enum::TryFromPrimitive;
use thiserror::Error;

/// Venue identifier for trading venues, chains and protocols.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum VenueId {
    // Centralized exchanges (1-99)
    Binance = 1,
    Coinbase = 2,
    Kraken = 3,
    Gemini = 4,

    // Blockchain networks (100-199)
    Ethereum = 100,
    Polygon = 101,
    Arbitrum = 102,
    Base = 103,

    // DEXs on Ethereum (200-299)
    UniswapV2 = 200,
    UniswapV3 = 201,
    SushiSwap = 202,
    CurveFinance = 203,

    // DEXs on Polygon (300-399)
    QuickSwap = 300,
    QuickSwapV3 = 301,

    // Stock exchanges (1000+)
    NYSE = 1000,
    NASDAQ = 1001,
    LSE = 1002,
}

impl VenueId {
    /// Blockchain chain id, for venues that are chains.
    pub fn chain_id(&self) -> Option<u32> {
        match self {
            VenueId::Ethereum => Some(1),
            VenueId::Polygon => Some(137),
            VenueId::Arbitrum => Some(42_161),
            VenueId::Base => Some(8_453),
            _ => None,
        }
    }

    /// Whether this venue hosts liquidity pools.
    pub fn supports_pools(&self) -> bool {
        matches!(*self as u16, 200..=399)
    }
}

/// Asset type classification.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum AssetType {
    Token = 1,
    Stock = 2,
    Pool = 3,
    Derivative = 4,
}

/// Errors from identifier construction and field decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("symbol must be 1-8 ASCII bytes, got {0:?}")]
    InvalidSymbol(String),

    #[error("unknown venue id: {0}")]
    UnknownVenue(u16),

    #[error("unknown asset type: {0}")]
    UnknownAssetType(u8),

    #[error("unknown relay domain: {0}")]
    UnknownDomain(u8),

    #[error("unknown source type: {0}")]
    UnknownSource(u8),
}

/// Bijective instrument identifier.
///
/// Self-describing: venue, asset type and the venue-specific payload come
/// back out of the id without any registry. Two distinct venue-native
/// identifiers of the same asset type and venue never map to the same id,
/// within the documented truncation bounds of each constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InstrumentId {
    /// [`VenueId`] discriminant.
    pub venue: u16,
    /// [`AssetType`] discriminant.
    pub asset_type: u8,
    /// Reserved for future flags; zero today.
    pub reserved: u8,
    /// Venue-specific payload: truncated address, packed symbol, or a
    /// pairing-function result for pools.
    pub asset_id: u64,
}

impl InstrumentId {
    /// Wire size when embedded in a TLV payload.
    pub const WIRE_SIZE: usize = 12;

    /// Bits of `asset_id` preserved by the u64 cache key.
    pub const CACHE_KEY_ASSET_BITS: u32 = 40;

    const CACHE_KEY_ASSET_MASK: u64 = (1 << Self::CACHE_KEY_ASSET_BITS) - 1;

    /// Token id from a 20-byte contract address.
    ///
    /// Uses the first 8 address bytes, big-endian. Truncation bounds the
    /// collision risk but does not eliminate it for tokens differing only
    /// in their low-order address bytes; there is deliberately no
    /// secondary disambiguation table.
    pub fn from_address(venue: VenueId, address: &[u8; 20]) -> Self {
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&address[..8]);
        Self {
            venue: venue as u16,
            asset_type: AssetType::Token as u8,
            reserved: 0,
            asset_id: u64::from_be_bytes(prefix),
        }
    }

    /// Token id from a hex address string, with or without a `0x` prefix.
    pub fn from_address_hex(venue: VenueId, address: &str) -> Result<Self, IdentityError> {
        let clean = address.strip_prefix("0x").unwrap_or(address);
        let bytes =
            hex::decode(clean).map_err(|e| IdentityError::InvalidAddress(e.to_string()))?;
        let array: &[u8; 20] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| IdentityError::InvalidAddress(format!("{} bytes, need 20", bytes.len())))?;
        Ok(Self::from_address(venue, array))
    }

    /// Stock id from an exchange ticker of up to 8 ASCII bytes.
    ///
    /// The symbol is packed big-endian and left-aligned, so it is fully
    /// recoverable via [`symbol`](Self::symbol): the construction is
    /// bijective over valid symbols.
    pub fn from_symbol(venue: VenueId, symbol: &str) -> Result<Self, IdentityError> {
        if symbol.is_empty() || symbol.len() > 8 || !symbol.is_ascii() {
            return Err(IdentityError::InvalidSymbol(symbol.to_string()));
        }
        let mut bytes = [0u8; 8];
        bytes[..symbol.len()].copy_from_slice(symbol.as_bytes());
        Ok(Self {
            venue: venue as u16,
            asset_type: AssetType::Stock as u8,
            reserved: 0,
            asset_id: u64::from_be_bytes(bytes),
        })
    }

    /// Pool id from its two constituent tokens.
    ///
    /// The pair is canonicalized (smaller operand first) before the Cantor
    /// pairing function combines both operands, so token order never
    /// matters and distinct unordered pairs never collide within the
    /// operand width. Each token contributes the low 20 bits of its
    /// `asset_id` as the pairing operand, keeping the result inside the
    /// 40-bit cache-key budget; like address truncation, the reduction is
    /// a documented bound on uniqueness, not a removal of it.
    pub fn from_pool(venue: VenueId, token0: InstrumentId, token1: InstrumentId) -> Self {
        let a = (token0.asset_id & POOL_OPERAND_MASK) as u32;
        let b = (token1.asset_id & POOL_OPERAND_MASK) as u32;
        let (x, y) = if a <= b { (a, b) } else { (b, a) };
        Self {
            venue: venue as u16,
            asset_type: AssetType::Pool as u8,
            reserved: 0,
            asset_id: cantor_pair(x, y),
        }
    }

    /// Pack to a u64 cache key: `venue << 48 | asset_type << 40 | asset_id`.
    ///
    /// Total inverse of [`from_u64`](Self::from_u64) whenever `asset_id`
    /// fits 40 bits (always true for pools and symbols of up to five
    /// characters); wider ids lose their high bits in the key.
    pub fn to_u64(&self) -> u64 {
        ((self.venue as u64) << 48)
            | ((self.asset_type as u64) << 40)
            | (self.asset_id & Self::CACHE_KEY_ASSET_MASK)
    }

    /// Unpack a u64 cache key produced by [`to_u64`](Self::to_u64).
    pub fn from_u64(value: u64) -> Self {
        Self {
            venue: ((value >> 48) & 0xFFFF) as u16,
            asset_type: ((value >> 40) & 0xFF) as u8,
            reserved: 0,
            asset_id: value & Self::CACHE_KEY_ASSET_MASK,
        }
    }

    /// Venue as a checked enum.
    pub fn venue(&self) -> Result<VenueId, IdentityError> {
        VenueId::try_from(self.venue).map_err(|_| IdentityError::UnknownVenue(self.venue))
    }

    /// Asset type as a checked enum.
    pub fn asset_type(&self) -> Result<AssetType, IdentityError> {
        AssetType::try_from(self.asset_type)
            .map_err(|_| IdentityError::UnknownAssetType(self.asset_type))
    }

    /// Recover the ticker symbol for stock ids.
    pub fn symbol(&self) -> String {
        let bytes = self.asset_id.to_be_bytes();
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(8);
        String::from_utf8_lossy(&bytes[..end]).to_string()
    }

    /// Human-readable description for logs.
    pub fn debug_info(&self) -> String {
        match (self.venue(), self.asset_type()) {
            (Ok(venue), Ok(AssetType::Token)) => {
                format!("{:?} Token 0x{:016x}…", venue, self.asset_id)
            }
            (Ok(venue), Ok(AssetType::Stock)) => format!("{:?} Stock {}", venue, self.symbol()),
            (Ok(venue), Ok(AssetType::Pool)) => format!("{:?} Pool #{}", venue, self.asset_id),
            (Ok(venue), Ok(AssetType::Derivative)) => {
                format!("{:?} Derivative #{}", venue, self.asset_id)
            }
            _ => format!(
                "Unknown {}/{} #{}",
                self.venue, self.asset_type, self.asset_id
            ),
        }
    }

    /// Write the 12-byte wire form at the start of `buf`.
    pub fn write_to(&self, buf: &mut [u8]) {
        LittleEndian::write_u16(&mut buf[0..2], self.venue);
        buf[2] = self.asset_type;
        buf[3] = self.reserved;
        LittleEndian::write_u64(&mut buf[4..12], self.asset_id);
    }

    /// Read the 12-byte wire form from the start of `buf`.
    pub fn read_from(buf: &[u8]) -> Self {
        Self {
            venue: LittleEndian::read_u16(&buf[0..2]),
            asset_type: buf[2],
            reserved: buf[3],
            asset_id: LittleEndian::read_u64(&buf[4..12]),
        }
    }
}
