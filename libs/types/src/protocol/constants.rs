//! Protocol constants shared by every producer and consumer.
//!
//! The header layout is frozen for backward compatibility: these values
//! never change within a protocol major version.

/// Magic number at the start of every message.
pub const MESSAGE_MAGIC: u32 = 0xDEADBEEF;

/// Current protocol version carried in the header `version` field.
pub const PROTOCOL_VERSION: u8 = 1;

/// Header flag bit: the producer built this message without a checksum.
///
/// Only honored by relay domains configured to skip verification; domains
/// that verify will reject such messages because the stored checksum is
/// zero.
pub const FLAG_UNCHECKSUMMED: u8 = 0x01;

/// Size of a standard TLV header: type byte + length byte.
pub const STANDARD_TLV_HEADER_SIZE: usize = 2;

/// Size of an extended TLV header: marker + reserved + type + u16 length.
pub const EXTENDED_TLV_HEADER_SIZE: usize = 5;

/// Marker byte introducing the extended TLV format.
pub const EXTENDED_TLV_MARKER: u8 = 255;

/// Largest value a standard TLV can carry.
pub const MAX_STANDARD_TLV_PAYLOAD: usize = 255;

/// Largest value an extended TLV can carry.
pub const MAX_EXTENDED_TLV_PAYLOAD: usize = 65_535;
