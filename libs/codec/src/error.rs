//! Protocol-level errors for message encoding and decoding.
//!
//! Every variant carries enough context to diagnose the failing buffer
//! without a debugger: sizes, offsets and the offending type number.
//! Structural and validation errors are fatal to the single message they
//! describe, never to the connection that carried it.

use tapecast_types::{IdentityError, RelayDomain};
use thiserror::Error;

/// Errors produced while parsing or constructing protocol messages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Buffer shorter than a declared size.
    #[error("message too small: need {need} bytes, got {got}")]
    TooSmall { need: usize, got: usize },

    /// A TLV record's declared length runs past the end of the payload.
    #[error("truncated TLV at offset {offset}: need {need} bytes, {available} available (type {tlv_type})")]
    TruncatedTlv {
        offset: usize,
        need: usize,
        available: usize,
        tlv_type: u8,
    },

    /// Magic number validation failed.
    #[error("invalid magic: expected {expected:#010x}, got {actual:#010x}")]
    InvalidMagic { expected: u32, actual: u32 },

    /// Protocol version is not supported by this codec.
    #[error("unsupported protocol version {version}, supported {supported}")]
    UnsupportedVersion { version: u8, supported: u8 },

    /// Recomputed CRC32 disagrees with the stored value.
    #[error("checksum mismatch: stored {stored:#010x}, calculated {calculated:#010x}")]
    ChecksumMismatch { stored: u32, calculated: u32 },

    /// A TLV type's numeric range does not match the declared relay domain.
    #[error("TLV type {tlv_type} not admitted by declared domain {declared_domain:?}")]
    DomainMismatch {
        tlv_type: u8,
        declared_domain: RelayDomain,
    },

    /// A fixed-size TLV payload has the wrong length for its type.
    #[error("payload size mismatch for TLV type {tlv_type}: expected {expected}, got {got}")]
    SizeMismatch {
        tlv_type: u8,
        expected: usize,
        got: usize,
    },

    /// A record was interpreted as the wrong typed payload.
    #[error("wrong TLV type: expected {expected}, got {got}")]
    WrongTlvType { expected: u8, got: u8 },

    /// Extended TLV escape sequence is malformed.
    #[error("malformed extended TLV at offset {offset}")]
    InvalidExtendedTlv { offset: usize },

    /// Header declares a relay domain this codec does not know.
    #[error("unknown relay domain {0}")]
    UnknownDomain(u8),

    /// TLV value exceeds what even the extended format can carry.
    #[error("TLV value too large: {size} bytes exceeds limit {limit}")]
    ValueTooLarge { size: usize, limit: usize },

    /// Type 255 introduces the extended escape and cannot carry a payload
    /// of its own.
    #[error("TLV type {0} is reserved for the extended escape")]
    ReservedTlvType(u8),

    /// Identifier construction failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Result type for codec operations.
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;
