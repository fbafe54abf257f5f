//! # Tapecast Types - Wire Layouts and Registries
//!
//! Pure data structures for the Tapecast binary message protocol:
//! the 32-byte message header, the TLV type registry with per-type size
//! constraints, fixed-layout TLV payload structs, and the bijective
//! instrument identifier system.
//!
//! This crate deliberately contains no policy and no I/O. Everything here
//! operates on caller-owned buffers and is safe to use from any number of
//! threads without synchronization. Parsing *rules* (magic/version/checksum
//! validation, bounds enforcement) live in `tapecast-codec`; routing and
//! recovery live in `tapecast-relay`.
//!
//! All multi-byte fields are little-endian on the wire and are read and
//! written through explicit per-field offsets rather than struct
//! transmutation, so the format is identical on every architecture
//! regardless of padding or alignment rules.

pub mod identifiers;
pub mod protocol;

pub use identifiers::{
    cantor_pair, cantor_unpair, AssetType, IdentityError, InstrumentId, VenueId,
};
pub use protocol::constants::{
    FLAG_UNCHECKSUMMED, MAX_EXTENDED_TLV_PAYLOAD, MAX_STANDARD_TLV_PAYLOAD, MESSAGE_MAGIC,
    PROTOCOL_VERSION,
};
pub use protocol::message::header::{current_timestamp_ns, MessageHeader};
pub use protocol::relay_domain::RelayDomain;
pub use protocol::source_type::SourceType;
pub use protocol::tlv::types::{TlvSizeConstraint, TlvType};
pub use protocol::tlv::{TlvPayload, WireSizeError};
