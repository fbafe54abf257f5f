//! # Tapecast Codec - Protocol Rules
//!
//! The "rules" layer of the Tapecast protocol:
//! - Header encoding/decoding with magic, version and checksum validation
//! - TLV record encoding/decoding, standard and extended formats
//! - Message construction with explicit per-source sequencing
//! - CRC32 integrity helpers
//!
//! ## Architecture role
//!
//! ```text
//! tapecast-types → [tapecast-codec] → tapecast-relay
//!      ↑                 ↓                  ↓
//!  Pure data       Protocol rules      Routing and
//!  structures      validation          recovery
//! ```
//!
//! Everything in this crate is pure computation over caller-owned buffers:
//! no allocation is shared between calls, no locks are taken, and every
//! function is safe to call concurrently from any number of threads.
//!
//! Decoding is two-stage by design: [`decode_tlvs`] yields `(type, bytes)`
//! records with unknown types preserved opaquely, and only a caller that
//! recognizes a type interprets its payload. The codec fails on structural
//! truncation, never on an unrecognized type; that is what keeps old
//! consumers compatible with new producers.

pub mod builder;
pub mod checksum;
pub mod error;
pub mod header;
pub mod tlv;

pub use builder::{MessageBuilder, Sequencer};
pub use checksum::{compute_checksum, finalize_checksum, verify_checksum};
pub use error::{ProtocolError, ProtocolResult};
pub use header::{
    decode_message, decode_message_unchecked, encode_header, parse_header, parse_header_unchecked,
};
pub use tlv::{
    decode_payload, decode_tlvs, encode_tlv, expect_payload_size, find_tlv, TlvCursor, TlvRecord,
    TlvRecordRef,
};
