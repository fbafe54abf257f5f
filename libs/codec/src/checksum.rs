//! CRC32 message integrity.
//!
//! The checksum covers the entire message except the 4-byte checksum field
//! itself (header bytes 28..32). Both sides hash the surrounding slices
//! directly, so neither encoding nor verification ever copies the buffer.

use tapecast_types::protocol::message::header::CHECKSUM_OFFSET;
use tapecast_types::MessageHeader;

/// CRC32 over a full message, excluding the header's checksum field.
pub fn compute_checksum(message: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&message[..CHECKSUM_OFFSET]);
    if message.len() > MessageHeader::SIZE {
        hasher.update(&message[MessageHeader::SIZE..]);
    }
    hasher.finalize()
}

/// Compute the checksum of a complete message and write it in place.
///
/// Must run after the payload is appended, never before: the checksum
/// covers every payload byte.
pub fn finalize_checksum(message: &mut [u8]) {
    let checksum = compute_checksum(message);
    message[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4].copy_from_slice(&checksum.to_le_bytes());
}

/// Verify a complete message against its stored checksum.
pub fn verify_checksum(message: &[u8]) -> bool {
    let stored = u32::from_le_bytes([
        message[CHECKSUM_OFFSET],
        message[CHECKSUM_OFFSET + 1],
        message[CHECKSUM_OFFSET + 2],
        message[CHECKSUM_OFFSET + 3],
    ]);
    compute_checksum(message) == stored
}
