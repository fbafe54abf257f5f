//! Message header parsing and validation.
//!
//! Entry point for all message processing: a header that fails here kills
//! the message, not the connection. Checksum verification is a separate
//! path because the market-data domain is allowed to skip it; that choice
//! belongs to the relay's per-domain policy, not the codec.

use crate::checksum::{compute_checksum, verify_checksum};
use crate::error::{ProtocolError, ProtocolResult};
use crate::tlv::{decode_tlvs, TlvRecord};
use tapecast_types::{MessageHeader, MESSAGE_MAGIC, PROTOCOL_VERSION};

/// Encode a header to its 32-byte wire form.
pub fn encode_header(header: &MessageHeader) -> [u8; MessageHeader::SIZE] {
    header.to_bytes()
}

/// Parse and validate a message header without checksum verification.
///
/// Validates structure (length), magic and version. Use only where the
/// domain's policy explicitly allows unchecked processing; everything else
/// goes through [`parse_header`].
pub fn parse_header_unchecked(data: &[u8]) -> ProtocolResult<MessageHeader> {
    if data.len() < MessageHeader::SIZE {
        return Err(ProtocolError::TooSmall {
            need: MessageHeader::SIZE,
            got: data.len(),
        });
    }
    let mut fixed = [0u8; MessageHeader::SIZE];
    fixed.copy_from_slice(&data[..MessageHeader::SIZE]);
    let header = MessageHeader::from_bytes(&fixed);

    if header.magic != MESSAGE_MAGIC {
        return Err(ProtocolError::InvalidMagic {
            expected: MESSAGE_MAGIC,
            actual: header.magic,
        });
    }
    if header.version != PROTOCOL_VERSION {
        return Err(ProtocolError::UnsupportedVersion {
            version: header.version,
            supported: PROTOCOL_VERSION,
        });
    }

    let total = MessageHeader::SIZE + header.payload_size as usize;
    if data.len() < total {
        return Err(ProtocolError::TooSmall {
            need: total,
            got: data.len(),
        });
    }
    Ok(header)
}

/// Parse and validate a message header with full integrity checking.
///
/// `data` must contain the complete message: the checksum covers every
/// byte of header and payload except the checksum field itself.
pub fn parse_header(data: &[u8]) -> ProtocolResult<MessageHeader> {
    let header = parse_header_unchecked(data)?;
    let total = MessageHeader::SIZE + header.payload_size as usize;
    if !verify_checksum(&data[..total]) {
        return Err(ProtocolError::ChecksumMismatch {
            stored: header.checksum,
            calculated: compute_checksum(&data[..total]),
        });
    }
    Ok(header)
}

/// Decode a complete message into its header and TLV records, verifying
/// the checksum.
pub fn decode_message(data: &[u8]) -> ProtocolResult<(MessageHeader, Vec<TlvRecord>)> {
    let header = parse_header(data)?;
    let payload = payload_slice(data, &header);
    Ok((header, decode_tlvs(payload)?))
}

/// Decode a complete message without checksum verification.
pub fn decode_message_unchecked(data: &[u8]) -> ProtocolResult<(MessageHeader, Vec<TlvRecord>)> {
    let header = parse_header_unchecked(data)?;
    let payload = payload_slice(data, &header);
    Ok((header, decode_tlvs(payload)?))
}

fn payload_slice<'a>(data: &'a [u8], header: &MessageHeader) -> &'a [u8] {
    &data[MessageHeader::SIZE..MessageHeader::SIZE + header.payload_size as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::finalize_checksum;
    use byteorder::{ByteOrder, LittleEndian};
    use tapecast_types::{RelayDomain, SourceType};

    fn valid_message() -> Vec<u8> {
        let mut header = MessageHeader::new(RelayDomain::MarketData, SourceType::KrakenCollector);
        header.sequence = 1;
        header.payload_size = 6;
        let mut message = header.to_bytes().to_vec();
        message.extend_from_slice(&[200, 4, 1, 2, 3, 4]);
        finalize_checksum(&mut message);
        message
    }

    #[test]
    fn ten_byte_buffer_is_too_small() {
        let err = parse_header(&[0u8; 10]).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::TooSmall {
                need: MessageHeader::SIZE,
                got: 10
            }
        );
    }

    #[test]
    fn magic_is_validated() {
        let mut message = valid_message();
        message[0] ^= 0xFF;
        assert!(matches!(
            parse_header(&message),
            Err(ProtocolError::InvalidMagic { .. })
        ));
    }

    #[test]
    fn version_is_validated() {
        let mut message = valid_message();
        message[5] = 99;
        assert!(matches!(
            parse_header(&message),
            Err(ProtocolError::UnsupportedVersion { version: 99, .. })
        ));
    }

    #[test]
    fn corrupt_payload_fails_checksum() {
        let mut message = valid_message();
        *message.last_mut().unwrap() ^= 0x01;
        assert!(matches!(
            parse_header(&message),
            Err(ProtocolError::ChecksumMismatch { .. })
        ));
        // The unchecked path still accepts it.
        assert!(parse_header_unchecked(&message).is_ok());
    }

    #[test]
    fn declared_payload_must_be_present() {
        let mut message = valid_message();
        // Claim a larger payload than the buffer holds.
        LittleEndian::write_u32(&mut message[8..12], 100);
        assert!(matches!(
            parse_header_unchecked(&message),
            Err(ProtocolError::TooSmall { .. })
        ));
    }

    #[test]
    fn decode_returns_records() {
        let message = valid_message();
        let (header, records) = decode_message(&message).unwrap();
        assert_eq!(header.payload_size, 6);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tlv_type, 200);
        assert_eq!(records[0].value, vec![1, 2, 3, 4]);
    }
}
