//! TLV record encoding and decoding.
//!
//! Standard records carry up to 255 bytes behind a 2-byte header; the
//! extended escape `[255, 0, type, len u16]` carries up to 65 535 bytes.
//! Decoding validates structure only: unknown type numbers come back as
//! opaque records for the caller to interpret, ignore or log. Expected-size
//! enforcement for fixed-size types is a separate, explicit step
//! ([`expect_payload_size`]) so the generic codec stays domain-agnostic.

use crate::error::{ProtocolError, ProtocolResult};
use byteorder::{ByteOrder, LittleEndian};
use tapecast_types::protocol::constants::{
    EXTENDED_TLV_HEADER_SIZE, EXTENDED_TLV_MARKER, MAX_EXTENDED_TLV_PAYLOAD,
    MAX_STANDARD_TLV_PAYLOAD, STANDARD_TLV_HEADER_SIZE,
};
use tapecast_types::{TlvPayload, TlvSizeConstraint, TlvType};

/// A decoded TLV record with an owned value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlvRecord {
    pub tlv_type: u8,
    pub value: Vec<u8>,
    /// Whether the record arrived in the extended format.
    pub extended: bool,
}

/// A decoded TLV record borrowing from the payload buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvRecordRef<'a> {
    pub tlv_type: u8,
    pub value: &'a [u8],
    pub extended: bool,
}

impl TlvRecordRef<'_> {
    pub fn to_owned(self) -> TlvRecord {
        TlvRecord {
            tlv_type: self.tlv_type,
            value: self.value.to_vec(),
            extended: self.extended,
        }
    }
}

/// Encode one TLV record, choosing the extended format automatically for
/// values over 255 bytes.
pub fn encode_tlv(tlv_type: u8, value: &[u8]) -> ProtocolResult<Vec<u8>> {
    if tlv_type == EXTENDED_TLV_MARKER {
        return Err(ProtocolError::ReservedTlvType(tlv_type));
    }
    if value.len() <= MAX_STANDARD_TLV_PAYLOAD {
        let mut out = Vec::with_capacity(STANDARD_TLV_HEADER_SIZE + value.len());
        out.push(tlv_type);
        out.push(value.len() as u8);
        out.extend_from_slice(value);
        Ok(out)
    } else if value.len() <= MAX_EXTENDED_TLV_PAYLOAD {
        let mut out = Vec::with_capacity(EXTENDED_TLV_HEADER_SIZE + value.len());
        out.push(EXTENDED_TLV_MARKER);
        out.push(0);
        out.push(tlv_type);
        out.extend_from_slice(&(value.len() as u16).to_le_bytes());
        out.extend_from_slice(value);
        Ok(out)
    } else {
        Err(ProtocolError::ValueTooLarge {
            size: value.len(),
            limit: MAX_EXTENDED_TLV_PAYLOAD,
        })
    }
}

/// Encoded size of one record, including its TLV header.
pub fn encoded_tlv_size(value_len: usize) -> usize {
    if value_len <= MAX_STANDARD_TLV_PAYLOAD {
        STANDARD_TLV_HEADER_SIZE + value_len
    } else {
        EXTENDED_TLV_HEADER_SIZE + value_len
    }
}

/// Cursor stepping through a TLV payload one record at a time.
///
/// Every record decoded before a structural error is still yielded, so a
/// caller can keep the valid prefix of a payload whose tail is truncated.
pub struct TlvCursor<'a> {
    payload: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> TlvCursor<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self {
            payload,
            offset: 0,
            failed: false,
        }
    }

    fn step(&mut self) -> Option<ProtocolResult<TlvRecordRef<'a>>> {
        if self.failed || self.offset >= self.payload.len() {
            return None;
        }
        let result = self.read_record();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }

    fn read_record(&mut self) -> ProtocolResult<TlvRecordRef<'a>> {
        let remaining = self.payload.len() - self.offset;
        if remaining < STANDARD_TLV_HEADER_SIZE {
            return Err(ProtocolError::TruncatedTlv {
                offset: self.offset,
                need: STANDARD_TLV_HEADER_SIZE,
                available: remaining,
                tlv_type: 0,
            });
        }

        let first = self.payload[self.offset];
        if first == EXTENDED_TLV_MARKER {
            self.read_extended(remaining)
        } else {
            self.read_standard(first, remaining)
        }
    }

    fn read_standard(&mut self, tlv_type: u8, remaining: usize) -> ProtocolResult<TlvRecordRef<'a>> {
        let length = self.payload[self.offset + 1] as usize;
        let need = STANDARD_TLV_HEADER_SIZE + length;
        if remaining < need {
            return Err(ProtocolError::TruncatedTlv {
                offset: self.offset,
                need,
                available: remaining,
                tlv_type,
            });
        }
        let start = self.offset + STANDARD_TLV_HEADER_SIZE;
        let value = &self.payload[start..start + length];
        self.offset += need;
        Ok(TlvRecordRef {
            tlv_type,
            value,
            extended: false,
        })
    }

    fn read_extended(&mut self, remaining: usize) -> ProtocolResult<TlvRecordRef<'a>> {
        if remaining < EXTENDED_TLV_HEADER_SIZE {
            return Err(ProtocolError::TruncatedTlv {
                offset: self.offset,
                need: EXTENDED_TLV_HEADER_SIZE,
                available: remaining,
                tlv_type: EXTENDED_TLV_MARKER,
            });
        }
        if self.payload[self.offset + 1] != 0 {
            return Err(ProtocolError::InvalidExtendedTlv {
                offset: self.offset,
            });
        }
        let tlv_type = self.payload[self.offset + 2];
        let length =
            LittleEndian::read_u16(&self.payload[self.offset + 3..self.offset + 5]) as usize;
        let need = EXTENDED_TLV_HEADER_SIZE + length;
        if remaining < need {
            return Err(ProtocolError::TruncatedTlv {
                offset: self.offset,
                need,
                available: remaining,
                tlv_type,
            });
        }
        let start = self.offset + EXTENDED_TLV_HEADER_SIZE;
        let value = &self.payload[start..start + length];
        self.offset += need;
        Ok(TlvRecordRef {
            tlv_type,
            value,
            extended: true,
        })
    }
}

impl<'a> Iterator for TlvCursor<'a> {
    type Item = ProtocolResult<TlvRecordRef<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.step()
    }
}

/// Decode all TLV records in a payload.
///
/// Fails with [`ProtocolError::TruncatedTlv`] on structural overrun and
/// never on an unrecognized type number. Callers that want the valid
/// prefix of a damaged payload use [`TlvCursor`] directly.
pub fn decode_tlvs(payload: &[u8]) -> ProtocolResult<Vec<TlvRecord>> {
    let mut records = Vec::new();
    for record in TlvCursor::new(payload) {
        records.push(record?.to_owned());
    }
    Ok(records)
}

/// Find the first TLV of the given type, with the same bounds discipline
/// as [`decode_tlvs`]. Returns `None` on absence or a malformed tail.
pub fn find_tlv(payload: &[u8], target_type: u8) -> Option<&[u8]> {
    for record in TlvCursor::new(payload) {
        match record {
            Ok(r) if r.tlv_type == target_type => return Some(r.value),
            Ok(_) => continue,
            Err(_) => return None,
        }
    }
    None
}

/// Check a value's length against the registry constraint for its type.
///
/// The step a caller performs before interpreting bytes as a fixed-size
/// struct; types without a registry entry (vendor range) accept any size.
pub fn expect_payload_size(tlv_type: u8, value: &[u8]) -> ProtocolResult<()> {
    let Ok(known) = TlvType::try_from(tlv_type) else {
        return Ok(());
    };
    match known.size_constraint() {
        TlvSizeConstraint::Fixed(expected) if value.len() != expected => {
            Err(ProtocolError::SizeMismatch {
                tlv_type,
                expected,
                got: value.len(),
            })
        }
        TlvSizeConstraint::Bounded { min, max } if value.len() < min || value.len() > max => {
            Err(ProtocolError::SizeMismatch {
                tlv_type,
                expected: min,
                got: value.len(),
            })
        }
        _ => Ok(()),
    }
}

/// Interpret a record as a typed payload, enforcing type and size.
pub fn decode_payload<T: TlvPayload>(record: &TlvRecord) -> ProtocolResult<T> {
    if record.tlv_type != T::TLV_TYPE as u8 {
        return Err(ProtocolError::WrongTlvType {
            expected: T::TLV_TYPE as u8,
            got: record.tlv_type,
        });
    }
    expect_payload_size(record.tlv_type, &record.value)?;
    T::from_bytes(&record.value).map_err(|e| ProtocolError::SizeMismatch {
        tlv_type: record.tlv_type,
        expected: e.expected,
        got: e.got,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_record_round_trips() {
        let encoded = encode_tlv(200, &[1, 2, 3, 4]).unwrap();
        assert_eq!(encoded, vec![200, 4, 1, 2, 3, 4]);

        let records = decode_tlvs(&encoded).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tlv_type, 200);
        assert_eq!(records[0].value, vec![1, 2, 3, 4]);
        assert!(!records[0].extended);
    }

    #[test]
    fn large_values_use_the_extended_escape() {
        let value = vec![0x5A; 300];
        let encoded = encode_tlv(201, &value).unwrap();
        assert_eq!(&encoded[..3], &[255, 0, 201]);
        assert_eq!(&encoded[3..5], &300u16.to_le_bytes());

        let records = decode_tlvs(&encoded).unwrap();
        assert_eq!(records[0].value.len(), 300);
        assert!(records[0].extended);
    }

    #[test]
    fn oversized_values_are_rejected() {
        let err = encode_tlv(201, &vec![0u8; 70_000]).unwrap_err();
        assert!(matches!(err, ProtocolError::ValueTooLarge { limit: 65_535, .. }));
    }

    #[test]
    fn escape_marker_is_not_a_payload_type() {
        assert!(matches!(
            encode_tlv(255, &[1, 2]),
            Err(ProtocolError::ReservedTlvType(255))
        ));
    }

    #[test]
    fn truncated_record_reports_offset_and_need() {
        // Claims 10 bytes, buffer holds 5 of value.
        let payload = vec![7, 10, 1, 2, 3, 4, 5];
        let err = decode_tlvs(&payload).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::TruncatedTlv {
                offset: 0,
                need: 12,
                available: 7,
                tlv_type: 7,
            }
        );
    }

    #[test]
    fn prefix_survives_truncated_tail() {
        // First record intact, second record's length overruns the buffer.
        let mut payload = vec![200, 2, 0xAA, 0xBB];
        payload.extend_from_slice(&[201, 50, 1, 2, 3]);

        let mut cursor = TlvCursor::new(&payload);
        let first = cursor.next().unwrap().unwrap();
        assert_eq!(first.tlv_type, 200);
        assert_eq!(first.value, &[0xAA, 0xBB]);

        let second = cursor.next().unwrap();
        assert!(matches!(
            second,
            Err(ProtocolError::TruncatedTlv { offset: 4, .. })
        ));
        assert!(cursor.next().is_none());
    }

    #[test]
    fn unknown_types_are_preserved_opaquely() {
        let mut payload = encode_tlv(250, &[9, 9]).unwrap(); // vendor/private
        payload.extend(encode_tlv(1, &[0u8; 49]).unwrap());

        let records = decode_tlvs(&payload).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tlv_type, 250);
    }

    #[test]
    fn extended_marker_with_bad_reserved_byte_is_malformed() {
        let payload = vec![255, 1, 7, 0, 0];
        assert!(matches!(
            decode_tlvs(&payload),
            Err(ProtocolError::InvalidExtendedTlv { offset: 0 })
        ));
    }

    #[test]
    fn find_first_match_scans_past_other_types() {
        let mut payload = Vec::new();
        payload.extend(encode_tlv(1, &[0u8; 49]).unwrap());
        payload.extend(encode_tlv(2, &[0u8; 52]).unwrap());
        payload.extend(encode_tlv(1, &[1u8; 49]).unwrap());

        let value = find_tlv(&payload, 2).unwrap();
        assert_eq!(value.len(), 52);
        // First match wins.
        assert_eq!(find_tlv(&payload, 1).unwrap(), &[0u8; 49]);
        assert!(find_tlv(&payload, 99).is_none());
    }

    #[test]
    fn fixed_size_enforcement() {
        assert!(expect_payload_size(1, &[0u8; 49]).is_ok());
        let err = expect_payload_size(1, &[0u8; 48]).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::SizeMismatch {
                tlv_type: 1,
                expected: 49,
                got: 48
            }
        );
        // Vendor types accept any size.
        assert!(expect_payload_size(250, &[0u8; 7]).is_ok());
    }
}
