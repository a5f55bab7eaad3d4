//! Fixed-layout segment header, wire serialization, and CRC32 framing.
//!
//! Every field is read and written by explicit byte offset in network byte
//! order rather than by transmuting a `&[u8]` into a header struct, so the
//! wire format doesn't depend on host endianness or struct layout/alignment.

pub mod crc;

pub use crc::crc32;

/// Control bits for [`Header::control`]. Reserved bits (4..16) MUST be
/// zero.
pub mod control {
    pub const ACK: u16 = 1 << 0;
    pub const RST: u16 = 1 << 1;
    pub const SYN: u16 = 1 << 2;
    pub const FIN: u16 = 1 << 3;
}

/// Size of the on-the-wire segment header: 8 x 32-bit words, no padding.
pub const HEADER_SIZE: usize = 32;

/// Fixed-layout segment header. Field order here is the wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    /// Sender's next byte sequence number after this segment's payload.
    pub seq_number: u32,
    /// Next sequence number expected from the peer.
    pub ack_number: u32,
    /// Bitfield of [`control`] flags.
    pub control: u16,
    /// Reserved, zero in this spec.
    pub window: u16,
    /// Bytes of payload following the header.
    pub data_len: u32,
    /// Reserved, zero in this spec.
    pub future_use0: u32,
    /// Reserved, zero in this spec.
    pub future_use1: u32,
    /// Reserved, zero in this spec.
    pub future_use2: u32,
    /// CRC32 over header+payload, computed with this field zeroed.
    pub checksum: u32,
}

impl Header {
    pub fn has(&self, flag: u16) -> bool {
        self.control & flag == flag
    }

    /// Encode into wire format, network byte order, `checksum` as given
    /// (callers building a segment pass 0 and patch it in afterwards).
    fn write_to(&self, out: &mut [u8]) {
        debug_assert!(out.len() >= HEADER_SIZE);

        out[0..4].copy_from_slice(&self.seq_number.to_be_bytes());
        out[4..8].copy_from_slice(&self.ack_number.to_be_bytes());
        out[8..10].copy_from_slice(&self.control.to_be_bytes());
        out[10..12].copy_from_slice(&self.window.to_be_bytes());
        out[12..16].copy_from_slice(&self.data_len.to_be_bytes());
        out[16..20].copy_from_slice(&self.future_use0.to_be_bytes());
        out[20..24].copy_from_slice(&self.future_use1.to_be_bytes());
        out[24..28].copy_from_slice(&self.future_use2.to_be_bytes());
        out[28..32].copy_from_slice(&self.checksum.to_be_bytes());
    }

    /// Decode from the first [`HEADER_SIZE`] bytes of `bytes`. Structural
    /// parse only — does not validate the checksum or control bits.
    fn read_from(bytes: &[u8]) -> Header {
        debug_assert!(bytes.len() >= HEADER_SIZE);

        Header {
            seq_number: u32::from_be_bytes(bytes[0..4].try_into().unwrap()),
            ack_number: u32::from_be_bytes(bytes[4..8].try_into().unwrap()),
            control: u16::from_be_bytes(bytes[8..10].try_into().unwrap()),
            window: u16::from_be_bytes(bytes[10..12].try_into().unwrap()),
            data_len: u32::from_be_bytes(bytes[12..16].try_into().unwrap()),
            future_use0: u32::from_be_bytes(bytes[16..20].try_into().unwrap()),
            future_use1: u32::from_be_bytes(bytes[20..24].try_into().unwrap()),
            future_use2: u32::from_be_bytes(bytes[24..28].try_into().unwrap()),
            checksum: u32::from_be_bytes(bytes[28..32].try_into().unwrap()),
        }
    }
}

/// A transient wire segment: constructed, serialized, sent, and discarded
/// within one call (or parsed out of a receive buffer without copying
/// header fields into long-lived storage).
pub struct Segment;

impl Segment {
    /// Serialize `header` (whose `checksum` is ignored and recomputed)
    /// followed by `payload`, returning the framed buffer with the CRC32
    /// patched into place.
    pub fn serialize(mut header: Header, payload: &[u8]) -> Vec<u8> {
        header.checksum = 0;
        header.data_len = payload.len() as u32;

        let mut buf = vec![0u8; HEADER_SIZE + payload.len()];
        header.write_to(&mut buf[..HEADER_SIZE]);
        buf[HEADER_SIZE..].copy_from_slice(payload);

        let checksum = crc32(&buf);
        buf[28..32].copy_from_slice(&checksum.to_be_bytes());

        buf
    }

    /// Structurally parse `bytes` into a header and its payload slice.
    /// Infallible: does not check the checksum or `data_len` consistency,
    /// which the caller validates against the actual received length.
    pub fn parse(bytes: &[u8]) -> (Header, &[u8]) {
        let header = Header::read_from(bytes);
        let data_len = header.data_len as usize;
        let payload = &bytes[HEADER_SIZE..(HEADER_SIZE + data_len).min(bytes.len())];

        (header, payload)
    }

    /// CRC32 of `bytes` with the checksum field (bytes 28..32) zeroed,
    /// the cover the receiver recomputes to verify an incoming segment.
    pub fn verify_checksum(bytes: &[u8]) -> bool {
        if bytes.len() < HEADER_SIZE {
            return false;
        }

        let claimed = u32::from_be_bytes(bytes[28..32].try_into().unwrap());

        let mut scratch = bytes.to_vec();
        scratch[28..32].copy_from_slice(&0u32.to_be_bytes());

        crc32(&scratch) == claimed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_header_and_payload() {
        let header = Header {
            seq_number: 42,
            ack_number: 7,
            control: control::SYN | control::ACK,
            data_len: 0, // overwritten by serialize()
            ..Default::default()
        };
        let payload = b"Hello CSD\0";

        let wire = Segment::serialize(header, payload);
        let (parsed, parsed_payload) = Segment::parse(&wire);

        assert_eq!(parsed.seq_number, 42);
        assert_eq!(parsed.ack_number, 7);
        assert_eq!(parsed.control, control::SYN | control::ACK);
        assert_eq!(parsed.data_len as usize, payload.len());
        assert_eq!(parsed_payload, payload);
    }

    #[test]
    fn checksum_covers_header_and_payload() {
        let header = Header {
            seq_number: 1,
            ack_number: 1,
            control: control::ACK,
            ..Default::default()
        };
        let wire = Segment::serialize(header, b"payload");

        assert!(Segment::verify_checksum(&wire));
    }

    #[test]
    fn corrupted_byte_fails_checksum() {
        let header = Header {
            seq_number: 1,
            ack_number: 1,
            control: control::ACK,
            ..Default::default()
        };
        let mut wire = Segment::serialize(header, b"payload");
        wire[HEADER_SIZE] ^= 0xff;

        assert!(!Segment::verify_checksum(&wire));
    }

    #[test]
    fn empty_payload_emits_one_segment_worth_of_bytes() {
        let header = Header::default();
        let wire = Segment::serialize(header, &[]);

        assert_eq!(wire.len(), HEADER_SIZE);
    }
}
