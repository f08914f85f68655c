/*! Packet framing: header, payload, FCS, and chunked RS wrapping.

```text
+---------------- header ----------------+-- payload --+-- fcs --+
| length:u16 LE | seq:u8 |               |  N bytes    | crc:u16 |
```

`length` is the total unencoded size (header + payload + FCS); `seq`
wraps at 256; `fcs` is `crc16_ccitt(header ‖ payload)`. The header is
hand-packed rather than relying on struct layout — the original
`circls_tx_hdr_t` is `__attribute__((packed))`, little-endian, with no
alignment padding, and Rust gives no such guarantee for an ordinary
struct.

`frame` assembles `header ‖ payload ‖ fcs` and hands the whole buffer
to [`crate::rs::rs_encode`] in 255-byte codewords. `parse` is the
inverse: RS-decode in place, read the header, check the decoded length
against it, check the FCS, and return `(seq, payload)`. `parse` never
attempts to repair a bad FCS by flipping bits — any single-bit
corruption of the FCS must surface as [`Error::FcsMismatch`], not be
silently patched over.
*/

use crate::bits::crc16_ccitt;
use crate::error::{Error, Result};
use crate::rs::{rs_decode, rs_encode};

/// Size in bytes of the on-wire header (`length` + `seq`).
pub const HEADER_LEN: usize = 3;

/// Size in bytes of the frame check sequence.
pub const FCS_LEN: usize = 2;

/// Packet header: total unencoded length and sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Total bytes in the unencoded packet: `HEADER_LEN + payload.len() + FCS_LEN`.
    pub length: u16,
    /// Sequence number, wraps at 256.
    pub seq: u8,
}

impl PacketHeader {
    fn to_bytes(self) -> [u8; HEADER_LEN] {
        let l = self.length.to_le_bytes();
        [l[0], l[1], self.seq]
    }

    fn from_bytes(buf: &[u8]) -> Self {
        debug_assert!(buf.len() >= HEADER_LEN);
        Self {
            length: u16::from_le_bytes([buf[0], buf[1]]),
            seq: buf[2],
        }
    }
}

/// Build the on-wire frame for `payload`, sequence number `seq`.
///
/// Assemble the unencoded `header ‖ payload ‖ fcs` buffer for `payload`
/// at sequence number `seq`.
///
/// This is the pre-scramble, pre-RS representation. Scrambling the
/// whole packet as a unit happens *between* this step and RS encoding —
/// [`TxSession::send`](crate::session::TxSession::send) sequences it
/// correctly; this function stays scramble-agnostic so it's simple to
/// test in isolation.
#[must_use]
pub fn assemble(seq: u8, payload: &[u8]) -> Vec<u8> {
    let length = (HEADER_LEN + payload.len() + FCS_LEN) as u16;
    let header = PacketHeader { length, seq };

    let mut unencoded = Vec::with_capacity(length as usize);
    unencoded.extend_from_slice(&header.to_bytes());
    unencoded.extend_from_slice(payload);
    let fcs = crc16_ccitt(&unencoded);
    unencoded.extend_from_slice(&fcs.to_le_bytes());
    unencoded
}

/// Validate an already-descrambled, already-RS-decoded `header ‖
/// payload ‖ fcs` buffer and split it into `(seq, payload)`.
///
/// Fails with [`Error::Truncated`] if `buf` is too short to hold even
/// an empty packet, [`Error::LengthMismatch`] if its length doesn't
/// match the header's `length` field, or [`Error::FcsMismatch`] if the
/// recomputed CRC disagrees with the carried one.
pub fn validate(buf: &[u8]) -> Result<(u8, Vec<u8>)> {
    if buf.len() < HEADER_LEN + FCS_LEN {
        return Err(Error::Truncated {
            wanted: HEADER_LEN + FCS_LEN,
            got: buf.len(),
        });
    }
    let header = PacketHeader::from_bytes(buf);

    if buf.len() != header.length as usize {
        return Err(Error::LengthMismatch {
            header: header.length,
            decoded: buf.len(),
        });
    }

    let payload_end = buf.len() - FCS_LEN;
    let payload = buf[HEADER_LEN..payload_end].to_vec();
    let got_fcs = u16::from_le_bytes([buf[payload_end], buf[payload_end + 1]]);
    let want_fcs = crc16_ccitt(&buf[..payload_end]);
    if got_fcs != want_fcs {
        return Err(Error::FcsMismatch {
            got: got_fcs,
            want: want_fcs,
        });
    }

    Ok((header.seq, payload))
}

/// Convenience wrapper: assemble `payload` and RS-encode it directly,
/// with no scrambling step. Suitable when a caller doesn't need the
/// scrambler layer (e.g. exercising RS/header/FCS logic in isolation);
/// [`TxSession::send`](crate::session::TxSession::send) does not use
/// this — it scrambles between assembly and RS encoding instead.
#[must_use]
pub fn frame(seq: u8, payload: &[u8]) -> Vec<u8> {
    rs_encode(&assemble(seq, payload))
}

/// Convenience wrapper: RS-decode `buf` in place and validate the
/// result directly, with no descrambling step. The mirror of
/// [`frame`]; see its notes on when to reach for the scrambler-aware
/// session types instead.
pub fn parse(buf: &mut [u8]) -> Result<(u8, Vec<u8>)> {
    let decoded_len = rs_decode(buf)?;
    validate(&buf[..decoded_len])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_empty_payload() {
        let mut encoded = frame(0, &[]);
        let (seq, payload) = parse(&mut encoded).unwrap();
        assert_eq!(seq, 0);
        assert!(payload.is_empty());
    }

    #[test]
    fn round_trips_single_byte_payload() {
        let mut encoded = frame(7, &[0x41]);
        let (seq, payload) = parse(&mut encoded).unwrap();
        assert_eq!(seq, 7);
        assert_eq!(payload, vec![0x41]);
    }

    #[test]
    fn round_trips_payload_straddling_codeword_boundary() {
        // 252 payload bytes pushes the unencoded packet (257 bytes) past
        // one 251-byte RS data chunk, forcing a second, short codeword.
        let payload: Vec<u8> = (0..252u32).map(|i| (i % 256) as u8).collect();
        let mut encoded = frame(200, &payload);
        let (seq, decoded) = parse(&mut encoded).unwrap();
        assert_eq!(seq, 200);
        assert_eq!(decoded, payload);
    }

    #[test]
    fn single_bit_fcs_flip_is_detected() {
        // Build the unencoded buffer directly so we can flip exactly one
        // FCS bit without also perturbing an unrelated RS codeword byte.
        for bit in 0..8u8 {
            let unencoded_len = HEADER_LEN + 5 + FCS_LEN;
            let mut unencoded = vec![0u8; unencoded_len];
            let header = PacketHeader { length: unencoded_len as u16, seq: 1 };
            unencoded[..HEADER_LEN].copy_from_slice(&header.to_bytes());
            unencoded[HEADER_LEN..HEADER_LEN + 5].copy_from_slice(b"hello");
            let fcs = crc16_ccitt(&unencoded[..HEADER_LEN + 5]);
            let mut fcs_bytes = fcs.to_le_bytes();
            fcs_bytes[0] ^= 1 << bit;
            unencoded[HEADER_LEN + 5..].copy_from_slice(&fcs_bytes);
            let mut reencoded = crate::rs::rs_encode(&unencoded);
            let err = parse(&mut reencoded).unwrap_err();
            assert!(matches!(err, Error::FcsMismatch { .. }), "bit={bit}");
        }
    }

    #[test]
    fn truncated_buffer_is_rejected() {
        let mut encoded = frame(0, &[]);
        encoded.truncate(2);
        assert!(matches!(parse(&mut encoded), Err(Error::RsUncorrectable) | Err(Error::Truncated { .. })));
    }

    #[test]
    fn corrupted_symbol_is_corrected_transparently() {
        let mut encoded = frame(9, b"payload");
        encoded[1] ^= 0x40;
        let (seq, payload) = parse(&mut encoded).unwrap();
        assert_eq!(seq, 9);
        assert_eq!(payload, b"payload");
    }
}
