//! Property-based round-trip tests for the link layer's quantified
//! invariants. Each test picks random payload/seed/error combinations
//! rather than exhaustively gridding encode-then-decode pairs.

use proptest::prelude::*;

use circls::detector::{self, DetectorThresholds};
use circls::ir::{self, FrameControl, IrFrame};
use circls::lab::LabPixel;
use circls::packet;
use circls::rs::{self, DATA_LEN};
use circls::scrambler::{Scrambler, ScramblerConfig};
use circls::symbol;

fn arb_payload() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..4096)
}

proptest! {
    /// `descramble(scramble(p)) == p` for any payload and any valid
    /// `(seed, seed_len)`, given matching initial register values.
    #[test]
    fn scrambler_round_trips(
        payload in arb_payload(),
        seed_len in 1u8..=32,
        seed_bits in any::<u32>(),
        initial_register in any::<u32>(),
    ) {
        let mask = if seed_len == 32 { u32::MAX } else { (1u32 << seed_len) - 1 };
        let config = ScramblerConfig {
            seed: seed_bits & mask,
            seed_len,
            initial_register: initial_register & mask,
        };
        let mut tx = Scrambler::new(config).unwrap();
        let mut rx = Scrambler::new(config).unwrap();
        let scrambled = tx.scramble(&payload);
        let recovered = rx.descramble(&scrambled);
        prop_assert_eq!(recovered, payload);
    }

    /// `rs_decode(rs_encode(data)) == data` for any payload, with no
    /// corruption introduced.
    #[test]
    fn rs_round_trips_any_payload(data in arb_payload()) {
        let mut encoded = rs::rs_encode(&data);
        let n = rs::rs_decode(&mut encoded).unwrap();
        prop_assert_eq!(&encoded[..n], &data[..]);
    }

    /// A single corrupted byte anywhere in one full 255-byte codeword is
    /// always correctable: up to two symbol errors per NPAR=4 codeword,
    /// and a lone byte is one error.
    #[test]
    fn rs_corrects_any_single_byte_error(
        data in proptest::collection::vec(any::<u8>(), DATA_LEN..=DATA_LEN),
        pos in 0usize..255,
        magnitude in 1u8..=255,
    ) {
        let mut encoded = rs::rs_encode(&data);
        encoded[pos] ^= magnitude;
        let n = rs::rs_decode(&mut encoded).unwrap();
        prop_assert_eq!(&encoded[..n], &data[..]);
    }

    /// `parse(frame(p)).payload == p` and the sequence number round
    /// trips, for any payload and sequence number.
    #[test]
    fn packet_round_trips(payload in arb_payload(), seq in any::<u8>()) {
        let mut encoded = packet::frame(seq, &payload);
        let (got_seq, got_payload) = packet::parse(&mut encoded).unwrap();
        prop_assert_eq!(got_seq, seq);
        prop_assert_eq!(got_payload, payload);
    }

    /// Any single-bit flip of the FCS must be reported, never silently
    /// accepted or repaired.
    #[test]
    fn fcs_bit_flip_always_detected(
        payload in proptest::collection::vec(any::<u8>(), 0..64),
        seq in any::<u8>(),
        bit in 0u8..16,
    ) {
        let unencoded = packet::assemble(seq, &payload);
        let fcs_offset = unencoded.len() - 2;
        let mut flipped = unencoded.clone();
        flipped[fcs_offset + (bit / 8) as usize] ^= 1 << (bit % 8);
        prop_assume!(flipped != unencoded);
        let mut reencoded = rs::rs_encode(&flipped);
        let err = packet::parse(&mut reencoded).unwrap_err();
        prop_assert!(matches!(err, circls::Error::FcsMismatch { .. }));
    }

    /// Run-length compression preserves total pixel count and never
    /// emits two adjacent runs with the same tag.
    #[test]
    fn detector_run_length_invariants(
        pixels in proptest::collection::vec(
            (any::<u8>(), any::<i8>(), any::<i8>()), 0..512
        )
    ) {
        let strip: Vec<LabPixel> = pixels.iter().map(|&(l, a, b)| LabPixel { l, a, b }).collect();
        let runs = detector::detect(&strip, DetectorThresholds::default());
        let total: u32 = runs.iter().map(|r| r.width).sum();
        prop_assert_eq!(total as usize, strip.len());
        for pair in runs.windows(2) {
            prop_assert_ne!(pair[0].tag, pair[1].tag);
        }
    }

    /// Modulating then demodulating any byte stream recovers it exactly,
    /// when every symbol is rendered at a uniform width at or above the
    /// demodulator's minimum threshold.
    #[test]
    fn modulate_demodulate_round_trips(data in arb_payload()) {
        let symbols = symbol::modulate(&data);
        // Render every symbol as a run of uniform width 16: the
        // demodulator's three-quarter sync correction recovers a
        // symbol width of 12, comfortably below 16 (see `demod`'s own
        // tests for this convention).
        let runs: Vec<detector::RunLengthSymbol> = symbols
            .iter()
            .map(|&tag| detector::RunLengthSymbol { tag, width: 16 })
            .collect();
        let decoded = circls::demod::demodulate(&runs).unwrap();
        prop_assert_eq!(decoded, data);
    }

    /// `decode_ir(encode_ir(f))` recovers every field of `f`, modulo the
    /// encode/decode pair not round-tripping raw pulse widths directly
    /// (decode operates on an aggregated capture buffer) — so this
    /// drives the decode side with a synthetic capture built the same
    /// way the receive hardware would summarize pulses into popcounts.
    #[test]
    fn ir_round_trips(fc in 0u8..16, data in any::<u8>()) {
        let frame = IrFrame::new(fc, data);
        let bits = ((ir::MAGIC as u16) << 12) | ((frame.fc as u16) << 8) | frame.data as u16;
        let mut capture = Vec::with_capacity(64);
        for i in (0..16).rev() {
            let bit = (bits >> i) & 1;
            let ones: u32 = if bit == 1 { 24 } else { 8 };
            let word = if ones == 32 { u32::MAX } else { (1u32 << ones) - 1 };
            capture.extend_from_slice(&word.to_le_bytes());
        }
        let decoded = ir::decode_ir(&capture).unwrap();
        prop_assert_eq!(decoded.fc, frame.fc);
        prop_assert_eq!(decoded.data, frame.data);
        if fc == FrameControl::Nack as u8 {
            prop_assert_eq!(decoded.frame_control(), Some(FrameControl::Nack));
        }
    }
}
