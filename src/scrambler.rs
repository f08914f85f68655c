/*! Self-synchronous additive bit scrambler / descrambler.

Ported from the `bbb/lib/scrambler` shift-register design: a scramble
step XORs the incoming bit with the parity of `shift_reg & seed`, then
folds the *scrambled* bit into the register. Because both the
scrambler and the descrambler feed their register with the scrambled
bitstream (not the plaintext), the two registers track each other bit
for bit, and the descrambler can start from any initial register value
as long as it matches the scrambler's — it resynchronizes automatically
after `seed_len` bits.

The original C++ `Scrambler::unscramble` simply returned
`ESCRAM_UNIMPL`. This crate implements it properly, as the algebraic
mirror of scrambling.
*/

use crate::bits::parity;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default seed, carried over from `SCRAMBLER_DEFAULT_SEED` in the
/// original scrambler library.
pub const DEFAULT_SEED: u32 = 0x12;

/// Default seed length in bits (`SCRAMBLER_DEFAULT_LEN`).
pub const DEFAULT_SEED_LEN: u8 = 5;

/// Default initial shift register value, before masking to `seed_len`
/// bits (`SCRAMBLER_SHIFT_INIT`).
pub const DEFAULT_INITIAL_REGISTER: u32 = 0x9696_9696;

/// Seed lengths the original hardware was tuned for. Any value in
/// `1..=32` is accepted; these are just the ones worth naming.
pub const RECOGNIZED_SEED_LENGTHS: [u8; 5] = [5, 8, 12, 20, 32];

/// Scrambler/descrambler configuration.
///
/// `seed` and `initial_register` are masked to their low `seed_len`
/// bits before use; only the low `seed_len` bits of either are
/// significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScramblerConfig {
    /// Parity mask applied to the shift register at each step.
    pub seed: u32,
    /// Number of significant bits, `1..=32`.
    pub seed_len: u8,
    /// Shift register value before the first bit is processed.
    pub initial_register: u32,
}

impl Default for ScramblerConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            seed_len: DEFAULT_SEED_LEN,
            initial_register: DEFAULT_INITIAL_REGISTER,
        }
    }
}

fn seed_mask(seed_len: u8) -> Result<u32> {
    if seed_len == 0 || seed_len > 32 {
        return Err(Error::BadLength(seed_len));
    }
    Ok(if seed_len == 32 {
        u32::MAX
    } else {
        (1u32 << seed_len) - 1
    })
}

/// Scrambler/descrambler core. The same struct is used for both
/// directions, since a self-synchronous additive scrambler's scramble
/// and descramble operations are algebraic inverses driven by the same
/// shift-register recurrence.
#[derive(Debug, Clone)]
pub struct Scrambler {
    config: ScramblerConfig,
    mask: u32,
    shift_reg: u32,
}

impl Scrambler {
    /// Create a new scrambler/descrambler from `config`.
    ///
    /// Returns [`Error::BadLength`] if `seed_len` is zero or exceeds the
    /// 32-bit register width, and [`Error::BadSeed`] if `seed` has bits
    /// set outside the resulting mask.
    pub fn new(config: ScramblerConfig) -> Result<Self> {
        let mask = seed_mask(config.seed_len)?;
        if config.seed & !mask != 0 {
            return Err(Error::BadSeed {
                seed: config.seed,
                seed_len: config.seed_len,
            });
        }
        Ok(Self {
            config,
            mask,
            shift_reg: config.initial_register & mask,
        })
    }

    /// Reset the shift register to `config.initial_register`, masked.
    pub fn reset(&mut self) {
        self.shift_reg = self.config.initial_register & self.mask;
    }

    /// Current shift register contents (for tests/diagnostics).
    #[must_use]
    pub fn shift_register(&self) -> u32 {
        self.shift_reg
    }

    fn step(&mut self, scrambled_bit: u8) -> u8 {
        let p = parity(self.shift_reg & self.config.seed);
        self.shift_reg = ((self.shift_reg << 1) | scrambled_bit as u32) & self.mask;
        p
    }

    /// Scramble one bit (`0` or `1`), MSB-first bit ordering is the
    /// caller's responsibility at the byte level.
    pub fn scramble_bit(&mut self, bit: u8) -> u8 {
        // We need the parity *before* folding the output bit in, but the
        // output bit itself depends on that parity. Compute it first,
        // then update the register with the result.
        let p = parity(self.shift_reg & self.config.seed);
        let out = bit ^ p;
        self.shift_reg = ((self.shift_reg << 1) | out as u32) & self.mask;
        out
    }

    /// Descramble one bit, the mirror of [`Scrambler::scramble_bit`].
    pub fn descramble_bit(&mut self, bit: u8) -> u8 {
        let p = self.step(bit);
        bit ^ p
    }

    /// Scramble `data`, most-significant-bit first within each byte.
    #[must_use]
    pub fn scramble(&mut self, data: &[u8]) -> Vec<u8> {
        data.iter().map(|&byte| self.scramble_byte(byte)).collect()
    }

    /// Descramble `data`, most-significant-bit first within each byte.
    #[must_use]
    pub fn descramble(&mut self, data: &[u8]) -> Vec<u8> {
        data.iter()
            .map(|&byte| self.descramble_byte(byte))
            .collect()
    }

    /// Scramble a single byte, MSB first.
    #[must_use]
    pub fn scramble_byte(&mut self, byte: u8) -> u8 {
        let mut out = 0u8;
        for shift in (0..8).rev() {
            let bit = (byte >> shift) & 1;
            out = (out << 1) | self.scramble_bit(bit);
        }
        out
    }

    /// Descramble a single byte, MSB first.
    #[must_use]
    pub fn descramble_byte(&mut self, byte: u8) -> u8 {
        let mut out = 0u8;
        for shift in (0..8).rev() {
            let bit = (byte >> shift) & 1;
            out = (out << 1) | self.descramble_bit(bit);
        }
        out
    }
}

/// Draw a new seed from a non-cryptographic RNG, masked to `seed_len`
/// bits.
///
/// Sessions must exchange the resulting seed out of band; nothing in
/// this crate transmits it.
#[must_use]
pub fn rseed(seed_len: u8) -> Result<u32> {
    let mask = seed_mask(seed_len)?;
    let raw: u32 = rand::random();
    Ok(raw & mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_seed_len() {
        let cfg = ScramblerConfig {
            seed: 0,
            seed_len: 0,
            initial_register: 0,
        };
        assert!(matches!(Scrambler::new(cfg), Err(Error::BadLength(0))));
    }

    #[test]
    fn rejects_seed_len_over_32() {
        let cfg = ScramblerConfig {
            seed: 0,
            seed_len: 33,
            initial_register: 0,
        };
        assert!(matches!(Scrambler::new(cfg), Err(Error::BadLength(33))));
    }

    #[test]
    fn rejects_seed_with_bits_outside_mask() {
        let cfg = ScramblerConfig {
            seed: 0b1_0000,
            seed_len: 4,
            initial_register: 0,
        };
        assert!(matches!(Scrambler::new(cfg), Err(Error::BadSeed { .. })));
    }

    #[test]
    fn round_trips_default_config() {
        let payload: Vec<u8> = (0..=255u8).collect();
        let mut tx = Scrambler::new(ScramblerConfig::default()).unwrap();
        let mut rx = Scrambler::new(ScramblerConfig::default()).unwrap();
        let scrambled = tx.scramble(&payload);
        let recovered = rx.descramble(&scrambled);
        assert_eq!(recovered, payload);
    }

    #[test]
    fn round_trips_recognized_seed_lengths() {
        for &len in RECOGNIZED_SEED_LENGTHS.iter() {
            let mask = seed_mask(len).unwrap();
            let cfg = ScramblerConfig {
                seed: DEFAULT_SEED & mask,
                seed_len: len,
                initial_register: DEFAULT_INITIAL_REGISTER & mask,
            };
            let payload = b"the quick brown fox jumps over the lazy dog".to_vec();
            let mut tx = Scrambler::new(cfg).unwrap();
            let mut rx = Scrambler::new(cfg).unwrap();
            let scrambled = tx.scramble(&payload);
            assert_eq!(rx.descramble(&scrambled), payload, "seed_len={len}");
        }
    }

    #[test]
    fn empty_payload_round_trips() {
        let mut tx = Scrambler::new(ScramblerConfig::default()).unwrap();
        let mut rx = Scrambler::new(ScramblerConfig::default()).unwrap();
        assert_eq!(rx.descramble(&tx.scramble(&[])), Vec::<u8>::new());
    }

    #[test]
    fn scramble_changes_data_after_warmup() {
        // A scrambled run of zero bytes should not stay all-zero once
        // the register has non-zero state to XOR in.
        let mut tx = Scrambler::new(ScramblerConfig::default()).unwrap();
        let scrambled = tx.scramble(&[0u8; 16]);
        assert!(scrambled.iter().any(|&b| b != 0));
    }
}
