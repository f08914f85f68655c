/*! Symbol alphabet and the byte → symbol-stream modulator.

Six symbol tags: `Dark`/`Light` carry framing only; `Red`/`Green`/
`Blue`/`Yellow` each carry two data bits, `R=00, G=01, B=10, Y=11`.
`modulate` serializes a byte buffer two bits at a time,
least-significant pair first within each byte, prefixed by the fixed
sync sequence `Y 0 Y 0 Y 0 Y 0`.
*/

/// One symbol slot on the optical link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Framing symbol: LED off.
    Dark,
    /// Framing symbol: LED on, no chroma (white/bright).
    Light,
    /// Data symbol `00`.
    Red,
    /// Data symbol `01`.
    Green,
    /// Data symbol `10`.
    Blue,
    /// Data symbol `11`.
    Yellow,
}

impl Symbol {
    /// The 2-bit value this symbol carries, or `None` for `Dark`/`Light`.
    #[must_use]
    pub fn data_bits(self) -> Option<u8> {
        match self {
            Symbol::Red => Some(0b00),
            Symbol::Green => Some(0b01),
            Symbol::Blue => Some(0b10),
            Symbol::Yellow => Some(0b11),
            Symbol::Dark | Symbol::Light => None,
        }
    }

    /// The data symbol carrying `bits` (`0..=3`).
    #[must_use]
    pub fn from_data_bits(bits: u8) -> Symbol {
        match bits & 0b11 {
            0b00 => Symbol::Red,
            0b01 => Symbol::Green,
            0b10 => Symbol::Blue,
            _ => Symbol::Yellow,
        }
    }
}

/// The fixed sync preamble: four Yellow/Dark pairs at equal symbol
/// width, emitted before every packet.
pub const SYNC: [Symbol; 8] = [
    Symbol::Yellow,
    Symbol::Dark,
    Symbol::Yellow,
    Symbol::Dark,
    Symbol::Yellow,
    Symbol::Dark,
    Symbol::Yellow,
    Symbol::Dark,
];

/// Modulate `data` into a sync-prefixed symbol stream.
///
/// Each byte is serialized two bits at a time, least-significant pair
/// first: bits `0..2` become the first symbol, bits `2..4` the second,
/// and so on.
#[must_use]
pub fn modulate(data: &[u8]) -> Vec<Symbol> {
    let mut out = Vec::with_capacity(SYNC.len() + data.len() * 4);
    out.extend_from_slice(&SYNC);
    for &byte in data {
        for shift in (0..8).step_by(2) {
            out.push(Symbol::from_data_bits((byte >> shift) & 0b11));
        }
    }
    out
}
