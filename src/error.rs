/*! Shared error taxonomy for the Circls link layer.

Every public entry point in this crate returns [`Result<T>`] instead of
the sentinel `-1`/`NULL`/out-parameter idiom the original C++
implementation used. There are no panics on recoverable error paths;
a caller always gets a typed variant it can match on.
*/

/// Errors returned by the Circls core.
///
/// Variant names follow a fixed taxonomy so that logs and downstream
/// matches stay stable across implementations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A scrambler/descrambler `seed_len` was zero or wider than the
    /// shift register can hold.
    #[error("bad scrambler seed length: {0}")]
    BadLength(u8),

    /// A scrambler seed had bits set outside of its `seed_mask`.
    #[error("seed 0x{seed:x} has bits outside the {seed_len}-bit mask")]
    BadSeed {
        /// The offending seed value.
        seed: u32,
        /// The configured seed length, in bits.
        seed_len: u8,
    },

    /// Operation intentionally unimplemented in this build.
    #[error("operation not implemented: {0}")]
    Unimpl(&'static str),

    /// The demodulator could not locate the sync preamble in the input.
    #[error("sync preamble not found")]
    NoSync,

    /// The input was too short to possibly contain a sync window.
    #[error("input too short to contain a sync window")]
    Empty,

    /// A received buffer ended before the header's declared length.
    #[error("packet truncated: wanted {wanted} bytes, got {got}")]
    Truncated {
        /// Bytes the header claimed the packet would be.
        wanted: usize,
        /// Bytes actually recovered.
        got: usize,
    },

    /// The decoded byte count did not match the header's `length` field.
    #[error("length mismatch: header says {header}, decoded {decoded}")]
    LengthMismatch {
        /// `length` field read from the header.
        header: u16,
        /// Number of bytes actually decoded.
        decoded: usize,
    },

    /// The frame check sequence did not match the recomputed CRC.
    #[error("FCS mismatch: header says 0x{got:04x}, computed 0x{want:04x}")]
    FcsMismatch {
        /// CRC carried in the packet.
        got: u16,
        /// CRC recomputed over `header || payload`.
        want: u16,
    },

    /// A Reed–Solomon codeword had more errors than `NPAR` could correct.
    #[error("Reed-Solomon codeword uncorrectable")]
    RsUncorrectable,

    /// An IR frame's magic nibble did not match `0b1010`.
    #[error("IR frame magic mismatch: got 0x{0:x}")]
    IrBadMagic(u8),

    /// The receive symbol ring had no room left for new symbols and
    /// dropped the remainder of a frame.
    #[error("receiver overrun: symbol ring is full")]
    ReceiverOverrun,

    /// An error from the environment adapter layer (platform I/O,
    /// hardware backends, etc), passed through unchanged.
    #[error(transparent)]
    SystemError(#[from] anyhow::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
