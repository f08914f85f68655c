/*! Transmit/receive session state: the natural home for the two
pieces of state that outlive a single packet.

`Scrambler` is owned by a session (concurrent use by multiple threads
is unsupported); `SymbolRing` is the receiver's only long-lived
mutable state. Bundling them here saves a caller from wiring the
scramble → frame → RS → modulate pipeline (and its mirror) by hand for
every packet, the way a block-graph runtime bundles its stateful nodes
into one handle — except these are plain structs with methods, since
the core itself must stay non-blocking and I/O-free.
*/

use log::info;

use crate::error::Result;
use crate::packet;
use crate::scrambler::{Scrambler, ScramblerConfig};
use crate::symbol::{self, Symbol};
use crate::symbol_ring::SymbolRing;

/// Transmit-side session: owns the scrambler, produces a modulated
/// symbol stream for one packet at a time.
pub struct TxSession {
    scrambler: Scrambler,
}

impl TxSession {
    /// Create a transmit session from `config`.
    pub fn new(config: ScramblerConfig) -> Result<Self> {
        Ok(Self {
            scrambler: Scrambler::new(config)?,
        })
    }

    /// Frame, scramble and RS-encode `payload` with sequence number
    /// `seq`, then modulate it, returning the symbol stream to hand to
    /// the LED driver (sync-prefixed).
    ///
    /// Order matters and must mirror [`RxSession::decode`] exactly: the
    /// unencoded `header ‖ payload ‖ fcs` buffer is scrambled as a unit
    /// first, *then* RS-encoded in 255-byte codewords, per spec §3/§6 —
    /// not the other way around.
    #[must_use]
    pub fn send(&mut self, seq: u8, payload: &[u8]) -> Vec<Symbol> {
        let assembled = packet::assemble(seq, payload);
        let scrambled = self.scrambler.scramble(&assembled);
        let encoded = crate::rs::rs_encode(&scrambled);
        symbol::modulate(&encoded)
    }
}

/// Receive-side session: owns the descrambler and the symbol ring,
/// tracks received/dropped/overrun counters the way an HDLC deframer
/// tracks `decoded`/`crc_error`/`bitfixed`.
pub struct RxSession {
    descrambler: Scrambler,
    ring: SymbolRing,
    packets_received: u64,
    packets_dropped: u64,
}

impl RxSession {
    /// Create a receive session from `config` with a symbol ring of
    /// `ring_capacity` slots (must be a power of two).
    pub fn new(config: ScramblerConfig, ring_capacity: usize) -> Result<Self> {
        Ok(Self {
            descrambler: Scrambler::new(config)?,
            ring: SymbolRing::new(ring_capacity),
            packets_received: 0,
            packets_dropped: 0,
        })
    }

    /// Feed freshly classified tags from one camera frame into the
    /// ring. Propagates [`crate::error::Error::ReceiverOverrun`] on
    /// back-pressure, same as [`SymbolRing::push_all`].
    pub fn ingest(&mut self, tags: &[Symbol]) -> Result<()> {
        self.ring.push_all(tags)
    }

    /// Total packets successfully parsed so far.
    #[must_use]
    pub fn packets_received(&self) -> u64 {
        self.packets_received
    }

    /// Total packets dropped (no sync, FCS mismatch, RS uncorrectable,
    /// truncated, or length mismatch) so far.
    #[must_use]
    pub fn packets_dropped(&self) -> u64 {
        self.packets_dropped
    }

    /// Scan the ring for a header+trailer match, returning the
    /// `(header_start, trailer_end)` offsets [`SymbolRing::find_packet`]
    /// reports, or `None` if no complete packet is buffered yet. The
    /// ring only retains per-symbol tags, not the run widths C8's sync
    /// search needs, so reassembling the matched window into bytes
    /// still goes through the caller's own C7 run-length output and
    /// [`crate::demod::demodulate`]; this just locates the boundaries.
    pub fn find_packet(&mut self) -> Option<(usize, usize)> {
        self.ring.find_packet()
    }

    /// Decode one already-demodulated, RS-encoded packet buffer: RS
    /// decode, descramble, then parse. The mirror of [`TxSession::send`]
    /// — RS decoding happens first since encoding was the last step on
    /// transmit, then the result is descrambled before header/FCS
    /// validation. A failure at any stage is counted in
    /// `packets_dropped`; the core never retries internally.
    pub fn decode(&mut self, buf: &mut [u8]) -> Result<(u8, Vec<u8>)> {
        match self.decode_inner(buf) {
            Ok(v) => {
                self.packets_received += 1;
                Ok(v)
            }
            Err(e) => {
                self.packets_dropped += 1;
                Err(e)
            }
        }
    }

    fn decode_inner(&mut self, buf: &mut [u8]) -> Result<(u8, Vec<u8>)> {
        let decoded_len = crate::rs::rs_decode(buf)?;
        let descrambled = self.descrambler.descramble(&buf[..decoded_len]);
        packet::validate(&descrambled)
    }

    /// Total camera frames dropped because the symbol ring had no room
    /// left, the receiver's back-pressure counter.
    #[must_use]
    pub fn overrun_count(&self) -> u64 {
        self.ring.overrun_count()
    }
}

impl Drop for RxSession {
    fn drop(&mut self) {
        info!(
            "RxSession: received {}, dropped {}, ring overruns {}",
            self.packets_received,
            self.packets_dropped,
            self.ring.overrun_count()
        );
    }
}
