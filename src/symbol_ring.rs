/*! Symbol ring: multi-frame symbol-tag accumulation and packet framing.

A power-of-two circular buffer of symbol tags, written by whatever
calls [`crate::detector::detect`] after each camera frame and read by
whatever calls [`crate::demod::demodulate`]/[`crate::packet::parse`].
Single-producer, single-consumer; `find_packet` scans for the
header pattern `0 1 0 1 0 R G B Y` then the trailer pattern `0 1 0`, a
literal position-by-position scan rather than a KMP-style automaton,
matching `native-lib.cpp`'s `findPacket`/`detectSymbols` linear scan.
*/

use log::warn;

use crate::error::{Error, Result};
use crate::symbol::Symbol;

const HEADER_PATTERN: [Symbol; 9] = [
    Symbol::Dark,
    Symbol::Light,
    Symbol::Dark,
    Symbol::Light,
    Symbol::Dark,
    Symbol::Red,
    Symbol::Green,
    Symbol::Blue,
    Symbol::Yellow,
];

const TRAILER_PATTERN: [Symbol; 3] = [Symbol::Dark, Symbol::Light, Symbol::Dark];

/// A bounded circular buffer of symbol tags.
///
/// `capacity` must be a power of two; `first` and `last` are cursors
/// mod `capacity`, advanced by the consumer and producer respectively.
pub struct SymbolRing {
    buf: Vec<Symbol>,
    capacity: usize,
    mask: usize,
    first: usize,
    last: usize,
    /// Count of frames dropped because the ring had no room left.
    overrun_count: u64,
}

impl SymbolRing {
    /// Create a ring of `capacity` slots. `capacity` must be a power of
    /// two and at least 2; violating this is a programming error, not a
    /// runtime condition the error taxonomy covers, so this panics
    /// like a `Vec::with_capacity` overflow would.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity.is_power_of_two() && capacity >= 2, "capacity must be a power of two >= 2");
        Self {
            buf: vec![Symbol::Dark; capacity],
            capacity,
            mask: capacity - 1,
            first: 0,
            last: 0,
            overrun_count: 0,
        }
    }

    /// Number of unread symbols: `(last - first) mod capacity`.
    #[must_use]
    pub fn len(&self) -> usize {
        (self.last.wrapping_sub(self.first)) & self.mask
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of times [`SymbolRing::push`] has had to drop input
    /// because the ring was full.
    #[must_use]
    pub fn overrun_count(&self) -> u64 {
        self.overrun_count
    }

    /// Push one symbol, produced by the detector. Returns
    /// [`Error::ReceiverOverrun`] (and drops the symbol) if the ring has
    /// no free slot — the caller is expected to drop the rest of the
    /// current camera frame on this signal.
    pub fn push(&mut self, tag: Symbol) -> Result<()> {
        let next = (self.last + 1) & self.mask;
        if next == self.first {
            self.overrun_count += 1;
            warn!(
                "symbol ring full (capacity {}), dropping rest of frame (overrun #{})",
                self.capacity, self.overrun_count
            );
            return Err(Error::ReceiverOverrun);
        }
        self.buf[self.last] = tag;
        self.last = next;
        Ok(())
    }

    /// Push every symbol in `tags`, stopping at the first overrun.
    pub fn push_all(&mut self, tags: &[Symbol]) -> Result<()> {
        for &tag in tags {
            self.push(tag)?;
        }
        Ok(())
    }

    fn at(&self, offset: usize) -> Symbol {
        self.buf[(self.first + offset) & self.mask]
    }

    /// Scan from `first` for the header pattern, then the trailer
    /// pattern. On a full header+trailer match, advances `first` past
    /// the trailer and returns the `(header_start, trailer_end)` index
    /// range (in linear "symbols since `first` at call time" units) so
    /// the caller can replay exactly the matched window through
    /// [`crate::demod::demodulate`] if it needs the raw tags again.
    ///
    /// Returns `None` if no complete header+trailer pair is present yet
    /// (the producer hasn't caught up); `first` is left at the start of
    /// the best candidate match so a future call can resume cheaply.
    pub fn find_packet(&mut self) -> Option<(usize, usize)> {
        let len = self.len();
        if len < HEADER_PATTERN.len() {
            return None;
        }

        let mut header_start = None;
        'search: for start in 0..=len - HEADER_PATTERN.len() {
            for (i, &want) in HEADER_PATTERN.iter().enumerate() {
                if self.at(start + i) != want {
                    continue 'search;
                }
            }
            header_start = Some(start);
            break;
        }
        let header_start = header_start?;
        let header_end = header_start + HEADER_PATTERN.len();

        let len = self.len();
        if len < header_end + TRAILER_PATTERN.len() {
            // Advance first to the header start so the next call
            // doesn't re-scan symbols we've already ruled out.
            self.first = (self.first + header_start) & self.mask;
            return None;
        }

        let mut trailer_start = None;
        'search2: for start in header_end..=len - TRAILER_PATTERN.len() {
            for (i, &want) in TRAILER_PATTERN.iter().enumerate() {
                if self.at(start + i) != want {
                    continue 'search2;
                }
            }
            trailer_start = Some(start);
            break;
        }
        let Some(trailer_start) = trailer_start else {
            self.first = (self.first + header_start) & self.mask;
            return None;
        };
        let trailer_end = trailer_start + TRAILER_PATTERN.len();

        self.first = (self.first + trailer_end) & self.mask;
        Some((header_start, trailer_end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_len_track_each_other() {
        let mut ring = SymbolRing::new(8);
        assert!(ring.is_empty());
        ring.push(Symbol::Red).unwrap();
        ring.push(Symbol::Green).unwrap();
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn overrun_is_reported_and_counted() {
        let mut ring = SymbolRing::new(2);
        ring.push(Symbol::Red).unwrap();
        assert!(matches!(ring.push(Symbol::Green), Err(Error::ReceiverOverrun)));
        assert_eq!(ring.overrun_count(), 1);
    }

    #[test]
    fn finds_header_and_trailer() {
        let mut ring = SymbolRing::new(32);
        let mut tags = HEADER_PATTERN.to_vec();
        tags.push(Symbol::Red);
        tags.push(Symbol::Blue);
        tags.extend_from_slice(&TRAILER_PATTERN);
        ring.push_all(&tags).unwrap();
        let found = ring.find_packet();
        assert!(found.is_some());
    }

    #[test]
    fn no_match_returns_none() {
        let mut ring = SymbolRing::new(32);
        ring.push_all(&[Symbol::Red; 16]).unwrap();
        assert!(ring.find_packet().is_none());
    }
}
