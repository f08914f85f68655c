#![warn(missing_docs)]
/*! Link layer for **Circls**, a short-range bidirectional optical link.

A transmitter modulates an RGB light source so that colored stripes
appear on its emitting face; a receiver camera captures frames, extracts
a one-dimensional strip of colored symbols from each frame, and recovers
the original byte stream. A reverse (feedback) channel uses infrared
pulses carrying a compact 16-bit frame so the receiver can signal loss
back to the sender.

This crate is the core of that link: symbol encoding on the transmit
side, frame-to-symbols detection and demodulation on the receive side,
Reed-Solomon forward error correction, packet framing with a CRC frame
check sequence, a bit-level scrambler, and the IR feedback frame codec.

The camera capture pipeline and color-space conversion, the LED driver
and IR receiver backend, host-side GPIO/PWM wrappers, and UI/logging/
configuration loading are all external collaborators accessed only
through the plain data types below — nothing here performs I/O, blocks,
or spawns a thread.

# Architecture overview

Unlike a streaming DSP graph, every component here is a pure function or
a small owned-state struct; callers wire them together however suits
their platform (an event loop, a dedicated worker thread, or a hard
real-time co-processor context). Data flow, transmit side:

```text
  payload
     |
     v
[ packet framer ]  (crate::packet)
     |
     v
[ scrambler ]   (crate::scrambler)
     |
     v
[ Reed-Solomon encode ]  (crate::rs)
     |
     v
[ symbol modulator ]  (crate::symbol)
     |
     v
  LED driver (external)
```

The whole assembled `header ‖ payload ‖ fcs` buffer is scrambled as a
unit before Reed-Solomon encoding, not the bare payload — the FCS must
cover the unscrambled header and payload, and RS parity must cover the
scrambled bytes actually placed on the wire.

Receive side mirrors it: a captured frame is flattened from a 2-D Lab
matrix to a 1-D strip ([`lab`]), classified into run-length-compressed
symbol tags ([`detector`]), optionally accumulated across several frames
in a ring buffer ([`symbol_ring`]), demodulated back into bytes
([`demod`]), RS-decoded ([`rs`]), descrambled ([`scrambler`]), and
finally parsed ([`packet`]) to recover the payload. [`session`] bundles
the per-session state (scrambler, symbol ring) that outlives a single
packet into `TxSession`/`RxSession` convenience types. The infrared
feedback channel ([`ir`]) is independent of all of the above.

# Example

```
use circls::session::{RxSession, TxSession};
use circls::scrambler::ScramblerConfig;

let config = ScramblerConfig::default();
let mut tx = TxSession::new(config)?;
let mut rx = RxSession::new(config, 256)?;

let symbols = tx.send(0, b"hello");
// In production `symbols` drives an LED; here we just confirm the
// stream starts with the fixed sync preamble the receiver looks for.
assert_eq!(&symbols[..8], &circls::symbol::SYNC);
# Ok::<(), circls::error::Error>(())
```
*/

pub mod bits;
pub mod demod;
pub mod detector;
pub mod error;
pub mod ir;
pub mod lab;
pub mod packet;
pub mod rs;
pub mod scrambler;
pub mod session;
pub mod symbol;
pub mod symbol_ring;

pub use error::{Error, Result};
