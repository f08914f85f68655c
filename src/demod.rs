/*! Demodulator: locate sync, recover symbol width, map symbols to bytes.

Pure and finite in its input; never blocks. Operates on the
run-length-compressed sequence [`crate::detector::detect`] produces.
*/

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::symbol::Symbol;

/// One classified run: reuse the detector's type directly so callers
/// don't have to convert between equivalent shapes.
pub use crate::detector::RunLengthSymbol;

fn symbol_bits(tag: Symbol) -> Option<u8> {
    tag.data_bits()
}

/// Find the `Y 0 Y 0 Y 0 Y 0` sync pattern in `runs`, returning
/// `(index_after_sync, symbol_width)` where `symbol_width` is
/// `(w1+w3+w5+w7) * 3 / 16` over the four Yellow run widths (spec
/// §4.8's empirical three-quarter-mean correction for chroma bleed).
fn find_sync(runs: &[RunLengthSymbol]) -> Option<(usize, u32)> {
    if runs.len() < 8 {
        return None;
    }
    for start in 0..=runs.len() - 8 {
        let window = &runs[start..start + 8];
        let pattern_ok = window.iter().enumerate().all(|(i, r)| {
            if i % 2 == 0 {
                r.tag == Symbol::Yellow
            } else {
                r.tag == Symbol::Dark
            }
        });
        if pattern_ok {
            let yellow_sum: u32 = window.iter().step_by(2).map(|r| r.width).sum();
            let width = yellow_sum * 3 / 16;
            return Some((start + 8, width));
        }
    }
    None
}

/// Demodulate `runs` into a byte buffer.
///
/// Fails with [`Error::Empty`] if `runs` is too short to possibly
/// contain the 8-run sync window, and [`Error::NoSync`] if no sync
/// pattern is found.
pub fn demodulate(runs: &[RunLengthSymbol]) -> Result<Vec<u8>> {
    if runs.len() < 8 {
        trace!("demodulate: {} runs is too short to hold a sync window", runs.len());
        return Err(Error::Empty);
    }
    let Some((data_start, width)) = find_sync(runs) else {
        debug!("demodulate: no sync preamble found in {} runs", runs.len());
        return Err(Error::NoSync);
    };
    if width == 0 {
        debug!("demodulate: sync found but recovered symbol width is zero");
        return Err(Error::NoSync);
    }

    let mut bit_buf: u32 = 0;
    let mut bit_count: u32 = 0;
    let mut out = Vec::new();

    for run in &runs[data_start..] {
        let Some(bits) = symbol_bits(run.tag) else { continue };
        let mut remaining = run.width;
        while remaining >= width {
            bit_buf |= (bits as u32) << bit_count;
            bit_count += 2;
            remaining -= width;
            if bit_count >= 8 {
                out.push((bit_buf & 0xff) as u8);
                bit_buf >>= 8;
                bit_count -= 8;
            }
        }
    }

    Ok(out)
}
