/*!
Circls end-to-end demo: drives a payload through the full transmit and
receive pipeline using synthetic data in place of the LED driver, camera,
and IR hardware. No real hardware is touched; this exists so the core's
plumbing can be exercised and read in one place, the way a small,
single-file illustrative binary exercises a block graph.
*/
use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;

use circls::ir::{self, FrameControl, IrFrame};
use circls::lab::{self, FlattenAxis, LabView};
use circls::scrambler::ScramblerConfig;
use circls::session::{RxSession, TxSession};
use circls::symbol::Symbol;
use circls::{detector, demod};

#[derive(clap::Parser, Debug)]
#[command(version, about)]
struct Opt {
    /// Payload to send through the optical link.
    #[arg(long, default_value = "hello circls")]
    payload: String,

    /// Sequence number to tag the packet with.
    #[arg(long, default_value = "0")]
    seq: u8,

    /// Flip one byte of the RS-encoded stream to exercise error correction.
    #[arg(long)]
    corrupt: bool,

    /// Verbosity of debug messages.
    #[arg(short, default_value = "0")]
    verbose: usize,
}

/// Width, in synthetic strip pixels, rendered per symbol. Matches the
/// sync preamble's own rendered width, so the demodulator's `3/4`
/// chroma-bleed correction recovers a usable `W` for the data symbols
/// too (see `circls::demod`'s own tests for the same convention).
const SYMBOL_RENDER_WIDTH: usize = 16;

/// Representative (L, a, b) triple a camera would report for `tag`,
/// chosen to land cleanly on one side of `detector::DetectorThresholds`'s
/// default `(15, 15)` split in every axis.
fn reference_lab(tag: Symbol) -> (u8, i8, i8) {
    match tag {
        Symbol::Dark => (5, 0, 0),
        Symbol::Light => (200, 0, 0),
        Symbol::Red => (200, 80, 0),
        Symbol::Green => (200, -80, 0),
        Symbol::Blue => (200, 0, -80),
        Symbol::Yellow => (200, 0, 80),
    }
}

/// Render a symbol stream as a one-row camera frame buffer: each symbol
/// becomes `SYMBOL_RENDER_WIDTH` adjacent pixels of its reference color,
/// in the `+128`-offset unsigned encoding the camera pipeline delivers.
fn render_strip(symbols: &[Symbol]) -> Vec<u8> {
    let mut out = Vec::with_capacity(symbols.len() * SYMBOL_RENDER_WIDTH * 3);
    for &tag in symbols {
        let (l, a, b) = reference_lab(tag);
        let a = (a as i32 + 128) as u8;
        let b = (b as i32 + 128) as u8;
        for _ in 0..SYMBOL_RENDER_WIDTH {
            out.extend_from_slice(&[l, a, b]);
        }
    }
    out
}

/// Build a synthetic 64-byte IR capture buffer for `frame`, as if the
/// pulse-width samples `ir::encode_ir` produced had already been
/// aggregated into one popcount per logical bit by the receive hardware.
fn synthetic_ir_capture(frame: IrFrame) -> Vec<u8> {
    let magic_fc_data = ((ir::MAGIC as u16) << 12) | ((frame.fc as u16) << 8) | frame.data as u16;
    let mut out = Vec::with_capacity(64);
    for i in (0..16).rev() {
        let bit = (magic_fc_data >> i) & 1;
        let ones: u32 = if bit == 1 { 24 } else { 8 };
        let word = if ones == 32 { u32::MAX } else { (1u32 << ones) - 1 };
        out.extend_from_slice(&word.to_le_bytes());
    }
    out
}

fn main() -> Result<()> {
    let opt = Opt::parse();
    stderrlog::new()
        .module(module_path!())
        .module("circls")
        .quiet(false)
        .verbosity(opt.verbose)
        .timestamp(stderrlog::Timestamp::Second)
        .init()?;

    let config = ScramblerConfig::default();
    println!("scrambler config: {}", serde_json::to_string(&config)?);
    let mut tx = TxSession::new(config).context("building transmit session")?;
    let mut rx = RxSession::new(config, 4096).context("building receive session")?;

    info!("transmitting {:?} bytes as seq={}", opt.payload.len(), opt.seq);
    let symbols = tx.send(opt.seq, opt.payload.as_bytes());
    println!("modulated {} symbols (incl. sync preamble)", symbols.len());

    let frame_bytes = render_strip(&symbols);
    let cols = symbols.len() * SYMBOL_RENDER_WIDTH;
    let view = LabView::new(&frame_bytes, 1, cols, cols * 3, 3);
    let strip = lab::flatten(&view, FlattenAxis::FlattenAlongRows, false);
    let runs = detector::detect(&strip, detector::DetectorThresholds::default());
    println!("detector produced {} runs from {} pixels", runs.len(), strip.len());

    let mut encoded = demod::demodulate(&runs).context("demodulating symbol runs")?;
    println!("demodulated {} bytes of RS-encoded packet", encoded.len());

    if opt.corrupt {
        if encoded.is_empty() {
            bail!("nothing to corrupt: demodulated buffer is empty");
        }
        encoded[0] ^= 0x5a;
        println!("flipped byte 0 to exercise Reed-Solomon correction");
    }

    let (seq, payload) = rx.decode(&mut encoded).context("decoding packet")?;
    println!(
        "recovered seq={} payload={:?} ({} packets received, {} dropped, {} overruns)",
        seq,
        String::from_utf8_lossy(&payload),
        rx.packets_received(),
        rx.packets_dropped(),
        rx.overrun_count(),
    );
    if payload != opt.payload.as_bytes() {
        bail!("round trip mismatch: sent {:?}, got {:?}", opt.payload, payload);
    }

    let ir_frame = IrFrame::new(FrameControl::Nack as u8, opt.seq);
    let pulses = ir::encode_ir(ir_frame, ir::DEFAULT_PULSE_BASE);
    println!("IR NACK frame encodes to {} pulse widths: {:?}", pulses.len(), pulses);
    let capture = synthetic_ir_capture(ir_frame);
    let decoded_ir = ir::decode_ir(&capture).context("decoding synthetic IR capture")?;
    println!("IR round trip recovered fc={} data={}", decoded_ir.fc, decoded_ir.data);

    Ok(())
}
