/*! Reed–Solomon forward error correction over GF(256).

255-byte codewords (or a shorter final codeword), always carrying
exactly [`NPAR`] parity bytes, over `GF(256)` with primitive polynomial
`0x11d` and generator roots starting at `α⁰` — the same field and
generator convention as the `rscode-1.3` library the original
implementation linked against.

The encoder is a synthetic-division LFSR over the field; the decoder
computes syndromes, runs Berlekamp–Massey to find the error locator
polynomial, Chien search to find error positions, and Forney's
algorithm to compute error magnitudes. This is the standard textbook
RS decoder (the same algorithm family as `rscode`, `reedsolo`, and
most other GF(256) RS implementations); it corrects up to two symbol
errors per codeword, matching `NPAR = 4`.
*/

use log::{debug, trace};

use crate::error::{Error, Result};
use std::sync::OnceLock;

/// Parity bytes appended to every codeword.
pub const NPAR: usize = 4;

/// Maximum codeword length, including parity.
pub const CODEWORD_LEN: usize = 255;

/// Maximum data bytes carried by one full codeword.
pub const DATA_LEN: usize = CODEWORD_LEN - NPAR;

const GF_PRIM_POLY: u16 = 0x11d;
const GF_SIZE: usize = 256;
const GF_MASK: usize = GF_SIZE - 1;

struct GaloisField {
    exp: [u8; GF_SIZE * 2],
    log: [u8; GF_SIZE],
}

impl GaloisField {
    fn new() -> Self {
        let mut exp = [0u8; GF_SIZE * 2];
        let mut log = [0u8; GF_SIZE];
        let mut x: u16 = 1;
        for i in 0..GF_MASK {
            exp[i] = x as u8;
            log[x as usize] = i as u8;
            x <<= 1;
            if x & GF_SIZE as u16 != 0 {
                x ^= GF_PRIM_POLY;
            }
        }
        for i in GF_MASK..exp.len() {
            exp[i] = exp[i - GF_MASK];
        }
        Self { exp, log }
    }

    fn mul(&self, a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        self.exp[self.log[a as usize] as usize + self.log[b as usize] as usize]
    }

    fn pow(&self, base: u8, power: i32) -> u8 {
        if base == 0 {
            return 0;
        }
        let l = self.log[base as usize] as i32 * power;
        self.exp[l.rem_euclid(GF_MASK as i32) as usize]
    }

    fn inverse(&self, a: u8) -> u8 {
        self.exp[(GF_MASK - self.log[a as usize] as usize) % GF_MASK]
    }

    fn div(&self, a: u8, b: u8) -> u8 {
        if a == 0 {
            return 0;
        }
        self.mul(a, self.inverse(b))
    }
}

fn gf() -> &'static GaloisField {
    static FIELD: OnceLock<GaloisField> = OnceLock::new();
    FIELD.get_or_init(GaloisField::new)
}

/// Polynomials here are coefficient vectors in descending-degree order:
/// `poly[0]` is the coefficient of the highest power.
fn poly_scale(poly: &[u8], x: u8) -> Vec<u8> {
    poly.iter().map(|&c| gf().mul(c, x)).collect()
}

fn poly_add(a: &[u8], b: &[u8]) -> Vec<u8> {
    let len = a.len().max(b.len());
    let mut out = vec![0u8; len];
    for (i, &c) in a.iter().enumerate() {
        out[i + len - a.len()] = c;
    }
    for (i, &c) in b.iter().enumerate() {
        out[i + len - b.len()] ^= c;
    }
    out
}

fn poly_mul(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; a.len() + b.len() - 1];
    for (i, &ac) in a.iter().enumerate() {
        if ac == 0 {
            continue;
        }
        for (j, &bc) in b.iter().enumerate() {
            out[i + j] ^= gf().mul(ac, bc);
        }
    }
    out
}

/// Evaluate `poly` at `x`, Horner's method.
fn poly_eval(poly: &[u8], x: u8) -> u8 {
    poly.iter().fold(0u8, |acc, &c| gf().mul(acc, x) ^ c)
}

/// Generator polynomial for `NPAR` parity bytes, roots `alpha^0..alpha^(NPAR-1)`.
fn generator_poly() -> &'static Vec<u8> {
    static GEN: OnceLock<Vec<u8>> = OnceLock::new();
    GEN.get_or_init(|| {
        let mut g = vec![1u8];
        for i in 0..NPAR {
            // Roots alpha^0, alpha^1, ... alpha^(NPAR-1): the generator's
            // root sequence starts at alpha^0 (first consecutive root).
            let root = gf().pow(2, i as i32);
            g = poly_mul(&g, &[1, root]);
        }
        g
    })
}

/// Encode one codeword's worth of data (up to [`DATA_LEN`] bytes),
/// returning the [`NPAR`] parity bytes to append.
fn encode_block(data: &[u8]) -> [u8; NPAR] {
    let gen = generator_poly();
    let mut msg_out = vec![0u8; data.len() + NPAR];
    msg_out[..data.len()].copy_from_slice(data);
    for i in 0..data.len() {
        let coef = msg_out[i];
        if coef != 0 {
            for (j, &g) in gen.iter().enumerate() {
                msg_out[i + j] ^= gf().mul(g, coef);
            }
        }
    }
    let mut parity = [0u8; NPAR];
    parity.copy_from_slice(&msg_out[data.len()..]);
    parity
}

/// RS-encode `data` into 255-byte codewords (the final one possibly
/// shorter), each carrying exactly [`NPAR`] parity bytes.
///
/// Output length is `data.len() + NPAR * ceil(data.len() / DATA_LEN)`,
/// with a minimum of one (parity-only) codeword when `data` is empty.
#[must_use]
pub fn rs_encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + NPAR * data.len().div_ceil(DATA_LEN).max(1));
    if data.is_empty() {
        out.extend_from_slice(&encode_block(&[]));
        return out;
    }
    for chunk in data.chunks(DATA_LEN) {
        out.extend_from_slice(chunk);
        out.extend_from_slice(&encode_block(chunk));
    }
    out
}

fn calc_syndromes(block: &[u8]) -> Vec<u8> {
    (0..NPAR).map(|i| poly_eval(block, gf().pow(2, i as i32))).collect()
}

/// Berlekamp–Massey, specialized to the no-erasures case.
fn find_error_locator(synd: &[u8]) -> Result<Vec<u8>> {
    let mut err_loc = vec![1u8];
    let mut old_loc = vec![1u8];
    for i in 0..synd.len() {
        let k = i;
        let mut delta = synd[k];
        for j in 1..err_loc.len() {
            delta ^= gf().mul(err_loc[err_loc.len() - 1 - j], synd[k - j]);
        }
        old_loc.push(0);
        if delta != 0 {
            if old_loc.len() > err_loc.len() {
                let new_loc = poly_scale(&old_loc, delta);
                old_loc = poly_scale(&err_loc, gf().inverse(delta));
                err_loc = new_loc;
            }
            err_loc = poly_add(&err_loc, &poly_scale(&old_loc, delta));
        }
    }
    while err_loc.first() == Some(&0) && err_loc.len() > 1 {
        err_loc.remove(0);
    }
    let errs = err_loc.len() - 1;
    if errs * 2 > synd.len() {
        debug!("rs_decode: error locator degree {errs} exceeds correction bound");
        return Err(Error::RsUncorrectable);
    }
    Ok(err_loc)
}

/// Chien search: find roots of `err_loc` among `alpha^{-i}` for
/// positions `i` in a message of length `nmess`.
fn find_errors(err_loc: &[u8], nmess: usize) -> Result<Vec<usize>> {
    let errs = err_loc.len() - 1;
    let mut positions = Vec::new();
    for i in 0..nmess {
        if poly_eval(err_loc, gf().pow(2, i as i32)) == 0 {
            positions.push(nmess - 1 - i);
        }
    }
    if positions.len() != errs {
        return Err(Error::RsUncorrectable);
    }
    Ok(positions)
}

/// Forney's algorithm: compute error magnitudes and correct `msg` in
/// place at `err_pos`.
fn correct_errata(msg: &mut [u8], synd: &[u8], err_pos: &[usize]) -> Result<()> {
    let coef_pos: Vec<usize> = err_pos.iter().map(|&p| msg.len() - 1 - p).collect();
    // Error locator from error positions (Xi = alpha^{coef_pos}).
    let mut err_loc = vec![1u8];
    let x: Vec<u8> = coef_pos
        .iter()
        .map(|&p| gf().pow(2, (GF_MASK - p) as i32))
        .collect();
    for &xi in &x {
        err_loc = poly_mul(&err_loc, &[xi, 1]);
    }

    // Error evaluator: Omega(x) = (Synd(x) * ErrLoc(x)) mod x^NPAR.
    let synd_rev: Vec<u8> = synd.iter().rev().copied().collect();
    let full = poly_mul(&synd_rev, &err_loc);
    let err_eval: Vec<u8> = if full.len() > NPAR {
        full[full.len() - NPAR..].to_vec()
    } else {
        full
    };
    let err_eval_rev: Vec<u8> = err_eval.iter().rev().copied().collect();

    for (i, &xi) in x.iter().enumerate() {
        let xi_inv = gf().inverse(xi);
        let mut err_loc_prime = 1u8;
        for (j, &xj) in x.iter().enumerate() {
            if i != j {
                err_loc_prime = gf().mul(err_loc_prime, 1 ^ gf().mul(xi_inv, xj));
            }
        }
        if err_loc_prime == 0 {
            return Err(Error::RsUncorrectable);
        }
        let y = poly_eval(&err_eval_rev, xi_inv);
        let y = gf().mul(xi, y);
        let magnitude = gf().div(y, err_loc_prime);
        msg[err_pos[i]] ^= magnitude;
    }
    Ok(())
}

/// Correct a single codeword (data + [`NPAR`] parity bytes) in place.
///
/// Returns `Ok(())` if the codeword was already correct or was
/// successfully corrected; `Err(Error::RsUncorrectable)` if it carries
/// more errors than `NPAR` parity bytes can fix.
fn decode_block(block: &mut [u8]) -> Result<()> {
    let synd = calc_syndromes(block);
    if synd.iter().all(|&s| s == 0) {
        trace!("rs_decode: codeword ({} bytes) already correct", block.len());
        return Ok(());
    }
    let err_loc = find_error_locator(&synd)?;
    let err_pos = find_errors(&err_loc, block.len())?;
    debug!("rs_decode: correcting {} symbol error(s) in a {}-byte codeword", err_pos.len(), block.len());
    correct_errata(block, &synd, &err_pos)?;
    // Re-check: a wrong correction would leave a non-zero syndrome.
    if calc_syndromes(block).iter().any(|&s| s != 0) {
        debug!("rs_decode: correction left a non-zero syndrome, declaring uncorrectable");
        return Err(Error::RsUncorrectable);
    }
    Ok(())
}

/// Decode `buf` in place, 255-byte (or shorter final) chunks, each
/// carrying [`NPAR`] parity bytes. Corrects up to two symbol errors per
/// chunk and compacts the decoded data bytes to the front of `buf`.
///
/// Returns the total number of decoded data bytes on success.
pub fn rs_decode(buf: &mut [u8]) -> Result<usize> {
    let mut out_index = 0usize;
    let mut in_index = 0usize;
    let mut left = buf.len();
    while left > 0 {
        let chunk_len = left.min(CODEWORD_LEN);
        if chunk_len < NPAR {
            return Err(Error::RsUncorrectable);
        }
        decode_block(&mut buf[in_index..in_index + chunk_len])?;
        let data_len = chunk_len - NPAR;
        buf.copy_within(in_index..in_index + data_len, out_index);
        out_index += data_len;
        in_index += chunk_len;
        left -= chunk_len;
    }
    Ok(out_index)
}
