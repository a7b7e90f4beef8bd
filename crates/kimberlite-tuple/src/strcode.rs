//! 7-bit-shift escape for arbitrary byte strings (spec §4.2.2).
//!
//! Every encoded byte must have its high bit set so a following kind byte
//! (always `< 0x80`) unambiguously terminates the run without a length
//! prefix. The payload is repacked into 7-bit lanes: each output byte holds
//! 7 bits of payload in its low bits plus the high bit forced to `1`. There
//! is no terminator byte and no length prefix — decoding simply stops at
//! end-of-input or at the first byte with the high bit clear, which belongs
//! to whatever comes next (another element's kind byte, or nothing). Any
//! leftover bits (fewer than 8, by construction) in the decoder's bit buffer
//! at that point are padding, not data, and are discarded.

use crate::buffer::{Reader, Writer};
use crate::error::Result;

/// Upper bound on the encoded length of an `len`-byte input: one output byte
/// per 7 input bits, plus room for the kind byte a caller writes alongside it.
pub fn encoded_len_upper_bound(len: usize) -> usize {
    (len * 8).div_ceil(7) + 1
}

/// Encodes `data` as an all-high-bit-set byte run with no terminator.
pub fn encode(w: &mut Writer, data: &[u8]) {
    w.need(encoded_len_upper_bound(data.len()));

    let mut acc: u32 = 0;
    let mut acc_bits: u32 = 0;

    for &byte in data {
        acc = (acc << 8) | u32::from(byte);
        acc_bits += 8;
        while acc_bits >= 7 {
            acc_bits -= 7;
            let lane = ((acc >> acc_bits) & 0x7f) as u8;
            w.put_byte(0x80 | lane);
            acc &= (1 << acc_bits) - 1;
        }
    }

    // A final partial lane, left-aligned with zero padding in the low bits,
    // if any input bits didn't fill a full 7-bit lane. The empty string
    // (acc_bits stays 0) emits nothing at all, per spec §4.2.2.
    if acc_bits > 0 {
        let pad = 7 - acc_bits;
        let lane = ((acc << pad) & 0x7f) as u8;
        w.put_byte(0x80 | lane);
    }
}

/// Decodes a run written by [`encode`], stopping (without consuming) at the
/// first byte with the high bit clear, or at end-of-input.
pub fn decode(r: &mut Reader<'_>) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut acc: u32 = 0;
    let mut acc_bits: u32 = 0;

    while let Some(b) = r.peek_byte() {
        if b & 0x80 == 0 {
            break;
        }
        r.advance(1)?;
        acc = (acc << 7) | u32::from(b & 0x7f);
        acc_bits += 7;
        if acc_bits >= 8 {
            acc_bits -= 8;
            out.push((acc >> acc_bits) as u8);
            acc &= (1 << acc_bits) - 1;
        }
    }
    Ok(out)
}

/// Skips one escaped string run without materializing its bytes.
pub fn skip(r: &mut Reader<'_>) -> Result<()> {
    let mut count = 0u32;
    while let Some(b) = r.peek_byte() {
        if b & 0x80 == 0 {
            break;
        }
        r.advance(1)?;
        count += 1;
    }
    if count > 4096 {
        tracing::trace!(bytes = count, "skip_element passed over an unusually long string run");
    }
    Ok(())
}
