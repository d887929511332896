//! Octahedral normal coding.
//!
//! Body layout: `bits: u8`, then per normal the zig-zag varint deltas of
//! both grid coordinates.

use crate::core::{DecoderBuffer, EncoderBuffer};
use crate::util::{octahedral_decode, octahedral_encode, Error, Result, Vec2, Vec3};

/// Accepted bit counts per octahedral coordinate.
pub const NORMAL_BITS: std::ops::RangeInclusive<u8> = 2..=30;

fn max_quantized(bits: u8) -> Result<i64> {
    if !NORMAL_BITS.contains(&bits) {
        return Err(Error::precondition(format!(
            "{bits} normal bits outside {NORMAL_BITS:?}"
        )));
    }
    Ok((1i64 << bits) - 1)
}

/// Map an octahedral coordinate in [-1, 1] onto `0..=max_q`.
#[inline]
fn to_grid(v: f32, max_q: i64) -> i64 {
    let t = (f64::from(v) + 1.0) * 0.5;
    ((t * max_q as f64).round() as i64).clamp(0, max_q)
}

#[inline]
fn from_grid(q: i64, max_q: i64) -> f32 {
    (q as f64 / max_q as f64 * 2.0 - 1.0) as f32
}

/// Encode packed 3-component normals.
pub(super) fn encode(ordered: &[f32], bits: u8, out: &mut EncoderBuffer) -> Result<()> {
    let max_q = max_quantized(bits)?;
    out.write_u8(bits)?;
    let (mut prev_u, mut prev_v) = (0i64, 0i64);
    for n in ordered.chunks_exact(3) {
        let n = Vec3::new(n[0], n[1], n[2]);
        if !n.is_finite() {
            return Err(Error::precondition(format!("non-finite normal {n}")));
        }
        let e = octahedral_encode(n);
        let (u, v) = (to_grid(e.x, max_q), to_grid(e.y, max_q));
        out.write_signed_varint(u - prev_u);
        out.write_signed_varint(v - prev_v);
        (prev_u, prev_v) = (u, v);
    }
    Ok(())
}

/// Decode `count` normals; returns the bit count read from the body.
pub(super) fn decode(buf: &mut DecoderBuffer<'_>, count: usize, out: &mut Vec<f32>) -> Result<u8> {
    let bits = buf.read_u8()?;
    let max_q = max_quantized(bits).map_err(|e| Error::format(e.to_string()))?;
    let (mut u, mut v) = (0i64, 0i64);
    for _ in 0..count {
        u = next_coordinate(buf, u, max_q)?;
        v = next_coordinate(buf, v, max_q)?;
        let n = octahedral_decode(Vec2::new(from_grid(u, max_q), from_grid(v, max_q)));
        out.extend_from_slice(&n.to_array());
    }
    Ok(bits)
}

fn next_coordinate(buf: &mut DecoderBuffer<'_>, prev: i64, max_q: i64) -> Result<i64> {
    prev.checked_add(buf.read_signed_varint()?)
        .filter(|q| (0..=max_q).contains(q))
        .ok_or_else(|| Error::format("octahedral coordinate out of range"))
}
