//! Integer delta coding.
//!
//! Each component is widened to `i64` and coded as the zig-zag varint of
//! its difference to the same component of the previous element.

use smallvec::{smallvec, SmallVec};

use crate::core::{DecoderBuffer, EncoderBuffer};
use crate::util::{Error, NumericType, Result};

pub(super) fn encode(
    ordered: &[u8],
    numeric: NumericType,
    components: usize,
    out: &mut EncoderBuffer,
) -> Result<()> {
    let width = numeric.num_bytes();
    let mut prev: SmallVec<[i64; 4]> = smallvec![0; components];
    for (i, component) in ordered.chunks_exact(width).enumerate() {
        let value = numeric
            .read_integer(component)
            .ok_or_else(|| Error::precondition(format!("{numeric} is not an integer type")))?;
        let c = i % components;
        out.write_signed_varint(value - prev[c]);
        prev[c] = value;
    }
    Ok(())
}

pub(super) fn decode(
    buf: &mut DecoderBuffer<'_>,
    numeric: NumericType,
    components: usize,
    count: usize,
    out: &mut Vec<u8>,
) -> Result<()> {
    let (lo, hi) = numeric
        .integer_bounds()
        .ok_or_else(|| Error::format(format!("{numeric} is not an integer type")))?;
    let mut prev: SmallVec<[i64; 4]> = smallvec![0; components];
    for _ in 0..count {
        for last in prev.iter_mut() {
            let value = last
                .checked_add(buf.read_signed_varint()?)
                .filter(|v| (lo..=hi).contains(v))
                .ok_or_else(|| Error::format(format!("integer value outside the {numeric} range")))?;
            numeric.write_integer(value, out);
            *last = value;
        }
    }
    Ok(())
}
