//! Raw element bytes.

use crate::core::{DecoderBuffer, EncoderBuffer};
use crate::util::Result;

pub(super) fn encode(ordered: &[u8], out: &mut EncoderBuffer) {
    out.write_bytes(ordered);
}

pub(super) fn decode(
    buf: &mut DecoderBuffer<'_>,
    element_size: usize,
    count: usize,
    out: &mut Vec<u8>,
) -> Result<()> {
    let len = element_size.saturating_mul(count);
    out.extend_from_slice(buf.read_bytes(len)?);
    Ok(())
}
