//! Attribute block assembly: `N x u32` payload lengths, then the `N`
//! payloads, both in attribute order.

use super::state::AttributeCodecState;
use crate::core::{DecoderBuffer, EncoderBuffer};
use crate::util::{Error, Result};

/// Write every state's encoded payload, lengths first.
pub fn assemble_attribute_block(states: &[AttributeCodecState], out: &mut EncoderBuffer) -> Result<()> {
    for state in states {
        out.write_len(state.encoded().len())?;
    }
    for state in states {
        out.write_bytes(state.encoded());
    }
    Ok(())
}

/// Slice `count` payloads off `buf`.
pub fn split_attribute_block<'a>(buf: &mut DecoderBuffer<'a>, count: usize) -> Result<Vec<&'a [u8]>> {
    let truncated = |e: Error| Error::format(format!("attribute block truncated: {e}"));

    let mut lengths = Vec::with_capacity(count.min(buf.remaining() / 4));
    for _ in 0..count {
        lengths.push(buf.read_u32().map_err(truncated)? as usize);
    }
    let mut spans = Vec::with_capacity(count);
    for len in lengths {
        spans.push(buf.read_bytes(len).map_err(truncated)?);
    }
    Ok(spans)
}
