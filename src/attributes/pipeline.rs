//! Attribute phase of a frame: sequential transform, scheduled jobs, then
//! assembly and transform data in attribute order.

use super::block::{assemble_attribute_block, split_attribute_block};
use super::state::{AttributeCodecState, DecodeJob, EncodeJob};
use crate::core::{DecoderBuffer, EncoderBuffer};
use crate::geom::{AttributeBuffer, AttributeDescriptor, AttributeId, DecodedAttribute};
use crate::jobs::AttributeScheduler;
use crate::util::{Error, Result};

/// Encode all attributes of a frame along `sequence` into `out`.
pub fn encode_attributes(
    descriptors: &[AttributeDescriptor],
    buffers: &[AttributeBuffer],
    sequence: &[u32],
    compression_level: u8,
    scheduler: &AttributeScheduler,
    out: &mut EncoderBuffer,
) -> Result<()> {
    if buffers.len() != descriptors.len() {
        return Err(Error::precondition(format!(
            "frame carries {} attributes, session declares {}",
            buffers.len(),
            descriptors.len()
        )));
    }
    for (buffer, descriptor) in buffers.iter().zip(descriptors) {
        buffer.check_layout(descriptor, sequence.len())?;
    }

    let mut states: Vec<AttributeCodecState> = descriptors
        .iter()
        .zip(buffers)
        .enumerate()
        .map(|(i, (descriptor, buffer))| {
            AttributeCodecState::for_encode(AttributeId(i as u8), *descriptor, compression_level, buffer)
        })
        .collect();
    for state in &mut states {
        state.prepare();
    }

    let mut jobs: Vec<EncodeJob> = states
        .iter_mut()
        .map(|state| EncodeJob { state, sequence })
        .collect();
    scheduler.run(&mut jobs)?;
    drop(jobs);

    assemble_attribute_block(&states, out)?;
    for state in &states {
        state.write_params(out)?;
    }
    Ok(())
}

/// Decode all attributes of a frame whose connectivity produced `sequence`.
///
/// A failing decode job surfaces the error it recorded, so malformed
/// payloads report as format errors.
pub fn decode_attributes(
    descriptors: &[AttributeDescriptor],
    buf: &mut DecoderBuffer<'_>,
    sequence: &[u32],
    scheduler: &AttributeScheduler,
) -> Result<Vec<DecodedAttribute>> {
    let spans = split_attribute_block(buf, descriptors.len())?;

    let mut states: Vec<AttributeCodecState> = descriptors
        .iter()
        .enumerate()
        .map(|(i, descriptor)| AttributeCodecState::new(AttributeId(i as u8), *descriptor, 0))
        .collect();
    for state in &mut states {
        state.read_params(buf)?;
    }

    let mut jobs: Vec<DecodeJob> = states
        .iter_mut()
        .zip(spans.iter().copied())
        .map(|(state, payload)| DecodeJob { state, payload, sequence })
        .collect();
    let outcome = scheduler.run(&mut jobs);
    drop(jobs);

    if let Err(err) = outcome {
        if let Error::JobFailed { index } = err {
            if let Some(cause) = states.get_mut(index).and_then(AttributeCodecState::take_error) {
                return Err(cause);
            }
        }
        return Err(err);
    }
    Ok(states.into_iter().map(AttributeCodecState::into_decoded).collect())
}
