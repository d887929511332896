//! Per-attribute encoding.
//!
//! - [`select_encoder_kind`] / [`EncoderKind`] - Strategy per attribute
//! - [`AttributeCodecState`] - Independent state one job works on
//! - [`assemble_attribute_block`] / [`split_attribute_block`] - Block layout
//! - [`encode_attributes`] / [`decode_attributes`] - The attribute phase of a frame

mod block;
mod integer;
mod kind;
mod normal;
mod passthrough;
mod pipeline;
mod quantization;
mod state;

pub use block::{assemble_attribute_block, split_attribute_block};
pub use kind::{select_encoder_kind, EncoderKind};
pub use normal::NORMAL_BITS;
pub use pipeline::{decode_attributes, encode_attributes};
pub use quantization::{QuantizationParams, QUANTIZATION_BITS};
pub use state::{AttributeCodecState, DecodeJob, EncodeJob};
