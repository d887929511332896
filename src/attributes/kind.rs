//! Encoder strategy selection.

use crate::geom::AttributeDescriptor;
use crate::util::{AttributeSemantic, Error, NumericType, Result};

/// Coding strategy for one attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EncoderKind {
    /// Per-component deltas along the point sequence, zig-zag varints.
    IntegerDelta,
    /// Octahedral unit-vector mapping onto a `2^bits - 1` grid.
    NormalOctahedral { bits: u8 },
    /// Uniform quantization over the attribute's bounding range.
    Quantization { bits: u8 },
    /// Element bytes copied in sequence order.
    Passthrough,
}

impl EncoderKind {
    /// Stable tag written at the start of each attribute payload.
    pub const fn wire_tag(self) -> u8 {
        match self {
            Self::IntegerDelta => 0,
            Self::NormalOctahedral { .. } => 1,
            Self::Quantization { .. } => 2,
            Self::Passthrough => 3,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::IntegerDelta => "integer_delta",
            Self::NormalOctahedral { .. } => "normal_octahedral",
            Self::Quantization { .. } => "quantization",
            Self::Passthrough => "passthrough",
        }
    }

    /// Kind for a declared attribute.
    pub fn for_descriptor(descriptor: &AttributeDescriptor) -> Self {
        select_encoder_kind(
            descriptor.semantic,
            descriptor.numeric_type(),
            descriptor.quantization_bits,
        )
    }

    /// Check a payload tag against this kind.
    pub fn check_tag(self, tag: u8) -> Result<()> {
        if tag != self.wire_tag() {
            return Err(Error::format(format!(
                "attribute payload tagged {tag}, expected {} ({})",
                self.wire_tag(),
                self.name()
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for EncoderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NormalOctahedral { bits } | Self::Quantization { bits } => {
                write!(f, "{}({bits})", self.name())
            }
            _ => f.write_str(self.name()),
        }
    }
}

/// Pick the coding strategy for an attribute. First matching rule wins:
/// integers delta code, quantized float normals go octahedral, other
/// quantized floats are quantized, everything else passes through.
pub fn select_encoder_kind(
    semantic: AttributeSemantic,
    numeric_type: NumericType,
    quantization_bits: u8,
) -> EncoderKind {
    if numeric_type.is_delta_integer() {
        return EncoderKind::IntegerDelta;
    }
    if numeric_type == NumericType::Float32 && quantization_bits > 0 {
        if semantic == AttributeSemantic::Normal {
            return EncoderKind::NormalOctahedral { bits: quantization_bits };
        }
        return EncoderKind::Quantization { bits: quantization_bits };
    }
    EncoderKind::Passthrough
}
