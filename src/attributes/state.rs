//! Per-attribute codec state and the jobs that drive it.
//!
//! Payload layout inside an attribute span:
//! `kind_tag: u8, body_encoding: u8 (0 = raw, 1 = zlib),
//! [raw_len: u32 if zlib], body`.

use std::borrow::Cow;

use super::kind::EncoderKind;
use super::quantization::QuantizationParams;
use super::{integer, normal, passthrough, quantization};
use crate::core::{deflate, inflate, DecoderBuffer, EncoderBuffer};
use crate::geom::{AttributeBuffer, AttributeDescriptor, AttributeId, DecodedAttribute};
use crate::jobs::Job;
use crate::util::{Error, Result};

const BODY_RAW: u8 = 0;
const BODY_ZLIB: u8 = 1;

/// Everything one attribute needs to be coded independently of the others.
///
/// On encode it holds the packed input values and, after its job ran, the
/// encoded payload. On decode it receives the values in point order.
#[derive(Debug)]
pub struct AttributeCodecState {
    id: AttributeId,
    descriptor: AttributeDescriptor,
    kind: EncoderKind,
    compression_level: u8,
    values: Vec<u8>,
    params: Option<QuantizationParams>,
    encoded: Vec<u8>,
    error: Option<Error>,
}

impl AttributeCodecState {
    pub fn new(id: AttributeId, descriptor: AttributeDescriptor, compression_level: u8) -> Self {
        Self {
            id,
            descriptor,
            kind: EncoderKind::for_descriptor(&descriptor),
            compression_level,
            values: Vec::new(),
            params: None,
            encoded: Vec::new(),
            error: None,
        }
    }

    /// State for encoding `buffer`, whose layout the caller has checked.
    pub fn for_encode(
        id: AttributeId,
        descriptor: AttributeDescriptor,
        compression_level: u8,
        buffer: &AttributeBuffer,
    ) -> Self {
        let mut state = Self::new(id, descriptor, compression_level);
        state.values = buffer.to_packed_bytes();
        state
    }

    #[inline]
    pub fn id(&self) -> AttributeId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> EncoderKind {
        self.kind
    }

    #[inline]
    pub fn descriptor(&self) -> &AttributeDescriptor {
        &self.descriptor
    }

    /// Encoded payload, empty until the encode job succeeded.
    #[inline]
    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    pub fn params(&self) -> Option<&QuantizationParams> {
        self.params.as_ref()
    }

    /// Error recorded by the last failed job.
    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    /// Portable transform: gather what the job and the decoder need before
    /// any attribute is coded.
    pub fn prepare(&mut self) {
        if let EncoderKind::Quantization { bits } = self.kind {
            let floats: Vec<f32> = bytemuck::pod_collect_to_vec(&self.values);
            self.params = Some(QuantizationParams::compute(&floats, self.descriptor.components(), bits));
        }
    }

    /// Write the transform data the decoder reads back with
    /// [`read_params`](Self::read_params).
    pub fn write_params(&self, out: &mut EncoderBuffer) -> Result<()> {
        match (&self.kind, &self.params) {
            (EncoderKind::Quantization { .. }, Some(params)) => params.write(out),
            (EncoderKind::Quantization { .. }, None) => {
                Err(Error::precondition(format!("attribute {} was not prepared", self.id)))
            }
            _ => Ok(()),
        }
    }

    /// Read the transform data. The stream's bit count replaces the
    /// declared one.
    pub fn read_params(&mut self, buf: &mut DecoderBuffer<'_>) -> Result<()> {
        if let EncoderKind::Quantization { .. } = self.kind {
            let params = QuantizationParams::read(buf, self.descriptor.components())?;
            self.adopt_bits(params.bits);
            self.params = Some(params);
        }
        Ok(())
    }

    fn adopt_bits(&mut self, bits: u8) {
        self.descriptor.quantization_bits = bits;
        self.kind = EncoderKind::for_descriptor(&self.descriptor);
    }

    /// Values gathered into coding order.
    fn ordered_values(&self, sequence: &[u32]) -> Result<Vec<u8>> {
        let size = self.descriptor.element_size();
        if self.values.len() != sequence.len() * size {
            return Err(Error::precondition(format!(
                "attribute {} holds {} bytes for {} points",
                self.id,
                self.values.len(),
                sequence.len()
            )));
        }
        let mut ordered = Vec::with_capacity(self.values.len());
        for &p in sequence {
            let start = p as usize * size;
            ordered.extend_from_slice(&self.values[start..start + size]);
        }
        Ok(ordered)
    }

    /// Code the values along `sequence` into the payload.
    pub fn encode(&mut self, sequence: &[u32]) -> Result<()> {
        let ordered = self.ordered_values(sequence)?;
        let components = self.descriptor.components();

        let mut body = EncoderBuffer::with_capacity(ordered.len());
        match self.kind {
            EncoderKind::IntegerDelta => {
                integer::encode(&ordered, self.descriptor.numeric_type(), components, &mut body)?
            }
            EncoderKind::Quantization { .. } => {
                let params = self.params.as_ref().ok_or_else(|| {
                    Error::precondition(format!("attribute {} was not prepared", self.id))
                })?;
                let floats: Vec<f32> = bytemuck::pod_collect_to_vec(&ordered);
                quantization::encode(&floats, params, &mut body)?
            }
            EncoderKind::NormalOctahedral { bits } => {
                if components != 3 {
                    return Err(Error::precondition(format!(
                        "normal attribute {} has {components} components",
                        self.id
                    )));
                }
                let floats: Vec<f32> = bytemuck::pod_collect_to_vec(&ordered);
                normal::encode(&floats, bits, &mut body)?
            }
            EncoderKind::Passthrough => passthrough::encode(&ordered, &mut body),
        }

        let mut out = EncoderBuffer::with_capacity(body.len() + 6);
        out.write_u8(self.kind.wire_tag())?;
        match deflate(body.as_slice(), self.compression_level)? {
            Some(compressed) => {
                out.write_u8(BODY_ZLIB)?;
                out.write_len(body.len())?;
                out.write_bytes(&compressed);
            }
            None => {
                out.write_u8(BODY_RAW)?;
                out.write_bytes(body.as_slice());
            }
        }
        self.encoded = out.into_inner();
        Ok(())
    }

    /// Decode `payload` for the points in `sequence`.
    pub fn decode(&mut self, payload: &[u8], sequence: &[u32]) -> Result<()> {
        let mut buf = DecoderBuffer::new(payload);
        self.kind.check_tag(buf.read_u8()?)?;
        let body: Cow<'_, [u8]> = match buf.read_u8()? {
            BODY_RAW => Cow::Borrowed(buf.read_rest()),
            BODY_ZLIB => {
                let raw_len = buf.read_u32()? as usize;
                Cow::Owned(inflate(buf.read_rest(), raw_len)?)
            }
            other => return Err(Error::format(format!("unknown body encoding {other}"))),
        };

        let count = sequence.len();
        let size = self.descriptor.element_size();
        let components = self.descriptor.components();
        let mut body = DecoderBuffer::new(&body);
        let mut ordered: Vec<u8> = Vec::with_capacity(count.saturating_mul(size).min(payload.len().saturating_mul(64)));

        match self.kind {
            EncoderKind::IntegerDelta => integer::decode(
                &mut body,
                self.descriptor.numeric_type(),
                components,
                count,
                &mut ordered,
            )?,
            EncoderKind::Quantization { .. } => {
                let params = self.params.as_ref().ok_or_else(|| {
                    Error::format(format!("missing bounds for attribute {}", self.id))
                })?;
                if params.mins.len() != components {
                    return Err(Error::format("quantization bounds do not match components"));
                }
                let mut floats = Vec::with_capacity(count.saturating_mul(components).min(body.remaining()));
                quantization::decode(&mut body, params, count, &mut floats)?;
                ordered.extend_from_slice(bytemuck::cast_slice(&floats));
            }
            EncoderKind::NormalOctahedral { .. } => {
                if components != 3 {
                    return Err(Error::format(format!(
                        "normal attribute {} has {components} components",
                        self.id
                    )));
                }
                let mut floats = Vec::with_capacity(count.saturating_mul(3).min(body.remaining().saturating_mul(2)));
                let bits = normal::decode(&mut body, count, &mut floats)?;
                ordered.extend_from_slice(bytemuck::cast_slice(&floats));
                self.adopt_bits(bits);
            }
            EncoderKind::Passthrough => passthrough::decode(&mut body, size, count, &mut ordered)?,
        }
        if body.remaining() != 0 {
            return Err(Error::format(format!(
                "{} trailing bytes in attribute {}",
                body.remaining(),
                self.id
            )));
        }

        let mut values = vec![0u8; ordered.len()];
        for (&p, element) in sequence.iter().zip(ordered.chunks_exact(size)) {
            let start = p as usize * size;
            values[start..start + size].copy_from_slice(element);
        }
        self.values = values;
        Ok(())
    }

    /// Decoded values as a mesh attribute.
    pub fn into_decoded(self) -> DecodedAttribute {
        DecodedAttribute { id: self.id, descriptor: self.descriptor, data: self.values }
    }

    fn record(&mut self, result: Result<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(attribute = %self.id, kind = %self.kind, error = %e, "attribute job failed");
                self.error = Some(e);
                false
            }
        }
    }
}

/// Encodes one attribute along the shared point sequence.
pub struct EncodeJob<'a> {
    pub state: &'a mut AttributeCodecState,
    pub sequence: &'a [u32],
}

impl Job for EncodeJob<'_> {
    fn run(&mut self) -> bool {
        let result = self.state.encode(self.sequence);
        self.state.record(result)
    }
}

/// Decodes one attribute span.
pub struct DecodeJob<'a> {
    pub state: &'a mut AttributeCodecState,
    pub payload: &'a [u8],
    pub sequence: &'a [u32],
}

impl Job for DecodeJob<'_> {
    fn run(&mut self) -> bool {
        let result = self.state.decode(self.payload, self.sequence);
        self.state.record(result)
    }
}
