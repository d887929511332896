//! Uniform float quantization.
//!
//! The transform finds the per-component minimum and the largest
//! per-component extent. Values map onto `0..=2^bits - 1` over
//! `[min, min + range]` and are delta coded like integers. The bit count
//! travels with the bounds, so a decoder follows whatever the encoder used.

use smallvec::{smallvec, SmallVec};

use crate::core::{DecoderBuffer, EncoderBuffer};
use crate::util::{Error, Result};

/// Accepted quantization bit counts.
pub const QUANTIZATION_BITS: std::ops::RangeInclusive<u8> = 1..=30;

/// Bit count, origin and extent shared by all components of one attribute.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct QuantizationParams {
    pub bits: u8,
    pub mins: SmallVec<[f32; 4]>,
    /// Largest extent; infinite when it does not fit an `f32`.
    pub range: f32,
}

impl QuantizationParams {
    /// Bounds of `values` (packed f32, `components` per element).
    ///
    /// Non-finite values are skipped here; the encode pass rejects them.
    pub fn compute(values: &[f32], components: usize, bits: u8) -> Self {
        let mut mins: SmallVec<[f32; 4]> = smallvec![f32::INFINITY; components];
        let mut maxs: SmallVec<[f32; 4]> = smallvec![f32::NEG_INFINITY; components];
        for element in values.chunks_exact(components) {
            for (c, &v) in element.iter().enumerate() {
                if v.is_finite() {
                    mins[c] = mins[c].min(v);
                    maxs[c] = maxs[c].max(v);
                }
            }
        }

        let mut range = 0.0f64;
        for (min, max) in mins.iter_mut().zip(&maxs) {
            if *min > *max {
                // No finite value in this component.
                *min = 0.0;
            } else {
                range = range.max(f64::from(*max) - f64::from(*min));
            }
        }
        Self { bits, mins, range: range as f32 }
    }

    /// Layout: `bits: u8, components x min: f32, range: f32`.
    pub fn write(&self, out: &mut EncoderBuffer) -> Result<()> {
        out.write_u8(self.bits)?;
        for &min in &self.mins {
            out.write_f32(min)?;
        }
        out.write_f32(self.range)
    }

    pub fn read(buf: &mut DecoderBuffer<'_>, components: usize) -> Result<Self> {
        let bits = buf.read_u8()?;
        if !QUANTIZATION_BITS.contains(&bits) {
            return Err(Error::format(format!("{bits} quantization bits in stream")));
        }
        let mut mins = SmallVec::with_capacity(components);
        for _ in 0..components {
            mins.push(buf.read_f32()?);
        }
        let range = buf.read_f32()?;
        if !range.is_finite() || range < 0.0 || mins.iter().any(|m: &f32| !m.is_finite()) {
            return Err(Error::format("invalid quantization bounds"));
        }
        Ok(Self { bits, mins, range })
    }
}

fn max_quantized(bits: u8) -> Result<i64> {
    if !QUANTIZATION_BITS.contains(&bits) {
        return Err(Error::precondition(format!(
            "{bits} quantization bits outside {QUANTIZATION_BITS:?}"
        )));
    }
    Ok((1i64 << bits) - 1)
}

pub(super) fn encode(ordered: &[f32], params: &QuantizationParams, out: &mut EncoderBuffer) -> Result<()> {
    let max_q = max_quantized(params.bits)?;
    if !params.range.is_finite() {
        return Err(Error::precondition("value range exceeds the f32 domain"));
    }
    let components = params.mins.len();
    let scale = if params.range > 0.0 { max_q as f64 / f64::from(params.range) } else { 0.0 };

    let mut prev: SmallVec<[i64; 4]> = smallvec![0; components];
    for element in ordered.chunks_exact(components) {
        for (c, &v) in element.iter().enumerate() {
            if !v.is_finite() {
                return Err(Error::precondition(format!("non-finite value {v}")));
            }
            let q = ((f64::from(v) - f64::from(params.mins[c])) * scale).round() as i64;
            let q = q.clamp(0, max_q);
            out.write_signed_varint(q - prev[c]);
            prev[c] = q;
        }
    }
    Ok(())
}

pub(super) fn decode(
    buf: &mut DecoderBuffer<'_>,
    params: &QuantizationParams,
    count: usize,
    out: &mut Vec<f32>,
) -> Result<()> {
    let max_q = max_quantized(params.bits).map_err(|e| Error::format(e.to_string()))?;
    let components = params.mins.len();
    let step = f64::from(params.range) / max_q as f64;

    let mut prev: SmallVec<[i64; 4]> = smallvec![0; components];
    for _ in 0..count {
        for c in 0..components {
            let q = prev[c]
                .checked_add(buf.read_signed_varint()?)
                .filter(|q| (0..=max_q).contains(q))
                .ok_or_else(|| Error::format("quantized value out of range"))?;
            let value = f64::from(params.mins[c]) + q as f64 * step;
            out.push(value.clamp(f64::from(f32::MIN), f64::from(f32::MAX)) as f32);
            prev[c] = q;
        }
    }
    Ok(())
}
