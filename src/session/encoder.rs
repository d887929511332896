//! Frame encoder session.

use crate::attributes::encode_attributes;
use crate::connectivity::{ConnectivityCodec, ConnectivityStateCache};
use crate::core::{EncoderBuffer, FrameHeader, FrameKind, HeaderMode, ProfileScope, ProfilerHandle, HEADER_SIZE};
use crate::geom::{AttributeBuffer, Face, Frame};
use crate::jobs::AttributeScheduler;
use crate::util::{Error, Result};

use super::options::{CodecOptions, SessionBuilder, SessionParts};

/// Encodes a sequence of frames into self-contained buffers.
///
/// The first frame must be a full frame. Incremental frames reuse the
/// connectivity of the last full frame that encoded successfully and write
/// attribute data only. A failed frame changes nothing: no buffer is
/// returned, the frame index stays put and the cached connectivity is kept.
pub struct FrameEncoder {
    options: CodecOptions,
    profiler: ProfilerHandle,
    scheduler: AttributeScheduler,
    connectivity: Box<dyn ConnectivityCodec>,
    cache: ConnectivityStateCache,
    frame_index: u32,
    last_error: Option<String>,
}

impl FrameEncoder {
    /// Encoder with default capabilities: sequential jobs, no profiler.
    pub fn new(options: CodecOptions) -> Result<Self> {
        SessionBuilder::new(options).build_encoder()
    }

    pub(crate) fn from_parts(parts: SessionParts) -> Self {
        Self {
            options: parts.options,
            profiler: parts.profiler,
            scheduler: parts.scheduler,
            connectivity: parts.connectivity,
            cache: ConnectivityStateCache::new(),
            frame_index: 0,
            last_error: None,
        }
    }

    #[inline]
    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Index the next frame will carry.
    #[inline]
    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    /// True when incremental frames can be encoded.
    #[inline]
    pub fn has_connectivity(&self) -> bool {
        self.cache.is_cached()
    }

    #[inline]
    pub fn is_parallel(&self) -> bool {
        self.scheduler.is_parallel()
    }

    /// Message of the most recent failure, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Change position quantization.
    ///
    /// The encoder kind of the position attribute changes with it, so the
    /// cached connectivity is dropped and the next frame must be full.
    pub fn set_position_quantization_bits(&mut self, bits: u8) {
        if bits == self.options.position_quantization_bits() {
            return;
        }
        tracing::debug!(bits, "position quantization changed, next frame must be full");
        self.options.set_position_quantization_bits(bits);
        self.cache.invalidate();
    }

    /// Encode a frame carrying new connectivity.
    #[tracing::instrument(skip_all, fields(frame = self.frame_index, points = point_count, faces = faces.len()))]
    pub fn encode_full(
        &mut self,
        point_count: usize,
        faces: &[Face],
        attributes: &[AttributeBuffer],
    ) -> Result<Vec<u8>> {
        let result = self.encode_frame(FrameKind::Full, point_count, faces, attributes);
        self.track(result)
    }

    /// Encode a frame that reuses the last full frame's connectivity.
    #[tracing::instrument(skip_all, fields(frame = self.frame_index, points = point_count))]
    pub fn encode_incremental(
        &mut self,
        point_count: usize,
        attributes: &[AttributeBuffer],
    ) -> Result<Vec<u8>> {
        let result = self.encode_frame(FrameKind::Incremental, point_count, &[], attributes);
        self.track(result)
    }

    /// Encode `frame` according to its kind.
    pub fn encode(&mut self, frame: &Frame) -> Result<Vec<u8>> {
        match frame.kind {
            FrameKind::Full => self.encode_full(frame.point_count, &frame.faces, &frame.attributes),
            FrameKind::Incremental => self.encode_incremental(frame.point_count, &frame.attributes),
        }
    }

    fn track(&mut self, result: Result<Vec<u8>>) -> Result<Vec<u8>> {
        match &result {
            Ok(bytes) => {
                tracing::debug!(bytes = bytes.len(), "frame encoded");
                self.last_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "frame encode failed");
                self.last_error = Some(e.to_string());
            }
        }
        result
    }

    fn encode_frame(
        &mut self,
        kind: FrameKind,
        point_count: usize,
        faces: &[Face],
        attributes: &[AttributeBuffer],
    ) -> Result<Vec<u8>> {
        let _frame_scope = ProfileScope::new(self.profiler.as_ref(), "FrameEncoder::encode");
        let mut out = EncoderBuffer::with_capacity(HEADER_SIZE + faces.len() * 6);

        if self.options.header_mode() == HeaderMode::Present {
            FrameHeader::new(kind, self.frame_index, self.options.decode_multiplier()).encode(&mut out)?;
        }

        let pending = match kind {
            FrameKind::Full => {
                let _scope = ProfileScope::new(self.profiler.as_ref(), "connectivity");
                self.connectivity.encode_connectivity(point_count, faces, &mut out)?;
                Some(ConnectivityStateCache::capture(self.connectivity.as_ref()))
            }
            FrameKind::Incremental => {
                let cached = self.cache.point_count().ok_or_else(|| {
                    Error::precondition("incremental frame before any full frame in this session")
                })?;
                if cached != point_count {
                    return Err(Error::precondition(format!(
                        "incremental frame has {point_count} points, connectivity has {cached}"
                    )));
                }
                self.cache.install(self.connectivity.as_mut())?;
                None
            }
        };

        {
            let _scope = ProfileScope::new(self.profiler.as_ref(), "attributes");
            let sequence = self.connectivity.state().point_sequence();
            encode_attributes(
                self.options.attributes(),
                attributes,
                sequence,
                self.options.compression_level(),
                &self.scheduler,
                &mut out,
            )?;
        }

        if let Some(snapshot) = pending {
            self.cache.commit(snapshot);
        }
        self.frame_index = self.frame_index.wrapping_add(1);
        Ok(out.into_inner())
    }
}

impl std::fmt::Debug for FrameEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameEncoder")
            .field("options", &self.options)
            .field("connectivity", &self.connectivity.name())
            .field("scheduler", &self.scheduler)
            .field("frame_index", &self.frame_index)
            .field("cached", &self.cache.is_cached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Vec3;

    const QUAD: [Face; 2] = [[0, 1, 2], [0, 2, 3]];

    fn positions(z: f32) -> Vec<AttributeBuffer> {
        vec![AttributeBuffer::from_vec3(&[
            Vec3::new(0.0, 0.0, z),
            Vec3::new(1.0, 0.0, z),
            Vec3::new(1.0, 1.0, z),
            Vec3::new(0.0, 1.0, z),
        ])]
    }

    #[test]
    fn test_incremental_requires_full() {
        let mut encoder = FrameEncoder::new(CodecOptions::new()).unwrap();
        let err = encoder.encode_incremental(4, &positions(0.0)).unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
        assert!(encoder.last_error().is_some());
        assert_eq!(encoder.frame_index(), 0);
        assert!(!encoder.has_connectivity());
    }

    #[test]
    fn test_frame_index_and_header() {
        let mut encoder = FrameEncoder::new(CodecOptions::new()).unwrap();
        let full = encoder.encode_full(4, &QUAD, &positions(0.0)).unwrap();
        let inc = encoder.encode_incremental(4, &positions(1.0)).unwrap();
        assert_eq!(encoder.frame_index(), 2);
        assert!(encoder.last_error().is_none());
        assert_eq!(full[6], FrameKind::Full.to_u8());
        assert_eq!(inc[6], FrameKind::Incremental.to_u8());
        assert_eq!(&inc[7..11], &1u32.to_le_bytes());
        assert!(inc.len() < full.len());
    }

    #[test]
    fn test_point_count_mismatch() {
        let mut encoder = FrameEncoder::new(CodecOptions::new()).unwrap();
        encoder.encode_full(4, &QUAD, &positions(0.0)).unwrap();
        let err = encoder.encode_incremental(5, &positions(0.0)).unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
        assert_eq!(encoder.frame_index(), 1);
    }

    #[test]
    fn test_failed_full_keeps_snapshot() {
        let mut encoder = FrameEncoder::new(CodecOptions::new()).unwrap();
        encoder.encode_full(4, &QUAD, &positions(0.0)).unwrap();
        // Wrong element count for a 3-point full frame.
        assert!(encoder.encode_full(3, &[[0, 1, 2]], &positions(0.0)).is_err());
        assert_eq!(encoder.frame_index(), 1);
        // The 4-point connectivity is still the cached one.
        encoder.encode_incremental(4, &positions(2.0)).unwrap();
    }

    #[test]
    fn test_quantization_change_requires_full() {
        let mut encoder = FrameEncoder::new(CodecOptions::new()).unwrap();
        encoder.encode_full(4, &QUAD, &positions(0.0)).unwrap();
        encoder.set_position_quantization_bits(14);
        assert!(!encoder.has_connectivity());
        assert!(encoder.encode_incremental(4, &positions(0.0)).is_err());
        encoder.encode_full(4, &QUAD, &positions(0.0)).unwrap();
        encoder.encode_incremental(4, &positions(0.5)).unwrap();
    }
}
