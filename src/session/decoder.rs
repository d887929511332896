//! Frame decoder session.

use crate::attributes::decode_attributes;
use crate::connectivity::{ConnectivityCodec, ConnectivityStateCache};
use crate::core::{DecoderBuffer, FrameHeader, FrameKind, HeaderMode, ProfileScope, ProfilerHandle};
use crate::geom::DecodedMesh;
use crate::jobs::AttributeScheduler;
use crate::util::{Error, Result};

use super::options::{CodecOptions, SessionBuilder, SessionParts};

/// Decodes buffers produced by a [`FrameEncoder`](super::FrameEncoder)
/// configured with the same [`CodecOptions`].
///
/// Incremental frames are rebuilt on the connectivity of the last full
/// frame this decoder accepted. With headers present, an incremental frame
/// must also carry a later frame index than the previous decoded frame,
/// compared with wrapping arithmetic.
pub struct FrameDecoder {
    options: CodecOptions,
    profiler: ProfilerHandle,
    scheduler: AttributeScheduler,
    connectivity: Box<dyn ConnectivityCodec>,
    cache: ConnectivityStateCache,
    last_index: Option<u32>,
    last_error: Option<String>,
}

impl FrameDecoder {
    pub fn new(options: CodecOptions) -> Result<Self> {
        SessionBuilder::new(options).build_decoder()
    }

    pub(crate) fn from_parts(parts: SessionParts) -> Self {
        Self {
            options: parts.options,
            profiler: parts.profiler,
            scheduler: parts.scheduler,
            connectivity: parts.connectivity,
            cache: ConnectivityStateCache::new(),
            last_index: None,
            last_error: None,
        }
    }

    #[inline]
    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Frame index of the last successfully decoded frame (headers only).
    #[inline]
    pub fn last_frame_index(&self) -> Option<u32> {
        self.last_index
    }

    #[inline]
    pub fn has_connectivity(&self) -> bool {
        self.cache.is_cached()
    }

    #[inline]
    pub fn is_parallel(&self) -> bool {
        self.scheduler.is_parallel()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Decode one frame.
    ///
    /// Header-less sessions treat every buffer as a full frame; use
    /// [`decode_as`](Self::decode_as) for their incremental frames.
    #[tracing::instrument(skip_all, fields(bytes = bytes.len()))]
    pub fn decode(&mut self, bytes: &[u8]) -> Result<DecodedMesh> {
        let result = self.decode_frame(bytes, None);
        self.track(result)
    }

    /// Decode one frame the caller knows to be of `kind`.
    ///
    /// With headers present the header must agree with `kind`.
    #[tracing::instrument(skip_all, fields(bytes = bytes.len(), ?kind))]
    pub fn decode_as(&mut self, bytes: &[u8], kind: FrameKind) -> Result<DecodedMesh> {
        let result = self.decode_frame(bytes, Some(kind));
        self.track(result)
    }

    fn track(&mut self, result: Result<DecodedMesh>) -> Result<DecodedMesh> {
        match &result {
            Ok(mesh) => {
                tracing::debug!(points = mesh.num_points(), faces = mesh.num_faces(), "frame decoded");
                self.last_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "frame decode failed");
                self.last_error = Some(e.to_string());
            }
        }
        result
    }

    fn decode_frame(&mut self, bytes: &[u8], expected: Option<FrameKind>) -> Result<DecodedMesh> {
        let _frame_scope = ProfileScope::new(self.profiler.as_ref(), "FrameDecoder::decode");
        let mut buf = DecoderBuffer::new(bytes);

        let header = match self.options.header_mode() {
            HeaderMode::Present => Some(FrameHeader::decode(&mut buf)?),
            HeaderMode::Absent => None,
        };
        let kind = match (header, expected) {
            (Some(h), Some(kind)) if h.frame_kind != kind => {
                return Err(Error::format(format!(
                    "header announces a {:?} frame, caller expected {kind:?}",
                    h.frame_kind
                )));
            }
            (Some(h), _) => h.frame_kind,
            (None, kind) => kind.unwrap_or_default(),
        };

        let pending = match kind {
            FrameKind::Full => {
                let _scope = ProfileScope::new(self.profiler.as_ref(), "connectivity");
                self.connectivity.decode_connectivity(&mut buf)?;
                Some(ConnectivityStateCache::capture(self.connectivity.as_ref()))
            }
            FrameKind::Incremental => {
                if let (Some(h), Some(last)) = (header, self.last_index) {
                    if !follows(h.frame_index, last) {
                        return Err(Error::format(format!(
                            "incremental frame {} does not follow frame {last}",
                            h.frame_index
                        )));
                    }
                }
                self.cache.install(self.connectivity.as_mut())?;
                None
            }
        };

        let mesh = {
            let _scope = ProfileScope::new(self.profiler.as_ref(), "attributes");
            let state = self.connectivity.state();
            let attributes = decode_attributes(
                self.options.attributes(),
                &mut buf,
                state.point_sequence(),
                &self.scheduler,
            )?;
            if buf.remaining() != 0 {
                return Err(Error::format(format!("{} trailing bytes after frame", buf.remaining())));
            }
            DecodedMesh {
                header,
                kind,
                point_count: state.point_count(),
                faces: state.faces(),
                attributes,
            }
        };

        if let Some(snapshot) = pending {
            self.cache.commit(snapshot);
        }
        if let Some(h) = header {
            self.last_index = Some(h.frame_index);
        }
        Ok(mesh)
    }
}

impl std::fmt::Debug for FrameDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameDecoder")
            .field("options", &self.options)
            .field("connectivity", &self.connectivity.name())
            .field("scheduler", &self.scheduler)
            .field("last_index", &self.last_index)
            .field("cached", &self.cache.is_cached())
            .finish()
    }
}

/// Serial-number order on the wrapping frame index: `index` is ahead of
/// `last` by less than half the `u32` space.
#[inline]
fn follows(index: u32, last: u32) -> bool {
    (index.wrapping_sub(last) as i32) > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{AttributeBuffer, Face};
    use crate::session::FrameEncoder;
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
    fn test_incremental_before_full() {
        let mut encoder = FrameEncoder::new(CodecOptions::new()).unwrap();
        encoder.encode_full(4, &QUAD, &positions(0.0)).unwrap();
        let inc = encoder.encode_incremental(4, &positions(1.0)).unwrap();

        let mut decoder = FrameDecoder::new(CodecOptions::new()).unwrap();
        let err = decoder.decode(&inc).unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
        assert!(decoder.last_error().is_some());
    }

    #[test]
    fn test_stale_incremental_rejected() {
        let mut encoder = FrameEncoder::new(CodecOptions::new()).unwrap();
        let full = encoder.encode_full(4, &QUAD, &positions(0.0)).unwrap();
        let inc = encoder.encode_incremental(4, &positions(1.0)).unwrap();

        let mut decoder = FrameDecoder::new(CodecOptions::new()).unwrap();
        decoder.decode(&full).unwrap();
        decoder.decode(&inc).unwrap();
        assert_eq!(decoder.last_frame_index(), Some(1));
        assert!(decoder.decode(&inc).unwrap_err().is_format_error());
        assert!(decoder.last_error().is_some());
    }

    #[test]
    fn test_frame_index_wraps() {
        assert!(follows(1, 0));
        assert!(follows(0, u32::MAX));
        assert!(follows(3, u32::MAX - 2));
        assert!(!follows(7, 7));
        assert!(!follows(u32::MAX, 0));

        let mut encoder = FrameEncoder::new(CodecOptions::new()).unwrap();
        let mut full = encoder.encode_full(4, &QUAD, &positions(0.0)).unwrap();
        let mut inc = encoder.encode_incremental(4, &positions(1.0)).unwrap();
        full[7..11].copy_from_slice(&u32::MAX.to_le_bytes());
        inc[7..11].copy_from_slice(&0u32.to_le_bytes());

        let mut decoder = FrameDecoder::new(CodecOptions::new()).unwrap();
        decoder.decode(&full).unwrap();
        let mesh = decoder.decode(&inc).unwrap();
        assert_eq!(mesh.header().unwrap().frame_index, 0);
        assert_eq!(decoder.last_frame_index(), Some(0));
        assert!(decoder.decode(&inc).unwrap_err().is_format_error());
    }

    #[test]
    fn test_trailing_bytes() {
        let mut encoder = FrameEncoder::new(CodecOptions::new()).unwrap();
        let mut full = encoder.encode_full(4, &QUAD, &positions(0.0)).unwrap();
        full.push(0);
        let mut decoder = FrameDecoder::new(CodecOptions::new()).unwrap();
        assert!(decoder.decode(&full).unwrap_err().is_format_error());
        assert!(!decoder.has_connectivity());
    }

    #[test]
    fn test_decode_as_checks_header() {
        let mut encoder = FrameEncoder::new(CodecOptions::new()).unwrap();
        let full = encoder.encode_full(4, &QUAD, &positions(0.0)).unwrap();
        let mut decoder = FrameDecoder::new(CodecOptions::new()).unwrap();
        assert!(decoder.decode_as(&full, FrameKind::Incremental).is_err());
        let mesh = decoder.decode_as(&full, FrameKind::Full).unwrap();
        assert_eq!(mesh.num_faces(), 2);
    }
}
