//! Frame header written at the start of every header-carrying stream.
//!
//! Layout (11 bytes, little-endian):
//! `major_version: u8, minor_version: u8, decode_multiplier: f32,
//! frame_kind: u8, frame_index: u32`.

use super::buffer::{DecoderBuffer, EncoderBuffer};
use crate::util::{Error, Result};

/// Current stream major version. Streams with another major are rejected.
pub const MAJOR_VERSION: u8 = 1;

/// Current stream minor version.
pub const MINOR_VERSION: u8 = 0;

/// Size of the encoded header in bytes.
pub const HEADER_SIZE: usize = 11;

/// Whether a frame carries connectivity or reuses the cached one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum FrameKind {
    /// Complete connectivity plus all attributes.
    #[default]
    Full,
    /// Attributes only; connectivity comes from the last full frame.
    Incremental,
}

impl FrameKind {
    /// Wire tag of this kind.
    #[inline]
    pub const fn to_u8(self) -> u8 {
        match self {
            Self::Full => 0,
            Self::Incremental => 1,
        }
    }

    /// Parse a wire tag.
    pub fn from_u8(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Self::Full),
            1 => Ok(Self::Incremental),
            other => Err(Error::format(format!("unknown frame kind tag {other}"))),
        }
    }

    #[inline]
    pub const fn is_incremental(self) -> bool {
        matches!(self, Self::Incremental)
    }
}

/// Whether streams start with a [`FrameHeader`].
///
/// Fixed per session; the two framings are not mixed within one stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HeaderMode {
    /// Every frame begins with an 11-byte header.
    #[default]
    Present,
    /// Legacy framing: no header, frame kind is known out of band.
    Absent,
}

/// Parsed frame header.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameHeader {
    pub major_version: u8,
    pub minor_version: u8,
    /// Scale the consumer applies to quantized positions.
    pub decode_multiplier: f32,
    pub frame_kind: FrameKind,
    /// Monotonic per encoder session.
    pub frame_index: u32,
}

impl FrameHeader {
    /// Create a header for the current version.
    pub fn new(frame_kind: FrameKind, frame_index: u32, decode_multiplier: f32) -> Self {
        Self {
            major_version: MAJOR_VERSION,
            minor_version: MINOR_VERSION,
            decode_multiplier,
            frame_kind,
            frame_index,
        }
    }

    /// Serialize into `out`.
    pub fn encode(&self, out: &mut EncoderBuffer) -> Result<()> {
        out.write_u8(self.major_version)?;
        out.write_u8(self.minor_version)?;
        out.write_f32(self.decode_multiplier)?;
        out.write_u8(self.frame_kind.to_u8())?;
        out.write_u32(self.frame_index)?;
        Ok(())
    }

    /// Parse and validate a header.
    pub fn decode(buf: &mut DecoderBuffer<'_>) -> Result<Self> {
        let major_version = buf.read_u8()?;
        if major_version != MAJOR_VERSION {
            return Err(Error::UnsupportedVersion(major_version));
        }
        let minor_version = buf.read_u8()?;
        let decode_multiplier = buf.read_f32()?;
        if !decode_multiplier.is_finite() {
            return Err(Error::format("decode multiplier is not finite"));
        }
        let frame_kind = FrameKind::from_u8(buf.read_u8()?)?;
        let frame_index = buf.read_u32()?;
        Ok(Self {
            major_version,
            minor_version,
            decode_multiplier,
            frame_kind,
            frame_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let header = FrameHeader::new(FrameKind::Incremental, 7, 0.5);
        let mut out = EncoderBuffer::new();
        header.encode(&mut out).unwrap();
        assert_eq!(out.len(), HEADER_SIZE);
        assert_eq!(out.as_slice()[0], MAJOR_VERSION);
        assert_eq!(out.as_slice()[6], 1);
        assert_eq!(&out.as_slice()[7..], &7u32.to_le_bytes());

        let parsed = FrameHeader::decode(&mut DecoderBuffer::new(out.as_slice())).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_header_rejects_version() {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0] = 2;
        let err = FrameHeader::decode(&mut DecoderBuffer::new(&bytes)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion(2)));
    }

    #[test]
    fn test_header_rejects_kind() {
        let mut out = EncoderBuffer::new();
        FrameHeader::new(FrameKind::Full, 0, 1.0).encode(&mut out).unwrap();
        let mut bytes = out.into_inner();
        bytes[6] = 9;
        let err = FrameHeader::decode(&mut DecoderBuffer::new(&bytes)).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_header_truncated() {
        let err = FrameHeader::decode(&mut DecoderBuffer::new(&[MAJOR_VERSION, 0, 0])).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { .. }));
    }
}
