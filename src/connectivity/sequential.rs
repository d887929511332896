//! Sequential connectivity codec: faces are written in input order.
//!
//! Wire layout:
//! `geometry_type: u8 (1 = triangular mesh), method: u8, num_points: u32,
//! num_faces: u32`, then `3 * num_faces` point indices coded per `method`.

use super::codec::ConnectivityCodec;
use super::snapshot::{ConnectivitySnapshot, TraversalState};
use crate::core::{DecoderBuffer, EncoderBuffer};
use crate::geom::Face;
use crate::util::{Error, Result};

/// Geometry type tag for triangular meshes.
pub const GEOMETRY_TRIANGULAR_MESH: u8 = 1;

/// Largest point count accepted in either direction.
pub const MAX_POINT_COUNT: usize = 1 << 24;

/// How point indices are written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum IndexMethod {
    /// u8, u16 or u32 per index depending on the point count.
    FixedWidth,
    /// Zig-zag varint of the difference to the previous index.
    #[default]
    DeltaVarint,
}

impl IndexMethod {
    /// Method chosen for a codec compression level.
    pub fn for_compression_level(level: u8) -> Self {
        if level == 0 {
            Self::FixedWidth
        } else {
            Self::DeltaVarint
        }
    }

    const fn to_u8(self) -> u8 {
        match self {
            Self::FixedWidth => 0,
            Self::DeltaVarint => 1,
        }
    }

    fn from_u8(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Self::FixedWidth),
            1 => Ok(Self::DeltaVarint),
            other => Err(Error::format(format!("unknown index method {other}"))),
        }
    }
}

/// Bytes per index for the fixed-width method.
fn index_width(point_count: usize) -> usize {
    if point_count < 1 << 8 {
        1
    } else if point_count < 1 << 16 {
        2
    } else {
        4
    }
}

/// The connectivity codec sessions use unless another one is injected.
#[derive(Clone, Debug, Default)]
pub struct SequentialConnectivityCodec {
    method: IndexMethod,
    state: TraversalState,
}

impl SequentialConnectivityCodec {
    pub fn new(method: IndexMethod) -> Self {
        Self { method, state: TraversalState::default() }
    }

    pub fn method(&self) -> IndexMethod {
        self.method
    }
}

impl ConnectivityCodec for SequentialConnectivityCodec {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn encode_connectivity(
        &mut self,
        point_count: usize,
        faces: &[Face],
        out: &mut EncoderBuffer,
    ) -> Result<()> {
        if point_count > MAX_POINT_COUNT {
            return Err(Error::precondition(format!(
                "{point_count} points exceed the limit of {MAX_POINT_COUNT}"
            )));
        }
        if let Some((f, face)) = faces
            .iter()
            .enumerate()
            .find(|(_, face)| face.iter().any(|&p| p as usize >= point_count))
        {
            return Err(Error::precondition(format!(
                "face {f} {face:?} references a point outside 0..{point_count}"
            )));
        }

        out.write_u8(GEOMETRY_TRIANGULAR_MESH)?;
        out.write_u8(self.method.to_u8())?;
        out.write_len(point_count)?;
        out.write_len(faces.len())?;

        match self.method {
            IndexMethod::FixedWidth => {
                let width = index_width(point_count);
                for &p in faces.iter().flatten() {
                    match width {
                        1 => out.write_u8(p as u8)?,
                        2 => out.write_u16(p as u16)?,
                        _ => out.write_u32(p)?,
                    }
                }
            }
            IndexMethod::DeltaVarint => {
                let mut prev = 0i64;
                for &p in faces.iter().flatten() {
                    out.write_signed_varint(i64::from(p) - prev);
                    prev = i64::from(p);
                }
            }
        }

        self.state = TraversalState::derive(point_count, faces);
        Ok(())
    }

    fn decode_connectivity(&mut self, buf: &mut DecoderBuffer<'_>) -> Result<()> {
        let geometry_type = buf.read_u8()?;
        if geometry_type != GEOMETRY_TRIANGULAR_MESH {
            return Err(Error::format(format!("unsupported geometry type {geometry_type}")));
        }
        let method = IndexMethod::from_u8(buf.read_u8()?)?;
        let point_count = buf.read_u32()? as usize;
        if point_count > MAX_POINT_COUNT {
            return Err(Error::format(format!("point count {point_count} exceeds the limit")));
        }
        let num_faces = buf.read_u32()? as usize;

        // Every index takes at least one byte; reject counts the stream
        // cannot possibly hold before allocating for them.
        let min_bytes = match method {
            IndexMethod::FixedWidth => index_width(point_count),
            IndexMethod::DeltaVarint => 1,
        };
        let needed = num_faces.saturating_mul(3).saturating_mul(min_bytes);
        if needed > buf.remaining() {
            return Err(Error::UnexpectedEof { needed, remaining: buf.remaining() });
        }

        let mut faces = Vec::with_capacity(num_faces);
        let mut prev = 0i64;
        for _ in 0..num_faces {
            let mut face = [0u32; 3];
            for slot in face.iter_mut() {
                let index = match method {
                    IndexMethod::FixedWidth => match index_width(point_count) {
                        1 => i64::from(buf.read_u8()?),
                        2 => i64::from(buf.read_u16()?),
                        _ => i64::from(buf.read_u32()?),
                    },
                    IndexMethod::DeltaVarint => {
                        let delta = buf.read_signed_varint()?;
                        prev.checked_add(delta)
                            .ok_or_else(|| Error::format("index delta overflows"))?
                    }
                };
                if index < 0 || index as u64 >= point_count as u64 {
                    return Err(Error::format(format!(
                        "point index {index} outside 0..{point_count}"
                    )));
                }
                prev = index;
                *slot = index as u32;
            }
            faces.push(face);
        }

        self.state = TraversalState::derive(point_count, &faces);
        Ok(())
    }

    fn state(&self) -> &TraversalState {
        &self.state
    }

    fn install_state(&mut self, snapshot: &ConnectivitySnapshot) {
        self.state = snapshot.to_state();
    }
}
