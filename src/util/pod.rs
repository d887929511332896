//! Numeric component types for per-point attribute data.

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Storage type of one attribute component.
///
/// Attribute payloads are stored as tightly packed native byte order
/// components of this type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum NumericType {
    /// Unsigned 8-bit integer
    Uint8 = 1,
    /// Signed 8-bit integer
    Int8 = 2,
    /// Unsigned 16-bit integer
    Uint16 = 3,
    /// Signed 16-bit integer
    Int16 = 4,
    /// Unsigned 32-bit integer
    Uint32 = 5,
    /// Signed 32-bit integer
    Int32 = 6,
    /// Unsigned 64-bit integer
    Uint64 = 7,
    /// Signed 64-bit integer
    Int64 = 8,
    /// 32-bit floating point (IEEE 754 single precision)
    Float32 = 9,
    /// 64-bit floating point (IEEE 754 double precision)
    Float64 = 10,
}

impl NumericType {
    /// Returns the size in bytes of a single component of this type.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Uint8 | Self::Int8 => 1,
            Self::Uint16 | Self::Int16 => 2,
            Self::Uint32 | Self::Int32 | Self::Float32 => 4,
            Self::Uint64 | Self::Int64 | Self::Float64 => 8,
        }
    }

    /// Returns the name of this type as a string.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uint8 => "uint8",
            Self::Int8 => "int8",
            Self::Uint16 => "uint16",
            Self::Int16 => "int16",
            Self::Uint32 => "uint32",
            Self::Int32 => "int32",
            Self::Uint64 => "uint64",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Integer types handled by the delta coder (8, 16 and 32 bit).
    ///
    /// 64-bit integers are not delta coded because their deltas can
    /// overflow the 64-bit zig-zag domain.
    #[inline]
    pub const fn is_delta_integer(self) -> bool {
        matches!(
            self,
            Self::Uint8 | Self::Int8 | Self::Uint16 | Self::Int16 | Self::Uint32 | Self::Int32
        )
    }

    /// Returns true if this is a floating point type.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Read one integer component from native-endian bytes.
    ///
    /// Returns `None` for float types or a short slice.
    pub fn read_integer(self, bytes: &[u8]) -> Option<i64> {
        if bytes.len() < self.num_bytes() {
            return None;
        }
        let v = match self {
            Self::Uint8 => bytes[0] as i64,
            Self::Int8 => bytes[0] as i8 as i64,
            Self::Uint16 => u16::from_ne_bytes([bytes[0], bytes[1]]) as i64,
            Self::Int16 => i16::from_ne_bytes([bytes[0], bytes[1]]) as i64,
            Self::Uint32 => u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as i64,
            Self::Int32 => i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as i64,
            Self::Uint64 => bytemuck::pod_read_unaligned::<u64>(&bytes[..8]) as i64,
            Self::Int64 => bytemuck::pod_read_unaligned::<i64>(&bytes[..8]),
            Self::Float32 | Self::Float64 => return None,
        };
        Some(v)
    }

    /// Value range of an integer component, `None` for floats.
    pub const fn integer_bounds(self) -> Option<(i64, i64)> {
        match self {
            Self::Uint8 => Some((0, u8::MAX as i64)),
            Self::Int8 => Some((i8::MIN as i64, i8::MAX as i64)),
            Self::Uint16 => Some((0, u16::MAX as i64)),
            Self::Int16 => Some((i16::MIN as i64, i16::MAX as i64)),
            Self::Uint32 => Some((0, u32::MAX as i64)),
            Self::Int32 => Some((i32::MIN as i64, i32::MAX as i64)),
            // 64-bit components travel as their i64 bit pattern.
            Self::Uint64 | Self::Int64 => Some((i64::MIN, i64::MAX)),
            Self::Float32 | Self::Float64 => None,
        }
    }

    /// Write one integer component as native-endian bytes.
    ///
    /// Values are truncated to the component width.
    pub fn write_integer(self, value: i64, out: &mut Vec<u8>) {
        match self {
            Self::Uint8 | Self::Int8 => out.push(value as u8),
            Self::Uint16 | Self::Int16 => out.extend_from_slice(&(value as u16).to_ne_bytes()),
            Self::Uint32 | Self::Int32 => out.extend_from_slice(&(value as u32).to_ne_bytes()),
            Self::Uint64 | Self::Int64 => out.extend_from_slice(&(value as u64).to_ne_bytes()),
            Self::Float32 => out.extend_from_slice(&(value as f32).to_ne_bytes()),
            Self::Float64 => out.extend_from_slice(&(value as f64).to_ne_bytes()),
        }
    }
}

impl fmt::Display for NumericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// === POD trait for typed attribute uploads ===

/// Rust types that map directly onto a [`NumericType`].
pub trait MeshPod: Pod + Zeroable + Copy + Default {
    /// The corresponding NumericType value.
    const NUMERIC_TYPE: NumericType;
}

impl MeshPod for u8 {
    const NUMERIC_TYPE: NumericType = NumericType::Uint8;
}

impl MeshPod for i8 {
    const NUMERIC_TYPE: NumericType = NumericType::Int8;
}

impl MeshPod for u16 {
    const NUMERIC_TYPE: NumericType = NumericType::Uint16;
}

impl MeshPod for i16 {
    const NUMERIC_TYPE: NumericType = NumericType::Int16;
}

impl MeshPod for u32 {
    const NUMERIC_TYPE: NumericType = NumericType::Uint32;
}

impl MeshPod for i32 {
    const NUMERIC_TYPE: NumericType = NumericType::Int32;
}

impl MeshPod for u64 {
    const NUMERIC_TYPE: NumericType = NumericType::Uint64;
}

impl MeshPod for i64 {
    const NUMERIC_TYPE: NumericType = NumericType::Int64;
}

impl MeshPod for f32 {
    const NUMERIC_TYPE: NumericType = NumericType::Float32;
}

impl MeshPod for f64 {
    const NUMERIC_TYPE: NumericType = NumericType::Float64;
}
