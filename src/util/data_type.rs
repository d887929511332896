//! DataType - combines a numeric component type with a component count,
//! and the semantic channel an attribute represents.

use super::NumericType;
use std::fmt;

/// DataType describes how one attribute element is stored.
///
/// It combines a [`NumericType`] with a component count.
/// For example, a position is Float32 with 3 components.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataType {
    /// The component storage type
    pub numeric: NumericType,
    /// Number of components per element (1 for scalar, 3 for Vec3, etc.)
    pub components: u8,
}

impl DataType {
    /// Create a new DataType with given component type and count.
    #[inline]
    pub const fn new(numeric: NumericType, components: u8) -> Self {
        Self { numeric, components }
    }

    /// Returns the total size in bytes for one element.
    #[inline]
    pub const fn num_bytes(&self) -> usize {
        self.numeric.num_bytes() * self.components as usize
    }

    pub const UINT8: Self = Self::new(NumericType::Uint8, 1);
    pub const RGB8: Self = Self::new(NumericType::Uint8, 3);
    pub const RGBA8: Self = Self::new(NumericType::Uint8, 4);
    pub const VEC2F: Self = Self::new(NumericType::Float32, 2);
    pub const VEC3F: Self = Self::new(NumericType::Float32, 3);
    pub const VEC4F: Self = Self::new(NumericType::Float32, 4);
}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components == 1 {
            write!(f, "{}", self.numeric.name())
        } else {
            write!(f, "{}[{}]", self.numeric.name(), self.components)
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Semantic channel of a per-point attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeSemantic {
    /// Point positions.
    Position,
    /// Unit normal vectors.
    Normal,
    /// Vertex colors.
    Color,
    /// Texture coordinates.
    TexCoord,
    /// Anything else, including per-viewport visibility masks.
    Generic,
}

impl AttributeSemantic {
    /// Returns the name of this semantic as a string.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Normal => "normal",
            Self::Color => "color",
            Self::TexCoord => "tex_coord",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for AttributeSemantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_sizes() {
        assert_eq!(DataType::UINT8.num_bytes(), 1);
        assert_eq!(DataType::RGB8.num_bytes(), 3);
        assert_eq!(DataType::VEC2F.num_bytes(), 8);
        assert_eq!(DataType::VEC3F.num_bytes(), 12);
    }

    #[test]
    fn test_data_type_display() {
        assert_eq!(format!("{}", DataType::UINT8), "uint8");
        assert_eq!(format!("{}", DataType::VEC3F), "float32[3]");
        assert_eq!(AttributeSemantic::TexCoord.to_string(), "tex_coord");
    }
}
