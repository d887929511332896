//! Per-point attribute declarations and payload buffers.

use crate::util::{AttributeSemantic, DataType, Error, MeshPod, NumericType, Result, Vec2, Vec3};

/// Index of an attribute within a session's attribute set.
///
/// Assigned in declaration order when the options are built and stable
/// for the life of the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeId(pub u8);

impl AttributeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for AttributeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Declaration of one attribute channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeDescriptor {
    pub semantic: AttributeSemantic,
    pub data_type: DataType,
    /// Quantization bit count; 0 disables quantization.
    pub quantization_bits: u8,
}

impl AttributeDescriptor {
    pub const fn new(semantic: AttributeSemantic, data_type: DataType) -> Self {
        Self { semantic, data_type, quantization_bits: 0 }
    }

    /// Float32 x3 positions quantized to `bits` (0 = lossless passthrough).
    pub const fn position(bits: u8) -> Self {
        Self { semantic: AttributeSemantic::Position, data_type: DataType::VEC3F, quantization_bits: bits }
    }

    /// Float32 x3 unit normals, octahedral quantized when `bits > 0`.
    pub const fn normal(bits: u8) -> Self {
        Self { semantic: AttributeSemantic::Normal, data_type: DataType::VEC3F, quantization_bits: bits }
    }

    /// One byte per point, one bit per viewport.
    pub const fn visibility() -> Self {
        Self::new(AttributeSemantic::Generic, DataType::UINT8)
    }

    /// RGB8 vertex colors.
    pub const fn color() -> Self {
        Self::new(AttributeSemantic::Color, DataType::RGB8)
    }

    /// Float32 x2 texture coordinates.
    pub const fn tex_coords(bits: u8) -> Self {
        Self { semantic: AttributeSemantic::TexCoord, data_type: DataType::VEC2F, quantization_bits: bits }
    }

    /// Set quantization bits.
    pub const fn with_quantization(mut self, bits: u8) -> Self {
        self.quantization_bits = bits;
        self
    }

    /// Size in bytes of one element.
    #[inline]
    pub const fn element_size(&self) -> usize {
        self.data_type.num_bytes()
    }

    #[inline]
    pub const fn components(&self) -> usize {
        self.data_type.components as usize
    }

    #[inline]
    pub const fn numeric_type(&self) -> NumericType {
        self.data_type.numeric
    }

    /// The visibility channel: a single-byte Generic attribute.
    pub fn is_visibility(&self) -> bool {
        self.semantic == AttributeSemantic::Generic && self.data_type == DataType::UINT8
    }
}

/// Raw attribute payload: `count` elements of `element_size` bytes spaced
/// `stride` bytes apart, in native byte order.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeBuffer {
    data: Vec<u8>,
    stride: usize,
    element_size: usize,
    count: usize,
}

impl AttributeBuffer {
    /// Wrap a possibly strided byte payload without copying.
    pub fn new(data: Vec<u8>, stride: usize, element_size: usize, count: usize) -> Result<Self> {
        if element_size == 0 || stride < element_size {
            return Err(Error::precondition(format!(
                "invalid attribute layout: stride {stride}, element size {element_size}"
            )));
        }
        let needed = if count == 0 { 0 } else { (count - 1) * stride + element_size };
        if data.len() < needed {
            return Err(Error::precondition(format!(
                "attribute payload holds {} bytes, {count} elements need {needed}",
                data.len()
            )));
        }
        Ok(Self { data, stride, element_size, count })
    }

    /// Tightly packed payload of `element_size` byte elements.
    pub fn packed(data: Vec<u8>, element_size: usize) -> Result<Self> {
        if element_size == 0 || data.len() % element_size != 0 {
            return Err(Error::precondition(format!(
                "payload of {} bytes is not a multiple of element size {element_size}",
                data.len()
            )));
        }
        let count = data.len() / element_size;
        Self::new(data, element_size, element_size, count)
    }

    /// Copy `count` elements out of a strided source into a packed buffer.
    pub fn from_strided(src: &[u8], stride: usize, element_size: usize, count: usize) -> Result<Self> {
        let strided = Self::new(src.to_vec(), stride, element_size, count)?;
        Ok(strided.to_packed())
    }

    /// Packed buffer from typed components; `components` values per element.
    pub fn from_values<T: MeshPod>(values: &[T], components: usize) -> Result<Self> {
        let element_size = std::mem::size_of::<T>() * components;
        Self::packed(bytemuck::cast_slice(values).to_vec(), element_size)
    }

    pub fn from_vec3(values: &[Vec3]) -> Self {
        let data: Vec<u8> = bytemuck::cast_slice(values).to_vec();
        Self { count: values.len(), stride: 12, element_size: 12, data }
    }

    pub fn from_vec2(values: &[Vec2]) -> Self {
        let data: Vec<u8> = bytemuck::cast_slice(values).to_vec();
        Self { count: values.len(), stride: 8, element_size: 8, data }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Bytes of element `i`.
    ///
    /// # Panics
    /// Panics if `i >= len()`.
    #[inline]
    pub fn element(&self, i: usize) -> &[u8] {
        let start = i * self.stride;
        &self.data[start..start + self.element_size]
    }

    /// Copy into a buffer with `stride == element_size`.
    pub fn to_packed(&self) -> Self {
        Self {
            data: self.to_packed_bytes(),
            stride: self.element_size,
            element_size: self.element_size,
            count: self.count,
        }
    }

    /// Element bytes without stride padding, in element order.
    pub fn to_packed_bytes(&self) -> Vec<u8> {
        if self.stride == self.element_size {
            return self.data[..self.count * self.element_size].to_vec();
        }
        let mut data = Vec::with_capacity(self.count * self.element_size);
        for i in 0..self.count {
            data.extend_from_slice(self.element(i));
        }
        data
    }

    /// Check this buffer against a declaration and an expected point count.
    pub fn check_layout(&self, descriptor: &AttributeDescriptor, point_count: usize) -> Result<()> {
        if self.element_size != descriptor.element_size() {
            return Err(Error::precondition(format!(
                "{} attribute expects {} byte elements, got {}",
                descriptor.semantic,
                descriptor.element_size(),
                self.element_size
            )));
        }
        if self.count != point_count {
            return Err(Error::precondition(format!(
                "{} attribute has {} elements for {point_count} points",
                descriptor.semantic, self.count
            )));
        }
        Ok(())
    }
}
