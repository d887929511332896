//! Frame input and decoded mesh output.

use super::attribute::{AttributeBuffer, AttributeDescriptor, AttributeId};
use crate::core::{FrameHeader, FrameKind};
use crate::util::{AttributeSemantic, Error, MeshPod, Result, Vec2, Vec3};

/// Triangle as three point indices.
pub type Face = [u32; 3];

/// One frame handed to an encoder.
#[derive(Clone, Debug)]
pub struct Frame {
    pub kind: FrameKind,
    pub point_count: usize,
    /// Ignored for incremental frames.
    pub faces: Vec<Face>,
    /// One buffer per session attribute, in attribute order.
    pub attributes: Vec<AttributeBuffer>,
}

impl Frame {
    /// A frame carrying new connectivity.
    pub fn full(point_count: usize, faces: Vec<Face>, attributes: Vec<AttributeBuffer>) -> Self {
        Self { kind: FrameKind::Full, point_count, faces, attributes }
    }

    /// A frame reusing the previous full frame's connectivity.
    pub fn incremental(point_count: usize, attributes: Vec<AttributeBuffer>) -> Self {
        Self { kind: FrameKind::Incremental, point_count, faces: Vec::new(), attributes }
    }
}

/// Decoded attribute values, packed and in point-index order.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedAttribute {
    pub id: AttributeId,
    pub descriptor: AttributeDescriptor,
    pub data: Vec<u8>,
}

impl DecodedAttribute {
    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len() / self.descriptor.element_size()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes of element `i`.
    pub fn element(&self, i: usize) -> &[u8] {
        let size = self.descriptor.element_size();
        &self.data[i * size..(i + 1) * size]
    }

    /// All components as `T`, or `None` if `T` does not match the
    /// declared component type.
    pub fn values<T: MeshPod>(&self) -> Option<Vec<T>> {
        if T::NUMERIC_TYPE != self.descriptor.numeric_type() {
            return None;
        }
        Some(bytemuck::pod_collect_to_vec(&self.data))
    }
}

/// Mesh reconstructed from one frame.
#[derive(Clone, Debug)]
pub struct DecodedMesh {
    pub(crate) header: Option<FrameHeader>,
    pub(crate) kind: FrameKind,
    pub(crate) point_count: usize,
    pub(crate) faces: Vec<Face>,
    pub(crate) attributes: Vec<DecodedAttribute>,
}

impl DecodedMesh {
    /// Header of the frame, absent for header-less sessions.
    pub fn header(&self) -> Option<&FrameHeader> {
        self.header.as_ref()
    }

    pub fn frame_kind(&self) -> FrameKind {
        self.kind
    }

    pub fn num_points(&self) -> usize {
        self.point_count
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Faces flattened into an index list.
    pub fn indices(&self) -> Vec<u32> {
        self.faces.iter().flatten().copied().collect()
    }

    pub fn attributes(&self) -> &[DecodedAttribute] {
        &self.attributes
    }

    pub fn attribute(&self, id: AttributeId) -> Option<&DecodedAttribute> {
        self.attributes.get(id.index())
    }

    /// First attribute with the given semantic.
    pub fn attribute_by_semantic(&self, semantic: AttributeSemantic) -> Option<&DecodedAttribute> {
        self.attributes.iter().find(|a| a.descriptor.semantic == semantic)
    }

    pub fn has_visibility(&self) -> bool {
        self.visibility_attribute().is_some()
    }

    pub fn has_color(&self) -> bool {
        self.attribute_by_semantic(AttributeSemantic::Color).is_some()
    }

    pub fn has_tex_coords(&self) -> bool {
        self.attribute_by_semantic(AttributeSemantic::TexCoord).is_some()
    }

    fn visibility_attribute(&self) -> Option<&DecodedAttribute> {
        self.attributes.iter().find(|a| a.descriptor.is_visibility())
    }

    /// Positions as decoded (before the header's decode multiplier).
    pub fn positions(&self) -> Option<Vec<Vec3>> {
        self.vec3_attribute(AttributeSemantic::Position)
    }

    /// Positions scaled by the header's decode multiplier.
    pub fn scaled_positions(&self) -> Option<Vec<Vec3>> {
        let scale = self.header.map_or(1.0, |h| h.decode_multiplier);
        self.positions().map(|p| p.into_iter().map(|v| v * scale).collect())
    }

    pub fn normals(&self) -> Option<Vec<Vec3>> {
        self.vec3_attribute(AttributeSemantic::Normal)
    }

    pub fn tex_coords(&self) -> Option<Vec<Vec2>> {
        let values = self.attribute_by_semantic(AttributeSemantic::TexCoord)?.values::<f32>()?;
        Some(values.chunks_exact(2).map(|c| Vec2::new(c[0], c[1])).collect())
    }

    /// Per-point visibility masks.
    pub fn visibility(&self) -> Option<&[u8]> {
        self.visibility_attribute().map(|a| a.data.as_slice())
    }

    /// Packed color bytes (3 or 4 per point depending on the declaration).
    pub fn colors(&self) -> Option<&[u8]> {
        self.attribute_by_semantic(AttributeSemantic::Color).map(|a| a.data.as_slice())
    }

    fn vec3_attribute(&self, semantic: AttributeSemantic) -> Option<Vec<Vec3>> {
        let attribute = self.attribute_by_semantic(semantic)?;
        if attribute.descriptor.components() != 3 {
            return None;
        }
        let values = attribute.values::<f32>()?;
        Some(values.chunks_exact(3).map(|c| Vec3::new(c[0], c[1], c[2])).collect())
    }

    /// Copy attribute `id` into `dst`, one element every `stride` bytes.
    pub fn copy_attribute_strided(&self, id: AttributeId, dst: &mut [u8], stride: usize) -> Result<()> {
        let attribute = self
            .attribute(id)
            .ok_or_else(|| Error::precondition(format!("no attribute {id}")))?;
        let size = attribute.descriptor.element_size();
        if stride < size {
            return Err(Error::precondition(format!(
                "stride {stride} is smaller than element size {size}"
            )));
        }
        let count = attribute.len();
        let needed = if count == 0 { 0 } else { (count - 1) * stride + size };
        if dst.len() < needed {
            return Err(Error::precondition(format!(
                "destination holds {} bytes, {count} elements need {needed}",
                dst.len()
            )));
        }
        if stride == size {
            dst[..attribute.data.len()].copy_from_slice(&attribute.data);
            return Ok(());
        }
        for (i, chunk) in attribute.data.chunks_exact(size).enumerate() {
            dst[i * stride..i * stride + size].copy_from_slice(chunk);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::DataType;

    fn sample_mesh() -> DecodedMesh {
        let positions: Vec<f32> = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        DecodedMesh {
            header: Some(FrameHeader::new(FrameKind::Full, 0, 2.0)),
            kind: FrameKind::Full,
            point_count: 3,
            faces: vec![[0, 1, 2]],
            attributes: vec![
                DecodedAttribute {
                    id: AttributeId(0),
                    descriptor: AttributeDescriptor::position(0),
                    data: bytemuck::cast_slice(&positions).to_vec(),
                },
                DecodedAttribute {
                    id: AttributeId(1),
                    descriptor: AttributeDescriptor::visibility(),
                    data: vec![1, 2, 4],
                },
            ],
        }
    }

    #[test]
    fn test_accessors() {
        let mesh = sample_mesh();
        assert_eq!(mesh.num_points(), 3);
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.indices(), vec![0, 1, 2]);
        assert!(mesh.has_visibility());
        assert!(!mesh.has_color());
        assert!(!mesh.has_tex_coords());
        assert_eq!(mesh.visibility(), Some(&[1u8, 2, 4][..]));
        assert_eq!(mesh.positions().unwrap()[1], Vec3::X);
        assert_eq!(mesh.scaled_positions().unwrap()[2], Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_typed_values_mismatch() {
        let mesh = sample_mesh();
        let vis = mesh.attribute(AttributeId(1)).unwrap();
        assert!(vis.values::<f32>().is_none());
        assert_eq!(vis.values::<u8>().unwrap(), vec![1, 2, 4]);
        assert_eq!(vis.descriptor.data_type, DataType::UINT8);
    }

    #[test]
    fn test_copy_strided() {
        let mesh = sample_mesh();
        let mut dst = vec![0xAAu8; 3 * 2];
        mesh.copy_attribute_strided(AttributeId(1), &mut dst, 2).unwrap();
        assert_eq!(dst, vec![1, 0xAA, 2, 0xAA, 4, 0xAA]);

        let mut small = vec![0u8; 2];
        assert!(mesh.copy_attribute_strided(AttributeId(1), &mut small, 1).is_err());
        assert!(mesh.copy_attribute_strided(AttributeId(7), &mut dst, 1).is_err());
    }
}
