//! Geometry containers exchanged with the codec.
//!
//! - [`AttributeDescriptor`] / [`AttributeBuffer`] - Attribute declarations and payloads
//! - [`Frame`] - Encoder input
//! - [`DecodedMesh`] - Decoder output

pub mod attribute;
pub mod mesh;

pub use attribute::{AttributeBuffer, AttributeDescriptor, AttributeId};
pub use mesh::{DecodedAttribute, DecodedMesh, Face, Frame};
