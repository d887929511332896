//! Utility types and functions for the codec.
//!
//! This module contains fundamental types used throughout the library:
//! - [`NumericType`] - Enum of attribute component types
//! - [`DataType`] - Component type + component count
//! - [`AttributeSemantic`] - Semantic channel of an attribute
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam

mod pod;
mod data_type;
mod error;
mod math;

pub use pod::*;
pub use data_type::*;
pub use error::*;
pub use math::*;
