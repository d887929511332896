//! # meshstream
//!
//! Compression of triangle-mesh frame sequences.
//!
//! A stream starts with a full frame carrying connectivity and per-point
//! attributes. Later frames are either full frames again or incremental
//! frames that reuse the last full frame's connectivity and carry only
//! attribute data. Attributes are coded independently of each other and can
//! be encoded on a thread pool; the output is identical either way.
//!
//! ## Modules
//!
//! - [`util`] - Numeric types, math helpers, errors
//! - [`core`] - Byte buffers, frame header, compression, profiling
//! - [`geom`] - Attribute declarations, frames and decoded meshes
//! - [`connectivity`] - Connectivity codec and the snapshot cache
//! - [`jobs`] - Job runner and attribute scheduler
//! - [`attributes`] - Per-attribute encoders and block layout
//! - [`session`] - Frame encoder and decoder sessions
//!
//! ## Example
//!
//! ```ignore
//! use meshstream::prelude::*;
//!
//! let options = CodecOptions::new().with_visibility();
//! let mut encoder = FrameEncoder::new(options.clone())?;
//! let mut decoder = FrameDecoder::new(options)?;
//!
//! let bytes = encoder.encode_full(4, &faces, &[positions, visibility])?;
//! let mesh = decoder.decode(&bytes)?;
//! assert_eq!(mesh.num_faces(), faces.len());
//! ```

pub mod util;
pub mod core;
pub mod geom;
pub mod connectivity;
pub mod jobs;
pub mod attributes;
pub mod session;

// Re-export commonly used types
pub use util::{Error, Result};
pub use session::{CodecOptions, FrameDecoder, FrameEncoder, SessionBuilder};

/// Crate version and build stamp, e.g. `0.1.0 (2026-10-19 12:00:00)`.
pub fn build_info() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("MESHSTREAM_BUILD_DATE"),
        " ",
        env!("MESHSTREAM_BUILD_TIME"),
        ")"
    )
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{AttributeSemantic, DataType, Error, NumericType, Result, Vec2, Vec3};
    pub use crate::core::{FrameHeader, FrameKind, HeaderMode};
    pub use crate::geom::*;
    pub use crate::jobs::{JobPoolConfig, JobRunner, RayonJobRunner};
    pub use crate::session::{CodecOptions, FrameDecoder, FrameEncoder, SessionBuilder};
}
