//! Frame codec sessions.
//!
//! A session owns its options, its connectivity engine and the cached
//! connectivity snapshot. Encoders and decoders must be configured with the
//! same [`CodecOptions`].

mod decoder;
mod encoder;
mod options;

pub use decoder::FrameDecoder;
pub use encoder::FrameEncoder;
pub use options::{
    CodecOptions, SessionBuilder, DEFAULT_COMPRESSION_LEVEL, DEFAULT_POSITION_BITS, MAX_ATTRIBUTES,
};
