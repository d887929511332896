//! Core layer - byte buffers, frame header and shared capabilities.
//!
//! This module provides:
//! - [`EncoderBuffer`] / [`DecoderBuffer`] - Little-endian stream I/O
//! - [`FrameHeader`] / [`FrameKind`] / [`HeaderMode`] - Frame framing
//! - [`deflate`] / [`inflate`] - Optional zlib stage for payload bodies
//! - [`Profiler`] - Optional timing sink injected into sessions

mod buffer;
mod header;
mod compression;
mod profiler;

pub use buffer::{DecoderBuffer, EncoderBuffer, zigzag_decode, zigzag_encode};
pub use header::{
    FrameHeader, FrameKind, HeaderMode, HEADER_SIZE, MAJOR_VERSION, MINOR_VERSION,
};
pub use compression::{deflate, inflate, zlib_level, MAX_COMPRESSION_LEVEL};
pub use profiler::{
    noop_profiler, NoopProfiler, ProfileScope, Profiler, ProfilerHandle, RecordingProfiler,
    TracingProfiler,
};
