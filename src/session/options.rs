//! Session configuration and capability injection.

use std::sync::Arc;

use crate::connectivity::{ConnectivityCodec, IndexMethod, SequentialConnectivityCodec};
use crate::core::{noop_profiler, HeaderMode, ProfilerHandle, MAX_COMPRESSION_LEVEL};
use crate::geom::{AttributeDescriptor, AttributeId};
use crate::jobs::{AttributeScheduler, JobPoolConfig, JobRunner};
use crate::util::{AttributeSemantic, Error, Result};

use super::decoder::FrameDecoder;
use super::encoder::FrameEncoder;

/// Default position quantization.
pub const DEFAULT_POSITION_BITS: u8 = 10;

/// Default compression level.
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 7;

/// Most attributes a session can declare.
pub const MAX_ATTRIBUTES: usize = u8::MAX as usize + 1;

/// Codec configuration, fixed for the life of a session.
///
/// The attribute set always starts with positions at [`AttributeId`] 0;
/// further attributes get ids in the order they are added.
#[derive(Clone, Debug, PartialEq)]
pub struct CodecOptions {
    compression_level: u8,
    header_mode: HeaderMode,
    decode_multiplier: f32,
    attributes: Vec<AttributeDescriptor>,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            header_mode: HeaderMode::Present,
            decode_multiplier: 1.0,
            attributes: vec![AttributeDescriptor::position(DEFAULT_POSITION_BITS)],
        }
    }
}

impl CodecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compression level, clamped to `0..=10`. Level 0 disables zlib and
    /// writes fixed-width connectivity indices.
    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = level.min(MAX_COMPRESSION_LEVEL);
        self
    }

    /// Quantization bits for positions; 0 stores them losslessly.
    pub fn with_position_quantization(mut self, bits: u8) -> Self {
        self.attributes[0].quantization_bits = bits;
        self
    }

    pub fn with_header_mode(mut self, mode: HeaderMode) -> Self {
        self.header_mode = mode;
        self
    }

    /// Scale decoders apply to positions (carried in the header).
    pub fn with_decode_multiplier(mut self, multiplier: f32) -> Self {
        self.decode_multiplier = multiplier;
        self
    }

    /// Add a per-point visibility mask channel.
    pub fn with_visibility(self) -> Self {
        self.with_attribute(AttributeDescriptor::visibility())
    }

    /// Add an RGB8 color channel.
    pub fn with_color(self) -> Self {
        self.with_attribute(AttributeDescriptor::color())
    }

    /// Add a texture coordinate channel quantized to `bits` (0 = lossless).
    pub fn with_tex_coords(self, bits: u8) -> Self {
        self.with_attribute(AttributeDescriptor::tex_coords(bits))
    }

    /// Add any attribute channel.
    pub fn with_attribute(mut self, descriptor: AttributeDescriptor) -> Self {
        self.attributes.push(descriptor);
        self
    }

    #[inline]
    pub fn compression_level(&self) -> u8 {
        self.compression_level
    }

    #[inline]
    pub fn header_mode(&self) -> HeaderMode {
        self.header_mode
    }

    #[inline]
    pub fn decode_multiplier(&self) -> f32 {
        self.decode_multiplier
    }

    #[inline]
    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    pub fn position_quantization_bits(&self) -> u8 {
        self.attributes[0].quantization_bits
    }

    pub(crate) fn set_position_quantization_bits(&mut self, bits: u8) {
        self.attributes[0].quantization_bits = bits;
    }

    /// Id of the first attribute with `semantic`.
    pub fn attribute_id(&self, semantic: AttributeSemantic) -> Option<AttributeId> {
        self.attributes
            .iter()
            .position(|a| a.semantic == semantic)
            .map(|i| AttributeId(i as u8))
    }

    /// Reject configurations no session can run.
    pub fn validate(&self) -> Result<()> {
        if self.attributes.len() > MAX_ATTRIBUTES {
            return Err(Error::precondition(format!(
                "{} attributes declared, at most {MAX_ATTRIBUTES} supported",
                self.attributes.len()
            )));
        }
        if !self.decode_multiplier.is_finite() {
            return Err(Error::precondition("decode multiplier must be finite"));
        }
        if let Some((i, a)) = self
            .attributes
            .iter()
            .enumerate()
            .find(|(_, a)| a.data_type.components == 0)
        {
            return Err(Error::precondition(format!("attribute #{i} ({}) has no components", a.semantic)));
        }
        Ok(())
    }
}

/// Builds encoders and decoders with injected capabilities.
///
/// Without a runner or pool configuration attribute jobs run on the calling
/// thread; without a profiler timings are discarded.
pub struct SessionBuilder {
    options: CodecOptions,
    profiler: ProfilerHandle,
    runner: Option<Arc<dyn JobRunner>>,
    pool: Option<JobPoolConfig>,
    connectivity: Option<Box<dyn ConnectivityCodec>>,
}

impl SessionBuilder {
    pub fn new(options: CodecOptions) -> Self {
        Self { options, profiler: noop_profiler(), runner: None, pool: None, connectivity: None }
    }

    pub fn with_profiler(mut self, profiler: ProfilerHandle) -> Self {
        self.profiler = profiler;
        self
    }

    /// Run attribute jobs through `runner`.
    pub fn with_runner(mut self, runner: Arc<dyn JobRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    /// Run attribute jobs on a rayon pool built from `config`.
    ///
    /// Ignored when a runner is injected.
    pub fn with_pool(mut self, config: JobPoolConfig) -> Self {
        self.pool = Some(config);
        self
    }

    /// Replace the built-in connectivity codec.
    pub fn with_connectivity_codec(mut self, codec: Box<dyn ConnectivityCodec>) -> Self {
        self.connectivity = Some(codec);
        self
    }

    pub fn build_encoder(self) -> Result<FrameEncoder> {
        let parts = self.into_parts("encoder")?;
        Ok(FrameEncoder::from_parts(parts))
    }

    pub fn build_decoder(self) -> Result<FrameDecoder> {
        let parts = self.into_parts("decoder")?;
        Ok(FrameDecoder::from_parts(parts))
    }

    fn into_parts(self, role: &'static str) -> Result<SessionParts> {
        self.options.validate()?;

        let scheduler = match (self.runner, &self.pool) {
            (Some(runner), _) => AttributeScheduler::with_runner(runner),
            (None, Some(config)) => AttributeScheduler::with_pool(config),
            (None, None) => AttributeScheduler::sequential(),
        }
        .with_profiler(self.profiler.clone());

        let connectivity = self.connectivity.unwrap_or_else(|| {
            let method = IndexMethod::for_compression_level(self.options.compression_level());
            Box::new(SequentialConnectivityCodec::new(method))
        });

        tracing::debug!(
            role,
            build = %crate::build_info(),
            attributes = self.options.attributes().len(),
            compression = self.options.compression_level(),
            parallel = scheduler.is_parallel(),
            connectivity = connectivity.name(),
            "mesh stream session created"
        );

        Ok(SessionParts {
            options: self.options,
            profiler: self.profiler,
            scheduler,
            connectivity,
        })
    }
}

/// Everything a session owns, assembled by [`SessionBuilder`].
pub(crate) struct SessionParts {
    pub options: CodecOptions,
    pub profiler: ProfilerHandle,
    pub scheduler: AttributeScheduler,
    pub connectivity: Box<dyn ConnectivityCodec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CodecOptions::default();
        assert_eq!(options.compression_level(), DEFAULT_COMPRESSION_LEVEL);
        assert_eq!(options.position_quantization_bits(), DEFAULT_POSITION_BITS);
        assert_eq!(options.header_mode(), HeaderMode::Present);
        assert_eq!(options.attributes().len(), 1);
        assert_eq!(options.attribute_id(AttributeSemantic::Position), Some(AttributeId(0)));
    }

    #[test]
    fn test_attribute_ids_follow_declaration_order() {
        let options = CodecOptions::new().with_color().with_visibility().with_tex_coords(12);
        assert_eq!(options.attribute_id(AttributeSemantic::Color), Some(AttributeId(1)));
        assert_eq!(options.attribute_id(AttributeSemantic::Generic), Some(AttributeId(2)));
        assert_eq!(options.attribute_id(AttributeSemantic::TexCoord), Some(AttributeId(3)));
        assert_eq!(options.attributes()[3].quantization_bits, 12);
    }

    #[test]
    fn test_compression_level_clamped() {
        assert_eq!(CodecOptions::new().with_compression_level(42).compression_level(), 10);
        assert_eq!(CodecOptions::new().with_compression_level(0).compression_level(), 0);
    }

    #[test]
    fn test_validate() {
        assert!(CodecOptions::new().validate().is_ok());
        assert!(CodecOptions::new().with_decode_multiplier(f32::NAN).validate().is_err());

        let mut options = CodecOptions::new();
        for _ in 0..MAX_ATTRIBUTES {
            options = options.with_visibility();
        }
        assert!(matches!(options.validate(), Err(Error::Precondition(_))));
    }

    #[test]
    fn test_builder_uses_pool() {
        let encoder = SessionBuilder::new(CodecOptions::new())
            .with_pool(JobPoolConfig::default().with_threads(2))
            .build_encoder()
            .unwrap();
        assert!(encoder.is_parallel());
    }
}
