//! Integration tests for incremental frames and the connectivity cache.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use meshstream::connectivity::{
    ConnectivityCodec, ConnectivitySnapshot, SequentialConnectivityCodec, TraversalState,
};
use meshstream::core::{DecoderBuffer, EncoderBuffer};
use meshstream::geom::{AttributeBuffer, Face};
use meshstream::prelude::*;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const QUAD: [Face; 2] = [[0, 1, 2], [0, 2, 3]];

fn quad_positions(z: f32) -> Vec<Vec3> {
    vec![
        Vec3::new(0.0, 0.0, z),
        Vec3::new(1.0, 0.0, z),
        Vec3::new(1.0, 1.0, z),
        Vec3::new(0.0, 1.0, z),
    ]
}

/// Raw positions, no zlib: payload sizes depend only on the point count.
fn lossless() -> CodecOptions {
    CodecOptions::new().with_position_quantization(0).with_compression_level(0)
}

#[test]
fn test_quad_with_three_incremental_frames() {
    init_logging();
    let mut encoder = FrameEncoder::new(lossless()).expect("encoder");
    let mut decoder = FrameDecoder::new(lossless()).expect("decoder");

    let full = encoder
        .encode_full(4, &QUAD, &[AttributeBuffer::from_vec3(&quad_positions(0.0))])
        .expect("encode full");
    let mesh = decoder.decode(&full).expect("decode full");
    assert_eq!(mesh.num_points(), 4);
    assert_eq!(mesh.faces(), &QUAD);

    let mut sizes = Vec::new();
    for i in 1..=3u32 {
        let positions = quad_positions(i as f32 * 0.25);
        let bytes = encoder
            .encode_incremental(4, &[AttributeBuffer::from_vec3(&positions)])
            .expect("encode incremental");
        sizes.push(bytes.len());

        let mesh = decoder.decode(&bytes).expect("decode incremental");
        let header = mesh.header().expect("header");
        assert_eq!(header.frame_kind, FrameKind::Incremental);
        assert_eq!(header.frame_index, i);
        assert_eq!(mesh.num_points(), 4);
        assert_eq!(mesh.faces(), &QUAD);
        assert_eq!(mesh.positions().expect("positions"), positions);
    }

    // No connectivity in incremental frames: header + one length + payload.
    assert!(sizes.iter().all(|&s| s < full.len()));
    assert!(sizes.iter().all(|&s| s == sizes[0]));
    assert_eq!(encoder.frame_index(), 4);
}

#[test]
fn test_many_incremental_frames_are_stable() {
    init_logging();
    let options = CodecOptions::new().with_visibility();
    let mut encoder = FrameEncoder::new(options.clone()).expect("encoder");
    let mut decoder = FrameDecoder::new(options).expect("decoder");

    let visibility = AttributeBuffer::packed(vec![1, 1, 0, 1], 1).expect("visibility");
    let full = encoder
        .encode_full(4, &QUAD, &[AttributeBuffer::from_vec3(&quad_positions(0.0)), visibility.clone()])
        .expect("encode full");
    let first = decoder.decode(&full).expect("decode full");

    for i in 1..50 {
        let frame = Frame::incremental(
            4,
            vec![AttributeBuffer::from_vec3(&quad_positions(i as f32 * 0.01)), visibility.clone()],
        );
        let mesh = decoder.decode(&encoder.encode(&frame).expect("encode")).expect("decode");
        assert_eq!(mesh.faces(), first.faces());
        assert_eq!(mesh.num_points(), first.num_points());
        assert_eq!(mesh.visibility(), first.visibility());
    }
}

#[test]
fn test_new_full_frame_replaces_connectivity() {
    init_logging();
    let mut encoder = FrameEncoder::new(lossless()).expect("encoder");
    let mut decoder = FrameDecoder::new(lossless()).expect("decoder");
    let positions = |z| vec![AttributeBuffer::from_vec3(&quad_positions(z))];

    decoder.decode(&encoder.encode_full(4, &QUAD, &positions(0.0)).expect("full a")).expect("a");
    decoder.decode(&encoder.encode_incremental(4, &positions(1.0)).expect("inc a")).expect("inc a");

    let flipped: [Face; 2] = [[3, 2, 1], [3, 1, 0]];
    decoder.decode(&encoder.encode_full(4, &flipped, &positions(2.0)).expect("full b")).expect("b");
    let mesh = decoder
        .decode(&encoder.encode_incremental(4, &positions(3.0)).expect("inc b"))
        .expect("inc b");
    assert_eq!(mesh.faces(), &flipped);
}

#[test]
fn test_failed_frame_leaves_session_untouched() {
    init_logging();
    let options = lossless().with_tex_coords(12);
    let mut encoder = FrameEncoder::new(options.clone()).expect("encoder");
    let mut decoder = FrameDecoder::new(options).expect("decoder");
    let uvs = |bad: bool| {
        let mut uv = vec![Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];
        if bad {
            uv[2].x = f32::NAN;
        }
        AttributeBuffer::from_vec2(&uv)
    };
    let frame = |z: f32, bad: bool| vec![AttributeBuffer::from_vec3(&quad_positions(z)), uvs(bad)];

    decoder.decode(&encoder.encode_full(4, &QUAD, &frame(0.0, false)).expect("full")).expect("full");

    // A full frame with new connectivity whose texcoord job fails.
    let other: [Face; 1] = [[0, 1, 3]];
    let err = encoder.encode_full(4, &other, &frame(0.0, true)).unwrap_err();
    assert!(matches!(err, Error::JobFailed { index: 1 }));
    assert!(encoder.last_error().expect("last error").contains('1'));
    assert_eq!(encoder.frame_index(), 1);

    // Same for an incremental frame.
    let err = encoder.encode_incremental(4, &frame(1.0, true)).unwrap_err();
    assert!(matches!(err, Error::JobFailed { index: 1 }));

    // The next incremental frame still rides on the quad connectivity.
    let bytes = encoder.encode_incremental(4, &frame(2.0, false)).expect("recovered");
    assert!(encoder.last_error().is_none());
    let mesh = decoder.decode(&bytes).expect("decode");
    assert_eq!(mesh.faces(), &QUAD);
    assert_eq!(mesh.header().expect("header").frame_index, 1);
}

#[test]
fn test_fresh_sessions_reject_incremental() {
    init_logging();
    let mut encoder = FrameEncoder::new(lossless()).expect("encoder");
    let err = encoder
        .encode_incremental(4, &[AttributeBuffer::from_vec3(&quad_positions(0.0))])
        .unwrap_err();
    assert!(matches!(err, Error::Precondition(_)));

    let options = lossless().with_header_mode(HeaderMode::Absent);
    let mut decoder = FrameDecoder::new(options).expect("decoder");
    let err = decoder.decode_as(&[0u8; 32], FrameKind::Incremental).unwrap_err();
    assert!(matches!(err, Error::Precondition(_)));
}

/// Sequential codec that counts full connectivity passes.
struct CountingCodec {
    inner: SequentialConnectivityCodec,
    passes: Arc<AtomicUsize>,
}

impl ConnectivityCodec for CountingCodec {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn encode_connectivity(&mut self, point_count: usize, faces: &[Face], out: &mut EncoderBuffer) -> Result<()> {
        self.passes.fetch_add(1, Ordering::SeqCst);
        self.inner.encode_connectivity(point_count, faces, out)
    }

    fn decode_connectivity(&mut self, buf: &mut DecoderBuffer<'_>) -> Result<()> {
        self.passes.fetch_add(1, Ordering::SeqCst);
        self.inner.decode_connectivity(buf)
    }

    fn state(&self) -> &TraversalState {
        self.inner.state()
    }

    fn install_state(&mut self, snapshot: &ConnectivitySnapshot) {
        self.inner.install_state(snapshot)
    }
}

#[test]
fn test_incremental_frames_skip_connectivity_pass() {
    init_logging();
    let passes = Arc::new(AtomicUsize::new(0));
    let codec = || {
        Box::new(CountingCodec { inner: SequentialConnectivityCodec::default(), passes: passes.clone() })
    };
    let mut encoder = SessionBuilder::new(lossless())
        .with_connectivity_codec(codec())
        .build_encoder()
        .expect("encoder");
    let mut decoder = SessionBuilder::new(lossless())
        .with_connectivity_codec(codec())
        .build_decoder()
        .expect("decoder");

    let positions = |z| vec![AttributeBuffer::from_vec3(&quad_positions(z))];
    decoder.decode(&encoder.encode_full(4, &QUAD, &positions(0.0)).expect("full")).expect("full");
    for i in 1..5 {
        let bytes = encoder.encode_incremental(4, &positions(i as f32)).expect("incremental");
        decoder.decode(&bytes).expect("decode");
    }
    assert_eq!(passes.load(Ordering::SeqCst), 2);
}
