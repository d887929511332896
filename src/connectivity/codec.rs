//! Connectivity engine capability consumed by sessions.

use super::snapshot::{ConnectivitySnapshot, TraversalState};
use crate::core::{DecoderBuffer, EncoderBuffer};
use crate::geom::Face;
use crate::util::Result;

/// A connectivity compressor whose traversal state can be cloned out and
/// installed back.
///
/// After `encode_connectivity` or `decode_connectivity` succeeds, `state()`
/// describes the frame just processed. Sessions capture it with
/// `clone_state` and, for incremental frames, restore it with
/// `install_state` instead of running a full pass.
pub trait ConnectivityCodec: Send {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Derive and write connectivity for a full frame.
    fn encode_connectivity(
        &mut self,
        point_count: usize,
        faces: &[Face],
        out: &mut EncoderBuffer,
    ) -> Result<()>;

    /// Read connectivity for a full frame.
    fn decode_connectivity(&mut self, buf: &mut DecoderBuffer<'_>) -> Result<()>;

    /// Live traversal state.
    fn state(&self) -> &TraversalState;

    /// Deep clone of the live traversal state.
    fn clone_state(&self) -> ConnectivitySnapshot {
        ConnectivitySnapshot::new(self.state().clone())
    }

    /// Replace the live traversal state with a captured one.
    fn install_state(&mut self, snapshot: &ConnectivitySnapshot);
}
