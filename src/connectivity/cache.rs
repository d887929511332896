//! Per-session cache of the most recent full frame's connectivity.
//!
//! State machine:
//! `Uninitialized --full frame--> Cached --incremental--> Cached
//! --full frame--> Cached (snapshot replaced)`.
//! An incremental frame while `Uninitialized` is a precondition failure.

use super::codec::ConnectivityCodec;
use super::snapshot::ConnectivitySnapshot;
use crate::util::{Error, Result};

#[derive(Clone, Debug, Default)]
enum CacheState {
    #[default]
    Uninitialized,
    Cached(ConnectivitySnapshot),
}

/// Holds at most one snapshot; owned by exactly one session.
#[derive(Clone, Debug, Default)]
pub struct ConnectivityStateCache {
    state: CacheState,
}

impl ConnectivityStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep-clone the engine's state right after a full-frame pass.
    ///
    /// The returned snapshot is not stored; call [`commit`](Self::commit)
    /// once the whole frame has succeeded.
    pub fn capture(engine: &dyn ConnectivityCodec) -> ConnectivitySnapshot {
        engine.clone_state()
    }

    /// Make `snapshot` the live cached snapshot, replacing any previous one.
    pub fn commit(&mut self, snapshot: ConnectivitySnapshot) {
        tracing::trace!(
            points = snapshot.point_count(),
            faces = snapshot.num_faces(),
            replaced = self.is_cached(),
            "connectivity snapshot committed"
        );
        self.state = CacheState::Cached(snapshot);
    }

    /// Install the cached snapshot into `engine` for an incremental frame.
    pub fn install(&self, engine: &mut dyn ConnectivityCodec) -> Result<()> {
        let snapshot = self.snapshot().ok_or_else(|| {
            Error::precondition("incremental frame before any full frame in this session")
        })?;
        engine.install_state(snapshot);
        Ok(())
    }

    /// Drop the snapshot so the next frame must be a full frame.
    pub fn invalidate(&mut self) {
        self.state = CacheState::Uninitialized;
    }

    pub fn snapshot(&self) -> Option<&ConnectivitySnapshot> {
        match &self.state {
            CacheState::Uninitialized => None,
            CacheState::Cached(snapshot) => Some(snapshot),
        }
    }

    #[inline]
    pub fn is_cached(&self) -> bool {
        matches!(self.state, CacheState::Cached(_))
    }

    /// Point count recorded by the cached full frame.
    pub fn point_count(&self) -> Option<usize> {
        self.snapshot().map(ConnectivitySnapshot::point_count)
    }
}
