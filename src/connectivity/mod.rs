//! Connectivity coding and the incremental-frame state cache.
//!
//! - [`ConnectivityCodec`] - Capability trait for connectivity engines
//! - [`SequentialConnectivityCodec`] - The engine shipped with the crate
//! - [`TraversalState`] / [`ConnectivitySnapshot`] - Engine state and its captured copy
//! - [`ConnectivityStateCache`] - Holds the snapshot reused by incremental frames

mod cache;
mod codec;
mod sequential;
mod snapshot;

pub use cache::ConnectivityStateCache;
pub use codec::ConnectivityCodec;
pub use sequential::{IndexMethod, SequentialConnectivityCodec, GEOMETRY_TRIANGULAR_MESH, MAX_POINT_COUNT};
pub use snapshot::{ConnectivitySnapshot, TraversalState};
