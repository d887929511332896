//! Traversal state of a connectivity engine and its captured snapshot.

use crate::geom::Face;

/// Where a connectivity engine's traversal left off after a frame.
///
/// Arena layout: faces are stored as one flat corner -> point array, and
/// the point sequence is the order in which attribute values are coded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TraversalState {
    point_count: usize,
    corners: Vec<u32>,
    point_sequence: Vec<u32>,
}

impl TraversalState {
    /// Derive the traversal for `faces` over `point_count` points.
    ///
    /// Points are sequenced by first appearance walking the faces corner by
    /// corner; points no face references follow in ascending order. Callers
    /// guarantee every index is below `point_count`.
    pub fn derive(point_count: usize, faces: &[Face]) -> Self {
        let mut corners = Vec::with_capacity(faces.len() * 3);
        let mut visited = vec![false; point_count];
        let mut point_sequence = Vec::with_capacity(point_count);

        for face in faces {
            for &point in face {
                corners.push(point);
                let slot = &mut visited[point as usize];
                if !*slot {
                    *slot = true;
                    point_sequence.push(point);
                }
            }
        }
        point_sequence.extend(
            visited
                .iter()
                .enumerate()
                .filter(|(_, seen)| !**seen)
                .map(|(i, _)| i as u32),
        );

        Self { point_count, corners, point_sequence }
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.point_count
    }

    #[inline]
    pub fn num_faces(&self) -> usize {
        self.corners.len() / 3
    }

    /// Point index at corner `c`.
    #[inline]
    pub fn corner(&self, c: usize) -> u32 {
        self.corners[c]
    }

    #[inline]
    pub fn corners(&self) -> &[u32] {
        &self.corners
    }

    pub fn face(&self, f: usize) -> Face {
        [self.corners[f * 3], self.corners[f * 3 + 1], self.corners[f * 3 + 2]]
    }

    /// Faces rebuilt from the corner array.
    pub fn faces(&self) -> Vec<Face> {
        self.corners.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
    }

    /// Permutation of `0..point_count` giving attribute coding order.
    #[inline]
    pub fn point_sequence(&self) -> &[u32] {
        &self.point_sequence
    }
}

/// Deep copy of a [`TraversalState`] captured after a full frame.
///
/// Owns all of its data, so later work on the live engine never affects a
/// captured snapshot. Read-only once captured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectivitySnapshot {
    state: TraversalState,
}

impl ConnectivitySnapshot {
    pub fn new(state: TraversalState) -> Self {
        Self { state }
    }

    #[inline]
    pub fn state(&self) -> &TraversalState {
        &self.state
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.state.point_count
    }

    #[inline]
    pub fn num_faces(&self) -> usize {
        self.state.num_faces()
    }

    /// Owned copy of the captured state for installing into an engine.
    pub fn to_state(&self) -> TraversalState {
        self.state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_first_appearance() {
        let state = TraversalState::derive(6, &[[2, 0, 1], [1, 0, 4]]);
        assert_eq!(state.point_sequence(), &[2, 0, 1, 4, 3, 5]);
        assert_eq!(state.num_faces(), 2);
        assert_eq!(state.face(1), [1, 0, 4]);
        assert_eq!(state.corner(3), 1);
    }

    #[test]
    fn test_sequence_without_faces() {
        let state = TraversalState::derive(3, &[]);
        assert_eq!(state.point_sequence(), &[0, 1, 2]);
        assert!(state.faces().is_empty());
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut live = TraversalState::derive(4, &[[0, 1, 2], [0, 2, 3]]);
        let snapshot = ConnectivitySnapshot::new(live.clone());
        live = TraversalState::derive(3, &[[2, 1, 0]]);
        assert_eq!(live.point_count(), 3);
        assert_eq!(snapshot.point_count(), 4);
        assert_eq!(snapshot.state().faces(), vec![[0, 1, 2], [0, 2, 3]]);
    }
}
