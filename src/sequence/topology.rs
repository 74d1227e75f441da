//! Entity connection topologies (skeletons).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 21-landmark hand skeleton: wrist, then four joints per finger from thumb to pinky.
#[rustfmt::skip]
const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (5, 9), (9, 10), (10, 11), (11, 12),
    (9, 13), (13, 14), (14, 15), (15, 16),
    (13, 17), (0, 17), (17, 18), (18, 19), (19, 20),
];

/// 33-landmark body pose skeleton.
#[rustfmt::skip]
const POSE_CONNECTIONS: [(usize, usize); 35] = [
    (0, 1), (1, 2), (2, 3), (3, 7), (0, 4), (4, 5), (5, 6), (6, 8),
    (9, 10),
    (11, 12), (11, 13), (13, 15), (15, 17), (15, 19), (15, 21), (17, 19),
    (12, 14), (14, 16), (16, 18), (16, 20), (16, 22), (18, 20),
    (11, 23), (12, 24), (23, 24),
    (23, 25), (24, 26), (25, 27), (26, 28), (27, 29), (28, 30), (29, 31), (30, 32), (27, 31), (28, 32),
];

/// Fixed set of entity pairs drawn as edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topology {
    connections: Vec<(usize, usize)>,
}

impl Topology {
    /// Topology from explicit pairs.
    #[must_use]
    pub fn new(connections: Vec<(usize, usize)>) -> Self {
        Self { connections }
    }

    /// No edges; points only.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Hand landmark skeleton (21 entities).
    #[must_use]
    pub fn hand() -> Self {
        Self::new(HAND_CONNECTIONS.to_vec())
    }

    /// Body pose landmark skeleton (33 entities).
    #[must_use]
    pub fn pose() -> Self {
        Self::new(POSE_CONNECTIONS.to_vec())
    }

    /// Connection pairs in draw order.
    #[must_use]
    pub fn connections(&self) -> &[(usize, usize)] {
        &self.connections
    }

    /// Number of connections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether there are no connections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Check every connection references an entity below `entity_count`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConnection`] for the first dangling pair.
    pub fn validate(&self, entity_count: usize) -> Result<()> {
        match self
            .connections
            .iter()
            .find(|&&(a, b)| a >= entity_count || b >= entity_count)
        {
            Some(&(from, to)) => Err(Error::InvalidConnection {
                from,
                to,
                entity_count,
            }),
            None => Ok(()),
        }
    }
}
