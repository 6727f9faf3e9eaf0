use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::fixed_math::FixedNum;

/// Integer offset coordinate of one hex cell on the world map.
///
/// The derived `Ord` (x, then y) is the deterministic tie-break order used
/// throughout the shortest-path engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Vertex {
    pub x: i32,
    pub y: i32,
}

impl Vertex {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Capability set the shortest-path engine runs against. The world map is the
/// production implementation; tests supply small synthetic graphs.
pub trait WorldGraph {
    /// Every vertex open to traversal.
    fn vertices(&self) -> Vec<Vertex>;

    /// Traversable neighbors of `v`, in a fixed direction order.
    fn neighbors(&self, v: Vertex) -> SmallVec<[Vertex; 6]>;

    /// Edge weight between two adjacent vertices.
    fn distance(&self, _from: Vertex, _to: Vertex) -> FixedNum {
        FixedNum::ONE
    }
}
