/// Graph data: vertices at virtual positions, connections between them.

use glam::DVec2;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: DVec2,
    /// Set once the player has dragged this vertex. Cosmetic only.
    pub moved: bool,
}

impl Vertex {
    pub fn new(position: DVec2) -> Self {
        Vertex { position, moved: false }
    }

    /// Hit and draw radius in screen pixels. Dragged vertices shrink.
    pub fn radius(&self) -> i32 {
        if self.moved { 5 } else { 8 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub first: usize,
    pub second: usize,
    /// Set by the solution check when this edge crosses another.
    pub failed: bool,
}

impl Connection {
    pub fn new(first: usize, second: usize) -> Self {
        Connection { first, second, failed: false }
    }

    pub fn has_vertex(&self, vertex: usize) -> bool {
        self.first == vertex || self.second == vertex
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
    pub vertices: Vec<Vertex>,
    pub connections: Vec<Connection>,
}

impl Graph {
    /// Endpoint positions of a connection.
    pub fn endpoints(&self, conn: &Connection) -> (DVec2, DVec2) {
        (
            self.vertices[conn.first].position,
            self.vertices[conn.second].position,
        )
    }
}

/// Map the unordered pair `{p, q}` of line indices onto a vertex index.
///
/// Bijective from the pairs `p != q` in `[0, n)` onto `[0, n(n-1)/2)`;
/// symmetric in `p` and `q`.
pub fn pair_index(p: usize, q: usize, n: usize) -> usize {
    debug_assert!(p != q && p < n && q < n);
    let (p, q) = if p < q { (p, q) } else { (q, p) };
    (2 * n - p - 1) * p / 2 + q - p - 1
}
