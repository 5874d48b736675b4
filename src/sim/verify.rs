/// Solution checking: does any pair of edges still cross?

use rand::Rng;

use crate::domain::geometry::segments_cross;
use crate::domain::graph::Graph;
use crate::sim::generate;
use crate::sim::world::GameState;

/// First pair of connection indices, scanning unordered pairs in ascending
/// order, whose segments properly cross. Edges sharing a vertex never
/// count as crossing.
pub fn first_crossing(graph: &Graph) -> Option<(usize, usize)> {
    let conns = &graph.connections;
    for i in 0..conns.len() {
        let a = conns[i];
        let (a1, a2) = graph.endpoints(&a);
        for (j, b) in conns.iter().enumerate().skip(i + 1) {
            if a.has_vertex(b.first) || a.has_vertex(b.second) {
                continue;
            }
            let (b1, b2) = graph.endpoints(b);
            if segments_cross(a1, a2, b1, b2) {
                return Some((i, j));
            }
        }
    }
    None
}

/// Check the current layout. On failure only the first crossing pair found
/// is marked; on success the time bonus is banked and the next level starts.
/// Returns true when the level was solved.
pub fn check_solution<R: Rng>(world: &mut GameState, elapsed_seconds: f64, rng: &mut R) -> bool {
    match first_crossing(&world.graph) {
        Some((i, j)) => {
            world.graph.connections[i].failed = true;
            world.graph.connections[j].failed = true;
            false
        }
        None => {
            let bonus = 100 * world.level - elapsed_seconds.round() as i32;
            world.score += bonus.max(0);
            generate::start_level(world, world.level + 1, rng);
            true
        }
    }
}
