/// Level generation from a random line arrangement.
///
/// The construction: draw `N = 3 + level` pairwise non-parallel lines, take
/// their `N(N-1)/2` crossings as vertices, and connect crossings that are
/// consecutive along a line (each line crosses the other `N-1`, giving
/// `N-2` segments, `N(N-2)` edges in total). The result is the crossing
/// graph of the arrangement, so placing every vertex at its original
/// intersection point is a planar embedding — the puzzle always has a
/// solution. The circle layout below deliberately scrambles that embedding.

use glam::DVec2;
use rand::Rng;

use crate::domain::geometry::{intersection, non_parallel, Line};
use crate::domain::graph::{pair_index, Connection, Graph, Vertex};
use crate::sim::world::GameState;

/// Radius of the initial vertex circle in virtual space.
const LAYOUT_RADIUS: f64 = 0.9;

/// Rejection-sample `n` pairwise non-parallel lines from `[0,1)` uniforms.
/// Terminates with probability 1 over continuous draws.
fn draw_lines<R: Rng>(n: usize, rng: &mut R) -> Vec<Line> {
    let mut lines: Vec<Line> = Vec::with_capacity(n);
    while lines.len() < n {
        let cand = Line::new(rng.gen(), rng.gen(), rng.gen(), rng.gen());
        if lines.iter().all(|l| non_parallel(l, &cand)) {
            lines.push(cand);
        }
    }
    lines
}

pub fn generate<R: Rng>(level: i32, rng: &mut R) -> Graph {
    assert!(level >= 1);
    let n = level as usize + 3;
    let lines = draw_lines(n, rng);

    // One vertex per unordered pair of lines, laid out on a circle. The
    // index order around the circle has nothing to do with adjacency, which
    // is what produces the initial tangle.
    let vertex_count = n * (n - 1) / 2;
    let angle_step = std::f64::consts::TAU / vertex_count as f64;
    let spoke = DVec2::new(0.0, -LAYOUT_RADIUS);
    let vertices = (0..vertex_count)
        .map(|k| Vertex::new(DVec2::from_angle(angle_step * k as f64).rotate(spoke)))
        .collect();

    // Along each line, connect crossings that are consecutive in sweep
    // order: sort the other lines by where they cross this one.
    let mut connections = Vec::with_capacity(n * (n - 2));
    let mut order: Vec<usize> = Vec::with_capacity(n - 1);
    for i in 0..n {
        order.clear();
        order.extend((0..n).filter(|&j| j != i));
        order.sort_by(|&a, &b| {
            let pa = intersection(&lines[i], &lines[a]);
            let pb = intersection(&lines[i], &lines[b]);
            pa.x.total_cmp(&pb.x).then(pa.y.total_cmp(&pb.y))
        });
        for pair in order.windows(2) {
            connections.push(Connection::new(
                pair_index(i, pair[0], n),
                pair_index(i, pair[1], n),
            ));
        }
    }

    Graph {
        vertices,
        connections,
    }
}

/// Install a freshly generated graph for `level`, clearing everything that
/// belongs to the previous one: selection, camera, level timer.
pub fn start_level<R: Rng>(world: &mut GameState, level: i32, rng: &mut R) {
    world.graph = generate(level, rng);
    world.level = level;
    world.selected.clear();
    world.reset_viewpoint();
    world.reset_timer();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn level_one_counts() {
        let mut rng = StdRng::seed_from_u64(7);
        let graph = generate(1, &mut rng);
        assert_eq!(graph.vertices.len(), 6);
        assert_eq!(graph.connections.len(), 8);
    }

    #[test]
    fn level_five_counts() {
        let mut rng = StdRng::seed_from_u64(7);
        let graph = generate(5, &mut rng);
        assert_eq!(graph.vertices.len(), 28);
        assert_eq!(graph.connections.len(), 48);
    }

    #[test]
    fn drawn_lines_pairwise_non_parallel() {
        let mut rng = StdRng::seed_from_u64(99);
        let lines = draw_lines(12, &mut rng);
        for i in 0..lines.len() {
            for j in (i + 1)..lines.len() {
                assert!(non_parallel(&lines[i], &lines[j]));
            }
        }
    }

    #[test]
    fn connections_reference_valid_distinct_vertices() {
        let mut rng = StdRng::seed_from_u64(3);
        for level in 1..=6 {
            let graph = generate(level, &mut rng);
            for conn in &graph.connections {
                assert!(conn.first < graph.vertices.len());
                assert!(conn.second < graph.vertices.len());
                assert_ne!(conn.first, conn.second);
            }
        }
    }

    #[test]
    fn layout_is_a_circle_of_fresh_vertices() {
        let mut rng = StdRng::seed_from_u64(21);
        let graph = generate(2, &mut rng);
        for v in &graph.vertices {
            assert!((v.position.length() - 0.9).abs() < 1e-9);
            assert!(!v.moved);
        }
        // First vertex sits at the top of the circle.
        assert!((graph.vertices[0].position - DVec2::new(0.0, -0.9)).length() < 1e-12);
    }

    #[test]
    fn start_level_resets_transient_state() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut world = GameState::new();
        world.view_w = 800;
        world.view_h = 600;
        world.selected = vec![0, 1];
        world.camera = DVec2::new(0.3, 0.3);
        world.zoom = 2.5;
        world.score = 400;

        start_level(&mut world, 2, &mut rng);
        assert_eq!(world.level, 2);
        assert!(world.selected.is_empty());
        assert_eq!(world.camera, DVec2::ZERO);
        assert_eq!(world.zoom, 1.0);
        // Score survives level changes.
        assert_eq!(world.score, 400);
        assert!(world.elapsed_seconds() < 1.0);
    }
}
