/// GameState: the complete state of a running puzzle.
///
/// ## Coordinate spaces
///
/// Virtual coordinates run -1..1 on both axes at zoom 1 with the camera at
/// the origin; vertex positions, the camera and selection rectangles live
/// there. Screen coordinates are half-block pixels (two per terminal row,
/// see `ui::renderer`); hit radii, grid snapping and the HUD live there.
/// `View` maps between the two and is rebuilt from the current camera and
/// viewport for every conversion, so nothing holds a stale transform.

use std::time::Instant;

use glam::{DVec2, IVec2};
use rand::Rng;

use crate::domain::graph::Graph;

/// Grid spacing cycle: 0 -> MAX, then halved until it would drop below MIN.
pub const MAX_GRID_SIZE: i32 = 32;
pub const MIN_GRID_SIZE: i32 = 8;

/// View transform between virtual space and screen pixels.
#[derive(Clone, Copy, Debug)]
pub struct View {
    pub camera: DVec2,
    pub zoom: f64,
    pub width: i32,
    pub height: i32,
}

impl View {
    fn scale(&self) -> f64 {
        self.zoom * 0.5 * f64::from(self.width.min(self.height).max(1))
    }

    /// Virtual point -> screen pixels.
    pub fn to_screen(&self, v: DVec2) -> IVec2 {
        let s = self.scale();
        IVec2::new(
            ((v.x - self.camera.x) * s) as i32 + self.width / 2,
            ((v.y - self.camera.y) * s) as i32 + self.height / 2,
        )
    }

    /// Screen pixels -> virtual point.
    pub fn to_virtual(&self, p: IVec2) -> DVec2 {
        let s = 1.0 / self.scale();
        DVec2::new(
            f64::from(p.x - self.width / 2) * s + self.camera.x,
            f64::from(p.y - self.height / 2) * s + self.camera.y,
        )
    }
}

/// Snap a screen point to the nearest grid multiple.
///
/// `grid` is a power of two, so `grid - 1` is a bit mask. The half-grid
/// boundary rounds up. `grid == 0` means the grid is off.
pub fn snap_to_grid(pt: IVec2, grid: i32) -> IVec2 {
    if grid <= 0 {
        return pt;
    }
    let mask = grid - 1;
    let snap = |c: i32| {
        let base = c & !mask;
        if (c & mask) >= grid / 2 { base + grid } else { base }
    };
    IVec2::new(snap(pt.x), snap(pt.y))
}

pub struct GameState {
    pub graph: Graph,
    /// Selected vertex indices, insertion-ordered, no duplicates.
    pub selected: Vec<usize>,
    pub camera: DVec2,
    pub zoom: f64,
    pub score: i32,
    pub level: i32,
    /// 0 = grid off, otherwise a power of two in screen pixels.
    pub grid_size: i32,

    // ── Level timer ──
    /// Seconds accumulated before the current timer epoch (from saves and
    /// pause credits; may be negative mid-session after a pause).
    pub time_offset: f64,
    pub timer_epoch: Instant,

    // ── Viewport (transient, set from the terminal size) ──
    pub view_w: i32,
    pub view_h: i32,
}

impl GameState {
    pub fn new() -> Self {
        GameState {
            graph: Graph::default(),
            selected: vec![],
            camera: DVec2::ZERO,
            zoom: 1.0,
            score: 0,
            level: 1,
            grid_size: MAX_GRID_SIZE,
            time_offset: 0.0,
            timer_epoch: Instant::now(),
            view_w: 0,
            view_h: 0,
        }
    }

    pub fn view(&self) -> View {
        View {
            camera: self.camera,
            zoom: self.zoom,
            width: self.view_w,
            height: self.view_h,
        }
    }

    // ── Level timer ──

    pub fn elapsed_seconds(&self) -> f64 {
        self.time_offset + self.timer_epoch.elapsed().as_secs_f64()
    }

    pub fn reset_timer(&mut self) {
        self.time_offset = 0.0;
        self.timer_epoch = Instant::now();
    }

    /// Restart the timer epoch carrying `seconds` of already-elapsed time.
    pub fn restore_timer(&mut self, seconds: f64) {
        self.time_offset = seconds;
        self.timer_epoch = Instant::now();
    }

    /// Discount a paused span from the elapsed time.
    pub fn credit_pause(&mut self, seconds: f64) {
        self.time_offset -= seconds;
    }

    // ── Selection ──

    pub fn is_selected(&self, vertex: usize) -> bool {
        self.selected.contains(&vertex)
    }

    /// Add the vertex to the selection, or remove it if already present.
    pub fn toggle_selected(&mut self, vertex: usize) {
        debug_assert!(vertex < self.graph.vertices.len());
        match self.selected.iter().position(|&v| v == vertex) {
            Some(at) => {
                self.selected.remove(at);
            }
            None => self.selected.push(vertex),
        }
    }

    pub fn select_all(&mut self) {
        self.selected = (0..self.graph.vertices.len()).collect();
    }

    /// Replace the selection with the vertices connected to `vertex`.
    pub fn select_adjacent(&mut self, vertex: usize) {
        self.selected.clear();
        for conn in &self.graph.connections {
            if conn.first == vertex {
                self.selected.push(conn.second);
            } else if conn.second == vertex {
                self.selected.push(conn.first);
            }
        }
    }

    /// Center of the selection's bounding box.
    fn selected_center(&self) -> DVec2 {
        let mut min = DVec2::splat(f64::MAX);
        let mut max = DVec2::splat(f64::MIN);
        for &v in &self.selected {
            let pos = self.graph.vertices[v].position;
            min = min.min(pos);
            max = max.max(pos);
        }
        min + (max - min) * 0.5
    }

    // ── Editing ops ──

    pub fn flip_horizontal(&mut self) {
        if self.selected.is_empty() {
            return;
        }
        let center = self.selected_center();
        for &v in &self.selected {
            let pos = &mut self.graph.vertices[v].position;
            pos.x += (center.x - pos.x) * 2.0;
        }
    }

    pub fn flip_vertical(&mut self) {
        if self.selected.is_empty() {
            return;
        }
        let center = self.selected_center();
        for &v in &self.selected {
            let pos = &mut self.graph.vertices[v].position;
            pos.y += (center.y - pos.y) * 2.0;
        }
    }

    /// Set or clear `moved` on the selection, or on every vertex when the
    /// selection is empty.
    pub fn mark_moved(&mut self, moved: bool) {
        if self.selected.is_empty() {
            for v in &mut self.graph.vertices {
                v.moved = moved;
            }
        } else {
            for &i in &self.selected {
                self.graph.vertices[i].moved = moved;
            }
        }
    }

    /// Scatter every vertex uniformly over the virtual square.
    pub fn shuffle_vertices<R: Rng>(&mut self, rng: &mut R) {
        for v in &mut self.graph.vertices {
            v.position = DVec2::new(rng.gen::<f64>() * 2.0 - 1.0, rng.gen::<f64>() * 2.0 - 1.0);
            v.moved = false;
        }
    }

    pub fn reset_viewpoint(&mut self) {
        self.camera = DVec2::ZERO;
        self.zoom = 1.0;
    }

    /// Cycle the grid spacing: off -> MAX -> halves -> off.
    pub fn cycle_grid(&mut self) {
        if self.grid_size == 0 {
            self.grid_size = MAX_GRID_SIZE;
        } else {
            self.grid_size /= 2;
            if self.grid_size < MIN_GRID_SIZE {
                self.grid_size = 0;
            }
        }
    }

    /// Snap each selected vertex's current screen position to the grid.
    pub fn snap_selected(&mut self) {
        if self.grid_size == 0 {
            return;
        }
        let view = self.view();
        for &i in &self.selected {
            let pos = &mut self.graph.vertices[i].position;
            *pos = view.to_virtual(snap_to_grid(view.to_screen(*pos), self.grid_size));
        }
    }

    // ── Failure flags ──

    /// Clear `failed` on every edge touching `vertex`.
    pub fn clear_failed_around(&mut self, vertex: usize) {
        for conn in &mut self.graph.connections {
            if conn.has_vertex(vertex) {
                conn.failed = false;
            }
        }
    }

    /// Clear `failed` on every edge touching any selected vertex.
    pub fn clear_failed_selected(&mut self) {
        for conn in &mut self.graph.connections {
            if self.selected.iter().any(|&v| conn.has_vertex(v)) {
                conn.failed = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::{Connection, Vertex};

    fn square_world() -> GameState {
        let mut world = GameState::new();
        world.view_w = 800;
        world.view_h = 600;
        world.graph.vertices = vec![
            Vertex::new(DVec2::new(-0.5, -0.5)),
            Vertex::new(DVec2::new(0.5, -0.5)),
            Vertex::new(DVec2::new(0.5, 0.5)),
            Vertex::new(DVec2::new(-0.5, 0.5)),
        ];
        world.graph.connections = vec![
            Connection::new(0, 1),
            Connection::new(1, 2),
            Connection::new(2, 3),
        ];
        world
    }

    #[test]
    fn grid_snap_rounds_half_boundary_up() {
        assert_eq!(snap_to_grid(IVec2::new(40, 0), 16).x, 48);
        assert_eq!(snap_to_grid(IVec2::new(39, 0), 16).x, 32);
        assert_eq!(snap_to_grid(IVec2::new(32, 0), 16).x, 32);
        assert_eq!(snap_to_grid(IVec2::new(0, 40), 16).y, 48);
    }

    #[test]
    fn grid_snap_off_is_identity() {
        let pt = IVec2::new(37, 91);
        assert_eq!(snap_to_grid(pt, 0), pt);
    }

    #[test]
    fn view_round_trip() {
        let view = View {
            camera: DVec2::new(0.25, -0.1),
            zoom: 1.5,
            width: 800,
            height: 600,
        };
        let v = DVec2::new(0.3, -0.4);
        let back = view.to_virtual(view.to_screen(v));
        // Screen space is integral, so allow one pixel of quantisation.
        assert!((back - v).length() < 2.0 / (1.5 * 300.0));
    }

    #[test]
    fn toggle_selected_adds_and_removes() {
        let mut world = square_world();
        world.toggle_selected(1);
        world.toggle_selected(2);
        assert_eq!(world.selected, vec![1, 2]);
        world.toggle_selected(1);
        assert_eq!(world.selected, vec![2]);
    }

    #[test]
    fn select_adjacent_replaces_selection() {
        let mut world = square_world();
        world.selected = vec![0, 3];
        world.select_adjacent(1);
        assert_eq!(world.selected, vec![0, 2]);
    }

    #[test]
    fn flip_horizontal_mirrors_about_selection_center() {
        let mut world = square_world();
        world.selected = vec![0, 1];
        world.flip_horizontal();
        assert_eq!(world.graph.vertices[0].position, DVec2::new(0.5, -0.5));
        assert_eq!(world.graph.vertices[1].position, DVec2::new(-0.5, -0.5));
        // Unselected vertices stay put.
        assert_eq!(world.graph.vertices[2].position, DVec2::new(0.5, 0.5));
    }

    #[test]
    fn mark_moved_targets_selection_or_everything() {
        let mut world = square_world();
        world.selected = vec![2];
        world.mark_moved(true);
        assert!(world.graph.vertices[2].moved);
        assert!(!world.graph.vertices[0].moved);

        world.selected.clear();
        world.mark_moved(true);
        assert!(world.graph.vertices.iter().all(|v| v.moved));
    }

    #[test]
    fn grid_cycle_sequence() {
        let mut world = square_world();
        world.grid_size = 0;
        let mut seen = vec![];
        for _ in 0..4 {
            world.cycle_grid();
            seen.push(world.grid_size);
        }
        assert_eq!(seen, vec![32, 16, 8, 0]);
    }

    #[test]
    fn clear_failed_around_only_touches_incident_edges() {
        let mut world = square_world();
        for conn in &mut world.graph.connections {
            conn.failed = true;
        }
        world.clear_failed_around(0);
        assert!(!world.graph.connections[0].failed);
        assert!(world.graph.connections[1].failed);
        assert!(world.graph.connections[2].failed);
    }

    #[test]
    fn clear_failed_selected_covers_all_selected() {
        let mut world = square_world();
        for conn in &mut world.graph.connections {
            conn.failed = true;
        }
        world.selected = vec![0, 2];
        world.clear_failed_selected();
        assert!(world.graph.connections.iter().all(|c| !c.failed));
    }
}
