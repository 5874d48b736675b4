/// Pointer-driven interaction state machine.
///
/// One gesture at a time: dragging a vertex (or the whole selection),
/// rotating the selection about the press point, rubber-band selection,
/// panning the camera, or pressing a HUD button. A gesture starts on
/// pointer-down from Idle and ends on the matching button's release —
/// except rotation, which also aborts back to its snapshot when Alt goes
/// up. Highlight tracking runs on every pointer event regardless of the
/// active gesture.

use glam::{DVec2, IVec2};

use crate::sim::world::{snap_to_grid, GameState, View};
use crate::ui::hud::{self, Command};
use crate::ui::input::{Modifiers, PointerButton};

/// Screen-widths of pointer travel for one full rotation turn.
const ROTATIONS_PER_SCREEN: i32 = 4;

enum Gesture {
    Idle,
    /// Pressed vertex index. Moves the whole selection when one exists.
    DragVertex { vertex: usize },
    /// Selected vertex positions at press time; every move event re-derives
    /// from this snapshot so repeated rotation cannot drift.
    Rotate { saved: Vec<(usize, DVec2)> },
    Select,
    Pan { camera_start: DVec2 },
    PressButton { button: usize },
}

pub struct Controller {
    gesture: Gesture,
    /// Virtual-space press point of the active gesture.
    anchor: DVec2,
    /// Last seen pointer position in screen pixels.
    pub cursor: IVec2,
    pub highlighted: Option<usize>,
    pub button_over: Option<usize>,
    /// Something on screen changed; the frontend should repaint.
    pub dirty: bool,
}

impl Controller {
    pub fn new() -> Self {
        Controller {
            gesture: Gesture::Idle,
            anchor: DVec2::ZERO,
            cursor: IVec2::ZERO,
            highlighted: None,
            button_over: None,
            dirty: true,
        }
    }

    /// No gesture in flight.
    pub fn is_idle(&self) -> bool {
        matches!(self.gesture, Gesture::Idle)
    }

    /// Forget gesture and hover state. Call when the graph is replaced.
    pub fn reset(&mut self) {
        self.gesture = Gesture::Idle;
        self.highlighted = None;
        self.button_over = None;
        self.dirty = true;
    }

    pub fn pointer_down(
        &mut self,
        world: &mut GameState,
        button: PointerButton,
        pos: IVec2,
        mods: Modifiers,
    ) {
        self.cursor = pos;
        if !matches!(self.gesture, Gesture::Idle) {
            return;
        }
        let view = world.view();
        self.anchor = view.to_virtual(pos);

        match button {
            PointerButton::Primary => {
                self.update_highlight(world, pos);
                if let Some(vertex) = self.highlighted {
                    if mods.alt {
                        let saved = world
                            .selected
                            .iter()
                            .map(|&i| (i, world.graph.vertices[i].position))
                            .collect();
                        self.gesture = Gesture::Rotate { saved };
                    } else {
                        if mods.ctrl {
                            world.toggle_selected(vertex);
                        } else if !world.is_selected(vertex) {
                            // An unselected plain click drags this vertex alone.
                            world.selected.clear();
                        }
                        self.gesture = Gesture::DragVertex { vertex };
                    }
                } else if let Some(button) = hud::button_at(&view, pos) {
                    self.gesture = Gesture::PressButton { button };
                } else {
                    self.gesture = Gesture::Select;
                }
                self.dirty = true;
            }
            PointerButton::Secondary => {
                self.gesture = Gesture::Pan { camera_start: world.camera };
            }
        }
    }

    pub fn pointer_move(&mut self, world: &mut GameState, pos: IVec2, mods: Modifiers) {
        self.cursor = pos;
        self.update_highlight(world, pos);
        if !mods.alt && matches!(self.gesture, Gesture::Rotate { .. }) {
            // Alt went up between events; abort like an explicit release.
            self.cancel_rotation(world);
            return;
        }
        let view = world.view();

        match &self.gesture {
            Gesture::DragVertex { vertex } => {
                let vertex = *vertex;
                if world.selected.is_empty() {
                    let target = view.to_virtual(snap_to_grid(pos, world.grid_size));
                    let v = &mut world.graph.vertices[vertex];
                    v.position = target;
                    v.moved = true;
                } else {
                    // Group translate: incremental, never snapped.
                    let current = view.to_virtual(pos);
                    let delta = current - self.anchor;
                    for &i in &world.selected {
                        world.graph.vertices[i].position += delta;
                    }
                    self.anchor = current;
                }
                self.dirty = true;
            }
            Gesture::Rotate { saved } => {
                let anchor_px = view.to_screen(self.anchor);
                let travel = (pos.x - anchor_px.x) + (anchor_px.y - pos.y);
                if travel == 0 {
                    // Zero angle restores the snapshot bit-for-bit.
                    for &(i, origin) in saved {
                        world.graph.vertices[i].position = origin;
                    }
                } else {
                    let angle = f64::from(travel) * std::f64::consts::TAU
                        / f64::from((view.width / ROTATIONS_PER_SCREEN).max(1));
                    let rot = DVec2::from_angle(angle);
                    for &(i, origin) in saved {
                        world.graph.vertices[i].position =
                            self.anchor + rot.rotate(origin - self.anchor);
                    }
                }
                self.dirty = true;
            }
            Gesture::Select => self.dirty = true,
            Gesture::Pan { camera_start } => {
                let camera_start = *camera_start;
                // Measure against the press-time camera so the pan does not
                // feed back into its own pointer mapping.
                world.camera = camera_start;
                let current = world.view().to_virtual(pos);
                world.camera = camera_start - (current - self.anchor);
                self.dirty = true;
            }
            Gesture::Idle | Gesture::PressButton { .. } => {
                let over = hud::button_at(&view, pos);
                if over != self.button_over {
                    self.button_over = over;
                    self.dirty = true;
                }
            }
        }
    }

    /// Finish the active gesture if `button` matches it. Returns the command
    /// of a button whose press and release both landed inside it.
    pub fn pointer_up(
        &mut self,
        world: &mut GameState,
        button: PointerButton,
        pos: IVec2,
        mods: Modifiers,
    ) -> Option<Command> {
        self.cursor = pos;
        let view = world.view();
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        match (button, gesture) {
            (PointerButton::Primary, Gesture::DragVertex { vertex }) => {
                if world.selected.is_empty() {
                    world.clear_failed_around(vertex);
                } else {
                    world.clear_failed_selected();
                }
                self.dirty = true;
                None
            }
            (PointerButton::Primary, Gesture::Select) => {
                let inside = vertices_in_rect(world, self.anchor, view.to_virtual(pos));
                if mods.ctrl {
                    for i in inside {
                        world.toggle_selected(i);
                    }
                } else {
                    world.selected = inside;
                }
                self.dirty = true;
                None
            }
            (PointerButton::Primary, Gesture::Rotate { .. }) => {
                // Release commits the rotated positions.
                self.dirty = true;
                None
            }
            (PointerButton::Primary, Gesture::PressButton { button: pressed }) => {
                self.dirty = true;
                if hud::button_at(&view, pos) == Some(pressed) {
                    Some(hud::BUTTONS[pressed].command)
                } else {
                    None
                }
            }
            (PointerButton::Secondary, Gesture::Pan { .. }) => None,
            (_, gesture) => {
                // Release of a button that is not driving this gesture.
                self.gesture = gesture;
                None
            }
        }
    }

    /// Alt released with no pointer release pending: abort rotation.
    pub fn alt_released(&mut self, world: &mut GameState) {
        if matches!(self.gesture, Gesture::Rotate { .. }) {
            self.cancel_rotation(world);
        }
    }

    fn cancel_rotation(&mut self, world: &mut GameState) {
        if let Gesture::Rotate { saved } = std::mem::replace(&mut self.gesture, Gesture::Idle) {
            for (i, origin) in saved {
                world.graph.vertices[i].position = origin;
            }
            self.dirty = true;
        }
    }

    /// Topmost vertex (reverse index order) whose hit circle contains the
    /// pointer. Runs on every pointer event, independent of the gesture.
    pub fn update_highlight(&mut self, world: &GameState, pos: IVec2) {
        let view = world.view();
        let hit = world
            .graph
            .vertices
            .iter()
            .enumerate()
            .rev()
            .find(|(_, v)| {
                let d = pos - view.to_screen(v.position);
                d.x * d.x + d.y * d.y <= v.radius() * v.radius()
            })
            .map(|(i, _)| i);
        if hit != self.highlighted {
            self.highlighted = hit;
            self.dirty = true;
        }
    }

    // ── Render surface ──

    pub fn pressed_button(&self) -> Option<usize> {
        match &self.gesture {
            Gesture::PressButton { button } => Some(*button),
            _ => None,
        }
    }

    /// Corners of the in-flight rubber band, in virtual space.
    pub fn selection_rect(&self, view: &View) -> Option<(DVec2, DVec2)> {
        match &self.gesture {
            Gesture::Select => Some((self.anchor, view.to_virtual(self.cursor))),
            _ => None,
        }
    }
}

/// Vertices inside the axis-aligned rectangle spanned by two corners.
fn vertices_in_rect(world: &GameState, a: DVec2, b: DVec2) -> Vec<usize> {
    let min = a.min(b);
    let max = a.max(b);
    world
        .graph
        .vertices
        .iter()
        .enumerate()
        .filter(|(_, v)| {
            v.position.x >= min.x
                && v.position.x <= max.x
                && v.position.y >= min.y
                && v.position.y <= max.y
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::{Connection, Vertex};

    const CTRL: Modifiers = Modifiers { alt: false, ctrl: true };
    const ALT: Modifiers = Modifiers { alt: true, ctrl: false };

    /// 800x600 viewport, zoom 1: virtual scale is 300 px, center (400, 300).
    fn test_world() -> GameState {
        let mut world = GameState::new();
        world.view_w = 800;
        world.view_h = 600;
        world.grid_size = 0;
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

    fn screen_of(world: &GameState, vertex: usize) -> IVec2 {
        world.view().to_screen(world.graph.vertices[vertex].position)
    }

    fn click(ctl: &mut Controller, world: &mut GameState, pos: IVec2, mods: Modifiers) {
        ctl.pointer_down(world, PointerButton::Primary, pos, mods);
        ctl.pointer_up(world, PointerButton::Primary, pos, mods);
    }

    #[test]
    fn ctrl_click_toggles_without_touching_the_rest() {
        let mut world = test_world();
        let mut ctl = Controller::new();
        world.selected = vec![0, 1];

        let p0 = screen_of(&world, 0);
        click(&mut ctl, &mut world, p0, CTRL);
        assert_eq!(world.selected, vec![1]);

        let p2 = screen_of(&world, 2);
        click(&mut ctl, &mut world, p2, CTRL);
        assert_eq!(world.selected, vec![1, 2]);
    }

    #[test]
    fn plain_click_on_unselected_vertex_clears_selection() {
        let mut world = test_world();
        let mut ctl = Controller::new();
        world.selected = vec![1, 2];

        let p0 = screen_of(&world, 0);
        ctl.pointer_down(&mut world, PointerButton::Primary, p0, Modifiers::NONE);
        assert!(world.selected.is_empty());
    }

    #[test]
    fn single_drag_snaps_and_marks_moved() {
        let mut world = test_world();
        let mut ctl = Controller::new();
        world.grid_size = 16;

        let start = screen_of(&world, 0);
        ctl.pointer_down(&mut world, PointerButton::Primary, start, Modifiers::NONE);
        ctl.pointer_move(&mut world, IVec2::new(40, 39), Modifiers::NONE);

        let expected = world.view().to_virtual(IVec2::new(48, 32));
        assert_eq!(world.graph.vertices[0].position, expected);
        assert!(world.graph.vertices[0].moved);
    }

    #[test]
    fn group_drag_translates_selection_unsnapped() {
        let mut world = test_world();
        let mut ctl = Controller::new();
        world.grid_size = 16;
        world.selected = vec![0, 1];
        let before: Vec<DVec2> = world.graph.vertices.iter().map(|v| v.position).collect();

        let start = screen_of(&world, 0);
        ctl.pointer_down(&mut world, PointerButton::Primary, start, Modifiers::NONE);
        ctl.pointer_move(&mut world, start + IVec2::new(30, -15), Modifiers::NONE);
        ctl.pointer_move(&mut world, start + IVec2::new(33, -15), Modifiers::NONE);

        // 33 px right, 15 px up at scale 300.
        let delta = DVec2::new(33.0 / 300.0, -15.0 / 300.0);
        assert!((world.graph.vertices[0].position - (before[0] + delta)).length() < 1e-9);
        assert!((world.graph.vertices[1].position - (before[1] + delta)).length() < 1e-9);
        // Unselected vertices never move.
        assert_eq!(world.graph.vertices[2].position, before[2]);
    }

    #[test]
    fn drag_release_clears_failed_on_touched_edges() {
        let mut world = test_world();
        let mut ctl = Controller::new();
        for conn in &mut world.graph.connections {
            conn.failed = true;
        }

        let pos = screen_of(&world, 0);
        ctl.pointer_down(&mut world, PointerButton::Primary, pos, Modifiers::NONE);
        ctl.pointer_up(&mut world, PointerButton::Primary, pos, Modifiers::NONE);

        assert!(!world.graph.connections[0].failed);
        assert!(world.graph.connections[1].failed);
    }

    #[test]
    fn rubber_band_replaces_selection() {
        let mut world = test_world();
        let mut ctl = Controller::new();
        world.selected = vec![3];

        // Rectangle over the top edge: vertices 0 and 1.
        let a = world.view().to_screen(DVec2::new(-0.7, -0.7));
        let b = world.view().to_screen(DVec2::new(0.7, -0.3));
        ctl.pointer_down(&mut world, PointerButton::Primary, a, Modifiers::NONE);
        ctl.pointer_move(&mut world, b, Modifiers::NONE);
        ctl.pointer_up(&mut world, PointerButton::Primary, b, Modifiers::NONE);

        assert_eq!(world.selected, vec![0, 1]);
    }

    #[test]
    fn rubber_band_with_ctrl_toggles_membership() {
        let mut world = test_world();
        let mut ctl = Controller::new();
        world.selected = vec![0, 3];

        let a = world.view().to_screen(DVec2::new(-0.7, -0.7));
        let b = world.view().to_screen(DVec2::new(0.7, -0.3));
        ctl.pointer_down(&mut world, PointerButton::Primary, a, CTRL);
        ctl.pointer_up(&mut world, PointerButton::Primary, b, CTRL);

        // 0 toggled out, 1 toggled in, 3 untouched.
        assert_eq!(world.selected, vec![3, 1]);
    }

    #[test]
    fn zero_travel_rotation_is_exact() {
        let mut world = test_world();
        let mut ctl = Controller::new();
        world.selected = vec![1, 2, 3];
        let before: Vec<DVec2> = world.graph.vertices.iter().map(|v| v.position).collect();

        let anchor = screen_of(&world, 1);
        ctl.pointer_down(&mut world, PointerButton::Primary, anchor, ALT);
        for _ in 0..50 {
            ctl.pointer_move(&mut world, anchor, ALT);
        }
        for (i, v) in world.graph.vertices.iter().enumerate() {
            assert_eq!(v.position, before[i], "vertex {i} drifted");
        }
    }

    #[test]
    fn quarter_screen_travel_rotates_quarter_turn() {
        let mut world = test_world();
        let mut ctl = Controller::new();
        world.selected = vec![2];

        let anchor = screen_of(&world, 1);
        let anchor_virtual = world.view().to_virtual(anchor);
        let origin = world.graph.vertices[2].position;

        ctl.pointer_down(&mut world, PointerButton::Primary, anchor, ALT);
        // One rotation per 200 px of travel; 50 px = quarter turn.
        ctl.pointer_move(&mut world, anchor + IVec2::new(50, 0), ALT);

        let expected = anchor_virtual
            + DVec2::from_angle(std::f64::consts::FRAC_PI_2).rotate(origin - anchor_virtual);
        assert!((world.graph.vertices[2].position - expected).length() < 1e-9);
    }

    #[test]
    fn alt_release_aborts_rotation_to_snapshot() {
        let mut world = test_world();
        let mut ctl = Controller::new();
        world.selected = vec![1, 2];
        let before: Vec<DVec2> = world.graph.vertices.iter().map(|v| v.position).collect();

        let anchor = screen_of(&world, 1);
        ctl.pointer_down(&mut world, PointerButton::Primary, anchor, ALT);
        ctl.pointer_move(&mut world, anchor + IVec2::new(37, -12), ALT);
        assert_ne!(world.graph.vertices[2].position, before[2]);

        ctl.alt_released(&mut world);
        for (i, v) in world.graph.vertices.iter().enumerate() {
            assert_eq!(v.position, before[i]);
        }
    }

    #[test]
    fn moving_without_alt_also_aborts_rotation() {
        let mut world = test_world();
        let mut ctl = Controller::new();
        world.selected = vec![2];
        let before = world.graph.vertices[2].position;

        let anchor = screen_of(&world, 1);
        ctl.pointer_down(&mut world, PointerButton::Primary, anchor, ALT);
        ctl.pointer_move(&mut world, anchor + IVec2::new(40, 0), ALT);
        ctl.pointer_move(&mut world, anchor + IVec2::new(60, 0), Modifiers::NONE);

        assert_eq!(world.graph.vertices[2].position, before);
    }

    #[test]
    fn secondary_drag_pans_camera() {
        let mut world = test_world();
        let mut ctl = Controller::new();
        world.camera = DVec2::new(0.1, 0.1);

        let start = IVec2::new(400, 300);
        ctl.pointer_down(&mut world, PointerButton::Secondary, start, Modifiers::NONE);
        ctl.pointer_move(&mut world, start + IVec2::new(60, -30), Modifiers::NONE);

        // 60 px right / 30 px up at scale 300 -> camera shifts the other way.
        let expected = DVec2::new(0.1 - 0.2, 0.1 + 0.1);
        assert!((world.camera - expected).length() < 1e-9);
    }

    #[test]
    fn mismatched_button_release_keeps_the_gesture() {
        let mut world = test_world();
        let mut ctl = Controller::new();

        let start = IVec2::new(400, 300);
        ctl.pointer_down(&mut world, PointerButton::Secondary, start, Modifiers::NONE);
        ctl.pointer_up(&mut world, PointerButton::Primary, start, Modifiers::NONE);
        ctl.pointer_move(&mut world, start + IVec2::new(30, 0), Modifiers::NONE);

        // Still panning.
        assert_ne!(world.camera, DVec2::ZERO);
    }

    #[test]
    fn highlight_picks_topmost_on_overlap() {
        let mut world = test_world();
        let mut ctl = Controller::new();
        world.graph.vertices[3].position = world.graph.vertices[0].position;

        ctl.update_highlight(&world, screen_of(&world, 0));
        assert_eq!(ctl.highlighted, Some(3));
    }
}
