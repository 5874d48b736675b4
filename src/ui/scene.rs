/// Scene description: everything the renderer draws, computed purely from
/// game and controller state. Drawing code stays free of game rules, and
/// tests can assert on colour classes without a terminal.

use glam::{DVec2, IVec2};

use crate::sim::world::GameState;
use crate::ui::controller::Controller;
use crate::ui::hud::BUTTONS;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexClass {
    Selected,
    AdjacentToHighlight,
    Highlighted,
    Default,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeClass {
    Failed,
    BothMoved,
    OneMoved,
    Unmoved,
}

#[derive(Clone, Copy, Debug)]
pub struct EdgeSprite {
    pub from: IVec2,
    pub to: IVec2,
    pub class: EdgeClass,
}

#[derive(Clone, Copy, Debug)]
pub struct VertexSprite {
    pub center: IVec2,
    pub radius: i32,
    pub class: VertexClass,
}

#[derive(Clone, Copy, Debug)]
pub struct ButtonSprite {
    pub center: IVec2,
    pub letter: char,
    /// Present while hovered or pressed.
    pub label: Option<&'static str>,
    pub pressed: bool,
}

pub struct Scene {
    pub width: i32,
    pub height: i32,
    pub grid_size: i32,
    pub edges: Vec<EdgeSprite>,
    pub vertices: Vec<VertexSprite>,
    /// Rubber-band corners in screen pixels.
    pub selection_box: Option<(IVec2, IVec2)>,
    pub buttons: Vec<ButtonSprite>,
    pub score: i32,
    pub level: i32,
    pub paused: bool,
}

pub fn build(world: &GameState, ctl: &Controller, paused: bool) -> Scene {
    let view = world.view();

    // Vertices adjacent to the highlighted one get flagged while walking
    // the connections.
    let mut adjacent = vec![false; world.graph.vertices.len()];
    let edges = world
        .graph
        .connections
        .iter()
        .map(|conn| {
            if let Some(h) = ctl.highlighted {
                if conn.first == h {
                    adjacent[conn.second] = true;
                } else if conn.second == h {
                    adjacent[conn.first] = true;
                }
            }
            let from = world.graph.vertices[conn.first];
            let to = world.graph.vertices[conn.second];
            let class = if conn.failed {
                EdgeClass::Failed
            } else if from.moved && to.moved {
                EdgeClass::BothMoved
            } else if from.moved || to.moved {
                EdgeClass::OneMoved
            } else {
                EdgeClass::Unmoved
            };
            EdgeSprite {
                from: view.to_screen(from.position),
                to: view.to_screen(to.position),
                class,
            }
        })
        .collect();

    let band = ctl.selection_rect(&view);
    let in_band = |pos: DVec2| {
        band.is_some_and(|(a, b)| {
            let min = a.min(b);
            let max = a.max(b);
            pos.x >= min.x && pos.x <= max.x && pos.y >= min.y && pos.y <= max.y
        })
    };

    let vertices = world
        .graph
        .vertices
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let class = if in_band(v.position) || world.is_selected(i) {
                VertexClass::Selected
            } else if adjacent[i] && band.is_none() {
                VertexClass::AdjacentToHighlight
            } else if ctl.highlighted == Some(i) {
                VertexClass::Highlighted
            } else {
                VertexClass::Default
            };
            VertexSprite {
                center: view.to_screen(v.position),
                radius: v.radius(),
                class,
            }
        })
        .collect();

    let selection_box = band.map(|(a, _)| (view.to_screen(a), ctl.cursor));

    let buttons = BUTTONS
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let hovered = ctl.button_over == Some(i);
            let pressed = ctl.pressed_button() == Some(i);
            ButtonSprite {
                center: b.center(&view),
                letter: b.letter,
                label: (hovered || pressed).then_some(b.label),
                pressed: pressed && hovered,
            }
        })
        .collect();

    Scene {
        width: view.width,
        height: view.height,
        grid_size: world.grid_size,
        edges,
        vertices,
        selection_box,
        buttons,
        score: world.score,
        level: world.level,
        paused,
    }
}
