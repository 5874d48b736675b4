/// HUD command buttons.
///
/// Four round buttons anchored to the screen corners; a negative offset
/// hangs off the right/bottom edge. Pressing is purely visual — the command
/// fires when the pointer is released inside the same button, and dispatch
/// goes through the `Command` tag, not per-button callbacks.

use glam::IVec2;

use crate::sim::world::View;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    SkipToLevel,
    ShuffleVertices,
    CheckSolution,
    TogglePause,
}

pub const BUTTON_RADIUS: i32 = 5;
const SPACING: i32 = 2;

pub struct Button {
    pub letter: char,
    pub label: &'static str,
    pub command: Command,
    x_offset: i32,
    y_offset: i32,
}

pub const BUTTONS: [Button; 4] = [
    Button {
        letter: 'L',
        label: "Skip to Level",
        command: Command::SkipToLevel,
        x_offset: SPACING + BUTTON_RADIUS,
        y_offset: -(SPACING * 2) - BUTTON_RADIUS * 3,
    },
    Button {
        letter: 'S',
        label: "Shuffle Vertices",
        command: Command::ShuffleVertices,
        x_offset: SPACING + BUTTON_RADIUS,
        y_offset: -SPACING - BUTTON_RADIUS,
    },
    Button {
        letter: 'C',
        label: "Check Solution",
        command: Command::CheckSolution,
        x_offset: -SPACING - BUTTON_RADIUS,
        y_offset: -(SPACING * 2) - BUTTON_RADIUS * 3,
    },
    Button {
        letter: 'P',
        label: "Pause",
        command: Command::TogglePause,
        x_offset: -SPACING - BUTTON_RADIUS,
        y_offset: -SPACING - BUTTON_RADIUS,
    },
];

impl Button {
    pub fn center(&self, view: &View) -> IVec2 {
        IVec2::new(
            if self.x_offset < 0 { view.width + self.x_offset } else { self.x_offset },
            if self.y_offset < 0 { view.height + self.y_offset } else { self.y_offset },
        )
    }

    pub fn contains(&self, view: &View, pos: IVec2) -> bool {
        let d = pos - self.center(view);
        d.x * d.x + d.y * d.y <= BUTTON_RADIUS * BUTTON_RADIUS
    }
}

/// Index of the button under the pointer, if any.
pub fn button_at(view: &View, pos: IVec2) -> Option<usize> {
    BUTTONS.iter().position(|b| b.contains(view, pos))
}
