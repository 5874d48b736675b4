/// Terminal event drain.
///
/// Converts crossterm events into the frontend-agnostic events the
/// controller consumes: pointer events in half-block pixel coordinates with
/// modifier state, key presses, resizes. Modifier bits ride on every
/// crossterm mouse event, so Alt/Ctrl tracking works on plain terminals;
/// explicit Alt-release events additionally arrive where the kitty keyboard
/// protocol is available and are forwarded for rotation cancel.

use std::io;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, ModifierKeyCode, MouseButton,
    MouseEventKind,
};
use glam::IVec2;

/// Half-block pixels per terminal row.
pub const PX_PER_ROW: i32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
}

impl Modifiers {
    #[allow(dead_code)]
    pub const NONE: Modifiers = Modifiers { alt: false, ctrl: false };

    fn from_crossterm(m: KeyModifiers) -> Self {
        Modifiers {
            alt: m.contains(KeyModifiers::ALT),
            ctrl: m.contains(KeyModifiers::CONTROL),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

#[derive(Clone, Copy, Debug)]
pub enum UiEvent {
    PointerDown { button: PointerButton, pos: IVec2, mods: Modifiers },
    PointerUp { button: PointerButton, pos: IVec2, mods: Modifiers },
    PointerMove { pos: IVec2, mods: Modifiers },
    Wheel { up: bool },
    Key { code: KeyCode, mods: Modifiers },
    AltReleased,
    Resized,
    Quit,
}

pub struct InputState {
    events: Vec<UiEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { events: Vec::with_capacity(16) }
    }

    /// Block up to `timeout` for the first event, then drain whatever else
    /// is pending. Call once per frame.
    pub fn poll(&mut self, timeout: Duration) -> io::Result<()> {
        if event::poll(timeout)? {
            self.push(event::read()?);
            while event::poll(Duration::ZERO)? {
                self.push(event::read()?);
            }
        }
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.events)
    }

    fn push(&mut self, ev: Event) {
        match ev {
            Event::Key(key) => match key.kind {
                KeyEventKind::Release => {
                    if matches!(
                        key.code,
                        KeyCode::Modifier(ModifierKeyCode::LeftAlt)
                            | KeyCode::Modifier(ModifierKeyCode::RightAlt)
                    ) {
                        self.events.push(UiEvent::AltReleased);
                    }
                }
                _ => {
                    let mods = Modifiers::from_crossterm(key.modifiers);
                    if mods.ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C')) {
                        self.events.push(UiEvent::Quit);
                    } else {
                        self.events.push(UiEvent::Key { code: key.code, mods });
                    }
                }
            },
            Event::Mouse(me) => {
                let pos = IVec2::new(i32::from(me.column), i32::from(me.row) * PX_PER_ROW);
                let mods = Modifiers::from_crossterm(me.modifiers);
                match me.kind {
                    MouseEventKind::Down(b) => {
                        if let Some(button) = convert_button(b) {
                            self.events.push(UiEvent::PointerDown { button, pos, mods });
                        }
                    }
                    MouseEventKind::Up(b) => {
                        if let Some(button) = convert_button(b) {
                            self.events.push(UiEvent::PointerUp { button, pos, mods });
                        }
                    }
                    MouseEventKind::Drag(_) | MouseEventKind::Moved => {
                        self.events.push(UiEvent::PointerMove { pos, mods });
                    }
                    MouseEventKind::ScrollUp => self.events.push(UiEvent::Wheel { up: true }),
                    MouseEventKind::ScrollDown => self.events.push(UiEvent::Wheel { up: false }),
                    _ => {}
                }
            }
            Event::Resize(..) => self.events.push(UiEvent::Resized),
            _ => {}
        }
    }
}

fn convert_button(b: MouseButton) -> Option<PointerButton> {
    match b {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => None,
    }
}
