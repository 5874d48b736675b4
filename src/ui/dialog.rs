/// Modal "skip to level" prompt.
///
/// Runs its own event loop over the current scene: digits append, Backspace
/// deletes, Enter confirms, Esc cancels. Non-digit characters are dropped
/// as they are typed. Confirming an empty input means level 1.

use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use crate::ui::renderer::Renderer;
use crate::ui::scene::Scene;

pub fn prompt_level(renderer: &mut Renderer, scene: &Scene) -> io::Result<Option<i32>> {
    let mut digits = String::new();
    loop {
        let text = format!("Skip to level: {digits}_");
        renderer.render(scene, Some(&text))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Release {
                continue;
            }
            match key.code {
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    if digits.len() < 6 {
                        digits.push(c);
                    }
                }
                KeyCode::Backspace => {
                    digits.pop();
                }
                KeyCode::Enter => return Ok(Some(digits.parse().unwrap_or(1))),
                KeyCode::Esc => return Ok(None),
                _ => {}
            }
        }
    }
}
