/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use rand::rngs::StdRng;
use rand::SeedableRng;

use config::GameConfig;
use sim::world::GameState;
use sim::{generate, save, verify};
use ui::controller::Controller;
use ui::dialog;
use ui::hud::Command;
use ui::input::{InputState, UiEvent};
use ui::renderer::Renderer;
use ui::scene;

fn main() {
    let config = GameConfig::load();
    let mut rng = StdRng::from_entropy();

    let mut world = GameState::new();
    let (view_w, view_h) = Renderer::pixel_size();
    world.view_w = view_w;
    world.view_h = view_h;

    // Fresh level 1, then let a usable save replace it.
    generate::start_level(&mut world, 1, &mut rng);
    save::load_game(&mut world);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &config, &mut rng);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    // Losing the save is not worth interrupting the exit for.
    let _ = save::save_game(&world);

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Untangle!");
    println!("Final Score: {}", world.score);
}

fn game_loop(
    world: &mut GameState,
    renderer: &mut Renderer,
    config: &GameConfig,
    rng: &mut StdRng,
) -> io::Result<()> {
    let mut input = InputState::new();
    let mut ctl = Controller::new();
    let poll_timeout = Duration::from_millis(config.poll_ms);

    loop {
        input.poll(poll_timeout)?;

        for ev in input.take_events() {
            match ev {
                UiEvent::Quit => return Ok(()),
                UiEvent::Resized => {
                    let (view_w, view_h) = Renderer::pixel_size();
                    world.view_w = view_w;
                    world.view_h = view_h;
                    ctl.dirty = true;
                }
                UiEvent::PointerDown { button, pos, mods } => {
                    ctl.pointer_down(world, button, pos, mods);
                }
                UiEvent::PointerMove { pos, mods } => {
                    ctl.pointer_move(world, pos, mods);
                }
                UiEvent::PointerUp { button, pos, mods } => {
                    if let Some(cmd) = ctl.pointer_up(world, button, pos, mods) {
                        if run_command(cmd, world, renderer, &mut ctl, rng)? {
                            return Ok(());
                        }
                    }
                }
                UiEvent::Wheel { up } => {
                    // No zooming while a gesture is in flight.
                    if ctl.is_idle() {
                        world.zoom *=
                            if up { 1.0 / config.zoom_speed } else { config.zoom_speed };
                        ctl.dirty = true;
                    }
                }
                UiEvent::AltReleased => ctl.alt_released(world),
                UiEvent::Key { code, .. } => {
                    if handle_key(code, world, renderer, &mut ctl)? {
                        return Ok(());
                    }
                }
            }
        }

        if ctl.dirty {
            let frame = scene::build(world, &ctl, false);
            renderer.render(&frame, None)?;
            ctl.dirty = false;
        }
    }
}

/// Keyboard commands. Returns true when the game should quit.
fn handle_key(
    code: KeyCode,
    world: &mut GameState,
    renderer: &mut Renderer,
    ctl: &mut Controller,
) -> io::Result<bool> {
    let ch = match code {
        KeyCode::Char(c) => c.to_ascii_uppercase(),
        KeyCode::Esc => return Ok(true),
        _ => return Ok(false),
    };

    match ch {
        'Q' => return Ok(true),
        'H' => {
            world.flip_horizontal();
            ctl.dirty = true;
        }
        'V' => {
            world.flip_vertical();
            ctl.dirty = true;
        }
        'R' => {
            world.reset_viewpoint();
            world.mark_moved(false);
            ctl.dirty = true;
        }
        'M' => {
            world.mark_moved(true);
            ctl.dirty = true;
        }
        'G' => {
            world.cycle_grid();
            ctl.dirty = true;
        }
        'S' => {
            world.snap_selected();
            ctl.dirty = true;
        }
        'C' => {
            if let Some(h) = ctl.highlighted {
                world.select_adjacent(h);
                ctl.dirty = true;
            }
        }
        'A' => {
            world.select_all();
            ctl.dirty = true;
        }
        'P' => return pause(world, renderer, ctl),
        _ => {}
    }
    Ok(false)
}

/// Button commands. Returns true when the game should quit.
fn run_command(
    cmd: Command,
    world: &mut GameState,
    renderer: &mut Renderer,
    ctl: &mut Controller,
    rng: &mut StdRng,
) -> io::Result<bool> {
    match cmd {
        Command::SkipToLevel => {
            let frame = scene::build(world, ctl, false);
            if let Some(level) = dialog::prompt_level(renderer, &frame)? {
                world.score = 0;
                generate::start_level(world, level.max(1), rng);
                ctl.reset();
            }
            ctl.dirty = true;
        }
        Command::ShuffleVertices => {
            world.shuffle_vertices(rng);
            ctl.dirty = true;
        }
        Command::CheckSolution => {
            let elapsed = world.elapsed_seconds();
            if verify::check_solution(world, elapsed, rng) {
                ctl.reset();
            }
            ctl.dirty = true;
        }
        Command::TogglePause => return pause(world, renderer, ctl),
    }
    Ok(false)
}

/// Nested modal loop: only quit/resize/repaint and the resume click get
/// through. The paused span is refunded to the level timer afterwards.
fn pause(world: &mut GameState, renderer: &mut Renderer, ctl: &mut Controller) -> io::Result<bool> {
    let paused_at = Instant::now();
    let frame = scene::build(world, ctl, true);
    renderer.render(&frame, None)?;

    let quit = loop {
        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
                {
                    break true;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => break true,
                    KeyCode::Char('p') | KeyCode::Char('P') => break false,
                    _ => {}
                }
            }
            Event::Mouse(me) => {
                if let MouseEventKind::Down(MouseButton::Left) = me.kind {
                    break false;
                }
            }
            Event::Resize(..) => {
                let (view_w, view_h) = Renderer::pixel_size();
                world.view_w = view_w;
                world.view_h = view_h;
                let frame = scene::build(world, ctl, true);
                renderer.render(&frame, None)?;
            }
            _ => {}
        }
    };

    world.credit_pause(paused_at.elapsed().as_secs_f64());
    ctl.dirty = true;
    Ok(quit)
}
