/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// The playfield is rasterised into a pixel grid with two pixels per
/// terminal row, then emitted as upper-half-block cells (foreground = top
/// pixel, background = bottom pixel), which makes the pixels roughly
/// square. Text — HUD, button letters, overlays — replaces whole cells on
/// top of the composed playfield.
///
/// Frame pipeline:
///   1. Rasterise the Scene into the pixel buffer
///   2. Compose pixels + text into the `front` cell buffer
///   3. Diff against `back` (previous frame), emit only changed cells
///   4. Batch with `queue!`, flush once, swap buffers

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use glam::IVec2;

use crate::ui::hud::BUTTON_RADIUS;
use crate::ui::input::PX_PER_ROW;
use crate::ui::scene::{EdgeClass, Scene, VertexClass};

const UPPER_HALF: char = '\u{2580}';

// ── Palette ──

const PAPER: Color = Color::Rgb { r: 255, g: 255, b: 255 };
const GRID: Color = Color::Rgb { r: 248, g: 248, b: 248 };
const BLACK: Color = Color::Rgb { r: 0, g: 0, b: 0 };
const RED: Color = Color::Rgb { r: 255, g: 0, b: 0 };
const BLUE: Color = Color::Rgb { r: 0, g: 0, b: 255 };
const GREEN: Color = Color::Rgb { r: 0, g: 128, b: 0 };
const DIM_GRAY: Color = Color::Rgb { r: 105, g: 105, b: 105 };
const DARK_GRAY: Color = Color::Rgb { r: 169, g: 169, b: 169 };
const DARK_CYAN: Color = Color::Rgb { r: 0, g: 139, b: 139 };
const PRESSED_LETTER: Color = Color::Rgb { r: 64, g: 64, b: 64 };

fn edge_color(class: EdgeClass) -> Color {
    match class {
        EdgeClass::Failed => RED,
        EdgeClass::BothMoved => BLACK,
        EdgeClass::OneMoved => DIM_GRAY,
        EdgeClass::Unmoved => DARK_GRAY,
    }
}

fn vertex_color(class: VertexClass) -> Color {
    match class {
        VertexClass::Selected => GREEN,
        VertexClass::AdjacentToHighlight => RED,
        VertexClass::Highlighted => PAPER,
        VertexClass::Default => BLUE,
    }
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: BLACK, bg: PAPER };

    /// Sentinel used to invalidate the back buffer; differs from any cell
    /// the compositor produces, so every position gets re-emitted.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

// ── PixelBuffer: the playfield raster ──

struct PixelBuffer {
    width: i32,
    height: i32,
    pixels: Vec<Color>,
}

/// Segments reaching further out than this are dropped rather than walked.
const CLIP_LIMIT: i32 = 10_000;

impl PixelBuffer {
    fn new() -> Self {
        PixelBuffer { width: 0, height: 0, pixels: vec![] }
    }

    fn reset(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize((width.max(0) * height.max(0)) as usize, PAPER);
    }

    #[inline]
    fn set(&mut self, x: i32, y: i32, color: Color) {
        if x >= 0 && x < self.width && y >= 0 && y < self.height {
            self.pixels[(y * self.width + x) as usize] = color;
        }
    }

    #[inline]
    fn get(&self, x: i32, y: i32) -> Color {
        if x >= 0 && x < self.width && y >= 0 && y < self.height {
            self.pixels[(y * self.width + x) as usize]
        } else {
            PAPER
        }
    }

    fn hline(&mut self, y: i32, color: Color) {
        for x in 0..self.width {
            self.set(x, y, color);
        }
    }

    fn vline(&mut self, x: i32, color: Color) {
        for y in 0..self.height {
            self.set(x, y, color);
        }
    }

    /// Bresenham segment.
    fn line(&mut self, a: IVec2, b: IVec2, color: Color) {
        let far = |p: IVec2| p.x.abs() > CLIP_LIMIT || p.y.abs() > CLIP_LIMIT;
        if far(a) || far(b) {
            return;
        }
        let dx = (b.x - a.x).abs();
        let dy = -(b.y - a.y).abs();
        let sx = if a.x < b.x { 1 } else { -1 };
        let sy = if a.y < b.y { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (a.x, a.y);
        loop {
            self.set(x, y, color);
            if x == b.x && y == b.y {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Filled disc with a one-pixel dark ring.
    fn circle(&mut self, center: IVec2, radius: i32, fill: Color, ring: Color) {
        let outer = radius + 1;
        for dy in -outer..=outer {
            for dx in -outer..=outer {
                let d2 = dx * dx + dy * dy;
                if d2 <= radius * radius {
                    self.set(center.x + dx, center.y + dy, fill);
                } else if d2 <= outer * outer {
                    self.set(center.x + dx, center.y + dy, ring);
                }
            }
        }
    }

    fn rect_outline(&mut self, a: IVec2, b: IVec2, color: Color) {
        let min = a.min(b);
        let max = a.max(b);
        self.line(IVec2::new(min.x, min.y), IVec2::new(max.x, min.y), color);
        self.line(IVec2::new(max.x, min.y), IVec2::new(max.x, max.y), color);
        self.line(IVec2::new(max.x, max.y), IVec2::new(min.x, max.y), color);
        self.line(IVec2::new(min.x, max.y), IVec2::new(min.x, min.y), color);
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    pixels: PixelBuffer,
    front: Vec<Cell>,
    back: Vec<Cell>,
    term_w: usize,
    term_h: usize,
    enhanced_keyboard: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            pixels: PixelBuffer::new(),
            front: vec![],
            back: vec![],
            term_w: 0,
            term_h: 0,
            enhanced_keyboard: false,
        }
    }

    /// Current playfield size in half-block pixels.
    pub fn pixel_size() -> (i32, i32) {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        (i32::from(tw), i32::from(th) * PX_PER_ROW)
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture,
            SetBackgroundColor(PAPER),
            Clear(ClearType::All)
        )?;
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced_keyboard = true;
        }
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced_keyboard {
            let _ = execute!(self.writer, PopKeyboardEnhancementFlags);
        }
        execute!(
            self.writer,
            DisableMouseCapture,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Draw one frame. `prompt` is an optional modal text overlay (the
    /// level dialog).
    pub fn render(&mut self, scene: &Scene, prompt: Option<&str>) -> io::Result<()> {
        let tw = scene.width.max(0) as usize;
        let th = (scene.height / PX_PER_ROW).max(0) as usize;
        if tw != self.term_w || th != self.term_h {
            self.term_w = tw;
            self.term_h = th;
            self.front = vec![Cell::BLANK; tw * th];
            self.back = vec![Cell::INVALID; tw * th];
            queue!(self.writer, SetBackgroundColor(PAPER), Clear(ClearType::All))?;
        }

        self.rasterise(scene);
        self.compose(scene, prompt);
        self.flush_diff()
    }

    // ── Rasterisation (pixel space) ──

    fn rasterise(&mut self, scene: &Scene) {
        self.pixels.reset(scene.width, scene.height);

        if scene.grid_size > 0 {
            let mut y = 0;
            while y < scene.height {
                self.pixels.hline(y, GRID);
                y += scene.grid_size;
            }
            let mut x = 0;
            while x < scene.width {
                self.pixels.vline(x, GRID);
                x += scene.grid_size;
            }
        }

        for edge in &scene.edges {
            self.pixels.line(edge.from, edge.to, edge_color(edge.class));
        }

        for v in &scene.vertices {
            self.pixels.circle(v.center, v.radius, vertex_color(v.class), BLACK);
        }

        if let Some((a, b)) = scene.selection_box {
            self.pixels.rect_outline(a, b, DARK_CYAN);
        }

        for b in &scene.buttons {
            self.pixels.circle(b.center, BUTTON_RADIUS, DARK_GRAY, DARK_GRAY);
        }
    }

    // ── Composition (cell space) ──

    fn compose(&mut self, scene: &Scene, prompt: Option<&str>) {
        for row in 0..self.term_h {
            for col in 0..self.term_w {
                let top = self.pixels.get(col as i32, row as i32 * PX_PER_ROW);
                let bottom = self.pixels.get(col as i32, row as i32 * PX_PER_ROW + 1);
                self.front[row * self.term_w + col] = if top == bottom {
                    Cell { ch: ' ', fg: BLACK, bg: top }
                } else {
                    Cell { ch: UPPER_HALF, fg: top, bg: bottom }
                };
            }
        }

        self.put_str(1, 0, &format!("Score: {}", scene.score), DIM_GRAY, PAPER);
        self.put_str(1, 1, &format!("Level: {}", scene.level), DIM_GRAY, PAPER);

        for b in &scene.buttons {
            let col = b.center.x;
            let row = b.center.y / PX_PER_ROW;
            let letter_fg = if b.pressed { PRESSED_LETTER } else { PAPER };
            self.put_char(col, row, b.letter, letter_fg, DARK_GRAY);
            if let Some(label) = b.label {
                let start = if b.center.x < scene.width / 2 {
                    col + BUTTON_RADIUS + 2
                } else {
                    col - BUTTON_RADIUS - 2 - label.len() as i32
                };
                self.put_str(start, row, label, DIM_GRAY, PAPER);
            }
        }

        if scene.paused {
            self.put_centered("Paused. Click to continue.", self.term_h / 2, DIM_GRAY, PAPER);
        }

        if let Some(text) = prompt {
            let row = self.term_h / 2;
            self.put_centered(text, row, BLACK, PAPER);
            self.put_centered("Enter = go    Esc = cancel", row + 2, DIM_GRAY, PAPER);
        }
    }

    fn put_char(&mut self, col: i32, row: i32, ch: char, fg: Color, bg: Color) {
        if col >= 0 && (col as usize) < self.term_w && row >= 0 && (row as usize) < self.term_h {
            self.front[row as usize * self.term_w + col as usize] = Cell { ch, fg, bg };
        }
    }

    fn put_str(&mut self, col: i32, row: i32, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.put_char(col + i as i32, row, ch, fg, bg);
        }
    }

    fn put_centered(&mut self, s: &str, row: usize, fg: Color, bg: Color) {
        let col = (self.term_w.saturating_sub(s.chars().count())) / 2;
        self.put_str(col as i32, row as i32, s, fg, bg);
    }

    // ── Diff + flush ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = None;
        let mut last_bg = None;
        let mut cursor_at: Option<(u16, u16)> = None;

        for row in 0..self.term_h {
            for col in 0..self.term_w {
                let idx = row * self.term_w + col;
                let cell = self.front[idx];
                if cell == self.back[idx] {
                    continue;
                }
                let here = (col as u16, row as u16);
                if cursor_at != Some(here) {
                    queue!(self.writer, MoveTo(here.0, here.1))?;
                }
                if last_fg != Some(cell.fg) {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = Some(cell.fg);
                }
                if last_bg != Some(cell.bg) {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = Some(cell.bg);
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((here.0 + 1, here.1));
            }
        }

        std::mem::swap(&mut self.front, &mut self.back);
        self.writer.flush()
    }
}
