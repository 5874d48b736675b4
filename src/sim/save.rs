/// Save and load the game snapshot.
///
/// One snapshot file, written on exit and read on startup. The payload is a
/// postcard-encoded struct whose declaration order is the on-disk field
/// order; a leading version number gates the whole snapshot. Any load
/// problem — missing file, truncated bytes, version mismatch, out-of-range
/// indices — discards the save and the game starts from a fresh level 1.
/// Write errors are ignored by the caller; losing a save never interrupts
/// play.

use std::io;
use std::path::PathBuf;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::domain::graph::{Connection, Graph, Vertex};
use crate::sim::world::GameState;

const SAVE_VERSION: u32 = 1;
const SAVE_FILE: &str = "save.dat";

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct SaveData {
    version: u32,
    vertices: Vec<Vertex>,
    connections: Vec<Connection>,
    selected: Vec<usize>,
    camera: DVec2,
    zoom: f64,
    elapsed: f64,
    score: i32,
    level: i32,
    grid_size: i32,
}

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

fn save_dir() -> PathBuf {
    // 1. Exe directory (portable installs), if writable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            let test_path = parent.join(".write_test_untangle");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home for system installs
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/untangle");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. Fallback to CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn save_path() -> PathBuf {
    save_dir().join(SAVE_FILE)
}

// ══════════════════════════════════════════════════════════════
// Capture / restore (GameState ↔ SaveData)
// ══════════════════════════════════════════════════════════════

fn capture(world: &GameState) -> SaveData {
    SaveData {
        version: SAVE_VERSION,
        vertices: world.graph.vertices.clone(),
        connections: world.graph.connections.clone(),
        selected: world.selected.clone(),
        camera: world.camera,
        zoom: world.zoom,
        elapsed: world.elapsed_seconds(),
        score: world.score,
        level: world.level,
        grid_size: world.grid_size,
    }
}

/// Overwrite the world with a snapshot. The level timer restarts now,
/// carrying the saved elapsed seconds.
fn restore(world: &mut GameState, data: SaveData) {
    world.graph = Graph {
        vertices: data.vertices,
        connections: data.connections,
    };
    world.selected = data.selected;
    world.camera = data.camera;
    world.zoom = data.zoom;
    world.score = data.score;
    world.level = data.level;
    world.grid_size = data.grid_size;
    world.restore_timer(data.elapsed);
}

/// A snapshot is only trusted if every cross-reference and range invariant
/// holds; a stale or corrupt file must never install a broken world.
fn validate(data: &SaveData) -> bool {
    let vertex_count = data.vertices.len();
    data.version == SAVE_VERSION
        && data.level >= 1
        && data.score >= 0
        && data.zoom > 0.0
        && (data.grid_size == 0
            || (data.grid_size > 0 && data.grid_size & (data.grid_size - 1) == 0))
        && data
            .connections
            .iter()
            .all(|c| c.first < vertex_count && c.second < vertex_count && c.first != c.second)
        && data.selected.iter().all(|&v| v < vertex_count)
        && data
            .selected
            .iter()
            .enumerate()
            .all(|(i, v)| !data.selected[..i].contains(v))
}

// ══════════════════════════════════════════════════════════════
// Encoding
// ══════════════════════════════════════════════════════════════

fn encode(data: &SaveData) -> Option<Vec<u8>> {
    postcard::to_stdvec(data).ok()
}

fn decode(bytes: &[u8]) -> Option<SaveData> {
    let data: SaveData = postcard::from_bytes(bytes).ok()?;
    validate(&data).then_some(data)
}

// ══════════════════════════════════════════════════════════════
// File operations
// ══════════════════════════════════════════════════════════════

pub fn save_game(world: &GameState) -> io::Result<()> {
    let bytes = encode(&capture(world))
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "snapshot encoding failed"))?;
    std::fs::write(save_path(), bytes)
}

/// Load the snapshot into the world. Returns false (world untouched) when
/// there is no usable save.
pub fn load_game(world: &mut GameState) -> bool {
    let bytes = match std::fs::read(save_path()) {
        Ok(b) => b,
        Err(_) => return false,
    };
    match decode(&bytes) {
        Some(data) => {
            restore(world, data);
            true
        }
        None => false,
    }
}
