/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    /// Longest an input poll may block; effectively the idle frame rate.
    pub poll_ms: u64,
    /// Zoom-out factor per wheel step; zoom-in uses the reciprocal.
    pub zoom_speed: f64,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    view: TomlView,
}

#[derive(Deserialize, Debug)]
struct TomlView {
    #[serde(default = "default_poll_ms")]
    poll_ms: u64,
    #[serde(default = "default_zoom_speed")]
    zoom_speed: f64,
}

fn default_poll_ms() -> u64 { 50 }
fn default_zoom_speed() -> f64 { 0.75 }

impl Default for TomlView {
    fn default() -> Self {
        TomlView {
            poll_ms: default_poll_ms(),
            zoom_speed: default_zoom_speed(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    pub fn load() -> Self {
        let toml_cfg = load_toml(&candidate_dirs());

        let zoom_speed = if toml_cfg.view.zoom_speed > 0.0 && toml_cfg.view.zoom_speed < 1.0 {
            toml_cfg.view.zoom_speed
        } else {
            eprintln!("Warning: zoom_speed must be strictly between 0 and 1; using default.");
            default_zoom_speed()
        };

        GameConfig {
            poll_ms: toml_cfg.view.poll_ms.max(1),
            zoom_speed,
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
