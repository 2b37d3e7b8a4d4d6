/// Persisted player records: the high score and the settings blob.
///
/// Two small files under the per-OS config directory.  Every load falls back
/// to defaults on any error and every save swallows I/O failures — a missing
/// or corrupt record never blocks play.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::entities::Difficulty;

/// User-tunable settings, stored as a JSON object with camelCase keys.
/// Every field defaults independently so blobs written by older builds
/// still parse.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_sfx")]
    pub sfx_volume: f32,
    #[serde(default = "default_music")]
    pub music_volume: f32,
    #[serde(default = "default_difficulty")]
    pub difficulty: Difficulty,
}

fn default_sfx() -> f32 {
    0.8
}

fn default_music() -> f32 {
    0.6
}

fn default_difficulty() -> Difficulty {
    Difficulty::Normal
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            sfx_volume: default_sfx(),
            music_volume: default_music(),
            difficulty: default_difficulty(),
        }
    }
}

// ── Paths ────────────────────────────────────────────────────────────────────

/// Our directory under the platform config dir, falling back to the current
/// directory when the platform reports none.
fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ninja_dash")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn high_score_path() -> PathBuf {
    config_dir().join("high_score")
}

// ── High score (bare integer string) ─────────────────────────────────────────

pub fn load_high_score_from(path: &Path) -> u32 {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

pub fn save_high_score_to(path: &Path, score: u32) {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = std::fs::write(path, score.to_string());
}

pub fn load_high_score() -> u32 {
    load_high_score_from(&high_score_path())
}

pub fn save_high_score(score: u32) {
    save_high_score_to(&high_score_path(), score);
}

// ── Settings blob ────────────────────────────────────────────────────────────

pub fn load_settings_from(path: &Path) -> Settings {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn save_settings_to(path: &Path, settings: &Settings) {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Ok(json) = serde_json::to_string_pretty(settings) {
        let _ = std::fs::write(path, json);
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

pub fn save_settings(settings: &Settings) {
    save_settings_to(&settings_path(), settings);
}
