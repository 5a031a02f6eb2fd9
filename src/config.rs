use clap::ValueEnum;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How the crosshair tracks the pointer during a drill.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum CursorMode {
    /// Crosshair pinned to the playfield center; vertical pointer motion
    /// feeds recoil compensation instead.
    Fixed,
    /// Crosshair follows the pointer; tracking is the whole exercise.
    Free,
}

/// Drill parameters. Immutable for the lifetime of a session; the engine
/// re-reads them every frame so edits between sessions just work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub countdown_secs: u32,
    pub duration_secs: u32,
    /// Target radius, logical px.
    pub target_radius: f64,
    /// Crosshair half-length, logical px.
    pub crosshair_len: f64,
    /// Baseline upward drift, px/s.
    pub recoil_speed: f64,
    /// Symmetric random amplitude added to the drift each frame, px/s.
    pub recoil_jitter: f64,
    /// Multiplier applied to vertical pointer deltas in fixed mode.
    pub compensation_gain: f64,
    /// Window after session start during which downward motion is ignored.
    pub grace_ms: u64,
    /// Minimum |pointer delta| that counts as compensation, px.
    pub dead_zone: f64,
    pub cursor_mode: CursorMode,
    pub show_path: bool,
    pub show_heatmap: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            countdown_secs: 3,
            duration_secs: 30,
            target_radius: 20.0,
            crosshair_len: 12.0,
            recoil_speed: 120.0,
            recoil_jitter: 40.0,
            compensation_gain: 1.0,
            grace_ms: 250,
            dead_zone: 1.0,
            cursor_mode: CursorMode::Fixed,
            show_path: false,
            show_heatmap: false,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        if self.duration_secs < 5 {
            return Err("duration must be at least 5 seconds".into());
        }
        if self.target_radius <= 0.0 {
            return Err("target radius must be positive".into());
        }
        if self.crosshair_len <= 0.0 {
            return Err("crosshair length must be positive".into());
        }
        Ok(())
    }
}

pub trait SettingsStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "flick") {
            pd.config_dir().join("settings.json")
        } else {
            PathBuf::from("flick_settings.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Settings {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(settings) = serde_json::from_slice::<Settings>(&bytes) {
                return settings;
            }
            log::warn!("ignoring unreadable settings file {:?}", self.path);
        }
        Settings::default()
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
