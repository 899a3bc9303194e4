//! Persisted preferences: canvas size and the tool selection a new window
//! starts with.

use crate::shape::{Rgb, ShapeKind};
use serde::{Deserialize, Serialize};
use slowcore::storage::{config_dir, StorageError};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "slowshapes";

/// Largest canvas side accepted from the settings file.
pub const MAX_CANVAS_SIDE: u32 = 4096;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub default_kind: ShapeKind,
    pub default_color: Rgb,
    /// Entries kept in the "open recent" menu.
    pub recent_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas_width: 600,
            canvas_height: 300,
            default_kind: ShapeKind::Rectangle,
            default_color: Rgb::BLUE,
            recent_limit: 8,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Settings from `path`, or the defaults if the file is missing or
    /// unreadable. A zero canvas dimension falls back to the default size and
    /// an oversized one is clamped to `MAX_CANVAS_SIDE`.
    pub fn load_or_default(path: &Path) -> Self {
        let mut settings = match Self::load(path) {
            Ok(settings) => settings,
            Err(StorageError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
                Self::default()
            }
        };
        if settings.canvas_width == 0 || settings.canvas_height == 0 {
            tracing::warn!(
                width = settings.canvas_width,
                height = settings.canvas_height,
                "canvas size must be positive, using default"
            );
            let defaults = Self::default();
            settings.canvas_width = defaults.canvas_width;
            settings.canvas_height = defaults.canvas_height;
        }
        if settings.canvas_width > MAX_CANVAS_SIDE || settings.canvas_height > MAX_CANVAS_SIDE {
            tracing::warn!(
                width = settings.canvas_width,
                height = settings.canvas_height,
                max = MAX_CANVAS_SIDE,
                "canvas too large, clamping"
            );
            settings.canvas_width = settings.canvas_width.min(MAX_CANVAS_SIDE);
            settings.canvas_height = settings.canvas_height.min(MAX_CANVAS_SIDE);
        }
        settings
    }

    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        let contents = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }
}

pub fn settings_path() -> PathBuf {
    config_dir(APP_NAME).join("settings.json")
}

pub fn recent_path() -> PathBuf {
    config_dir(APP_NAME).join("recent.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("slowshapes-config-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!((s.canvas_width, s.canvas_height), (600, 300));
        assert_eq!(s.default_kind, ShapeKind::Rectangle);
        assert_eq!(s.default_color, Rgb::BLUE);
        assert_eq!(s.recent_limit, 8);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s: Settings = serde_json::from_str(r#"{"canvas_width": 800, "default_kind": "rounded_square"}"#).unwrap();
        assert_eq!(s.canvas_width, 800);
        assert_eq!(s.canvas_height, 300);
        assert_eq!(s.default_kind, ShapeKind::RoundedSquare);
        assert_eq!(s.default_color, Rgb::BLUE);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        assert_eq!(Settings::load_or_default(&scratch("nope.json")), Settings::default());
    }

    #[test]
    fn test_garbage_gives_defaults() {
        let path = scratch("garbage.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_or_default(&path), Settings::default());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_zero_canvas_falls_back() {
        let path = scratch("zero.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"canvas_width": 0, "recent_limit": 3}"#).unwrap();
        let s = Settings::load_or_default(&path);
        assert_eq!(s.canvas_width, 600);
        assert_eq!(s.recent_limit, 3);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_huge_canvas_is_clamped() {
        let path = scratch("huge.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"canvas_width": 100000, "canvas_height": 4096}"#).unwrap();
        let s = Settings::load_or_default(&path);
        assert_eq!((s.canvas_width, s.canvas_height), (MAX_CANVAS_SIDE, 4096));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_save_then_load() {
        let path = scratch("nested/settings.json");
        let s = Settings {
            canvas_width: 320,
            default_kind: ShapeKind::Line,
            default_color: Rgb::new(0.5, 0.25, 0.0),
            ..Settings::default()
        };
        s.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), s);
        std::fs::remove_file(&path).unwrap();
    }
}
