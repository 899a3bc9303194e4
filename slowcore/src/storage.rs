//! Storage utilities for Slow Computer apps
//!
//! File browser state for open/save dialogs, the recent-files list, and the
//! platform config and documents directories.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Most-recently-used file list, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RecentFiles {
    pub files: Vec<PathBuf>,
    pub max_entries: usize,
}

impl RecentFiles {
    pub fn new(max_entries: usize) -> Self {
        Self {
            files: Vec::new(),
            max_entries,
        }
    }

    /// Move `path` to the front, dropping duplicates and anything past `max_entries`.
    pub fn add(&mut self, path: PathBuf) {
        self.files.retain(|p| p != &path);
        self.files.insert(0, path);
        self.files.truncate(self.max_entries);
    }

    pub fn load(config_path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(config_path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Load the list, falling back to an empty one. A missing file is the
    /// normal first-run case and is not reported.
    pub fn load_or_new(config_path: &Path, max_entries: usize) -> Self {
        match Self::load(config_path) {
            Ok(mut recent) => {
                recent.max_entries = max_entries;
                recent.files.truncate(max_entries);
                recent
            }
            Err(StorageError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::new(max_entries),
            Err(e) => {
                tracing::warn!(path = %config_path.display(), error = %e, "ignoring unreadable recent files list");
                Self::new(max_entries)
            }
        }
    }

    pub fn save(&self, config_path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(config_path, contents)?;
        Ok(())
    }
}

/// Simple file browser state
#[derive(Debug, Clone)]
pub struct FileBrowser {
    pub current_dir: PathBuf,
    pub entries: Vec<FileEntry>,
    pub selected_index: Option<usize>,
    pub filter_extensions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
}

impl FileBrowser {
    pub fn new(start_dir: PathBuf) -> Self {
        let mut browser = Self {
            current_dir: start_dir,
            entries: Vec::new(),
            selected_index: None,
            filter_extensions: Vec::new(),
        };
        browser.refresh();
        browser
    }

    pub fn with_filter(mut self, extensions: Vec<String>) -> Self {
        self.filter_extensions = extensions;
        self.refresh();
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        if self.filter_extensions.is_empty() {
            return true;
        }
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        self.filter_extensions.iter().any(|f| f.to_lowercase() == ext)
    }

    pub fn refresh(&mut self) {
        self.entries.clear();
        self.selected_index = None;

        if let Some(parent) = self.current_dir.parent() {
            self.entries.push(FileEntry {
                name: "..".to_string(),
                path: parent.to_path_buf(),
                is_directory: true,
            });
        }

        let read_dir = match std::fs::read_dir(&self.current_dir) {
            Ok(read_dir) => read_dir,
            Err(e) => {
                tracing::warn!(dir = %self.current_dir.display(), error = %e, "cannot list directory");
                return;
            }
        };

        let mut dirs = Vec::new();
        let mut files = Vec::new();

        for entry in read_dir.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();

            // hidden
            if name.starts_with('.') {
                continue;
            }

            let is_directory = path.is_dir();
            if !is_directory && !self.accepts(&path) {
                continue;
            }

            let entry = FileEntry { name, path, is_directory };
            if is_directory {
                dirs.push(entry);
            } else {
                files.push(entry);
            }
        }

        dirs.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        files.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

        self.entries.extend(dirs);
        self.entries.extend(files);
    }

    pub fn navigate_to(&mut self, path: PathBuf) {
        if path.is_dir() {
            self.current_dir = path;
            self.refresh();
        }
    }

    pub fn selected_entry(&self) -> Option<&FileEntry> {
        self.selected_index.and_then(|i| self.entries.get(i))
    }

    pub fn select_by_name(&mut self, name: &str) {
        self.selected_index = self.entries.iter().position(|e| e.name == name);
    }

    /// Directory a typed filename is saved into: the selected folder if one
    /// is highlighted, otherwise the folder being shown.
    pub fn save_directory(&self) -> PathBuf {
        match self.selected_entry() {
            Some(entry) if entry.is_directory && entry.name != ".." => entry.path.clone(),
            _ => self.current_dir.clone(),
        }
    }
}

/// Get the config directory for Slow Computer apps
pub fn config_dir(app_name: &str) -> PathBuf {
    directories::ProjectDirs::from("co", "slowcomputer", app_name)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the documents directory
pub fn documents_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.document_dir().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("slowcore-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_recent_add_moves_to_front() {
        let mut recent = RecentFiles::new(3);
        recent.add("a.g".into());
        recent.add("b.g".into());
        recent.add("a.g".into());
        assert_eq!(recent.files, vec![PathBuf::from("a.g"), PathBuf::from("b.g")]);
    }

    #[test]
    fn test_recent_truncates() {
        let mut recent = RecentFiles::new(2);
        for name in ["a.g", "b.g", "c.g"] {
            recent.add(name.into());
        }
        assert_eq!(recent.files, vec![PathBuf::from("c.g"), PathBuf::from("b.g")]);
    }

    #[test]
    fn test_recent_save_load() {
        let dir = scratch_dir("recent");
        let path = dir.join("nested").join("recent.json");
        let mut recent = RecentFiles::new(4);
        recent.add("one.g".into());
        recent.save(&path).unwrap();

        let loaded = RecentFiles::load(&path).unwrap();
        assert_eq!(loaded.files, recent.files);
        assert_eq!(loaded.max_entries, 4);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_recent_load_or_new_missing_and_corrupt() {
        let dir = scratch_dir("recent-bad");
        let missing = RecentFiles::load_or_new(&dir.join("nope.json"), 5);
        assert!(missing.files.is_empty());
        assert_eq!(missing.max_entries, 5);

        let corrupt = dir.join("recent.json");
        std::fs::write(&corrupt, "{ not json").unwrap();
        assert!(RecentFiles::load_or_new(&corrupt, 5).files.is_empty());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_browser_filters_and_sorts() {
        let dir = scratch_dir("browser");
        std::fs::write(dir.join("b.g"), b"").unwrap();
        std::fs::write(dir.join("A.G"), b"").unwrap();
        std::fs::write(dir.join("notes.txt"), b"").unwrap();
        std::fs::write(dir.join(".hidden.g"), b"").unwrap();
        std::fs::create_dir(dir.join("sub")).unwrap();

        let browser = FileBrowser::new(dir.clone()).with_filter(vec!["g".into()]);
        let names: Vec<&str> = browser.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["..", "sub", "A.G", "b.g"]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_browser_save_directory() {
        let dir = scratch_dir("savedir");
        std::fs::create_dir(dir.join("drawings")).unwrap();
        let mut browser = FileBrowser::new(dir.clone());
        assert_eq!(browser.save_directory(), dir);

        browser.select_by_name("drawings");
        assert_eq!(browser.save_directory(), dir.join("drawings"));

        browser.select_by_name("..");
        assert_eq!(browser.save_directory(), dir);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
