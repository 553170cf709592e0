//! Durable per-key settings storage for the layout state.
//!
//! Each layout field is stored as one JSON-encoded value under the `texhtml`
//! namespace. Reads that fail or return corrupt values fall back silently to
//! the documented default for that key; numeric values are clamped back into
//! range on load.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use texhtml_model::{clamp_split, snap_zoom, LayoutState};

pub const SETTINGS_NAMESPACE: &str = "texhtml";

pub mod keys {
    pub const VIEW_MODE: &str = "view-mode";
    pub const ORIENTATION: &str = "orientation";
    pub const SPLIT_PERCENT: &str = "split-percent";
    pub const SWAPPED: &str = "swapped";
    pub const THEME: &str = "theme";
    pub const PDF_ZOOM_PERCENT: &str = "pdf-zoom-percent";
    pub const TOOLBAR_VISIBLE: &str = "toolbar-visible";
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Raw per-key storage. Backends are swappable so tests run against the
/// in-memory store.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// File-backed store: one `texhtml.<key>.json` file per key under the
/// platform data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn from_default_project() -> Result<Self, StorageError> {
        let dirs =
            ProjectDirs::from("dev", "texhtml", "texhtml").ok_or(StorageError::NoDataDirectory)?;

        Ok(Self { root: dirs.data_local_dir().to_path_buf() })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{SETTINGS_NAMESPACE}.{key}.json"))
    }
}

impl SettingsStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.key_path(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.key_path(key), value)?;
        Ok(())
    }
}

/// In-memory store for tests and headless use.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

fn read_key<T: DeserializeOwned>(store: &dyn SettingsStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("ignoring corrupt stored value for {key:?}: {e}");
            None
        }
    }
}

fn write_key<T: Serialize>(
    store: &mut dyn SettingsStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// Reconstructs the layout state from storage. Missing or corrupt keys keep
/// their defaults; stored numerics are clamped back into range.
pub fn load_layout(store: &dyn SettingsStore) -> LayoutState {
    let mut state = LayoutState::default();

    if let Some(mode) = read_key(store, keys::VIEW_MODE) {
        state.view_mode = mode;
    }
    if let Some(orientation) = read_key(store, keys::ORIENTATION) {
        state.orientation = orientation;
    }
    if let Some(split) = read_key::<f64>(store, keys::SPLIT_PERCENT) {
        state.split_percent = clamp_split(split as f32);
    }
    if let Some(swapped) = read_key(store, keys::SWAPPED) {
        state.swapped = swapped;
    }
    if let Some(theme) = read_key(store, keys::THEME) {
        state.theme = theme;
    }
    if let Some(zoom) = read_key::<u16>(store, keys::PDF_ZOOM_PERCENT) {
        state.pdf_zoom_percent = snap_zoom(zoom);
    }
    if let Some(visible) = read_key(store, keys::TOOLBAR_VISIBLE) {
        state.toolbar_visible = visible;
    }

    state
}

/// Writes every layout field under its own key. Called after each state
/// change so storage always mirrors the in-memory state.
pub fn persist_layout(store: &mut dyn SettingsStore, state: &LayoutState) -> Result<(), StorageError> {
    write_key(store, keys::VIEW_MODE, &state.view_mode)?;
    write_key(store, keys::ORIENTATION, &state.orientation)?;
    write_key(store, keys::SPLIT_PERCENT, &state.split_percent)?;
    write_key(store, keys::SWAPPED, &state.swapped)?;
    write_key(store, keys::THEME, &state.theme)?;
    write_key(store, keys::PDF_ZOOM_PERCENT, &state.pdf_zoom_percent)?;
    write_key(store, keys::TOOLBAR_VISIBLE, &state.toolbar_visible)?;
    Ok(())
}
