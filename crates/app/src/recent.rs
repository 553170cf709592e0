//! Recently opened bundles, persisted as JSON in the platform data dir and
//! shown in the toolbar's Open Recent menu.

use std::fs;
use std::path::{Path, PathBuf};

use texhtml_storage::StorageError;

const MAX_RECENT: usize = 10;

#[derive(Debug, Clone)]
pub struct RecentBundles {
    paths: Vec<PathBuf>,
    storage_path: PathBuf,
}

impl RecentBundles {
    pub fn new() -> Self {
        Self { paths: Vec::new(), storage_path: Self::default_storage_path() }
    }

    pub fn with_storage_path(path: impl AsRef<Path>) -> Self {
        Self { paths: Vec::new(), storage_path: path.as_ref().to_path_buf() }
    }

    fn default_storage_path() -> PathBuf {
        match dirs::data_dir() {
            Some(data_dir) => data_dir.join("texhtml").join("recent.json"),
            None => PathBuf::from("recent.json"),
        }
    }

    /// Moves `path` to the front, deduplicating and capping the list.
    pub fn add(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();

        self.paths.retain(|existing| existing != &path);
        self.paths.insert(0, path);
        self.paths.truncate(MAX_RECENT);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn load(&mut self) -> Result<(), StorageError> {
        if !self.storage_path.exists() {
            return Ok(());
        }

        let contents = fs::read_to_string(&self.storage_path)?;
        self.paths = serde_json::from_str(&contents)?;
        self.paths.retain(|path| path.exists());
        self.paths.truncate(MAX_RECENT);

        Ok(())
    }

    pub fn save(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.storage_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec_pretty(&self.paths)?;
        fs::write(&self.storage_path, json)?;
        Ok(())
    }
}

impl Default for RecentBundles {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_moves_duplicates_to_front_and_caps_the_list() {
        let mut recent = RecentBundles::with_storage_path("/tmp/unused.json");

        for i in 0..12 {
            recent.add(format!("/bundles/doc-{i}.texhtml"));
        }
        recent.add("/bundles/doc-5.texhtml");

        assert_eq!(recent.paths().len(), MAX_RECENT);
        assert_eq!(recent.paths()[0], PathBuf::from("/bundles/doc-5.texhtml"));
        assert_eq!(recent.paths().iter().filter(|p| p.ends_with("doc-5.texhtml")).count(), 1);
    }

    #[test]
    fn save_and_load_round_trip_filtering_missing_files() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let storage_path = temp.path().join("recent.json");

        let existing = temp.path().join("kept.texhtml");
        fs::write(&existing, b"stub").expect("write should succeed");

        let mut recent = RecentBundles::with_storage_path(&storage_path);
        recent.add(&existing);
        recent.add("/nonexistent/gone.texhtml");
        recent.save().expect("save should succeed");

        let mut loaded = RecentBundles::with_storage_path(&storage_path);
        loaded.load().expect("load should succeed");

        assert_eq!(loaded.paths(), &[existing]);
    }

    #[test]
    fn load_with_no_file_is_empty() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let mut recent = RecentBundles::with_storage_path(temp.path().join("missing.json"));

        recent.load().expect("load should succeed");
        assert!(recent.is_empty());
    }

    #[test]
    fn corrupt_file_surfaces_a_parse_error() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let storage_path = temp.path().join("recent.json");
        fs::write(&storage_path, "not json").expect("write should succeed");

        let mut recent = RecentBundles::with_storage_path(&storage_path);
        assert!(recent.load().is_err());
    }
}
