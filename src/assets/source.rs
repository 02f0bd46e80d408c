use crate::error::{SceneError, SceneResult};
use parking_lot::RwLock;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

pub trait AssetSource: Send + Sync {
    fn read(&self, path: &str) -> SceneResult<Vec<u8>>;

    /// Directory that relative references inside model files resolve
    /// against, if the source lives on disk.
    fn base_dir(&self, _path: &str) -> Option<PathBuf> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FsAssetSource {
    fn read(&self, path: &str) -> SceneResult<Vec<u8>> {
        let full = self.root.join(path);
        log::debug!("reading {}", full.display());
        std::fs::read(&full).map_err(|e| SceneError::resource_load(path, e))
    }

    fn base_dir(&self, path: &str) -> Option<PathBuf> {
        self.root.join(path).parent().map(Path::to_path_buf)
    }
}

#[derive(Debug, Default)]
pub struct MemoryAssetSource {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, bytes: Vec<u8>) -> Self {
        self.insert(path, bytes);
        self
    }

    pub fn insert(&self, path: &str, bytes: Vec<u8>) {
        self.files.write().insert(path.to_string(), bytes);
    }
}

impl AssetSource for MemoryAssetSource {
    fn read(&self, path: &str) -> SceneResult<Vec<u8>> {
        self.files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| SceneError::resource_load(path, "no such file"))
    }
}
