pub mod pending;
pub mod source;

pub use pending::PendingModel;
pub use source::{AssetSource, FsAssetSource, MemoryAssetSource};

use crate::error::{SceneError, SceneResult};
use crate::scene::texture::{Texture, TextureData};
use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AssetHandle(Uuid);

impl AssetHandle {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

#[derive(Clone, Debug)]
pub struct AssetMetadata {
    pub handle: AssetHandle,
    pub path: String,
}

pub struct AssetRegistry {
    source: Arc<dyn AssetSource>,
    metadatas: RwLock<HashMap<AssetHandle, AssetMetadata>>,
    loaded_textures: RwLock<HashMap<AssetHandle, Arc<Texture>>>,
}

impl AssetRegistry {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self {
            source,
            metadatas: RwLock::new(HashMap::new()),
            loaded_textures: RwLock::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> Arc<dyn AssetSource> {
        Arc::clone(&self.source)
    }

    pub fn register_texture(&self, path: &str) -> SceneResult<AssetHandle> {
        if let Some(handle) = self.find_asset_by_path(path) {
            return Ok(handle);
        }

        let bytes = self.source.read(path)?;
        let image =
            image::load_from_memory(&bytes).map_err(|e| SceneError::resource_load(path, e))?;
        let handle = AssetHandle::new();
        let texture = Texture::from_2d_data(handle, path, TextureData::from_image(image));
        log::debug!(
            "loaded texture {path} ({}x{})",
            texture.texture_data.width,
            texture.texture_data.height
        );

        self.metadatas.write().insert(
            handle,
            AssetMetadata {
                handle,
                path: path.to_string(),
            },
        );
        self.loaded_textures.write().insert(handle, Arc::new(texture));
        Ok(handle)
    }

    pub fn load_texture(&self, path: &str) -> SceneResult<Arc<Texture>> {
        let handle = self.register_texture(path)?;
        self.get_texture(handle)
            .ok_or_else(|| SceneError::resource_load(path, "texture was unloaded"))
    }

    pub fn get_texture(&self, handle: AssetHandle) -> Option<Arc<Texture>> {
        self.loaded_textures.read().get(&handle).cloned()
    }

    pub fn metadata(&self, handle: AssetHandle) -> Option<AssetMetadata> {
        self.metadatas.read().get(&handle).cloned()
    }

    pub fn texture_count(&self) -> usize {
        self.loaded_textures.read().len()
    }

    pub fn unload_assets(&self) {
        self.loaded_textures.write().clear();
        self.metadatas.write().clear();
    }

    fn find_asset_by_path(&self, path: &str) -> Option<AssetHandle> {
        self.metadatas
            .read()
            .values()
            .find(|val| val.path == path)
            .map(|val| val.handle)
    }
}
