use crate::error::{SceneError, SceneResult};
use crate::scene::material::MaterialDescriptor;
use std::{collections::HashMap, sync::Arc};

#[derive(Default, Debug)]
pub struct MaterialRegistry {
    materials: HashMap<String, Arc<MaterialDescriptor>>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, descriptor: MaterialDescriptor) -> SceneResult<()> {
        if self.materials.contains_key(name) {
            return Err(SceneError::DuplicateMaterial(name.to_string()));
        }
        log::debug!("registered material `{name}` ({:?})", descriptor.kind);
        self.materials.insert(name.to_string(), Arc::new(descriptor));
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> SceneResult<Arc<MaterialDescriptor>> {
        self.materials
            .get(name)
            .cloned()
            .ok_or_else(|| SceneError::NotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
