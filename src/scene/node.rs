use crate::scene::{material::MaterialDescriptor, mesh::Mesh};
use nalgebra_glm::{Mat4, Quat, Vec3};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        nalgebra_glm::translation(&self.translation)
            * nalgebra_glm::quat_to_mat4(&self.rotation)
            * nalgebra_glm::scaling(&self.scale)
    }
}

#[derive(Debug, Clone)]
pub enum MaterialSlot {
    Placeholder(Option<String>),
    Assigned(Arc<MaterialDescriptor>),
}

impl Default for MaterialSlot {
    fn default() -> Self {
        Self::Placeholder(None)
    }
}

/// Child indices leading from a root to one of its descendants.
pub type NodePath = Vec<usize>;

#[derive(Debug, Default)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<Arc<Mesh>>,
    pub material: MaterialSlot,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mesh(mut self, mesh: Arc<Mesh>) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_placeholder(mut self, material: Option<String>) -> Self {
        self.material = MaterialSlot::Placeholder(material);
        self
    }

    pub fn with_children(mut self, children: Vec<SceneNode>) -> Self {
        self.children = children;
        self
    }

    pub fn has_mesh(&self) -> bool {
        self.mesh.is_some()
    }

    pub fn material(&self) -> Option<&Arc<MaterialDescriptor>> {
        match &self.material {
            MaterialSlot::Assigned(material) => Some(material),
            MaterialSlot::Placeholder(_) => None,
        }
    }

    pub fn assign(&mut self, material: Arc<MaterialDescriptor>) {
        self.material = MaterialSlot::Assigned(material);
    }

    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a SceneNode)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut SceneNode)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }

    pub fn visit_world(&self, parent: &Mat4, f: &mut impl FnMut(&SceneNode, &Mat4)) {
        let world = parent * self.transform.matrix();
        f(self, &world);
        for child in &self.children {
            child.visit_world(&world, f);
        }
    }

    /// Pre-order visit with the path of every node relative to `self`.
    pub fn visit_paths(&self, path: &mut NodePath, f: &mut impl FnMut(&SceneNode, &[usize])) {
        f(self, path.as_slice());
        for (index, child) in self.children.iter().enumerate() {
            path.push(index);
            child.visit_paths(path, f);
            path.pop();
        }
    }

    pub fn node_at(&self, path: &[usize]) -> Option<&SceneNode> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut SceneNode> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get_mut(index))
    }

    pub fn count(&self) -> usize {
        let mut count = 0;
        self.visit(&mut |_| count += 1);
        count
    }
}
