use crate::scene::{binder::BoundScene, material::Color, node::SceneNode};
use nalgebra_glm::Mat4;

#[derive(Debug)]
pub struct SceneGraph {
    pub clear_color: Color,
    roots: Vec<SceneNode>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new(Color::BLACK)
    }
}

impl SceneGraph {
    pub fn new(clear_color: Color) -> Self {
        Self {
            clear_color,
            roots: Vec::new(),
        }
    }

    pub fn attach(&mut self, scene: BoundScene) -> usize {
        let root = scene.into_root();
        log::info!("attached `{}` ({} nodes)", root.name, root.count());
        self.roots.push(root);
        self.roots.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn roots(&self) -> &[SceneNode] {
        &self.roots
    }

    pub fn root_mut(&mut self, index: usize) -> Option<&mut SceneNode> {
        self.roots.get_mut(index)
    }

    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        let mut found = None;
        for root in &self.roots {
            root.visit(&mut |node| {
                if found.is_none() && node.name == name {
                    found = Some(node);
                }
            });
        }
        found
    }

    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        for root in &self.roots {
            root.visit(&mut |node| count += node.has_mesh() as usize);
        }
        count
    }

    pub fn visit_world(&self, f: &mut impl FnMut(&SceneNode, &Mat4)) {
        let identity = Mat4::identity();
        for root in &self.roots {
            root.visit_world(&identity, f);
        }
    }
}
