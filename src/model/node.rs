use crate::scene::{
    mesh::{Mesh, Vertex},
    node::{NodePath, SceneNode, Transform},
};
use ::gltf::{buffer, mesh::Mode};
use nalgebra_glm::{Vec2, Vec3, Vec4};
use std::{collections::HashMap, sync::Arc};

/// Converts glTF nodes into [`SceneNode`]s, sharing meshes that several
/// nodes instance.
pub(crate) struct NodeConverter<'b> {
    buffers: &'b [buffer::Data],
    compressed_geometry: bool,
    meshes: HashMap<usize, Arc<Mesh>>,
    paths: HashMap<usize, NodePath>,
}

impl<'b> NodeConverter<'b> {
    pub(crate) fn new(buffers: &'b [buffer::Data], compressed_geometry: bool) -> Self {
        Self {
            buffers,
            compressed_geometry,
            meshes: HashMap::new(),
            paths: HashMap::new(),
        }
    }

    /// Where the glTF node with `index` ended up in the converted tree.
    pub(crate) fn path_of(&self, index: usize) -> Option<&NodePath> {
        self.paths.get(&index)
    }

    /// Converts `node` and its subtree, placed at `path`. A node reached a
    /// second time (shared or cyclic hierarchies) is dropped.
    pub(crate) fn convert(&mut self, node: ::gltf::Node, path: &mut NodePath) -> Option<SceneNode> {
        if self.paths.contains_key(&node.index()) {
            log::warn!("node {} is reachable more than once; keeping the first", node.index());
            return None;
        }
        self.paths.insert(node.index(), path.clone());

        let (translation, rotation, scale) = node.transform().decomposed();
        let transform = Transform {
            translation: Vec3::new(translation[0], translation[1], translation[2]),
            rotation: nalgebra_glm::quat(rotation[0], rotation[1], rotation[2], rotation[3]),
            scale: Vec3::new(scale[0], scale[1], scale[2]),
        };

        let mut scene_node = SceneNode::new(node.name().unwrap_or_default()).with_transform(transform);
        if let Some(mesh) = node.mesh() {
            let placeholder = mesh
                .primitives()
                .next()
                .and_then(|p| p.material().name().map(str::to_string));
            scene_node = scene_node
                .with_mesh(self.mesh(&mesh))
                .with_placeholder(placeholder);
        }

        let mut children = Vec::new();
        for child in node.children() {
            path.push(children.len());
            if let Some(converted) = self.convert(child, path) {
                children.push(converted);
            }
            path.pop();
        }
        Some(scene_node.with_children(children))
    }

    fn mesh(&mut self, mesh: &::gltf::Mesh) -> Arc<Mesh> {
        if let Some(converted) = self.meshes.get(&mesh.index()) {
            return Arc::clone(converted);
        }

        let buffers = self.buffers;
        let name = mesh.name().unwrap_or_default();
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        let mut compressed = false;

        for primitive in mesh.primitives() {
            if primitive.mode() != Mode::Triangles {
                log::debug!("skipping {:?} primitive in mesh `{name}`", primitive.mode());
                continue;
            }

            let reader =
                primitive.reader(|b| buffers.get(b.index()).map(|data| data.0.as_slice()));
            let Some(positions) = reader.read_positions() else {
                // Compressed primitives keep their attribute accessors but no views.
                compressed |= self.compressed_geometry;
                continue;
            };

            let base = vertices.len() as u32;
            let mut normals = reader.read_normals();
            let mut tex_coords = reader.read_tex_coords(0).map(|t| t.into_f32());
            for position in positions {
                let normal = normals.as_mut().and_then(Iterator::next).unwrap_or([0.0; 3]);
                let uv = tex_coords
                    .as_mut()
                    .and_then(Iterator::next)
                    .unwrap_or([0.0; 2]);
                vertices.push(Vertex {
                    position: Vec4::new(position[0], position[1], position[2], 1.0),
                    normal: Vec4::new(normal[0], normal[1], normal[2], 0.0),
                    tex_coords: Vec2::new(uv[0], uv[1]),
                    ..Default::default()
                });
            }

            match reader.read_indices() {
                Some(read) => indices.extend(read.into_u32().map(|i| base + i)),
                None => indices.extend(base..vertices.len() as u32),
            }
        }

        let converted = if compressed && vertices.is_empty() {
            Mesh::compressed(name)
        } else {
            Mesh {
                compressed,
                ..Mesh::new(name, vertices, indices)
            }
        };
        let converted = Arc::new(converted);
        self.meshes.insert(mesh.index(), Arc::clone(&converted));
        converted
    }
}
