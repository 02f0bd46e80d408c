//! glTF model loading.

mod node;

use crate::animation::{AnimationChannel, AnimationClip, Interpolation, Keyframes};
use crate::assets::AssetSource;
use crate::error::{SceneError, SceneResult};
use crate::scene::node::SceneNode;
use ::gltf::{
    animation::{util::ReadOutputs, Interpolation as Sampling},
    buffer,
    json::{self, validation::Error as Invalid, validation::Validate},
};
use nalgebra_glm::Vec3;
use node::NodeConverter;
use std::path::Path;

pub const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

/// A freshly loaded model: the node hierarchy with placeholder materials
/// and the animation clips the file carries.
#[derive(Debug)]
pub struct LoadedModel {
    pub root: SceneNode,
    pub clips: Vec<AnimationClip>,
}

pub fn load_model(source: &dyn AssetSource, path: &str) -> SceneResult<LoadedModel> {
    let bytes = source.read(path)?;
    let base = source.base_dir(path);
    parse_model(path, &bytes, base.as_deref())
}

/// Draco primitives leave their accessors without a buffer view, and the
/// extension itself is unknown to the validator.
fn tolerated(path: &json::Path, error: Invalid) -> bool {
    let path = path.as_str();
    match error {
        Invalid::Unsupported => {
            path.starts_with("extensionsRequired") && path.contains(DRACO_EXTENSION)
        }
        Invalid::Missing => path.starts_with("accessors[") && path.ends_with(".bufferView"),
        _ => false,
    }
}

fn validate(resource: &str, root: &json::Root, compressed: bool) -> SceneResult<()> {
    // The position hook indexes accessors without a bounds check.
    let accessors = root.accessors.len();
    if root
        .meshes
        .iter()
        .flat_map(|mesh| &mesh.primitives)
        .flat_map(|primitive| primitive.attributes.values())
        .any(|index| index.value() >= accessors)
    {
        return Err(SceneError::resource_load(
            resource,
            "primitive attribute references a missing accessor",
        ));
    }

    let mut errors = Vec::new();
    root.validate(
        root,
        json::Path::new,
        &mut |path: &dyn Fn() -> json::Path, error: Invalid| {
            let path = path();
            if !(compressed && tolerated(&path, error)) {
                errors.push(format!("{path}: {error}"));
            }
        },
    );
    if errors.is_empty() {
        Ok(())
    } else {
        Err(SceneError::resource_load(resource, errors.join("; ")))
    }
}

/// Channels targeting nodes outside the loaded scene, or morph weights,
/// are dropped. Cubic spline keys are played back linearly.
fn convert_channel(
    converter: &NodeConverter,
    buffers: &[buffer::Data],
    channel: ::gltf::animation::Channel,
) -> Option<AnimationChannel> {
    let target = converter.path_of(channel.target().node().index())?.clone();
    let reader = channel.reader(|b| buffers.get(b.index()).map(|data| data.0.as_slice()));
    let times: Vec<f32> = reader.read_inputs()?.collect();

    let (interpolation, cubic) = match channel.sampler().interpolation() {
        Sampling::Step => (Interpolation::Step, false),
        Sampling::Linear => (Interpolation::Linear, false),
        Sampling::CubicSpline => (Interpolation::Linear, true),
    };
    // Cubic spline outputs are (in-tangent, value, out-tangent) triples.
    let keep = |index: usize| !cubic || index % 3 == 1;

    let keyframes = match reader.read_outputs()? {
        ReadOutputs::Translations(values) => Keyframes::Translation(
            values
                .enumerate()
                .filter(|(i, _)| keep(*i))
                .map(|(_, v)| Vec3::from(v))
                .collect(),
        ),
        ReadOutputs::Rotations(values) => Keyframes::Rotation(
            values
                .into_f32()
                .enumerate()
                .filter(|(i, _)| keep(*i))
                .map(|(_, [x, y, z, w])| nalgebra_glm::quat(x, y, z, w))
                .collect(),
        ),
        ReadOutputs::Scales(values) => Keyframes::Scale(
            values
                .enumerate()
                .filter(|(i, _)| keep(*i))
                .map(|(_, v)| Vec3::from(v))
                .collect(),
        ),
        ReadOutputs::MorphTargetWeights(_) => {
            log::debug!("skipping morph target channel");
            return None;
        }
    };

    Some(AnimationChannel {
        target,
        interpolation,
        times,
        keyframes,
    })
}

/// Parses GLB or glTF JSON bytes.
///
/// Files that require Draco compression are accepted; their compressed
/// primitives come through as meshes without geometry.
pub fn parse_model(resource: &str, bytes: &[u8], base: Option<&Path>) -> SceneResult<LoadedModel> {
    let ::gltf::Gltf { document, blob } = ::gltf::Gltf::from_slice_without_validation(bytes)
        .map_err(|e| SceneError::resource_load(resource, e))?;
    let compressed = document.extensions_used().any(|ext| ext == DRACO_EXTENSION);
    validate(resource, document.as_json(), compressed)?;

    let buffers = ::gltf::import_buffers(&document, base, blob)
        .map_err(|e| SceneError::resource_load(resource, e))?;

    if compressed {
        log::debug!("{resource} uses {DRACO_EXTENSION}; compressed geometry stays undecoded");
    }

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| SceneError::resource_load(resource, "document has no scene"))?;

    let mut converter = NodeConverter::new(&buffers, compressed);
    let mut children = Vec::new();
    for node in scene.nodes() {
        let mut path = vec![children.len()];
        if let Some(converted) = converter.convert(node, &mut path) {
            children.push(converted);
        }
    }
    let root = SceneNode::new(scene.name().unwrap_or("Scene")).with_children(children);

    let clips = document
        .animations()
        .map(|animation| {
            let channels = animation
                .channels()
                .filter_map(|channel| convert_channel(&converter, &buffers, channel))
                .collect();
            AnimationClip::new(animation.name().unwrap_or_default(), channels)
        })
        .collect();

    log::debug!("loaded {resource}: {} nodes", root.count());
    Ok(LoadedModel { root, clips })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssetSource;
    use crate::scene::node::MaterialSlot;

    const ROOM: &str = include_str!("../../tests/fixtures/room.gltf");

    const COMPRESSED: &str = r#"{
        "asset": {"version": "2.0"},
        "extensionsUsed": ["KHR_draco_mesh_compression"],
        "extensionsRequired": ["KHR_draco_mesh_compression"],
        "scenes": [{"nodes": [0]}],
        "nodes": [{"name": "piso", "mesh": 0}],
        "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
        "accessors": [{
            "componentType": 5126, "count": 3, "type": "VEC3",
            "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]
        }]
    }"#;

    #[test]
    fn converts_the_node_hierarchy() {
        let model = parse_model("room.gltf", ROOM.as_bytes(), None).unwrap();
        assert_eq!(model.root.name, "Scene");

        let room = &model.root.children[0];
        assert_eq!(room.name, "Room");
        assert_eq!(room.children.len(), 9);

        let piso = &room.children[0];
        assert_eq!(piso.name, "piso");
        assert_eq!(piso.transform.translation.y, -0.5);
        assert!(matches!(
            &piso.material,
            MaterialSlot::Placeholder(Some(name)) if name == "Material.001"
        ));

        let mesh = piso.mesh.as_ref().unwrap();
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.triangles(), vec![[0, 1, 2]]);
        assert_eq!(mesh.vertices[1].position.x, 1.0);
    }

    #[test]
    fn instanced_meshes_are_shared() {
        let model = parse_model("room.gltf", ROOM.as_bytes(), None).unwrap();
        let room = &model.root.children[0];
        let a = room.children[0].mesh.as_ref().unwrap();
        let b = room.children[1].mesh.as_ref().unwrap();
        assert!(std::sync::Arc::ptr_eq(a, b));
    }

    #[test]
    fn clips_target_converted_nodes() {
        let model = parse_model("room.gltf", ROOM.as_bytes(), None).unwrap();
        assert_eq!(model.clips.len(), 1);

        let sway = &model.clips[0];
        assert_eq!(sway.name, "sway");
        assert_eq!(sway.duration, 2.5);
        assert_eq!(
            sway.channels,
            vec![AnimationChannel {
                target: vec![0, 0],
                interpolation: Interpolation::Linear,
                times: vec![0.0, 2.5],
                keyframes: Keyframes::Translation(vec![
                    Vec3::new(0.0, 1.0, 0.0),
                    Vec3::new(0.0, 2.0, 0.0),
                ]),
            }]
        );
        assert_eq!(model.root.node_at(&[0, 0]).unwrap().name, "piso");
    }

    #[test]
    fn shared_children_are_converted_once() {
        let content = r#"{
            "asset": {"version": "2.0"},
            "scenes": [{"nodes": [0]}],
            "nodes": [
                {"name": "Room", "children": [1, 2]},
                {"name": "desk", "children": [2]},
                {"name": "lamp"}
            ]
        }"#;
        let model = parse_model("shared.gltf", content.as_bytes(), None).unwrap();
        assert_eq!(model.root.count(), 4);
        assert_eq!(model.root.node_at(&[0, 0, 0]).unwrap().name, "lamp");
        assert!(model.root.node_at(&[0, 1]).is_none());
    }

    #[test]
    fn compressed_primitives_keep_an_empty_mesh() {
        let model = parse_model("draco.gltf", COMPRESSED.as_bytes(), None).unwrap();
        let mesh = model.root.children[0].mesh.as_ref().unwrap();
        assert!(mesh.compressed);
        assert!(mesh.is_empty());
    }

    #[test]
    fn dangling_indices_are_load_errors() {
        for content in [
            r#"{"asset": {"version": "2.0"}, "scenes": [{"nodes": [0]}],
                "nodes": [{"name": "Room", "children": [7]}]}"#,
            r#"{"scenes": [{"nodes": [0]}], "nodes": [{"name": "Room", "children": [7]}]}"#,
            r#"{"asset": {"version": "2.0"}, "scenes": [{"nodes": [3]}]}"#,
            r#"{"asset": {"version": "2.0"}, "scenes": [{"nodes": [0]}],
                "nodes": [{"mesh": 0}],
                "meshes": [{"primitives": [{"attributes": {"POSITION": 4}}]}]}"#,
        ] {
            assert!(
                matches!(
                    parse_model("bad.gltf", content.as_bytes(), None),
                    Err(SceneError::ResourceLoad { resource, .. }) if resource == "bad.gltf"
                ),
                "{content}"
            );
        }
    }

    #[test]
    fn unknown_required_extensions_are_rejected() {
        let content = COMPRESSED.replace("KHR_draco_mesh_compression", "EXT_meshopt_compression");
        assert!(matches!(
            parse_model("meshopt.gltf", content.as_bytes(), None),
            Err(SceneError::ResourceLoad { .. })
        ));
    }

    #[test]
    fn load_errors_name_the_resource() {
        let source = MemoryAssetSource::new().with_file("bad.glb", b"not a model".to_vec());
        assert!(matches!(
            load_model(&source, "bad.glb"),
            Err(SceneError::ResourceLoad { resource, .. }) if resource == "bad.glb"
        ));
        assert!(matches!(
            load_model(&source, "missing.glb"),
            Err(SceneError::ResourceLoad { .. })
        ));
    }
}
