//! The baked room: its materials, binding rules and startup wiring.

use crate::animation::AnimationMixer;
use crate::assets::{AssetRegistry, PendingModel};
use crate::camera::{Camera, OrbitControls};
use crate::config::RoomConfig;
use crate::context::SceneContext;
use crate::error::SceneResult;
use crate::model::LoadedModel;
use crate::renderer::Renderer;
use crate::scene::{
    BindingPlan, BoundScene, Color, MaterialDescriptor, MaterialRegistry, NamePredicate,
    PhysicalProperties, SceneBinder, SceneGraph, SceneNode,
};
use crate::viewport::{ViewportController, ViewportState};
use nalgebra_glm::Vec3;

pub const BAKED: &str = "baked";
pub const VENOM: &str = "venom";
pub const CURTAIN1: &str = "curtain1";
pub const CURTAIN2: &str = "curtain2";
pub const PISO: &str = "piso";
pub const GLASS: &str = "glass";
pub const KEYS_LIGHT: &str = "keysLight";
pub const CPU_LED: &str = "cpuLed";

/// Nodes whose name contains this marker are glass.
pub const GLASS_MARKER: &str = "vidrio";

/// Node name → material name, applied after the traversal rules.
pub const NAMED_OVERRIDES: [(&str, &str); 6] = [
    ("piso", PISO),
    ("venom", VENOM),
    ("cortina1", CURTAIN1),
    ("cortina2", CURTAIN2),
    ("ledFrontal", CPU_LED),
    ("luzTeclas", KEYS_LIGHT),
];

/// Ring meshes; they keep the baked material.
pub const STRUCTURAL_NODES: [&str; 6] = [
    "aroFrontal1",
    "aroFrontal2",
    "aroFrontal3",
    "aroSuperior1",
    "aroSuperior2",
    "aroTrasero",
];

pub fn glass_properties() -> PhysicalProperties {
    PhysicalProperties {
        transparent: true,
        opacity: 0.5,
        roughness: 0.2,
        metalness: 1.0,
        clearcoat: 1.0,
        clearcoat_roughness: 0.1,
        transmission: 0.9,
        ior: 1.5,
    }
}

/// Loads every texture and registers all room materials.
///
/// Any texture that fails to load aborts the whole registry.
pub fn build_materials(config: &RoomConfig, assets: &AssetRegistry) -> SceneResult<MaterialRegistry> {
    let textures = &config.assets.textures;
    let mut registry = MaterialRegistry::new();

    for (name, path) in [
        (BAKED, &textures.baked),
        (VENOM, &textures.venom),
        (CURTAIN1, &textures.curtain1),
        (CURTAIN2, &textures.curtain2),
        (PISO, &textures.floor),
    ] {
        let texture = assets.load_texture(path)?;
        registry.register(name, MaterialDescriptor::basic(name).with_texture(texture))?;
    }

    registry.register(
        GLASS,
        MaterialDescriptor::physical(GLASS, glass_properties()).with_color(Color::WHITE),
    )?;
    registry.register(
        KEYS_LIGHT,
        MaterialDescriptor::basic(KEYS_LIGHT).with_color(Color::from_hex(0xff3e07)),
    )?;
    registry.register(
        CPU_LED,
        MaterialDescriptor::basic(CPU_LED).with_color(Color::from_hex(0xff1900)),
    )?;

    log::info!("registered {} materials", registry.len());
    Ok(registry)
}

pub fn binding_plan(config: &RoomConfig, registry: &MaterialRegistry) -> SceneResult<BindingPlan> {
    let mut plan = BindingPlan::new(registry.resolve(BAKED)?)
        .rule(
            NamePredicate::Contains(GLASS_MARKER.to_string()),
            registry.resolve(GLASS)?,
        )
        .structural(&STRUCTURAL_NODES)
        .duplicate_policy(config.binding.duplicates);
    for (node, material) in NAMED_OVERRIDES {
        plan = plan.override_node(node, registry.resolve(material)?);
    }
    Ok(plan)
}

/// Startup state of the room, built once the textures are in.
pub struct Room {
    config: RoomConfig,
    registry: MaterialRegistry,
    binder: SceneBinder,
}

impl Room {
    pub fn new(config: RoomConfig, assets: &AssetRegistry) -> SceneResult<Self> {
        config.validate()?;
        let registry = build_materials(&config, assets)?;
        let binder = SceneBinder::new(binding_plan(&config, &registry)?);
        Ok(Self {
            config,
            registry,
            binder,
        })
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn materials(&self) -> &MaterialRegistry {
        &self.registry
    }

    pub fn bind(&self, root: SceneNode) -> SceneResult<BoundScene> {
        self.binder.bind(root)
    }

    pub fn start_loading(&self, assets: &AssetRegistry) -> PendingModel {
        PendingModel::spawn(
            assets.source(),
            &self.config.assets.model,
            self.config.assets.load_timeout(),
        )
    }

    /// Binds a finished load and hands it to the context. Nothing is
    /// attached if binding fails.
    pub fn install<R: Renderer>(
        &self,
        context: &mut SceneContext<R>,
        model: LoadedModel,
    ) -> SceneResult<()> {
        let bound = self.bind(model.root)?;
        let root = context.attach(bound);

        let mut mixer = AnimationMixer::new(model.clips, root);
        if let Some(index) = self.config.animation.autoplay {
            if !mixer.play(index) {
                log::warn!(
                    "model has {} clips, cannot autoplay clip {index}",
                    mixer.clips().len()
                );
            }
        }
        context.set_animator(Box::new(mixer));
        Ok(())
    }

    pub fn viewport(&self) -> ViewportController {
        viewport(&self.config)
    }

    pub fn context<R: Renderer>(&self, renderer: R) -> SceneContext<R> {
        SceneContext::new(
            SceneGraph::new(self.config.display.clear_color),
            self.viewport(),
            renderer,
        )
    }
}

pub fn viewport(config: &RoomConfig) -> ViewportController {
    let camera_config = &config.camera;
    let display = &config.display;
    let state = ViewportState::new(display.width, display.height, display.pixel_density_cap);

    let target = Vec3::from(camera_config.target);
    let mut camera = Camera::new(
        camera_config.fov,
        state.aspect(),
        camera_config.near,
        camera_config.far,
    );
    camera.look_at(Vec3::from(camera_config.position), target);

    let mut controls = OrbitControls::new(target);
    if camera_config.damping {
        controls = controls.with_damping(camera_config.damping_factor);
    }
    ViewportController::new(camera, controls, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{tests::png, MemoryAssetSource};
    use crate::error::SceneError;
    use std::sync::Arc;

    fn assets(skip: Option<&str>) -> AssetRegistry {
        let source = MemoryAssetSource::new();
        for path in ["baked.jpg", "venom.jpg", "curtain1.jpg", "curtain2.jpg", "floor3.jpg"] {
            if Some(path) != skip {
                source.insert(path, png([120, 80, 40, 255]));
            }
        }
        AssetRegistry::new(Arc::new(source))
    }

    #[test]
    fn registers_all_room_materials() {
        let registry = build_materials(&RoomConfig::default(), &assets(None)).unwrap();
        assert_eq!(registry.len(), 8);

        let glass = registry.resolve(GLASS).unwrap();
        let properties = glass.physical_properties().unwrap();
        assert_eq!(properties.opacity, 0.5);
        assert_eq!(properties.transmission, 0.9);
        assert_eq!(properties.ior, 1.5);

        let floor = registry.resolve(PISO).unwrap();
        assert_eq!(floor.texture.as_ref().unwrap().name, "floor3.jpg");
        assert_eq!(
            registry.resolve(CPU_LED).unwrap().display_color().to_rgb8(),
            [0xff, 0x19, 0x00]
        );
    }

    #[test]
    fn a_missing_texture_aborts_construction() {
        let err = Room::new(RoomConfig::default(), &assets(Some("curtain2.jpg"))).err();
        assert!(matches!(
            err,
            Some(SceneError::ResourceLoad { resource, .. }) if resource == "curtain2.jpg"
        ));
    }

    #[test]
    fn plan_orders_rules_and_overrides() {
        let config = RoomConfig::default();
        let registry = build_materials(&config, &assets(None)).unwrap();
        let plan = binding_plan(&config, &registry).unwrap();

        let rules: Vec<_> = plan.rules().iter().map(|r| r.material.name.as_str()).collect();
        assert_eq!(rules, [BAKED, GLASS]);
        let overrides: Vec<_> = plan.overrides().iter().map(|o| o.node.as_str()).collect();
        assert_eq!(
            overrides,
            ["piso", "venom", "cortina1", "cortina2", "ledFrontal", "luzTeclas"]
        );
    }

    #[test]
    fn viewport_uses_configured_camera() {
        let viewport = viewport(&RoomConfig::default());
        let camera = viewport.camera();
        assert_eq!(camera.position, Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(camera.target(), Vec3::new(0.0, 0.75, 0.0));
        assert_eq!(camera.fov(), 75.0);
        assert_eq!(camera.aspect(), 1280.0 / 720.0);
    }
}
