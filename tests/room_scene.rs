use bakedroom::{
    assets::{AssetRegistry, MemoryAssetSource},
    config::RoomConfig,
    model::parse_model,
    render_loop::{FrameRequest, ManualClock, RenderLoop},
    renderer::{HeadlessRenderer, Renderer},
    room::Room,
    scene::{BindingPlan, MaterialDescriptor, NamePredicate, SceneBinder, SceneNode},
    SceneError,
};
use image::{ImageFormat, Rgba, RgbaImage};
use std::{
    io::Cursor,
    sync::Arc,
    time::{Duration, Instant},
};

const ROOM: &str = include_str!("fixtures/room.gltf");
const TEXTURES: [&str; 5] = [
    "baked.jpg",
    "venom.jpg",
    "curtain1.jpg",
    "curtain2.jpg",
    "floor3.jpg",
];

fn png(color: [u8; 4]) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    RgbaImage::from_pixel(4, 4, Rgba(color))
        .write_to(&mut bytes, ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

fn assets() -> AssetRegistry {
    let source = MemoryAssetSource::new().with_file("models/Room/bakedmodel.glb", ROOM.into());
    for (i, path) in TEXTURES.iter().enumerate() {
        source.insert(path, png([40 * i as u8, 90, 160, 255]));
    }
    AssetRegistry::new(Arc::new(source))
}

fn room_model() -> SceneNode {
    parse_model("room.gltf", ROOM.as_bytes(), None).unwrap().root
}

/// (node name, material name) for every node, in pre-order.
fn assignments(root: &SceneNode) -> Vec<(String, String)> {
    let mut out = Vec::new();
    root.visit(&mut |node| {
        let material = node.material().map(|m| m.name.clone()).unwrap_or_default();
        out.push((node.name.clone(), material));
    });
    out
}

fn material_of(root: &SceneNode, name: &str) -> String {
    assignments(root)
        .into_iter()
        .find(|(node, _)| node == name)
        .map(|(_, material)| material)
        .unwrap()
}

#[test]
fn room_model_binds_every_mesh() {
    let assets = assets();
    let room = Room::new(RoomConfig::default(), &assets).unwrap();
    let bound = room.bind(room_model()).unwrap();

    let mut placeholders = 0;
    bound.root().visit(&mut |node| {
        if node.has_mesh() && node.material().is_none() {
            placeholders += 1;
        }
    });
    assert_eq!(placeholders, 0);

    let root = bound.root();
    assert_eq!(material_of(root, "piso"), "piso");
    assert_eq!(material_of(root, "venom"), "venom");
    assert_eq!(material_of(root, "cortina1"), "curtain1");
    assert_eq!(material_of(root, "cortina2"), "curtain2");
    assert_eq!(material_of(root, "ledFrontal"), "cpuLed");
    assert_eq!(material_of(root, "luzTeclas"), "keysLight");
    assert_eq!(material_of(root, "vidrioMonitor"), "glass");
    assert_eq!(material_of(root, "aroFrontal1"), "baked");
    assert_eq!(material_of(root, "escritorio"), "baked");

    assert_eq!(
        bound.report().missing_structural,
        ["aroFrontal2", "aroFrontal3", "aroSuperior1", "aroSuperior2", "aroTrasero"]
    );
}

#[test]
fn binding_is_deterministic() {
    let assets = assets();
    let room = Room::new(RoomConfig::default(), &assets).unwrap();
    let first = room.bind(room_model()).unwrap();
    let second = room.bind(room_model()).unwrap();
    assert_eq!(assignments(first.root()), assignments(second.root()));
}

#[test]
fn missing_named_node_attaches_nothing() {
    let assets = assets();
    let room = Room::new(RoomConfig::default(), &assets).unwrap();
    let mut context = room.context(HeadlessRenderer::new(800, 600));

    let mut model = parse_model("room.gltf", ROOM.as_bytes(), None).unwrap();
    model.root.children[0].children.retain(|node| node.name != "venom");

    let err = room.install(&mut context, model).unwrap_err();
    assert!(matches!(err, SceneError::MissingNode(name) if name == "venom"));
    assert!(context.scene.is_empty());
}

#[test]
fn resize_tracks_surface_and_caps_density() {
    let assets = assets();
    let mut config = RoomConfig::default();
    config.display.width = 800;
    config.display.height = 600;
    let room = Room::new(config, &assets).unwrap();
    let mut context = room.context(HeadlessRenderer::new(800, 600));
    assert_eq!(context.viewport.camera().aspect(), 800.0 / 600.0);

    context.on_resize(1600, 1200, 3.0);
    assert_eq!(context.viewport.camera().aspect(), 1600.0 / 1200.0);
    assert_eq!(context.viewport.state().pixel_ratio, 2.0);
    assert_eq!(context.renderer.drawing_buffer_size(), [3200, 2400]);
}

#[test]
fn zero_delta_tick_still_updates_controls_and_draws() {
    let assets = assets();
    let mut config = RoomConfig::default();
    config.animation.autoplay = Some(0);
    let room = Room::new(config, &assets).unwrap();
    let mut context = room.context(HeadlessRenderer::new(800, 600));
    room.install(
        &mut context,
        parse_model("room.gltf", ROOM.as_bytes(), None).unwrap(),
    )
    .unwrap();
    context.viewport.controls_mut().drag(30.0, 10.0, 600.0);

    let clock = ManualClock::new();
    let mut render_loop = RenderLoop::new(Box::new(clock.clone()));
    let mut scheduler = FrameRequest::new();

    clock.set(0.25);
    let first = render_loop.tick(&mut context, &mut scheduler).unwrap();
    let position = context.viewport.camera().position;
    // 0.25s into the 2.5s sway clip: a tenth of the way from y=1 to y=2.
    let piso = context.scene.find("piso").unwrap();
    assert!((piso.transform.translation.y - 1.1).abs() < 1e-5);
    let second = render_loop.tick(&mut context, &mut scheduler).unwrap();

    assert!(first.animated);
    assert_eq!(second.delta, 0.0);
    assert!(!second.animated);
    assert!(second.camera_moved);
    assert_ne!(context.viewport.camera().position, position);
    assert_eq!(context.renderer.frames(), 2);
    assert_eq!(context.renderer.last_frame().meshes, 9);
}

#[test]
fn default_then_exact_overrides_scenario() {
    let material = |name: &str| Arc::new(MaterialDescriptor::basic(name));
    let mesh_node = |name: &str| {
        SceneNode::new(name).with_mesh(Arc::new(bakedroom::scene::mesh::Mesh::default()))
    };
    let root = SceneNode::new("Scene").with_children(vec![
        mesh_node("floor"),
        mesh_node("curtain1"),
        mesh_node("curtain2"),
        mesh_node("decor"),
        mesh_node("ring1"),
    ]);

    let plan = BindingPlan::new(material("baked"))
        .rule(NamePredicate::Contains("vidrio".into()), material("glass"))
        .override_node("floor", material("pisoMaterial"))
        .override_node("curtain1", material("curtain1Material"))
        .override_node("curtain2", material("curtain2Material"))
        .override_node("decor", material("decorMaterial"));
    let bound = SceneBinder::new(plan).bind(root).unwrap();

    let root = bound.root();
    assert_eq!(material_of(root, "ring1"), "baked");
    assert_eq!(material_of(root, "floor"), "pisoMaterial");
    assert_eq!(material_of(root, "curtain1"), "curtain1Material");
    assert_eq!(material_of(root, "curtain2"), "curtain2Material");
    assert_eq!(material_of(root, "decor"), "decorMaterial");
}

#[test]
fn loop_draws_an_empty_scene_until_the_model_arrives() {
    let assets = assets();
    let room = Room::new(RoomConfig::default(), &assets).unwrap();
    let mut context = room.context(HeadlessRenderer::new(800, 600));
    let mut pending = room.start_loading(&assets);

    let clock = ManualClock::new();
    let mut render_loop = RenderLoop::new(Box::new(clock.clone()));
    let mut scheduler = FrameRequest::new();

    render_loop.tick(&mut context, &mut scheduler).unwrap();
    assert_eq!(context.renderer.last_frame().meshes, 0);

    let deadline = Instant::now() + Duration::from_secs(5);
    while !pending.is_done() {
        assert!(Instant::now() < deadline, "model never finished loading");
        if let Some(result) = pending.poll() {
            room.install(&mut context, result.unwrap()).unwrap();
        }
        clock.advance(0.016);
        render_loop.tick(&mut context, &mut scheduler).unwrap();
        std::thread::sleep(Duration::from_millis(2));
    }

    render_loop.tick(&mut context, &mut scheduler).unwrap();
    assert_eq!(context.scene.roots().len(), 1);
    assert_eq!(context.renderer.last_frame().meshes, 9);
    assert!(scheduler.take());
}
