use anyhow::Context;
use bakedroom::{
    assets::{AssetRegistry, FsAssetSource},
    config::RoomConfig,
    render_loop::{FrameRequest, RenderLoop, SystemClock},
    renderer::HeadlessRenderer,
    room::Room,
};
use clap::Parser;
use std::{path::PathBuf, sync::Arc, time::Duration};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Assembles the baked room and runs its render loop without a window.
#[derive(Parser, Debug)]
#[command(name = "bakedroom", version)]
struct Args {
    /// TOML room configuration; built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Asset root, overriding the configured one.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Number of frames to run before exiting.
    #[arg(long, default_value_t = 120)]
    frames: u64,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Device pixel density reported to the viewport.
    #[arg(long, default_value_t = 1.0)]
    pixel_density: f32,
}

fn load_config(args: &Args) -> anyhow::Result<RoomConfig> {
    let mut config = match &args.config {
        Some(path) => RoomConfig::load(path)?,
        None => RoomConfig::default(),
    };
    if let Some(root) = &args.assets {
        config.assets.root = root.clone();
    }
    if let Some(width) = args.width {
        config.display.width = width;
    }
    if let Some(height) = args.height {
        config.display.height = height;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .format_indent(None)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let (width, height) = (config.display.width, config.display.height);

    let assets = AssetRegistry::new(Arc::new(FsAssetSource::new(&config.assets.root)));
    let room = Room::new(config, &assets).context("Failed to build the room materials")?;

    let mut context = room.context(HeadlessRenderer::new(width, height));
    context.on_resize(width, height, args.pixel_density);

    let mut pending = room.start_loading(&assets);
    let mut render_loop = RenderLoop::new(Box::new(SystemClock::new()));
    let mut scheduler = FrameRequest::new();

    render_loop.start(&mut scheduler);
    while scheduler.take() && render_loop.frames() < args.frames {
        if let Some(result) = pending.poll() {
            let model = result.context("Failed to load the room model")?;
            room.install(&mut context, model)
                .context("Failed to assemble the room")?;
        }
        render_loop.tick(&mut context, &mut scheduler)?;
        std::thread::sleep(FRAME_INTERVAL);
    }

    if !pending.is_done() {
        log::warn!(
            "{} still loading after {} frames",
            pending.resource(),
            render_loop.frames()
        );
    }

    let stats = context.renderer.last_frame();
    log::info!(
        "{} frames, {} nodes, {} meshes, {}/{} triangles visible, {} vertex bytes",
        context.renderer.frames(),
        stats.nodes,
        stats.meshes,
        stats.visible_triangles,
        stats.triangles,
        stats.vertex_bytes
    );
    Ok(())
}
