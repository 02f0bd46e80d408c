use anyhow::Context;
use bakedroom::{
    assets::{AssetRegistry, FsAssetSource},
    config::RoomConfig,
    render_loop::{FrameRequest, RenderLoop, SystemClock},
    renderer::wireframe::WireframeRenderer,
    room::Room,
};
use clap::Parser;
use sdl3::{
    event::{Event, WindowEvent},
    keyboard::Keycode,
    mouse::MouseButton,
    video::Window,
};
use std::{path::PathBuf, sync::Arc, time::Duration};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Opens the baked room in a window.
#[derive(Parser, Debug)]
#[command(name = "viewer", version)]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    assets: Option<PathBuf>,
}

fn pixel_density(window: &Window) -> f32 {
    let (width, _) = window.size();
    let (pixel_width, _) = window.size_in_pixels();
    if width == 0 {
        1.0
    } else {
        pixel_width as f32 / width as f32
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .format_indent(None)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => RoomConfig::load(path)?,
        None => RoomConfig::default(),
    };
    if let Some(root) = args.assets {
        config.assets.root = root;
    }

    let sdl_context = sdl3::init()?;
    let video_subsystem = sdl_context.video()?;
    let window = video_subsystem
        .window("bakedroom", config.display.width, config.display.height)
        .position_centered()
        .resizable()
        .high_pixel_density()
        .build()?;
    let density = pixel_density(&window);

    let assets = AssetRegistry::new(Arc::new(FsAssetSource::new(&config.assets.root)));
    let room = Room::new(config, &assets).context("Failed to build the room materials")?;

    let mut context = room.context(WireframeRenderer::new(window.into_canvas()));
    let (width, height) = context.renderer.window().size();
    context.on_resize(width, height, density);

    let mut pending = room.start_loading(&assets);
    let mut render_loop = RenderLoop::new(Box::new(SystemClock::new()));
    let mut scheduler = FrameRequest::new();
    let mut event_pump = sdl_context.event_pump()?;
    let mut dragging = false;

    render_loop.start(&mut scheduler);
    'main_loop: while scheduler.take() {
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'main_loop,
                Event::Window {
                    win_event: WindowEvent::Resized(width, height),
                    ..
                } => {
                    let density = pixel_density(context.renderer.window());
                    context.on_resize(width.max(0) as u32, height.max(0) as u32, density);
                }
                Event::MouseButtonDown {
                    mouse_btn: MouseButton::Left,
                    ..
                } => dragging = true,
                Event::MouseButtonUp {
                    mouse_btn: MouseButton::Left,
                    ..
                } => dragging = false,
                Event::MouseMotion { xrel, yrel, .. } if dragging => {
                    let height = context.viewport.state().height as f32;
                    context.viewport.controls_mut().drag(xrel, yrel, height);
                }
                Event::MouseWheel { y, .. } => context.viewport.controls_mut().zoom(y),
                _ => {}
            }
        }

        if let Some(result) = pending.poll() {
            let model = result.context("Failed to load the room model")?;
            room.install(&mut context, model)
                .context("Failed to assemble the room")?;
        }
        render_loop.tick(&mut context, &mut scheduler)?;
        std::thread::sleep(FRAME_INTERVAL);
    }

    Ok(())
}
