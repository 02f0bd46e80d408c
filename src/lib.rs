pub mod animation;
pub mod assets;
pub mod camera;
pub mod config;
pub mod context;
pub mod error;
pub mod model;
pub mod render_loop;
pub mod renderer;
pub mod room;
pub mod scene;
pub mod viewport;

pub use context::SceneContext;
pub use error::{SceneError, SceneResult};
pub use render_loop::{RenderLoop, TickReport};
pub use renderer::*;
