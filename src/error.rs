use thiserror::Error;

/// Errors raised while assembling the scene.
///
/// Every variant is a startup error: the scene is either fully assembled or
/// not shown at all. Per-frame failures travel through `anyhow` instead.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to load {resource}: {reason}")]
    ResourceLoad { resource: String, reason: String },

    #[error("loading {resource} did not finish within {seconds}s")]
    LoadTimedOut { resource: String, seconds: f32 },

    #[error("model has no node named `{0}`")]
    MissingNode(String),

    #[error("model has {count} nodes named `{name}`")]
    DuplicateNode { name: String, count: usize },

    #[error("no material registered as `{0}`")]
    NotFound(String),

    #[error("material `{0}` is already registered")]
    DuplicateMaterial(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SceneError {
    pub fn resource_load(resource: impl Into<String>, reason: impl ToString) -> Self {
        Self::ResourceLoad {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }
}

pub type SceneResult<T> = Result<T, SceneError>;
