pub mod binder;
pub mod graph;
pub mod index;
pub mod material;
pub mod mesh;
pub mod node;
pub mod registry;
pub mod texture;

pub use binder::{BindingPlan, BindingReport, BoundScene, NamePredicate, SceneBinder};
pub use graph::SceneGraph;
pub use index::{DuplicatePolicy, NodeIndex};
pub use material::{Color, MaterialDescriptor, MaterialKind, PhysicalProperties};
pub use node::{MaterialSlot, SceneNode, Transform};
pub use registry::MaterialRegistry;
