pub mod artifact;
pub mod capability;
pub mod registry;

pub use artifact::{ArtifactError, LinearArtifact, LinearModel};
pub use capability::{ImageScored, ImageTensor, ModelError, Probabilistic, Scored};
pub use registry::{
    ModelFamily, ModelHandle, ModelRegistry, ModelSpec, ModelStatus, RegisteredModel, MODEL_SPECS,
};
