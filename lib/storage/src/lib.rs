pub mod artifact;

pub use artifact::{ArtifactError, ArtifactStore, FORMAT_VERSION};
