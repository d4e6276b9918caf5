//! Artifact persistence for generated content

mod artifacts;

pub use artifacts::{safe_topic, timestamp, Artifact, ArtifactWriter};
