//! In-memory binary artifacts produced by the primary compilation.
//!
//! The harness treats artifact bytes as opaque: it only iterates them for
//! verification and disassembly, and writes them to a directory when the
//! secondary compile phase needs the primary output on disk.

use std::io;
use std::path::{Path, PathBuf};

/// File extension of a materialized artifact.
pub const ARTIFACT_EXTENSION: &str = "cls";

/// One compiled binary output unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// Fully qualified class name, dot-separated for nested packages.
    pub class_name: String,
    /// Raw artifact bytes.
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Create an artifact from a class name and its bytes.
    pub fn new(class_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Artifact {
            class_name: class_name.into(),
            bytes,
        }
    }

    /// Relative path of this artifact when written to a directory.
    pub fn relative_path(&self) -> PathBuf {
        let mut path: PathBuf = self.class_name.split('.').collect();
        path.set_extension(ARTIFACT_EXTENSION);
        path
    }
}

/// The complete artifact output of one primary compilation.
///
/// Created at most once per fixture; the orchestrator memoizes it and
/// never recompiles within one fixture lifetime.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    artifacts: Vec<Artifact>,
}

impl ArtifactSet {
    /// Build a set, sorting by class name for deterministic iteration.
    pub fn new(mut artifacts: Vec<Artifact>) -> Self {
        artifacts.sort_by(|a, b| a.class_name.cmp(&b.class_name));
        ArtifactSet { artifacts }
    }

    /// Iterate the contained artifacts in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter()
    }

    /// Number of artifacts in the set.
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Check if the set contains no artifacts.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Look up an artifact by fully qualified class name.
    pub fn find(&self, class_name: &str) -> Option<&Artifact> {
        self.artifacts
            .iter()
            .find(|artifact| artifact.class_name == class_name)
    }

    /// Materialize every artifact under `dir`, creating package
    /// subdirectories as needed.
    pub fn write_to(&self, dir: &Path) -> io::Result<()> {
        for artifact in &self.artifacts {
            let path = dir.join(artifact.relative_path());
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, &artifact.bytes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
