//! Fixture-scoped isolated class loading.
//!
//! An [`IsolatedLoader`] owns an ordered classpath plus a delegation link
//! to a shared [`BaseLoader`] representing the standard runtime. It is
//! scoped to exactly one fixture and must be disposed on teardown;
//! disposal is idempotent. The single-loader-per-fixture invariant is
//! enforced by the harness that owns the loader slot.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::artifact::{ArtifactSet, ARTIFACT_EXTENSION};
use crate::error::{HarnessError, Result};
use crate::fixture::SourceUnit;
use crate::services::DependencyProvider;

static NEXT_LOADER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity token of one loader, used as the ambient execution context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoaderId(u64);

impl LoaderId {
    fn next() -> Self {
        LoaderId(NEXT_LOADER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A class resolved through a loader.
#[derive(Clone, Debug)]
pub struct LoadedClass {
    /// Fully qualified class name.
    pub name: String,
    /// Artifact bytes backing the class.
    pub bytes: Vec<u8>,
    /// The loader that initiated the lookup.
    pub loader: LoaderId,
}

/// Shared loader for the standard runtime, used as the delegation parent.
#[derive(Clone, Debug)]
pub struct BaseLoader {
    roots: Vec<PathBuf>,
    reflection: bool,
}

impl BaseLoader {
    /// The plain runtime loader.
    pub fn runtime(roots: Vec<PathBuf>) -> Self {
        BaseLoader {
            roots,
            reflection: false,
        }
    }

    /// The reflection-capable runtime variant.
    pub fn runtime_with_reflection(roots: Vec<PathBuf>) -> Self {
        BaseLoader {
            roots,
            reflection: true,
        }
    }

    /// Whether this parent includes the reflection-capable runtime.
    pub fn reflection_capable(&self) -> bool {
        self.reflection
    }

    fn resolve(&self, initiator: LoaderId, name: &str) -> Option<LoadedClass> {
        resolve_in_roots(&self.roots, initiator, name)
    }
}

/// Build the isolated loader's classpath in the fixed precedence order:
/// secondary-language output first, then configured extra dependency
/// roots, then roots contributed by the external per-unit dependency
/// provider (absence of the provider contributes nothing).
pub fn build_classpath(
    secondary_output: Option<&Path>,
    extra_dependencies: &[PathBuf],
    units: &[SourceUnit],
    provider: Option<&dyn DependencyProvider>,
) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(dir) = secondary_output {
        roots.push(dir.to_path_buf());
    }
    roots.extend(extra_dependencies.iter().cloned());
    if let Some(provider) = provider {
        for unit in units {
            roots.extend(provider.classpath_for(unit));
        }
    }
    roots
}

/// Disposable, fixture-scoped dynamic loader.
///
/// Lookup order: the in-memory primary artifacts, then the classpath
/// roots in order, then the parent.
#[derive(Debug)]
pub struct IsolatedLoader {
    id: LoaderId,
    artifacts: Arc<ArtifactSet>,
    classpath: Vec<PathBuf>,
    parent: BaseLoader,
    disposed: bool,
}

impl IsolatedLoader {
    /// Create a loader over the fixture's artifacts and classpath.
    pub fn new(artifacts: Arc<ArtifactSet>, classpath: Vec<PathBuf>, parent: BaseLoader) -> Self {
        IsolatedLoader {
            id: LoaderId::next(),
            artifacts,
            classpath,
            parent,
            disposed: false,
        }
    }

    /// This loader's identity token.
    pub fn id(&self) -> LoaderId {
        self.id
    }

    /// The ordered classpath roots (excluding the in-memory artifacts
    /// and the parent).
    pub fn classpath(&self) -> &[PathBuf] {
        &self.classpath
    }

    /// Check if the loader has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Resolve a class by fully qualified name.
    pub fn load_class(&self, name: &str) -> Result<LoadedClass> {
        if self.disposed {
            return Err(HarnessError::Setup(format!(
                "load_class({name}) on a disposed loader"
            )));
        }

        if let Some(artifact) = self.artifacts.find(name) {
            return Ok(LoadedClass {
                name: artifact.class_name.clone(),
                bytes: artifact.bytes.clone(),
                loader: self.id,
            });
        }

        if let Some(class) = resolve_in_roots(&self.classpath, self.id, name) {
            return Ok(class);
        }

        // Unresolved lookups delegate to the shared runtime loader.
        self.parent
            .resolve(self.id, name)
            .ok_or_else(|| HarnessError::ClassNotFound(name.to_string()))
    }

    /// Release the loader's file handles. Safe to call more than once,
    /// and safe to call during teardown even if execution never reached
    /// the loading phase.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.classpath.clear();
        tracing::debug!(loader = ?self.id, "disposed isolated loader");
    }
}

fn resolve_in_roots(roots: &[PathBuf], initiator: LoaderId, name: &str) -> Option<LoadedClass> {
    let relative = class_file_path(name);
    for root in roots {
        let candidate = root.join(&relative);
        if let Ok(bytes) = std::fs::read(&candidate) {
            return Some(LoadedClass {
                name: name.to_string(),
                bytes,
                loader: initiator,
            });
        }
    }
    None
}

fn class_file_path(name: &str) -> PathBuf {
    let mut path: PathBuf = name.split('.').collect();
    path.set_extension(ARTIFACT_EXTENSION);
    path
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
