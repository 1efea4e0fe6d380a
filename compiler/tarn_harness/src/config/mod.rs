//! Build configuration derived from directives and ambient settings.
//!
//! One immutable [`BuildConfig`] snapshot exists per fixture. It is a pure
//! function of the harness options and the assembled source units; nothing
//! re-reads directives after it is built.

use std::fmt;
use std::path::PathBuf;

use crate::fixture::SourceUnit;

/// Which dependencies the compiled fixture may see.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DependencyKind {
    /// No runtime dependencies beyond the language runtime itself.
    None,
    /// A minimal JDK-like subset.
    #[default]
    JdkOnly,
    /// The full runtime, including the reflection-capable variant.
    Full,
}

/// Which standard-library image the compiler runs against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JdkKind {
    /// The small mock image used by most fixtures.
    #[default]
    Mock,
    /// A complete real image.
    Full,
}

/// A runtime target version, ordered so overrides can be compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetVersion(u8);

impl TargetVersion {
    /// Version 6, the oldest target the harness accepts.
    pub const V6: TargetVersion = TargetVersion(6);
    /// Version 8, the ambient default.
    pub const V8: TargetVersion = TargetVersion(8);

    /// Wrap a raw major version number.
    pub fn new(major: u8) -> Self {
        TargetVersion(major)
    }

    /// The major version number.
    pub fn major(self) -> u8 {
        self.0
    }

    /// Parse `"8"`, `"11"`, or the legacy `"1.8"` spelling.
    pub fn parse(text: &str) -> Option<Self> {
        let normalized = text.strip_prefix("1.").unwrap_or(text);
        normalized.parse::<u8>().ok().map(TargetVersion)
    }
}

impl Default for TargetVersion {
    fn default() -> Self {
        TargetVersion::V8
    }
}

impl fmt::Display for TargetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable build configuration snapshot, one per fixture.
#[derive(Clone, Debug)]
pub struct BuildConfig {
    /// Dependency kind for the isolated loader's parent.
    pub dependency_kind: DependencyKind,
    /// Standard-library image kind.
    pub jdk_kind: JdkKind,
    /// Effective runtime target version.
    pub target: TargetVersion,
    /// Preview features requested by any unit.
    pub preview_enabled: bool,
    /// Annotation/runtime library roots handed to the primary compiler.
    pub annotation_roots: Vec<PathBuf>,
    /// Extra secondary-language source roots.
    pub extra_source_roots: Vec<PathBuf>,
    /// Accumulated secondary-compiler options, in unit order, duplicates
    /// appended rather than replaced.
    pub javac_options: Vec<String>,
}

impl BuildConfig {
    /// Derive the fixture's configuration from ambient settings plus the
    /// assembled source units.
    ///
    /// A `TARGET_VERSION` directive wins only when it requests a version
    /// higher than the ambient default; lower overrides are rejected.
    /// Silently downgrading the target could mask target-specific bugs.
    pub fn from_units(
        dependency_kind: DependencyKind,
        jdk_kind: JdkKind,
        annotation_roots: Vec<PathBuf>,
        extra_source_roots: Vec<PathBuf>,
        ambient_target: TargetVersion,
        units: &[SourceUnit],
    ) -> BuildConfig {
        let mut target = ambient_target;
        let mut preview_enabled = false;
        let mut javac_options = Vec::new();

        for unit in units {
            if let Some(requested) = unit.directives.target_version() {
                if requested > target {
                    target = requested;
                }
            }
            preview_enabled |= unit.directives.enable_preview();
            javac_options.extend(unit.directives.javac_options().iter().cloned());
        }

        BuildConfig {
            dependency_kind,
            jdk_kind,
            target,
            preview_enabled,
            annotation_roots,
            extra_source_roots,
            javac_options,
        }
    }
}
