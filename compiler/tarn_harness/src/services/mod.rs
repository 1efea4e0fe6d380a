//! External collaborator boundary.
//!
//! The actual compilers, the dex checker, the bytecode verifier, the
//! disassembler, the external dependency-configuration provider and the
//! entry-point runtime are opaque services to this harness. Each gets a
//! trait here describing exactly the inputs and outputs the harness
//! depends on; production wiring and test mocks both implement them.

use std::path::PathBuf;

use crate::artifact::ArtifactSet;
use crate::config::BuildConfig;
use crate::fixture::SourceUnit;
use crate::loader::LoadedClass;

mod process;

pub use process::ProcessSecondaryCompiler;

/// How a primary compilation can fail.
#[derive(Clone, Debug)]
pub enum CompileFailure {
    /// The input was rejected with compile-time diagnostics. A valid
    /// negative-test outcome.
    Diagnostic(String),
    /// The compiler itself crashed.
    Internal(String),
}

/// The primary-language compiler service.
pub trait PrimaryCompiler {
    /// Compile the units (already in canonical order) under the given
    /// configuration into an artifact set.
    fn compile(
        &self,
        units: &[SourceUnit],
        config: &BuildConfig,
    ) -> Result<ArtifactSet, CompileFailure>;
}

/// Result of one secondary-compiler invocation.
#[derive(Clone, Debug)]
pub struct SecondaryOutcome {
    /// Whether the external process reported success.
    pub success: bool,
    /// Captured diagnostics text (stderr and stdout).
    pub diagnostics: String,
}

impl SecondaryOutcome {
    /// A successful outcome with no diagnostics.
    pub fn ok() -> Self {
        SecondaryOutcome {
            success: true,
            diagnostics: String::new(),
        }
    }

    /// A failed outcome carrying the process's own diagnostics.
    pub fn failure(diagnostics: impl Into<String>) -> Self {
        SecondaryOutcome {
            success: false,
            diagnostics: diagnostics.into(),
        }
    }
}

/// The secondary-language compiler, driven as an external process.
pub trait SecondaryCompiler {
    /// Compile the given source files with the given option list.
    fn compile(&self, sources: &[PathBuf], options: &[String]) -> SecondaryOutcome;
}

/// Post-compile bytecode-to-dex compatibility checker.
pub trait DexChecker {
    /// Check every artifact; an `Err` describes the incompatibility.
    fn check(&self, artifacts: &ArtifactSet) -> Result<(), String>;
}

/// Result of running the bytecode verifier over an artifact set.
#[derive(Clone, Debug)]
pub struct Verification {
    /// Whether all artifacts verified.
    pub ok: bool,
    /// Collected violation messages.
    pub messages: Vec<String>,
}

impl Verification {
    /// A clean verification result.
    pub fn valid() -> Self {
        Verification {
            ok: true,
            messages: Vec::new(),
        }
    }

    /// A failed verification result with violation messages.
    pub fn invalid(messages: Vec<String>) -> Self {
        Verification {
            ok: false,
            messages,
        }
    }
}

/// Structural bytecode verifier.
pub trait BytecodeVerifier {
    /// Verify every artifact in the set.
    fn verify(&self, artifacts: &ArtifactSet) -> Verification;
}

/// Textual disassembler used for failure-path diagnostics.
pub trait Disassembler {
    /// Render the artifact set as text. An `Err` carries the renderer's
    /// own failure message; the reporter logs it and moves on.
    fn disassemble(&self, artifacts: &ArtifactSet) -> Result<String, String>;
}

/// Optional provider of externally-resolved per-unit dependency roots
/// (script-style external imports). Absence contributes nothing.
pub trait DependencyProvider {
    /// Extra classpath roots this unit's resolved configuration adds.
    fn classpath_for(&self, unit: &SourceUnit) -> Vec<PathBuf>;
}

/// The runtime that actually executes a loaded entry point.
///
/// The entry-point contract: a zero-argument method returning a string,
/// where `"OK"` denotes success. `Err` carries the thrown failure.
pub trait EntryRuntime {
    /// Invoke `method` on the loaded class.
    fn invoke(&self, class: &LoadedClass, method: &str) -> Result<String, String>;
}
