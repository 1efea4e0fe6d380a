//! Harness error taxonomy.
//!
//! Failure kinds are deliberately distinct so callers can tell a valid
//! negative-test outcome (`Compiletime`) from a tooling fault (`Internal`)
//! and a test-authoring bug (`Setup`) from a plain assertion failure.
//! Nothing here is retried; every failure is single-attempt and surfaced
//! synchronously.

use thiserror::Error;

/// Convenience alias used throughout the harness.
pub type Result<T> = std::result::Result<T, HarnessError>;

/// All failure kinds the harness can surface.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Invalid harness usage (double initialization of the environment or
    /// the isolated loader). Indicates a bug in the test, not in the code
    /// under test.
    #[error("harness setup error: {0}")]
    Setup(String),

    /// The primary compiler rejected the input with diagnostics. For
    /// negative tests this is the expected outcome; diagnostics are
    /// emitted to the error stream before this is returned.
    #[error("compilation failed")]
    Compiletime {
        /// Diagnostics text captured from the compiler.
        diagnostics: String,
    },

    /// The compiler (or a verification tool) crashed, or behaved in a way
    /// no fixture should be able to provoke.
    #[error("compiler crashed: {0}")]
    Internal(String),

    /// The secondary-language compiler process reported failure.
    #[error("secondary compilation failed:\n{diagnostics}")]
    SecondaryCompile {
        /// Diagnostics captured from the external process.
        diagnostics: String,
    },

    /// The bytecode verifier rejected one or more artifacts.
    #[error("bytecode verification failed:\n{}", messages.join("\n"))]
    Verification {
        /// Collected violation messages.
        messages: Vec<String>,
    },

    /// No artifact was generated for the requested class.
    #[error("no class file was generated for: {0}")]
    ClassNotFound(String),

    /// The entry point threw instead of returning a status string.
    #[error("entry point threw: {0}")]
    EntryFailed(String),

    /// The entry point returned, but not the expected sentinel.
    #[error("expected {expected:?}, got {actual:?}")]
    Assertion {
        /// The sentinel the fixture was expected to return.
        expected: String,
        /// What the entry point actually returned.
        actual: String,
    },

    /// A fixture marked as testing non-standard behavior returned the
    /// sentinel anyway.
    #[error("entry point returned the sentinel {0:?} but the fixture expects non-standard behavior")]
    UnexpectedSentinel(String),

    /// I/O failure while materializing sources or artifacts.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    /// Check if this is a setup (harness-usage) error.
    pub fn is_setup(&self) -> bool {
        matches!(self, HarnessError::Setup(_))
    }

    /// Check if this is a compile-time diagnostic failure, i.e. a valid
    /// negative-test outcome rather than a harness fault.
    pub fn is_compiletime(&self) -> bool {
        matches!(self, HarnessError::Compiletime { .. })
    }

    /// Check if this is an assertion failure (sentinel mismatch in either
    /// direction).
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            HarnessError::Assertion { .. } | HarnessError::UnexpectedSentinel(_)
        )
    }
}
