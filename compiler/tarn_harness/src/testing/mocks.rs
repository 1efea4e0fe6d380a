#![allow(
    clippy::unwrap_used,
    reason = "mock collaborators — panics give clear failure messages in tests"
)]
//! Mock collaborator implementations.
//!
//! The mock "language" understood by [`MockPrimaryCompiler`]: a unit
//! containing `return "X"` compiles to an artifact whose entry returns
//! `X`; `throw "X"` compiles to an entry that throws; `!!SYNTAX_ERROR`
//! provokes a compile-time diagnostic and `!!ICE` an internal compiler
//! crash. [`MockRuntime`] executes the resulting `RET:`/`THROW:` bytes.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;

use crate::artifact::{Artifact, ArtifactSet};
use crate::config::BuildConfig;
use crate::exec::facade_class_name;
use crate::fixture::SourceUnit;
use crate::harness::HarnessServices;
use crate::loader::LoadedClass;
use crate::services::{
    BytecodeVerifier, CompileFailure, DependencyProvider, DexChecker, Disassembler, EntryRuntime,
    PrimaryCompiler, SecondaryCompiler, SecondaryOutcome, Verification,
};

/// Primary compiler over the mock language, counting invocations so the
/// memoization contract can be asserted.
#[derive(Debug, Default)]
pub struct MockPrimaryCompiler {
    invocations: AtomicUsize,
}

impl MockPrimaryCompiler {
    /// A fresh compiler with a zero invocation count.
    pub fn new() -> Self {
        MockPrimaryCompiler::default()
    }

    /// How many times `compile` has been called.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

impl PrimaryCompiler for MockPrimaryCompiler {
    fn compile(
        &self,
        units: &[SourceUnit],
        _config: &BuildConfig,
    ) -> Result<ArtifactSet, CompileFailure> {
        self.invocations.fetch_add(1, Ordering::SeqCst);

        let mut artifacts = Vec::with_capacity(units.len());
        for unit in units {
            if unit.content.contains("!!SYNTAX_ERROR") {
                return Err(CompileFailure::Diagnostic(format!(
                    "{}: syntax error",
                    unit.name
                )));
            }
            if unit.content.contains("!!ICE") {
                return Err(CompileFailure::Internal(format!(
                    "internal error while compiling {}",
                    unit.name
                )));
            }
            let class_name = facade_class_name(Path::new(&unit.name));
            artifacts.push(Artifact::new(class_name, entry_bytes(&unit.content)));
        }
        Ok(ArtifactSet::new(artifacts))
    }
}

fn entry_bytes(content: &str) -> Vec<u8> {
    if let Some(value) = quoted_after(content, "return \"") {
        format!("RET:{value}").into_bytes()
    } else if let Some(value) = quoted_after(content, "throw \"") {
        format!("THROW:{value}").into_bytes()
    } else {
        b"RET:".to_vec()
    }
}

fn quoted_after(content: &str, prefix: &str) -> Option<String> {
    let start = content.find(prefix)? + prefix.len();
    let rest = &content[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

/// Runtime executing the `RET:`/`THROW:` artifact format.
#[derive(Clone, Copy, Debug, Default)]
pub struct MockRuntime;

impl EntryRuntime for MockRuntime {
    fn invoke(&self, class: &LoadedClass, _method: &str) -> Result<String, String> {
        let text = String::from_utf8_lossy(&class.bytes);
        if let Some(value) = text.strip_prefix("RET:") {
            Ok(value.to_string())
        } else if let Some(message) = text.strip_prefix("THROW:") {
            Err(message.to_string())
        } else {
            Err(format!("malformed artifact for {}", class.name))
        }
    }
}

/// Runtime that panics mid-invocation, for unwind-safety tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct PanickingRuntime;

impl EntryRuntime for PanickingRuntime {
    fn invoke(&self, _class: &LoadedClass, _method: &str) -> Result<String, String> {
        panic!("runtime exploded")
    }
}

/// One recorded secondary-compiler call.
#[derive(Clone, Debug)]
pub struct SecondaryCall {
    /// Absolute source file paths passed to the compiler.
    pub sources: Vec<PathBuf>,
    /// Option list passed to the compiler.
    pub options: Vec<String>,
}

/// Secondary compiler that records its calls and, on success, emits one
/// `RET:OK` class per source file into the `-d` output directory.
#[derive(Debug, Default)]
pub struct RecordingSecondaryCompiler {
    calls: Mutex<Vec<SecondaryCall>>,
    fail_with: Option<String>,
}

impl RecordingSecondaryCompiler {
    /// A compiler that succeeds.
    pub fn new() -> Self {
        RecordingSecondaryCompiler::default()
    }

    /// A compiler that fails every call with the given diagnostics.
    pub fn failing(diagnostics: impl Into<String>) -> Self {
        RecordingSecondaryCompiler {
            calls: Mutex::new(Vec::new()),
            fail_with: Some(diagnostics.into()),
        }
    }

    /// All calls recorded so far.
    pub fn calls(&self) -> Vec<SecondaryCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl SecondaryCompiler for RecordingSecondaryCompiler {
    fn compile(&self, sources: &[PathBuf], options: &[String]) -> SecondaryOutcome {
        self.calls.lock().unwrap().push(SecondaryCall {
            sources: sources.to_vec(),
            options: options.to_vec(),
        });

        if let Some(diagnostics) = &self.fail_with {
            return SecondaryOutcome::failure(diagnostics.clone());
        }

        if let Some(out_dir) = option_value(options, "-d") {
            for source in sources {
                if let Some(stem) = source.file_stem().and_then(|s| s.to_str()) {
                    std::fs::write(Path::new(&out_dir).join(format!("{stem}.cls")), b"RET:OK")
                        .unwrap();
                }
            }
        }
        SecondaryOutcome::ok()
    }
}

/// Value following `key` in a flag list, e.g. `-d <dir>`.
pub fn option_value(options: &[String], key: &str) -> Option<String> {
    options
        .windows(2)
        .find(|pair| pair[0] == key)
        .map(|pair| pair[1].clone())
}

/// Dex checker recording how often it ran; optionally failing.
#[derive(Debug, Default)]
pub struct RecordingDexChecker {
    checks: AtomicUsize,
    fail_with: Option<String>,
}

impl RecordingDexChecker {
    /// A checker that accepts everything.
    pub fn new() -> Self {
        RecordingDexChecker::default()
    }

    /// A checker that rejects everything with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        RecordingDexChecker {
            checks: AtomicUsize::new(0),
            fail_with: Some(message.into()),
        }
    }

    /// How many times the checker ran.
    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

impl DexChecker for RecordingDexChecker {
    fn check(&self, _artifacts: &ArtifactSet) -> Result<(), String> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(message) => Err(message.clone()),
            None => Ok(()),
        }
    }
}

/// Verifier that accepts every artifact set.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAllVerifier;

impl BytecodeVerifier for AcceptAllVerifier {
    fn verify(&self, _artifacts: &ArtifactSet) -> Verification {
        Verification::valid()
    }
}

/// Verifier that rejects every artifact set with fixed messages.
#[derive(Clone, Debug)]
pub struct RejectingVerifier {
    /// Violation messages to report.
    pub messages: Vec<String>,
}

impl BytecodeVerifier for RejectingVerifier {
    fn verify(&self, _artifacts: &ArtifactSet) -> Verification {
        Verification::invalid(self.messages.clone())
    }
}

/// Disassembler rendering the mock artifact format as readable text.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextDisassembler;

impl Disassembler for TextDisassembler {
    fn disassemble(&self, artifacts: &ArtifactSet) -> Result<String, String> {
        let mut text = String::new();
        for artifact in artifacts.iter() {
            text.push_str(&format!(
                "// class {} ({} bytes)\n{}\n",
                artifact.class_name,
                artifact.bytes.len(),
                String::from_utf8_lossy(&artifact.bytes)
            ));
        }
        Ok(text)
    }
}

/// Disassembler that always fails, for reporter robustness tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingDisassembler;

impl Disassembler for FailingDisassembler {
    fn disassemble(&self, _artifacts: &ArtifactSet) -> Result<String, String> {
        Err("disassembler exploded".to_string())
    }
}

/// Dependency provider serving fixed roots per unit name.
#[derive(Clone, Debug, Default)]
pub struct StaticDependencyProvider {
    roots_by_unit: FxHashMap<String, Vec<PathBuf>>,
}

impl StaticDependencyProvider {
    /// An empty provider.
    pub fn new() -> Self {
        StaticDependencyProvider::default()
    }

    /// Serve `roots` for the unit with the given name.
    pub fn with_unit(mut self, unit_name: impl Into<String>, roots: Vec<PathBuf>) -> Self {
        self.roots_by_unit.insert(unit_name.into(), roots);
        self
    }
}

impl DependencyProvider for StaticDependencyProvider {
    fn classpath_for(&self, unit: &SourceUnit) -> Vec<PathBuf> {
        self.roots_by_unit
            .get(&unit.name)
            .cloned()
            .unwrap_or_default()
    }
}

/// A full set of mock services with permissive defaults. Tests that need
/// to assert against a specific mock construct it separately and assign
/// the shared `Arc` into the returned struct.
pub fn mock_services() -> HarnessServices {
    HarnessServices {
        primary: Arc::new(MockPrimaryCompiler::new()),
        secondary: Arc::new(RecordingSecondaryCompiler::new()),
        dex_checker: None,
        verifier: Arc::new(AcceptAllVerifier),
        disassembler: Arc::new(TextDisassembler),
        runtime: Arc::new(MockRuntime),
        dependency_provider: None,
    }
}
