//! The per-fixture harness façade.
//!
//! One [`FixtureHarness`] exists per fixture and composes assembly,
//! configuration, compilation, loading, execution and reporting. The
//! fixture-scoped invariants live here: at most one fixture may be loaded
//! into a harness, exactly one artifact set exists per fixture, and at
//! most one isolated loader may ever be constructed for it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::artifact::ArtifactSet;
use crate::compile::Orchestrator;
use crate::config::{BuildConfig, DependencyKind, JdkKind, TargetVersion};
use crate::error::{HarnessError, Result};
use crate::exec::{facade_class_name, AmbientContext, ExecutionEngine, DEFAULT_ENTRY_METHOD};
use crate::fixture::Fixture;
use crate::loader::{self, BaseLoader, IsolatedLoader, LoadedClass};
use crate::report;
use crate::services::{
    BytecodeVerifier, DependencyProvider, DexChecker, Disassembler, EntryRuntime, PrimaryCompiler,
    SecondaryCompiler,
};

/// The collaborator services a harness drives.
///
/// All collaborators are opaque to the harness; see [`crate::services`].
#[derive(Clone)]
pub struct HarnessServices {
    /// Primary-language compiler.
    pub primary: Arc<dyn PrimaryCompiler>,
    /// Secondary-language compiler (external process).
    pub secondary: Arc<dyn SecondaryCompiler>,
    /// Optional post-compile dex-compatibility hook.
    pub dex_checker: Option<Arc<dyn DexChecker>>,
    /// Structural bytecode verifier, run when the loader is created.
    pub verifier: Arc<dyn BytecodeVerifier>,
    /// Disassembler for failure-path diagnostics.
    pub disassembler: Arc<dyn Disassembler>,
    /// Runtime that executes loaded entry points.
    pub runtime: Arc<dyn EntryRuntime>,
    /// Optional provider of per-unit dependency roots.
    pub dependency_provider: Option<Arc<dyn DependencyProvider>>,
}

/// Ambient settings a harness is constructed with.
#[derive(Clone, Debug)]
pub struct HarnessOptions {
    /// Dependency kind; `Full` selects the reflection-capable parent.
    pub dependency_kind: DependencyKind,
    /// Standard-library image kind.
    pub jdk_kind: JdkKind,
    /// Ambient default target version; fixture overrides never downgrade it.
    pub ambient_target: TargetVersion,
    /// Backend name checked against ignore-on-backend markers.
    pub backend: String,
    /// Annotation/runtime library roots for the primary compiler.
    pub annotation_roots: Vec<PathBuf>,
    /// Extra secondary-language source roots.
    pub extra_source_roots: Vec<PathBuf>,
    /// Roots of the shared base runtime loader.
    pub runtime_roots: Vec<PathBuf>,
    /// Explicitly configured extra dependency roots for the isolated
    /// loader's classpath.
    pub extra_dependencies: Vec<PathBuf>,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        HarnessOptions {
            dependency_kind: DependencyKind::default(),
            jdk_kind: JdkKind::default(),
            ambient_target: TargetVersion::default(),
            backend: "jvm".to_string(),
            annotation_roots: Vec::new(),
            extra_source_roots: Vec::new(),
            runtime_roots: Vec::new(),
            extra_dependencies: Vec::new(),
        }
    }
}

/// Drives one fixture from raw text to a checked execution result.
pub struct FixtureHarness {
    services: HarnessServices,
    options: HarnessOptions,
    ambient: AmbientContext,
    fixture: Option<Fixture>,
    orchestrator: Option<Orchestrator>,
    loader: Option<IsolatedLoader>,
}

impl FixtureHarness {
    /// Create a harness for a single fixture.
    pub fn new(services: HarnessServices, options: HarnessOptions) -> Self {
        FixtureHarness {
            services,
            options,
            ambient: AmbientContext::new(),
            fixture: None,
            orchestrator: None,
            loader: None,
        }
    }

    /// Assemble the fixture and derive its build configuration.
    ///
    /// Loading a second fixture into the same harness is a setup error:
    /// construct a new harness per fixture instead of resetting state.
    pub fn load_fixture(&mut self, origin: &Path, raw: &str) -> Result<()> {
        if self.fixture.is_some() {
            return Err(HarnessError::Setup(
                "must not load a fixture twice into one harness".to_string(),
            ));
        }

        let fixture = Fixture::assemble(origin, raw);
        let config = BuildConfig::from_units(
            self.options.dependency_kind,
            self.options.jdk_kind,
            self.options.annotation_roots.clone(),
            self.options.extra_source_roots.clone(),
            self.options.ambient_target,
            &fixture.units,
        );

        self.orchestrator = Some(Orchestrator::new(
            Arc::clone(&self.services.primary),
            Arc::clone(&self.services.secondary),
            self.services.dex_checker.clone(),
            Arc::clone(&self.services.disassembler),
            config,
            fixture.units.clone(),
        ));
        self.fixture = Some(fixture);
        Ok(())
    }

    /// The assembled fixture, if one has been loaded.
    pub fn fixture(&self) -> Option<&Fixture> {
        self.fixture.as_ref()
    }

    /// The effective build configuration, if a fixture has been loaded.
    pub fn config(&self) -> Option<&BuildConfig> {
        self.orchestrator.as_ref().map(Orchestrator::config)
    }

    /// The ambient execution context owned by this harness.
    pub fn ambient(&self) -> &AmbientContext {
        &self.ambient
    }

    /// The isolated loader, if one has been created.
    pub fn loader(&self) -> Option<&IsolatedLoader> {
        self.loader.as_ref()
    }

    fn orchestrator_mut(&mut self) -> Result<&mut Orchestrator> {
        self.orchestrator
            .as_mut()
            .ok_or_else(|| HarnessError::Setup("no fixture loaded".to_string()))
    }

    fn loaded_fixture(&self) -> Result<&Fixture> {
        self.fixture
            .as_ref()
            .ok_or_else(|| HarnessError::Setup("no fixture loaded".to_string()))
    }

    fn active_loader(&self) -> Result<&IsolatedLoader> {
        self.loader
            .as_ref()
            .ok_or_else(|| HarnessError::Setup("no isolated loader for this fixture".to_string()))
    }

    /// Run both compile phases, reporting diagnostics on failure.
    pub fn compile(&mut self) -> Result<()> {
        self.compile_reporting(true)
    }

    /// Run both compile phases, reporting quietly — for fixtures where a
    /// compile-time error is the expected outcome.
    pub fn compile_quietly(&mut self) -> Result<()> {
        self.compile_reporting(false)
    }

    fn compile_reporting(&mut self, report_problems: bool) -> Result<()> {
        self.orchestrator_mut()?.compile(report_problems)
    }

    /// The fixture's memoized artifact set, compiling if needed.
    pub fn artifacts(&mut self) -> Result<Arc<ArtifactSet>> {
        self.orchestrator_mut()?.artifacts(true)
    }

    /// Build the isolated loader and verify the artifacts.
    ///
    /// Creating a second loader for the same fixture is a programming
    /// error and fails immediately, before any loading work occurs.
    pub fn create_loader(&mut self) -> Result<()> {
        if self.loader.is_some() {
            return Err(HarnessError::Setup(
                "double initialization of the isolated loader in one fixture".to_string(),
            ));
        }

        let orchestrator = self.orchestrator_mut()?;
        let artifacts = orchestrator.artifacts(true)?;
        let secondary_output = orchestrator.secondary_output().map(Path::to_path_buf);

        let fixture = self.loaded_fixture()?;
        let classpath = loader::build_classpath(
            secondary_output.as_deref(),
            &self.options.extra_dependencies,
            &fixture.units,
            self.services.dependency_provider.as_deref(),
        );

        let parent = if self.options.dependency_kind == DependencyKind::Full {
            BaseLoader::runtime_with_reflection(self.options.runtime_roots.clone())
        } else {
            BaseLoader::runtime(self.options.runtime_roots.clone())
        };

        // The loader is stored before verification so teardown disposes
        // it even when verification fails.
        self.loader = Some(IsolatedLoader::new(
            Arc::clone(&artifacts),
            classpath,
            parent,
        ));

        let verification = self.services.verifier.verify(&artifacts);
        if !verification.ok {
            report::dump_artifacts(Some(&artifacts), &*self.services.disassembler);
            return Err(HarnessError::Verification {
                messages: verification.messages,
            });
        }
        Ok(())
    }

    /// Resolve a class through the isolated loader, creating the loader
    /// first if this fixture does not have one yet.
    pub fn load_class(&mut self, name: &str) -> Result<LoadedClass> {
        if self.loader.is_none() {
            self.create_loader()?;
        }
        self.active_loader()?.load_class(name)
    }

    /// Resolve the facade class named after the primary fixture file.
    pub fn facade_class(&mut self) -> Result<LoadedClass> {
        let fixture = self.loaded_fixture()?;
        let name = match fixture.facade_unit() {
            Some(unit) => facade_class_name(Path::new(&unit.name)),
            None => facade_class_name(&fixture.origin),
        };
        self.load_class(&name)
    }

    /// Resolve the entry point (facade convention, or an explicit method
    /// name), execute it inside the isolated loader's context and check
    /// the returned status against the sentinel.
    pub fn run_entry_and_check(&mut self, method: Option<&str>) -> Result<()> {
        let class = self.facade_class()?;
        let expect_non_ok = self.loaded_fixture()?.directives.expect_non_ok();
        let loader = self.active_loader()?;

        let engine = ExecutionEngine::new(&*self.services.runtime, &self.ambient);
        engine.invoke_and_check(
            loader,
            &class,
            method.unwrap_or(DEFAULT_ENTRY_METHOD),
            expect_non_ok,
        )
    }

    /// Render the artifact set as text, compiling first if needed.
    pub fn generate_to_text(&mut self) -> Result<String> {
        self.orchestrator_mut()?.generate_to_text()
    }

    /// Print the disassembled artifacts to stdout, unless the fixture is
    /// marked ignored on this harness's backend.
    pub fn print_report(&mut self) -> Result<()> {
        let ignored = self
            .fixture
            .as_ref()
            .is_some_and(|fixture| fixture.directives.ignores_backend(&self.options.backend));
        if ignored {
            return Ok(());
        }
        let text = self.generate_to_text()?;
        println!("{text}");
        Ok(())
    }

    /// Release fixture-scoped resources. Idempotent, and safe to call
    /// even if execution never reached the loading phase. Never masks a
    /// failure already in flight.
    pub fn teardown(&mut self) {
        if let Some(loader) = self.loader.as_mut() {
            loader.dispose();
        }
    }
}
