//! Compile-verify-execute harness for Tarn codegen fixtures.
//!
//! A fixture is one annotated text file that may expand into several
//! source units. The harness assembles it, derives a build configuration
//! from its embedded directives, drives the two compile phases, loads the
//! resulting artifacts through a fixture-scoped isolated loader, executes
//! the entry point inside that loader's ambient context and checks the
//! returned status against the `"OK"` sentinel.
//!
//! The typical flow:
//!
//! ```text
//! let mut harness = FixtureHarness::new(services, options);
//! harness.load_fixture(path, raw)?;
//! harness.compile()?;
//! harness.run_entry_and_check(None)?;
//! harness.teardown();
//! ```
//!
//! Construct one [`FixtureHarness`] per fixture; the fixture-scoped
//! invariants (single fixture, single memoized artifact set, single
//! isolated loader) are enforced rather than reset.

pub mod artifact;
pub mod compile;
pub mod config;
pub mod directives;
pub mod error;
pub mod exec;
pub mod fixture;
pub mod harness;
pub mod loader;
pub mod report;
pub mod services;
pub mod testing;

pub use error::{HarnessError, Result};
pub use harness::{FixtureHarness, HarnessOptions, HarnessServices};
