//! Entry-point execution and sentinel assertion.
//!
//! Compiled fixtures may inspect the ambient execution context to locate
//! their own resources, so the engine rebinds the context to the isolated
//! loader for exactly the duration of the entry call. The restore runs on
//! every exit path, including panics, via a drop guard.

use std::cell::Cell;
use std::path::Path;

use crate::error::{HarnessError, Result};
use crate::loader::{IsolatedLoader, LoadedClass, LoaderId};
use crate::services::EntryRuntime;

/// The literal success marker a correctly behaving entry point returns.
pub const SENTINEL: &str = "OK";

/// Default entry method name under the facade convention.
pub const DEFAULT_ENTRY_METHOD: &str = "check";

const FACADE_SUFFIX: &str = "Facade";

/// Facade class name derived from a fixture or unit file name:
/// the stem with non-alphanumerics mapped to `_`, first letter
/// upper-cased, plus the facade suffix.
pub fn facade_class_name(origin: &Path) -> String {
    let stem = origin
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("a_test");
    let mut name: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if let Some(first) = name.get(..1) {
        let upper = first.to_ascii_uppercase();
        name.replace_range(..1, &upper);
    }
    name.push_str(FACADE_SUFFIX);
    name
}

/// The ambient execution context of the fixture's logical thread.
///
/// Modeled as an explicit token rather than a thread-local global: the
/// engine threads it through the invocation and swaps it with a scoped
/// guard.
#[derive(Debug, Default)]
pub struct AmbientContext {
    current: Cell<Option<LoaderId>>,
}

impl AmbientContext {
    /// A fresh context with no loader bound.
    pub fn new() -> Self {
        AmbientContext::default()
    }

    /// The currently bound loader, if any.
    pub fn current(&self) -> Option<LoaderId> {
        self.current.get()
    }

    /// Rebind the context to `loader` for the guard's lifetime. If the
    /// loader is already current, the guard is a no-op.
    pub fn bind(&self, loader: LoaderId) -> ContextGuard<'_> {
        let saved = self.current.get();
        let rebound = saved != Some(loader);
        if rebound {
            self.current.set(Some(loader));
        }
        ContextGuard {
            ambient: self,
            saved,
            rebound,
        }
    }
}

/// Scoped capture-swap-restore for [`AmbientContext`]. The restore runs
/// on drop, so it happens on every exit path of the guarded call.
pub struct ContextGuard<'a> {
    ambient: &'a AmbientContext,
    saved: Option<LoaderId>,
    rebound: bool,
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        if self.rebound {
            self.ambient.current.set(self.saved);
        }
    }
}

/// Outcome of one entry-point invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionResult {
    /// The string the entry point returned, or the thrown failure text.
    pub returned_value: String,
    /// Whether the entry point threw instead of returning.
    pub threw: bool,
}

/// Compare the returned status against the sentinel.
///
/// A fixture marked as testing unexpected/undefined behavior inverts the
/// check: the result must NOT equal the sentinel. A mismatch in either
/// direction is an assertion failure, never a harness fault.
pub fn check_sentinel(actual: &str, expect_non_ok: bool) -> Result<()> {
    if expect_non_ok {
        if actual == SENTINEL {
            Err(HarnessError::UnexpectedSentinel(actual.to_string()))
        } else {
            Ok(())
        }
    } else if actual == SENTINEL {
        Ok(())
    } else {
        Err(HarnessError::Assertion {
            expected: SENTINEL.to_string(),
            actual: actual.to_string(),
        })
    }
}

/// Resolves and invokes entry points inside the isolated loader's context.
pub struct ExecutionEngine<'a> {
    runtime: &'a dyn EntryRuntime,
    ambient: &'a AmbientContext,
}

impl<'a> ExecutionEngine<'a> {
    /// Create an engine over the given runtime and ambient context.
    pub fn new(runtime: &'a dyn EntryRuntime, ambient: &'a AmbientContext) -> Self {
        ExecutionEngine { runtime, ambient }
    }

    /// Invoke the entry method, rebinding the ambient context to the
    /// isolated loader around the call.
    pub fn invoke(
        &self,
        loader: &IsolatedLoader,
        class: &LoadedClass,
        method: &str,
    ) -> ExecutionResult {
        let _guard = self.ambient.bind(loader.id());
        match self.runtime.invoke(class, method) {
            Ok(returned_value) => ExecutionResult {
                returned_value,
                threw: false,
            },
            Err(thrown) => ExecutionResult {
                returned_value: thrown,
                threw: true,
            },
        }
    }

    /// Invoke the entry method and check the result against the sentinel.
    pub fn invoke_and_check(
        &self,
        loader: &IsolatedLoader,
        class: &LoadedClass,
        method: &str,
        expect_non_ok: bool,
    ) -> Result<()> {
        let result = self.invoke(loader, class, method);
        if result.threw {
            return Err(HarnessError::EntryFailed(result.returned_value));
        }
        check_sentinel(&result.returned_value, expect_non_ok)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
