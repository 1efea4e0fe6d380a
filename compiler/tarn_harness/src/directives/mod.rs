//! Fixture directive parsing.
//!
//! Directives are `// KEY` or `// KEY: value` lines embedded in fixture
//! source text. They are pure data: parsed exactly once during fixture
//! assembly and never re-interpreted by later phases. Unrecognized
//! directives are inert (ignored, not errors), which keeps the format
//! forward compatible.

use rustc_hash::FxHashSet;

use crate::config::TargetVersion;

/// Target-version override, e.g. `// TARGET_VERSION: 8`.
pub const TARGET_VERSION: &str = "TARGET_VERSION:";
/// Extra secondary-compiler options, e.g. `// JAVAC_OPTIONS: -parameters`.
/// Accumulates across units; later duplicates are appended, not merged.
pub const JAVAC_OPTIONS: &str = "JAVAC_OPTIONS:";
/// Backends this fixture is ignored on, e.g. `// IGNORE_BACKEND: jvm`.
pub const IGNORE_BACKEND: &str = "IGNORE_BACKEND:";
/// Skip the dex-compatibility hook for this fixture.
pub const SKIP_DEX_CHECK: &str = "SKIP_DEX_CHECK";
/// The entry point must NOT return the sentinel.
pub const EXPECT_NON_OK: &str = "EXPECT_NON_OK";
/// Append the generated synthetic-helpers unit to the fixture.
pub const WITH_HELPERS: &str = "WITH_HELPERS";
/// Enable preview features; changes secondary option translation.
pub const ENABLE_PREVIEW: &str = "ENABLE_PREVIEW";

/// The typed directive set collected from one stretch of source text.
///
/// Collected once during assembly; immutable afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectiveSet {
    target_version: Option<TargetVersion>,
    javac_options: Vec<String>,
    ignored_backends: FxHashSet<String>,
    skip_dex_check: bool,
    expect_non_ok: bool,
    with_helpers: bool,
    enable_preview: bool,
}

impl DirectiveSet {
    /// Parse all directives out of `text`.
    ///
    /// Total: never fails. Malformed values of recognized keys are
    /// treated the same as unrecognized keys — inert, with a warning.
    pub fn parse(text: &str) -> Self {
        let mut set = DirectiveSet::default();

        for line in text.lines() {
            let Some(rest) = line.trim_start().strip_prefix("//") else {
                continue;
            };
            let rest = rest.trim();

            if let Some(value) = rest.strip_prefix(TARGET_VERSION) {
                match TargetVersion::parse(value.trim()) {
                    // Multiple overrides resolve to the highest requested
                    // version, consistent with the no-downgrade rule.
                    Some(requested) => {
                        set.target_version =
                            Some(set.target_version.map_or(requested, |cur| cur.max(requested)));
                    }
                    None => {
                        tracing::warn!(value = value.trim(), "ignoring malformed TARGET_VERSION");
                    }
                }
            } else if let Some(value) = rest.strip_prefix(JAVAC_OPTIONS) {
                set.javac_options
                    .extend(value.split_whitespace().map(str::to_string));
            } else if let Some(value) = rest.strip_prefix(IGNORE_BACKEND) {
                set.ignored_backends.extend(
                    value
                        .split([',', ' '])
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(str::to_string),
                );
            } else if rest == SKIP_DEX_CHECK {
                set.skip_dex_check = true;
            } else if rest == EXPECT_NON_OK {
                set.expect_non_ok = true;
            } else if rest == WITH_HELPERS {
                set.with_helpers = true;
            } else if rest == ENABLE_PREVIEW {
                set.enable_preview = true;
            }
            // Anything else is an ordinary comment or an unknown directive.
        }

        set
    }

    /// Requested target-version override, if any.
    pub fn target_version(&self) -> Option<TargetVersion> {
        self.target_version
    }

    /// Accumulated secondary-compiler options, in source order.
    pub fn javac_options(&self) -> &[String] {
        &self.javac_options
    }

    /// Check if the fixture is ignored on the named backend.
    pub fn ignores_backend(&self, backend: &str) -> bool {
        self.ignored_backends.contains(backend)
    }

    /// Check if the dex-compatibility hook should be skipped.
    pub fn skip_dex_check(&self) -> bool {
        self.skip_dex_check
    }

    /// Check if the fixture expects the entry point NOT to return the
    /// sentinel.
    pub fn expect_non_ok(&self) -> bool {
        self.expect_non_ok
    }

    /// Check if the synthetic-helpers unit was requested.
    pub fn with_helpers(&self) -> bool {
        self.with_helpers
    }

    /// Check if preview features were requested.
    pub fn enable_preview(&self) -> bool {
        self.enable_preview
    }
}

#[cfg(test)]
mod tests;
