//! Fixture assembly.
//!
//! One fixture is a single annotated text that may contain several logical
//! source units, separated by `// FILE: <name>` markers. Assembly splits
//! the text, strips diagnostic-range markup so compilation sees clean
//! source, optionally appends the generated helpers unit, and sorts units
//! into a canonical order so compile order never depends on input order.

use std::path::{Path, PathBuf};

use crate::directives::DirectiveSet;

/// Marker line introducing a named unit inside a composite fixture.
pub const FILE_MARKER: &str = "// FILE:";

/// Default unit stem used when the fixture has no usable file name.
pub const DEFAULT_UNIT_STEM: &str = "a_test";

/// Name of the generated synthetic-helpers unit.
pub const HELPERS_UNIT_NAME: &str = "TestHelpers.tarn";

/// Language a source unit belongs to, classified by file suffix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitKind {
    /// Tarn source (`.tarn`, `.tarns`), compiled by the primary compiler.
    Primary,
    /// Java-like source (`.java`), compiled by the external secondary
    /// compiler against the primary binary output.
    Secondary,
}

/// One named, self-contained chunk of source text. Immutable once parsed.
#[derive(Clone, Debug)]
pub struct SourceUnit {
    /// Unit file name, e.g. `a_test.tarn` or `Helper.java`.
    pub name: String,
    /// Unit source text, already stripped of diagnostic-range markup.
    pub content: String,
    /// Directives embedded in this unit, parsed exactly once.
    pub directives: DirectiveSet,
}

impl SourceUnit {
    /// Create a unit, parsing its directives from the content.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let directives = DirectiveSet::parse(&content);
        SourceUnit {
            name: name.into(),
            content,
            directives,
        }
    }

    /// Which language this unit belongs to.
    pub fn kind(&self) -> UnitKind {
        if self.name.ends_with(".java") {
            UnitKind::Secondary
        } else {
            UnitKind::Primary
        }
    }
}

/// One complete assembled test input.
#[derive(Clone, Debug)]
pub struct Fixture {
    /// Path the fixture was loaded from; used for default naming and for
    /// the facade naming convention.
    pub origin: PathBuf,
    /// Source units in canonical (name) order.
    pub units: Vec<SourceUnit>,
    /// Global directives, parsed once from the whole raw text.
    pub directives: DirectiveSet,
}

impl Fixture {
    /// Assemble a fixture from its raw text.
    pub fn assemble(origin: &Path, raw: &str) -> Fixture {
        let directives = DirectiveSet::parse(raw);

        let mut units = match split_marked(raw) {
            Some(parts) => parts
                .into_iter()
                .map(|(name, content)| SourceUnit::new(name, strip_diagnostic_ranges(&content)))
                .collect(),
            None => {
                let stem = origin
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or(DEFAULT_UNIT_STEM);
                vec![SourceUnit::new(
                    format!("{stem}.tarn"),
                    strip_diagnostic_ranges(raw),
                )]
            }
        };

        if directives.with_helpers() {
            units.push(SourceUnit::new(HELPERS_UNIT_NAME, helpers_source()));
        }

        // Canonical order: compile order must not depend on input order.
        units.sort_by(|a, b| a.name.cmp(&b.name));

        Fixture {
            origin: origin.to_path_buf(),
            units,
            directives,
        }
    }

    /// Units belonging to the primary language, in canonical order.
    pub fn primary_units(&self) -> impl Iterator<Item = &SourceUnit> {
        self.units
            .iter()
            .filter(|unit| unit.kind() == UnitKind::Primary)
    }

    /// Units belonging to the secondary language, in canonical order.
    pub fn secondary_units(&self) -> impl Iterator<Item = &SourceUnit> {
        self.units
            .iter()
            .filter(|unit| unit.kind() == UnitKind::Secondary)
    }

    /// Check if any unit requires the secondary compile phase.
    pub fn has_secondary(&self) -> bool {
        self.secondary_units().next().is_some()
    }

    /// The unit whose name drives the facade naming convention: the first
    /// primary unit in canonical order.
    pub fn facade_unit(&self) -> Option<&SourceUnit> {
        self.primary_units().next()
    }
}

/// Split a composite fixture on `// FILE:` markers.
///
/// Returns `None` when the text contains no markers. Lines before the
/// first marker carry only global directives and belong to no unit.
fn split_marked(raw: &str) -> Option<Vec<(String, String)>> {
    if !raw.contains(FILE_MARKER) {
        return None;
    }

    let mut parts: Vec<(String, String)> = Vec::new();
    let mut current: Option<(String, String)> = None;

    for line in raw.lines() {
        if let Some(name) = line.trim_start().strip_prefix(FILE_MARKER) {
            if let Some(done) = current.take() {
                parts.push(done);
            }
            current = Some((name.trim().to_string(), String::new()));
        } else if let Some((_, content)) = current.as_mut() {
            content.push_str(line);
            content.push('\n');
        }
    }
    parts.extend(current);

    Some(parts)
}

/// Strip diagnostic-range markup (`<!NAME!>expr<!>` wrappers) so the
/// compiler sees clean source. The enclosed source text is kept.
///
/// A stray `<!` with no closing `!>` is left untouched.
pub fn strip_diagnostic_ranges(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find("<!") {
        let after_open = &rest[open..];
        let Some(close) = after_open.find("!>") else {
            break;
        };
        out.push_str(&rest[..open]);
        rest = &after_open[close + 2..];
    }
    out.push_str(rest);

    out
}

/// Source text of the generated synthetic-helpers unit.
fn helpers_source() -> String {
    "\
fn assertEquals(expected: String, actual: String): String {
    if (expected == actual) return \"OK\"
    return \"expected \" + expected + \", got \" + actual
}
"
    .to_string()
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
