use super::*;

use pretty_assertions::assert_eq;

#[test]
fn test_single_unit_named_after_origin() {
    let fixture = Fixture::assemble(Path::new("cases/stringConcat.tarn"), "fn check() {}\n");
    assert_eq!(fixture.units.len(), 1);
    assert_eq!(fixture.units[0].name, "stringConcat.tarn");
    assert_eq!(fixture.units[0].content, "fn check() {}\n");
}

#[test]
fn test_single_unit_fallback_stem() {
    let fixture = Fixture::assemble(Path::new(""), "fn check() {}\n");
    assert_eq!(fixture.units[0].name, "a_test.tarn");
}

#[test]
fn test_marker_splitting() {
    let raw = "\
// FILE: B.tarn
fn b() {}
// FILE: A.tarn
fn a() {}
";
    let fixture = Fixture::assemble(Path::new("multi.tarn"), raw);
    let names: Vec<&str> = fixture.units.iter().map(|u| u.name.as_str()).collect();
    // Canonical order is by name, not input order.
    assert_eq!(names, ["A.tarn", "B.tarn"]);
    assert_eq!(fixture.units[0].content, "fn a() {}\n");
    assert_eq!(fixture.units[1].content, "fn b() {}\n");
}

#[test]
fn test_preamble_before_first_marker_is_global_only() {
    let raw = "\
// TARGET_VERSION: 11
// FILE: A.tarn
fn a() {}
";
    let fixture = Fixture::assemble(Path::new("multi.tarn"), raw);
    assert_eq!(fixture.units.len(), 1);
    assert_eq!(
        fixture.directives.target_version(),
        Some(crate::config::TargetVersion::new(11))
    );
    assert!(!fixture.units[0].content.contains("TARGET_VERSION"));
}

#[test]
fn test_unit_kind_by_suffix() {
    assert_eq!(SourceUnit::new("A.tarn", "").kind(), UnitKind::Primary);
    assert_eq!(SourceUnit::new("A.tarns", "").kind(), UnitKind::Primary);
    assert_eq!(SourceUnit::new("A.java", "").kind(), UnitKind::Secondary);
}

#[test]
fn test_secondary_detection() {
    let raw = "\
// FILE: A.tarn
fn a() {}
// FILE: Helper.java
class Helper {}
";
    let fixture = Fixture::assemble(Path::new("mixed.tarn"), raw);
    assert!(fixture.has_secondary());
    assert_eq!(fixture.secondary_units().count(), 1);
    assert_eq!(fixture.facade_unit().unwrap().name, "A.tarn");
}

#[test]
fn test_facade_unit_skips_secondary() {
    // "A.java" sorts ahead of "b.tarn"; it must still not be the facade.
    let raw = "\
// FILE: A.java
class A {}
// FILE: b.tarn
fn b() {}
";
    let fixture = Fixture::assemble(Path::new("mixed.tarn"), raw);
    assert_eq!(fixture.facade_unit().unwrap().name, "b.tarn");
}

#[test]
fn test_strip_diagnostic_ranges_keeps_enclosed_source() {
    let stripped = strip_diagnostic_ranges("val x = <!TYPE_MISMATCH!>foo()<!>");
    assert_eq!(stripped, "val x = foo()");
}

#[test]
fn test_strip_diagnostic_ranges_nested_and_repeated() {
    let stripped = strip_diagnostic_ranges("<!A!>a<!> + <!B!>b<!>");
    assert_eq!(stripped, "a + b");
}

#[test]
fn test_strip_leaves_stray_opener() {
    assert_eq!(strip_diagnostic_ranges("a <! b"), "a <! b");
}

#[test]
fn test_units_are_stripped_of_ranges() {
    let raw = "\
// FILE: A.tarn
val x = <!UNUSED!>y<!>
";
    let fixture = Fixture::assemble(Path::new("t.tarn"), raw);
    assert_eq!(fixture.units[0].content, "val x = y\n");
}

#[test]
fn test_with_helpers_appends_unit() {
    let fixture = Fixture::assemble(Path::new("t.tarn"), "// WITH_HELPERS\nfn check() {}\n");
    let names: Vec<&str> = fixture.units.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["TestHelpers.tarn", "t.tarn"]);
    assert!(fixture.units[0].content.contains("assertEquals"));
}
