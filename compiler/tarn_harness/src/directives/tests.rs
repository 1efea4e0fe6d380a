use super::*;

#[test]
fn test_empty_text_has_no_directives() {
    let set = DirectiveSet::parse("fn main() {}\n");
    assert_eq!(set, DirectiveSet::default());
}

#[test]
fn test_parse_target_version() {
    let set = DirectiveSet::parse("// TARGET_VERSION: 8\n");
    assert_eq!(set.target_version(), Some(TargetVersion::V8));
}

#[test]
fn test_parse_legacy_target_spelling() {
    let set = DirectiveSet::parse("// TARGET_VERSION: 1.6\n");
    assert_eq!(set.target_version(), Some(TargetVersion::V6));
}

#[test]
fn test_multiple_target_versions_take_highest() {
    let set = DirectiveSet::parse("// TARGET_VERSION: 11\n// TARGET_VERSION: 8\n");
    assert_eq!(set.target_version(), Some(TargetVersion::new(11)));
}

#[test]
fn test_malformed_target_version_is_inert() {
    let set = DirectiveSet::parse("// TARGET_VERSION: banana\n");
    assert_eq!(set.target_version(), None);
}

#[test]
fn test_javac_options_accumulate_in_order() {
    let set = DirectiveSet::parse(
        "// JAVAC_OPTIONS: -parameters\n\
         some code\n\
         // JAVAC_OPTIONS: -nowarn -parameters\n",
    );
    assert_eq!(set.javac_options(), ["-parameters", "-nowarn", "-parameters"]);
}

#[test]
fn test_ignore_backend_list() {
    let set = DirectiveSet::parse("// IGNORE_BACKEND: jvm, wasm\n");
    assert!(set.ignores_backend("jvm"));
    assert!(set.ignores_backend("wasm"));
    assert!(!set.ignores_backend("native"));
}

#[test]
fn test_flag_directives() {
    let set = DirectiveSet::parse(
        "// SKIP_DEX_CHECK\n// EXPECT_NON_OK\n// WITH_HELPERS\n// ENABLE_PREVIEW\n",
    );
    assert!(set.skip_dex_check());
    assert!(set.expect_non_ok());
    assert!(set.with_helpers());
    assert!(set.enable_preview());
}

#[test]
fn test_unknown_directive_is_inert() {
    let set = DirectiveSet::parse("// FROBNICATE: yes\n// EXPECT_NON_OK\n");
    assert!(set.expect_non_ok());
    assert!(set.javac_options().is_empty());
}

#[test]
fn test_non_comment_lines_ignored() {
    // Directive keys inside ordinary code must not trigger.
    let set = DirectiveSet::parse("let x = \"EXPECT_NON_OK\"\n");
    assert!(!set.expect_non_ok());
}

#[test]
fn test_indented_directive_recognized() {
    let set = DirectiveSet::parse("    // SKIP_DEX_CHECK\n");
    assert!(set.skip_dex_check());
}
