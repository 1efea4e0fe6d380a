use super::*;

use tempfile::tempdir;

use crate::artifact::Artifact;
use crate::error::HarnessError;
use crate::testing::mocks::StaticDependencyProvider;

fn loader_over(artifacts: Vec<Artifact>, classpath: Vec<PathBuf>) -> IsolatedLoader {
    IsolatedLoader::new(
        Arc::new(ArtifactSet::new(artifacts)),
        classpath,
        BaseLoader::runtime(Vec::new()),
    )
}

#[test]
fn test_loader_ids_are_unique() {
    let a = loader_over(Vec::new(), Vec::new());
    let b = loader_over(Vec::new(), Vec::new());
    assert_ne!(a.id(), b.id());
}

#[test]
fn test_artifacts_resolve_before_classpath() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("Main.cls"), b"from-disk").unwrap();

    let loader = loader_over(
        vec![Artifact::new("Main", b"in-memory".to_vec())],
        vec![dir.path().to_path_buf()],
    );

    let class = loader.load_class("Main").unwrap();
    assert_eq!(class.bytes, b"in-memory");
    assert_eq!(class.loader, loader.id());
}

#[test]
fn test_classpath_roots_searched_in_order() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    std::fs::write(first.path().join("Dep.cls"), b"first").unwrap();
    std::fs::write(second.path().join("Dep.cls"), b"second").unwrap();

    let loader = loader_over(
        Vec::new(),
        vec![first.path().to_path_buf(), second.path().to_path_buf()],
    );

    assert_eq!(loader.load_class("Dep").unwrap().bytes, b"first");
}

#[test]
fn test_unresolved_delegates_to_parent() {
    let runtime = tempdir().unwrap();
    std::fs::write(runtime.path().join("Base.cls"), b"base").unwrap();

    let loader = IsolatedLoader::new(
        Arc::new(ArtifactSet::default()),
        Vec::new(),
        BaseLoader::runtime(vec![runtime.path().to_path_buf()]),
    );

    assert_eq!(loader.load_class("Base").unwrap().bytes, b"base");
}

#[test]
fn test_missing_class_is_class_not_found() {
    let loader = loader_over(Vec::new(), Vec::new());
    let err = loader.load_class("Missing").unwrap_err();
    assert!(matches!(err, HarnessError::ClassNotFound(name) if name == "Missing"));
}

#[test]
fn test_nested_name_maps_to_subdirectory() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("pkg")).unwrap();
    std::fs::write(dir.path().join("pkg/Thing.cls"), b"pkg").unwrap();

    let loader = loader_over(Vec::new(), vec![dir.path().to_path_buf()]);
    assert_eq!(loader.load_class("pkg.Thing").unwrap().bytes, b"pkg");
}

#[test]
fn test_dispose_is_idempotent_and_blocks_loading() {
    let mut loader = loader_over(vec![Artifact::new("Main", vec![1])], Vec::new());
    loader.dispose();
    loader.dispose();
    assert!(loader.is_disposed());

    let err = loader.load_class("Main").unwrap_err();
    assert!(err.is_setup());
}

#[test]
fn test_classpath_precedence_order() {
    let secondary_out = Path::new("/tmp/secondary-out");
    let extra = vec![PathBuf::from("/deps/a"), PathBuf::from("/deps/b")];
    let units = [crate::fixture::SourceUnit::new("script.tarns", "")];
    let provider =
        StaticDependencyProvider::new().with_unit("script.tarns", vec![PathBuf::from("/ext")]);

    let classpath = build_classpath(Some(secondary_out), &extra, &units, Some(&provider));
    assert_eq!(
        classpath,
        [
            PathBuf::from("/tmp/secondary-out"),
            PathBuf::from("/deps/a"),
            PathBuf::from("/deps/b"),
            PathBuf::from("/ext"),
        ]
    );
}

#[test]
fn test_absent_provider_contributes_nothing() {
    let units = [crate::fixture::SourceUnit::new("a.tarn", "")];
    let classpath = build_classpath(None, &[], &units, None);
    assert!(classpath.is_empty());
}
