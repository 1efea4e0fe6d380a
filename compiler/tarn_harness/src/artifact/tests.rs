use super::*;

use tempfile::tempdir;

#[test]
fn test_relative_path_maps_packages_to_dirs() {
    let artifact = Artifact::new("foo.bar.Baz", vec![1]);
    assert_eq!(artifact.relative_path(), Path::new("foo/bar/Baz.cls"));
}

#[test]
fn test_set_sorts_by_class_name() {
    let set = ArtifactSet::new(vec![
        Artifact::new("B", vec![]),
        Artifact::new("A", vec![]),
    ]);
    let names: Vec<&str> = set.iter().map(|a| a.class_name.as_str()).collect();
    assert_eq!(names, ["A", "B"]);
}

#[test]
fn test_find_by_name() {
    let set = ArtifactSet::new(vec![Artifact::new("Main", b"RET:OK".to_vec())]);
    assert_eq!(set.find("Main").unwrap().bytes, b"RET:OK");
    assert!(set.find("Other").is_none());
}

#[test]
fn test_write_to_creates_package_dirs() {
    let dir = tempdir().unwrap();
    let set = ArtifactSet::new(vec![
        Artifact::new("Top", vec![1, 2]),
        Artifact::new("pkg.Inner", vec![3]),
    ]);

    set.write_to(dir.path()).unwrap();

    assert_eq!(std::fs::read(dir.path().join("Top.cls")).unwrap(), [1, 2]);
    assert_eq!(std::fs::read(dir.path().join("pkg/Inner.cls")).unwrap(), [3]);
}
