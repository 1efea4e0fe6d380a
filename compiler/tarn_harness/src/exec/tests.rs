use super::*;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::artifact::ArtifactSet;
use crate::loader::BaseLoader;
use crate::testing::mocks::{MockRuntime, PanickingRuntime};

fn loaded(bytes: &[u8]) -> (IsolatedLoader, LoadedClass) {
    let loader = IsolatedLoader::new(
        Arc::new(ArtifactSet::default()),
        Vec::new(),
        BaseLoader::runtime(Vec::new()),
    );
    let class = LoadedClass {
        name: "TFacade".to_string(),
        bytes: bytes.to_vec(),
        loader: loader.id(),
    };
    (loader, class)
}

#[test]
fn test_facade_class_name() {
    assert_eq!(facade_class_name(Path::new("stringConcat.tarn")), "StringConcatFacade");
    assert_eq!(facade_class_name(Path::new("cases/when-else.tarn")), "When_elseFacade");
    assert_eq!(facade_class_name(Path::new("")), "A_testFacade");
}

#[test]
fn test_check_sentinel() {
    assert!(check_sentinel("OK", false).is_ok());

    let err = check_sentinel("fail: got 3", false).unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Assertion { expected, actual }
            if expected == "OK" && actual == "fail: got 3"
    ));
}

#[test]
fn test_check_sentinel_inverted() {
    assert!(check_sentinel("anything else", true).is_ok());
    let err = check_sentinel("OK", true).unwrap_err();
    assert!(matches!(err, HarnessError::UnexpectedSentinel(_)));
}

#[test]
fn test_bind_restores_previous_loader() {
    let ambient = AmbientContext::new();
    let (outer, _) = loaded(b"");
    let (inner, _) = loaded(b"");

    let _outer_guard = ambient.bind(outer.id());
    {
        let _inner_guard = ambient.bind(inner.id());
        assert_eq!(ambient.current(), Some(inner.id()));
    }
    assert_eq!(ambient.current(), Some(outer.id()));
}

#[test]
fn test_bind_same_loader_is_noop() {
    let ambient = AmbientContext::new();
    let (loader, _) = loaded(b"");

    let _outer = ambient.bind(loader.id());
    drop(ambient.bind(loader.id()));
    // The inner no-op guard must not clear the binding on drop.
    assert_eq!(ambient.current(), Some(loader.id()));
}

#[test]
fn test_invoke_binds_context_for_call_duration() {
    let ambient = AmbientContext::new();
    let runtime = MockRuntime;
    let engine = ExecutionEngine::new(&runtime, &ambient);
    let (loader, class) = loaded(b"RET:OK");

    assert_eq!(ambient.current(), None);
    let result = engine.invoke(&loader, &class, DEFAULT_ENTRY_METHOD);
    assert_eq!(result.returned_value, "OK");
    assert!(!result.threw);
    assert_eq!(ambient.current(), None);
}

#[test]
fn test_invoke_captures_throw() {
    let ambient = AmbientContext::new();
    let runtime = MockRuntime;
    let engine = ExecutionEngine::new(&runtime, &ambient);
    let (loader, class) = loaded(b"THROW:boom");

    let result = engine.invoke(&loader, &class, DEFAULT_ENTRY_METHOD);
    assert!(result.threw);
    assert_eq!(result.returned_value, "boom");

    let err = engine
        .invoke_and_check(&loader, &class, DEFAULT_ENTRY_METHOD, false)
        .unwrap_err();
    assert!(matches!(err, HarnessError::EntryFailed(message) if message == "boom"));
}

#[test]
fn test_context_restored_after_panic() {
    let ambient = AmbientContext::new();
    let runtime = PanickingRuntime;
    let engine = ExecutionEngine::new(&runtime, &ambient);
    let (loader, class) = loaded(b"");

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        engine.invoke(&loader, &class, DEFAULT_ENTRY_METHOD)
    }));
    assert!(outcome.is_err());
    assert_eq!(ambient.current(), None);
}
