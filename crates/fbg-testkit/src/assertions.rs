//! Assertion helpers for engine results.

use std::fmt::Debug;

use fbg_core::{GraphError, GraphResult, ServerErrorKind};

// ─────────────────────────────────────────────────────────────────────────────
// Error Assertions
// ─────────────────────────────────────────────────────────────────────────────

/// Assert the result failed with a server-reported error of `kind`.
///
/// # Panics
///
/// Panics if the result is Ok or a different error.
pub fn assert_server_error<T: Debug>(result: &GraphResult<T>, kind: ServerErrorKind) {
    match result {
        Err(GraphError::ServerReported(err)) => assert_eq!(
            err.kind, kind,
            "expected server error of kind {kind:?} but got {err:?}"
        ),
        other => panic!("expected server error {kind:?} but got: {other:?}"),
    }
}

/// Assert the result failed coercing the field at `path`.
///
/// # Panics
///
/// Panics if the result is Ok or the error names another path.
pub fn assert_field_error<T: Debug>(result: &GraphResult<T>, path: &str) {
    match result {
        Err(err) => assert_eq!(
            err.field_path(),
            Some(path),
            "expected a coercion error for `{path}` but got: {err:?}"
        ),
        Ok(value) => panic!("expected a coercion error for `{path}` but got Ok({value:?})"),
    }
}

/// Assert the result failed polymorphic dispatch.
///
/// # Panics
///
/// Panics unless the error is [`GraphError::UnmatchedTypeDefinition`].
pub fn assert_unmatched_type<T: Debug>(result: &GraphResult<T>) {
    match result {
        Err(GraphError::UnmatchedTypeDefinition(_)) => {}
        other => panic!("expected an unmatched type definition but got: {other:?}"),
    }
}

/// Assert the result failed because a mapper could not be built.
///
/// # Panics
///
/// Panics unless the error is [`GraphError::MapperBuild`].
pub fn assert_mapper_build_error<T: Debug>(result: &GraphResult<T>) {
    match result {
        Err(GraphError::MapperBuild { .. }) => {}
        other => panic!("expected a mapper build failure but got: {other:?}"),
    }
}
