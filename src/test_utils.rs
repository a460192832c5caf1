//! Shared test macros.

/// Asserts that an operation returned Ok. On failure the error is rendered
/// as its full breadcrumb chain (`cannot load scan file "...": ...`), not
/// the struct-style debug dump.
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        if let Err(e) = &$result {
            panic!("expected Ok, got error: {e:#}");
        }
    };
}

/// Asserts that an operation returned Err, printing the unexpected value if
/// not. Leaves the Result usable so the caller can inspect the error chain
/// afterwards.
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        assert!(
            $result.is_err(),
            "expected an error, got: {:?}",
            $result.as_ref().ok()
        );
    };
}
