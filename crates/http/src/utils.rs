//! Utility macros for the HTTP crate.

/// Returns early with `$error` when `$predicate` doesn't hold.
///
/// Like `assert!`, but for validation that fails with an error instead of a panic.
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
