//! Helper macros used across the host crate.

/// Returns early with `$error` when `$predicate` does not hold.
///
/// Like `assert!`, but for validation that should surface as an `Err`
/// instead of a panic.
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
