//! Unified error interface for tgsh.
//!
//! Every fallible tgsh crate implements [`ErrorCode`] on its error
//! enum so that the shell and the audit layer can log and branch on
//! stable machine-readable codes instead of display strings.
//!
//! The graph and kernel crates have no error types at all: their
//! operations are total and report non-success as `false` or an
//! empty result. `ErrorCode` only appears at the I/O and
//! boundary-parsing layers.

/// Stable machine-readable error codes.
///
/// # Code format
///
/// - UPPER_SNAKE_CASE, e.g. `"AUTH_INVALID_CREDENTIALS"`
/// - prefixed with the owning domain (`RIGHT_`, `AUTH_`, `VFS_`, ...)
/// - never changed once published
///
/// # Recoverability
///
/// `is_recoverable` answers "can retrying or a corrective user action
/// succeed?": a mistyped command is recoverable, a corrupt data file
/// is not.
///
/// # Example
///
/// ```
/// use tgsh_types::ErrorCode;
///
/// #[derive(Debug)]
/// enum StoreError {
///     NotFound,
///     Corrupt,
/// }
///
/// impl ErrorCode for StoreError {
///     fn code(&self) -> &'static str {
///         match self {
///             Self::NotFound => "STORE_NOT_FOUND",
///             Self::Corrupt => "STORE_CORRUPT",
///         }
///     }
///
///     fn is_recoverable(&self) -> bool {
///         matches!(self, Self::NotFound)
///     }
/// }
///
/// assert_eq!(StoreError::Corrupt.code(), "STORE_CORRUPT");
/// ```
pub trait ErrorCode {
    /// Returns the machine-readable code for this error.
    fn code(&self) -> &'static str;

    /// Returns whether retrying or user action can succeed.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code follows the tgsh conventions:
/// non-empty, UPPER_SNAKE_CASE, and carrying the expected prefix.
///
/// Intended for tests covering every variant of an error enum.
///
/// # Panics
///
/// Panics with a descriptive message when a check fails.
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();
    assert!(!code.is_empty(), "error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "error code '{code}' must start with prefix '{expected_prefix}'"
    );
    assert!(
        is_upper_snake_case(code),
        "error code '{code}' must be UPPER_SNAKE_CASE"
    );
}

/// [`assert_error_code`] over a slice, one call per enum in tests.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('_')
        && !s.ends_with('_')
        && !s.contains("__")
        && s.chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
