/// Returns the version of the folio crates, as set in the workspace manifest.
pub fn folio_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Asserts that an expression matches a pattern, optionally with a guard.
///
/// Unlike `assert!(matches!(..))`, the failure message contains the debug
/// representation of the value that did not match.
#[macro_export]
macro_rules! assert_matches {
    ($expr:expr, $pat:pat) => {
        match ($expr) {
            $pat => (),
            val => ::core::panic!(
                "Assertion failed: {val:?} does not match {}",
                ::core::stringify!($pat)
            ),
        }
    };
    ($expr:expr, $pat:pat if $pred:expr) => {{
        let val = $expr;
        match (&val) {
            $pat if $pred => (),
            #[allow(unused_variables, reason = "bindings are only used by the guard")]
            $pat => ::core::panic!(
                "Assertion failed: {val:?} does not satisfy {}",
                ::core::stringify!($pred)
            ),
            _ => ::core::panic!(
                "Assertion failed: {val:?} does not match {}",
                ::core::stringify!($pat)
            ),
        }
    }};
}
