use std::sync::Once;

pub type TestResult<T = ()> = color_eyre::eyre::Result<T>;

/// Installs the color-eyre report hook once per test binary. Later calls are no-ops.
pub(super) fn install() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        // Another harness may already own the hook.
        let _ = color_eyre::install();
    });
}

/// Fails the test with both operands in the report unless they compare equal.
macro_rules! ensure_eq {
    ($left:expr, $right:expr $(,)?) => {
        ensure_eq!($left, $right, "values differ")
    };
    ($left:expr, $right:expr, $($arg:tt)+) => {
        match (&$left, &$right) {
            (left, right) => ::color_eyre::eyre::ensure!(
                left == right,
                "{}\n  left: {:?}\n right: {:?}",
                ::core::format_args!($($arg)+),
                left,
                right,
            ),
        }
    };
}

/// Fails the test unless the expression is an `Err` matching the pattern.
macro_rules! ensure_err {
    ($result:expr, $pat:pat $(if $guard:expr)? $(,)?) => {
        match $result {
            Err($pat) $(if $guard)? => {}
            other => ::color_eyre::eyre::bail!(
                "expected an error matching `{}`, got {:?}",
                stringify!($pat),
                other,
            ),
        }
    };
}
