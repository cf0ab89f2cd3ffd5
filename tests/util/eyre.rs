use std::sync::Once;

pub type TestResult<T = ()> = color_eyre::eyre::Result<T>;

static INSTALL: Once = Once::new();
/// Installs the `color-eyre` report handler and a `tracing` subscriber that writes through the
/// test harness, so that `RUST_LOG=localpoll=trace` shows socket activity for failing tests.
pub(super) fn install() {
    INSTALL.call_once(|| {
        let _ = color_eyre::install();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// `assert_eq!`, but failing with an eyre report instead of panicking.
macro_rules! ensure_eq {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left, right) => ::color_eyre::eyre::ensure!(
                (left == right),
                "expected `{:?}` to equal `{:?}`",
                left,
                right,
            ),
        }
    };
    ($left:expr, $right:expr, $($arg:tt)+) => {
        match (&$left, &$right) {
            (left, right) => ::color_eyre::eyre::ensure!(
                (left == right),
                "expected `{:?}` to equal `{:?}`: {}",
                left,
                right,
                ::core::format_args!($($arg)+),
            ),
        }
    };
}
