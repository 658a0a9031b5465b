//! Shared fixtures for the controller's integration tests: fake
//! collaborators, config builders and log capture.

pub mod builders;
pub mod fake_client;
pub mod fake_spawner;
pub mod logs;
pub mod status;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use analysis_controller::logging::LOG_ENV_VAR;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Upper bound for anything a test awaits on a real process.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Install a global test subscriber once per test binary.
///
/// Directives come from `ANALYSIS_CONTROLLER_LOG`, then `RUST_LOG`, then
/// `info`. Output goes through the harness's capture, so it only shows for
/// failing tests (or with `--nocapture`).
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, panicking if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!("timed out after {TEST_TIMEOUT:?}"),
    }
}
