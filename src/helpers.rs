use std::future::Future;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::error::{Error, Result};

/// Generate a random 48-hex-char bearer token.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}

/// Poll `check` every `interval` until it returns true or `timeout` elapses.
/// Returns whether the condition was met.
pub async fn wait_for<F, Fut>(timeout: Duration, interval: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    poll_until("condition", timeout, interval, || {
        let ready = check();
        async move { Ok(ready.await) }
    })
    .await
    .is_ok()
}

/// Readiness loop for `component`: `Ok(true)` stops polling, `Ok(false)`
/// polls again, an error aborts the wait. Fails with [`Error::NotReady`]
/// once `timeout` has elapsed.
pub async fn poll_until<F, Fut>(
    component: &'static str,
    timeout: Duration,
    interval: Duration,
    mut check: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = Instant::now();
    loop {
        if check().await? {
            return Ok(());
        }
        if start.elapsed() > timeout {
            return Err(Error::NotReady { component, timeout });
        }
        tokio::time::sleep(interval).await;
    }
}
