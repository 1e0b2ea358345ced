use std::future::Future;
use tokio::time::{sleep, Duration, Instant};
use tracing::debug;

/// Repeatedly runs `check` until it yields `Some`, sleeping between attempts
/// with Fibonacci backoff capped at `max_delay`.
///
/// Once the delay reaches `max_delay` it stays there.
/// Returns `Ok(None)` once `timeout` has elapsed without success; the last
/// check runs at the deadline. Errors from `check` are returned immediately.
pub async fn poll_until<T, E, Fut, F>(
    mut check: F,
    initial_delay: Duration,
    max_delay: Duration,
    timeout: Duration,
) -> Result<Option<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    // A timeout past the clock's range never expires.
    let deadline = Instant::now().checked_add(timeout);
    let mut attempt = 1;
    let max_delay = max_delay.max(Duration::from_millis(1));
    let initial_delay = initial_delay.max(Duration::from_millis(1));
    let mut fib = (initial_delay, initial_delay);

    loop {
        if let Some(result) = check().await? {
            return Ok(Some(result));
        }

        let mut delay = fib.0.min(max_delay);
        if let Some(deadline) = deadline {
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            delay = delay.min(deadline - now);
        }

        debug!("Attempt {attempt} not ready, polling again in {delay:?}");
        sleep(delay).await;
        attempt += 1;
        if fib.0 < max_delay {
            fib = (fib.1, fib.0.saturating_add(fib.1));
        }
    }
}
