//! Bounded retry by attempt count. No delays, no wall-clock limits.

use std::fmt::Display;
use std::future::Future;
use tracing::warn;

/// Every attempt failed; carries the error of the last one.
#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last: E,
}

/// Runs `op` until it succeeds or `max_attempts` attempts have failed.
///
/// `op` receives the 1-based attempt number. A `max_attempts` of zero is
/// treated as one.
pub async fn with_retries<T, E, F, Fut>(max_attempts: u32, mut op: F) -> Result<T, Exhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(last) if attempt >= max_attempts => {
                return Err(Exhausted {
                    attempts: attempt,
                    last,
                })
            }
            Err(err) => {
                warn!(attempt, max_attempts, error = %err, "attempt failed, retrying");
                attempt += 1;
            }
        }
    }
}
