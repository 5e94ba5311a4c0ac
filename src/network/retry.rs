use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;

use crate::Error;
use crate::Result;

/// Runs `task` until it succeeds, sleeping `delay` between attempts.
///
/// There is no attempt limit. The only way out besides success is `cancel`,
/// which is observed before every attempt, while an attempt is in flight and
/// during every sleep; it yields [`Error::Cancelled`].
pub(crate) async fn retry_with_delay<F, T, P>(
    name: &str,
    delay: Duration,
    cancel: &CancellationToken,
    mut task: F,
) -> Result<P>
where
    F: FnMut() -> T,
    T: Future<Output = Result<P>>,
{
    let mut attempt: u64 = 0;
    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        attempt += 1;

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            r = task() => r,
        };

        match outcome {
            Ok(r) => {
                if attempt > 1 {
                    debug!(task = name, attempt, "succeeded after retry");
                }
                return Ok(r);
            }
            Err(e) => {
                warn!(task = name, attempt, "failed with error: {:?}, retrying in {:?}", e, delay);
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            _ = sleep(delay) => {}
        }
    }
}

/// Sleeps for `delay` unless `cancel` fires first.
///
/// Returns `false` when cancelled.
pub(crate) async fn sleep_or_cancel(
    delay: Duration,
    cancel: &CancellationToken,
) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = sleep(delay) => true,
    }
}
