use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::KeepAlive;
use crate::network::retry_with_delay;
use crate::network::NdkApi;
use crate::proto::SdkMgrResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeepAliveExit {
    Cancelled,
    /// The daemon reported `threshold` failed statuses in a row
    ThresholdReached,
}

/// Probes the daemon every `keepalive.interval`.
///
/// Transport errors are retried with `retry_interval` and do not count
/// towards the threshold; only answered probes with a failed status do. A
/// successful status resets the counter.
pub(crate) async fn run_keepalive(
    api: Arc<dyn NdkApi>,
    keepalive: KeepAlive,
    retry_interval: Duration,
    cancel: CancellationToken,
) -> KeepAliveExit {
    let mut ticker = interval(keepalive.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately
    ticker.tick().await;

    let api: &dyn NdkApi = api.as_ref();
    let mut failures: u32 = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("session cancelled, keepalives stopped");
                return KeepAliveExit::Cancelled;
            }
            _ = ticker.tick() => {}
        }

        let resp = match retry_with_delay("keepalive", retry_interval, &cancel, move || api.keep_alive()).await {
            Ok(resp) => resp,
            Err(_) => {
                info!("session cancelled, keepalives stopped");
                return KeepAliveExit::Cancelled;
            }
        };

        if resp.is_success() {
            debug!("keepalive acknowledged");
            failures = 0;
            continue;
        }

        failures += 1;
        warn!(failures, threshold = keepalive.threshold, "keepalive returned failed status: {}", resp.error_str);
        if failures >= keepalive.threshold {
            info!(
                threshold = keepalive.threshold,
                "keepalives stopped, sdk_mgr failed threshold times"
            );
            return KeepAliveExit::ThresholdReached;
        }
    }
}
