use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;

use super::Topic;
use crate::network::retry_with_delay;
use crate::network::NdkApi;
use crate::proto::ndk::NotificationRegisterRequest;
use crate::proto::SdkMgrResponse;
use crate::NetworkError;
use crate::Result;
use crate::SubscriptionError;

/// Allocates notification streams and subscribes topics onto them.
#[derive(Clone)]
pub(crate) struct StreamRegistry {
    api: Arc<dyn NdkApi>,
    retry_interval: Duration,
    cancel: CancellationToken,
}

impl StreamRegistry {
    pub(crate) fn new(
        api: Arc<dyn NdkApi>,
        retry_interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            api,
            retry_interval,
            cancel,
        }
    }

    pub(crate) fn api(&self) -> &Arc<dyn NdkApi> {
        &self.api
    }

    pub(crate) fn retry_interval(&self) -> Duration {
        self.retry_interval
    }

    pub(crate) fn cancel(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Allocates a stream handle.
    ///
    /// RPC errors and failed statuses are retried forever with the fixed
    /// retry interval; only cancellation makes this return an error.
    pub(crate) async fn create_stream(&self) -> Result<u64> {
        let stream_id = retry_with_delay("create_stream", self.retry_interval, &self.cancel, || {
            let api = self.api.clone();
            async move {
                let resp = api
                    .notification_register(NotificationRegisterRequest::create_stream())
                    .await?;
                if !resp.is_success() {
                    return Err(NetworkError::StatusFailed {
                        rpc: "NotificationRegister",
                        error_str: resp.error_str,
                    }
                    .into());
                }
                Ok(resp.stream_id)
            }
        })
        .await?;

        info!(stream_id, "notification stream created");
        Ok(stream_id)
    }

    /// Subscribes `topic` onto `stream_id` with a single attempt.
    pub(crate) async fn add_subscription(
        &self,
        stream_id: u64,
        topic: Topic,
    ) -> Result<()> {
        let req = NotificationRegisterRequest::add_subscription(stream_id, topic.subscription());
        debug!(stream_id, %topic, "adding subscription");

        let reason = match self.api.notification_register(req).await {
            Ok(resp) if resp.is_success() => return Ok(()),
            Ok(resp) => format!("status {}: {}", resp.sdk_status(), resp.error_str),
            Err(e) => e.to_string(),
        };

        Err(SubscriptionError::AddFailed {
            topic: topic.name(),
            stream_id,
            reason,
        }
        .into())
    }
}
