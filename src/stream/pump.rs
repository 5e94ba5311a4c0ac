use std::marker::PhantomData;

use futures::StreamExt;
use tokio::sync::mpsc;
use tonic::Code;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::StreamRegistry;
use super::TopicPayload;
use crate::network::retry_with_delay;
use crate::network::sleep_or_cancel;
use crate::network::NotificationStream;
use crate::proto::ndk::NotificationStreamResponse;
use crate::Error;
use crate::Result;

enum PumpState {
    Disconnected,
    Connected(NotificationStream),
    Draining,
}

enum Opened {
    Stream(NotificationStream),
    /// The daemon no longer knows the handle.
    StaleHandle(tonic::Status),
}

/// Receive loop of one stream handle for one topic.
///
/// Decoded payloads are pushed onto an unbounded queue in the order the
/// daemon sent them. The receive call is reopened on the same handle after
/// end-of-stream or an error; a fresh handle is only acquired when the
/// daemon rejects the current one. Dropping the pump closes the queue.
pub(crate) struct NotificationPump<T: TopicPayload> {
    registry: StreamRegistry,
    stream_id: u64,
    tx: mpsc::UnboundedSender<T>,
    _payload: PhantomData<fn() -> T>,
}

impl<T: TopicPayload> NotificationPump<T> {
    pub(crate) fn new(
        registry: StreamRegistry,
        stream_id: u64,
        tx: mpsc::UnboundedSender<T>,
    ) -> Self {
        Self {
            registry,
            stream_id,
            tx,
            _payload: PhantomData,
        }
    }

    /// Allocates a stream and subscribes `T`'s topic onto it.
    ///
    /// A failed subscription is logged and the pump is still returned; the
    /// stream stays silent until the handle is re-acquired.
    pub(crate) async fn open(
        registry: StreamRegistry,
        tx: mpsc::UnboundedSender<T>,
    ) -> Result<Self> {
        let stream_id = registry.create_stream().await?;
        if let Err(e) = registry.add_subscription(stream_id, T::TOPIC).await {
            error!(stream_id, topic = %T::TOPIC, "{}", e);
        }

        Ok(Self::new(registry, stream_id, tx))
    }

    pub(crate) fn stream_id(&self) -> u64 {
        self.stream_id
    }

    pub(crate) async fn run(mut self) {
        info!(stream_id = self.stream_id, topic = %T::TOPIC, "starting streaming notifications");

        let mut state = PumpState::Disconnected;
        loop {
            state = match state {
                PumpState::Disconnected => match self.connect().await {
                    Ok(stream) => PumpState::Connected(stream),
                    Err(_) => PumpState::Draining,
                },
                PumpState::Connected(stream) => self.receive(stream).await,
                PumpState::Draining => break,
            };
        }

        info!(stream_id = self.stream_id, topic = %T::TOPIC, "notification stream exited");
    }

    async fn receive(
        &mut self,
        mut stream: NotificationStream,
    ) -> PumpState {
        let cancel = self.registry.cancel().clone();

        let item = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(stream_id = self.stream_id, "cancelled while receiving");
                return PumpState::Draining;
            }
            item = stream.next() => item,
        };

        match item {
            Some(Ok(resp)) => {
                if self.deliver(resp) {
                    PumpState::Connected(stream)
                } else {
                    debug!(stream_id = self.stream_id, "consumer dropped");
                    PumpState::Draining
                }
            }
            Some(Err(status)) => {
                warn!(
                    stream_id = self.stream_id,
                    topic = %T::TOPIC,
                    "failed to receive notification: {}, retrying in {:?}",
                    status,
                    self.registry.retry_interval()
                );
                self.back_off().await
            }
            None => {
                info!(
                    stream_id = self.stream_id,
                    topic = %T::TOPIC,
                    "received EOF, retrying in {:?}",
                    self.registry.retry_interval()
                );
                self.back_off().await
            }
        }
    }

    async fn back_off(&self) -> PumpState {
        if sleep_or_cancel(self.registry.retry_interval(), self.registry.cancel()).await {
            PumpState::Disconnected
        } else {
            PumpState::Draining
        }
    }

    /// Pushes every payload of `resp` to the consumer.
    ///
    /// Returns `false` once the consumer is gone.
    fn deliver(
        &self,
        resp: NotificationStreamResponse,
    ) -> bool {
        debug!(stream_id = self.stream_id, topic = %T::TOPIC, "received {} notifications", resp.notifications.len());

        for notification in resp.notifications {
            let sub_id = notification.sub_id;
            match T::extract(notification) {
                Some(payload) => {
                    if self.tx.send(payload).is_err() {
                        return false;
                    }
                }
                None => {
                    info!(stream_id = self.stream_id, sub_id, topic = %T::TOPIC, "empty notification skipped");
                }
            }
        }
        true
    }

    /// Opens the receive call, re-acquiring the handle when it went stale.
    ///
    /// Every re-acquisition waits one retry interval first.
    ///
    /// Only returns an error on cancellation.
    async fn connect(&mut self) -> Result<NotificationStream> {
        loop {
            let api = self.registry.api().clone();
            let stream_id = self.stream_id;

            let opened = retry_with_delay(
                "notification_stream",
                self.registry.retry_interval(),
                self.registry.cancel(),
                || {
                    let api = api.clone();
                    async move {
                        match api.notification_stream(stream_id).await {
                            Ok(stream) => Ok(Opened::Stream(stream)),
                            Err(status) if matches!(status.code(), Code::NotFound | Code::InvalidArgument) => {
                                Ok(Opened::StaleHandle(status))
                            }
                            Err(status) => Err(Error::from(status)),
                        }
                    }
                },
            )
            .await?;

            match opened {
                Opened::Stream(stream) => return Ok(stream),
                Opened::StaleHandle(status) => {
                    warn!(
                        stream_id,
                        topic = %T::TOPIC,
                        "stream handle rejected: {}, re-acquiring in {:?}",
                        status,
                        self.registry.retry_interval()
                    );
                    if !sleep_or_cancel(self.registry.retry_interval(), self.registry.cancel()).await {
                        return Err(Error::Cancelled);
                    }
                    self.stream_id = self.registry.create_stream().await?;
                    if let Err(e) = self.registry.add_subscription(self.stream_id, T::TOPIC).await {
                        error!(stream_id = self.stream_id, topic = %T::TOPIC, "{}", e);
                    }
                }
            }
        }
    }
}
