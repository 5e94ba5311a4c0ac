use std::fmt::Debug;

use crate::proto::ndk::notification::SubscriptionTypes as Payload;
use crate::proto::ndk::notification_register_request::SubscriptionTypes;
use crate::proto::ndk::AppIdentNotification;
use crate::proto::ndk::AppIdentSubscriptionRequest;
use crate::proto::ndk::BfdSessionNotification;
use crate::proto::ndk::BfdSessionSubscriptionRequest;
use crate::proto::ndk::ConfigNotification;
use crate::proto::ndk::ConfigSubscriptionRequest;
use crate::proto::ndk::InterfaceNotification;
use crate::proto::ndk::InterfaceSubscriptionRequest;
use crate::proto::ndk::IpRouteNotification;
use crate::proto::ndk::IpRouteSubscriptionRequest;
use crate::proto::ndk::LldpNeighborNotification;
use crate::proto::ndk::LldpNeighborSubscriptionRequest;
use crate::proto::ndk::NetworkInstanceNotification;
use crate::proto::ndk::NetworkInstanceSubscriptionRequest;
use crate::proto::ndk::NextHopGroupNotification;
use crate::proto::ndk::NextHopGroupSubscriptionRequest;
use crate::proto::ndk::Notification;

/// Notification categories a stream can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Config,
    Interface,
    Route,
    NextHopGroup,
    NetworkInstance,
    LldpNeighbor,
    BfdSession,
    AppId,
}

impl Topic {
    pub fn name(&self) -> &'static str {
        match self {
            Topic::Config => "config",
            Topic::Interface => "interface",
            Topic::Route => "route",
            Topic::NextHopGroup => "nhg",
            Topic::NetworkInstance => "network_instance",
            Topic::LldpNeighbor => "lldp",
            Topic::BfdSession => "bfd",
            Topic::AppId => "appid",
        }
    }

    /// Subscription payload of a `NotificationRegisterRequest` for this topic.
    pub fn subscription(&self) -> SubscriptionTypes {
        match self {
            Topic::Config => SubscriptionTypes::Config(ConfigSubscriptionRequest {}),
            Topic::Interface => SubscriptionTypes::Intf(InterfaceSubscriptionRequest {}),
            Topic::Route => SubscriptionTypes::Route(IpRouteSubscriptionRequest {}),
            Topic::NextHopGroup => SubscriptionTypes::Nhg(NextHopGroupSubscriptionRequest {}),
            Topic::NetworkInstance => SubscriptionTypes::NetworkInstance(NetworkInstanceSubscriptionRequest {}),
            Topic::LldpNeighbor => SubscriptionTypes::LldpNeighbor(LldpNeighborSubscriptionRequest {}),
            Topic::BfdSession => SubscriptionTypes::BfdSession(BfdSessionSubscriptionRequest {}),
            Topic::AppId => SubscriptionTypes::Appid(AppIdentSubscriptionRequest {}),
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed notification carried by exactly one [`Topic`].
pub trait TopicPayload: Debug + Send + Sized + 'static {
    const TOPIC: Topic;

    /// Takes this topic's payload out of an envelope. `None` when the
    /// envelope is empty or carries another topic.
    fn extract(notification: Notification) -> Option<Self>;
}

macro_rules! impl_topic_payload {
    ($($ty:ty => $topic:ident, $variant:ident;)*) => {
        $(
            impl TopicPayload for $ty {
                const TOPIC: Topic = Topic::$topic;

                fn extract(notification: Notification) -> Option<Self> {
                    match notification.subscription_types {
                        Some(Payload::$variant(n)) => Some(n),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_topic_payload! {
    ConfigNotification => Config, Config;
    InterfaceNotification => Interface, Intf;
    IpRouteNotification => Route, Route;
    NextHopGroupNotification => NextHopGroup, Nhg;
    NetworkInstanceNotification => NetworkInstance, NetworkInstance;
    LldpNeighborNotification => LldpNeighbor, LldpNeighbor;
    BfdSessionNotification => BfdSession, BfdSession;
    AppIdentNotification => AppId, Appid;
}
