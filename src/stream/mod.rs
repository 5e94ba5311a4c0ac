//! Notification stream lifecycle.
//!
//! [`StreamRegistry`] allocates stream handles and subscribes topics onto
//! them. A [`NotificationPump`] then owns the receive loop of one handle and
//! republishes that topic's typed payloads onto an unbounded queue.
mod pump;
mod registry;
mod topic;
pub(crate) use pump::*;
pub(crate) use registry::*;
pub use topic::*;
