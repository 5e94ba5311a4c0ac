//! Shared fixtures for unit tests: daemon responses, notification envelopes
//! and pre-wired mocks.
mod fixtures;
pub(crate) use fixtures::*;
