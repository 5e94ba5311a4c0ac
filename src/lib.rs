//! Client runtime for SR Linux NetOps Development Kit (NDK) agents.
//!
//! An agent registers with the NDK daemon, receives its configuration one
//! commit at a time, subscribes to operational notifications and pushes
//! state, routes and next hop groups back.
//!
//! ```ignore
//! let agent = AgentBuilder::new("greeter").build().map_err(|e| format!("{:?}", e))?;
//! let mut feed = agent.start().await?;
//! while let Some(cfg) = feed.full_config.recv().await {
//!     agent.update_state("", cfg.json.as_deref().unwrap_or("{}")).await?;
//! }
//! ```
mod agent;
mod commit;
mod config;
mod errors;
mod network;
mod path;
pub mod proto;
mod stream;

pub use agent::*;
pub use commit::*;
pub use config::*;
pub use errors::*;
pub use network::*;
pub use path::*;
pub use stream::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
mod test_utils;
