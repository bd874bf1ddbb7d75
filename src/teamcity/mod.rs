//! TeamCity build server access.
//!
//! [`BuildServer`] is the seam the orchestrator depends on; [`TeamCityClient`]
//! implements it over the 2018.1 REST API. Trigger bodies and build listings
//! are XML and are handled in [`xml`].

pub mod client;
pub mod error;
pub mod models;
pub mod xml;

pub use client::{BuildServer, TeamCityClient, server_base};
pub use error::{BuildError, PollPhase};
pub use models::{Build, BuildId, BuildProperty, BuildRequest, BuildState, QueuedBuild};

#[cfg(test)]
pub use client::MockBuildServer;
