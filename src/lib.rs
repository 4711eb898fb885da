//! Update server for desktop auto-updaters
//!
//! Answers "is there a newer release of this application for this platform, and
//! where do I download it?" from a repository's release list.
//!
//! - [`update`]: Resolution engine (fetching, caching, version and asset selection)
//! - [`server`]: HTTP routes
//! - [`config`]: Configuration and defaults
//! - [`logging`]: Tracing setup

pub mod config;
pub mod logging;
pub mod server;
pub mod update;
