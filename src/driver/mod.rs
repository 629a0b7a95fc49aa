//! Actor driver
//!
//! Spawns one concurrent actor per request, each bound to one account and one
//! operation, and waits for all of them before reporting.

pub mod config;
pub mod runner;
pub mod scenario;

pub use config::DriverConfig;
pub use runner::{run_actor, summarize, ActorDriver, ActorReport, OutcomeSummary};
pub use scenario::random_scenario;
