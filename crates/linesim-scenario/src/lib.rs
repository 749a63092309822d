//! Scenario files and assembly of the reference ore line.
//!
//! A scenario is a [`ScenarioConfig`] read from RON, TOML or JSON by
//! [`load_config`]. [`assembly::build`] turns it into a ready-to-step
//! [`Engine`](linesim_core::engine::Engine).

pub mod assembly;
pub mod config;
pub mod loader;

pub use assembly::{ReferenceLine, assemble, build};
pub use config::ScenarioConfig;
pub use loader::{ScenarioError, load_config};
