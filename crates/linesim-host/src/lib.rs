//! Hosting for the line simulator: a simulation thread that steps the
//! engine and publishes snapshots, and a viewer that prints them.
//!
//! # Usage
//!
//! ```rust,ignore
//! let engine = linesim_scenario::build(&ScenarioConfig::default())?;
//! let (handle, feed) = runner::spawn(engine, RunOptions::bounded(2_880))?;
//! Viewer::new(std::io::stdout(), ViewFormat::Text, 60, false).follow(&feed, idle)?;
//! let summary = handle.join()?;
//! ```

pub mod error;
pub mod runner;
pub mod viewer;

pub use error::HostError;
pub use runner::{RunOptions, RunSummary, SimHandle, spawn};
pub use viewer::{ViewFormat, Viewer, render_text};
