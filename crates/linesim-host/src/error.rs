/// Errors that can occur while hosting a simulation run.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The scenario could not be loaded or assembled.
    #[error(transparent)]
    Scenario(#[from] linesim_scenario::ScenarioError),

    /// Writing the line state failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A snapshot could not be encoded.
    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// The simulation thread panicked before handing back its summary.
    #[error("simulation thread panicked")]
    SimThreadPanicked,
}
