/// Error types shared across the merge runner, page controller and import
use thiserror::Error;

/// A call into the browser through the JS bridge failed
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HostError {
    #[error("browser call failed: {0}")]
    Browser(String),

    #[error("tab {tab_id} did not finish loading within {timeout_ms} ms")]
    Timeout { tab_id: i32, timeout_ms: u32 },

    #[error("failed to convert value: {0}")]
    Conversion(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MergeError {
    /// A directional merge named an origin tab that is not in the window
    #[error("no tab at index {0} in the current window")]
    OriginNotFound(i32),

    /// The event carried no readable tab for an action that needs one
    #[error("{0} needs the tab it was triggered from, but none was given")]
    MissingOrigin(&'static str),

    #[error(transparent)]
    Host(#[from] HostError),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ImportError {
    #[error(
        "You must import a JSON file (.json extension)! These can be generated via the \"Export JSON\" button. Got: {0}"
    )]
    NotJson(String),

    #[error("could not read imported file: {0}")]
    Malformed(String),
}
