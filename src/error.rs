/// Error types for history I/O against the extension host
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    /// The history search call was rejected or returned garbage
    #[error("Failed to load history: {0}")]
    Fetch(String),

    /// A single delete-URL call was rejected
    #[error("Failed to delete {url}: {reason}")]
    Delete { url: String, reason: String },

    /// Some URLs of a subtree could not be deleted; the others were
    #[error("{} of {attempted} deletions failed", .failed.len())]
    PartialDelete { attempted: usize, failed: Vec<String> },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Failed to convert value: {0}")]
    Decode(String),

    /// The mount point for the viewer is missing
    #[error("Renderer unavailable: {0}")]
    RendererUnavailable(String),
}
