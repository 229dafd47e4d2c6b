//! CDP error types and staleness classification.

use slotbot_protocols::EngineError;
use thiserror::Error;

/// CDP client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to connect to Chrome.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Chrome endpoint did not answer discovery.
    #[error("Chrome not available at {0}")]
    ChromeNotAvailable(String),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// CDP protocol error.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error (endpoint discovery).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Navigation failed.
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// JavaScript evaluation threw.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// A command did not answer in time.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The command channel is gone.
    #[error("Session closed")]
    SessionClosed,

    /// Unexpected response shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Chrome binary not found on this machine.
    #[error("Chrome not found. Please install Google Chrome or Chromium.")]
    ChromeNotFound,

    /// Chrome process failed to start or become reachable.
    #[error("Failed to launch Chrome: {0}")]
    LaunchFailed(String),
}

/// Protocol error fragments that mean an object/node handle outlived its
/// DOM node or execution context. Matched lower-cased.
const STALE_FRAGMENTS: &[&str] = &[
    "could not find object",
    "cannot find context",
    "node is detached",
    "no node with given id",
    "object couldn't be returned",
    "execution context was destroyed",
];

impl CdpError {
    /// True when this error means a held element handle is dead and the
    /// caller should re-resolve the element rather than give up.
    pub fn is_stale(&self) -> bool {
        let message = match self {
            CdpError::Protocol { message, .. } => message,
            CdpError::JavaScript(message) => message,
            _ => return false,
        };
        let low = message.to_lowercase();
        STALE_FRAGMENTS.iter().any(|f| low.contains(f))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<CdpError> for EngineError {
    fn from(e: CdpError) -> Self {
        if e.is_stale() {
            EngineError::stale(e.to_string())
        } else {
            EngineError::driver(e.to_string())
        }
    }
}
