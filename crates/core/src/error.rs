//! Error types for the askshot-core library.

use thiserror::Error;

/// Errors that can occur within the askshot-core library.
///
/// Every user-triggered action catches these at its boundary and surfaces
/// them as a modal message; no variant is fatal to the process.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading or persistence failed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Screen capture operation failed.
    #[error("Screen capture failed: {0}")]
    ScreenCapture(String),

    /// Requested monitor index was not found.
    #[error("Monitor not found: index {0}")]
    ScreenNotFound(usize),

    /// Image cropping, encoding or decoding failed.
    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    /// The selection rectangle has zero area after clamping.
    #[error("Selection area is empty or invalid")]
    EmptySelection,

    /// No credential stored for the provider the user selected.
    #[error("No API key configured for {0}. Enter one under API Keys and save.")]
    MissingCredential(String),

    /// A required input (image or question) is missing before dispatch.
    #[error("{0}")]
    MissingInput(String),

    /// The provider returned a non-2xx response.
    #[error("{provider} API error: {status} - {body}")]
    Provider {
        provider: String,
        status: u16,
        body: String,
    },

    /// The provider response did not contain an answer where expected.
    #[error("{provider} returned no answer text")]
    EmptyResponse { provider: String },

    /// Transport-level HTTP failure (connect, TLS, 30s timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// UI-related errors (window creation, event loop).
    #[error("UI error: {0}")]
    Ui(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a screen capture error with the given message.
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::ScreenCapture(msg.into())
    }

    /// Creates an image processing error with the given message.
    pub fn image(msg: impl Into<String>) -> Self {
        Self::ImageProcessing(msg.into())
    }

    /// Creates a missing-input validation error with the given message.
    pub fn missing_input(msg: impl Into<String>) -> Self {
        Self::MissingInput(msg.into())
    }

    /// Creates a UI error with the given message.
    pub fn ui(msg: impl Into<String>) -> Self {
        Self::Ui(msg.into())
    }
}

/// A convenient alias for Result with [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
