// ABOUTME: Error types for the pitch-deck application
// ABOUTME: Provides structured error handling for serving, capturing and assembling the deck

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("File system error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    FetchError(#[from] reqwest::Error),

    #[error(
        "Presentation server is not reachable at {url}: {reason}. \
         Start it first with `pitch-deck serve`."
    )]
    ServerUnreachable { url: String, reason: String },

    #[error("Invalid deck: {0}")]
    InvalidDeck(String),

    #[error("Headless browser error: {message}")]
    BrowserError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Failed to capture screenshot: {0}")]
    ScreenshotError(String),

    #[error("Timed out waiting for {0}")]
    TimeoutError(String),

    #[error("No slides were captured, nothing to assemble")]
    NoCapturesError,

    #[error("PDF generation error: {0}")]
    PdfError(String),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Input validation error: {0}")]
    ValidationError(String),

    #[error("Path not found: {0}")]
    PathNotFoundError(PathBuf),

    #[error("No capture images found matching pattern: {0}")]
    NoImagesFoundError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl DeckError {
    /// Wrap a headless_chrome failure, keeping the original error as source
    pub fn browser(message: impl Into<String>, err: anyhow::Error) -> Self {
        DeckError::BrowserError {
            message: format!("{}: {}", message.into(), err),
            source: Some(err.into()),
        }
    }
}

impl From<lopdf::Error> for DeckError {
    fn from(err: lopdf::Error) -> Self {
        DeckError::PdfError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DeckError>;
