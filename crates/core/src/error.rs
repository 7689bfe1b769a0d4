//! Error types for prompt-to-deck generation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating, assembling or serving a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required configuration value is absent.
    #[error("Missing configuration: {0} must be set")]
    MissingConfig(&'static str),

    /// A configuration value is present but unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The prompt was rejected before any remote call.
    #[error("Invalid prompt: {0}")]
    InvalidPrompt(String),

    /// The content model call failed or returned non-conforming content.
    #[error("Content generation failed: {0}")]
    Generation(String),

    /// The generator produced no slides.
    #[error("Could not generate content from prompt")]
    EmptyDeck,

    /// An HTTP call failed at the transport level or returned a bad status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// An image reference could not be turned into bytes.
    #[error("Image materialization failed: {0}")]
    Materialization(String),

    /// Writing the deck artifact failed.
    #[error("Failed to save presentation: {0}")]
    Serialization(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    Zip(String),

    /// XML reading or writing error (for PPTX).
    #[error("XML error: {0}")]
    Xml(String),

    /// Failed to parse an existing PPTX file.
    #[error("PPTX parsing error: {0}")]
    PptxParse(String),

    /// A requested file does not exist in the output directory.
    #[error("File not found: {0}")]
    NotFound(String),
}
