//! Error types for Markdown to PowerPoint conversion.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting a slide deck.
///
/// Malformed markup is never an error: the parser degrades it into
/// miscleaned text instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read the input document or write the output file.
    #[error("Failed to access file: {0}")]
    IoError(#[from] std::io::Error),

    /// ZIP archive error while assembling the PPTX package.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML serialization error while writing a PPTX part.
    #[error("XML writing error: {0}")]
    XmlError(String),
}
