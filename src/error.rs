//! Error types for tableqr operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using tableqr's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tableqr operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration draft rejected before generation (empty URL, bad count)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configured font file does not exist
    #[error("Font file not found: {}", .0.display())]
    FontNotFound(PathBuf),

    /// Font file exists but could not be parsed; generation falls back to the bitmap font
    #[error("Failed to load font: {0}")]
    FontLoad(String),

    /// QR code encoding failed
    #[error("Failed to encode QR code: {0}")]
    QrEncode(String),

    /// QR code decoding failed
    #[error("Failed to decode QR code: {0}")]
    QrDecode(String),

    /// No QR code found in image
    #[error("No QR code found in image")]
    NoQrCodeFound,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image processing error
    #[error("Image processing error: {0}")]
    Image(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

impl From<qrcode::types::QrError> for Error {
    fn from(e: qrcode::types::QrError) -> Self {
        Error::QrEncode(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Other(format!("JSON error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_not_found_mentions_path() {
        let err = Error::FontNotFound(PathBuf::from("font/missing.ttf"));
        assert_eq!(err.to_string(), "Font file not found: font/missing.ttf");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
