use thiserror::Error;

/// Errors surfaced by intake, compression and download tasks.
///
/// Payloads are strings so the error can be cloned into iced messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Could not decode image: {0}")]
    Decode(String),

    #[error("JPEG encoding failed: {0}")]
    Encode(String),

    #[error("Blob {0} has been revoked")]
    BlobRevoked(String),

    #[error("Background task failed: {0}")]
    TaskJoin(String),
}
