use thiserror::Error;

/// Failure talking to the remote assist service.
///
/// Every variant is recovered locally by the session controller; none of
/// them ever reaches the UI as a hard error.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request never completed: unreachable host, timeout, reset.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("service returned HTTP {0}")]
    Status(u16),

    /// The body did not match the expected response shape.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure reading or writing durable editor state.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    /// The background writer task has shut down.
    #[error("persistence writer is closed")]
    WriterClosed,
}
