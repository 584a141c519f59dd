#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    #[error("Invalid cookie input: {0}")]
    InvalidInput(String),

    #[error("Cookie '{name}' is {size} bytes, exceeding the limit of {limit} bytes")]
    SizeLimitReached {
        name: String,
        size: usize,
        limit: usize,
    },

    #[error("Unable to send cookie: {0}")]
    FailureToSend(String),

    #[error("Cookie store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cookie serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
