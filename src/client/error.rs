use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Unauthorized: session expired or token rejected")]
    Unauthorized,

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Response is missing '{0}'")]
    MissingField(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}
