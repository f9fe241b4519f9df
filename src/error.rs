use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Response code: {status} from {url}")]
    Api { status: u16, url: String },

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("OAuth handshake failed: {0}")]
    Handshake(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
}

impl AppError {
    /// Returns the HTTP status for API errors
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
