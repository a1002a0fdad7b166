use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    NotExtractable(String),

    #[error("Content extraction error: {0}")]
    ContentExtraction(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Could not reach server: {0}")]
    Unreachable(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid: {0}")]
    Invalid(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl Error {
    pub fn is_temporary(&self) -> bool {
        matches!(
            self,
            Error::HttpError(_) | Error::Unreachable(_) | Error::Timeout(_) | Error::Io(_)
        )
    }

    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::NotExtractable(_)
                | Error::InvalidUrl(_)
                | Error::Config(_)
                | Error::Unauthorized(_)
        )
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Error::NotExtractable(_) => "NOT_EXTRACTABLE",
            Error::ContentExtraction(_) => "CONTENT_EXTRACTION",
            Error::HttpError(_) => "HTTP_ERROR",
            Error::Unauthorized(_) => "UNAUTHORIZED",
            Error::Unreachable(_) => "UNREACHABLE",
            Error::Timeout(_) => "TIMEOUT",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::Io(_) => "IO_ERROR",
            Error::Serialization(_) => "SERIALIZATION",
            Error::Config(_) => "CONFIG",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Invalid(_) => "INVALID",
        }
    }
}
