use thiserror::Error;

#[derive(Error, Debug)]
pub enum OmmsError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl OmmsError {
    /// Envelope/business code mirrored into the HTTP status by the API layer.
    pub fn code(&self) -> u16 {
        match self {
            OmmsError::NotFound(_) => 404,
            OmmsError::Validation(_) => 400,
            OmmsError::Conflict(_) => 409,
            OmmsError::Authentication(_) => 401,
            OmmsError::Authorization(_) => 403,
            OmmsError::Database(_) | OmmsError::Internal(_) => 500,
        }
    }

    /// Message surfaced to the client. Internal failures are masked.
    pub fn client_message(&self) -> String {
        match self {
            OmmsError::NotFound(m)
            | OmmsError::Validation(m)
            | OmmsError::Conflict(m)
            | OmmsError::Authentication(m)
            | OmmsError::Authorization(m) => m.clone(),
            OmmsError::Database(_) | OmmsError::Internal(_) => "内部服务器错误".to_string(),
        }
    }
}

pub type OmmsResult<T> = Result<T, OmmsError>;
