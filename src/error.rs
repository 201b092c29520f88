use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Validation error for {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },

    /// The copy reached the destination but the source could not be removed,
    /// so the file now exists in two places.
    #[error("Copied to {path} but source was not removed: {message}")]
    PartialMove { path: String, message: String },

    #[error("Archive error: {message}")]
    ArchiveError { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Template(#[from] askama::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        let error_response = ErrorResponse {
            error_type: self.error_type(),
            message: self.user_message(),
            recoverable: self.is_recoverable(),
        };

        error_response.serialize(serializer)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error_type: String,
    message: String,
    recoverable: bool,
}

impl AppError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Returns a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::ConfigError { .. } => "Configuration is invalid".to_string(),
            Self::ValidationError { message, .. } => message.clone(),
            Self::InvalidPath { message } => message.clone(),
            Self::PartialMove { .. } => "Image was copied but the original could not be removed".to_string(),
            Self::ArchiveError { .. } => "Archive processing error".to_string(),
            Self::Io(_) => "File operation failed".to_string(),
            Self::Zip(_) => "Archive processing error".to_string(),
            Self::Template(_) => "Failed to render page".to_string(),
            Self::SerdeJson(_) => "Data processing error".to_string(),
        }
    }

    /// Returns the error type for clients and logs
    pub fn error_type(&self) -> String {
        match self {
            Self::ConfigError { .. } => "CONFIG_ERROR",
            Self::ValidationError { .. } => "VALIDATION_ERROR",
            Self::InvalidPath { .. } => "INVALID_PATH",
            Self::PartialMove { .. } => "PARTIAL_MOVE",
            Self::ArchiveError { .. } => "ARCHIVE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Zip(_) => "ARCHIVE_ERROR",
            Self::Template(_) => "TEMPLATE_ERROR",
            Self::SerdeJson(_) => "PARSE_ERROR",
        }
        .to_string()
    }

    /// Indicates if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::ConfigError { .. } | Self::PartialMove { .. })
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError { .. } | Self::InvalidPath { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the complete error source chain for debugging
    pub fn source_chain(&self) -> Vec<String> {
        let mut chain = vec![self.to_string()];
        let mut current: &dyn std::error::Error = self;

        while let Some(source) = current.source() {
            chain.push(source.to_string());
            current = source;
        }

        chain
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(
                error_type = %self.error_type(),
                "Request failed: {}",
                self.source_chain().join(": ")
            );
        }

        (status, self.user_message()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
