use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use contextor::ContextorError;
use rag_store::{LoaderError, RagError};
use thiserror::Error;
use tracing::error;

use crate::core::{
    app_state::ConfigError,
    http::response_envelope::{ApiErrorDetail, ApiResponse},
};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Config(#[from] ConfigError),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Http { status, .. } => *status,
            AppError::Config(_) | AppError::Bind(_) | AppError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Http { code, .. } => code,
        }
    }

    fn http(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        AppError::Http {
            status,
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.error_code(), error = %self, "request failed");
        }
        let details = match &self {
            AppError::Http { code: "UNSUPPORTED_FILE_TYPE", .. } => vec![ApiErrorDetail::hint(
                "Supported types: txt, md, markdown, csv, json, html, htm, pdf.",
            )],
            _ => Vec::new(),
        };
        ApiResponse::<()>::error(self.error_code(), self.to_string(), details)
            .into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<ContextorError> for AppError {
    fn from(err: ContextorError) -> Self {
        match &err {
            ContextorError::InvalidInput(_) => {
                AppError::http(StatusCode::BAD_REQUEST, "INVALID_INPUT", err.to_string())
            }
            ContextorError::Config(_) => AppError::http(
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                err.to_string(),
            ),
            ContextorError::EmptyInput => {
                AppError::http(StatusCode::BAD_REQUEST, "EMPTY_INPUT", err.to_string())
            }
            ContextorError::StoreUnavailable(_) => AppError::http(
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                err.to_string(),
            ),
            ContextorError::Model(_) => {
                AppError::http(StatusCode::BAD_GATEWAY, "MODEL_FAILED", err.to_string())
            }
        }
    }
}

impl From<RagError> for AppError {
    fn from(err: RagError) -> Self {
        ContextorError::StoreUnavailable(err).into()
    }
}

impl From<LoaderError> for AppError {
    fn from(err: LoaderError) -> Self {
        let (status, code) = match &err {
            LoaderError::UnsupportedFileType(_) => (StatusCode::BAD_REQUEST, "UNSUPPORTED_FILE_TYPE"),
            LoaderError::Decode { .. } => (StatusCode::BAD_REQUEST, "UNREADABLE_DOCUMENT"),
            LoaderError::Empty(_) => (StatusCode::BAD_REQUEST, "EMPTY_DOCUMENT"),
            LoaderError::InvalidUrl(_) => (StatusCode::BAD_REQUEST, "INVALID_URL"),
            LoaderError::Fetch { .. } | LoaderError::HttpStatus { .. } => {
                (StatusCode::BAD_GATEWAY, "FETCH_FAILED")
            }
            LoaderError::TooLarge { .. } => (StatusCode::BAD_REQUEST, "DOCUMENT_TOO_LARGE"),
            LoaderError::Client(_) => (StatusCode::INTERNAL_SERVER_ERROR, "HTTP_CLIENT_ERROR"),
        };
        AppError::http(status, code, err.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        let status = err.status();
        let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
            "PAYLOAD_TOO_LARGE"
        } else {
            "BAD_MULTIPART"
        };
        AppError::http(status, code, err.body_text())
    }
}
